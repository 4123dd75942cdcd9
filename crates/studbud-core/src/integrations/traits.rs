use std::future::Future;

use crate::clock::{ClockTime, Day};
use crate::study::{StudyGoal, StudySession, Subject, TimeSlot};

/// Everything a remote generator gets to see.
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    pub goal: StudyGoal,
    pub goal_details: &'a str,
    pub subjects: &'a [Subject],
    pub time_slots: &'a [TimeSlot],
}

/// Result of asking a remote service for a plan.
///
/// Only `Ok` with at least one session is usable; every other variant sends
/// the caller back to the local allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Ok(Vec<StudySession>),
    /// The response arrived but no session list could be read from it.
    ParseFailure(String),
    /// Transport error, missing credentials or non-success status.
    NetworkFailure(String),
    /// A well-formed list with nothing usable in it.
    EmptyResult,
}

/// A third-party plan source. Implementations never fail hard: every
/// problem is reported through [`PlanOutcome`].
pub trait PlanGenerator: Send + Sync {
    /// Unique identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Ask the remote service for a plan covering `request`.
    fn request_plan(
        &self,
        request: &PlanRequest<'_>,
    ) -> impl Future<Output = PlanOutcome> + Send;
}

/// Reject remote sessions that reference unknown subjects or bad ranges.
///
/// The subject is resolved by id first, then by case-insensitive name, and
/// the local copy is used. The duration is recomputed from the range.
pub fn validate_remote_session(
    subject_id: Option<&str>,
    subject_name: Option<&str>,
    day: &str,
    start_time: &str,
    end_time: &str,
    subjects: &[Subject],
) -> Result<StudySession, String> {
    let subject = subject_id
        .and_then(|id| subjects.iter().find(|s| s.id == id))
        .or_else(|| {
            let name = subject_name?.trim();
            subjects.iter().find(|s| s.name.eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| {
            format!(
                "unknown subject {}",
                subject_name.or(subject_id).unwrap_or("<missing>")
            )
        })?;

    let day: Day = day.parse().map_err(|e| format!("{e}"))?;
    let start = ClockTime::parse(start_time).map_err(|e| format!("{e}"))?;
    let end = ClockTime::parse(end_time).map_err(|e| format!("{e}"))?;
    if end <= start {
        return Err(format!("end time {end} is not after start time {start}"));
    }

    Ok(StudySession::new(subject.clone(), day, start, end))
}
