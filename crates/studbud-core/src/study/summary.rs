//! Read-only views over a generated plan.

use serde::Serialize;

use super::StudySession;
use crate::clock::Day;

/// Minutes allocated to one subject across the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTotal {
    pub subject_id: String,
    pub name: String,
    pub minutes: u32,
    pub sessions: usize,
}

/// Totals for a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub total_minutes: u32,
    pub session_count: usize,
    /// In order of first appearance in the plan.
    pub per_subject: Vec<SubjectTotal>,
}

impl PlanSummary {
    pub fn from_sessions(sessions: &[StudySession]) -> Self {
        let mut summary = PlanSummary::default();
        for session in sessions {
            summary.total_minutes += session.duration;
            summary.session_count += 1;

            match summary
                .per_subject
                .iter_mut()
                .find(|t| t.subject_id == session.subject.id)
            {
                Some(total) => {
                    total.minutes += session.duration;
                    total.sessions += 1;
                }
                None => summary.per_subject.push(SubjectTotal {
                    subject_id: session.subject.id.clone(),
                    name: session.subject.name.clone(),
                    minutes: session.duration,
                    sessions: 1,
                }),
            }
        }
        summary
    }
}

/// Group sessions Monday through Sunday, skipping days without sessions.
/// Sessions keep their plan order within a day.
pub fn sessions_by_day(sessions: &[StudySession]) -> Vec<(Day, Vec<&StudySession>)> {
    Day::ALL
        .iter()
        .filter_map(|&day| {
            let on_day: Vec<&StudySession> = sessions.iter().filter(|s| s.day == day).collect();
            (!on_day.is_empty()).then_some((day, on_day))
        })
        .collect()
}
