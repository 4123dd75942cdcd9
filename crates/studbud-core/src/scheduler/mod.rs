//! Proportional study-time allocator.
//!
//! Each time slot is split independently among all subjects in proportion
//! to their difficulty weight:
//! - Subjects are visited hardest first (stable, so ties keep insertion order)
//! - A subject's share of a slot is `slot_minutes * weight / total_weight`,
//!   rounded half up
//! - Shares below the minimum session length are skipped
//! - Sessions are laid back to back from the slot start and clipped at the
//!   slot end

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::study::{StudySession, Subject, TimeSlot};

/// Allocator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Shortest session worth emitting (minutes)
    pub min_session_minutes: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            min_session_minutes: 15,
        }
    }
}

/// Greedy proportional allocator for study sessions
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: AllocatorConfig,
}

impl Allocator {
    /// Create a new allocator with default config
    pub fn new() -> Self {
        Self {
            config: AllocatorConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Build a plan from subjects and slots.
    ///
    /// Sessions come out grouped by slot (input order) and, within a slot,
    /// hardest subject first. Either input being empty yields an empty plan.
    /// Slots whose end is not after their start are skipped.
    pub fn allocate(&self, subjects: &[Subject], slots: &[TimeSlot]) -> Vec<StudySession> {
        if subjects.is_empty() || slots.is_empty() {
            return Vec::new();
        }

        let total_weight: u32 = subjects.iter().map(Subject::weight).sum();

        let mut ordered: Vec<&Subject> = subjects.iter().collect();
        ordered.sort_by(|a, b| b.weight().cmp(&a.weight()));

        let mut sessions = Vec::new();
        for slot in slots {
            self.fill_slot(slot, &ordered, total_weight, &mut sessions);
        }

        tracing::info!(
            "Allocated {} sessions across {} slots for {} subjects",
            sessions.len(),
            slots.len(),
            subjects.len()
        );
        sessions
    }

    fn fill_slot(
        &self,
        slot: &TimeSlot,
        ordered: &[&Subject],
        total_weight: u32,
        sessions: &mut Vec<StudySession>,
    ) {
        let slot_minutes = slot.duration_minutes();
        if slot_minutes <= 0 {
            tracing::debug!("Skipping slot {} with non-positive length {}", slot.id, slot_minutes);
            return;
        }
        let slot_minutes = slot_minutes as u32;
        let slot_end = slot.end_time.minutes();
        let mut cursor = slot.start_time.minutes();

        for subject in ordered {
            if cursor >= slot_end {
                break;
            }

            let share = share_minutes(slot_minutes, subject.weight(), total_weight);
            if share < self.config.min_session_minutes {
                tracing::debug!(
                    "Skipping {} in slot {}: share {}m below minimum",
                    subject.name,
                    slot.id,
                    share
                );
                continue;
            }

            // Rounded shares can overshoot the slot by a few minutes; the
            // clipped remainder must still be a full-length session.
            let session_end = (cursor + share).min(slot_end);
            if session_end <= cursor || session_end - cursor < self.config.min_session_minutes {
                tracing::debug!(
                    "Skipping {} in slot {}: only {}m left",
                    subject.name,
                    slot.id,
                    session_end.saturating_sub(cursor)
                );
                continue;
            }

            let (Some(start), Some(end)) =
                (ClockTime::from_minutes(cursor), ClockTime::from_minutes(session_end))
            else {
                break;
            };
            sessions.push(StudySession::new((*subject).clone(), slot.day, start, end));
            cursor = session_end;
        }
    }
}

/// `slot_minutes * weight / total_weight`, rounded half up.
///
/// Integer arithmetic, so 17.5 always becomes 18 regardless of float
/// representation.
pub fn share_minutes(slot_minutes: u32, weight: u32, total_weight: u32) -> u32 {
    if total_weight == 0 {
        return 0;
    }
    let numerator = 2 * u64::from(slot_minutes) * u64::from(weight) + u64::from(total_weight);
    (numerator / (2 * u64::from(total_weight))) as u32
}
