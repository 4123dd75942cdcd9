//! Application state snapshot.
//!
//! Every mutation returns a new [`AppState`]; the receiver is left as is,
//! so callers can diff the two when persisting and tests can hold on to
//! earlier snapshots.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::study::{validate_name, Difficulty, StudyGoal, StudySession, Subject, TimeSlot};

/// Partial edit of a subject. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// Goal, inputs and the current plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub goal: StudyGoal,
    pub goal_details: String,
    pub subjects: Vec<Subject>,
    pub time_slots: Vec<TimeSlot>,
    pub study_plan: Vec<StudySession>,
}

impl AppState {
    pub fn with_goal(&self, goal: StudyGoal) -> Self {
        Self {
            goal,
            ..self.clone()
        }
    }

    pub fn with_goal_details(&self, details: &str) -> Self {
        Self {
            goal_details: details.to_string(),
            ..self.clone()
        }
    }

    /// Append a subject. Ids must be unique.
    pub fn add_subject(&self, subject: Subject) -> Result<Self, ValidationError> {
        if self.subjects.iter().any(|s| s.id == subject.id) {
            return Err(ValidationError::DuplicateId(subject.id));
        }
        let mut next = self.clone();
        next.subjects.push(subject);
        Ok(next)
    }

    /// Apply a partial edit. Sessions already in the plan keep their copy.
    pub fn update_subject(&self, id: &str, update: SubjectUpdate) -> Result<Self, ValidationError> {
        let name = update.name.as_deref().map(validate_name).transpose()?;

        let mut next = self.clone();
        let subject = next
            .subjects
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Subject", id))?;
        if let Some(name) = name {
            subject.name = name;
        }
        if let Some(difficulty) = update.difficulty {
            subject.difficulty = difficulty;
        }
        Ok(next)
    }

    pub fn remove_subject(&self, id: &str) -> Result<Self, ValidationError> {
        if !self.subjects.iter().any(|s| s.id == id) {
            return Err(not_found("Subject", id));
        }
        let mut next = self.clone();
        next.subjects.retain(|s| s.id != id);
        Ok(next)
    }

    /// Append a time slot. Ids must be unique.
    pub fn add_time_slot(&self, slot: TimeSlot) -> Result<Self, ValidationError> {
        if self.time_slots.iter().any(|s| s.id == slot.id) {
            return Err(ValidationError::DuplicateId(slot.id));
        }
        let mut next = self.clone();
        next.time_slots.push(slot);
        Ok(next)
    }

    pub fn remove_time_slot(&self, id: &str) -> Result<Self, ValidationError> {
        if !self.time_slots.iter().any(|s| s.id == id) {
            return Err(not_found("Time slot", id));
        }
        let mut next = self.clone();
        next.time_slots.retain(|s| s.id != id);
        Ok(next)
    }

    /// Replace the plan wholesale.
    pub fn with_plan(&self, study_plan: Vec<StudySession>) -> Self {
        Self {
            study_plan,
            ..self.clone()
        }
    }

    pub fn clear_plan(&self) -> Self {
        self.with_plan(Vec::new())
    }

    /// Back to defaults: exam goal, nothing else.
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Fails when there is nothing to plan with.
    pub fn ensure_plannable(&self) -> Result<(), ValidationError> {
        if self.subjects.is_empty() {
            return Err(ValidationError::EmptyCollection("subject".to_string()));
        }
        if self.time_slots.is_empty() {
            return Err(ValidationError::EmptyCollection("time slot".to_string()));
        }
        Ok(())
    }
}

fn not_found(kind: &str, id: &str) -> ValidationError {
    ValidationError::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}
