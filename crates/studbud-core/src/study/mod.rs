//! Study types: subjects, weekly time slots, generated sessions and goals.

mod summary;

pub use summary::{sessions_by_day, PlanSummary, SubjectTotal};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{ClockTime, Day};
use crate::error::ValidationError;

/// Opaque local id with a readable prefix, e.g. `subject-3f2a…`.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// How hard a subject is. Drives proportional time allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    EasyToModerate,
    #[default]
    Moderate,
    AboveModerate,
    Tough,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::EasyToModerate,
        Difficulty::Moderate,
        Difficulty::AboveModerate,
        Difficulty::Tough,
    ];

    /// Allocation weight, 1 (easy) through 5 (tough).
    pub fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::EasyToModerate => 2,
            Difficulty::Moderate => 3,
            Difficulty::AboveModerate => 4,
            Difficulty::Tough => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::EasyToModerate => "easyToModerate",
            Difficulty::Moderate => "moderate",
            Difficulty::AboveModerate => "aboveModerate",
            Difficulty::Tough => "tough",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    /// Accepts camelCase, kebab-case and snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "easytomoderate" => Ok(Difficulty::EasyToModerate),
            "moderate" => Ok(Difficulty::Moderate),
            "abovemoderate" => Ok(Difficulty::AboveModerate),
            "tough" => Ok(Difficulty::Tough),
            _ => Err(ValidationError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// A subject the user wants to study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
}

impl Subject {
    /// Create a subject with a fresh id. The name is trimmed and must not be blank.
    pub fn new(name: &str, difficulty: Difficulty) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        Ok(Self {
            id: new_id("subject"),
            name,
            difficulty,
        })
    }

    pub fn weight(&self) -> u32 {
        self.difficulty.weight()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(trimmed.to_string())
}

/// A weekly window available for study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl TimeSlot {
    /// Create a slot with a fresh id. Rejects `end <= start`; the bounds are never swapped.
    pub fn new(day: Day, start_time: ClockTime, end_time: ClockTime) -> Result<Self, ValidationError> {
        if end_time <= start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }
        Ok(Self {
            id: new_id("timeslot"),
            day,
            start_time,
            end_time,
        })
    }

    /// Length in minutes. Zero or negative only for slots that bypassed [`TimeSlot::new`].
    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end_time.minutes()) - i64::from(self.start_time.minutes())
    }
}

/// One subject's allocated interval within a slot.
///
/// `subject` is a copy taken at generation time; later edits to the subject
/// do not reach sessions that were already generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub subject: Subject,
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Minutes; always `end_time - start_time`.
    pub duration: u32,
}

impl StudySession {
    /// Create a session with a fresh id. Callers guarantee `end_time > start_time`.
    pub fn new(subject: Subject, day: Day, start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            id: new_id("session"),
            subject,
            day,
            start_time,
            end_time,
            duration: end_time.minutes().saturating_sub(start_time.minutes()),
        }
    }
}

/// What the user is studying towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyGoal {
    #[default]
    Exam,
    Skill,
    Daily,
    Custom,
}

impl StudyGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyGoal::Exam => "exam",
            StudyGoal::Skill => "skill",
            StudyGoal::Daily => "daily",
            StudyGoal::Custom => "custom",
        }
    }

    /// Header line for a plan, e.g. `"Exam Preparation: Finals"`.
    pub fn headline(self, details: &str) -> String {
        let details = details.trim();
        if details.is_empty() {
            return "Personalized for your study needs".to_string();
        }
        match self {
            StudyGoal::Exam => format!("Exam Preparation: {details}"),
            StudyGoal::Skill => format!("Learning: {details}"),
            StudyGoal::Daily => format!("Daily Study: {details}"),
            StudyGoal::Custom => format!("Goal: {details}"),
        }
    }
}

impl fmt::Display for StudyGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyGoal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exam" => Ok(StudyGoal::Exam),
            "skill" => Ok(StudyGoal::Skill),
            "daily" => Ok(StudyGoal::Daily),
            "custom" => Ok(StudyGoal::Custom),
            _ => Err(ValidationError::UnknownGoal(s.to_string())),
        }
    }
}
