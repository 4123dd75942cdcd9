//! # StudBud Core Library
//!
//! This library turns a list of study subjects and weekly time slots into a
//! study plan. The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Allocator**: Splits each time slot among subjects in proportion to
//!   their difficulty, hardest first
//! - **Integrations**: Remote plan generators (Gemini) behind a trait, with
//!   every failure reported as a [`PlanOutcome`] instead of an error
//! - **Orchestrator**: Runs either path and falls back to the allocator
//! - **Storage**: SQLite key-value snapshot of the state and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`Allocator`]: Proportional session allocator
//! - [`PlanOrchestrator`]: Basic and AI generation with fallback
//! - [`AppState`]: Immutable application state snapshot
//! - [`SnapshotStore`]: State persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod integrations;
pub mod orchestrator;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod study;

pub use clock::{format_duration, ClockTime, Day};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use integrations::{GeminiGenerator, PlanGenerator, PlanOutcome, PlanRequest};
pub use orchestrator::{FallbackReason, Generation, PlanOrchestrator, PlanSource};
pub use scheduler::{share_minutes, Allocator, AllocatorConfig};
pub use state::{AppState, SubjectUpdate};
pub use storage::{Config, SnapshotKey, SnapshotStore};
pub use study::{
    sessions_by_day, Difficulty, PlanSummary, StudyGoal, StudySession, Subject, SubjectTotal,
    TimeSlot,
};
