//! Plan generation entry points.
//!
//! Basic generation runs the allocator. AI generation asks the configured
//! [`PlanGenerator`] first and silently degrades to the allocator on any
//! unusable outcome; the returned [`PlanSource`] says which path won.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CoreError, Result};
use crate::integrations::{GeminiGenerator, PlanGenerator, PlanOutcome, PlanRequest};
use crate::scheduler::Allocator;
use crate::state::AppState;

/// Why an AI request ended up on the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotConfigured,
    ParseFailure(String),
    NetworkFailure(String),
    EmptyResult,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConfigured => f.write_str("no AI generator configured"),
            FallbackReason::ParseFailure(msg) => write!(f, "unreadable response: {msg}"),
            FallbackReason::NetworkFailure(msg) => write!(f, "request failed: {msg}"),
            FallbackReason::EmptyResult => f.write_str("no usable sessions returned"),
        }
    }
}

/// Which path produced a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Basic,
    Ai,
    Fallback(FallbackReason),
}

impl PlanSource {
    /// One-line message for the user.
    pub fn notice(&self) -> String {
        match self {
            PlanSource::Basic => "Study plan generated successfully".to_string(),
            PlanSource::Ai => "AI study plan generated successfully".to_string(),
            PlanSource::Fallback(reason) => {
                format!("Failed to generate AI plan ({reason}), using built-in algorithm instead")
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PlanSource::Fallback(_))
    }
}

/// A freshly generated plan and the state that carries it.
#[derive(Debug, Clone)]
pub struct Generation {
    pub state: AppState,
    pub source: PlanSource,
}

/// Clears the busy flag however the request ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct PlanOrchestrator<G> {
    allocator: Allocator,
    generator: Option<G>,
    busy: AtomicBool,
}

impl PlanOrchestrator<GeminiGenerator> {
    /// Orchestrator that can only run the allocator.
    pub fn without_generator(allocator: Allocator) -> Self {
        Self::new(allocator, None)
    }
}

impl<G: PlanGenerator> PlanOrchestrator<G> {
    pub fn new(allocator: Allocator, generator: Option<G>) -> Self {
        Self {
            allocator,
            generator,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether an AI request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Replace the plan with the allocator's output.
    ///
    /// # Errors
    /// Returns a validation error, leaving `state` untouched, when there
    /// are no subjects or no time slots.
    pub fn generate_basic(&self, state: &AppState) -> Result<Generation> {
        state.ensure_plannable()?;
        Ok(Generation {
            state: self.run_allocator(state),
            source: PlanSource::Basic,
        })
    }

    /// Replace the plan with the generator's output, or the allocator's
    /// when the generator has nothing usable.
    ///
    /// A second call while one is in flight is rejected, not queued; the
    /// running request is never cancelled.
    ///
    /// # Errors
    /// Returns a validation error for empty inputs and
    /// [`CoreError::GenerationInProgress`] while busy.
    pub async fn generate_ai(&self, state: &AppState) -> Result<Generation> {
        state.ensure_plannable()?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Ignoring AI generation request: another one is in progress");
            return Err(CoreError::GenerationInProgress);
        }
        let _guard = BusyGuard(&self.busy);

        let Some(generator) = &self.generator else {
            return Ok(self.fall_back(state, FallbackReason::NotConfigured));
        };

        let request = PlanRequest {
            goal: state.goal,
            goal_details: &state.goal_details,
            subjects: &state.subjects,
            time_slots: &state.time_slots,
        };
        tracing::info!("Requesting plan from {}", generator.name());

        let reason = match generator.request_plan(&request).await {
            PlanOutcome::Ok(sessions) if !sessions.is_empty() => {
                tracing::info!("Using {} sessions from {}", sessions.len(), generator.name());
                return Ok(Generation {
                    state: state.with_plan(sessions),
                    source: PlanSource::Ai,
                });
            }
            PlanOutcome::Ok(_) | PlanOutcome::EmptyResult => FallbackReason::EmptyResult,
            PlanOutcome::ParseFailure(msg) => FallbackReason::ParseFailure(msg),
            PlanOutcome::NetworkFailure(msg) => FallbackReason::NetworkFailure(msg),
        };
        Ok(self.fall_back(state, reason))
    }

    fn fall_back(&self, state: &AppState, reason: FallbackReason) -> Generation {
        tracing::warn!("Falling back to built-in allocator: {}", reason);
        Generation {
            state: self.run_allocator(state),
            source: PlanSource::Fallback(reason),
        }
    }

    fn run_allocator(&self, state: &AppState) -> AppState {
        state.with_plan(self.allocator.allocate(&state.subjects, &state.time_slots))
    }
}
