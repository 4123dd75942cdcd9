pub mod gemini;
pub mod traits;

pub use gemini::GeminiGenerator;
pub use traits::{validate_remote_session, PlanGenerator, PlanOutcome, PlanRequest};
