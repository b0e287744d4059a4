mod controller;
mod guard;
mod progress;
mod session;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{ClockAdvance, SessionController, SessionPhase};
pub use guard::{BeginSubmit, SubmissionGuard, SubmissionState};
pub use progress::SessionProgress;
pub use session::{DEFAULT_DURATION_SECONDS, TestSession};
pub use workflow::{SessionWorkflow, SubmitOutcome, SubmitTrigger};
