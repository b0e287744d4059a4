#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;

pub use countdown::{Countdown, CountdownEvent, format_clock};
pub use error::SessionError;

pub use sessions::{
    BeginSubmit, ClockAdvance, SessionController, SessionPhase, SessionProgress, SessionWorkflow,
    SubmissionGuard, SubmissionState, SubmitOutcome, SubmitTrigger, TestSession,
};
