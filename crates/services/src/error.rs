//! Shared error types for the services crate.

use thiserror::Error;

use gateway::GatewayError;

/// Errors emitted by the session workflow and controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The loaded test carried no questions; nothing to attempt.
    #[error("test has no questions")]
    EmptyTest,

    /// Loading failed. Terminal for the attempt; the candidate must
    /// navigate back and re-enter.
    #[error("failed to load test: {0}")]
    Load(#[source] GatewayError),

    /// Submitting failed. The answer sheet is untouched and one retry
    /// re-enters the guard through its failed edge.
    #[error("failed to submit answers: {0}")]
    Submit(#[source] GatewayError),

    /// The graded result could not be fetched.
    #[error("failed to fetch graded result: {0}")]
    ResultFetch(#[source] GatewayError),

    /// A graded result was requested before the attempt was submitted.
    #[error("attempt has not been submitted")]
    NotSubmitted,
}
