use exam_core::model::ResultId;

/// Submission lifecycle for one attempt.
///
/// Legal transitions: `NotSubmitted → Submitting → {Submitted, Failed}`, and
/// `Failed → Submitting` as the only retry edge. `Submitted` is final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted(ResultId),
    Failed(String),
}

/// Outcome of asking the guard to begin a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginSubmit {
    /// The caller owns the submission and must settle it with
    /// [`SubmissionGuard::complete`] or [`SubmissionGuard::fail`].
    Started,
    /// Another trigger's submission has not settled yet; do nothing.
    InFlight,
    /// The attempt was already submitted; do nothing.
    Done(ResultId),
}

/// One-shot gate around result submission.
///
/// Every trigger (manual submit, clock expiry, finish on the last question)
/// goes through [`try_begin`](Self::try_begin). The check-and-set is a single
/// synchronous state match on the one logical thread, so at most one caller
/// per in-flight attempt ever observes `Started` — duplicate network
/// submissions are unrepresentable rather than merely unlikely.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    state: SubmissionState,
}

impl SubmissionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted(_))
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting)
    }

    /// Reason for the most recent failed submission, if the guard is in the
    /// failed state.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Claim the right to submit.
    ///
    /// Succeeds from `NotSubmitted` and from `Failed` (the retry edge);
    /// everything else is a no-op answer describing the existing submission.
    pub fn try_begin(&mut self) -> BeginSubmit {
        match &self.state {
            SubmissionState::NotSubmitted | SubmissionState::Failed(_) => {
                self.state = SubmissionState::Submitting;
                BeginSubmit::Started
            }
            SubmissionState::Submitting => BeginSubmit::InFlight,
            SubmissionState::Submitted(result_id) => BeginSubmit::Done(result_id.clone()),
        }
    }

    /// Settle the in-flight submission as accepted.
    ///
    /// Only a `Submitting` guard moves; once submitted the state is final.
    pub fn complete(&mut self, result_id: ResultId) {
        if matches!(self.state, SubmissionState::Submitting) {
            self.state = SubmissionState::Submitted(result_id);
        }
    }

    /// Settle the in-flight submission as failed, keeping the retry edge open.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if matches!(self.state, SubmissionState::Submitting) {
            self.state = SubmissionState::Failed(reason.into());
        }
    }
}
