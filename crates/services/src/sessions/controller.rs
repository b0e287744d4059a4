use std::fmt;

use exam_core::model::{GradedResult, Question, ResultId, TestId};

use super::guard::SubmissionState;
use super::progress::SessionProgress;
use super::session::TestSession;
use super::workflow::{SessionWorkflow, SubmitOutcome, SubmitTrigger};
use crate::countdown::{Countdown, CountdownEvent};
use crate::error::SessionError;

/// Lifecycle phase of a loaded attempt, derived from the submission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting answers and navigation.
    Ready,
    /// A submission is in flight. Navigation and answer entry stay live;
    /// only further submit triggers are absorbed.
    Submitting,
    /// Submitted; the attempt is over and the clock is stopped.
    Submitted,
    /// The last submission failed; answers are intact and retry is open.
    Failed,
}

/// Progress of the countdown as seen by [`SessionController::pump_clock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockAdvance {
    /// One second elapsed.
    Tick { remaining_seconds: u64 },
    /// The countdown expired and the attempt auto-submitted.
    Expired(SubmitOutcome),
    /// The countdown has been stopped; no further clock events will arrive.
    Stopped,
}

/// Owns one attempt end to end: load, answer, navigate, submit, review.
///
/// Composes the loaded [`TestSession`], the ticking [`Countdown`], and the
/// gateway-facing [`SessionWorkflow`]. All three submit triggers converge on
/// [`submit`](Self::submit); the countdown is stopped the moment the attempt
/// leaves the ready phase for good, so no stray expiry can fire afterwards.
pub struct SessionController {
    workflow: SessionWorkflow,
    session: TestSession,
    countdown: Countdown,
    remaining_seconds: u64,
}

impl SessionController {
    /// Load the test and start the attempt clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` or `SessionError::EmptyTest`; both are
    /// terminal, the candidate must navigate back and re-enter.
    pub async fn load(workflow: SessionWorkflow, test_id: TestId) -> Result<Self, SessionError> {
        let session = workflow.load(test_id).await?;
        let remaining_seconds = session.duration_seconds();
        let countdown = Countdown::start(remaining_seconds);
        Ok(Self {
            workflow,
            session,
            countdown,
            remaining_seconds,
        })
    }

    #[must_use]
    pub fn session(&self) -> &TestSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.session.submission_state() {
            SubmissionState::NotSubmitted => SessionPhase::Ready,
            SubmissionState::Submitting => SessionPhase::Submitting,
            SubmissionState::Submitted(_) => SessionPhase::Submitted,
            SubmissionState::Failed(_) => SessionPhase::Failed,
        }
    }

    /// Seconds left on the attempt clock, for display only.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.session.current_question()
    }

    /// Record an answer for the current question.
    pub fn select_answer(&mut self, value: impl Into<String>) {
        self.session.select_answer(value);
    }

    pub fn go_to(&mut self, index: usize) {
        self.session.go_to(index);
    }

    pub fn next(&mut self) {
        self.session.next();
    }

    pub fn previous(&mut self) {
        self.session.previous();
    }

    /// The "Next"/"Finish" action: advances past the current question, or
    /// submits when it is the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when finishing fails; see
    /// [`submit`](Self::submit).
    pub async fn finish_or_advance(&mut self) -> Result<Option<SubmitOutcome>, SessionError> {
        if self.session.is_last() {
            return self.submit(SubmitTrigger::Finish).await.map(Some);
        }
        self.session.next();
        Ok(None)
    }

    /// Submit the attempt through the one-shot guard.
    ///
    /// Whichever trigger arrives first performs the single network call;
    /// later triggers get the existing outcome back. On success the clock is
    /// stopped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` on gateway failure. The answer sheet is
    /// untouched; calling again retries.
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmitOutcome, SessionError> {
        let outcome = self.workflow.submit(&mut self.session, trigger).await?;
        if outcome.result_id().is_some() {
            self.countdown.stop();
        }
        Ok(outcome)
    }

    /// Wait for the next clock event and apply it.
    ///
    /// Ticks update the displayed remaining time. Expiry auto-submits with
    /// [`SubmitTrigger::Expiry`] — the answer sheet is read at that moment,
    /// not captured earlier, so every answer recorded before the deadline is
    /// in the payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when the expiry-triggered submission
    /// fails; the attempt then sits in the failed phase awaiting a manual
    /// retry.
    pub async fn pump_clock(&mut self) -> Result<ClockAdvance, SessionError> {
        match self.countdown.next_event().await {
            Some(CountdownEvent::Tick { remaining_seconds }) => {
                self.remaining_seconds = remaining_seconds;
                Ok(ClockAdvance::Tick { remaining_seconds })
            }
            Some(CountdownEvent::Expired) => {
                self.remaining_seconds = 0;
                tracing::info!(
                    test_id = %self.session.test_id(),
                    attempt_id = %self.session.attempt_id(),
                    "attempt clock expired"
                );
                let outcome = self.submit(SubmitTrigger::Expiry).await?;
                Ok(ClockAdvance::Expired(outcome))
            }
            None => Ok(ClockAdvance::Stopped),
        }
    }

    /// Result id of the accepted submission, if any.
    #[must_use]
    pub fn result_id(&self) -> Option<&ResultId> {
        self.session.result_id()
    }

    /// Fetch the graded result of this attempt for review.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` before a successful submission,
    /// or `SessionError::ResultFetch` when the gateway cannot serve it.
    pub async fn graded_result(&self) -> Result<GradedResult, SessionError> {
        let result_id = self.session.result_id().ok_or(SessionError::NotSubmitted)?;
        self.workflow.fetch_result(result_id).await
    }

    /// Stop the clock and walk away from the attempt.
    ///
    /// Used when the candidate exits without submitting; answers are simply
    /// dropped with the session.
    pub fn abandon(&mut self) {
        self.countdown.stop();
        tracing::info!(
            test_id = %self.session.test_id(),
            attempt_id = %self.session.attempt_id(),
            "attempt abandoned"
        );
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session)
            .field("phase", &self.phase())
            .field("remaining_seconds", &self.remaining_seconds)
            .finish_non_exhaustive()
    }
}
