use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{GradedResult, ResultId, TestId};
use gateway::{ResultService, Submission, TestContentService};

use super::guard::BeginSubmit;
use super::session::TestSession;
use crate::error::SessionError;

/// What caused a submission attempt. All three routes go through the same
/// guard and are otherwise indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The explicit submit action.
    Manual,
    /// The countdown reached zero.
    Expiry,
    /// "Finish" on the last question.
    Finish,
}

/// Outcome of routing a submit trigger through the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call performed the network submission.
    Submitted(ResultId),
    /// Another trigger's submission is still in flight; nothing was sent.
    AlreadyInFlight,
    /// The attempt had already been submitted; nothing was sent.
    AlreadySubmitted(ResultId),
}

impl SubmitOutcome {
    /// The result id, when the attempt is submitted either way.
    #[must_use]
    pub fn result_id(&self) -> Option<&ResultId> {
        match self {
            SubmitOutcome::Submitted(id) | SubmitOutcome::AlreadySubmitted(id) => Some(id),
            SubmitOutcome::AlreadyInFlight => None,
        }
    }
}

/// Orchestrates attempt loading and guarded submission against the gateway.
#[derive(Clone)]
pub struct SessionWorkflow {
    clock: Clock,
    content: Arc<dyn TestContentService>,
    results: Arc<dyn ResultService>,
}

impl SessionWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn TestContentService>,
        results: Arc<dyn ResultService>,
    ) -> Self {
        Self {
            clock,
            content,
            results,
        }
    }

    /// Load a test in its candidate-facing shape and begin a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the gateway refuses or cannot serve
    /// the test; this is terminal for the attempt. Returns
    /// `SessionError::EmptyTest` for a paper without questions.
    pub async fn load(&self, test_id: TestId) -> Result<TestSession, SessionError> {
        let paper = self
            .content
            .get_test_for_taking(&test_id)
            .await
            .map_err(SessionError::Load)?;
        let session = TestSession::from_paper(paper, self.clock.now())?;
        tracing::info!(
            test_id = %session.test_id(),
            attempt_id = %session.attempt_id(),
            questions = session.total_questions(),
            duration_seconds = session.duration_seconds(),
            "attempt started"
        );
        Ok(session)
    }

    /// Submit the attempt's answers, at most once.
    ///
    /// The guard is consulted synchronously before anything is sent: a
    /// trigger that loses the race gets `AlreadyInFlight`/`AlreadySubmitted`
    /// back and causes no network traffic. The answer sheet is snapshotted
    /// after winning the gate, so the payload reflects every answer recorded
    /// up to that moment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when the gateway rejects or cannot take
    /// the submission. The answer sheet is left untouched and the guard moves
    /// to its failed state, from which this method may be called again.
    pub async fn submit(
        &self,
        session: &mut TestSession,
        trigger: SubmitTrigger,
    ) -> Result<SubmitOutcome, SessionError> {
        match session.guard_mut().try_begin() {
            BeginSubmit::InFlight => return Ok(SubmitOutcome::AlreadyInFlight),
            BeginSubmit::Done(result_id) => return Ok(SubmitOutcome::AlreadySubmitted(result_id)),
            BeginSubmit::Started => {}
        }

        let submission = Submission {
            test_id: session.test_id().clone(),
            answers: session.answers_snapshot(),
        };
        tracing::info!(
            test_id = %submission.test_id,
            attempt_id = %session.attempt_id(),
            started_at = %session.started_at(),
            ?trigger,
            answered = submission.answers.len(),
            "submitting attempt"
        );

        match self.results.submit(&submission).await {
            Ok(receipt) => {
                session.guard_mut().complete(receipt.result_id.clone());
                tracing::info!(result_id = %receipt.result_id, "attempt submitted");
                Ok(SubmitOutcome::Submitted(receipt.result_id))
            }
            Err(error) => {
                session.guard_mut().fail(error.to_string());
                tracing::warn!(
                    attempt_id = %session.attempt_id(),
                    error = %error,
                    "attempt submission failed"
                );
                Err(SessionError::Submit(error))
            }
        }
    }

    /// Fetch the graded result for a submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ResultFetch` when the gateway cannot serve it.
    pub async fn fetch_result(&self, result_id: &ResultId) -> Result<GradedResult, SessionError> {
        self.results
            .get_result(result_id)
            .await
            .map_err(SessionError::ResultFetch)
    }
}
