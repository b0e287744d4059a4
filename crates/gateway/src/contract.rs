use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use exam_core::model::{AnswerSnapshot, GradedResult, Question, ResultId, TestId};

/// Errors surfaced by the gateway boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("rejected payload: {0}")]
    Validation(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl GatewayError {
    /// Whether a failed submission may reasonably be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Server(_) | GatewayError::Connection(_))
    }
}

/// Test content as served for taking: no correct answers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPaper {
    pub test_id: TestId,
    pub title: String,
    /// Duration as authored. `None` when the source omitted or mangled it;
    /// the session layer applies the default.
    pub duration_minutes: Option<u32>,
    pub questions: Vec<Question>,
}

/// Payload for submitting one attempt's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub test_id: TestId,
    pub answers: AnswerSnapshot,
}

/// Acknowledgement of a stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub result_id: ResultId,
}

/// Read-side contract for test content.
#[async_trait]
pub trait TestContentService: Send + Sync {
    /// Fetch a test in its candidate-facing shape.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` or `GatewayError::Unauthorized` when
    /// the test cannot be served, or other gateway errors.
    async fn get_test_for_taking(&self, test_id: &TestId) -> Result<TestPaper, GatewayError>;
}

/// Contract for submitting answers and reading graded results.
#[async_trait]
pub trait ResultService: Send + Sync {
    /// Submit an attempt's answers for grading.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` for malformed payloads or
    /// `GatewayError::Server` for retryable server-side failures.
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, GatewayError>;

    /// Fetch a graded result by id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if missing, or other gateway errors.
    async fn get_result(&self, result_id: &ResultId) -> Result<GradedResult, GatewayError>;
}

#[derive(Default)]
struct InMemoryState {
    papers: HashMap<TestId, TestPaper>,
    results: HashMap<ResultId, GradedResult>,
    scripted_submit_failures: VecDeque<GatewayError>,
    submit_calls: u32,
    last_submission: Option<Submission>,
    next_receipt: u64,
}

/// In-memory gateway double for tests and prototyping.
///
/// Supports seeding papers/results, scripting submit failures, and counting
/// submit calls so tests can assert the exactly-once submission property.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a test paper available for taking.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_paper(&self, paper: TestPaper) {
        let mut state = self.state.lock().expect("gateway state lock");
        state.papers.insert(paper.test_id.clone(), paper);
    }

    /// Make a graded result available for fetching.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_result(&self, result_id: ResultId, result: GradedResult) {
        let mut state = self.state.lock().expect("gateway state lock");
        state.results.insert(result_id, result);
    }

    /// Script the next `submit` call to fail with the given error.
    ///
    /// Scripted failures are consumed in order, one per call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_next_submit(&self, error: GatewayError) {
        let mut state = self.state.lock().expect("gateway state lock");
        state.scripted_submit_failures.push_back(error);
    }

    /// Number of `submit` calls observed, including failed ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn submit_calls(&self) -> u32 {
        self.state.lock().expect("gateway state lock").submit_calls
    }

    /// Payload of the most recent accepted submission.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last_submission(&self) -> Option<Submission> {
        self.state
            .lock()
            .expect("gateway state lock")
            .last_submission
            .clone()
    }
}

#[async_trait]
impl TestContentService for InMemoryGateway {
    async fn get_test_for_taking(&self, test_id: &TestId) -> Result<TestPaper, GatewayError> {
        let state = self
            .state
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        state.papers.get(test_id).cloned().ok_or(GatewayError::NotFound)
    }
}

#[async_trait]
impl ResultService for InMemoryGateway {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, GatewayError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        state.submit_calls += 1;

        if let Some(error) = state.scripted_submit_failures.pop_front() {
            return Err(error);
        }

        state.next_receipt += 1;
        let result_id = ResultId::new(format!("result-{}", state.next_receipt));
        state.last_submission = Some(submission.clone());
        Ok(SubmissionReceipt { result_id })
    }

    async fn get_result(&self, result_id: &ResultId) -> Result<GradedResult, GatewayError> {
        let state = self
            .state
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        state
            .results
            .get(result_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerSheet, QuestionKind};

    fn paper(id: &str) -> TestPaper {
        TestPaper {
            test_id: TestId::new(id),
            title: "Sample".to_string(),
            duration_minutes: Some(30),
            questions: vec![
                Question::new(
                    "2 + 2?",
                    QuestionKind::Mcq,
                    vec!["3".to_string(), "4".to_string()],
                    1,
                )
                .unwrap(),
            ],
        }
    }

    #[tokio::test]
    async fn serves_seeded_paper_and_misses_unknown() {
        let gateway = InMemoryGateway::new();
        gateway.seed_paper(paper("t1"));

        let served = gateway.get_test_for_taking(&TestId::new("t1")).await.unwrap();
        assert_eq!(served.title, "Sample");

        let err = gateway
            .get_test_for_taking(&TestId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound);
    }

    #[tokio::test]
    async fn scripted_failure_consumed_once_and_counted() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_submit(GatewayError::Server("boom".to_string()));

        let mut sheet = AnswerSheet::new();
        sheet.set(0, "4");
        let submission = Submission {
            test_id: TestId::new("t1"),
            answers: sheet.snapshot(),
        };

        let err = gateway.submit(&submission).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(gateway.last_submission().is_none());

        let receipt = gateway.submit(&submission).await.unwrap();
        assert_eq!(receipt.result_id.as_str(), "result-1");
        assert_eq!(gateway.submit_calls(), 2);
        assert_eq!(
            gateway.last_submission().unwrap().answers.get(0),
            Some("4")
        );
    }
}
