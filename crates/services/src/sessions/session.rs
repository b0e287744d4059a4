use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{AnswerSheet, AnswerSnapshot, AttemptId, Question, ResultId, TestId};
use gateway::TestPaper;

use super::guard::{SubmissionGuard, SubmissionState};
use super::progress::SessionProgress;
use crate::error::SessionError;

/// Fallback when the source omits or mangles the duration: one hour.
pub const DEFAULT_DURATION_SECONDS: u64 = 3600;

/// In-memory state of one attempt at one test.
///
/// Created when the test loads, discarded once submission succeeds or the
/// candidate leaves; never persisted, so there is no resume-after-refresh.
/// Questions are fixed at load time; the answer sheet, current index, and
/// submission guard are the only mutable parts.
pub struct TestSession {
    test_id: TestId,
    attempt_id: AttemptId,
    title: String,
    questions: Vec<Question>,
    duration_seconds: u64,
    answers: AnswerSheet,
    current: usize,
    guard: SubmissionGuard,
    started_at: DateTime<Utc>,
}

impl TestSession {
    /// Begin a fresh attempt from a loaded paper.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyTest` if the paper has no questions.
    pub fn from_paper(paper: TestPaper, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if paper.questions.is_empty() {
            return Err(SessionError::EmptyTest);
        }

        let duration_seconds = paper
            .duration_minutes
            .map(|minutes| u64::from(minutes) * 60)
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_DURATION_SECONDS);

        Ok(Self {
            test_id: paper.test_id,
            attempt_id: AttemptId::generate(),
            title: paper.title,
            questions: paper.questions,
            duration_seconds,
            answers: AnswerSheet::new(),
            current: 0,
            guard: SubmissionGuard::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question at the current index. Always present: the index is
    /// clamped to the question range and the range is non-empty.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    /// Jump to a question, clamped to the valid range.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.questions.len() - 1);
    }

    /// Step forward; no-op on the last question.
    pub fn next(&mut self) {
        if !self.is_last() {
            self.current += 1;
        }
    }

    /// Step back; no-op on the first question.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// True on the final question, where "Next" becomes "Finish".
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Record an answer for the current question, overwriting any previous
    /// selection.
    pub fn select_answer(&mut self, value: impl Into<String>) {
        self.answers.set(self.current, value);
    }

    /// Remove the answer for the current question.
    pub fn clear_answer(&mut self) {
        self.answers.clear(self.current);
    }

    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<&str> {
        self.answers.get(index)
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.is_answered(index)
    }

    /// Snapshot of the sheet as it is right now; the submission payload.
    #[must_use]
    pub fn answers_snapshot(&self) -> AnswerSnapshot {
        self.answers.snapshot()
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn submission_state(&self) -> &SubmissionState {
        self.guard.state()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.guard.is_submitted()
    }

    #[must_use]
    pub fn result_id(&self) -> Option<&ResultId> {
        match self.guard.state() {
            SubmissionState::Submitted(result_id) => Some(result_id),
            _ => None,
        }
    }

    pub(crate) fn guard_mut(&mut self) -> &mut SubmissionGuard {
        &mut self.guard
    }

    /// Returns a summary of the current attempt progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answers.answered_count(),
            current: self.current,
            is_submitted: self.is_submitted(),
        }
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("test_id", &self.test_id)
            .field("attempt_id", &self.attempt_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.answered_count())
            .field("submission", &self.guard.state())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionKind;
    use exam_core::time::fixed_now;

    fn question(text: &str) -> Question {
        Question::new(
            text,
            QuestionKind::Mcq,
            vec!["A".to_string(), "B".to_string()],
            1,
        )
        .unwrap()
    }

    fn paper(question_count: usize, duration_minutes: Option<u32>) -> TestPaper {
        TestPaper {
            test_id: TestId::new("t1"),
            title: "Sample".to_string(),
            duration_minutes,
            questions: (0..question_count).map(|i| question(&format!("Q{i}"))).collect(),
        }
    }

    #[test]
    fn empty_paper_is_rejected() {
        let err = TestSession::from_paper(paper(0, Some(10)), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::EmptyTest));
    }

    #[test]
    fn missing_or_zero_duration_defaults_to_an_hour() {
        let session = TestSession::from_paper(paper(1, None), fixed_now()).unwrap();
        assert_eq!(session.duration_seconds(), DEFAULT_DURATION_SECONDS);

        let session = TestSession::from_paper(paper(1, Some(0)), fixed_now()).unwrap();
        assert_eq!(session.duration_seconds(), DEFAULT_DURATION_SECONDS);

        let session = TestSession::from_paper(paper(1, Some(90)), fixed_now()).unwrap();
        assert_eq!(session.duration_seconds(), 90 * 60);
    }

    #[test]
    fn navigation_clamps_and_no_ops_at_bounds() {
        let mut session = TestSession::from_paper(paper(3, Some(10)), fixed_now()).unwrap();

        session.previous();
        assert_eq!(session.current_index(), 0);
        assert!(session.is_first());

        session.go_to(99);
        assert_eq!(session.current_index(), 2);
        assert!(session.is_last());

        session.next();
        assert_eq!(session.current_index(), 2);

        session.go_to(1);
        assert_eq!(session.current_question().text(), "Q1");
    }

    #[test]
    fn answers_track_the_current_question() {
        let mut session = TestSession::from_paper(paper(3, Some(10)), fixed_now()).unwrap();

        session.select_answer("A");
        session.next();
        session.select_answer("B");
        session.select_answer("A"); // overwrite

        assert_eq!(session.answer_at(0), Some("A"));
        assert_eq!(session.answer_at(1), Some("A"));
        assert!(!session.is_answered(2));
        assert_eq!(session.progress().answered, 2);

        session.clear_answer();
        assert!(!session.is_answered(1));
    }

    #[test]
    fn fresh_session_is_not_submitted() {
        let session = TestSession::from_paper(paper(1, Some(10)), fixed_now()).unwrap();
        assert_eq!(session.submission_state(), &SubmissionState::NotSubmitted);
        assert!(session.result_id().is_none());
        assert!(!session.progress().is_submitted);
    }

    #[test]
    fn started_at_comes_from_the_caller_clock() {
        let session = TestSession::from_paper(paper(1, Some(10)), fixed_now()).unwrap();
        assert_eq!(session.started_at(), fixed_now());
    }
}
