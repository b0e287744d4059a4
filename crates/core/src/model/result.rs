use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Percentage at or above which an attempt counts as passed.
pub const PASS_THRESHOLD_PERCENT: f64 = 40.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum GradedResultError {
    #[error("percentage {0} is outside 0..=100")]
    PercentageOutOfRange(f64),

    #[error("score {score} exceeds total points {total_points}")]
    ScoreExceedsTotal { score: u32, total_points: u32 },
}

/// Per-question breakdown of a graded answer.
///
/// `user_answer` is `None` when the candidate never answered the question;
/// the gateway normalizes any wire-level "not answered" sentinel before this
/// type is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question_text: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
    pub explanation: Option<String>,
}

/// Server-computed scoring for one submitted attempt, consumed read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedResult {
    test_title: String,
    score: u32,
    total_points: u32,
    percentage: f64,
    correct_answers: u32,
    wrong_answers: u32,
    detailed_answers: BTreeMap<usize, AnswerDetail>,
}

impl GradedResult {
    /// Rehydrate a graded result from gateway data.
    ///
    /// # Errors
    ///
    /// Returns `GradedResultError::PercentageOutOfRange` or
    /// `GradedResultError::ScoreExceedsTotal` when the server payload is
    /// internally inconsistent.
    pub fn from_parts(
        test_title: impl Into<String>,
        score: u32,
        total_points: u32,
        percentage: f64,
        correct_answers: u32,
        wrong_answers: u32,
        detailed_answers: BTreeMap<usize, AnswerDetail>,
    ) -> Result<Self, GradedResultError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(GradedResultError::PercentageOutOfRange(percentage));
        }
        if score > total_points {
            return Err(GradedResultError::ScoreExceedsTotal {
                score,
                total_points,
            });
        }

        Ok(Self {
            test_title: test_title.into(),
            score,
            total_points,
            percentage,
            correct_answers,
            wrong_answers,
            detailed_answers,
        })
    }

    #[must_use]
    pub fn test_title(&self) -> &str {
        &self.test_title
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    /// Per-question breakdown keyed by question index.
    #[must_use]
    pub fn detailed_answers(&self) -> &BTreeMap<usize, AnswerDetail> {
        &self.detailed_answers
    }

    /// Whether the attempt met the pass threshold.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.percentage >= PASS_THRESHOLD_PERCENT
    }

    /// Number of questions the candidate actually answered.
    #[must_use]
    pub fn attempted_count(&self) -> usize {
        self.detailed_answers
            .values()
            .filter(|detail| detail.user_answer.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(user_answer: Option<&str>, correct: bool) -> AnswerDetail {
        AnswerDetail {
            question_text: "Q".to_string(),
            user_answer: user_answer.map(str::to_string),
            correct_answer: "A".to_string(),
            correct,
            explanation: None,
        }
    }

    #[test]
    fn rejects_inconsistent_payloads() {
        let err =
            GradedResult::from_parts("T", 1, 10, 120.0, 1, 0, BTreeMap::new()).unwrap_err();
        assert_eq!(err, GradedResultError::PercentageOutOfRange(120.0));

        let err = GradedResult::from_parts("T", 11, 10, 50.0, 1, 0, BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            GradedResultError::ScoreExceedsTotal {
                score: 11,
                total_points: 10
            }
        );
    }

    #[test]
    fn pass_threshold_is_forty_percent() {
        let passed =
            GradedResult::from_parts("T", 4, 10, 40.0, 4, 6, BTreeMap::new()).unwrap();
        assert!(passed.is_passed());
        let failed =
            GradedResult::from_parts("T", 3, 10, 39.9, 3, 7, BTreeMap::new()).unwrap();
        assert!(!failed.is_passed());
    }

    #[test]
    fn attempted_count_ignores_skipped_questions() {
        let mut details = BTreeMap::new();
        details.insert(0, detail(Some("A"), true));
        details.insert(1, detail(None, false));
        details.insert(2, detail(Some("B"), false));
        let result = GradedResult::from_parts("T", 1, 3, 33.3, 1, 1, details).unwrap();
        assert_eq!(result.attempted_count(), 2);
    }
}
