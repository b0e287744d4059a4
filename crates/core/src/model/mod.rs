mod answers;
mod ids;
mod question;
mod result;
mod review;

pub use answers::{AnswerSheet, AnswerSnapshot};
pub use ids::{AttemptId, ResultId, TestId};
pub use question::{Question, QuestionError, QuestionKind, TRUE_FALSE_CHOICES};
pub use result::{AnswerDetail, GradedResult, GradedResultError, PASS_THRESHOLD_PERCENT};
pub use review::{ReviewFilter, ReviewRow, ReviewSummary, filter_rows, report_summary, review_rows};
