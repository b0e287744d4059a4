use crate::model::{AnswerDetail, GradedResult};

/// Client-side filter over the graded review list.
///
/// `Wrong` means incorrect AND attempted; a skipped question is never
/// "wrong", it is `Unattempted`. The three non-`All` filters partition the
/// full row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFilter {
    All,
    Correct,
    Wrong,
    Unattempted,
}

impl ReviewFilter {
    /// Whether a row passes this filter.
    #[must_use]
    pub fn matches(&self, row: &ReviewRow) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Correct => row.correct,
            ReviewFilter::Wrong => !row.correct && row.user_answer.is_some(),
            ReviewFilter::Unattempted => row.user_answer.is_none(),
        }
    }
}

/// One row of the post-submission review, ordered by question index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub index: usize,
    pub question_text: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
    pub explanation: Option<String>,
}

impl ReviewRow {
    fn from_detail(index: usize, detail: &AnswerDetail) -> Self {
        Self {
            index,
            question_text: detail.question_text.clone(),
            user_answer: detail.user_answer.clone(),
            correct_answer: detail.correct_answer.clone(),
            correct: detail.correct,
            explanation: detail.explanation.clone(),
        }
    }
}

/// All review rows of a graded result, sorted by question index.
#[must_use]
pub fn review_rows(result: &GradedResult) -> Vec<ReviewRow> {
    result
        .detailed_answers()
        .iter()
        .map(|(index, detail)| ReviewRow::from_detail(*index, detail))
        .collect()
}

/// Review rows passing the given filter, sorted by question index.
#[must_use]
pub fn filter_rows(result: &GradedResult, filter: ReviewFilter) -> Vec<ReviewRow> {
    review_rows(result)
        .into_iter()
        .filter(|row| filter.matches(row))
        .collect()
}

/// Headline counts backing the review stats display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub wrong: usize,
    pub unattempted: usize,
}

/// Counts rows per filter bucket for a graded result.
#[must_use]
pub fn report_summary(result: &GradedResult) -> ReviewSummary {
    let rows = review_rows(result);
    let correct = rows.iter().filter(|r| ReviewFilter::Correct.matches(r)).count();
    let wrong = rows.iter().filter(|r| ReviewFilter::Wrong.matches(r)).count();
    let unattempted = rows
        .iter()
        .filter(|r| ReviewFilter::Unattempted.matches(r))
        .count();
    ReviewSummary {
        total: rows.len(),
        attempted: rows.len() - unattempted,
        correct,
        wrong,
        unattempted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn detail(user_answer: Option<&str>, correct: bool) -> AnswerDetail {
        AnswerDetail {
            question_text: "Q".to_string(),
            user_answer: user_answer.map(str::to_string),
            correct_answer: "A".to_string(),
            correct,
            explanation: None,
        }
    }

    /// 10 questions: 6 correct, 3 wrong-but-attempted, 1 unattempted.
    fn graded_result() -> GradedResult {
        let mut details = BTreeMap::new();
        for index in 0..6 {
            details.insert(index, detail(Some("A"), true));
        }
        for index in 6..9 {
            details.insert(index, detail(Some("B"), false));
        }
        details.insert(9, detail(None, false));
        GradedResult::from_parts("T", 6, 10, 60.0, 6, 3, details).unwrap()
    }

    #[test]
    fn rows_are_index_sorted() {
        let rows = review_rows(&graded_result());
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn wrong_means_attempted_and_incorrect() {
        let result = graded_result();
        assert_eq!(filter_rows(&result, ReviewFilter::Wrong).len(), 3);
        assert_eq!(filter_rows(&result, ReviewFilter::Unattempted).len(), 1);
        assert_eq!(filter_rows(&result, ReviewFilter::Correct).len(), 6);
    }

    #[test]
    fn non_all_filters_partition_the_rows() {
        let result = graded_result();
        let all = filter_rows(&result, ReviewFilter::All);
        let correct = filter_rows(&result, ReviewFilter::Correct);
        let wrong = filter_rows(&result, ReviewFilter::Wrong);
        let unattempted = filter_rows(&result, ReviewFilter::Unattempted);

        assert_eq!(correct.len() + wrong.len() + unattempted.len(), all.len());

        // Each row lands in exactly one bucket.
        for row in &all {
            let buckets = [
                ReviewFilter::Correct,
                ReviewFilter::Wrong,
                ReviewFilter::Unattempted,
            ]
            .iter()
            .filter(|f| f.matches(row))
            .count();
            assert_eq!(buckets, 1, "row {} in {buckets} buckets", row.index);
        }
    }

    #[test]
    fn summary_matches_filter_counts() {
        let summary = report_summary(&graded_result());
        assert_eq!(summary.total, 10);
        assert_eq!(summary.attempted, 9);
        assert_eq!(summary.correct, 6);
        assert_eq!(summary.wrong, 3);
        assert_eq!(summary.unattempted, 1);
    }
}
