use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("points must be positive")]
    ZeroPoints,

    #[error("multiple-choice question needs at least two options, got {got}")]
    TooFewOptions { got: usize },

    #[error("options are only valid for multiple-choice questions")]
    UnexpectedOptions,
}

/// Kind of question, matching the gateway's `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Mcq,
    TrueFalse,
    Descriptive,
}

/// Fixed answer pair offered for true/false questions.
pub const TRUE_FALSE_CHOICES: [&str; 2] = ["True", "False"];

/// One question of a test, immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    kind: QuestionKind,
    options: Vec<String>,
    points: u32,
    image_url: Option<String>,
    explanation: Option<String>,
}

impl Question {
    /// Validates and creates a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` for blank text,
    /// `QuestionError::ZeroPoints` for non-positive points,
    /// `QuestionError::TooFewOptions` for an Mcq with fewer than two options,
    /// and `QuestionError::UnexpectedOptions` when options accompany a
    /// non-Mcq kind.
    pub fn new(
        text: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        points: u32,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if points == 0 {
            return Err(QuestionError::ZeroPoints);
        }
        match kind {
            QuestionKind::Mcq => {
                if options.len() < 2 {
                    return Err(QuestionError::TooFewOptions { got: options.len() });
                }
            }
            QuestionKind::TrueFalse | QuestionKind::Descriptive => {
                if !options.is_empty() {
                    return Err(QuestionError::UnexpectedOptions);
                }
            }
        }

        Ok(Self {
            text,
            kind,
            options,
            points,
            image_url: None,
            explanation: None,
        })
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Options as authored. Empty for non-Mcq kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The selectable answers a candidate is shown.
    ///
    /// For true/false questions this is the fixed `TRUE_FALSE_CHOICES` pair;
    /// descriptive questions have no predefined choices.
    #[must_use]
    pub fn choices(&self) -> Vec<&str> {
        match self.kind {
            QuestionKind::Mcq => self.options.iter().map(String::as_str).collect(),
            QuestionKind::TrueFalse => TRUE_FALSE_CHOICES.to_vec(),
            QuestionKind::Descriptive => Vec::new(),
        }
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }
}
