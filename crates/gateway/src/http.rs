//! HTTP implementation of the gateway contracts against the REST backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::env;

use exam_core::model::{
    AnswerDetail, AnswerSnapshot, GradedResult, Question, QuestionKind, ResultId, TestId,
};

use crate::contract::{
    GatewayError, ResultService, Submission, SubmissionReceipt, TestContentService, TestPaper,
};

/// Wire sentinel some graded results use instead of a null user answer.
const NOT_ANSWERED_SENTINEL: &str = "Not Answered";

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Opaque credential attached as a bearer token. Identity handling is an
    /// external collaborator's concern; this layer only forwards it.
    pub bearer_token: Option<String>,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EXAM_GATEWAY_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let bearer_token = env::var("EXAM_GATEWAY_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self {
            base_url,
            bearer_token,
        })
    }
}

/// Reqwest-backed client for the Test Content and Result services.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                GatewayError::Validation(body)
            }
            _ => GatewayError::Server(format!("{status}: {body}")),
        })
    }
}

#[async_trait]
impl TestContentService for HttpGateway {
    async fn get_test_for_taking(&self, test_id: &TestId) -> Result<TestPaper, GatewayError> {
        let url = self.url(&format!("/tests/{test_id}/take"));
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let dto: TestDto = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        map_test_dto(test_id.clone(), dto)
    }
}

#[async_trait]
impl ResultService for HttpGateway {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, GatewayError> {
        let url = self.url("/results/submit");
        let payload = SubmitDto {
            test_id: submission.test_id.clone(),
            answers: submission.answers.clone(),
        };
        let response = self
            .authorize(self.client.post(url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let receipt: ReceiptDto = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(SubmissionReceipt {
            result_id: ResultId::new(receipt.id),
        })
    }

    async fn get_result(&self, result_id: &ResultId) -> Result<GradedResult, GatewayError> {
        let url = self.url(&format!("/results/{result_id}"));
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let dto: ResultDto = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        map_result_dto(dto)
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct SubmitDto {
    test_id: TestId,
    answers: AnswerSnapshot,
}

#[derive(Debug, Deserialize)]
struct ReceiptDto {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestDto {
    title: String,
    #[serde(default, deserialize_with = "lenient_minutes")]
    duration_minutes: Option<u32>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    text: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    #[serde(default)]
    options: Vec<String>,
    points: u32,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultDto {
    #[serde(default)]
    test_title: Option<String>,
    score: u32,
    total_points: u32,
    percentage: f64,
    #[serde(default)]
    correct_answers: u32,
    #[serde(default)]
    wrong_answers: u32,
    #[serde(default)]
    detailed_answers: BTreeMap<String, AnswerDetailDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDetailDto {
    question_text: String,
    #[serde(default)]
    user_answer: Option<String>,
    #[serde(default)]
    correct_answer: String,
    correct: bool,
    #[serde(default)]
    explanation: Option<String>,
}

/// Accepts a duration that arrives as a JSON number or a numeric string.
/// Anything else maps to `None` and the session default applies.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn map_test_dto(test_id: TestId, dto: TestDto) -> Result<TestPaper, GatewayError> {
    let mut questions = Vec::with_capacity(dto.questions.len());
    for q in dto.questions {
        // Authoring tools sometimes attach an empty options array to
        // true/false and descriptive questions; only Mcq options are real.
        let options = match q.kind {
            QuestionKind::Mcq => q.options,
            _ => Vec::new(),
        };
        let mut question = Question::new(q.text, q.kind, options, q.points)
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        if let Some(url) = q.image_url {
            question = question.with_image_url(url);
        }
        if let Some(explanation) = q.explanation {
            question = question.with_explanation(explanation);
        }
        questions.push(question);
    }

    Ok(TestPaper {
        test_id,
        title: dto.title,
        duration_minutes: dto.duration_minutes,
        questions,
    })
}

fn map_result_dto(dto: ResultDto) -> Result<GradedResult, GatewayError> {
    let mut detailed = BTreeMap::new();
    for (key, detail) in dto.detailed_answers {
        let index: usize = key
            .parse()
            .map_err(|_| GatewayError::Validation(format!("non-numeric answer index: {key}")))?;
        detailed.insert(
            index,
            AnswerDetail {
                question_text: detail.question_text,
                user_answer: normalize_user_answer(detail.user_answer),
                correct_answer: detail.correct_answer,
                correct: detail.correct,
                explanation: detail.explanation,
            },
        );
    }

    GradedResult::from_parts(
        dto.test_title.unwrap_or_default(),
        dto.score,
        dto.total_points,
        dto.percentage,
        dto.correct_answers,
        dto.wrong_answers,
        detailed,
    )
    .map_err(|e| GatewayError::Validation(e.to_string()))
}

/// Maps both a JSON null and the legacy string sentinel to "unanswered".
fn normalize_user_answer(wire: Option<String>) -> Option<String> {
    wire.filter(|answer| answer != NOT_ANSWERED_SENTINEL)
}
