//! HTTP adapter for hosted text-classification models.
//!
//! Speaks the common inference protocol: `POST {"inputs": "..."}` answered by
//! `[{"label": .., "score": ..}]`, optionally wrapped in one more list.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::classifier::{ClassificationResult, Classifier};
use crate::error::ClassifierError;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

/// Which neutral default the adapter reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Sentiment,
    Emotion,
}

/// Classifier backed by a remote inference endpoint.
pub struct HttpClassifier {
    name: String,
    endpoint: String,
    token: Option<String>,
    kind: ClassifierKind,
    client: Client,
}

impl HttpClassifier {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        token: Option<String>,
        kind: ClassifierKind,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            token,
            kind,
            client,
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(classifier = %self.name, %status, "Inference response received");

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ClassifierError::Unavailable(format!(
                "{} is loading or offline",
                self.endpoint
            )));
        }
        if !status.is_success() {
            return Err(ClassifierError::Transport(format!(
                "{} answered {}",
                self.endpoint, status
            )));
        }

        let body: InferenceResponse = response.json().await?;
        ClassificationResult::from_scores(
            body.into_scores().into_iter().map(|s| (s.label, s.score)),
        )
        .ok_or_else(|| ClassifierError::InvalidResponse("empty label distribution".to_string()))
    }

    fn neutral_default(&self) -> ClassificationResult {
        match self.kind {
            ClassifierKind::Sentiment => ClassificationResult::neutral_sentiment(),
            ClassifierKind::Emotion => ClassificationResult::neutral_emotion(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn classifier(server: &MockServer, token: Option<&str>) -> HttpClassifier {
        HttpClassifier::new(
            "remote-sentiment",
            format!("{}/classify", server.uri()),
            token.map(|t| t.to_string()),
            ClassifierKind::Sentiment,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_parses_nested_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_json(serde_json::json!({"inputs": "nice work"})))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                {"label": "POSITIVE", "score": 0.9},
                {"label": "NEGATIVE", "score": 0.1}
            ]])))
            .mount(&server)
            .await;

        let result = classifier(&server, Some("secret")).classify("nice work").await.unwrap();
        assert_eq!(result.label, "POSITIVE");
        assert_eq!(result.score("NEGATIVE"), 0.1);
    }

    #[tokio::test]
    async fn test_parses_flat_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"label": "anger", "score": 0.2},
                {"label": "joy", "score": 0.8}
            ])))
            .mount(&server)
            .await;

        let result = classifier(&server, None).classify("yay").await.unwrap();
        assert_eq!(result.label, "joy");
    }

    #[tokio::test]
    async fn test_service_unavailable_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = classifier(&server, None).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = classifier(&server, None).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Transport(_)));
    }

    #[tokio::test]
    async fn test_empty_distribution_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = classifier(&server, None).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse(_)));
    }
}
