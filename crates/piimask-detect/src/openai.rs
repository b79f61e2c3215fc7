//! Detector backed by an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use piimask_core::LlmSettings;
use piimask_engine::Detection;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::detector::{BoxedDetection, Detector};
use crate::error::{DetectError, Result};
use crate::parse::parse_detections;
use crate::prompt::{extraction_prompt, system_prompt};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extracts PII by prompting a chat model and parsing its JSON answer.
#[derive(Clone)]
pub struct OpenAiDetector {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    timeout_secs: u64,
}

impl OpenAiDetector {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DetectError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout_secs: settings.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, text: &str, pii_types: &[String]) -> Result<Vec<Detection>> {
        if pii_types.is_empty() {
            return Err(DetectError::Config("No PII types defined in configuration".into()));
        }

        let user_prompt = extraction_prompt(text, pii_types);
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt(),
                },
                Message {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!("Requesting detections from {} with model {}", self.endpoint, self.model);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DetectError::Timeout(self.timeout_secs)
            } else {
                DetectError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Detector API error {}: {}", status, body);
            return Err(DetectError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| DetectError::Parse(format!("unreadable completion: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DetectError::Parse("completion has no message content".into()))?;

        parse_detections(&content)
    }
}

impl Detector for OpenAiDetector {
    fn name(&self) -> &str {
        "openai"
    }

    fn detect<'a>(&'a self, text: &'a str, pii_types: &'a [String]) -> BoxedDetection<'a> {
        Box::pin(self.extract(text, pii_types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> LlmSettings {
        LlmSettings {
            base_url: format!("{}/v1", server.uri()),
            api_key: Some("sk-test".into()),
            model: "gpt-test".into(),
            timeout_secs: 5,
            temperature: 0.0,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn types() -> Vec<String> {
        vec!["email".to_string()]
    }

    #[tokio::test]
    async fn test_extract_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-test", "temperature": 0.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "```json\n[{\"pii\": \"alice@example.com\", \"type\": \"email\"}]\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let detector = OpenAiDetector::new(&settings(&server)).unwrap();
        let found = detector
            .detect("Hello alice@example.com", &types())
            .await
            .unwrap();
        assert_eq!(found, vec![Detection::new("alice@example.com", "email")]);
    }

    #[tokio::test]
    async fn test_api_error_bubbles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let detector = OpenAiDetector::new(&settings(&server)).unwrap();
        let err = detector.detect("hello", &types()).await.unwrap_err();
        assert!(matches!(err, DetectError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_missing_content_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let detector = OpenAiDetector::new(&settings(&server)).unwrap();
        let err = detector.detect("hello", &types()).await.unwrap_err();
        assert!(matches!(err, DetectError::Parse(_)));
    }

    #[tokio::test]
    async fn test_no_pii_types() {
        let server = MockServer::start().await;
        let detector = OpenAiDetector::new(&settings(&server)).unwrap();
        let err = detector.detect("hello", &[]).await.unwrap_err();
        assert!(matches!(err, DetectError::Config(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("[]"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut settings = settings(&server);
        settings.timeout_secs = 1;
        let detector = OpenAiDetector::new(&settings).unwrap();
        let err = detector.detect("hello", &types()).await.unwrap_err();
        assert!(matches!(err, DetectError::Timeout(1)));
    }
}
