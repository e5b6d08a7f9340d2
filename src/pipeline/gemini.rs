//! Gemini HTTP client for hosted text+document generation.
//!
//! One request shape covers every stage: a system instruction, a user
//! prompt, and optionally the source PDF inlined as base64. The client is
//! behind the [`GenerativeClient`] trait so orchestrators stay fully
//! testable with [`MockGenerativeClient`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::LlmError;

/// Default hosted model, matching the production deployment.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// One generation request: system instruction, prompt, optional PDF bytes.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system: String,
    pub prompt: String,
    /// Raw PDF bytes; the client inlines them as base64 `application/pdf`.
    pub pdf: Option<Vec<u8>>,
}

/// Text+document generation backend.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Run one generation call and return the raw response text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError>;
}

/// HTTP client for the Gemini `generateContent` API.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: &str, api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model, api_key)
    }

    /// Point the client at a different host (used by tests and proxies).
    pub fn with_base_url(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── Wire types for generateContent ─────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let mut parts = vec![GeminiPart::Text {
            text: request.prompt,
        }];
        if let Some(pdf) = request.pdf {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: "application/pdf".to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(pdf),
                },
            });
        }

        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: request.system,
                }],
            },
            contents: vec![GeminiContent { parts }],
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else {
                LlmError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Mock generation backend — returns queued responses and records requests.
pub struct MockGenerativeClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockGenerativeClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn respond_with(self, response: &str) -> Self {
        self.push_response(response);
        self
    }

    pub fn push_response(&self, response: &str) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response.to_string()));
    }

    /// Queue a failure for the next call.
    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(message.to_string()));
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockGenerativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeClient for MockGenerativeClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        match self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::HttpClient(message)),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_queued_responses_in_order() {
        let mock = MockGenerativeClient::new();
        mock.push_response("first");
        mock.push_response("second");

        let request = GenerateRequest {
            system: "sys".into(),
            prompt: "p".into(),
            pdf: None,
        };
        assert_eq!(mock.generate(request.clone()).await.unwrap(), "first");
        assert_eq!(mock.generate(request).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn mock_records_requests() {
        let mock = MockGenerativeClient::new().respond_with("ok");
        let request = GenerateRequest {
            system: "translate".into(),
            prompt: "analyze this".into(),
            pdf: Some(vec![1, 2, 3]),
        };
        mock.generate(request).await.unwrap();

        let seen = mock.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "analyze this");
        assert_eq!(seen[0].pdf.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[tokio::test]
    async fn mock_queued_failure_surfaces_as_error() {
        let mock = MockGenerativeClient::new();
        mock.push_failure("quota exceeded");

        let err = mock
            .generate(GenerateRequest {
                system: String::new(),
                prompt: String::new(),
                pdf: None,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::with_base_url("http://localhost:9090/", "m", "k");
        assert_eq!(client.base_url, "http://localhost:9090");
    }

    #[test]
    fn default_model_is_flash() {
        let client = GeminiClient::new(DEFAULT_MODEL, "key");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn request_serializes_inline_pdf_as_base64() {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: "sys".into(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text {
                        text: "prompt".into(),
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: "application/pdf".into(),
                            data: base64::engine::general_purpose::STANDARD.encode(b"%PDF-"),
                        },
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "{\"a\":1}");
    }
}
