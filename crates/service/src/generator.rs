//! Text-generation backends that turn a prompt into notes markup.

use crate::error::{Result, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-pro-latest";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Build the generation prompt for a topic.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate detailed, student-friendly notes on the topic: {topic}.\n\
         Return clean HTML with:\n\
         - <h1> for main title\n\
         - <h2> for sections\n\
         - <h3> for sub-sections\n\
         - <p> for normal text\n\
         - <ul><li> for bullet points (nested allowed)\n\
         - <b> for key terms\n\
         - Use <p><b style='color:red'>NOTE:</b> text</p> for notes\n\
         Do NOT use markdown.\n"
    )
}

/// A backend that answers a prompt with markup text.
///
/// Object-safe so the service can hold an `Arc<dyn NoteGenerator>`.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Connection settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Without a key every request fails with [`ServiceError::Generation`].
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Full `generateContent` URL, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model.trim()
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// [`NoteGenerator`] backed by the Gemini REST API.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Generation(format!("HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl NoteGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ServiceError::Generation("GEMINI_API_KEY is not set".to_string()))?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        log::debug!("Requesting notes from model '{}'", self.config.model);
        let resp = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Generation(format!("Request: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ServiceError::Generation(format!("Response: {}", e)))?;
        if !status.is_success() {
            return Err(ServiceError::Generation(format!("API {}: {}", status, text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::Generation(format!("JSON: {}", e)))?;
        parsed
            .text()
            .ok_or_else(|| ServiceError::Generation("No text in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_topic_and_note_format() {
        let prompt = build_prompt("Photosynthesis");
        assert!(prompt.contains("topic: Photosynthesis."));
        assert!(prompt.contains("<p><b style='color:red'>NOTE:</b> text</p>"));
        assert!(prompt.contains("Do NOT use markdown."));
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig {
            api_url: "https://example.test/v1beta/".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(
            config.endpoint(),
            "https://example.test/v1beta/models/gemini-pro-latest:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"<h1>A</h1>"},{"text":"<p>b</p>"}]}},
                {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text().as_deref(), Some("<h1>A</h1><p>b</p>"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
        let missing: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.text(), None);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = GeminiClient::new(GeminiConfig::default()).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ServiceError::Generation(msg) if msg.contains("GEMINI_API_KEY")));
    }
}
