// Upstream text-generation capability.
// The pipeline only sees the trait; the Gemini client is one implementation
// so tests (and alternate providers) swap in without touching pipeline logic.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Opaque prompt → text capability.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_BASE_URL}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl ScriptGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 2048,
            }
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");

        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .context("Gemini returned a non-JSON response")?;

        if !status.is_success() {
            return Err(anyhow!("Gemini error {}: {}", status, payload));
        }

        extract_text(&payload)
    }
}

fn extract_text(payload: &Value) -> Result<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("Gemini response carried no generated text"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "test('x', () => {});" }] }
            }],
            "usageMetadata": { "totalTokenCount": 42 }
        });
        assert_eq!(extract_text(&payload).unwrap(), "test('x', () => {});");
    }

    #[test]
    fn missing_candidates_is_an_error() {
        let payload = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_text(&payload).unwrap_err();
        assert!(err.to_string().contains("no generated text"));
    }

    #[test]
    fn endpoint_embeds_model() {
        let generator =
            GeminiGenerator::new("k".to_string(), "gemini-1.5-flash".to_string()).unwrap();
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
