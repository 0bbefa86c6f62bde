//! Ollama HTTP client for grounded answer generation.
//!
//! Uses the Ollama API at /api/generate with streaming disabled, sending the
//! grounding instructions as the system prompt.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompt::{user_prompt, SYSTEM_PROMPT};

/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Ollama generation client.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client with specified URL and model.
    pub fn new(base_url: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `query` from the knowledge-graph `context` only.
    pub async fn answer(&self, query: &str, context: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            system: SYSTEM_PROMPT,
            prompt: user_prompt(context, query),
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({}): {}", status, body);
        }

        let result: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        debug!(model = %self.model, chars = result.response.len(), "Generated answer");

        Ok(result.response.trim().to_string())
    }

    /// Check if the Ollama service is healthy and the model is available.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let text = resp.text().await.unwrap_or_default();
                Ok(text.contains(&self.model))
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://ollama:11434/", "mistral");
        assert_eq!(client.base_url, "http://ollama:11434");
        assert_eq!(client.model(), "mistral");
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            model: "mistral",
            system: SYSTEM_PROMPT,
            prompt: user_prompt("ctx", "q"),
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["model"], "mistral");
        assert!(json["system"].as_str().unwrap().contains("ONLY"));
        assert!(json["prompt"].as_str().unwrap().ends_with("ANSWER:"));
    }
}
