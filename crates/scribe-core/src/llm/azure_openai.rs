//! Chat Completions client for an Azure OpenAI deployment.
//!
//! The deployment is addressed by URL and authenticated with an `api-key`
//! header; the model is whatever the deployment serves.

use super::{Prompt, TextGenerator};
use crate::config::OpenAiConfig;
use crate::error::GenerationServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Chat-completion client bound to one deployment.
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment_name: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
    timeout: Duration,
}

impl AzureOpenAiClient {
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            deployment_name: config.deployment_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment_name
        )
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl TextGenerator for AzureOpenAiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationServiceError> {
        let start = Instant::now();

        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GenerationServiceError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationServiceError::Http {
                status_code: status.as_u16(),
                body,
            });
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerationServiceError::InvalidResponse(e.to_string()))?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerationServiceError::EmptyCompletion)?;

        tracing::debug!(
            "Generated {} chars with {} in {:?} ({} tokens)",
            text.len(),
            self.deployment_name,
            start.elapsed(),
            chat_resp
                .usage
                .map(|u| u.total_tokens.to_string())
                .unwrap_or_else(|| "?".to_string())
        );

        Ok(text)
    }
}
