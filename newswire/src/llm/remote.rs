use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};

/// Remote LLM provider using OpenAI-compatible HTTP API
pub struct RemoteLlmProvider {
    base_url: String,
    api_key: Option<String>,
    model: String,
    default_timeout: Duration,
    default_max_tokens: usize,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 200,
            default_temperature: 0.3,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(mut self, timeout_secs: u64, max_tokens: usize, temperature: f32) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    /// Build a provider from the `llm` config section.
    ///
    /// Fails when the section selects no usable adapter or names an API key
    /// variable that is not set; callers treat that as "service unavailable".
    pub fn from_config(llm_config: &common::LlmConfig) -> Result<Self> {
        let adapter = llm_config.adapter.as_deref().unwrap_or("remote");
        match adapter {
            "remote" => {}
            "none" => anyhow::bail!("summarization disabled (llm.adapter = \"none\")"),
            other => anyhow::bail!("unknown LLM adapter type: {}", other),
        }

        let remote = llm_config
            .remote
            .as_ref()
            .context("remote adapter selected but no llm.remote section found")?;

        let api_key = match remote.api_key_env.as_deref() {
            Some(var) => Some(
                std::env::var(var).with_context(|| format!("LLM API key env var '{}' not set", var))?,
            ),
            None => None,
        };

        let api_url = remote
            .api_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434/v1/chat/completions".to_string());
        let model = remote.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(Self::new(api_url, api_key, model).with_defaults(
            remote.timeout_seconds.unwrap_or(30),
            remote.max_tokens.unwrap_or(200),
            0.3,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let timeout = request
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let max_tokens = request.max_tokens.unwrap_or(self.default_max_tokens);
        let temperature = request.temperature.unwrap_or(self.default_temperature);

        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt,
            }],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        };

        let mut builder = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .json(&req_body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = tokio::time::timeout(timeout, builder.send())
            .await
            .context("LLM request timed out")?
            .context("LLM HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, body);
        }

        let resp_body: OpenAiResponse = tokio::time::timeout(timeout, response.json())
            .await
            .context("LLM request timed out")?
            .context("Failed to parse LLM response")?;

        let choice = resp_body
            .choices
            .first()
            .context("LLM response has no choices")?;

        let usage = resp_body
            .usage
            .map(|u| UsageMetadata {
                prompt_tokens: u.prompt_tokens.unwrap_or(0),
                completion_tokens: u.completion_tokens.unwrap_or(0),
                total_tokens: u.total_tokens.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content.clone(),
            usage,
            model: resp_body.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn summarize(&self, content: &str, min_length: usize, max_length: usize) -> Result<String> {
        let prompt = format!(
            "Summarize the following news item in {} to {} words. \
             Reply with the summary only, in the language of the text.\n\n{}",
            min_length, max_length, content
        );

        let request = LlmRequest {
            prompt,
            // words to tokens, with headroom
            max_tokens: Some(max_length * 2),
            temperature: None,
            timeout_seconds: None,
        };

        let response = self.generate(request).await?;
        let summary = response.content.trim().trim_matches('"').trim().to_string();
        if summary.is_empty() {
            anyhow::bail!("LLM returned an empty summary");
        }
        debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "LLM summarization successful: {} tokens",
            response.usage.total_tokens
        );
        Ok(summary)
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<usize>,
    #[serde(default)]
    completion_tokens: Option<usize>,
    #[serde(default)]
    total_tokens: Option<usize>,
}
