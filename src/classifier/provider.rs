use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::config::schema::default_models_url;
use crate::http_client::build_completion_client;
use crate::security::sanitize_error;

/// A chat-style text generation backend.
///
/// The key is passed per call because it lives in the user's settings, which
/// are re-read for every request.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn chat_with_system(
        &self,
        api_key: &str,
        system_prompt: Option<&str>,
        message: &str,
    ) -> anyhow::Result<String>;
}

/// Speaks the OpenAI chat completions API.
pub struct OpenAiProvider {
    client: Client,
    completion_url: String,
    models_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(
        client: Client,
        completion_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            completion_url: completion_url.into(),
            models_url: default_models_url(),
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_services(services: &ServiceConfig) -> Self {
        Self::new(
            build_completion_client(services),
            services.completion_url.clone(),
            services.completion_model.clone(),
            services.completion_max_tokens,
        )
        .with_models_url(services.models_url.clone())
    }

    pub fn with_models_url(mut self, models_url: impl Into<String>) -> Self {
        self.models_url = models_url.into();
        self
    }

    /// Check that the service accepts `api_key` by listing its models.
    pub async fn test_connection(&self, api_key: &str) -> anyhow::Result<()> {
        if api_key.trim().is_empty() {
            anyhow::bail!("API key not configured");
        }

        let response = self
            .client
            .get(&self.models_url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {}", sanitize_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status.as_u16());
        }
        Ok(())
    }

    fn build_request(&self, system_prompt: Option<&str>, message: &str) -> ChatRequest {
        let capacity = if system_prompt.is_some() { 2 } else { 1 };
        let mut messages = Vec::with_capacity(capacity);

        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn chat_with_system(
        &self,
        api_key: &str,
        system_prompt: Option<&str>,
        message: &str,
    ) -> anyhow::Result<String> {
        let request = self.build_request(system_prompt, message);

        let response = self
            .client
            .post(&self.completion_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {}", sanitize_error(&e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            anyhow::bail!("API error ({status}): {}", sanitize_error(&body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("completion JSON decode failed")?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("no completion in response"))
    }
}
