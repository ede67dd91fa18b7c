use std::sync::Arc;

use chrono::Utc;

use super::provider::{CompletionProvider, OpenAiProvider};
use super::types::{RiskAssessment, RiskTier};
use crate::config::{ServiceConfig, Settings};
use crate::error::ClassifyError;
use crate::security::redact_secret;

pub const SYSTEM_PROMPT: &str = "You are a content legality assessment tool. Analyze the provided \
website content and determine if it contains illegal content. Respond with one of: \"high\" \
(illegal content), \"medium\" (questionable/potentially illegal), or \"low\" (legal content). \
Provide a brief explanation.";

/// On-demand second opinion from a generative risk assessor.
///
/// Runs only when the user asks for it and never feeds into a verdict.
#[derive(Clone)]
pub struct DeepContentClassifier {
    provider: Arc<dyn CompletionProvider>,
    max_content_chars: usize,
}

impl DeepContentClassifier {
    pub fn new(provider: Arc<dyn CompletionProvider>, max_content_chars: usize) -> Self {
        Self {
            provider,
            max_content_chars,
        }
    }

    pub fn from_services(services: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(OpenAiProvider::from_services(services)),
            services.max_content_chars,
        )
    }

    pub async fn classify(
        &self,
        url: &str,
        page_text: &str,
        settings: &Settings,
    ) -> Result<RiskAssessment, ClassifyError> {
        if !settings.ai_configured() {
            return Err(ClassifyError::NotConfigured);
        }
        let api_key = settings.ai_api_key.trim();

        let message = build_user_message(url, page_text, self.max_content_chars);
        let reply = self
            .provider
            .chat_with_system(api_key, Some(SYSTEM_PROMPT), &message)
            .await
            .map_err(|e| {
                let detail = redact_secret(&format!("{e:#}"), api_key);
                tracing::warn!(url = %url, error = %detail, "deep analysis failed");
                ClassifyError::Failed(detail)
            })?;

        let tier = RiskTier::from_reply(&reply);
        tracing::info!(url = %url, tier = %tier, "deep analysis complete");
        Ok(RiskAssessment {
            tier,
            explanation: reply,
            timestamp: Utc::now(),
        })
    }
}

fn build_user_message(url: &str, page_text: &str, max_chars: usize) -> String {
    let content: String = page_text.chars().take(max_chars).collect();
    format!("URL: {url}\n\nContent: {content}")
}
