use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::types::{CheckFailure, Verifier, VerifierKind, VerifierResult, get_json};
use crate::config::Settings;

pub const REGISTRY_MATCH_REASON: &str = "Domain found in illegal content database";

/// Looks the target up in each configured illegal-content registry, in order.
pub struct RegistryVerifier {
    client: Client,
}

impl RegistryVerifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn query(&self, endpoint: &str, target: &Url) -> Result<bool, CheckFailure> {
        let body: Value = get_json(
            self.client
                .get(endpoint)
                .query(&[("url", target.as_str())]),
        )
        .await?;
        Ok(is_listed(&body))
    }
}

/// A registry reports a match through a truthy `illegal` or `blocked` field.
fn is_listed(body: &Value) -> bool {
    ["illegal", "blocked"]
        .iter()
        .any(|field| body.get(field).is_some_and(is_truthy))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[async_trait]
impl Verifier for RegistryVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::Registry
    }

    async fn verify(&self, url: &Url, settings: &Settings) -> VerifierResult {
        for endpoint in &settings.registry_urls {
            match self.query(endpoint, url).await {
                Ok(true) => {
                    tracing::info!(url = %url, endpoint = %endpoint, "registry match");
                    return VerifierResult::Triggered(REGISTRY_MATCH_REASON.into());
                }
                Ok(false) => {
                    tracing::debug!(url = %url, endpoint = %endpoint, "registry clear");
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "registry check failed");
                }
            }
        }
        VerifierResult::Clear
    }

    fn fallback(&self, _settings: &Settings) -> VerifierResult {
        VerifierResult::Clear
    }

    fn request_count(&self, settings: &Settings) -> u32 {
        u32::try_from(settings.registry_urls.len())
            .unwrap_or(u32::MAX)
            .max(1)
    }
}
