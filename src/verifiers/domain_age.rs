use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::age::{age_in_days, judge_age, judge_assumed_age, parse_timestamp};
use super::types::{CheckFailure, Verifier, VerifierKind, VerifierResult, get_json};
use crate::config::Settings;

pub fn young_domain_reason(age_days: i64) -> String {
    format!("Domain registered only {age_days} days ago")
}

/// Ages the domain registration through a WHOIS lookup service.
pub struct DomainAgeVerifier {
    client: Client,
    service_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhoisResponse {
    #[serde(rename = "WhoisRecord")]
    whois_record: Option<WhoisRecord>,
}

#[derive(Debug, Deserialize)]
struct WhoisRecord {
    #[serde(rename = "createdDate")]
    created_date: Option<String>,
}

impl DomainAgeVerifier {
    pub fn new(client: Client, service_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            service_url: service_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn registered_at(&self, host: &str) -> Result<DateTime<Utc>, CheckFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CheckFailure::Unconfigured("registration lookup API key"))?;

        let response: WhoisResponse = get_json(
            self.client
                .get(&self.service_url)
                .query(&[("apiKey", api_key), ("domainName", host)]),
        )
        .await?;

        let raw = response
            .whois_record
            .and_then(|record| record.created_date)
            .ok_or_else(|| CheckFailure::Protocol("no createdDate in record".into()))?;

        parse_timestamp(&raw)
            .ok_or_else(|| CheckFailure::Protocol(format!("unrecognised createdDate '{raw}'")))
    }
}

#[async_trait]
impl Verifier for DomainAgeVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::DomainAge
    }

    async fn verify(&self, url: &Url, settings: &Settings) -> VerifierResult {
        let Some(host) = url.host_str() else {
            return self.fallback(settings);
        };

        match self.registered_at(host).await {
            Ok(created) => {
                let age = age_in_days(created, Utc::now());
                tracing::debug!(host = %host, age_days = age, "domain age");
                judge_age(age, settings.domain_min_age_days, young_domain_reason)
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "domain age check failed, assuming old domain");
                self.fallback(settings)
            }
        }
    }

    fn fallback(&self, settings: &Settings) -> VerifierResult {
        judge_assumed_age(settings.domain_min_age_days, young_domain_reason)
    }
}
