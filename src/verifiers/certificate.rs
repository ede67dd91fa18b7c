use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::age::{age_in_days, judge_age, judge_assumed_age};
use super::types::{CheckFailure, Verifier, VerifierKind, VerifierResult, get_json};
use crate::config::Settings;

pub const NO_SSL_REASON: &str = "No SSL certificate detected";

pub fn young_certificate_reason(age_days: i64) -> String {
    format!("SSL certificate is only {age_days} days old")
}

/// Ages the leaf certificate via an SSL Labs style inspection service.
pub struct CertificateVerifier {
    client: Client,
    service_url: String,
}

// SSL Labs `analyze` report, trimmed to the fields we read.
#[derive(Debug, Deserialize)]
struct AnalyzeReport {
    status: Option<String>,
    #[serde(default)]
    endpoints: Vec<EndpointReport>,
}

#[derive(Debug, Deserialize)]
struct EndpointReport {
    details: Option<EndpointDetails>,
}

#[derive(Debug, Deserialize)]
struct EndpointDetails {
    cert: Option<CertSummary>,
}

#[derive(Debug, Deserialize)]
struct CertSummary {
    /// Unix seconds
    #[serde(rename = "notBefore")]
    not_before: i64,
}

impl CertificateVerifier {
    pub fn new(client: Client, service_url: impl Into<String>) -> Self {
        Self {
            client,
            service_url: service_url.into(),
        }
    }

    async fn issued_at(&self, host: &str) -> Result<DateTime<Utc>, CheckFailure> {
        let report: AnalyzeReport = get_json(
            self.client
                .get(&self.service_url)
                .query(&[("host", host), ("fromCache", "on")]),
        )
        .await?;

        if report.status.as_deref() != Some("READY") {
            return Err(CheckFailure::Protocol(format!(
                "report not ready (status {})",
                report.status.as_deref().unwrap_or("missing")
            )));
        }

        let not_before = report
            .endpoints
            .first()
            .and_then(|ep| ep.details.as_ref())
            .and_then(|details| details.cert.as_ref())
            .map(|cert| cert.not_before)
            .ok_or_else(|| CheckFailure::Protocol("no certificate in report".into()))?;

        DateTime::from_timestamp(not_before, 0)
            .ok_or_else(|| CheckFailure::Protocol(format!("notBefore out of range: {not_before}")))
    }
}

#[async_trait]
impl Verifier for CertificateVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::Certificate
    }

    async fn verify(&self, url: &Url, settings: &Settings) -> VerifierResult {
        if url.scheme() != "https" {
            return VerifierResult::NoSsl;
        }
        let Some(host) = url.host_str() else {
            return self.fallback(settings);
        };

        match self.issued_at(host).await {
            Ok(issued) => {
                let age = age_in_days(issued, Utc::now());
                tracing::debug!(host = %host, age_days = age, "certificate age");
                judge_age(age, settings.certificate_min_age_days, young_certificate_reason)
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "certificate check failed, assuming old certificate");
                self.fallback(settings)
            }
        }
    }

    fn fallback(&self, settings: &Settings) -> VerifierResult {
        judge_assumed_age(settings.certificate_min_age_days, young_certificate_reason)
    }
}
