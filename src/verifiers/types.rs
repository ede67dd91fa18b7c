use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::Settings;
use crate::security::sanitize_error;

/// Outcome of one verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierResult {
    /// The signal fired; the reason is shown to the user as-is.
    Triggered(String),
    Clear,
    /// The external call failed and the verifier fell back to an assumption.
    Inconclusive { assumed_safe: bool },
    /// The page is not served over TLS, so there is no certificate to age.
    NoSsl,
}

impl VerifierResult {
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum VerifierKind {
    Registry,
    Torrent,
    Certificate,
    DomainAge,
}

/// Contract shared by every external signal check.
///
/// `verify` must not fail: transport, parse and timeout problems are absorbed
/// inside the verifier and turned into its documented fallback.
#[async_trait]
pub trait Verifier: Send + Sync {
    fn kind(&self) -> VerifierKind;

    async fn verify(&self, url: &Url, settings: &Settings) -> VerifierResult;

    /// Result the aggregator substitutes if `verify` overruns its deadline.
    fn fallback(&self, settings: &Settings) -> VerifierResult;

    /// Sequential outbound requests one `verify` may make. The aggregator
    /// grants one deadline per request.
    fn request_count(&self, _settings: &Settings) -> u32 {
        1
    }
}

/// Why an external call did not produce a usable answer.
///
/// Never leaves the verifier that produced it.
#[derive(Debug, Error)]
pub(crate) enum CheckFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Protocol(String),

    #[error("not configured: {0}")]
    Unconfigured(&'static str),
}

impl From<reqwest::Error> for CheckFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Protocol(sanitize_error(&err.to_string()))
        } else {
            Self::Transport(sanitize_error(&err.to_string()))
        }
    }
}

/// Send a GET and decode the JSON body, mapping every failure to [`CheckFailure`].
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CheckFailure> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CheckFailure::Status(status));
    }
    Ok(response.json::<T>().await?)
}
