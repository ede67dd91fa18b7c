use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use super::types::{Severity, Verdict};
use crate::config::{ServiceConfig, Settings};
use crate::error::{EvaluationError, InputError};
use crate::verifiers::certificate::NO_SSL_REASON;
use crate::verifiers::{Verifier, VerifierKind, VerifierResult, VerifierSet};

/// Runs the verifiers in their fixed order and folds the results into a [`Verdict`].
///
/// Registry and torrent hits are conclusive and end the evaluation. Certificate
/// and domain findings are advisory and accumulate.
#[derive(Clone)]
pub struct VerdictAggregator {
    verifiers: VerifierSet,
    deadline: Duration,
}

impl VerdictAggregator {
    pub fn new(verifiers: VerifierSet, deadline: Duration) -> Self {
        Self {
            verifiers,
            deadline,
        }
    }

    pub fn from_services(services: &ServiceConfig) -> Self {
        Self::new(
            VerifierSet::from_services(services),
            Duration::from_secs(services.verifier_deadline_secs.max(1)),
        )
    }

    /// Evaluate `url` against a settings snapshot.
    ///
    /// Only an unusable URL fails; every verifier problem is absorbed.
    pub async fn evaluate(&self, url: &str, settings: &Settings) -> Result<Verdict, InputError> {
        let target = parse_target(url)?;
        Ok(self.run(&target, settings).await)
    }

    /// Like [`evaluate`](Self::evaluate), but gives up as soon as `cancel` fires.
    pub async fn evaluate_cancellable(
        &self,
        url: &str,
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> Result<Verdict, EvaluationError> {
        let target = parse_target(url)?;
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(EvaluationError::Cancelled),
            verdict = self.run(&target, settings) => Ok(verdict),
        }
    }

    async fn run(&self, target: &Url, settings: &Settings) -> Verdict {
        let mut verdict = Verdict::safe();

        let conclusive = [
            Some(&self.verifiers.registry),
            settings
                .torrent_detection_enabled
                .then_some(&self.verifiers.torrent),
        ];
        for verifier in conclusive.into_iter().flatten() {
            match self.check(verifier.as_ref(), target, settings).await {
                VerifierResult::Triggered(reason) => {
                    verdict.raise(Severity::Illegal, reason);
                    return conclude(target, verdict);
                }
                other => absorb_advisory(&mut verdict, verifier.kind(), other),
            }
        }

        for verifier in [&self.verifiers.certificate, &self.verifiers.domain_age] {
            let result = self.check(verifier.as_ref(), target, settings).await;
            absorb_advisory(&mut verdict, verifier.kind(), result);
        }
        conclude(target, verdict)
    }

    async fn check(
        &self,
        verifier: &dyn Verifier,
        target: &Url,
        settings: &Settings,
    ) -> VerifierResult {
        let kind = verifier.kind();
        let deadline = self
            .deadline
            .saturating_mul(verifier.request_count(settings));
        let pending = verifier.verify(target, settings);
        let result = if let Ok(result) = tokio::time::timeout(deadline, pending).await {
            result
        } else {
            tracing::warn!(
                verifier = %kind,
                url = %target,
                "verifier deadline exceeded, applying fallback"
            );
            verifier.fallback(settings)
        };
        tracing::debug!(verifier = %kind, url = %target, result = ?result, "verifier finished");
        result
    }
}

fn absorb_advisory(verdict: &mut Verdict, kind: VerifierKind, result: VerifierResult) {
    match result {
        VerifierResult::Triggered(reason) => verdict.raise(Severity::Warning, reason),
        VerifierResult::NoSsl => verdict.raise(Severity::Warning, NO_SSL_REASON.into()),
        VerifierResult::Inconclusive {
            assumed_safe: false,
        } => verdict.raise(Severity::Warning, inconclusive_reason(kind)),
        VerifierResult::Clear | VerifierResult::Inconclusive { assumed_safe: true } => {}
    }
}

fn inconclusive_reason(kind: VerifierKind) -> String {
    let label = match kind {
        VerifierKind::Registry => "Illegal content database",
        VerifierKind::Torrent => "Torrent",
        VerifierKind::Certificate => "SSL certificate",
        VerifierKind::DomainAge => "Domain age",
    };
    format!("{label} check was inconclusive")
}

fn conclude(target: &Url, verdict: Verdict) -> Verdict {
    tracing::info!(
        url = %target,
        severity = %verdict.severity,
        reasons = verdict.reasons.len(),
        "verdict"
    );
    verdict
}

/// Accept only absolute http(s) URLs with a host.
pub fn parse_target(raw: &str) -> Result<Url, InputError> {
    let url = Url::parse(raw.trim()).map_err(|source| InputError::Unparseable {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(InputError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(InputError::MissingHost(raw.to_string()));
    }
    Ok(url)
}
