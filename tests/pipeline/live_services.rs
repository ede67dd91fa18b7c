//! Real verifiers against mocked lookup services.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use legalguard::config::Settings;
use legalguard::http_client::build_client;
use legalguard::verdict::{Severity, Verdict, VerdictAggregator};
use legalguard::verifiers::{
    CertificateVerifier, DomainAgeVerifier, RegistryVerifier, VerifierKind, VerifierResult,
    VerifierSet,
};

use crate::harness::FakeVerifier;

const TARGET: &str = "https://shop.example/catalog";
const DAY_SECS: i64 = 86_400;

struct Services {
    registry: MockServer,
    certificate: MockServer,
    whois: MockServer,
}

impl Services {
    async fn start() -> Self {
        Self {
            registry: MockServer::start().await,
            certificate: MockServer::start().await,
            whois: MockServer::start().await,
        }
    }

    // Torrent slot is a fake: the target page itself is not reachable here.
    fn verifier_set(&self, timeout_secs: u64) -> VerifierSet {
        let client = build_client("LegalGuard/test", timeout_secs);
        VerifierSet {
            registry: Arc::new(RegistryVerifier::new(client.clone())),
            torrent: FakeVerifier::new(VerifierKind::Torrent, VerifierResult::Clear),
            certificate: Arc::new(CertificateVerifier::new(
                client.clone(),
                format!("{}/analyze", self.certificate.uri()),
            )),
            domain_age: Arc::new(DomainAgeVerifier::new(
                client,
                format!("{}/whois", self.whois.uri()),
                Some("whois-key".into()),
            )),
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            registry_urls: vec![format!("{}/check", self.registry.uri())],
            ..Settings::default()
        }
    }
}

fn certificate_report(age_days: i64) -> serde_json::Value {
    json!({
        "status": "READY",
        "endpoints": [{
            "details": { "cert": { "notBefore": Utc::now().timestamp() - age_days * DAY_SECS } }
        }]
    })
}

fn whois_record(age_days: i64) -> serde_json::Value {
    let created = Utc::now() - chrono::Duration::days(age_days);
    json!({ "WhoisRecord": { "createdDate": created.to_rfc3339() } })
}

#[tokio::test]
async fn young_certificate_on_old_domain_warns_once() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "illegal": false })))
        .expect(1)
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .and(path("/analyze"))
        .and(query_param("host", "shop.example"))
        .respond_with(ResponseTemplate::new(200).set_body_json(certificate_report(5)))
        .mount(&services.certificate)
        .await;
    Mock::given(method("GET"))
        .and(path("/whois"))
        .and(query_param("domainName", "shop.example"))
        .and(query_param("apiKey", "whois-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(whois_record(400)))
        .mount(&services.whois)
        .await;

    let aggregator = VerdictAggregator::new(services.verifier_set(5), Duration::from_secs(10));
    let verdict = aggregator.evaluate(TARGET, &services.settings()).await.unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(verdict.reasons, vec!["SSL certificate is only 5 days old"]);
}

#[tokio::test]
async fn registry_match_skips_certificate_and_domain_lookups() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blocked": true })))
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(certificate_report(1)))
        .expect(0)
        .mount(&services.certificate)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(whois_record(1)))
        .expect(0)
        .mount(&services.whois)
        .await;

    let aggregator = VerdictAggregator::new(services.verifier_set(5), Duration::from_secs(10));
    let verdict = aggregator.evaluate(TARGET, &services.settings()).await.unwrap();

    assert_eq!(
        verdict,
        Verdict::illegal("Domain found in illegal content database")
    );
}

#[tokio::test]
async fn unreachable_lookups_fail_open_to_safe() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(certificate_report(1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&services.certificate)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&services.whois)
        .await;

    let aggregator = VerdictAggregator::new(services.verifier_set(1), Duration::from_secs(10));
    let verdict = aggregator.evaluate(TARGET, &services.settings()).await.unwrap();

    assert_eq!(verdict, Verdict::safe());
}

#[tokio::test]
async fn strict_threshold_turns_failed_lookups_into_warnings() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&services.certificate)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&services.whois)
        .await;
    let settings = Settings {
        certificate_min_age_days: 400,
        domain_min_age_days: 400,
        ..services.settings()
    };

    let aggregator = VerdictAggregator::new(services.verifier_set(5), Duration::from_secs(10));
    let verdict = aggregator.evaluate(TARGET, &settings).await.unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(
        verdict.reasons,
        vec![
            "SSL certificate is only 365 days old",
            "Domain registered only 365 days ago"
        ]
    );
}

#[tokio::test]
async fn plain_http_target_reports_missing_certificate_without_lookup() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(certificate_report(1)))
        .expect(0)
        .mount(&services.certificate)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(whois_record(1000)))
        .mount(&services.whois)
        .await;

    let aggregator = VerdictAggregator::new(services.verifier_set(5), Duration::from_secs(10));
    let verdict = aggregator
        .evaluate("http://shop.example/catalog", &services.settings())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(verdict.reasons, vec!["No SSL certificate detected"]);
}

#[tokio::test]
async fn slow_registries_do_not_starve_a_later_match() {
    let services = Services::start().await;
    for slow in ["/slow-a", "/slow-b"] {
        Mock::given(method("GET"))
            .and(path(slow))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "illegal": false }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&services.registry)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "illegal": true })))
        .expect(1)
        .mount(&services.registry)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(certificate_report(1)))
        .expect(0)
        .mount(&services.certificate)
        .await;
    let settings = Settings {
        registry_urls: ["/slow-a", "/slow-b", "/hit"]
            .iter()
            .map(|p| format!("{}{p}", services.registry.uri()))
            .collect(),
        ..Settings::default()
    };

    // Each call may take the full 1s client timeout; the deadline is per call.
    let aggregator = VerdictAggregator::new(services.verifier_set(1), Duration::from_millis(1500));
    let verdict = aggregator.evaluate(TARGET, &settings).await.unwrap();

    assert_eq!(
        verdict,
        Verdict::illegal("Domain found in illegal content database")
    );
}
