use std::time::Duration;

use tokio_util::sync::CancellationToken;

use legalguard::config::Settings;
use legalguard::error::{EvaluationError, InputError};
use legalguard::verdict::{Severity, Verdict, VerdictAggregator};
use legalguard::verifiers::{VerifierKind, VerifierResult};

use crate::harness::{FakeVerifier, Fakes, triggered};

const URL: &str = "https://shop.example/item/1";

fn settings_variants() -> Vec<Settings> {
    vec![
        Settings::default(),
        Settings {
            torrent_detection_enabled: false,
            ..Settings::default()
        },
        Settings {
            certificate_min_age_days: 0,
            domain_min_age_days: 10_000,
            registry_urls: vec![],
            ..Settings::default()
        },
    ]
}

#[tokio::test]
async fn registry_hit_is_illegal_and_stops_everything() {
    for settings in settings_variants() {
        let fakes = Fakes::new(
            triggered("Domain found in illegal content database"),
            triggered("Torrent files detected on the website"),
            triggered("SSL certificate is only 1 days old"),
            triggered("Domain registered only 1 days ago"),
        );

        let verdict = fakes.aggregator().evaluate(URL, &settings).await.unwrap();

        assert_eq!(
            verdict,
            Verdict::illegal("Domain found in illegal content database")
        );
        assert_eq!(fakes.registry.calls(), 1);
        assert_eq!(fakes.total_calls(), 1);
    }
}

#[tokio::test]
async fn torrent_hit_is_illegal_and_skips_advisory_checks() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        triggered("Torrent files detected on the website"),
        VerifierResult::NoSsl,
        triggered("Domain registered only 1 days ago"),
    );

    let verdict = fakes
        .aggregator()
        .evaluate(URL, &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Illegal);
    assert_eq!(verdict.reasons, vec!["Torrent files detected on the website"]);
    assert_eq!(fakes.certificate.calls(), 0);
    assert_eq!(fakes.domain_age.calls(), 0);
}

#[tokio::test]
async fn disabled_torrent_detection_never_invokes_torrent_verifier() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        triggered("Torrent files detected on the website"),
        VerifierResult::Clear,
        VerifierResult::Clear,
    );
    let settings = Settings {
        torrent_detection_enabled: false,
        ..Settings::default()
    };

    let verdict = fakes.aggregator().evaluate(URL, &settings).await.unwrap();

    assert_eq!(verdict, Verdict::safe());
    assert_eq!(fakes.torrent.calls(), 0);
    assert_eq!(fakes.certificate.calls(), 1);
    assert_eq!(fakes.domain_age.calls(), 1);
}

#[tokio::test]
async fn certificate_and_domain_warnings_accumulate_in_check_order() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        VerifierResult::Clear,
        triggered("SSL certificate is only 5 days old"),
        triggered("Domain registered only 3 days ago"),
    );

    let verdict = fakes
        .aggregator()
        .evaluate(URL, &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(
        verdict.reasons,
        vec![
            "SSL certificate is only 5 days old",
            "Domain registered only 3 days ago"
        ]
    );
}

#[tokio::test]
async fn missing_tls_is_a_warning() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        VerifierResult::Clear,
        VerifierResult::NoSsl,
        VerifierResult::Clear,
    );

    let verdict = fakes
        .aggregator()
        .evaluate("http://shop.example/", &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(verdict.reasons, vec!["No SSL certificate detected"]);
}

#[tokio::test]
async fn failed_lookups_that_assume_old_age_stay_safe() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        VerifierResult::Clear,
        VerifierResult::Inconclusive { assumed_safe: true },
        VerifierResult::Inconclusive { assumed_safe: true },
    );

    let verdict = fakes
        .aggregator()
        .evaluate(URL, &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::safe());
    assert!(verdict.reasons.is_empty());
}

#[tokio::test]
async fn unparseable_url_fails_without_running_checks() {
    let fakes = Fakes::all_clear();

    let err = fakes
        .aggregator()
        .evaluate("::not a url::", &Settings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, InputError::Unparseable { .. }));
    assert_eq!(fakes.total_calls(), 0);
}

#[tokio::test]
async fn verifier_overrunning_deadline_gets_its_fallback() {
    let fakes = Fakes::all_clear();
    let slow_cert = FakeVerifier::slow(
        VerifierKind::Certificate,
        triggered("SSL certificate is only 1 days old"),
        Duration::from_secs(30),
    );
    let mut set = fakes.set();
    set.certificate = slow_cert.clone();
    let aggregator = VerdictAggregator::new(set, Duration::from_millis(50));

    let verdict = aggregator.evaluate(URL, &Settings::default()).await.unwrap();

    assert_eq!(verdict, Verdict::safe());
    assert_eq!(slow_cert.calls(), 1);
    assert_eq!(fakes.domain_age.calls(), 1);
}

#[tokio::test]
async fn cancellation_abandons_the_evaluation() {
    let fakes = Fakes::all_clear();
    let slow_registry = FakeVerifier::slow(
        VerifierKind::Registry,
        VerifierResult::Clear,
        Duration::from_secs(30),
    );
    let mut set = fakes.set();
    set.registry = slow_registry;
    let aggregator = VerdictAggregator::new(set, Duration::from_secs(60));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = aggregator
        .evaluate_cancellable(URL, &Settings::default(), &cancel)
        .await;

    assert!(matches!(result, Err(EvaluationError::Cancelled)));
    assert_eq!(fakes.certificate.calls(), 0);
}

#[tokio::test]
async fn concurrent_evaluations_are_independent() {
    let fakes = Fakes::new(
        VerifierResult::Clear,
        VerifierResult::Clear,
        VerifierResult::NoSsl,
        VerifierResult::Clear,
    );
    let aggregator = fakes.aggregator();
    let strict = Settings {
        torrent_detection_enabled: false,
        ..Settings::default()
    };
    let default = Settings::default();

    let (a, b) = tokio::join!(
        aggregator.evaluate("http://a.example/", &strict),
        aggregator.evaluate("http://b.example/", &default),
    );

    assert_eq!(a.unwrap().severity, Severity::Warning);
    assert_eq!(b.unwrap().severity, Severity::Warning);
    assert_eq!(fakes.torrent.calls(), 1);
    assert_eq!(fakes.registry.calls(), 2);
}

#[tokio::test]
async fn inconclusive_registry_or_torrent_result_warns() {
    let fakes = Fakes::new(
        VerifierResult::Inconclusive {
            assumed_safe: false,
        },
        VerifierResult::Inconclusive {
            assumed_safe: false,
        },
        VerifierResult::Clear,
        VerifierResult::Clear,
    );

    let verdict = fakes
        .aggregator()
        .evaluate(URL, &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(
        verdict.reasons,
        vec![
            "Illegal content database check was inconclusive",
            "Torrent check was inconclusive"
        ]
    );
    assert_eq!(fakes.certificate.calls(), 1);
    assert_eq!(fakes.domain_age.calls(), 1);
}

#[tokio::test]
async fn torrent_hit_after_inconclusive_registry_keeps_both_reasons() {
    let fakes = Fakes::new(
        VerifierResult::Inconclusive {
            assumed_safe: false,
        },
        triggered("Torrent files detected on the website"),
        VerifierResult::Clear,
        VerifierResult::Clear,
    );

    let verdict = fakes
        .aggregator()
        .evaluate(URL, &Settings::default())
        .await
        .unwrap();

    assert_eq!(verdict.severity, Severity::Illegal);
    assert_eq!(
        verdict.reasons,
        vec![
            "Illegal content database check was inconclusive",
            "Torrent files detected on the website"
        ]
    );
    assert_eq!(fakes.certificate.calls(), 0);
}
