use crate::classifier::RiskAssessment;
use crate::config::Settings;
use crate::error::ClassifyError;
use crate::monitor::{BadgeStyle, LogSink, NotificationSink, status_text};
use crate::verdict::Verdict;

pub fn render_verdict(url: &str, verdict: &Verdict) -> String {
    let badge = BadgeStyle::for_severity(verdict.severity);
    let mut lines = vec![format!(
        "{} {}  {url}",
        badge.text,
        status_text(verdict.severity)
    )];
    for reason in &verdict.reasons {
        lines.push(format!("  • {reason}"));
    }
    lines.join("\n")
}

pub fn render_assessment(outcome: &Result<RiskAssessment, ClassifyError>) -> String {
    match outcome {
        Ok(assessment) => format!(
            "AI Analysis: {} RISK\n{}\n({})",
            assessment.tier.to_string().to_uppercase(),
            assessment.explanation,
            assessment.timestamp.to_rfc3339()
        ),
        Err(e) => e.to_string(),
    }
}

pub fn render_settings(settings: &Settings) -> String {
    let key = if settings.ai_api_key.is_empty() {
        "(not set)".to_string()
    } else {
        mask_secret(&settings.ai_api_key)
    };
    let mut lines = vec![
        format!("certificate_min_age_days   {}", settings.certificate_min_age_days),
        format!("domain_min_age_days        {}", settings.domain_min_age_days),
        format!("torrent_detection_enabled  {}", settings.torrent_detection_enabled),
        format!("ai_analysis_enabled        {}", settings.ai_analysis_enabled),
        format!("ai_api_key                 {key}"),
        format!("registry_urls              ({})", settings.registry_urls.len()),
    ];
    for url in &settings.registry_urls {
        lines.push(format!("  - {url}"));
    }
    lines.join("\n")
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}

/// Prints published results to stdout, as text or JSON, and logs them.
pub struct ConsoleSink {
    json: bool,
    log: LogSink,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json, log: LogSink }
    }
}

impl NotificationSink for ConsoleSink {
    fn publish_verdict(&self, target: &str, verdict: &Verdict) {
        self.log.publish_verdict(target, verdict);
        if self.json {
            match serde_json::to_string_pretty(verdict) {
                Ok(out) => println!("{out}"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize verdict"),
            }
        } else {
            println!("{}", render_verdict(target, verdict));
        }
    }

    fn publish_assessment(&self, target: &str, outcome: &Result<RiskAssessment, ClassifyError>) {
        self.log.publish_assessment(target, outcome);
        if self.json {
            let value = match outcome {
                Ok(assessment) => serde_json::to_value(assessment).unwrap_or_default(),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
            println!("{value:#}");
        } else {
            println!("{}", render_assessment(outcome));
        }
    }

    fn name(&self) -> &str {
        "console"
    }
}
