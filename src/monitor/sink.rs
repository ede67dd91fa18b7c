use std::sync::Mutex;

use crate::classifier::RiskAssessment;
use crate::error::ClassifyError;
use crate::verdict::{Severity, Verdict};

/// Display surface for results: badge, on-page indicator, popup, terminal.
///
/// Verdicts and deep assessments arrive as independent events for the same
/// target; the sink decides how to show them side by side.
pub trait NotificationSink: Send + Sync {
    fn publish_verdict(&self, target: &str, verdict: &Verdict);

    fn publish_assessment(&self, target: &str, outcome: &Result<RiskAssessment, ClassifyError>);

    fn name(&self) -> &str;
}

/// Badge colour and glyph for a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    pub color: &'static str,
    pub text: &'static str,
}

impl BadgeStyle {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Safe => Self {
                color: "#4CAF50",
                text: "✓",
            },
            Severity::Warning => Self {
                color: "#FF9800",
                text: "!",
            },
            Severity::Illegal => Self {
                color: "#F44336",
                text: "✗",
            },
        }
    }
}

/// Headline shown next to the badge.
pub fn status_text(severity: Severity) -> &'static str {
    match severity {
        Severity::Safe => "Safe Content",
        Severity::Warning => "Warning - Potential Issues",
        Severity::Illegal => "Illegal Content Detected",
    }
}

/// Writes every event through `tracing`.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn publish_verdict(&self, target: &str, verdict: &Verdict) {
        let badge = BadgeStyle::for_severity(verdict.severity);
        tracing::info!(
            target_id = %target,
            severity = %verdict.severity,
            badge = badge.text,
            reasons = ?verdict.reasons,
            "verdict.published"
        );
    }

    fn publish_assessment(&self, target: &str, outcome: &Result<RiskAssessment, ClassifyError>) {
        match outcome {
            Ok(assessment) => tracing::info!(
                target_id = %target,
                tier = %assessment.tier,
                "assessment.published"
            ),
            Err(e) => tracing::info!(target_id = %target, error = %e, "assessment.failed"),
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Verdict {
        target: String,
        verdict: Verdict,
    },
    Assessment {
        target: String,
        outcome: Result<RiskAssessment, ClassifyError>,
    },
}

/// Keeps every published event in memory, in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl NotificationSink for RecordingSink {
    fn publish_verdict(&self, target: &str, verdict: &Verdict) {
        self.push(SinkEvent::Verdict {
            target: target.to_string(),
            verdict: verdict.clone(),
        });
    }

    fn publish_assessment(&self, target: &str, outcome: &Result<RiskAssessment, ClassifyError>) {
        self.push(SinkEvent::Assessment {
            target: target.to_string(),
            outcome: outcome.clone(),
        });
    }

    fn name(&self) -> &str {
        "recording"
    }
}
