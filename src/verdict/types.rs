use serde::{Deserialize, Serialize};

/// Totally ordered: `Safe < Warning < Illegal`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    #[default]
    Safe,
    Warning,
    Illegal,
}

/// Result of one evaluation: the strongest severity reached and the reasons
/// collected on the way, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub severity: Severity,
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn safe() -> Self {
        Self::default()
    }

    /// A conclusive verdict carrying exactly one reason.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Illegal,
            reasons: vec![reason.into()],
        }
    }

    /// Record a reason and lift severity to at least `floor`. Never lowers it.
    pub(crate) fn raise(&mut self, floor: Severity, reason: String) {
        self.severity = self.severity.max(floor);
        self.reasons.push(reason);
    }
}
