use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Derive a tier from the assessor's free-text reply.
    ///
    /// Plain substring search, `high` before `medium`, anything else `low`.
    /// Known weakness: a justification that merely mentions "high" (e.g.
    /// "highly unlikely") is read as high risk.
    pub fn from_reply(reply: &str) -> Self {
        let lowered = reply.to_lowercase();
        if lowered.contains("high") {
            Self::High
        } else if lowered.contains("medium") {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Outcome of one deep content classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// The assessor's reply, verbatim.
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
}
