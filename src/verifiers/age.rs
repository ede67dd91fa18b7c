//! Day arithmetic shared by the certificate and domain verifiers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::types::VerifierResult;

/// Age assumed when the lookup service cannot tell us.
pub const ASSUMED_AGE_DAYS: i64 = 365;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days elapsed from `since` to `now`, rounded toward negative infinity.
pub fn age_in_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Strictly younger than the threshold triggers; equal does not.
pub fn judge_age(
    age_days: i64,
    min_age_days: u32,
    reason: impl Fn(i64) -> String,
) -> VerifierResult {
    if age_days < i64::from(min_age_days) {
        VerifierResult::Triggered(reason(age_days))
    } else {
        VerifierResult::Clear
    }
}

/// Outcome when the lookup failed: [`ASSUMED_AGE_DAYS`] goes through the same
/// comparison, and only a non-triggering assumption reads as inconclusive.
pub fn judge_assumed_age(min_age_days: u32, reason: impl Fn(i64) -> String) -> VerifierResult {
    match judge_age(ASSUMED_AGE_DAYS, min_age_days, reason) {
        VerifierResult::Clear => VerifierResult::Inconclusive { assumed_safe: true },
        triggered => triggered,
    }
}

/// Parse a registration or issuance date in the formats lookup services emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
