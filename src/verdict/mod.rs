pub mod aggregator;
pub mod types;

pub use aggregator::{VerdictAggregator, parse_target};
pub use types::{Severity, Verdict};
