pub mod scrub;

pub use scrub::{redact_secret, sanitize_error, scrub_secret_patterns};
