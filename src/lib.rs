#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod http_client;
pub mod monitor;
pub mod security;
pub mod verdict;
pub mod verifiers;

pub use classifier::{DeepContentClassifier, RiskAssessment, RiskTier};
pub use config::{GuardConfig, Settings, SettingsProvider};
pub use error::{ClassifyError, EvaluationError, GuardError, InputError};
pub use monitor::{NotificationSink, PageMonitor};
pub use verdict::{Severity, Verdict, VerdictAggregator};
pub use verifiers::{Verifier, VerifierKind, VerifierResult, VerifierSet};
