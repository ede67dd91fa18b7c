use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `LegalGuard`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide what to show the user; application glue continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GuardError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Verdict pipeline ────────────────────────────────────────────────
    #[error("evaluation: {0}")]
    Evaluation(#[from] EvaluationError),

    // ── Deep content classification ─────────────────────────────────────
    #[error("classification: {0}")]
    Classify(#[from] ClassifyError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Input errors ────────────────────────────────────────────────────────────

/// The target URL cannot be evaluated at all.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid URL '{url}': {source}")]
    Unparseable {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL '{0}' has no host")]
    MissingHost(String),

    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
}

// ─── Evaluation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// The caller withdrew interest before the verdict was ready.
    #[error("evaluation cancelled")]
    Cancelled,
}

// ─── Classification errors ───────────────────────────────────────────────────

/// Outcomes of a deep analysis request that are not a risk tier.
///
/// The `Display` text is meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("AI analysis not configured")]
    NotConfigured,

    #[error("AI analysis failed: {0}")]
    Failed(String),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GuardError>;
