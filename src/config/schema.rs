use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Top-level config ──────────────────────────────────────────────

/// Persisted configuration file: user-facing settings plus service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub services: ServiceConfig,
}

// ── User settings ────────────────────────────────────────────────

/// Thresholds and toggles consumed by every evaluation.
///
/// Treated as an immutable snapshot: the verdict pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Certificates younger than this many days raise a warning (default: 30)
    #[serde(default = "default_certificate_min_age_days")]
    pub certificate_min_age_days: u32,
    /// Domains registered fewer than this many days ago raise a warning (default: 14)
    #[serde(default = "default_domain_min_age_days")]
    pub domain_min_age_days: u32,
    /// Scan page markup for `.torrent` and magnet links (default: true)
    #[serde(default = "default_true")]
    pub torrent_detection_enabled: bool,
    /// Illegal-content registries, queried in order
    #[serde(default = "default_registry_urls")]
    pub registry_urls: Vec<String>,
    /// Key for the deep content classifier; empty means unset
    #[serde(default)]
    pub ai_api_key: String,
    /// Allow user-triggered deep content classification (default: false)
    #[serde(default)]
    pub ai_analysis_enabled: bool,
}

fn default_certificate_min_age_days() -> u32 {
    30
}

fn default_domain_min_age_days() -> u32 {
    14
}

fn default_true() -> bool {
    true
}

fn default_registry_urls() -> Vec<String> {
    vec![
        "https://api.example-blocklist.com/check".into(),
        "https://malware-database.example.com/verify".into(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            certificate_min_age_days: default_certificate_min_age_days(),
            domain_min_age_days: default_domain_min_age_days(),
            torrent_detection_enabled: true,
            registry_urls: default_registry_urls(),
            ai_api_key: String::new(),
            ai_analysis_enabled: false,
        }
    }
}

impl Settings {
    /// Whether the deep classifier has everything it needs.
    pub fn ai_configured(&self) -> bool {
        self.ai_analysis_enabled && !self.ai_api_key.trim().is_empty()
    }

    /// Reject registry entries that are not absolute http(s) URLs.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (index, raw) in self.registry_urls.iter().enumerate() {
            let parsed = url::Url::parse(raw).map_err(|e| {
                ConfigError::Validation(format!("registry_urls[{index}] '{raw}': {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "registry_urls[{index}] '{raw}': scheme must be http or https"
                )));
            }
        }
        Ok(())
    }
}

// ── External services ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Certificate inspection endpoint (SSL Labs analyze API)
    #[serde(default = "default_certificate_service_url")]
    pub certificate_service_url: String,
    /// Domain registration lookup endpoint
    #[serde(default = "default_whois_service_url")]
    pub whois_service_url: String,
    /// Credential for the registration lookup service
    #[serde(default)]
    pub whois_api_key: Option<String>,
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_completion_url")]
    pub completion_url: String,
    /// Model listing endpoint used by the API connection test
    #[serde(default = "default_models_url")]
    pub models_url: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_completion_max_tokens")]
    pub completion_max_tokens: u32,
    /// Page text sent to the classifier is cut to this many characters
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Per-request timeout for verifier HTTP calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
    /// Upper bound on a single verifier, whatever it does internally
    #[serde(default = "default_verifier_deadline_secs")]
    pub verifier_deadline_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_certificate_service_url() -> String {
    "https://api.ssllabs.com/api/v3/analyze".into()
}

fn default_whois_service_url() -> String {
    "https://api.whoisxml.com/api/v1".into()
}

fn default_completion_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

pub(crate) fn default_models_url() -> String {
    "https://api.openai.com/v1/models".into()
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_completion_max_tokens() -> u32 {
    200
}

fn default_max_content_chars() -> usize {
    4000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_completion_timeout_secs() -> u64 {
    30
}

fn default_verifier_deadline_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("LegalGuard/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            certificate_service_url: default_certificate_service_url(),
            whois_service_url: default_whois_service_url(),
            whois_api_key: None,
            completion_url: default_completion_url(),
            models_url: default_models_url(),
            completion_model: default_completion_model(),
            completion_max_tokens: default_completion_max_tokens(),
            max_content_chars: default_max_content_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            completion_timeout_secs: default_completion_timeout_secs(),
            verifier_deadline_secs: default_verifier_deadline_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// ── Loading / persistence ────────────────────────────────────────

impl Default for GuardConfig {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        Self {
            config_path: home.join(".legalguard").join("config.toml"),
            settings: Settings::default(),
            services: ServiceConfig::default(),
        }
    }
}

impl GuardConfig {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let legalguard_dir = home.join(".legalguard");
        let config_path = legalguard_dir.join("config.toml");

        if !legalguard_dir.exists() {
            fs::create_dir_all(&legalguard_dir)
                .context("Failed to create .legalguard directory")?;
        }

        Self::load_or_init_at(&config_path)
    }

    /// Load the config at `path`, writing defaults there first if it is missing.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        if path.exists() {
            let mut config = load_from_path(path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            let mut config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("LEGALGUARD_AI_API_KEY")
            && !key.is_empty()
        {
            self.settings.ai_api_key = key;
        }

        if let Ok(key) = std::env::var("LEGALGUARD_WHOIS_API_KEY")
            && !key.is_empty()
        {
            self.services.whois_api_key = Some(key);
        }

        if let Ok(list) = std::env::var("LEGALGUARD_REGISTRY_URLS") {
            self.settings.registry_urls = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_atomically(&self.config_path, &toml_str)
    }
}

pub(crate) fn load_from_path(path: &Path) -> Result<GuardConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let mut config: GuardConfig = toml::from_str(&contents)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    config.config_path = path.to_path_buf();
    config.settings.validate()?;
    Ok(config)
}

/// Write to a sibling temp file and rename over the target so readers never
/// observe a half-written file.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, contents).context("Failed to write config file")?;
    fs::rename(&tmp, path).context("Failed to replace config file")?;
    Ok(())
}
