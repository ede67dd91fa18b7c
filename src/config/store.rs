use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema::{GuardConfig, Settings, load_from_path};

/// Source of the current [`Settings`].
///
/// `load` is called once per request so every evaluation sees the latest
/// saved configuration. The verdict pipeline never calls `save`; that belongs
/// to whatever edits the settings (the CLI `settings` command here).
pub trait SettingsProvider: Send + Sync {
    fn load(&self) -> anyhow::Result<Settings>;

    fn save(&self, settings: &Settings) -> anyhow::Result<()>;
}

/// Reads `config.toml` from disk on every `load`.
///
/// Saves go through write-then-rename, so a concurrent `load` sees either the
/// old file or the new one, never a torn write.
pub struct FileSettingsProvider {
    path: PathBuf,
    env_overrides: bool,
}

impl FileSettingsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_overrides: false,
        }
    }

    /// Layer `LEGALGUARD_*` environment overrides over every loaded snapshot.
    ///
    /// Leave this off for providers used to edit the file, or the overrides
    /// get persisted on the next save.
    pub fn with_env_overrides(mut self) -> Self {
        self.env_overrides = true;
        self
    }

    /// Config file path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn load(&self) -> anyhow::Result<Settings> {
        let mut config = load_from_path(&self.path)?;
        if self.env_overrides {
            config.apply_env_overrides();
        }
        Ok(config.settings)
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        settings.validate()?;
        let mut config = if self.path.exists() {
            load_from_path(&self.path)?
        } else {
            GuardConfig {
                config_path: self.path.clone(),
                ..GuardConfig::default()
            }
        };
        config.settings = settings.clone();
        config.save()?;
        tracing::info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// In-memory settings holder.
///
/// Wraps `Settings` in an `ArcSwap` so readers never block and writers
/// atomically swap the pointer.
pub struct SharedSettings {
    inner: Arc<ArcSwap<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    /// Current snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<Settings> {
        self.inner.load_full()
    }

    /// Manually swap in new settings.
    pub fn store(&self, settings: Settings) {
        self.inner.store(Arc::new(settings));
    }
}

impl Clone for SharedSettings {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsProvider for SharedSettings {
    fn load(&self) -> anyhow::Result<Settings> {
        Ok(Settings::clone(&self.snapshot()))
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        settings.validate()?;
        self.store(settings.clone());
        Ok(())
    }
}
