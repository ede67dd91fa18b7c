use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `LegalGuard` - legal and safety risk verdicts for web resources.
#[derive(Parser, Debug)]
#[command(name = "legalguard")]
#[command(version)]
#[command(about = "Classify a web resource's legal and safety risk.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.legalguard/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the verdict pipeline against a URL
    Check {
        url: String,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI assessor for a deep content classification
    Classify {
        url: String,

        /// Page text to classify (fetched from the URL when omitted)
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        /// Read the page text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        settings_command: SettingsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print current settings (API key masked)
    Show,

    /// Update individual settings
    Set {
        /// Minimum certificate age in days before warning
        #[arg(long)]
        certificate_min_age: Option<u32>,

        /// Minimum domain registration age in days before warning
        #[arg(long)]
        domain_min_age: Option<u32>,

        /// Enable or disable torrent link detection
        #[arg(long)]
        torrent_detection: Option<bool>,

        /// Replace the registry list (repeatable)
        #[arg(long = "registry")]
        registries: Vec<String>,

        /// Remove all registries
        #[arg(long, conflicts_with = "registries")]
        clear_registries: bool,

        /// Append one registry (repeatable)
        #[arg(long = "add-registry")]
        add_registries: Vec<String>,

        /// Drop a configured registry (repeatable)
        #[arg(long = "remove-registry")]
        remove_registries: Vec<String>,

        /// API key for deep analysis
        #[arg(long)]
        ai_api_key: Option<String>,

        /// Enable or disable deep analysis
        #[arg(long)]
        ai_analysis: Option<bool>,
    },

    /// Restore default settings
    Reset,

    /// Check that the configured AI API key is accepted
    TestApi,
}
