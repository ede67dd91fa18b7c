use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use super::render::{ConsoleSink, render_settings};
use crate::classifier::{
    DeepContentClassifier, OpenAiProvider, RiskAssessment, extract_page_text,
};
use crate::cli::{Cli, Commands, SettingsCommands};
use crate::config::{FileSettingsProvider, GuardConfig, Settings, SettingsProvider};
use crate::error::ClassifyError;
use crate::http_client::build_verifier_client;
use crate::monitor::{Delivery, PageMonitor};
use crate::verdict::{VerdictAggregator, parse_target};

/// Run one CLI command.
///
/// Outcomes the sink or the command already printed map to a non-zero exit
/// code instead of an error, so nothing is reported twice.
pub async fn dispatch(cli: Cli, config: GuardConfig) -> Result<ExitCode> {
    match cli.command {
        Commands::Check { url, json } => run_check(&config, &url, json).await,
        Commands::Classify {
            url,
            text,
            text_file,
            json,
        } => {
            let outcome = classify_page(&config, &url, text, text_file, json).await?;
            Ok(exit_code(outcome.is_ok()))
        }
        Commands::Settings { settings_command } => {
            run_settings(&config, settings_command).await
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn effective_settings(config: &GuardConfig) -> FileSettingsProvider {
    FileSettingsProvider::new(&config.config_path).with_env_overrides()
}

fn build_monitor(config: &GuardConfig, json: bool) -> PageMonitor {
    PageMonitor::new(
        VerdictAggregator::from_services(&config.services),
        DeepContentClassifier::from_services(&config.services),
        Arc::new(effective_settings(config)),
        Arc::new(ConsoleSink::new(json)),
    )
}

async fn run_check(config: &GuardConfig, url: &str, json: bool) -> Result<ExitCode> {
    let monitor = build_monitor(config, json);
    // One invocation, one page: the URL doubles as the display target.
    match monitor.page_loaded(url, url).await? {
        Delivery::Delivered(_) => Ok(ExitCode::SUCCESS),
        Delivery::Discarded => bail!("evaluation was superseded before completing"),
    }
}

/// Classify a page and publish the outcome through the console sink.
///
/// The page is only fetched once deep analysis is known to be configured;
/// otherwise the classifier reports the configuration error directly.
async fn classify_page(
    config: &GuardConfig,
    url: &str,
    text: Option<String>,
    text_file: Option<PathBuf>,
    json: bool,
) -> Result<Result<RiskAssessment, ClassifyError>> {
    let configured = effective_settings(config).load()?.ai_configured();

    let page_text = match (text, text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) if !configured => String::new(),
        (None, None) => {
            let target = parse_target(url)?;
            let client = build_verifier_client(&config.services);
            extract_page_text(&client, &target)
                .await
                .with_context(|| format!("failed to fetch page text from {url}"))?
                .text
        }
    };

    let monitor = build_monitor(config, json);
    Ok(monitor.deep_analysis(url, url, &page_text).await)
}

async fn run_settings(config: &GuardConfig, command: SettingsCommands) -> Result<ExitCode> {
    let provider = FileSettingsProvider::new(&config.config_path);
    match command {
        SettingsCommands::Show => {
            let settings = provider.load()?;
            println!("{}", render_settings(&settings));
            println!("\nconfig: {}", provider.path().display());
        }
        SettingsCommands::Set {
            certificate_min_age,
            domain_min_age,
            torrent_detection,
            registries,
            clear_registries,
            add_registries,
            remove_registries,
            ai_api_key,
            ai_analysis,
        } => {
            let mut settings = provider.load()?;
            if let Some(days) = certificate_min_age {
                settings.certificate_min_age_days = days;
            }
            if let Some(days) = domain_min_age {
                settings.domain_min_age_days = days;
            }
            if let Some(enabled) = torrent_detection {
                settings.torrent_detection_enabled = enabled;
            }
            edit_registries(
                &mut settings,
                RegistryEdits {
                    replace: registries,
                    clear: clear_registries,
                    add: add_registries,
                    remove: remove_registries,
                },
            )?;
            if let Some(key) = ai_api_key {
                settings.ai_api_key = key;
            }
            if let Some(enabled) = ai_analysis {
                settings.ai_analysis_enabled = enabled;
            }
            provider.save(&settings)?;
            println!("{}", render_settings(&settings));
        }
        SettingsCommands::Reset => {
            provider.save(&Settings::default())?;
            println!("Settings restored to defaults.");
        }
        SettingsCommands::TestApi => {
            let settings = effective_settings(config).load()?;
            let provider = OpenAiProvider::from_services(&config.services);
            return Ok(match provider.test_connection(&settings.ai_api_key).await {
                Ok(()) => {
                    println!("API connection successful");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!("API test failed: {e}");
                    ExitCode::FAILURE
                }
            });
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Default)]
struct RegistryEdits {
    replace: Vec<String>,
    clear: bool,
    add: Vec<String>,
    remove: Vec<String>,
}

/// Clear or replace first, then append, then remove.
fn edit_registries(settings: &mut Settings, edits: RegistryEdits) -> Result<()> {
    if edits.clear {
        settings.registry_urls.clear();
    } else if !edits.replace.is_empty() {
        settings.registry_urls = edits.replace;
    }

    for url in edits.add {
        let url = url.trim().to_string();
        if url.is_empty() {
            bail!("registry URL must not be empty");
        }
        if !settings.registry_urls.contains(&url) {
            settings.registry_urls.push(url);
        }
    }

    for url in edits.remove {
        let url = url.trim();
        let before = settings.registry_urls.len();
        settings.registry_urls.retain(|existing| existing != url);
        if settings.registry_urls.len() == before {
            bail!("registry '{url}' is not configured");
        }
    }
    Ok(())
}
