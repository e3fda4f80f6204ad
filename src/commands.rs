use crate::common::CommonParams;
use crate::config::Config;
use crate::generate::ScriptService;
use crate::log_debug;
use crate::providers::Provider;
use crate::relay::{AppState, OidcClient, RelayConfig, SessionStore, serve};
use crate::ui;
use anyhow::{Result, anyhow};
use colored::Colorize;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Friendlier messages for the three failure shapes the generation phase
/// knows about; anything else passes through as raw error text.
pub fn describe_generation_error(error: &anyhow::Error) -> String {
    let text = format!("{error:#}");
    let lower = text.to_lowercase();

    if lower.contains("api_key") || lower.contains("api key") {
        "There's a problem with your API key. Check your credentials and try again.".to_string()
    } else if lower.contains("rate limit") {
        "The provider is rate limiting requests. Wait a moment and try again.".to_string()
    } else if lower.contains("timeout") {
        "The request timed out. Check your network connection and try again.".to_string()
    } else {
        text
    }
}

/// Resolve an API key for the run: environment first, then stored config,
/// then the given prompt source. Returns `false` when the run should end
/// because the prompted key was empty; nothing has touched the network at
/// that point.
pub fn acquire_api_key(
    config: &mut Config,
    provider: Provider,
    mut prompt: impl FnMut(&str) -> Result<String>,
) -> Result<bool> {
    if !provider.requires_api_key() || config.resolve_api_key(provider).is_some() {
        return Ok(true);
    }

    let entered = prompt(&format!(
        "Enter your {} API key: ",
        provider.name().bold()
    ))?;
    if entered.is_empty() {
        ui::print_warning("No API key provided. Nothing to do.");
        return Ok(false);
    }

    let save = prompt("Save this key for future runs? [y/N]: ")?;
    if save.eq_ignore_ascii_case("y") {
        config.store_api_key(provider, &entered)?;
        ui::print_success("API key saved.");
    } else {
        // Keep it for this run only
        config.update(None, Some(entered), None, None)?;
    }
    Ok(true)
}

/// Handle the `generate` command: credential, topic, two generation calls,
/// two output files, one suggested follow-up command.
pub async fn handle_generate_command(
    common: CommonParams,
    topic: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load()?;
    common.apply_to_config(&mut config)?;
    let provider = config.provider()?;

    if !acquire_api_key(&mut config, provider, prompt_line)? {
        return Ok(());
    }

    let topic = match topic {
        Some(t) => t,
        None => prompt_line("Topic to animate: ")?,
    };
    let topic = topic.trim().to_string();
    if topic.is_empty() {
        ui::print_warning("No topic provided. Nothing to do.");
        return Ok(());
    }

    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
    let service = ScriptService::new(config, provider, &output_dir);

    let spinner = ui::create_spinner(&format!("Generating scripts for '{topic}'..."));
    let outcome = match service.run(&topic).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_and_clear();
            log_debug!("Generation failed: {:#}", e);
            return Err(anyhow!(describe_generation_error(&e)));
        }
    };
    spinner.finish_and_clear();

    ui::print_success(&format!(
        "Wrote {}",
        outcome.animation_path.display()
    ));
    ui::print_success(&format!(
        "Wrote {}",
        outcome.narration_path.display()
    ));
    ui::print_newline();
    ui::print_info(&format!("Scene class: {}", outcome.scene_name));
    ui::print_message(&format!(
        "Render it with: {}",
        outcome.suggested_command.bold()
    ));

    Ok(())
}

/// Handle the `serve` command: start the login relay
pub async fn handle_serve_command(listen_address: &str, port: u16) -> Result<()> {
    // Match the original deployment: secrets come from the environment, with
    // a .env file honored when present
    dotenvy::dotenv().ok();
    crate::logger::init().map_err(|e| anyhow!("{e}"))?;

    let addr: SocketAddr = format!("{listen_address}:{port}")
        .parse()
        .map_err(|e| anyhow!("Invalid listen address: {e}"))?;

    let relay_config = RelayConfig::from_env(&format!("http://{addr}"))?;
    let sessions = Arc::new(SessionStore::new(relay_config.secret_key.clone()));

    ui::print_info(&format!(
        "Starting login relay for {} on {addr}",
        relay_config.domain
    ));

    let oidc = OidcClient::discover(relay_config).await?;
    let state = AppState {
        oidc: Arc::new(oidc),
        sessions,
    };

    serve(state, addr).await
}

/// Handle the `config` command
pub fn handle_config_command(
    common: &CommonParams,
    api_key: Option<String>,
    param: Option<Vec<String>>,
) -> Result<()> {
    let mut config = Config::load()?;
    let mut changes_made = common.apply_to_config(&mut config)?;

    if api_key.is_some() || param.is_some() {
        let additional_params = param.map(|p| parse_additional_params(&p));
        config.update(None, api_key, None, additional_params)?;
        changes_made = true;
    }

    if changes_made {
        config.save()?;
        ui::print_success("Configuration updated.");
    }

    print_configuration(&config);
    Ok(())
}

/// Parse additional parameters from the command line (key=value pairs)
fn parse_additional_params(params: &[String]) -> HashMap<String, String> {
    params
        .iter()
        .filter_map(|param| {
            param
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Print the current configuration with API keys masked
fn print_configuration(config: &Config) {
    ui::print_message(&format!(
        "Default provider: {}",
        config.default_provider.bold()
    ));
    for (name, provider_config) in &config.providers {
        let key_status = if provider_config.has_api_key() {
            "set".green()
        } else {
            "not set".yellow()
        };
        ui::print_message(&format!(
            "  {name}: model={}, api_key={key_status}",
            provider_config.model
        ));
    }
}

/// Read one trimmed line from stdin after printing a prompt
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
