use crate::commands;
use crate::common::CommonParams;
use crate::log_debug;
use crate::providers::Provider;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "scenesmith-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Scenesmith: AI-assisted Manim studio",
    long_about = "Scenesmith generates Manim animation scripts and matching narration scripts from a topic, and ships a small login relay for the hosted chat front-end.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, status messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Generate an animation script and narration script for a topic
    #[command(
        about = "Generate Manim and narration scripts for a topic",
        long_about = "Generate a Manim animation script and a matching narration script for a calculus topic. Prompts for an API key and topic when not supplied.",
        after_help = get_dynamic_help()
    )]
    Generate {
        #[command(flatten)]
        common: CommonParams,

        /// Topic to generate scripts for (prompted interactively when omitted)
        #[arg(short, long, help = "Topic to generate scripts for")]
        topic: Option<String>,

        /// Directory to write the generated files into
        #[arg(
            short,
            long,
            help = "Directory to write the generated files into (defaults to the current directory)"
        )]
        output_dir: Option<PathBuf>,
    },

    /// Start the login relay
    #[command(
        about = "Start the login relay",
        long_about = "Start the HTTP login relay that fronts the OpenID Connect provider. Reads AUTH0_DOMAIN, AUTH0_CLIENT_ID, AUTH0_CLIENT_SECRET and APP_SECRET_KEY from the environment (a .env file is honored)."
    )]
    Serve {
        /// Port to listen on
        #[arg(short, long, help = "Port to listen on", default_value = "3000")]
        port: u16,

        /// Listen address
        #[arg(
            long,
            help = "Listen address (e.g. '127.0.0.1', '0.0.0.0')",
            default_value = "127.0.0.1"
        )]
        listen_address: String,
    },

    /// Configure Scenesmith settings and providers
    #[command(about = "Configure Scenesmith settings and providers")]
    Config {
        #[command(flatten)]
        common: CommonParams,

        /// Set API key for the specified provider
        #[arg(long, help = "Set API key for the specified provider")]
        api_key: Option<String>,

        /// Set additional parameters for the specified provider
        #[arg(
            long,
            help = "Set additional parameters for the specified provider (key=value)"
        )]
        param: Option<Vec<String>>,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Generate dynamic help including available completion providers
fn get_dynamic_help() -> String {
    let providers_list = Provider::all_names()
        .iter()
        .map(|p| format!("{}", p.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable completion providers: {providers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
        crate::logger::init().map_err(|e| anyhow::anyhow!("{e}"))?;
    } else {
        crate::logger::disable_logging();
    }

    // Set quiet mode in the UI module
    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["scenesmith", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand to its handler
async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            common,
            topic,
            output_dir,
        } => {
            log_debug!("Handling 'generate' command with common: {:?}", common);
            commands::handle_generate_command(common, topic, output_dir).await
        }
        Commands::Serve {
            port,
            listen_address,
        } => {
            log_debug!(
                "Handling 'serve' command on {}:{}",
                listen_address,
                port
            );
            commands::handle_serve_command(&listen_address, port).await
        }
        Commands::Config {
            common,
            api_key,
            param,
        } => {
            log_debug!("Handling 'config' command");
            commands::handle_config_command(&common, api_key, param)
        }
    }
}
