//! chatdock CLI: terminal chat assistant backed by Gemini

use chatdock_engine::{
    config::ENV_API_KEY,
    Config, ConfigError, ConversationController, GeminiClient, Rejection, SubmitOutcome,
};
use chatdock_tui::App;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Terminal chat assistant backed by Gemini
#[derive(Parser)]
#[command(name = "chatdock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (default: .chatdock/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one prompt and print the reply
    Ask {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Output the exchange as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,

    /// Print the resolved configuration and check that a client can be built
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

const LOG_FILE: &str = "chatdock.log";

/// Where log lines go.
enum LogTarget {
    Stderr,
    File(PathBuf),
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(Path::new(".")));

    match cli.command {
        None | Some(Commands::Tui) => {
            init_logging(cli.verbose, &LogTarget::File(log_path(&config_path)));
            cmd_tui(&config_path);
        }
        Some(Commands::Ask { prompt, json }) => {
            init_logging(cli.verbose, &LogTarget::Stderr);
            cmd_ask(&config_path, &prompt.join(" "), json);
        }
        Some(Commands::Init) => {
            init_logging(cli.verbose, &LogTarget::Stderr);
            cmd_init(&config_path);
        }
        Some(Commands::Doctor { json }) => {
            init_logging(cli.verbose, &LogTarget::Stderr);
            cmd_doctor(&config_path, json);
        }
    }
}

/// The TUI log file lives next to the config file.
fn log_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(LOG_FILE)
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,chatdock=debug,chatdock_engine=debug,chatdock_tui=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool, target: &LogTarget) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let registry = tracing_subscriber::registry().with(filter);
    match target {
        LogTarget::Stderr => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogTarget::File(path) => {
            let file = path
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|()| OpenOptions::new().create(true).append(true).open(path));
            match file {
                Ok(file) => registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_target(true)
                            .with_ansi(false)
                            .with_writer(Mutex::new(file)),
                    )
                    .init(),
                // Logging must never draw over the TUI, so drop it instead
                Err(e) => {
                    eprintln!("Warning: cannot open log file {}: {e}", path.display());
                    registry
                        .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
                        .init();
                }
            }
        }
    }
}

fn exit_with(message: impl Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(path: &Path) -> Config {
    match Config::load_or_default(path) {
        Ok(config) => config.with_env(),
        Err(e) => exit_with(format!("failed to load {}: {e}", path.display())),
    }
}

fn build_controller(config: &Config) -> ConversationController {
    match GeminiClient::from_config(config) {
        Ok(client) => ConversationController::new(Arc::new(client)).with_timeout(config.timeout()),
        Err(e @ ConfigError::MissingApiKey) => {
            exit_with(format!("{e}\nRun `chatdock init` to create a config file."))
        }
        Err(e) => exit_with(e),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap_or_else(|e| exit_with(format!("tokio runtime: {e}")))
}

fn cmd_tui(config_path: &Path) {
    let config = load_config(config_path);
    let controller = build_controller(&config);
    let app = App::new(controller)
        .with_panel_open(config.start_open)
        .with_model(config.model.clone());

    if let Err(e) = runtime().block_on(chatdock_tui::run_tui(app)) {
        exit_with(e);
    }
}

fn cmd_ask(config_path: &Path, prompt: &str, json: bool) {
    let config = load_config(config_path);
    let mut controller = build_controller(&config);
    controller.update_draft(prompt);

    let outcome = runtime().block_on(controller.submit());
    let conversation = controller.conversation();
    debug!(conversation = %conversation.id(), ?outcome, "ask finished");

    let outcome_label = match outcome {
        SubmitOutcome::Replied => "replied",
        SubmitOutcome::Fallback => "fallback",
        SubmitOutcome::Ignored(Rejection::BlankDraft) => exit_with("prompt is blank"),
        SubmitOutcome::Ignored(Rejection::Pending | Rejection::ForeignTicket) => {
            exit_with("a request is already pending")
        }
    };

    if json {
        let report = json!({
            "conversation": conversation.id().to_string(),
            "outcome": outcome_label,
            "messages": conversation.transcript(),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => exit_with(e),
        }
        return;
    }

    if let Some(reply) = conversation.transcript().last() {
        println!("{}", reply.text());
    }
}

fn cmd_init(config_path: &Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    if let Err(e) = Config::default().save(config_path) {
        exit_with(format!("failed to write {}: {e}", config_path.display()));
    }
    println!("Created {}", config_path.display());
    println!();
    println!("Set {ENV_API_KEY} or add \"api_key\" to the file, then run `chatdock`.");
}

fn cmd_doctor(config_path: &Path, json: bool) {
    let file_exists = config_path.exists();
    let config = load_config(config_path);
    let client = GeminiClient::from_config(&config).map(|_| ());
    let timeout = config
        .timeout()
        .map_or_else(|| "none".to_string(), |t| format!("{}s", t.as_secs()));

    if json {
        let report = json!({
            "config_path": config_path.display().to_string(),
            "config_file_exists": file_exists,
            "model": config.model,
            "endpoint": config.endpoint,
            "timeout": timeout,
            "start_open": config.start_open,
            "api_key": if config.has_api_key() { "set" } else { "missing" },
            "client_ready": client.is_ok(),
            "error": client.as_ref().err().map(ToString::to_string),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => exit_with(e),
        }
        return;
    }

    println!("chatdock {}\n", env!("CARGO_PKG_VERSION"));
    let file_note = if file_exists { "" } else { " (not found, using defaults)" };
    println!("  Config:     {}{file_note}", config_path.display());
    println!("  Model:      {}", config.model);
    println!("  Endpoint:   {}", config.endpoint);
    println!("  Timeout:    {timeout}");
    println!("  Start open: {}", config.start_open);
    println!(
        "  API key:    {}",
        if config.has_api_key() { "set" } else { "missing" }
    );
    println!();

    match client {
        Ok(()) => println!("Ready"),
        Err(e) => println!("Not ready: {e}"),
    }
}
