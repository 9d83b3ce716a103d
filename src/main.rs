use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use askcmd::config::{self, ConfigStore};
use askcmd::history::HistoryStore;
use askcmd::llm::{LlmClient, LlmOptions};
use askcmd::shell::ShellKind;
use askcmd::{clipboard, display};

const ABOUT: &str = "LLM-powered CLI command discovery";

#[derive(Parser)]
#[command(name = "askcmd", version, about = ABOUT, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a command from a natural language query
    Query {
        /// Natural language query for a command
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Explain what a command does in detail
    Explain {
        /// The command to explain; falls back to the clipboard, then to the
        /// last generated command
        text: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show history of previous queries and commands
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show the last query and command and copy the command to the clipboard
    Last,
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration (API key masked)
    Show,
    /// Set a value, e.g. `config set MODEL=gpt-4o-mini`
    Set {
        /// KEY=VALUE pair
        pair: String,
    },
    /// Reset all settings to their defaults
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recent entries, newest first
    Show {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete all entries
    Clear,
}

const SUBCOMMANDS: [&str; 7] = [
    "query", "explain", "config", "history", "last", "version", "help",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli = if implicit_query(&args) {
        Cli {
            command: Commands::Query {
                text: args[1..].to_vec(),
            },
        }
    } else {
        Cli::parse()
    };

    let config_dir = config::config_dir()?;
    let config = ConfigStore::new(&config_dir);
    let history = HistoryStore::new(&config_dir, &config.get(config::SHELL));

    match cli.command {
        Commands::Query { text } => run_query(&config, &history, &text.join(" ")).await,
        Commands::Explain { text } => run_explain(&config, &history, text).await,
        Commands::Config { action } => run_config(&config, action),
        Commands::History { action } => run_history(&history, action),
        Commands::Last => run_last(&history),
        Commands::Version => {
            println!("{}", format!("v{}", env!("CARGO_PKG_VERSION")).cyan().bold());
            println!("askcmd - {}", ABOUT);
            Ok(())
        }
    }
}

/// An unrecognized first token is an implicit `query`, with every argument
/// joined as the natural-language text.
fn implicit_query(args: &[String]) -> bool {
    match args.get(1) {
        Some(first) => !first.starts_with('-') && !SUBCOMMANDS.contains(&first.as_str()),
        None => false,
    }
}

async fn connect_client(config: &ConfigStore) -> LlmClient {
    let api_key = config.get(config::OPENAI_KEY);
    if api_key.is_empty() {
        display::error("OpenAI API key not configured.");
        println!("Set it using: askcmd config set OPENAI_KEY=your-key");
        process::exit(1);
    }

    let model = config.get(config::MODEL);
    let shell = ShellKind::from_name(&config.get(config::SHELL));

    match LlmClient::connect(&api_key, &model, shell, LlmOptions::default()).await {
        Ok(client) => client,
        Err(e) => {
            display::error(&e.to_string());
            process::exit(1);
        }
    }
}

async fn run_query(config: &ConfigStore, history: &HistoryStore, query: &str) -> Result<()> {
    let client = connect_client(config).await;

    display::info("Give me a second...");
    let command = match client.generate_command(query).await {
        Ok(command) => command,
        Err(e) => {
            display::error(&format!("Error: {}", e));
            process::exit(1);
        }
    };

    display::command(&command);
    history.add(query, &command, false)?;

    match clipboard::copy(&command) {
        Ok(()) => display::success("Command copied to clipboard. Press Ctrl+V to use it."),
        Err(_) => display::error("Failed to copy to clipboard"),
    }
    Ok(())
}

async fn run_explain(
    config: &ConfigStore,
    history: &HistoryStore,
    text: Option<String>,
) -> Result<()> {
    let command = match resolve_explain_target(history, text) {
        Some(command) => command,
        None => {
            display::error("No command to explain: pass one, or generate one first.");
            process::exit(1);
        }
    };

    let client = connect_client(config).await;
    let explanation = match client.explain_command(&command).await {
        Ok(explanation) => explanation,
        Err(e) => {
            display::error(&format!("Error: {}", e));
            process::exit(1);
        }
    };

    println!("{}", explanation);
    history.add(&command, "", true)?;
    Ok(())
}

/// Explicit fallback chain: the argument, then the clipboard contents, then
/// the most recent generated command.
fn resolve_explain_target(history: &HistoryStore, text: Option<String>) -> Option<String> {
    if let Some(text) = text {
        let text = text.trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }
    if let Ok(pasted) = clipboard::paste() {
        let pasted = pasted.trim().to_string();
        if !pasted.is_empty() {
            return Some(pasted);
        }
    }
    history
        .get_last_command()
        .filter(|command| !command.is_empty())
}

fn run_config(config: &ConfigStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.show());
        }
        ConfigAction::Set { pair } => {
            let Some((key, value)) = pair.split_once('=') else {
                display::error("Use format: askcmd config set KEY=VALUE");
                process::exit(1);
            };
            let key = key.trim().to_uppercase();
            let value = value.trim();

            if let Some(message) = config::secret_key_warning(&key, value) {
                display::warning(&format!("Warning: {}", message));
            }

            match config.set(&key, value) {
                Ok(()) => display::success(&format!("{} set successfully", key)),
                Err(config::ConfigError::UnknownKey(key)) => {
                    display::error(&format!("Unknown config key: {}", key));
                    println!(
                        "Available keys: {}",
                        ConfigStore::keys().collect::<Vec<_>>().join(", ")
                    );
                    process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        ConfigAction::Clear => {
            if display::prompt_yes_no("Clear all configuration?", false)? {
                config.clear()?;
                display::success("Configuration cleared");
            } else {
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}

fn run_history(history: &HistoryStore, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::Show { limit } => {
            let entries = history.get_all(limit);
            if entries.is_empty() {
                display::info("No history yet.");
                return Ok(());
            }

            println!();
            for (i, entry) in entries.iter().enumerate() {
                let timestamp: String = entry.timestamp.chars().take(16).collect();
                println!("{}. [{}] {}", i + 1, timestamp, entry.query);
                display::command(&entry.command);
                println!();
            }
        }
        HistoryAction::Clear => {
            if display::prompt_yes_no("Clear all history?", false)? {
                history.clear()?;
                display::success("History cleared");
            } else {
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}

fn run_last(history: &HistoryStore) -> Result<()> {
    let Some(entry) = history.get_last() else {
        display::error("No previous command found.");
        process::exit(1);
    };

    println!("{}", format!("Query: {}", entry.query).blue());
    display::command(&entry.command);

    match clipboard::copy(&entry.command) {
        Ok(()) => display::success("Command copied to clipboard. Press Ctrl+V to use it."),
        Err(_) => display::error("Failed to copy to clipboard"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::implicit_query;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_words_are_an_implicit_query() {
        assert!(implicit_query(&args(&["askcmd", "find", "large", "files"])));
    }

    #[test]
    fn known_subcommands_are_not() {
        assert!(!implicit_query(&args(&["askcmd", "history", "show"])));
        assert!(!implicit_query(&args(&["askcmd", "config", "show"])));
        assert!(!implicit_query(&args(&["askcmd", "version"])));
    }

    #[test]
    fn flags_and_empty_invocations_are_not() {
        assert!(!implicit_query(&args(&["askcmd", "--help"])));
        assert!(!implicit_query(&args(&["askcmd"])));
    }
}
