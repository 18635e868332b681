use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roonpipe_core::{Config, RoonPipe};
use roonpipe_protocol::{PlayAction, PlayRequest};
use std::path::PathBuf;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "roonpipe-search")]
#[command(about = "Search and play Roon tracks via RoonPipe", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Search query (shorthand for `roonpipe-search search <QUERY>`)
    #[arg(trailing_var_arg = true, num_args = 0..)]
    pub query: Vec<String>,

    /// Daemon socket (overrides config and ROONPIPE_SOCKET)
    #[arg(long, global = true)]
    pub socket: Option<PathBuf>,

    /// Config file (default: .roonpipe-search.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: text, json
    #[arg(short, long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search once and print the entries (default command)
    Search {
        /// Search query
        query: String,
    },

    /// Ask the daemon to play an item
    Play {
        #[arg(long)]
        item_key: String,

        #[arg(long)]
        session_key: String,

        /// Built-in action: play, playNow, addNext, queue
        #[arg(long, conflicts_with = "action_title", required_unless_present = "action_title")]
        action: Option<PlayAction>,

        /// Action title as listed by the daemon (e.g. "Play Now")
        #[arg(long)]
        action_title: Option<String>,

        #[arg(long, default_value = "", requires = "action_title")]
        category_key: String,

        #[arg(long, default_value = "0", requires = "action_title")]
        index: usize,
    },

    /// Show daemon and config status
    Status,

    /// Read queries from stdin, one keystroke state per line
    Interactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose || std::env::var("ROONPIPE_DEBUG").is_ok() {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let roonpipe = RoonPipe::new(load_config(&cli)?);

    // Handle command
    match cli.command {
        Some(Commands::Search { query }) => {
            commands::search::run(&roonpipe, &query, cli.format).await?;
        }
        Some(Commands::Play { item_key, session_key, action, action_title, category_key, index }) => {
            let request = match (action, action_title) {
                (Some(action), _) => PlayRequest::action(item_key, session_key, action),
                (None, Some(title)) => PlayRequest::titled(item_key, session_key, category_key, index, title),
                (None, None) => anyhow::bail!("either --action or --action-title is required"),
            };
            commands::play::run(&roonpipe, request).await?;
        }
        Some(Commands::Status) => {
            commands::status::run(&roonpipe)?;
        }
        Some(Commands::Interactive) => {
            commands::interactive::run(&roonpipe, cli.format).await?;
        }
        None => {
            // Default: treat trailing args as search query
            if cli.query.is_empty() {
                use clap::CommandFactory;
                Cli::command().print_help()?;
                println!();
            } else {
                let query = cli.query.join(" ");
                commands::search::run(&roonpipe, &query, cli.format).await?;
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_overrides(|key| std::env::var(key).ok()),
        None => Config::load(),
    };

    if let Some(socket) = &cli.socket {
        config.daemon.socket_path = socket.clone();
    }

    Ok(config)
}
