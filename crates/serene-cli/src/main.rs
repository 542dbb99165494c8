use anyhow::Result;
use clap::{Parser, Subcommand};
use serene_core::config::RootConfig;
use serene_infrastructure::ConfigService;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "serene")]
#[command(about = "Serene - chat companion and mood tracker", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/serene/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the response latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
    },
    /// Mood check-ins and insights
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MoodAction {
    /// Record a check-in (happy, neutral, sad, anxious, tired)
    Record {
        tag: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Show recent check-ins and this week's insights
    Insights {
        #[arg(long, default_value_t = 7)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
}

fn init_tracing(config: &RootConfig) {
    // RUST_LOG takes precedence over the config file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service.get_config();
    init_tracing(&config);

    match cli.command {
        Commands::Chat { latency_ms } => {
            let mut chat = config.chat.clone();
            if let Some(latency_ms) = latency_ms {
                chat.response_latency_ms = latency_ms;
            }
            chat.validate()?;
            commands::chat::run(&chat).await?
        }
        Commands::Mood { action } => match action {
            MoodAction::Record { tag, note } => {
                commands::mood::record(&config.insight, &tag, &note).await?
            }
            MoodAction::Insights { limit } => commands::mood::insights(&config.insight, limit).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config)?,
            ConfigAction::Path => commands::config::path(&config_service)?,
        },
    }

    Ok(())
}
