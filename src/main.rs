use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use savant::cli::{achievements, analyze, ask, git, memory, models, search, sessions};
use savant::config::Config;
use savant::store::MemoryStore;

#[derive(Parser)]
#[command(name = "savant")]
#[command(about = "Terminal AI assistant with persistent memory and code analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "savant.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant a question
    Ask {
        /// The question or prompt
        prompt: String,

        /// Named conversation session
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,

        /// Auto-select the best model for the task
        #[arg(long)]
        auto_model: bool,
    },

    /// Analyze a code file or directory
    Analyze {
        /// File or directory path
        path: String,
    },

    /// List conversation sessions
    Sessions,

    /// Search conversation history
    Search {
        /// Substring to look for
        query: String,

        /// Restrict to one session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show achievement progress
    Achievements,

    /// Show memory statistics
    Memory,

    /// List available AI models
    Models,

    /// Record a git action (feeds achievement progress)
    GitRecord {
        /// Action name (commit, push, merge, ...)
        action: String,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,

        /// Repository path
        #[arg(short, long)]
        repo: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_default();

    // Initialize store; an unopenable store file is the one fatal error
    let mut store = MemoryStore::open(&config.database_path())
        .context("Failed to open memory store")?;

    match cli.command {
        Commands::Ask {
            prompt,
            session,
            model,
            auto_model,
        } => {
            ask::run(&mut store, &config, &prompt, &session, model, auto_model)?;
        }
        Commands::Analyze { path } => {
            analyze::run(&mut store, &config, &path)?;
        }
        Commands::Sessions => {
            sessions::run(&store)?;
        }
        Commands::Search { query, session } => {
            search::run(&store, &query, session)?;
        }
        Commands::Achievements => {
            achievements::run(&store)?;
        }
        Commands::Memory => {
            memory::run(&store)?;
        }
        Commands::Models => {
            models::run(&config)?;
        }
        Commands::GitRecord {
            action,
            description,
            repo,
        } => {
            git::run(&mut store, &action, description, repo)?;
        }
    }

    Ok(())
}
