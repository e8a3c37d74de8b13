//! modelprobe CLI - check which hosted LLM endpoints answer right now.
//!
//! Sends one small prompt to every configured (provider, model) pair, prints
//! a status block per model, and recommends the first working entry of the
//! fallback cascade.
//!
//! # Usage
//!
//! ```bash
//! # Probe every enabled provider with a text prompt
//! modelprobe probe
//!
//! # Vision probe of two Groq models, dumping the report
//! modelprobe probe --provider groq --vision -o report.json
//!
//! # Browse what a provider serves
//! modelprobe models list --provider groq
//!
//! # View configuration
//! modelprobe config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// modelprobe - probe hosted LLM endpoints and pick a working fallback.
#[derive(Parser, Debug)]
#[command(name = "modelprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Probe providers and recommend the first working model
    Probe(cli::probe::ProbeArgs),

    /// Browse provider model catalogs
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match modelprobe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `modelprobe config path`."
            );
            modelprobe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("modelprobe v{}", modelprobe_core::VERSION);

    match cli.command {
        Commands::Probe(args) => cli::probe::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
