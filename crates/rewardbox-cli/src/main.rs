use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "rewardbox", version, about = "Seven-day reward calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all seven days
    Board {
        /// Print the cards as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the calendar state as JSON
    Status,
    /// Open a day; hold to reveal its reward (Ctrl-C lets go)
    Open {
        /// Day number (1-7)
        day: u32,
        /// Override the hold duration for this run
        #[arg(long)]
        hold_ms: Option<u64>,
    },
    /// Report day unlocks as they happen
    Watch,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Testing overrides
    #[cfg(feature = "admin")]
    Debug {
        #[command(subcommand)]
        action: commands::debug::DebugAction,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Board { json } => commands::board::run(json),
        Commands::Status => commands::status::run(),
        Commands::Open { day, hold_ms } => commands::open::run(day, hold_ms),
        Commands::Watch => commands::watch::run(),
        Commands::Config { action } => commands::config::run(action),
        #[cfg(feature = "admin")]
        Commands::Debug { action } => commands::debug::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
