//! CLI for shellpoll: run shell probes on a schedule and report what they measured.

mod commands;

use clap::{Parser, Subcommand};
use shellpoll_core::{DEFAULT_CONFIG_PATH, DEFAULT_FREQUENCY_SECS};

#[derive(Parser)]
#[command(name = "shellpoll")]
#[command(about = "shellpoll: run shell probes on a schedule and report what they measured")]
#[command(version = shellpoll_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every configured metric until the sample budget is spent or Ctrl+C.
    /// Metrics sharing a frequency are run together, concurrently.
    Poll {
        /// Metric definitions: JSON array of {name, command, frequency}
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Polling frequency in seconds for metrics that don't set their own
        #[arg(long, default_value_t = DEFAULT_FREQUENCY_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        frequency: u64,

        /// Number of times to poll each group (default: until Ctrl+C)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        samples: Option<u32>,

        /// Write the full sample history as JSON to this path
        #[arg(long)]
        out: Option<String>,

        /// Print every sample as it is taken
        #[arg(long, short)]
        verbose: bool,
    },

    /// Validate the configuration and list the groups that would be polled
    Check {
        /// Metric definitions: JSON array of {name, command, frequency}
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Polling frequency in seconds for metrics that don't set their own
        #[arg(long, default_value_t = DEFAULT_FREQUENCY_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        frequency: u64,
    },

    /// Print the end-of-session summary for a snapshot written by `poll --out`
    Summarize {
        /// Path to the JSON snapshot
        snapshot: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Poll {
            config,
            frequency,
            samples,
            out,
            verbose,
        } => commands::poll::run(commands::poll::PollCommandConfig {
            config_path: &config,
            frequency,
            samples,
            out_path: out.as_deref(),
            verbose,
        }),
        Commands::Check { config, frequency } => commands::check::run(&config, frequency),
        Commands::Summarize { snapshot } => commands::summarize::run(&snapshot),
    }
}
