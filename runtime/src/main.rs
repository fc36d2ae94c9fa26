// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use slotwatch::config::DEFAULT_INTERVAL_SECS;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::TargetArgs;

#[derive(Parser)]
#[command(
    name = "slotwatch",
    about = "Slotwatch: watch a booking page for open appointment slots",
    version,
    after_help = "Run 'slotwatch <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check availability once and exit
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Poll until a slot opens, Ctrl-C, or repeated failures
    Watch {
        #[command(flatten)]
        target: TargetArgs,
        /// Base seconds between checks (randomized by about a third)
        #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
        interval: u64,
    },
    /// List the locations offered for an appointment type
    Locations {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Run the page heuristics on a saved HTML file
    Inspect {
        /// Saved booking page (HTML)
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "slotwatch=debug"
    } else {
        "slotwatch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Check { target } => cli::check_cmd::run(target.into_check_config()?).await,
        Commands::Watch { target, interval } => {
            cli::watch_cmd::run(target.into_config(interval)?).await
        }
        Commands::Locations { target } => {
            cli::locations_cmd::run(target.into_check_config()?).await
        }
        Commands::Inspect { file, target } => {
            cli::inspect_cmd::run(&file, target.into_check_config()?).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "slotwatch", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("SLOTWATCH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SLOTWATCH_QUIET", "1");
    }
    init_tracing(cli.verbose, cli.json);

    let result = dispatch(cli.command).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
