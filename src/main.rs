mod commands;
mod config;
mod diagnostics;
mod dialog;
mod error;
mod evaluator;
mod extractor;
mod formatter;
mod markup;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::types::EstimateType;

#[derive(Parser)]
#[command(name = "damage-estimate", about = "Estimate damage ranges from tagged damage-roll formulas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the damage-dialog hook on a JSON payload and print the update
    Dialog {
        /// Payload file (reads stdin if omitted)
        payload: Option<PathBuf>,
    },
    /// Print the damage estimate for a tagged formula
    Estimate {
        /// Tagged damage formula (reads stdin if omitted)
        formula: Option<String>,
        /// Print the HTML fragment appended to the roll button
        #[arg(long)]
        html: bool,
        /// Display mode (overrides .damage-estimate.toml)
        #[arg(long, value_enum)]
        mode: Option<EstimateType>,
    },
    /// Evaluate a plain arithmetic expression
    Eval {
        /// Expression of integers, + - * / and parentheses
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Print the per-segment breakdown of a tagged formula
    Segments {
        /// Tagged damage formula (reads stdin if omitted)
        formula: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log to stderr so stdout stays clean for estimates and JSON.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_err| return EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dialog { payload } => commands::dialog(payload.as_deref()),
        Commands::Estimate { formula, html, mode } => commands::estimate(formula.as_deref(), mode, html),
        Commands::Eval { expression } => commands::eval(&expression),
        Commands::Segments { formula, json } => commands::segments(formula.as_deref(), json),
    };

    return match result {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
        Ok(()) => ExitCode::SUCCESS,
    };
}
