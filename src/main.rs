use clap::{Parser, Subcommand};
use miette::{miette, Result};
use std::path::PathBuf;

use js_state_tracker::cli;
use js_state_tracker::cli::inspect::InspectFormat;

#[derive(Parser)]
#[command(name = "js-state-tracker")]
#[command(about = "Scope-aware state tracking and source instrumentation for JavaScript")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument deanonymized JavaScript files (updated_<key>.js)
    Instrument {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the generated artifacts (defaults to each input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Name of the generated tracking-table variable
        #[arg(long, default_value = "stateManager")]
        table_identifier: String,
    },

    /// Print the scopes, tracking table and update sites of a file
    Inspect {
        /// Input file
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = InspectFormat::Json)]
        format: InspectFormat,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Instrument {
            inputs,
            out_dir,
            table_identifier,
        } => {
            let args = cli::instrument::InstrumentArgs {
                inputs,
                out_dir,
                table_identifier,
            };
            cli::instrument::instrument(&args).map_err(|e| miette!("{}", e))
        }
        Commands::Inspect { input, format } => {
            cli::inspect::inspect(&input, format).map_err(|e| miette!("{}", e))
        }
    }
}
