mod commands;
mod input;
mod logging;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::{FinancialsArgs, NarrativeArgs, ReportArgs, WalkabilityArgs};
use commands::project::ProjectArgs;

/// Development underwriting and walkability scoring for mixed-use projects
#[derive(Parser)]
#[command(
    name = "mwdos",
    version,
    about = "Development underwriting and walkability scoring",
    long_about = "Mini-World Developer OS: underwrite a walkable mixed-use project \
                  (cost stack, debt sizing, NOI, DSCR, break-even rent) and score its \
                  pedestrian environment, with decimal precision. Projects can be read \
                  from JSON/YAML files, piped stdin, or a local project store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for stderr diagnostics (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Underwrite the project: costs, debt, NOI, DSCR, break-even rent
    Financials(FinancialsArgs),
    /// Score the pedestrian environment
    Walkability(WalkabilityArgs),
    /// Full report: both models, tenant mix and dashboard indicators
    Report(ReportArgs),
    /// Build the partner-summary payload and prompt
    Narrative(NarrativeArgs),
    /// Manage saved projects
    Project(ProjectArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Financials(args) => commands::analysis::run_financials(args),
        Commands::Walkability(args) => commands::analysis::run_walkability(args),
        Commands::Report(args) => commands::analysis::run_report(args),
        Commands::Narrative(args) => commands::analysis::run_narrative(args),
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Version => {
            println!("mwdos {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
