mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalyzeArgs;
use commands::estimates::RentRangeArgs;
use commands::mortgage::MortgageArgs;
use commands::projection::ProjectArgs;
use commands::returns::{IrrArgs, ReturnsArgs};

/// Rental property investment analysis
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Rental property investment analysis",
    long_about = "A CLI for analysing buy-to-let property investments with decimal \
                  precision. Supports annuity mortgages and amortization schedules, \
                  rental cash-flow projections, yields, ROI, ROCE, payback and IRR."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter for stderr diagnostics (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment and yearly amortization schedule
    Mortgage(MortgageArgs),
    /// Project yearly rental cash flows
    Project(ProjectArgs),
    /// Year-1 yields, ROI, ROCE, payback and optional IRR
    Returns(ReturnsArgs),
    /// IRR of a cash-flow series by bisection
    Irr(IrrArgs),
    /// Full investment analysis of a property
    Analyze(AnalyzeArgs),
    /// Monthly rent from a free-text rent range
    RentRange(RentRangeArgs),
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Returns(args) => commands::returns::run_returns(args),
        Commands::Irr(args) => commands::returns::run_irr(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::RentRange(args) => commands::estimates::run_rent_range(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
