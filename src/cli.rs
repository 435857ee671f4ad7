use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "contract-scout",
    about = "Search, score, and report government contracting opportunities",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one search-score-report cycle (default command)
    Run(RunArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RunArgs {
    /// Override the configured lookback window in days
    #[arg(long)]
    pub(crate) lookback_days: Option<i64>,
    /// Override the CSV log file path
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
    /// Override the report score threshold
    #[arg(long)]
    pub(crate) min_score: Option<u8>,
    /// Skip report delivery even when mail credentials are configured
    #[arg(long)]
    pub(crate) skip_email: bool,
}

pub(crate) fn parse() -> RunArgs {
    match Cli::parse().command {
        Some(Command::Run(args)) => args,
        None => RunArgs::default(),
    }
}
