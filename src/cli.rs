use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "kabuscan")]
#[command(about = "Two-stage bottom-rebound screener for JPX equities", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the daily screen over the ticker universe
    Scan {
        /// Path to the listing CSV (JPX download or code,name list)
        #[arg(short, long)]
        universe: Option<PathBuf>,

        /// Path to the price-history cache file
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Directory for Report_YYYYMMDD.{txt,csv}
        #[arg(short, long)]
        report_dir: Option<PathBuf>,

        /// Scan only the first N tickers (smoke runs)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip the AI narrative even if GEMINI_API_KEY is set
        #[arg(long)]
        no_ai: bool,

        /// Skip mail delivery even if MAIL_ADDRESS is set
        #[arg(long)]
        no_mail: bool,

        /// Delay before each network fetch, in milliseconds
        #[arg(long, default_value_t = crate::constants::REQUEST_SLEEP_MS)]
        sleep_ms: u64,

        /// Cache freshness window in seconds
        #[arg(long, default_value_t = crate::constants::CACHE_FRESH_SECS)]
        fresh_secs: i64,
    },
    /// Show what the price cache currently holds
    Status {
        /// Path to the price-history cache file
        #[arg(short, long)]
        cache: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            universe,
            cache,
            report_dir,
            limit,
            no_ai,
            no_mail,
            sleep_ms,
            fresh_secs,
        } => {
            commands::scan::run(commands::scan::ScanArgs {
                universe,
                cache,
                report_dir,
                limit,
                no_ai,
                no_mail,
                sleep_ms,
                fresh_secs,
            });
        }
        Commands::Status { cache } => {
            commands::status::run(cache);
        }
    }
}
