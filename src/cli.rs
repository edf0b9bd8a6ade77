use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use stock_history::fetch::Interval;
use stock_history::utils::parse_cli_date;

#[derive(Parser)]
#[command(name = "stock-history")]
#[command(about = "Download price history, dividends and splits for a batch of tickers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON file overriding the built-in endpoint settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the batch and write one CSV per symbol and series
    Download {
        #[command(flatten)]
        batch: BatchArgs,

        #[arg(short, long, default_value = "history")]
        output_dir: PathBuf,
    },

    /// Fetch the batch and print how many rows each symbol returned
    Summary {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args)]
pub struct BatchArgs {
    /// Ticker symbols (e.g. AAPL BRK.B MSFT)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_cli_date)]
    pub start: NaiveDate,

    /// Day the range ends on (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_cli_date)]
    pub end: NaiveDate,

    /// Sampling interval such as 1d, 1wk or 1mo
    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,
}
