mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::{BatchArgs, Cli, Commands};
use stock_history::config::{load_config, Config};
use stock_history::fetch::DateRange;
use stock_history::records::{write_batch, BatchResult};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path).context("Failed to load configuration")?,
        None => Config::builtin(),
    };

    match &cli.command {
        Commands::Download { batch, output_dir } => {
            let result = run_batch(&config, batch)?;
            let written = write_batch(output_dir, &result)?;
            info!(
                "wrote {} files to {}",
                written.len(),
                output_dir.display()
            );
        }
        Commands::Summary { batch } => {
            let result = run_batch(&config, batch)?;
            print_summary(&result);
        }
    }

    Ok(())
}

fn run_batch(config: &Config, args: &BatchArgs) -> Result<BatchResult> {
    let range = DateRange::from_dates(args.start, args.end)?;
    let result =
        stock_history::download(config, args.symbols.as_slice(), range, &args.interval)?;
    Ok(result)
}

fn print_summary(batch: &BatchResult) {
    println!(
        "{:<10} {:>8} {:>10} {:>7}",
        "Symbol", "History", "Dividends", "Splits"
    );
    for symbol in batch.symbols() {
        let count = |len: Option<usize>| len.unwrap_or(0);
        println!(
            "{:<10} {:>8} {:>10} {:>7}",
            symbol,
            count(batch.history.get(&symbol).map(Vec::len)),
            count(batch.dividends.get(&symbol).map(Vec::len)),
            count(batch.splits.get(&symbol).map(Vec::len)),
        );
    }
}
