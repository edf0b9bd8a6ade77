use log::{info, warn};

use crate::config::Config;
use crate::error::{Context, Result};
use crate::fetch::{fetch_all, DateRange, HttpGet, Interval, ReqwestTransport};
use crate::records::{aggregate, parse, BatchResult};

/// Fetch, parse and merge history, dividends and splits for a batch of symbols.
///
/// The HTTP client is created for this call only and dropped once every
/// request has finished. Per-symbol failures are logged and leave the symbol
/// out of the result; a maintenance page from the API fails the whole call
/// with [`crate::AppError::ServiceUnavailable`].
pub async fn fetch_batch<S: AsRef<str>>(
    config: &Config,
    symbols: &[S],
    range: DateRange,
    interval: &Interval,
) -> Result<BatchResult> {
    let transport = ReqwestTransport::new(config)?;
    fetch_batch_with(&transport, config, symbols, range, interval).await
}

/// [`fetch_batch`] over a caller-supplied transport.
pub async fn fetch_batch_with<T, S>(
    transport: &T,
    config: &Config,
    symbols: &[S],
    range: DateRange,
    interval: &Interval,
) -> Result<BatchResult>
where
    T: HttpGet,
    S: AsRef<str>,
{
    let outcomes = fetch_all(transport, config, symbols, range, interval).await?;
    let requested = outcomes.len();

    let mut results = Vec::with_capacity(requested);
    for outcome in outcomes {
        let result = parse(outcome, &config.maintenance_marker)?;
        if let Some(problem) = result.problem() {
            warn!("{}: {}", result.symbol, problem);
        }
        results.push(result);
    }

    let batch = aggregate(results);
    info!(
        "fetched {} of {} symbols ({} with dividends, {} with splits)",
        batch.history.len(),
        requested,
        batch.dividends.len(),
        batch.splits.len()
    );

    Ok(batch)
}

/// Blocking wrapper around [`fetch_batch`].
///
/// Each call builds and tears down its own runtime, so it must not be called
/// from inside an async context.
pub fn download<S: AsRef<str>>(
    config: &Config,
    symbols: &[S],
    range: DateRange,
    interval: &Interval,
) -> Result<BatchResult> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start download runtime")?;

    runtime.block_on(fetch_batch(config, symbols, range, interval))
}
