use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AppError, Context, Result};

use super::BatchResult;

/// Write one CSV per symbol and series into `dir`, returning the written paths.
pub fn write_batch(dir: impl AsRef<Path>, batch: &BatchResult) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for symbol in batch.symbols() {
        if let Some(history) = batch.history.get(&symbol) {
            written.push(write_series(dir, &symbol, "history", history)?);
        }
        if let Some(dividends) = batch.dividends.get(&symbol) {
            written.push(write_series(dir, &symbol, "dividends", dividends)?);
        }
        if let Some(splits) = batch.splits.get(&symbol) {
            written.push(write_series(dir, &symbol, "splits", splits)?);
        }
    }

    Ok(written)
}

fn write_series<T: Serialize>(
    dir: &Path,
    symbol: &str,
    kind: &str,
    rows: &[T],
) -> Result<PathBuf> {
    check_file_stem(symbol)?;
    let path = dir.join(format!("{symbol}_{kind}.csv"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create CSV writer for {}", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(path)
}

/// Symbols become file names, so they must not name a path of their own.
fn check_file_stem(symbol: &str) -> Result<()> {
    let unsafe_stem = symbol.is_empty()
        || symbol == "."
        || symbol == ".."
        || symbol.contains(['/', '\\', '\0'])
        || Path::new(symbol).is_absolute();
    if unsafe_stem {
        return Err(AppError::invalid_request(format!(
            "symbol {symbol:?} cannot be used as a file name"
        )));
    }
    Ok(())
}
