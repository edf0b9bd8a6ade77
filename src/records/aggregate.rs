use super::{BatchResult, SymbolOutcome, SymbolResult};

/// Merge per-symbol results into symbol-keyed maps.
///
/// Each series is inserted only when non-empty; symbols that ended in a
/// diagnostic contribute nothing.
pub fn aggregate(results: Vec<SymbolResult>) -> BatchResult {
    let mut batch = BatchResult::default();

    for SymbolResult { symbol, outcome } in results {
        let SymbolOutcome::Series(series) = outcome else {
            continue;
        };

        if !series.history.is_empty() {
            batch.history.insert(symbol.clone(), series.history);
        }
        if let Some(dividends) = series.dividends.filter(|d| !d.is_empty()) {
            batch.dividends.insert(symbol.clone(), dividends);
        }
        if let Some(splits) = series.splits.filter(|s| !s.is_empty()) {
            batch.splits.insert(symbol, splits);
        }
    }

    batch
}
