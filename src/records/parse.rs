use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::fetch::decode::{
    self, ChartData, ChartPayload, DividendEvent, Indicators, SplitEvent,
};
use crate::fetch::{RawOutcome, TransportError};
use crate::utils::unix_to_date;

use super::{
    Diagnostic, DividendRecord, PriceRecord, SplitRecord, SymbolResult, SymbolSeries,
};

type Extracted<T> = std::result::Result<T, String>;

/// Turn one raw outcome into a [`SymbolResult`].
///
/// Every per-symbol problem becomes a [`Diagnostic`]; the only error returned
/// is [`AppError::ServiceUnavailable`], which aborts the whole batch.
pub fn parse(raw: RawOutcome, maintenance_marker: &str) -> Result<SymbolResult> {
    let RawOutcome { symbol, result } = raw;

    let body = match result {
        Ok(body) => body,
        Err(TransportError::Status { status, body })
            if decode::contains_marker(body.as_bytes(), maintenance_marker) =>
        {
            return Err(service_unavailable(&symbol, Some(status)));
        }
        Err(err) => {
            return Ok(SymbolResult::diagnostic(
                symbol,
                Diagnostic::TransportFailure(err),
            ))
        }
    };

    let diagnostic = match decode::classify(&body, maintenance_marker) {
        ChartPayload::Series(data) => {
            return Ok(match extract_series(data) {
                Ok(series) => SymbolResult::series(symbol, series),
                Err(reason) => {
                    SymbolResult::diagnostic(symbol, Diagnostic::MalformedResponse(reason))
                }
            });
        }
        ChartPayload::ServiceUnavailable => return Err(service_unavailable(&symbol, None)),
        ChartPayload::UpstreamError(description) => Diagnostic::UpstreamError(description),
        ChartPayload::NoData => Diagnostic::NoData,
        ChartPayload::Malformed(reason) => Diagnostic::MalformedResponse(reason),
    };

    Ok(SymbolResult::diagnostic(symbol, diagnostic))
}

fn service_unavailable(symbol: &str, status: Option<u16>) -> AppError {
    let detail = match status {
        Some(status) => format!("maintenance page (HTTP {status}) returned for {symbol}"),
        None => format!("maintenance page returned for {symbol}"),
    };
    AppError::ServiceUnavailable(detail)
}

fn extract_series(data: ChartData) -> Extracted<SymbolSeries> {
    let timestamps = data.timestamp.unwrap_or_default();
    let indicators = data
        .indicators
        .ok_or_else(|| "missing `indicators` section".to_string())?;
    let history = extract_history(&timestamps, indicators)?;

    let (dividends, splits) = match data.events {
        Some(events) => (
            events.dividends.map(extract_dividends).transpose()?,
            events.splits.map(extract_splits).transpose()?,
        ),
        None => (None, None),
    };

    Ok(SymbolSeries {
        history,
        dividends,
        splits,
    })
}

fn extract_history(timestamps: &[i64], indicators: Indicators) -> Extracted<Vec<PriceRecord>> {
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| "missing quote data".to_string())?;
    let adj_close = indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .and_then(|series| series.adjclose);

    let opens = column("open", quote.open, timestamps.len())?;
    let highs = column("high", quote.high, timestamps.len())?;
    let lows = column("low", quote.low, timestamps.len())?;
    let closes = column("close", quote.close, timestamps.len())?;
    let volumes = column("volume", quote.volume, timestamps.len())?;
    let adj_closes = column("adjclose", adj_close, timestamps.len())?;

    let mut records: Vec<PriceRecord> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let row = [opens[i], highs[i], lows[i], closes[i], adj_closes[i], volumes[i]];

        // Placeholder rows for non-trading sessions carry no values at all.
        if row.iter().all(Option::is_none) {
            continue;
        }
        let [Some(open), Some(high), Some(low), Some(close), Some(adj_close), Some(volume)] = row
        else {
            return Err(format!("incomplete price row at timestamp {ts}"));
        };

        let date = to_date(ts)?;
        let record = PriceRecord {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume: to_volume(volume, ts)?,
        };

        if let Some(last) = records.last_mut() {
            // Only the trailing live bar may share a date with the day before it;
            // anything else is an intraday series that has no per-date shape.
            if last.date == date {
                if i + 1 != timestamps.len() {
                    return Err(format!("multiple bars on calendar date {date}"));
                }
                *last = record;
                continue;
            }
            if last.date > date {
                return Err(format!(
                    "timestamps out of order: {date} follows {}",
                    last.date
                ));
            }
        }
        records.push(record);
    }

    Ok(records)
}

fn column(
    name: &str,
    values: Option<Vec<Option<f64>>>,
    expected: usize,
) -> Extracted<Vec<Option<f64>>> {
    let values = values.ok_or_else(|| format!("missing `{name}` series"))?;
    if values.len() != expected {
        return Err(format!(
            "`{name}` has {} values for {expected} timestamps",
            values.len()
        ));
    }
    Ok(values)
}

fn to_date(timestamp: i64) -> Extracted<NaiveDate> {
    unix_to_date(timestamp).ok_or_else(|| format!("invalid timestamp {timestamp}"))
}

fn to_volume(value: f64, timestamp: i64) -> Extracted<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid volume {value} at timestamp {timestamp}"));
    }
    Ok(value.round() as u64)
}

fn event_date(key: &str) -> Extracted<NaiveDate> {
    let timestamp = key
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("event key `{key}` is not a unix timestamp"))?;
    to_date(timestamp)
}

fn extract_dividends(events: BTreeMap<String, DividendEvent>) -> Extracted<Vec<DividendRecord>> {
    let mut records = events
        .into_iter()
        .map(|(key, event)| -> Extracted<DividendRecord> {
            let date = event_date(&key)?;
            let amount = event
                .amount
                .ok_or_else(|| format!("dividend `{key}` has no amount"))?;
            Ok(DividendRecord { date, amount })
        })
        .collect::<Extracted<Vec<_>>>()?;

    records.sort_by_key(|record| record.date);
    Ok(records)
}

fn extract_splits(events: BTreeMap<String, SplitEvent>) -> Extracted<Vec<SplitRecord>> {
    let mut records = events
        .into_iter()
        .map(|(key, event)| -> Extracted<SplitRecord> {
            let date = event_date(&key)?;
            let numerator = split_term(&key, "numerator", event.numerator)?;
            let denominator = split_term(&key, "denominator", event.denominator)?;
            Ok(SplitRecord {
                date,
                numerator,
                denominator,
            })
        })
        .collect::<Extracted<Vec<_>>>()?;

    records.sort_by_key(|record| record.date);
    Ok(records)
}

fn split_term(key: &str, name: &str, value: Option<f64>) -> Extracted<u32> {
    let value = value.ok_or_else(|| format!("split `{key}` has no {name}"))?;
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(format!("split `{key}` has invalid {name} {value}"));
    }
    Ok(value as u32)
}
