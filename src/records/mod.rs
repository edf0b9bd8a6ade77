use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::fetch::TransportError;

pub mod aggregate;
pub mod export;
pub mod parse;

pub use aggregate::aggregate;
pub use export::write_batch;
pub use parse::parse;

/// One bar of price history, dated without time of day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Adj Close")]
    pub adj_close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Numerator")]
    pub numerator: u32,
    #[serde(rename = "Denominator")]
    pub denominator: u32,
}

/// Why a symbol produced no series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    TransportFailure(TransportError),
    /// The API rejected the ticker; `None` when it gave no description.
    UpstreamError(Option<String>),
    /// Valid reply without a timestamp series (delisted or out of range).
    NoData,
    MalformedResponse(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TransportFailure(err) => write!(f, "transport failure: {err}"),
            Diagnostic::UpstreamError(Some(description)) => f.write_str(description),
            Diagnostic::UpstreamError(None) => f.write_str("unspecified upstream error"),
            Diagnostic::NoData => {
                f.write_str("No data found for this date range, symbol may be delisted")
            }
            Diagnostic::MalformedResponse(reason) => write!(f, "malformed response: {reason}"),
        }
    }
}

/// Series extracted from a valid chart reply.
///
/// `None` for dividends or splits means the reply carried no such section,
/// which is different from a present but empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolSeries {
    pub history: Vec<PriceRecord>,
    pub dividends: Option<Vec<DividendRecord>>,
    pub splits: Option<Vec<SplitRecord>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Series(SymbolSeries),
    Diagnostic(Diagnostic),
}

/// Parsed result for one symbol: either series or a diagnostic, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolResult {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

impl SymbolResult {
    pub fn series(symbol: impl Into<String>, series: SymbolSeries) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: SymbolOutcome::Series(series),
        }
    }

    pub fn diagnostic(symbol: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: SymbolOutcome::Diagnostic(diagnostic),
        }
    }

    pub fn history(&self) -> Option<&[PriceRecord]> {
        match &self.outcome {
            SymbolOutcome::Series(series) => Some(&series.history),
            SymbolOutcome::Diagnostic(_) => None,
        }
    }

    pub fn dividends(&self) -> Option<&[DividendRecord]> {
        match &self.outcome {
            SymbolOutcome::Series(series) => series.dividends.as_deref(),
            SymbolOutcome::Diagnostic(_) => None,
        }
    }

    pub fn splits(&self) -> Option<&[SplitRecord]> {
        match &self.outcome {
            SymbolOutcome::Series(series) => series.splits.as_deref(),
            SymbolOutcome::Diagnostic(_) => None,
        }
    }

    pub fn problem(&self) -> Option<&Diagnostic> {
        match &self.outcome {
            SymbolOutcome::Series(_) => None,
            SymbolOutcome::Diagnostic(diagnostic) => Some(diagnostic),
        }
    }
}

/// Symbol-keyed series for a whole batch.
///
/// A symbol only appears in a map when that series was non-empty for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub history: HashMap<String, Vec<PriceRecord>>,
    pub dividends: HashMap<String, Vec<DividendRecord>>,
    pub splits: HashMap<String, Vec<SplitRecord>>,
}

impl BatchResult {
    /// Sorted union of every symbol present in any map.
    pub fn symbols(&self) -> Vec<String> {
        self.history
            .keys()
            .chain(self.dividends.keys())
            .chain(self.splits.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.dividends.is_empty() && self.splits.is_empty()
    }
}
