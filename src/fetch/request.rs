use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;
use crate::utils::date_to_utc;

use super::FetchResult;

/// Sampling granularity of a chart request.
///
/// Unknown values are kept (lower-cased) and forwarded to the endpoint untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    #[default]
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
    Other(String),
}

impl Interval {
    pub fn as_str(&self) -> &str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
            Interval::Other(raw) => raw,
        }
    }

    pub fn parse(value: &str) -> Self {
        let lowered = value.trim().to_lowercase();
        match lowered.as_str() {
            "1m" => Interval::OneMinute,
            "5m" => Interval::FiveMinutes,
            "15m" => Interval::FifteenMinutes,
            "30m" => Interval::ThirtyMinutes,
            "1h" => Interval::OneHour,
            "1d" => Interval::OneDay,
            "5d" => Interval::FiveDays,
            "1wk" => Interval::OneWeek,
            "1mo" => Interval::OneMonth,
            "3mo" => Interval::ThreeMonths,
            _ => Interval::Other(lowered),
        }
    }
}

impl FromStr for Interval {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Interval::parse(s))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time window shared by every request of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> FetchResult<Self> {
        if start >= end {
            return Err(AppError::invalid_request(format!(
                "start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Window from midnight UTC of `start` to midnight UTC of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> FetchResult<Self> {
        Self::new(date_to_utc(start), date_to_utc(end))
    }

    pub fn period1(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn period2(&self) -> i64 {
        self.end.timestamp()
    }
}

/// One chart request, built once per symbol per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub range: DateRange,
    pub interval: Interval,
}

impl ChartRequest {
    pub fn url(&self, template: &str) -> FetchResult<String> {
        let replacements = HashMap::from([
            ("symbol", self.symbol.clone()),
            ("period1", self.range.period1().to_string()),
            ("period2", self.range.period2().to_string()),
            ("interval", self.interval.as_str().to_string()),
        ]);
        render_template(template, &replacements)
    }
}

/// Canonical form of a ticker: upper-cased with `.` replaced by `-`.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Build one request per distinct normalised symbol, keeping first-seen order.
pub fn build_requests<S: AsRef<str>>(
    symbols: &[S],
    range: DateRange,
    interval: &Interval,
) -> FetchResult<Vec<ChartRequest>> {
    let mut seen = HashSet::new();
    let mut requests = Vec::with_capacity(symbols.len());

    for raw in symbols {
        let symbol = normalize_symbol(raw.as_ref());
        if symbol.is_empty() {
            return Err(AppError::invalid_request("symbols must not be blank"));
        }
        if !seen.insert(symbol.clone()) {
            continue;
        }
        requests.push(ChartRequest {
            symbol,
            range,
            interval: interval.clone(),
        });
    }

    if requests.is_empty() {
        return Err(AppError::invalid_request("at least one symbol is required"));
    }

    Ok(requests)
}

fn render_template(template: &str, replacements: &HashMap<&str, String>) -> FetchResult<String> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut key = String::new();
            let mut closed = false;
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == '}' {
                    closed = true;
                    break;
                }
                key.push(next);
            }

            if !closed {
                return Err(AppError::message(format!(
                    "Unterminated placeholder in template: {{{key}"
                )));
            }

            if key.is_empty() {
                return Err(AppError::message(
                    "Encountered empty placeholder `{}` in template",
                ));
            }

            let value = replacements.get(key.as_str()).ok_or_else(|| {
                AppError::message(format!(
                    "No replacement provided for placeholder `{}` in template",
                    key
                ))
            })?;
            result.push_str(value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
