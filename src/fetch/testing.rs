//! In-memory transport and chart payload builders shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::transport::{HttpGet, TransportError};

pub const STUB_TEMPLATE: &str =
    "stub://chart/{symbol}?from={period1}&to={period2}&every={interval}";

/// Answers requests by the symbol embedded in a [`STUB_TEMPLATE`] URL.
#[derive(Default)]
pub struct StubTransport {
    responses: HashMap<String, Result<Vec<u8>, TransportError>>,
    delay: Option<Duration>,
    urls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, symbol: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(symbol.to_string(), Ok(body.into()));
        self
    }

    pub fn fail(mut self, symbol: &str, err: TransportError) -> Self {
        self.responses.insert(symbol.to_string(), Err(err));
        self
    }

    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    fn symbol_of(url: &str) -> &str {
        let rest = url.strip_prefix("stub://chart/").unwrap_or(url);
        rest.split('?').next().unwrap_or(rest)
    }
}

impl HttpGet for StubTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .get(Self::symbol_of(url))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Chart body with `rows` of (timestamp, open, high, low, close, adj close, volume).
pub fn chart_body(rows: &[(i64, f64, f64, f64, f64, f64, u64)], events: Option<&str>) -> Vec<u8> {
    let column = |pick: fn(&(i64, f64, f64, f64, f64, f64, u64)) -> String| {
        rows.iter().map(pick).collect::<Vec<_>>().join(",")
    };

    let events = events
        .map(|events| format!(r#","events":{events}"#))
        .unwrap_or_default();

    format!(
        r#"{{"chart":{{"result":[{{"meta":{{"currency":"USD"}},"timestamp":[{ts}],"indicators":{{"quote":[{{"open":[{open}],"high":[{high}],"low":[{low}],"close":[{close}],"volume":[{volume}]}}],"adjclose":[{{"adjclose":[{adj}]}}]}}{events}}}],"error":null}}}}"#,
        ts = column(|r| r.0.to_string()),
        open = column(|r| r.1.to_string()),
        high = column(|r| r.2.to_string()),
        low = column(|r| r.3.to_string()),
        close = column(|r| r.4.to_string()),
        adj = column(|r| r.5.to_string()),
        volume = column(|r| r.6.to_string()),
    )
    .into_bytes()
}

/// Three daily bars starting 2021-01-04 (14:30 UTC opens).
pub fn three_day_body(events: Option<&str>) -> Vec<u8> {
    chart_body(
        &[
            (1_609_770_600, 133.52, 133.61, 126.76, 129.41, 128.62, 143_301_900),
            (1_609_857_000, 128.89, 131.74, 128.43, 131.01, 130.21, 97_664_900),
            (1_609_943_400, 127.72, 131.05, 126.38, 126.60, 125.83, 155_088_000),
        ],
        events,
    )
}

pub fn upstream_error_body(description: &str) -> Vec<u8> {
    format!(
        r#"{{"chart":{{"result":null,"error":{{"code":"Not Found","description":"{description}"}}}}}}"#
    )
    .into_bytes()
}
