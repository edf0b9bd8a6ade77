use futures::stream::{self, StreamExt};
use log::debug;

use crate::config::Config;

use super::request::{build_requests, ChartRequest, DateRange, Interval};
use super::transport::{HttpGet, TransportError};
use super::{ensure_concurrency_limit, FetchResult};

/// Raw reply (or transport failure) for one normalised symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub symbol: String,
    pub result: Result<Vec<u8>, TransportError>,
}

/// Fetch every symbol of a batch concurrently against one shared transport.
///
/// Returns one outcome per distinct normalised symbol, in input order. A
/// failing request never affects its siblings; only invalid input fails the
/// call as a whole.
pub async fn fetch_all<T, S>(
    transport: &T,
    config: &Config,
    symbols: &[S],
    range: DateRange,
    interval: &Interval,
) -> FetchResult<Vec<RawOutcome>>
where
    T: HttpGet,
    S: AsRef<str>,
{
    let requests = build_requests(symbols, range, interval)?;
    fetch_requests(transport, config, requests).await
}

pub async fn fetch_requests<T: HttpGet>(
    transport: &T,
    config: &Config,
    requests: Vec<ChartRequest>,
) -> FetchResult<Vec<RawOutcome>> {
    // Render every URL up front so a bad template fails before any I/O.
    let prepared = requests
        .into_iter()
        .map(|request| -> FetchResult<(String, String)> {
            let url = request.url(&config.endpoint_template)?;
            Ok((request.symbol, url))
        })
        .collect::<FetchResult<Vec<_>>>()?;

    let in_flight = match config.concurrency_limit {
        Some(limit) => ensure_concurrency_limit(limit),
        None => prepared.len().max(1),
    };

    let outcomes = stream::iter(prepared)
        .map(|(symbol, url)| async move {
            debug!("requesting chart for {symbol}: {url}");
            let result = transport.get(&url).await;
            if let Err(err) = &result {
                debug!("request for {symbol} failed: {err}");
            }
            RawOutcome { symbol, result }
        })
        .buffered(in_flight)
        .collect::<Vec<_>>()
        .await;

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::NaiveDate;

    use super::*;
    use crate::fetch::testing::{StubTransport, STUB_TEMPLATE};

    fn range() -> DateRange {
        DateRange::from_dates(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 8).unwrap(),
        )
        .unwrap()
    }

    fn config() -> Config {
        Config::builtin().with_endpoint_template(STUB_TEMPLATE)
    }

    #[tokio::test]
    async fn returns_one_outcome_per_symbol_in_input_order() {
        let transport = StubTransport::new()
            .respond("AAPL", b"aapl".to_vec())
            .respond("BRK-A", b"brk".to_vec())
            .respond("MSFT", b"msft".to_vec());

        let outcomes = fetch_all(
            &transport,
            &config(),
            &["msft", "brk.a", "AAPL"],
            range(),
            &Interval::OneDay,
        )
        .await
        .unwrap();

        let symbols: Vec<_> = outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "BRK-A", "AAPL"]);
        assert_eq!(outcomes[1].result, Ok(b"brk".to_vec()));
    }

    #[tokio::test]
    async fn transport_failure_is_isolated_to_its_symbol() {
        let transport = StubTransport::new()
            .respond("AAPL", b"aapl".to_vec())
            .fail("TSLA", TransportError::Connect("reset by peer".to_string()))
            .respond("MSFT", b"msft".to_vec());

        let outcomes = fetch_all(
            &transport,
            &config(),
            &["AAPL", "TSLA", "MSFT"],
            range(),
            &Interval::OneDay,
        )
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].result, Ok(b"aapl".to_vec()));
        assert!(matches!(outcomes[1].result, Err(TransportError::Connect(_))));
        assert_eq!(outcomes[2].result, Ok(b"msft".to_vec()));
    }

    #[tokio::test]
    async fn requests_embed_range_and_lowercased_interval() {
        let transport = StubTransport::new().respond("AAPL", Vec::new());

        fetch_all(
            &transport,
            &config(),
            &["aapl"],
            range(),
            &Interval::parse("1WK"),
        )
        .await
        .unwrap();

        assert_eq!(
            transport.requested_urls(),
            vec!["stub://chart/AAPL?from=1609459200&to=1610064000&every=1wk".to_string()]
        );
    }

    #[tokio::test]
    async fn unbounded_batch_launches_every_request_at_once() {
        let transport = StubTransport::new().with_delay_ms(20);
        let symbols = ["A", "B", "C", "D", "E"];

        let outcomes = fetch_all(&transport, &config(), &symbols, range(), &Interval::OneDay)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(transport.peak_in_flight.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn concurrency_limit_caps_in_flight_requests() {
        let transport = StubTransport::new().with_delay_ms(20);
        let symbols = ["A", "B", "C", "D", "E"];
        let config = config().with_concurrency_limit(2);

        let outcomes = fetch_all(&transport, &config, &symbols, range(), &Interval::OneDay)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        assert!(transport.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn bad_template_fails_before_any_request() {
        let transport = StubTransport::new();
        let config = Config::builtin().with_endpoint_template("stub://chart/{ticker}");

        let result = fetch_all(&transport, &config, &["AAPL"], range(), &Interval::OneDay).await;

        assert!(result.is_err());
        assert!(transport.requested_urls().is_empty());
    }
}
