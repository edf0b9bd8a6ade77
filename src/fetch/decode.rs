//! Wire schema of the chart endpoint and the first-pass classification of a body.
//!
//! Every field is optional at this level so that a structurally odd payload
//! still decodes and can be classified, instead of failing deserialisation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartData>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Option<Indicators>,
    #[serde(default)]
    pub events: Option<Events>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteData>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteData {
    #[serde(default)]
    pub open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjCloseData {
    #[serde(default)]
    pub adjclose: Option<Vec<Option<f64>>>,
}

/// Corporate actions keyed by the unix timestamp of the event, as a string.
#[derive(Debug, Default, Deserialize)]
pub struct Events {
    #[serde(default)]
    pub dividends: Option<BTreeMap<String, DividendEvent>>,
    #[serde(default)]
    pub splits: Option<BTreeMap<String, SplitEvent>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DividendEvent {
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SplitEvent {
    #[serde(default)]
    pub numerator: Option<f64>,
    #[serde(default)]
    pub denominator: Option<f64>,
}

/// What a chart body turned out to be.
#[derive(Debug)]
pub enum ChartPayload {
    Series(ChartData),
    NoData,
    /// The API reported a problem with this ticker, with its description if any.
    UpstreamError(Option<String>),
    ServiceUnavailable,
    Malformed(String),
}

/// Classify a raw chart body; the first matching rule wins.
pub fn classify(body: &[u8], maintenance_marker: &str) -> ChartPayload {
    let envelope: ChartEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            if contains_marker(body, maintenance_marker) {
                return ChartPayload::ServiceUnavailable;
            }
            return ChartPayload::Malformed(format!("invalid chart JSON: {err}"));
        }
    };

    let chart = envelope.chart;
    match chart.error {
        None | Some(Value::Null) => {}
        Some(error) => {
            return match error_description(&error) {
                Some(description) => ChartPayload::UpstreamError(Some(description)),
                None if contains_marker(body, maintenance_marker) => {
                    ChartPayload::ServiceUnavailable
                }
                None => ChartPayload::UpstreamError(None),
            };
        }
    }

    let Some(data) = chart.result.and_then(|results| results.into_iter().next()) else {
        return ChartPayload::NoData;
    };
    if data.timestamp.is_none() {
        return ChartPayload::NoData;
    }

    if contains_marker(body, maintenance_marker) {
        return ChartPayload::ServiceUnavailable;
    }

    ChartPayload::Series(data)
}

pub fn contains_marker(body: &[u8], marker: &str) -> bool {
    !marker.is_empty() && String::from_utf8_lossy(body).contains(marker)
}

fn error_description(error: &Value) -> Option<String> {
    error
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "Will be right back";

    #[test]
    fn error_with_description_is_upstream_error() {
        let body = br#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

        match classify(body, MARKER) {
            ChartPayload::UpstreamError(Some(description)) => {
                assert_eq!(description, "No data found, symbol may be delisted")
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn error_without_description_is_unspecified() {
        let body = br#"{"chart":{"result":null,"error":{"code":"Bad Request"}}}"#;
        assert!(matches!(
            classify(body, MARKER),
            ChartPayload::UpstreamError(None)
        ));
    }

    #[test]
    fn error_without_description_but_with_marker_is_service_unavailable() {
        let body = br#"{"chart":{"result":null,"error":{"code":"Will be right back"}}}"#;
        assert!(matches!(
            classify(body, MARKER),
            ChartPayload::ServiceUnavailable
        ));

        // a described error stays a per-symbol problem
        let body = br#"{"chart":{"result":null,"error":{"code":"Will be right back","description":"Not Found"}}}"#;
        assert!(matches!(
            classify(body, MARKER),
            ChartPayload::UpstreamError(Some(_))
        ));
    }

    #[test]
    fn missing_timestamps_mean_no_data() {
        let body = br#"{"chart":{"result":[{"meta":{"symbol":"XYZ"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(classify(body, MARKER), ChartPayload::NoData));

        let body = br#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(classify(body, MARKER), ChartPayload::NoData));
    }

    #[test]
    fn maintenance_page_is_service_unavailable() {
        let body = b"<html><body><h1>Will be right back...</h1></body></html>";
        assert!(matches!(
            classify(body, MARKER),
            ChartPayload::ServiceUnavailable
        ));
    }

    #[test]
    fn undecodable_body_without_marker_is_malformed() {
        assert!(matches!(
            classify(b"<html>oops</html>", MARKER),
            ChartPayload::Malformed(_)
        ));
        assert!(matches!(
            classify(br#"{"unexpected":true}"#, MARKER),
            ChartPayload::Malformed(_)
        ));
    }

    #[test]
    fn series_payload_keeps_events() {
        let body = br#"{"chart":{"result":[{"timestamp":[1609459200],
            "indicators":{"quote":[{"open":[1.0],"high":[1.0],"low":[1.0],"close":[1.0],"volume":[10]}],
            "adjclose":[{"adjclose":[1.0]}]},
            "events":{"dividends":{"1609459200":{"amount":0.5,"date":1609459200}}}}],"error":null}}"#;

        let ChartPayload::Series(data) = classify(body, MARKER) else {
            panic!("expected series payload");
        };
        let events = data.events.unwrap();
        assert_eq!(events.dividends.unwrap().len(), 1);
        assert!(events.splits.is_none());
    }
}
