use crate::error::Result;

pub mod decode;
pub mod orchestrator;
pub mod request;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{fetch_all, fetch_requests, RawOutcome};
pub use request::{normalize_symbol, ChartRequest, DateRange, Interval};
pub use transport::{HttpGet, ReqwestTransport, TransportError};

pub type FetchResult<T> = Result<T>;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
