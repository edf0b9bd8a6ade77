use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// The caller asked for something the batch cannot run with.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The market-data API itself is down; aborts the whole batch.
    #[error("market data service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn invalid_request<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidRequest(msg.into())
    }

    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, AppError::ServiceUnavailable(_))
    }
}
