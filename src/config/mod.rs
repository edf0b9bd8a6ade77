use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::load_config;
pub use validator::validate_config;

/// Chart endpoint with one placeholder per request field.
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?period1={period1}&period2={period2}&interval={interval}&events=div%2Csplit&includeAdjustedClose=true";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Text served by the upstream maintenance page instead of chart JSON.
pub const DEFAULT_MAINTENANCE_MARKER: &str = "Will be right back";

/// Placeholders every endpoint template has to carry.
pub const REQUIRED_PLACEHOLDERS: &[&str] = &["symbol", "period1", "period2", "interval"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// `None` launches every request at once.
    pub concurrency_limit: Option<usize>,
    pub maintenance_marker: String,
}

impl Config {
    pub fn builtin() -> Self {
        Config {
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency_limit: None,
            maintenance_marker: DEFAULT_MAINTENANCE_MARKER.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
