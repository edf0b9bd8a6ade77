use std::{fs, path::Path};

use serde::Deserialize;

use crate::config::validator;
use crate::error::{Context, Result};

use super::Config;

/// Load a JSON configuration file, filling every omitted field from [`Config::builtin`].
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;

    let config = parse_config(&json)
        .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;

    validator::validate_config(&config)?;

    Ok(config)
}

fn parse_config(json: &str) -> serde_json::Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)?;
    Ok(raw.into_config())
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    endpoint_template: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    concurrency_limit: Option<usize>,
    #[serde(default)]
    maintenance_marker: Option<String>,
}

impl RawConfig {
    fn into_config(self) -> Config {
        let defaults = Config::builtin();
        Config {
            endpoint_template: self
                .endpoint_template
                .unwrap_or(defaults.endpoint_template),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            concurrency_limit: self.concurrency_limit.or(defaults.concurrency_limit),
            maintenance_marker: self
                .maintenance_marker
                .unwrap_or(defaults.maintenance_marker),
        }
    }
}
