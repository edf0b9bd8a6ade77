use crate::error::{AppError, Result};

use super::{Config, REQUIRED_PLACEHOLDERS};

/// Validate a configuration and surface every problem at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoint(config, &mut issues);
    validate_limits(config, &mut issues);

    if config.maintenance_marker.trim().is_empty() {
        issues.push("maintenance_marker must not be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_request(format!(
            "config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_endpoint(config: &Config, issues: &mut Vec<String>) {
    let template = config.endpoint_template.trim();
    if template.is_empty() {
        issues.push("endpoint_template must not be empty".to_string());
        return;
    }

    for placeholder in REQUIRED_PLACEHOLDERS {
        if !template.contains(&format!("{{{placeholder}}}")) {
            issues.push(format!(
                "endpoint_template is missing the `{{{placeholder}}}` placeholder"
            ));
        }
    }
}

fn validate_limits(config: &Config, issues: &mut Vec<String>) {
    if config.timeout_secs == 0 {
        issues.push("timeout_secs must be greater than zero".to_string());
    }
    if config.concurrency_limit == Some(0) {
        issues.push("concurrency_limit must be greater than zero when set".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        assert!(validate_config(&Config::builtin()).is_ok());
    }

    #[test]
    fn reports_missing_placeholders() {
        let config = Config::builtin().with_endpoint_template("https://example.test/{symbol}");
        let err = validate_config(&config).unwrap_err().to_string();

        assert!(err.contains("{period1}"));
        assert!(err.contains("{period2}"));
        assert!(err.contains("{interval}"));
        assert!(!err.contains("{symbol}"));
    }

    #[test]
    fn aggregates_limit_issues() {
        let config = Config {
            timeout_secs: 0,
            concurrency_limit: Some(0),
            maintenance_marker: "  ".to_string(),
            ..Config::builtin()
        };

        let err = validate_config(&config).unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(text.contains("timeout_secs"));
        assert!(text.contains("concurrency_limit"));
        assert!(text.contains("maintenance_marker"));
    }
}
