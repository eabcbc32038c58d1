use crate::config::types::{Config, CrawlerConfig, HeaderConfig, OutputConfig, RunEntry, ScopeConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_header_config(&config.headers)?;
    validate_scope_config(&config.scope)?;
    validate_output_config(&config.output)?;
    validate_runs(&config.runs)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.pool_exhaustion_markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "pool_exhaustion_markers cannot contain empty strings".to_string(),
        ));
    }

    Ok(())
}

/// Validates request header configuration
fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept_language", &config.accept_language),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }

        if value.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "{} contains control characters",
                name
            )));
        }
    }

    Ok(())
}

/// Validates exclusion rules
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    for ext in &config.excluded_extensions {
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must be a bare extension such as 'ipynb'",
                ext
            )));
        }
    }

    // An empty substring would exclude every URL
    if config.ignore_substrings.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "ignore_substrings cannot contain empty strings".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.database_name.is_empty() {
        return Err(ConfigError::Validation(
            "database_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates configured runs
fn validate_runs(runs: &[RunEntry]) -> Result<(), ConfigError> {
    for run in runs {
        validate_run(run)?;
    }
    Ok(())
}

/// Validates a single run entry
///
/// The start URL must be absolute with a scheme and a host, and the label must
/// be usable inside a file name.
pub fn validate_run(run: &RunEntry) -> Result<(), ConfigError> {
    let url = Url::parse(&run.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", run.start_url, e))
    })?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' has no host",
            run.start_url
        )));
    }

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use http or https",
            run.start_url
        )));
    }

    validate_label(&run.label)
}

/// Validates a run label
fn validate_label(label: &str) -> Result<(), ConfigError> {
    if label.trim().is_empty() {
        return Err(ConfigError::Validation("run label cannot be empty".to_string()));
    }

    if label
        .chars()
        .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control())
    {
        return Err(ConfigError::Validation(format!(
            "run label '{}' contains characters not allowed in file names",
            label
        )));
    }

    Ok(())
}
