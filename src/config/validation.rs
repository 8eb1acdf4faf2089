use crate::config::types::{
    Config, FetchConfig, FormatterConfig, PipelineConfig, SearchConfig, StorageConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_fetch_config(&config.fetch)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_storage_config(&config.storage)?;
    validate_formatter_config(&config.formatter)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if !config.endpoint.contains("{query}") {
        return Err(ConfigError::Validation(format!(
            "endpoint must contain a {{query}} placeholder, got '{}'",
            config.endpoint
        )));
    }

    let probe = config.endpoint.replace("{query}", "probe");
    let url = Url::parse(&probe)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "endpoint must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if Selector::parse(&config.next_selector).is_err() {
        return Err(ConfigError::Validation(format!(
            "next_selector is not a valid CSS selector: '{}'",
            config.next_selector
        )));
    }

    if config.file_extension.is_empty() {
        return Err(ConfigError::Validation(
            "file_extension cannot be empty".to_string(),
        ));
    }

    if config.max_links < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links must be >= 1, got {}",
            config.max_links
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_ms must be >= 100ms, got {}ms",
            config.page_timeout_ms
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the cleaning rules
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.column_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "column_keywords cannot be empty".to_string(),
        ));
    }

    if config.column_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "column_keywords cannot contain empty entries".to_string(),
        ));
    }

    if config.phone_keyword.is_empty() {
        return Err(ConfigError::Validation(
            "phone_keyword cannot be empty".to_string(),
        ));
    }

    // A phone column must be selectable, otherwise every document is skipped
    let phone = config.phone_keyword.to_lowercase();
    if !config
        .column_keywords
        .iter()
        .any(|k| phone.contains(&k.to_lowercase()))
    {
        return Err(ConfigError::Validation(format!(
            "phone_keyword '{}' is not matched by any column keyword",
            config.phone_keyword
        )));
    }

    if config.forbidden_terms.iter().any(|t| t.is_empty()) {
        return Err(ConfigError::Validation(
            "forbidden_terms cannot contain empty entries".to_string(),
        ));
    }

    if config.min_phone_digits < 1 {
        return Err(ConfigError::Validation(
            "min_phone_digits must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.links_file.is_empty() {
        return Err(ConfigError::Validation(
            "links_file cannot be empty".to_string(),
        ));
    }

    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation(
            "csv_dir cannot be empty".to_string(),
        ));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates formatter configuration
fn validate_formatter_config(config: &FormatterConfig) -> Result<(), ConfigError> {
    if config.enabled && config.program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "formatter program cannot be empty when the formatter is enabled".to_string(),
        ));
    }

    Ok(())
}
