use super::models::{Config, NamingConfig};
use std::collections::HashSet;
use thiserror::Error;

pub const AI_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=30;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("naming.pattern must not be empty")]
    EmptyPattern,

    #[error("naming.ai_timeout_seconds must be within 1..=30, got {value}")]
    InvalidAiTimeout { value: u64 },

    #[error("Duplicate provider profile id '{id}'")]
    DuplicateProfileId { id: String },

    #[error("Provider profile id must not be empty")]
    EmptyProfileId,

    #[error("Exactly one provider profile must be the default, found {count}")]
    DefaultProfileCount { count: usize },

    #[error("Provider '{id}' has an invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        id: String,
        endpoint: String,
        reason: String,
    },

    #[error("Invalid proxy URL '{proxy}': {reason}")]
    InvalidProxy { proxy: String, reason: String },

    #[error("history.{field} must be positive")]
    InvalidHistoryLimit { field: &'static str },

    #[error("http.{field} must be positive")]
    InvalidHttpTimeout { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_naming(&config.naming)?;
    validate_providers(config)?;
    validate_http(config)?;
    validate_history(config)?;
    Ok(())
}

/// Naming rules; also applied to runtime settings updates
pub fn validate_naming(naming: &NamingConfig) -> Result<(), ValidationError> {
    if naming.pattern.trim().is_empty() {
        return Err(ValidationError::EmptyPattern);
    }

    if !AI_TIMEOUT_RANGE.contains(&naming.ai_timeout_seconds) {
        return Err(ValidationError::InvalidAiTimeout {
            value: naming.ai_timeout_seconds,
        });
    }

    Ok(())
}

/// Unique ids, exactly one default, parseable endpoints.
///
/// An empty endpoint is allowed: that profile is simply unusable for AI
/// naming until configured.
fn validate_providers(config: &Config) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for profile in &config.providers {
        if profile.id.trim().is_empty() {
            return Err(ValidationError::EmptyProfileId);
        }

        if !seen.insert(profile.id.as_str()) {
            return Err(ValidationError::DuplicateProfileId {
                id: profile.id.clone(),
            });
        }

        if !profile.endpoint.is_empty() {
            if let Err(e) = url::Url::parse(&profile.endpoint) {
                return Err(ValidationError::InvalidEndpoint {
                    id: profile.id.clone(),
                    endpoint: profile.endpoint.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let count = config.providers.iter().filter(|p| p.is_default).count();
    if count != 1 {
        return Err(ValidationError::DefaultProfileCount { count });
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.connect_timeout_secs == 0 {
        return Err(ValidationError::InvalidHttpTimeout {
            field: "connect_timeout_secs",
        });
    }

    if config.http.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidHttpTimeout {
            field: "request_timeout_secs",
        });
    }

    if let Some(proxy) = &config.http.proxy {
        if let Err(e) = url::Url::parse(proxy) {
            return Err(ValidationError::InvalidProxy {
                proxy: proxy.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_history(config: &Config) -> Result<(), ValidationError> {
    if config.history.max_entries == 0 {
        return Err(ValidationError::InvalidHistoryLimit {
            field: "max_entries",
        });
    }

    if config.history.retention_hours == 0 {
        return Err(ValidationError::InvalidHistoryLimit {
            field: "retention_hours",
        });
    }

    Ok(())
}
