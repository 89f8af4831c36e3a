//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (jitter ratio, retry counts, deadlines)
//! - Check the log filter directive parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResilienceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::client::Operation;
use crate::config::schema::{ResilienceConfig, RetryConfig};

/// Upper bound on `max_retries` for any profile.
pub const MAX_RETRIES_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{profile}: jitter_ratio must be within [0, 1], got {value}")]
    JitterOutOfRange { profile: String, value: f64 },

    #[error("{profile}: max_delay_ms ({max_delay_ms}) is below base_delay_ms ({base_delay_ms})")]
    CapBelowBase {
        profile: String,
        base_delay_ms: u64,
        max_delay_ms: u64,
    },

    #[error("{profile}: deadline_ms must be greater than zero")]
    ZeroDeadline { profile: String },

    #[error("{profile}: max_retries {value} exceeds the limit of {limit}")]
    TooManyRetries { profile: String, value: u32, limit: u32 },

    #[error("invalid log_level '{value}': {reason}")]
    InvalidLogLevel { value: String, reason: String },
}

/// Check every profile and the observability section.
pub fn validate_config(config: &ResilienceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_profile("default", &config.default, &mut errors);
    for operation in Operation::ALL {
        validate_profile(operation.as_str(), config.operations.get(operation), &mut errors);
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::InvalidLogLevel {
            value: config.observability.log_level.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_profile(name: &str, profile: &RetryConfig, errors: &mut Vec<ValidationError>) {
    if !(0.0..=1.0).contains(&profile.jitter_ratio) {
        errors.push(ValidationError::JitterOutOfRange {
            profile: name.to_string(),
            value: profile.jitter_ratio,
        });
    }

    if let Some(max_delay_ms) = profile.max_delay_ms {
        if max_delay_ms < profile.base_delay_ms {
            errors.push(ValidationError::CapBelowBase {
                profile: name.to_string(),
                base_delay_ms: profile.base_delay_ms,
                max_delay_ms,
            });
        }
    }

    if profile.deadline_ms == Some(0) {
        errors.push(ValidationError::ZeroDeadline {
            profile: name.to_string(),
        });
    }

    if profile.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ValidationError::TooManyRetries {
            profile: name.to_string(),
            value: profile.max_retries,
            limit: MAX_RETRIES_LIMIT,
        });
    }
}
