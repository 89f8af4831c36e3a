//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the crate.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{Operation, OperationProfiles};
use crate::resilience::policy::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Profile for calls that are not one of the named operations.
    pub default: RetryConfig,

    /// Per-operation profiles.
    pub operations: OperationsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Retry profile, durations in milliseconds.
///
/// Fields missing from a profile table take the executor defaults
/// (3 retries, 1000 ms), not the operation's built-in profile.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first.
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry.
    pub base_delay_ms: u64,

    /// Optional cap for a single backoff delay.
    pub max_delay_ms: Option<u64>,

    /// Random extra delay as a fraction of each delay (0.0 = none).
    pub jitter_ratio: f64,

    /// Optional overall time budget for one call.
    pub deadline_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY.as_millis() as u64)
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms: None,
            jitter_ratio: 0.0,
            deadline_ms: None,
        }
    }

    pub fn to_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::from_millis(self.max_retries, self.base_delay_ms);
        if let Some(max_delay_ms) = self.max_delay_ms {
            policy = policy.with_max_delay(Duration::from_millis(max_delay_ms));
        }
        if self.jitter_ratio > 0.0 {
            policy = policy.with_jitter(self.jitter_ratio);
        }
        if let Some(deadline_ms) = self.deadline_ms {
            policy = policy.with_deadline(Duration::from_millis(deadline_ms));
        }
        policy
    }
}

/// Retry profiles of the wrapped backend operations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OperationsConfig {
    pub auth: RetryConfig,
    pub records_read: RetryConfig,
    pub records_write: RetryConfig,
    pub generate_image: RetryConfig,
    pub storage_upload: RetryConfig,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            auth: RetryConfig::default(),
            records_read: RetryConfig::default(),
            records_write: RetryConfig::default(),
            generate_image: RetryConfig::new(2, 2000),
            storage_upload: RetryConfig::new(2, 1000),
        }
    }
}

impl OperationsConfig {
    pub fn get(&self, operation: Operation) -> &RetryConfig {
        match operation {
            Operation::Auth => &self.auth,
            Operation::RecordsRead => &self.records_read,
            Operation::RecordsWrite => &self.records_write,
            Operation::GenerateImage => &self.generate_image,
            Operation::StorageUpload => &self.storage_upload,
        }
    }

    pub fn to_profiles(&self) -> OperationProfiles {
        OperationProfiles {
            auth: self.auth.to_policy(),
            records_read: self.records_read.to_policy(),
            records_write: self.records_write.to_policy(),
            generate_image: self.generate_image.to_policy(),
            storage_upload: self.storage_upload.to_policy(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info", "resilient_call=debug").
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Record retry metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
