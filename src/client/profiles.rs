//! Per-operation retry profiles.

use std::str::FromStr;

use thiserror::Error;

use crate::resilience::RetryPolicy;

/// Remote operations the client wraps, each with its own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Auth,
    RecordsRead,
    RecordsWrite,
    GenerateImage,
    StorageUpload,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Auth,
        Operation::RecordsRead,
        Operation::RecordsWrite,
        Operation::GenerateImage,
        Operation::StorageUpload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Auth => "auth",
            Operation::RecordsRead => "records_read",
            Operation::RecordsWrite => "records_write",
            Operation::GenerateImage => "generate_image",
            Operation::StorageUpload => "storage_upload",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation '{0}' (expected one of: auth, records_read, records_write, generate_image, storage_upload)")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Retry policy for each wrapped operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationProfiles {
    pub auth: RetryPolicy,
    pub records_read: RetryPolicy,
    pub records_write: RetryPolicy,
    pub generate_image: RetryPolicy,
    pub storage_upload: RetryPolicy,
}

impl Default for OperationProfiles {
    /// Image generation is slow and costly: fewer, longer-spaced retries.
    /// Uploads retry twice. Everything else uses the executor defaults.
    fn default() -> Self {
        Self {
            auth: RetryPolicy::default(),
            records_read: RetryPolicy::default(),
            records_write: RetryPolicy::default(),
            generate_image: RetryPolicy::from_millis(2, 2000),
            storage_upload: RetryPolicy::from_millis(2, 1000),
        }
    }
}

impl OperationProfiles {
    /// Same policy for every operation.
    pub fn uniform(policy: RetryPolicy) -> Self {
        Self {
            auth: policy,
            records_read: policy,
            records_write: policy,
            generate_image: policy,
            storage_upload: policy,
        }
    }

    pub fn policy(&self, operation: Operation) -> &RetryPolicy {
        match operation {
            Operation::Auth => &self.auth,
            Operation::RecordsRead => &self.records_read,
            Operation::RecordsWrite => &self.records_write,
            Operation::GenerateImage => &self.generate_image,
            Operation::StorageUpload => &self.storage_upload,
        }
    }

    pub fn with(mut self, operation: Operation, policy: RetryPolicy) -> Self {
        let slot = match operation {
            Operation::Auth => &mut self.auth,
            Operation::RecordsRead => &mut self.records_read,
            Operation::RecordsWrite => &mut self.records_write,
            Operation::GenerateImage => &mut self.generate_image,
            Operation::StorageUpload => &mut self.storage_upload,
        };
        *slot = policy;
        self
    }
}
