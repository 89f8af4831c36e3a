//! Remote backend seam.
//!
//! Authentication, records, image generation and storage live in a hosted
//! service. Its payloads are opaque JSON here; the crate only decides how
//! calls into it are retried.

use async_trait::async_trait;
use thiserror::Error;

use crate::client::idempotency::IdempotencyKey;

/// Opaque request/response body of the hosted service.
pub type Payload = serde_json::Value;

/// Record collections kept by the hosted database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Generations,
    CommunityPosts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Generations => "generations",
            Collection::CommunityPosts => "community_posts",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never reached the service or the connection dropped.
    #[error("fetch failed: {0}")]
    Transport(String),

    /// The service did not answer in time.
    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("not authenticated")]
    Unauthorized,

    /// The service answered with an error.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

/// Hosted backend operations. Implementations are injected into
/// [`ResilientClient`](crate::client::ResilientClient), never reached globally.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Currently signed-in user.
    async fn current_user(&self) -> Result<Payload, BackendError>;

    async fn list_records(&self, collection: Collection, query: &Payload) -> Result<Vec<Payload>, BackendError>;

    /// Create a record. Every attempt of one logical write carries the same key.
    async fn create_record(
        &self,
        collection: Collection,
        record: &Payload,
        key: &IdempotencyKey,
    ) -> Result<Payload, BackendError>;

    async fn generate_image(&self, request: &Payload) -> Result<Payload, BackendError>;

    /// Store `bytes` at `path` and describe the stored object.
    async fn upload(&self, path: &str, bytes: &[u8], options: &Payload) -> Result<Payload, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{classify_error, ErrorKind, Failure};

    #[test]
    fn test_backend_errors_classify() {
        let transport = BackendError::Transport("dns".into());
        assert_eq!(classify_error(Failure::Error(&transport)).kind(), ErrorKind::TransportFailure);

        let timeout = BackendError::Timeout("30s".into());
        assert_eq!(classify_error(Failure::Error(&timeout)).kind(), ErrorKind::TimeoutFailure);

        let rejected = BackendError::Rejected {
            status: 422,
            message: "Please upload at least 3 photos".into(),
        };
        let message = classify_error(Failure::Error(&rejected));
        assert_eq!(message.kind(), ErrorKind::OperationError);
        assert_eq!(message.text(), "Please upload at least 3 photos");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Generations.to_string(), "generations");
        assert_eq!(Collection::CommunityPosts.as_str(), "community_posts");
    }
}
