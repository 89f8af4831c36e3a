//! Resilient client over the hosted backend.
//!
//! # Responsibilities
//! - Define the backend seam (`RemoteBackend`), injected at construction
//! - Apply a retry profile per operation (auth, reads, writes, generation, upload)
//! - Give retried writes a stable idempotency key
//!
//! # Design Decisions
//! - No global client: callers own an `Arc<dyn RemoteBackend>`
//! - Payloads stay opaque JSON; schemas belong to the hosted service

pub mod backend;
pub mod idempotency;
pub mod profiles;
pub mod resilient;

pub use backend::{BackendError, Collection, Payload, RemoteBackend};
pub use idempotency::IdempotencyKey;
pub use profiles::{Operation, OperationProfiles, UnknownOperation};
pub use resilient::ResilientClient;
