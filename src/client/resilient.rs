//! Backend wrapper applying a retry profile to every remote call.

use std::sync::Arc;

use crate::client::backend::{Collection, Payload, RemoteBackend};
use crate::client::idempotency::IdempotencyKey;
use crate::client::profiles::{Operation, OperationProfiles};
use crate::config::ResilienceConfig;
use crate::observability::TelemetryObserver;
use crate::resilience::{execute_with_retry_observed, ClassifiedError};

/// Runs each backend operation through the executor with its own profile.
#[derive(Clone)]
pub struct ResilientClient {
    backend: Arc<dyn RemoteBackend>,
    profiles: OperationProfiles,
    metrics_enabled: bool,
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("backend", &"<backend>")
            .field("profiles", &self.profiles)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl ResilientClient {
    /// Metrics are recorded unless turned off with [`with_metrics`](Self::with_metrics),
    /// matching the configuration default.
    pub fn new(backend: Arc<dyn RemoteBackend>, profiles: OperationProfiles) -> Self {
        Self {
            backend,
            profiles,
            metrics_enabled: true,
        }
    }

    /// Profiles and metrics switch taken from a loaded configuration.
    pub fn from_config(backend: Arc<dyn RemoteBackend>, config: &ResilienceConfig) -> Self {
        Self::new(backend, config.operations.to_profiles()).with_metrics(config.observability.metrics_enabled)
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    pub fn profiles(&self) -> &OperationProfiles {
        &self.profiles
    }

    fn observer(&self, operation: Operation) -> TelemetryObserver {
        TelemetryObserver::new(operation.as_str()).with_metrics(self.metrics_enabled)
    }

    pub async fn current_user(&self) -> Result<Payload, ClassifiedError> {
        tracing::debug!("Fetching current user");
        let backend = self.backend.as_ref();
        execute_with_retry_observed(
            move || backend.current_user(),
            self.profiles.policy(Operation::Auth),
            &self.observer(Operation::Auth),
        )
        .await
    }

    pub async fn list_records(&self, collection: Collection, query: &Payload) -> Result<Vec<Payload>, ClassifiedError> {
        tracing::debug!(collection = %collection, "Listing records");
        let backend = self.backend.as_ref();
        execute_with_retry_observed(
            move || backend.list_records(collection, query),
            self.profiles.policy(Operation::RecordsRead),
            &self.observer(Operation::RecordsRead),
        )
        .await
    }

    /// Create a record under a fresh idempotency key shared by all attempts.
    pub async fn create_record(&self, collection: Collection, record: &Payload) -> Result<Payload, ClassifiedError> {
        self.create_record_with_key(collection, record, IdempotencyKey::new()).await
    }

    /// Create a record under a caller-chosen key, e.g. to make a user-level
    /// retry of the same submission de-duplicate as well.
    pub async fn create_record_with_key(
        &self,
        collection: Collection,
        record: &Payload,
        key: IdempotencyKey,
    ) -> Result<Payload, ClassifiedError> {
        tracing::debug!(collection = %collection, idempotency_key = %key, "Creating record");
        let backend = self.backend.as_ref();
        let key = &key;
        execute_with_retry_observed(
            move || backend.create_record(collection, record, key),
            self.profiles.policy(Operation::RecordsWrite),
            &self.observer(Operation::RecordsWrite),
        )
        .await
    }

    pub async fn generate_image(&self, request: &Payload) -> Result<Payload, ClassifiedError> {
        tracing::debug!("Requesting image generation");
        let backend = self.backend.as_ref();
        execute_with_retry_observed(
            move || backend.generate_image(request),
            self.profiles.policy(Operation::GenerateImage),
            &self.observer(Operation::GenerateImage),
        )
        .await
    }

    pub async fn upload(&self, path: &str, bytes: &[u8], options: &Payload) -> Result<Payload, ClassifiedError> {
        tracing::debug!(path, size = bytes.len(), "Uploading file");
        let backend = self.backend.as_ref();
        execute_with_retry_observed(
            move || backend.upload(path, bytes, options),
            self.profiles.policy(Operation::StorageUpload),
            &self.observer(Operation::StorageUpload),
        )
        .await
    }
}
