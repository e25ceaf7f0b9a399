//! Trait abstraction for stack service operations
//!
//! Same seam pattern as the rest of the probe: async trait + Send + Sync so
//! the runner can hold an `Arc<dyn StackClient>` and tests can swap in the
//! scripted mock.

use super::models::{
    AttemptOutcome, HealthStatus, ProviderInfo, RegistrationRequest, StackError, VectorDbInfo,
};
use async_trait::async_trait;

/// Abstract interface to a Llama-Stack-compatible service.
///
/// # Implementations
///
/// - [`HttpStackClient`](super::HttpStackClient): real HTTP client
/// - [`MockStackClient`](super::MockStackClient): scripted responses plus a
///   call log, for tests
#[async_trait]
pub trait StackClient: Send + Sync {
    /// List the providers implementing `capability`.
    ///
    /// An empty list is a valid answer, not an error.
    ///
    /// # Errors
    ///
    /// `StackError::Service` for a non-success response (status and body kept
    /// verbatim), `StackError::Transport` when no response arrived at all.
    async fn list_providers(&self, capability: &str) -> Result<Vec<ProviderInfo>, StackError>;

    /// Submit one registration request and capture whatever came back.
    ///
    /// Never fails: service rejections and transport faults are folded into
    /// [`AttemptOutcome`] variants so the caller can keep iterating
    /// candidates and compare outcomes.
    async fn register_vector_db(&self, request: &RegistrationRequest) -> AttemptOutcome;

    /// Service liveness check.
    async fn health(&self) -> Result<HealthStatus, StackError>;

    /// List the vector databases currently registered with the service.
    async fn list_vector_dbs(&self) -> Result<Vec<VectorDbInfo>, StackError>;

    /// Unregister a vector database by its identifier.
    async fn unregister_vector_db(&self, vector_db_id: &str) -> Result<(), StackError>;
}
