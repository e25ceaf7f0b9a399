//! Scripted mock implementation of StackClient for testing without a
//! running service.
//!
//! Responses are queued up front; every registration call is recorded so
//! tests can assert exactly which requests went out and in what order.

use super::models::{
    AttemptOutcome, HealthStatus, ProviderInfo, RegistrationRequest, StackError, VectorDbInfo,
};
use super::traits::StackClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Scripted mock implementation of [`StackClient`] for tests.
///
/// # Example
///
/// ```rust
/// use stackprobe::stack::mock::MockStackClient;
/// use stackprobe::stack::models::{ProviderInfo, RegistrationRequest};
/// use stackprobe::stack::traits::StackClient;
///
/// # tokio_test::block_on(async {
/// let client = MockStackClient::new(vec![ProviderInfo {
///     provider_id: "milvus".to_string(),
///     provider_type: "remote::milvus".to_string(),
/// }]);
///
/// let providers = client.list_providers("vector_io").await.unwrap();
/// assert_eq!(providers.len(), 1);
///
/// // Unqueued registration calls succeed with an empty 200
/// let request = RegistrationRequest {
///     vector_db_id: "probe-db".to_string(),
///     embedding_model: "granite-embedding-125m".to_string(),
///     embedding_dimension: 768,
///     provider_id: "milvus".to_string(),
/// };
/// let outcome = client.register_vector_db(&request).await;
/// assert!(outcome.is_success());
/// assert_eq!(client.register_call_count().await, 1);
/// # });
/// ```
pub struct MockStackClient {
    /// What `list_providers` returns (one scripted answer for the whole run)
    pub providers: RwLock<Result<Vec<ProviderInfo>, StackError>>,
    /// Outcomes handed out per registration call, in order; when the queue
    /// runs dry, further calls get a 200 success with an empty body
    pub outcomes: RwLock<VecDeque<AttemptOutcome>>,
    /// Every registration request received, in call order
    pub register_calls: RwLock<Vec<RegistrationRequest>>,
    /// What `list_vector_dbs` returns
    pub vector_dbs: RwLock<Result<Vec<VectorDbInfo>, StackError>>,
    /// Identifiers passed to `unregister_vector_db`, in call order
    pub unregister_calls: RwLock<Vec<String>>,
}

impl MockStackClient {
    /// Mock that discovers the given providers and answers every
    /// registration with a 200 success.
    pub fn new(providers: Vec<ProviderInfo>) -> Self {
        Self {
            providers: RwLock::new(Ok(providers)),
            outcomes: RwLock::new(VecDeque::new()),
            register_calls: RwLock::new(Vec::new()),
            vector_dbs: RwLock::new(Ok(Vec::new())),
            unregister_calls: RwLock::new(Vec::new()),
        }
    }

    /// Mock whose discovery fails with the given error.
    pub fn with_discovery_failure(error: StackError) -> Self {
        Self {
            providers: RwLock::new(Err(error)),
            outcomes: RwLock::new(VecDeque::new()),
            register_calls: RwLock::new(Vec::new()),
            vector_dbs: RwLock::new(Ok(Vec::new())),
            unregister_calls: RwLock::new(Vec::new()),
        }
    }

    /// Queue an outcome for the next unanswered registration call.
    pub async fn push_outcome(&self, outcome: AttemptOutcome) {
        self.outcomes.write().await.push_back(outcome);
    }

    /// Number of registration requests received so far.
    pub async fn register_call_count(&self) -> usize {
        self.register_calls.read().await.len()
    }
}

#[async_trait]
impl StackClient for MockStackClient {
    async fn list_providers(&self, _capability: &str) -> Result<Vec<ProviderInfo>, StackError> {
        self.providers.read().await.clone()
    }

    async fn register_vector_db(&self, request: &RegistrationRequest) -> AttemptOutcome {
        self.register_calls.write().await.push(request.clone());

        self.outcomes
            .write()
            .await
            .pop_front()
            .unwrap_or(AttemptOutcome::Success {
                status: 200,
                body: String::new(),
            })
    }

    async fn health(&self) -> Result<HealthStatus, StackError> {
        Ok(HealthStatus {
            status: "OK".to_string(),
        })
    }

    async fn list_vector_dbs(&self) -> Result<Vec<VectorDbInfo>, StackError> {
        self.vector_dbs.read().await.clone()
    }

    async fn unregister_vector_db(&self, vector_db_id: &str) -> Result<(), StackError> {
        self.unregister_calls
            .write()
            .await
            .push(vector_db_id.to_string());
        Ok(())
    }
}
