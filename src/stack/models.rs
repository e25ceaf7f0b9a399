//! Wire types for the stack service API
//!
//! Field names follow the service's JSON contract exactly
//! (`provider_id`, `vector_db_id`, `embedding_dimension`, ...), so these
//! structs serialize straight onto the wire without rename attributes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A backend implementation of a service capability, as returned by the
/// provider-listing endpoint.
///
/// Read-only: the service owns these; the probe only echoes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Identifier used to address the provider (e.g. `milvus`)
    pub provider_id: String,
    /// Implementation type (e.g. `remote::milvus`, `inline::faiss`)
    pub provider_type: String,
}

/// Envelope for `GET /v1/providers?api={capability}`
#[derive(Debug, Deserialize)]
pub struct ProviderListResponse {
    pub data: Vec<ProviderInfo>,
}

/// One vector-database registration candidate.
///
/// Built once from configuration, sent as the JSON body of
/// `POST /v1/vector_dbs/register`, and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Name of the vector database to declare (unique per backend namespace)
    pub vector_db_id: String,
    /// Embedding model the database is bound to
    pub embedding_model: String,
    /// Vector width the model produces; the service rejects mismatches,
    /// the probe does not second-guess it client-side
    pub embedding_dimension: u32,
    /// Provider to register against. Not validated client-side; candidates
    /// may name providers the service never advertised
    pub provider_id: String,
}

/// Outcome of a single registration attempt.
///
/// Attempts never abort the run: every network or service failure is folded
/// into a variant here so candidates can be compared side by side. Status
/// and body are carried exactly as the transport returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx response
    Success { status: u16, body: String },
    /// Non-2xx response; body passed through verbatim
    ServiceError { status: u16, body: String },
    /// Request never produced an HTTP response (DNS, refused, timeout)
    TransportError { cause: String },
}

impl AttemptOutcome {
    /// True only for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A registered vector database, as returned by `GET /v1/vector_dbs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorDbInfo {
    /// The database name it was registered under
    pub identifier: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    pub provider_id: String,
}

/// Envelope for `GET /v1/vector_dbs`
#[derive(Debug, Deserialize)]
pub struct VectorDbListResponse {
    pub data: Vec<VectorDbInfo>,
}

/// Payload of `GET /v1/health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Failure of a read-side or cleanup operation (discovery, health, listing,
/// unregister).
///
/// `Service` means the endpoint answered and refused; `Transport` means it
/// never answered. Registration attempts do not use this type: they return
/// [`AttemptOutcome`] and never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The service responded with a non-success status (or an unusable body);
    /// status and body are kept verbatim for the report
    #[error("service returned status {status}: {body}")]
    Service { status: u16, body: String },
    /// The request never completed: DNS failure, connection refused, timeout
    #[error("transport failure: {cause}")]
    Transport { cause: String },
}
