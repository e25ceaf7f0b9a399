//! HTTP client for a Llama-Stack-compatible service
//!
//! Every read-side call classifies failures as `Service` (the endpoint
//! answered with a non-success status) or `Transport` (it never answered).
//! Registration never fails: rejections and transport faults both come back
//! as tagged [`AttemptOutcome`] values.

use super::models::{
    AttemptOutcome, HealthStatus, ProviderInfo, ProviderListResponse, RegistrationRequest,
    StackError, VectorDbInfo, VectorDbListResponse,
};
use super::traits::StackClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("stackprobe/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of [`StackClient`].
///
/// Thread-safe and cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct HttpStackClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpStackClient {
    /// Create a client for the service at `base_url`.
    ///
    /// The timeout applies to each request as a whole; expiry surfaces as a
    /// transport failure.
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
        })
    }

    /// The service address this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Read a response as (status, body). A failed body read is a transport
    /// fault (a half-received response is not a service answer); the error
    /// value is the cause.
    async fn read_response(response: reqwest::Response) -> Result<(u16, String), String> {
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Ok((status, body)),
            Err(e) => Err(e.to_string()),
        }
    }

    /// GET a JSON payload, mapping non-success statuses (and bodies that do
    /// not parse as `T`) to `StackError::Service` with the raw body intact.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, StackError> {
        let response = self.get(path).send().await.map_err(transport)?;

        let (status, body) = Self::read_response(response)
            .await
            .map_err(|cause| StackError::Transport { cause })?;
        if !(200..300).contains(&status) {
            return Err(StackError::Service { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("Unparseable {} payload: {}", path, e);
            StackError::Service { status, body }
        })
    }
}

fn transport(err: reqwest::Error) -> StackError {
    StackError::Transport {
        cause: err.to_string(),
    }
}

#[async_trait]
impl StackClient for HttpStackClient {
    async fn list_providers(&self, capability: &str) -> Result<Vec<ProviderInfo>, StackError> {
        let response = self
            .get("/v1/providers")
            .query(&[("api", capability)])
            .send()
            .await
            .map_err(transport)?;

        let (status, body) = Self::read_response(response)
            .await
            .map_err(|cause| StackError::Transport { cause })?;
        if status != 200 {
            return Err(StackError::Service { status, body });
        }

        let parsed: ProviderListResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("Unparseable provider list: {}", e);
            StackError::Service { status, body }
        })?;

        Ok(parsed.data)
    }

    async fn register_vector_db(&self, request: &RegistrationRequest) -> AttemptOutcome {
        let sent = self
            .authorize(
                self.client
                    .post(format!("{}/v1/vector_dbs/register", self.base_url))
                    .json(request),
            )
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::TransportError {
                    cause: e.to_string(),
                }
            }
        };

        match Self::read_response(response).await {
            Ok((status, body)) if (200..300).contains(&status) => {
                AttemptOutcome::Success { status, body }
            }
            Ok((status, body)) => AttemptOutcome::ServiceError { status, body },
            Err(cause) => AttemptOutcome::TransportError { cause },
        }
    }

    async fn health(&self) -> Result<HealthStatus, StackError> {
        self.get_json("/v1/health").await
    }

    async fn list_vector_dbs(&self) -> Result<Vec<VectorDbInfo>, StackError> {
        let parsed: VectorDbListResponse = self.get_json("/v1/vector_dbs").await?;
        Ok(parsed.data)
    }

    async fn unregister_vector_db(&self, vector_db_id: &str) -> Result<(), StackError> {
        // Ids land in the URL path here (registration carries them in the
        // body), so path-unsafe characters must be escaped or the DELETE
        // would be re-routed by segment normalization.
        let response = self
            .authorize(self.client.delete(format!(
                "{}/v1/vector_dbs/{}",
                self.base_url,
                urlencoding::encode(vector_db_id)
            )))
            .send()
            .await
            .map_err(transport)?;

        let (status, body) = Self::read_response(response)
            .await
            .map_err(|cause| StackError::Transport { cause })?;
        if !(200..300).contains(&status) {
            return Err(StackError::Service { status, body });
        }

        Ok(())
    }
}
