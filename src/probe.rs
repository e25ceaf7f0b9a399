//! Registration validation workflow
//!
//! Linear, fully sequential: discover providers, then fire each configured
//! candidate exactly once, then summarize. Discovery failure halts the run
//! before any attempt (nothing downstream is meaningful without
//! connectivity); attempt failures never halt it, because the whole point is
//! comparing outcomes across candidates.

use crate::report::Reporter;
use crate::stack::models::{AttemptOutcome, ProviderInfo, RegistrationRequest, StackError};
use crate::stack::traits::StackClient;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;

/// What happened to one candidate.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub request: RegistrationRequest,
    /// Whether discovery returned this candidate's provider_id. Purely
    /// informational; the attempt happens either way.
    pub discovered_provider: bool,
    pub outcome: AttemptOutcome,
}

/// Everything a probe run produced, for callers that want more than the
/// rendered report (exit codes, verify/cleanup passes, tests).
#[derive(Debug)]
pub struct ProbeSummary {
    /// Providers discovery returned; empty when discovery failed
    pub providers: Vec<ProviderInfo>,
    /// Set when discovery halted the run; no attempts were made
    pub discovery_failure: Option<StackError>,
    /// One entry per configured candidate, in configured order
    pub results: Vec<CandidateResult>,
}

impl ProbeSummary {
    /// True when discovery worked and every candidate registered.
    pub fn succeeded(&self) -> bool {
        self.discovery_failure.is_none() && self.results.iter().all(|r| r.outcome.is_success())
    }

    /// Number of candidates whose registration succeeded.
    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }
}

/// Drives the probe workflow against a [`StackClient`].
pub struct ProbeRunner {
    client: Arc<dyn StackClient>,
    capability: String,
    candidates: Vec<RegistrationRequest>,
}

impl ProbeRunner {
    pub fn new(
        client: Arc<dyn StackClient>,
        capability: impl Into<String>,
        candidates: Vec<RegistrationRequest>,
    ) -> Self {
        Self {
            client,
            capability: capability.into(),
            candidates,
        }
    }

    /// Run the full workflow, writing the report as it goes.
    ///
    /// Returns `Ok` even when discovery or candidates failed: those are
    /// results, recorded in the summary. An `Err` here means the report
    /// itself could not be written.
    pub async fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<ProbeSummary> {
        tracing::debug!("Discovering providers for capability '{}'", self.capability);

        let providers = match self.client.list_providers(&self.capability).await {
            Ok(providers) => providers,
            Err(error) => {
                tracing::warn!("Provider discovery failed: {}", error);
                reporter.discovery_failure(&error)?;
                return Ok(ProbeSummary {
                    providers: Vec::new(),
                    discovery_failure: Some(error),
                    results: Vec::new(),
                });
            }
        };

        reporter.discovery_header(&self.capability, providers.len())?;
        reporter.provider_list(&providers)?;

        let total = self.candidates.len();
        let mut results = Vec::with_capacity(total);

        for (index, request) in self.candidates.iter().enumerate() {
            reporter.blank()?;
            reporter.attempt_header(index + 1, total, request)?;

            let discovered_provider = providers
                .iter()
                .any(|p| p.provider_id == request.provider_id);
            if !discovered_provider {
                reporter.unknown_provider_note(&request.provider_id)?;
            }

            let outcome = self.client.register_vector_db(request).await;
            tracing::debug!(
                "Candidate '{}' (provider '{}') outcome: {:?}",
                request.vector_db_id,
                request.provider_id,
                outcome
            );
            reporter.attempt_outcome(&outcome)?;

            results.push(CandidateResult {
                request: request.clone(),
                discovered_provider,
                outcome,
            });
        }

        reporter.blank()?;
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        reporter.summary(succeeded, total)?;

        Ok(ProbeSummary {
            providers,
            discovery_failure: None,
            results,
        })
    }

    /// Read back the service's vector-db registry and report whether each
    /// candidate's id is present. Non-fatal: a failed read-back is reported
    /// and the summary stands as it was.
    pub async fn verify<W: Write>(
        &self,
        summary: &ProbeSummary,
        reporter: &mut Reporter<W>,
    ) -> Result<()> {
        reporter.blank()?;

        let dbs = match self.client.list_vector_dbs().await {
            Ok(dbs) => dbs,
            Err(error) => {
                tracing::warn!("Vector-db read-back failed: {}", error);
                reporter.read_back_failure(&error)?;
                return Ok(());
            }
        };

        reporter.vector_db_list(&dbs)?;
        for result in &summary.results {
            let found = dbs
                .iter()
                .any(|db| db.identifier == result.request.vector_db_id);
            reporter.verification(&result.request.vector_db_id, found)?;
        }

        Ok(())
    }

    /// Unregister the databases this run successfully created. Only
    /// successful candidates are touched; duplicate ids are unregistered
    /// once. A run that registered nothing emits nothing.
    pub async fn cleanup<W: Write>(
        &self,
        summary: &ProbeSummary,
        reporter: &mut Reporter<W>,
    ) -> Result<()> {
        let mut targets: Vec<&str> = Vec::new();
        for result in &summary.results {
            if !result.outcome.is_success() {
                continue;
            }
            let id = result.request.vector_db_id.as_str();
            if !targets.contains(&id) {
                targets.push(id);
            }
        }
        if targets.is_empty() {
            return Ok(());
        }

        reporter.blank()?;
        for id in targets {
            let outcome = self.client.unregister_vector_db(id).await;
            if let Err(ref error) = outcome {
                tracing::warn!("Failed to unregister '{}': {}", id, error);
            }
            reporter.cleanup(id, &outcome)?;
        }

        Ok(())
    }
}
