//! Human-readable rendering of probe results
//!
//! The report is the product of a probe run. Status codes and bodies are
//! echoed exactly as the transport returned them, with no reformatting or
//! truncation.

use crate::stack::models::{
    AttemptOutcome, ProviderInfo, RegistrationRequest, StackError, VectorDbInfo,
};
use std::io::{self, Write};

/// Renders probe results to an output stream.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter and hand back the sink (used by tests to
    /// inspect what was written).
    pub fn into_inner(self) -> W {
        self.out
    }

    /// One header line naming the capability and how many providers
    /// discovery returned.
    pub fn discovery_header(&mut self, capability: &str, count: usize) -> io::Result<()> {
        writeln!(self.out, "Discovered {} provider(s) for '{}':", count, capability)
    }

    /// The provider enumeration: exactly one line per descriptor, nothing
    /// else.
    pub fn provider_list(&mut self, providers: &[ProviderInfo]) -> io::Result<()> {
        for provider in providers {
            writeln!(self.out, "- {} ({})", provider.provider_id, provider.provider_type)?;
        }
        Ok(())
    }

    /// Discovery failed; the run is halting. Service failures render the
    /// status and (when present) the verbatim body, transport failures the
    /// cause.
    pub fn discovery_failure(&mut self, error: &StackError) -> io::Result<()> {
        match error {
            StackError::Service { status, body } => {
                writeln!(self.out, "Provider discovery failed with status {}", status)?;
                if !body.is_empty() {
                    writeln!(self.out, "Response body: {}", body)?;
                }
                Ok(())
            }
            StackError::Transport { cause } => {
                writeln!(self.out, "Provider discovery failed: {}", cause)
            }
        }
    }

    /// Header line for one candidate attempt (1-based position).
    pub fn attempt_header(
        &mut self,
        position: usize,
        total: usize,
        request: &RegistrationRequest,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "Candidate {}/{}: provider '{}', vector_db '{}', model '{}' dim {}",
            position,
            total,
            request.provider_id,
            request.vector_db_id,
            request.embedding_model,
            request.embedding_dimension
        )
    }

    /// Warn that a candidate names a provider discovery did not return.
    /// The attempt still happens.
    pub fn unknown_provider_note(&mut self, provider_id: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "Note: provider '{}' was not returned by discovery",
            provider_id
        )
    }

    /// The outcome of one attempt. HTTP answers render as status plus
    /// verbatim body; transport faults render the cause.
    pub fn attempt_outcome(&mut self, outcome: &AttemptOutcome) -> io::Result<()> {
        match outcome {
            AttemptOutcome::Success { status, body }
            | AttemptOutcome::ServiceError { status, body } => {
                writeln!(self.out, "Registration response: {}", status)?;
                if !body.is_empty() {
                    writeln!(self.out, "Response body: {}", body)?;
                }
                Ok(())
            }
            AttemptOutcome::TransportError { cause } => {
                writeln!(self.out, "Registration failed: {}", cause)
            }
        }
    }

    /// Blank separator line between report sections.
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// The verification read-back itself failed; the probe results stand.
    pub fn read_back_failure(&mut self, error: &StackError) -> io::Result<()> {
        writeln!(self.out, "Read-back failed: {}", error)
    }

    /// Read-back listing of what the service now has registered.
    pub fn vector_db_list(&mut self, dbs: &[VectorDbInfo]) -> io::Result<()> {
        writeln!(self.out, "Registered vector databases ({}):", dbs.len())?;
        for db in dbs {
            writeln!(
                self.out,
                "- {} (provider '{}', model '{}' dim {})",
                db.identifier, db.provider_id, db.embedding_model, db.embedding_dimension
            )?;
        }
        Ok(())
    }

    /// Whether a candidate's vector_db_id showed up in the read-back listing.
    pub fn verification(&mut self, vector_db_id: &str, found: bool) -> io::Result<()> {
        if found {
            writeln!(self.out, "Verified: '{}' is registered", vector_db_id)
        } else {
            writeln!(self.out, "Missing: '{}' was not found in the registry", vector_db_id)
        }
    }

    /// Result of unregistering one candidate database during cleanup.
    pub fn cleanup(
        &mut self,
        vector_db_id: &str,
        result: &Result<(), StackError>,
    ) -> io::Result<()> {
        match result {
            Ok(()) => writeln!(self.out, "Unregistered '{}'", vector_db_id),
            Err(e) => writeln!(self.out, "Failed to unregister '{}': {}", vector_db_id, e),
        }
    }

    /// Final tally line.
    pub fn summary(&mut self, succeeded: usize, total: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Summary: {}/{} candidate registration(s) succeeded",
            succeeded, total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Reporter<Vec<u8>>) -> io::Result<()>,
    {
        let mut reporter = Reporter::new(Vec::new());
        f(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn provider(id: &str, ty: &str) -> ProviderInfo {
        ProviderInfo {
            provider_id: id.to_string(),
            provider_type: ty.to_string(),
        }
    }

    #[test]
    fn test_provider_list_emits_one_line_per_descriptor() {
        let providers = vec![
            provider("milvus", "remote::milvus"),
            provider("faiss", "inline::faiss"),
            provider("chromadb", "remote::chromadb"),
        ];

        let output = render(|r| r.provider_list(&providers));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        for (line, p) in lines.iter().zip(&providers) {
            assert!(line.contains(&p.provider_id));
            assert!(line.contains(&p.provider_type));
        }
    }

    #[test]
    fn test_provider_list_empty_emits_nothing() {
        let output = render(|r| r.provider_list(&[]));
        assert!(output.is_empty());
    }

    #[test]
    fn test_provider_line_format() {
        let output = render(|r| r.provider_list(&[provider("milvus", "remote::milvus")]));
        assert_eq!(output, "- milvus (remote::milvus)\n");
    }

    #[test]
    fn test_service_error_outcome_renders_status_and_body() {
        let outcome = AttemptOutcome::ServiceError {
            status: 400,
            body: r#"{"detail": "unknown provider"}"#.to_string(),
        };

        let output = render(|r| r.attempt_outcome(&outcome));
        assert_eq!(
            output,
            "Registration response: 400\nResponse body: {\"detail\": \"unknown provider\"}\n"
        );
    }

    #[test]
    fn test_success_outcome_with_empty_body_omits_body_line() {
        let outcome = AttemptOutcome::Success {
            status: 200,
            body: String::new(),
        };

        let output = render(|r| r.attempt_outcome(&outcome));
        assert_eq!(output, "Registration response: 200\n");
    }

    #[test]
    fn test_transport_outcome_renders_cause() {
        let outcome = AttemptOutcome::TransportError {
            cause: "connection refused".to_string(),
        };

        let output = render(|r| r.attempt_outcome(&outcome));
        assert_eq!(output, "Registration failed: connection refused\n");
    }

    #[test]
    fn test_body_is_not_transformed() {
        // Whatever bytes the service sent come back out, whitespace and all.
        let body = "  {\"detail\":\t\"weird   spacing\"} ";
        let outcome = AttemptOutcome::ServiceError {
            status: 422,
            body: body.to_string(),
        };

        let output = render(|r| r.attempt_outcome(&outcome));
        assert!(output.contains(body));
    }

    #[test]
    fn test_discovery_failure_with_status() {
        let error = StackError::Service {
            status: 503,
            body: "overloaded".to_string(),
        };

        let output = render(|r| r.discovery_failure(&error));
        assert_eq!(
            output,
            "Provider discovery failed with status 503\nResponse body: overloaded\n"
        );
    }

    #[test]
    fn test_discovery_failure_transport() {
        let error = StackError::Transport {
            cause: "dns error".to_string(),
        };

        let output = render(|r| r.discovery_failure(&error));
        assert_eq!(output, "Provider discovery failed: dns error\n");
    }

    #[test]
    fn test_unknown_provider_note() {
        let output = render(|r| r.unknown_provider_note("remote-milvus"));
        assert_eq!(
            output,
            "Note: provider 'remote-milvus' was not returned by discovery\n"
        );
    }

    #[test]
    fn test_summary_line() {
        let output = render(|r| r.summary(1, 2));
        assert_eq!(output, "Summary: 1/2 candidate registration(s) succeeded\n");
    }
}
