//! Stackprobe
//!
//! A registration validation probe for Llama Stack vector-io backends:
//! - Provider discovery over the stack's REST API
//! - One registration attempt per configured candidate, in order
//! - Plain-text report comparing every outcome side by side
//! - Optional read-back verification and cleanup of registered databases

pub mod probe;
pub mod report;
pub mod stack;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::stack::models::RegistrationRequest;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YamlConfig {
    pub service: ServiceYamlConfig,
    pub candidates: Vec<CandidateYamlConfig>,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            service: ServiceYamlConfig::default(),
            candidates: default_candidates(),
        }
    }
}

/// Service connection section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceYamlConfig {
    pub base_url: String,
    pub capability: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceYamlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8321".into(),
            capability: "vector_io".into(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// One candidate registration config.
///
/// `vector_db_id` and `provider_id` are the interesting knobs; model and
/// dimension default to the stack's stock embedding model.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateYamlConfig {
    pub vector_db_id: String,
    pub provider_id: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: u32,
}

impl CandidateYamlConfig {
    pub fn into_request(self) -> RegistrationRequest {
        RegistrationRequest {
            vector_db_id: self.vector_db_id,
            embedding_model: self.embedding_model,
            embedding_dimension: self.embedding_dimension,
            provider_id: self.provider_id,
        }
    }
}

fn default_embedding_model() -> String {
    "granite-embedding-125m".to_string()
}

fn default_embedding_dimension() -> u32 {
    768
}

/// The stock comparison pair: the provider id the stack's docs advertise
/// next to the id its registry actually serves.
fn default_candidates() -> Vec<CandidateYamlConfig> {
    vec![
        CandidateYamlConfig {
            vector_db_id: "stackprobe-remote-milvus".into(),
            provider_id: "remote-milvus".into(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        },
        CandidateYamlConfig {
            vector_db_id: "stackprobe-milvus".into(),
            provider_id: "milvus".into(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        },
    ]
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub capability: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub candidates: Vec<RegistrationRequest>,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "stackprobe.yaml" in CWD. If the file
    /// doesn't exist, falls back to pure env var / defaults. A file that
    /// exists but fails to parse is an error when the path was passed
    /// explicitly.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path)?;

        // 2. Build Config with env var overrides
        let config = Self {
            base_url: std::env::var("STACKPROBE_BASE_URL").unwrap_or(yaml.service.base_url),
            capability: std::env::var("STACKPROBE_CAPABILITY").unwrap_or(yaml.service.capability),
            api_token: std::env::var("STACKPROBE_API_TOKEN")
                .ok()
                .or(yaml.service.api_token),
            timeout_secs: std::env::var("STACKPROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.service.timeout_secs),
            candidates: yaml
                .candidates
                .into_iter()
                .map(CandidateYamlConfig::into_request)
                .collect(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the service could never accept outright: empty
    /// identifiers and a zero dimension. Everything beyond that (unknown
    /// providers, model/dimension mismatches) is left for the service to
    /// judge and the probe to report.
    fn validate(&self) -> Result<()> {
        if self.capability.is_empty() {
            bail!("capability must not be empty");
        }
        for candidate in &self.candidates {
            if candidate.vector_db_id.is_empty() {
                bail!("candidate with empty vector_db_id");
            }
            if candidate.provider_id.is_empty() {
                bail!(
                    "candidate '{}': provider_id must not be empty",
                    candidate.vector_db_id
                );
            }
            if candidate.embedding_model.is_empty() {
                bail!(
                    "candidate '{}': embedding_model must not be empty",
                    candidate.vector_db_id
                );
            }
            if candidate.embedding_dimension == 0 {
                bail!(
                    "candidate '{}': embedding_dimension must be positive",
                    candidate.vector_db_id
                );
            }
        }
        Ok(())
    }

    /// Try to load and parse a YAML config file.
    ///
    /// A missing file means defaults. A file that exists but fails to
    /// parse is an error when the path was passed explicitly, and a
    /// warning (falling back to defaults) for the implicit
    /// "stackprobe.yaml" lookup.
    fn load_yaml(yaml_path: Option<&Path>) -> Result<YamlConfig> {
        let default_path = Path::new("stackprobe.yaml");
        let explicit = yaml_path.is_some();
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) if explicit => {
                    Err(e).with_context(|| format!("Failed to parse {}", path.display()))
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Ok(YamlConfig::default())
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Ok(YamlConfig::default())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
service:
  base_url: http://stack:8321
  capability: vector_io
  api_token: secret-token
  timeout_secs: 5

candidates:
  - vector_db_id: probe-a
    provider_id: milvus
  - vector_db_id: probe-b
    provider_id: faiss
    embedding_model: all-MiniLM-L6-v2
    embedding_dimension: 384
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.service.base_url, "http://stack:8321");
        assert_eq!(config.service.api_token, Some("secret-token".into()));
        assert_eq!(config.service.timeout_secs, 5);

        assert_eq!(config.candidates.len(), 2);
        // Unspecified model/dimension fall back to the stock embedding model
        assert_eq!(
            config.candidates[0].embedding_model,
            "granite-embedding-125m"
        );
        assert_eq!(config.candidates[0].embedding_dimension, 768);
        assert_eq!(config.candidates[1].embedding_model, "all-MiniLM-L6-v2");
        assert_eq!(config.candidates[1].embedding_dimension, 384);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:8321");
        assert_eq!(config.service.capability, "vector_io");
        assert!(config.service.api_token.is_none());
        assert_eq!(config.service.timeout_secs, 30);

        // The default candidate pair compares the documented provider id
        // against the one the registry actually serves
        assert_eq!(config.candidates.len(), 2);
        assert_eq!(config.candidates[0].provider_id, "remote-milvus");
        assert_eq!(config.candidates[1].provider_id, "milvus");
    }

    #[test]
    fn test_explicit_empty_candidate_list_is_kept() {
        // An explicit `candidates: []` means "no attempts", not "use defaults"
        let yaml = r#"
service:
  base_url: http://stack:8321
candidates: []
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.candidates.is_empty());
    }

    fn config_with_candidate(candidate: RegistrationRequest) -> Config {
        Config {
            base_url: "http://localhost:8321".into(),
            capability: "vector_io".into(),
            api_token: None,
            timeout_secs: 30,
            candidates: vec![candidate],
        }
    }

    #[test]
    fn test_validation_rejects_zero_dimension() {
        let config = config_with_candidate(RegistrationRequest {
            vector_db_id: "probe-a".into(),
            embedding_model: "granite-embedding-125m".into(),
            embedding_dimension: 0,
            provider_id: "milvus".into(),
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embedding_dimension"));
    }

    #[test]
    fn test_validation_rejects_empty_provider_id() {
        let config = config_with_candidate(RegistrationRequest {
            vector_db_id: "probe-a".into(),
            embedding_model: "granite-embedding-125m".into(),
            embedding_dimension: 768,
            provider_id: String::new(),
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider_id"));
    }

    #[test]
    fn test_invalid_candidate_rejected_at_load() {
        let yaml = r#"
candidates:
  - vector_db_id: probe-a
    provider_id: ""
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("stackprobe.yaml");
        std::fs::write(&file_path, yaml).unwrap();

        assert!(Config::from_yaml_and_env(Some(&file_path)).is_err());
    }

    #[test]
    fn test_unparseable_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("stackprobe.yaml");
        std::fs::write(&file_path, "candidates: [not: {valid").unwrap();

        let err = Config::from_yaml_and_env(Some(&file_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_candidate_conversion() {
        let candidate = CandidateYamlConfig {
            vector_db_id: "probe-a".into(),
            provider_id: "milvus".into(),
            embedding_model: "granite-embedding-125m".into(),
            embedding_dimension: 768,
        };
        let request = candidate.into_request();
        assert_eq!(request.vector_db_id, "probe-a");
        assert_eq!(request.provider_id, "milvus");
        assert_eq!(request.embedding_dimension, 768);
    }

    /// Combined test for YAML file loading, env var overrides, and the
    /// no-file fallback. Runs as a single test to avoid parallel env var
    /// race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        // Helper to clear all config env vars
        fn clear_env() {
            for var in &[
                "STACKPROBE_BASE_URL",
                "STACKPROBE_CAPABILITY",
                "STACKPROBE_API_TOKEN",
                "STACKPROBE_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
service:
  base_url: http://yaml-host:8321
  capability: yaml_io
  timeout_secs: 7
candidates:
  - vector_db_id: yaml-db
    provider_id: yaml-provider
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("stackprobe.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.base_url, "http://yaml-host:8321");
        assert_eq!(config.capability, "yaml_io");
        assert_eq!(config.timeout_secs, 7);
        assert!(config.api_token.is_none());
        assert_eq!(config.candidates.len(), 1);
        assert_eq!(config.candidates[0].vector_db_id, "yaml-db");

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("STACKPROBE_BASE_URL", "http://env-host:8321");
        std::env::set_var("STACKPROBE_TIMEOUT_SECS", "11");
        std::env::set_var("STACKPROBE_API_TOKEN", "env-token");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.base_url, "http://env-host:8321");
        assert_eq!(config.timeout_secs, 11);
        assert_eq!(config.api_token, Some("env-token".into()));
        // YAML value still used where no env override
        assert_eq!(config.capability, "yaml_io");

        // --- Phase 3: Unparseable env timeout falls back to YAML ---
        std::env::set_var("STACKPROBE_TIMEOUT_SECS", "not-a-number");
        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.timeout_secs, 7);

        clear_env();

        // --- Phase 4: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-stackprobe-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.base_url, "http://localhost:8321");
        assert_eq!(config.capability, "vector_io");
        assert_eq!(config.candidates.len(), 2);
    }
}
