//! Run configuration.
//!
//! A [`SimConfig`] is built once at process start (defaults, then the
//! environment, then command-line overrides) and passed by reference into
//! each stage. Nothing reads the environment after that.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snp_oracle::{GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

use crate::error::{Result, SimError};
use crate::pacing::FixedDelay;

/// Environment variable holding the oracle credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_SEQUENCE_LENGTH: usize = 100;
pub const DEFAULT_MUTATION_COUNT: usize = 5;
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_secs(4);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DATA_DIR: &str = ".snpsim";

/// Pipeline settings shared by every stage.
#[derive(Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub sequence_length: usize,
    pub mutation_count: usize,
    /// Minimum spacing between oracle calls
    pub call_delay: Duration,
    pub request_timeout: Duration,
    pub model: String,
    pub endpoint: String,
    /// Directory holding `mutations.json` and `predictions.json`
    pub data_dir: PathBuf,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Oracle credential; never serialized, redacted in `Debug`
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            mutation_count: DEFAULT_MUTATION_COUNT,
            call_delay: DEFAULT_CALL_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for SimConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimConfig")
            .field("sequence_length", &self.sequence_length)
            .field("mutation_count", &self.mutation_count)
            .field("call_delay", &self.call_delay)
            .field("request_timeout", &self.request_timeout)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("data_dir", &self.data_dir)
            .field("seed", &self.seed)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SimConfig {
    /// Build a config from process environment variables.
    ///
    /// Recognised: `GEMINI_API_KEY`, `SNPSIM_SEQUENCE_LENGTH`,
    /// `SNPSIM_MUTATIONS`, `SNPSIM_DELAY_SECS`, `SNPSIM_TIMEOUT_SECS`,
    /// `SNPSIM_MODEL`, `SNPSIM_ENDPOINT`, `SNPSIM_DATA_DIR`, `SNPSIM_SEED`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = SimConfig::default();

        if let Some(v) = lookup("SNPSIM_SEQUENCE_LENGTH") {
            config.sequence_length = parse_var("SNPSIM_SEQUENCE_LENGTH", &v)?;
        }
        if let Some(v) = lookup("SNPSIM_MUTATIONS") {
            config.mutation_count = parse_var("SNPSIM_MUTATIONS", &v)?;
        }
        if let Some(v) = lookup("SNPSIM_DELAY_SECS") {
            config.call_delay = parse_secs("SNPSIM_DELAY_SECS", &v)?;
        }
        if let Some(v) = lookup("SNPSIM_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("SNPSIM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SNPSIM_MODEL") {
            config.model = v;
        }
        if let Some(v) = lookup("SNPSIM_ENDPOINT") {
            config.endpoint = v;
        }
        if let Some(v) = lookup("SNPSIM_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SNPSIM_SEED") {
            config.seed = Some(parse_var("SNPSIM_SEED", &v)?);
        }
        config.api_key = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty());

        Ok(config)
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The oracle credential, or `MissingCredential` when absent.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| SimError::MissingCredential {
                var: API_KEY_VAR.to_string(),
            })
    }

    /// Check the generation parameters.
    pub fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            return Err(SimError::InvalidInput(
                "sequence length must be positive".to_string(),
            ));
        }
        if self.mutation_count > self.sequence_length {
            return Err(SimError::InvalidInput(format!(
                "cannot place {} mutations in a sequence of length {}",
                self.mutation_count, self.sequence_length
            )));
        }
        Ok(())
    }

    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        Ok(GeminiConfig::new(self.require_api_key()?)
            .with_model(&self.model)
            .with_endpoint(&self.endpoint)
            .with_timeout(self.request_timeout))
    }

    pub fn pacing(&self) -> FixedDelay {
        FixedDelay::new(self.call_delay)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SimError::InvalidInput(format!("{}={:?} is not a valid number", name, value)))
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs: f64 = parse_var(name, value)?;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        SimError::InvalidInput(format!(
            "{}={:?} must be a non-negative number of seconds",
            name, value
        ))
    })
}
