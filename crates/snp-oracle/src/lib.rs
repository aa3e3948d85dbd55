//! SNP-Oracle: Text-Generation Oracle for snpsim
//!
//! This crate is the boundary to the external language model that narrates
//! the likely impact of a mutation. The rest of the workspace only sees the
//! [`Oracle`] trait: a prompt goes in, free text comes out.
//!
//! ## Layer 1 - External Service
//!
//! Focus: One request per prompt, every failure mapped to [`OracleError`].

use async_trait::async_trait;

mod error;
pub mod fakes;
pub mod gemini;

pub use error::OracleError;
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Result type for oracle operations
pub type Result<T> = std::result::Result<T, OracleError>;

/// A single request/response text service.
///
/// Implementations make exactly one attempt per call; retry and pacing
/// decisions belong to the caller.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Short identifier used in logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw response text.
    async fn predict(&self, prompt: &str) -> Result<String>;
}
