//! Error types for snp-oracle

use thiserror::Error;

/// Errors that can occur while querying the oracle
#[derive(Error, Debug)]
pub enum OracleError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body could not be decoded
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The prompt was refused by the service's safety filter
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// No text came back
    #[error("empty response")]
    EmptyResponse,

    /// Client could not be constructed
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Timeout(err.to_string())
        } else if err.is_decode() {
            OracleError::MalformedResponse(err.to_string())
        } else {
            OracleError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = OracleError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(OracleError::EmptyResponse.to_string(), "empty response");
    }
}
