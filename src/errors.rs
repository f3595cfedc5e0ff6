//! Error types for talking to the findings backend.

use thiserror::Error;

/// Failure of a single backend request.
///
/// Every variant names the request path so callers can render a
/// meaningful message without inspecting transport internals.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client-side deadline elapsed before the response arrived.
    #[error("Request timed out for {path} after {seconds}s")]
    RequestTimeout { path: String, seconds: f64 },

    /// The server answered with a non-2xx status.
    #[error("Request failed for {path}: {status}")]
    RequestFailed { path: String, status: u16 },

    /// Transport failure below HTTP (DNS, refused connection, reset).
    #[error("Network error for {path}: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("Invalid JSON response for {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid runtime origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ClientError {
    /// Request path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ClientError::RequestTimeout { path, .. }
            | ClientError::RequestFailed { path, .. }
            | ClientError::Network { path, .. }
            | ClientError::Parse { path, .. } => Some(path),
            ClientError::InvalidOrigin { .. } | ClientError::Client(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::RequestTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_path_and_seconds() {
        let err = ClientError::RequestTimeout {
            path: "/api/v1/summary".to_string(),
            seconds: 12.0,
        };
        assert_eq!(
            err.to_string(),
            "Request timed out for /api/v1/summary after 12s"
        );
        assert!(err.is_timeout());
        assert_eq!(err.path(), Some("/api/v1/summary"));
    }

    #[test]
    fn test_request_failed_message() {
        let err = ClientError::RequestFailed {
            path: "/api/v1/findings?limit=200".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Request failed for /api/v1/findings?limit=200: 503"
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ClientError::Parse {
            path: "/api/v1/summary".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid JSON response for /api/v1/summary"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
