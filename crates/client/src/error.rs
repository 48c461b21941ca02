//! Client error taxonomy.

use thiserror::Error;

/// Errors produced by the request dispatcher.
///
/// Every call settles as either decoded data or exactly one of these.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange did not complete (connection refused, reset, timeout).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// `message` is the body's `detail` field when present, otherwise
    /// `HTTP <status>`.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable message.
        message: String,
    },

    /// The server answered with success but the body did not decode.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request body could not be represented as JSON.
    #[error("Could not encode request body: {0}")]
    Encode(serde_json::Error),

    /// The session token contains characters not allowed in a header.
    #[error("Session token is not a valid header value")]
    InvalidToken,

    /// The endpoint path was empty or not rooted at `/`.
    #[error("Invalid endpoint: {0:?}")]
    InvalidEndpoint(String),

    /// The base URL and endpoint did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Build an API error from a status and optional server message.
    #[must_use]
    pub fn api(status: u16, detail: Option<String>) -> Self {
        Self::Api {
            status,
            message: detail.unwrap_or_else(|| format!("HTTP {status}")),
        }
    }

    /// HTTP status if the server responded.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for connection-level failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` when the server rejected the credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_detail() {
        let err = ClientError::api(400, Some("Invalid item in cart: 9".to_owned()));
        assert_eq!(err.to_string(), "Invalid item in cart: 9");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_api_error_generic_message() {
        let err = ClientError::api(502, None);
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn test_unauthorized() {
        assert!(ClientError::api(401, None).is_unauthorized());
        assert!(ClientError::api(403, None).is_unauthorized());
        assert!(!ClientError::api(404, None).is_unauthorized());
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let err = ClientError::InvalidEndpoint(String::new());
        assert_eq!(err.to_string(), "Invalid endpoint: \"\"");
        assert!(!err.is_transport());
    }
}
