//! Directory Source error types
//!
//! Hard failures only happen while reaching the directory server. Rule
//! evaluation never fails: missing data degrades to "no match".

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by a [`DirectorySource`](crate::source::DirectorySource) or
/// by the authenticate capability.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Transport errors (usually transient)
    /// Failed to establish a connection to the directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// TLS or STARTTLS negotiation failed.
    #[error("tls negotiation failed: {message}")]
    TlsFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Connection timed out.
    #[error("connection timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    // Authentication errors (permanent)
    /// The sync account bind was rejected.
    #[error("authentication failed for {bind_dn}: {message}")]
    AuthenticationFailed { bind_dn: String, message: String },

    // Search errors
    /// A search or one of its result pages failed.
    #[error("search failed under '{base_dn}': {message}")]
    SearchFailed {
        base_dn: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    // Configuration errors (permanent)
    /// Sync configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Data handed to the core could not be read.
    #[error("invalid data: {message}")]
    InvalidData { message: String },
}

impl DirectoryError {
    /// Check if this error is transient and the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. }
                | DirectoryError::ConnectionTimeout { .. }
                | DirectoryError::SearchFailed { .. }
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::TlsFailed { .. } => "TLS_FAILED",
            DirectoryError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            DirectoryError::AuthenticationFailed { .. } => "AUTH_FAILED",
            DirectoryError::SearchFailed { .. } => "SEARCH_FAILED",
            DirectoryError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            DirectoryError::InvalidData { .. } => "INVALID_DATA",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a TLS failure with source.
    pub fn tls_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::TlsFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication failure.
    pub fn authentication_failed(bind_dn: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::AuthenticationFailed {
            bind_dn: bind_dn.into(),
            message: message.into(),
        }
    }

    /// Create a search failed error.
    pub fn search_failed(base_dn: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::SearchFailed {
            base_dn: base_dn.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a search failed error with source.
    pub fn search_failed_with_source(
        base_dn: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::SearchFailed {
            base_dn: base_dn.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        DirectoryError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for Directory Source operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            DirectoryError::connection_failed("refused"),
            DirectoryError::ConnectionTimeout { timeout_secs: 30 },
            DirectoryError::search_failed("dc=example,dc=org", "page 3 lost"),
        ];

        for err in transient_errors {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent_errors = vec![
            DirectoryError::authentication_failed("cn=sync,dc=example,dc=org", "invalid credentials"),
            DirectoryError::invalid_configuration("server is required"),
            DirectoryError::InvalidData {
                message: "not an array".to_string(),
            },
        ];

        for err in permanent_errors {
            assert!(
                !err.is_transient(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DirectoryError::authentication_failed("cn=a", "x").error_code(),
            "AUTH_FAILED"
        );
        assert_eq!(
            DirectoryError::connection_failed("x").error_code(),
            "CONNECTION_FAILED"
        );
        assert_eq!(
            DirectoryError::search_failed("dc=x", "y").error_code(),
            "SEARCH_FAILED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::ConnectionTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "connection timeout after 30 seconds");

        let err = DirectoryError::search_failed("ou=people,dc=example,dc=org", "size limit");
        assert_eq!(
            err.to_string(),
            "search failed under 'ou=people,dc=example,dc=org': size limit"
        );
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DirectoryError::tls_failed_with_source("handshake", source_err);

        assert!(!err.is_transient());
        assert!(std::error::Error::source(&err).is_some());
    }
}
