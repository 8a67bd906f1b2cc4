//! CLI error types and exit codes

use ldapsync_core::error::DirectoryError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication rejected
/// - 3: Connection error
/// - 4: Configuration or validation error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check the server name and port\n  - Check the tls mode matches the server\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Directory search failed: {0}")]
    SearchFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationRejected(_) => 2,
            CliError::ConnectionFailed(_) | CliError::SearchFailed(_) => 3,
            CliError::Config(_) | CliError::Validation(_) => 4,
            CliError::Io(_) | CliError::Output(_) => 1,
        }
    }

    /// Print the error to stderr with formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationRejected(_) => {
                Some("Check the bind user and password, or set LDAPSYNC_PASSWORD.")
            }
            CliError::Config(_) => Some("Run with --debug to see how the configuration was read."),
            _ => None,
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::AuthenticationFailed { .. } => {
                CliError::AuthenticationRejected(e.to_string())
            }
            DirectoryError::ConnectionFailed { .. }
            | DirectoryError::TlsFailed { .. }
            | DirectoryError::ConnectionTimeout { .. } => {
                CliError::ConnectionFailed(with_cause(&e))
            }
            DirectoryError::SearchFailed { .. } => CliError::SearchFailed(with_cause(&e)),
            DirectoryError::InvalidConfiguration { .. } => CliError::Config(e.to_string()),
            DirectoryError::InvalidData { .. } => CliError::Validation(e.to_string()),
        }
    }
}

/// Error message followed by its source chain.
fn with_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(format!("JSON error: {}", e))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Output(format!("YAML error: {}", e))
    }
}
