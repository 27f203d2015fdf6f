//! Error types for the CLI

use thiserror::Error;

/// CLI Result type
pub type CliResult<T> = std::result::Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not logged in: {0}")]
    NotLoggedIn(String),

    #[error("cf {command} failed: {message}")]
    Command { command: String, message: String },

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service instance not found: {name}")]
    ServiceNotFound { name: String },

    #[error("cannot enable TLS on an instance of the {offering} service")]
    UnsupportedOffering { offering: String },

    #[error("malformed service key payload: {0}")]
    Credentials(#[from] cf_tls_types::CredentialError),

    #[error("service operation failed: {description} [status: {state}]")]
    OperationFailed { description: String, state: String },
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config(message.into())
    }
}
