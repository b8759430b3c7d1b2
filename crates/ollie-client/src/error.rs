use ollie_shared::ValidationError;
use ollie_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the client.
///
/// `AuthenticationInvalid` is raised after the session has already been
/// cleared and the login redirect announced; callers do not need to react to
/// it beyond dropping whatever they were doing. Everything else is meant to be
/// shown next to the action that failed.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Session expired, please log in again")]
    AuthenticationInvalid,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Permission denied: {0}")]
    AuthorizationDenied(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ValidationError> for ClientError {
    fn from(e: ValidationError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
