use thiserror::Error;

/// Message shown for every credential failure, whatever check rejected it
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Invalid email or password";

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication failed: {}", AUTHENTICATION_FAILED_MESSAGE)]
    AuthenticationFailed,

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid key format: {message}")]
    InvalidKeyFormat { message: String },

    #[error("Decode error in '{field}': {message}")]
    Decode { field: String, message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Crypto error: {message}")]
    Crypto { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn authentication_failed() -> Self {
        Self::AuthenticationFailed
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_key_format(message: impl Into<String>) -> Self {
        Self::InvalidKeyFormat {
            message: message.into(),
        }
    }

    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error rejected the caller's credentials
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Whether this error was raised by an injected collaborator
    /// (repository, hashing, crypto provider) rather than by the core
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Crypto { .. } | Self::Internal { .. }
        )
    }
}
