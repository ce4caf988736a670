//! Centralized error types for Daybook.
//!
//! Authorization, provider, and validation failures are distinct types so
//! callers can branch programmatically instead of parsing message strings.
//! The agent-tool boundary is the only place errors are flattened to text,
//! via `user_message()`; the `Display` impls keep the technical detail for
//! logs.

use thiserror::Error;

/// Authentication errors (OAuth, tokens, credentials).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No stored credential at {0}")]
    CredentialNotFound(String),

    #[error("Stored credential is malformed: {0}")]
    InvalidStoredCredential(String),

    #[error("Credential expired and no refresh token available")]
    RefreshUnavailable,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Authorization was denied: {0}")]
    AccessDenied(String),

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("OAuth flow failed: {0}")]
    FlowFailed(String),

    #[error("Client secret file error: {0}")]
    ClientSecret(String),

    #[error("Failed to persist credential: {0}")]
    Storage(String),

    #[error("Network error during authorization: {0}")]
    Network(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::CredentialNotFound(_) => "Not signed in. Please authenticate.",
            AuthError::InvalidStoredCredential(_) => {
                "Saved sign-in data is unreadable. Delete token.json and sign in again."
            }
            AuthError::RefreshUnavailable => "Your session has expired. Please sign in again.",
            AuthError::RefreshFailed(_) => "Could not renew your session. Please sign in again.",
            AuthError::AccessDenied(_) => "Sign-in was denied.",
            AuthError::StateMismatch => "Sign-in failed a security check. Please try again.",
            AuthError::FlowFailed(_) => "Sign-in failed. Please try again.",
            AuthError::ClientSecret(_) => {
                "Could not read credentials.json. Check the client secret file."
            }
            AuthError::Storage(_) => "Failed to save credentials. Please try again.",
            AuthError::Network(_) => "Network error. Check your connection.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
