//! OAuth2 credential lifecycle for Google Calendar access.
//!
//! A cached credential is loaded from a file, refreshed when it has expired
//! and a refresh token is available, or replaced via a pluggable
//! authorization flow. The updated credential is always persisted before it
//! is handed back to the caller.

pub mod credential;
pub mod flow;
pub mod google;

pub use credential::{ClientSecret, Credential, CredentialStore};
pub use flow::{obtain_credential, CredentialProvider, InteractiveFlow};
pub use google::GoogleAuthenticator;

pub use daybook_core::AuthError;

/// Scope granting read/write calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
