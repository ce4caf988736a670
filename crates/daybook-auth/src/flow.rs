//! Authorization flows and credential lifecycle orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use warp::Filter;

use daybook_core::AuthError;

use crate::credential::{Credential, CredentialStore};
use crate::google::GoogleAuthenticator;

/// Query parameters delivered to the OAuth callback.
type CallbackResult = (Option<String>, String, Option<String>);

/// Source of fresh credentials when no usable cached one exists.
///
/// The interactive browser flow is one implementation; non-interactive
/// contexts (servers, tests) can supply their own.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authorize(&self) -> Result<Credential, AuthError>;
}

/// Browser-based authorization with a one-shot local callback server.
///
/// The callback server binds an OS-assigned port by default; the redirect
/// URI is built from whatever port was actually bound.
pub struct InteractiveFlow {
    authenticator: GoogleAuthenticator,
    scopes: Vec<String>,
    port: u16,
}

impl InteractiveFlow {
    pub fn new(authenticator: GoogleAuthenticator, scopes: Vec<String>) -> Self {
        Self { authenticator, scopes, port: 0 }
    }

    /// Use a fixed callback port instead of an OS-assigned one.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl CredentialProvider for InteractiveFlow {
    async fn authorize(&self) -> Result<Credential, AuthError> {
        // One-shot callback server
        let (tx, rx) = oneshot::channel::<CallbackResult>();
        let tx = Arc::new(tokio::sync::Mutex::new(Some(tx)));

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(
                |params: HashMap<String, String>,
                 tx: Arc<tokio::sync::Mutex<Option<oneshot::Sender<CallbackResult>>>>| async move {
                    let code = params.get("code").cloned();
                    let state = params.get("state").cloned().unwrap_or_default();
                    let error = params.get("error").cloned();

                    if let Some(sender) = tx.lock().await.take() {
                        let _ = sender.send((code, state, error));
                    }

                    Ok::<_, warp::Rejection>(warp::reply::html(
                        "<html><body><h1>Authorization complete</h1>\
                         <p>You can close this window and return to Daybook.</p></body></html>",
                    ))
                },
            );

        let (addr, server) = warp::serve(routes)
            .try_bind_ephemeral(([127, 0, 0, 1], self.port))
            .map_err(|e| {
                AuthError::FlowFailed(format!("Failed to bind callback server: {}", e))
            })?;
        tokio::spawn(server);

        let port = addr.port();
        let (auth_url, expected_state) = self.authenticator.authorization_url(port, &self.scopes);

        tracing::info!("Opening browser for OAuth2 authorization (callback port {})", port);
        tracing::debug!("Auth URL: {}", auth_url);

        webbrowser::open(&auth_url)
            .map_err(|e| AuthError::FlowFailed(format!("Failed to open browser: {}", e)))?;

        let (code, state, error) = rx
            .await
            .map_err(|_| AuthError::FlowFailed("OAuth callback was never received".into()))?;

        if let Some(error) = error {
            return Err(AuthError::AccessDenied(error));
        }

        if state != expected_state {
            return Err(AuthError::StateMismatch);
        }

        let code = code.ok_or_else(|| {
            AuthError::FlowFailed("Callback did not include an authorization code".into())
        })?;

        self.authenticator.exchange_code(&code, port).await
    }
}

/// Load a usable credential, refreshing or re-authorizing as needed.
///
/// Lifecycle: a valid cached credential is returned as-is; one inside the
/// refresh buffer with a refresh token is refreshed before it expires;
/// otherwise the provider runs a fresh authorization. Any newly obtained
/// credential is persisted before it is returned, so the store always
/// reflects the credential in use.
pub async fn obtain_credential(
    store: &CredentialStore,
    authenticator: &GoogleAuthenticator,
    provider: &dyn CredentialProvider,
) -> Result<Credential, AuthError> {
    let cached = match store.load() {
        Ok(credential) => Some(credential),
        Err(AuthError::CredentialNotFound(_)) => None,
        // A malformed store is reported, not silently re-authorized.
        Err(e) => return Err(e),
    };

    if let Some(credential) = cached {
        if !credential.needs_refresh() {
            return Ok(credential);
        }

        if credential.refresh_token.is_some() {
            tracing::info!("Cached credential is near expiry, refreshing");
            let refreshed = authenticator.refresh(&credential).await?;
            store.save(&refreshed)?;
            return Ok(refreshed);
        }

        // No refresh token: ride out the buffer window rather than forcing
        // a re-authorization while the credential is still valid.
        if !credential.is_expired() {
            return Ok(credential);
        }

        tracing::info!("Cached credential expired with no refresh token");
    }

    let fresh = provider.authorize().await?;
    store.save(&fresh)?;
    Ok(fresh)
}
