//! Google OAuth2 token endpoint client.

use serde::Deserialize;

use daybook_core::AuthError;

use crate::credential::{ClientSecret, Credential};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
    #[serde(default)]
    scope: String,
}

impl TokenResponse {
    fn into_credential(self, prior_refresh_token: Option<String>) -> Credential {
        let expires_at = chrono::Utc::now().timestamp() + self.expires_in as i64;
        Credential {
            access_token: self.access_token,
            // Google omits the refresh token on refresh responses; keep the
            // one we already have.
            refresh_token: self.refresh_token.or(prior_refresh_token),
            expires_at,
            scopes: self.scope.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Client for Google's OAuth2 endpoints.
pub struct GoogleAuthenticator {
    pub client_id: String,
    pub client_secret: String,
    token_url: String,
}

impl GoogleAuthenticator {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self { client_id, client_secret, token_url: GOOGLE_TOKEN_URL.to_string() }
    }

    pub fn from_secret(secret: &ClientSecret) -> Self {
        Self::new(secret.client_id.clone(), secret.client_secret.clone())
    }

    #[cfg(test)]
    pub fn new_with_token_url(client_id: &str, client_secret: &str, token_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: token_url.to_string(),
        }
    }

    /// Generate authorization URL for the OAuth flow.
    /// Returns (url, state) where state must be verified on callback.
    pub fn authorization_url(&self, port: u16, scopes: &[String]) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();
        let redirect_uri = format!("http://localhost:{}/callback", port);
        let scope = scopes.join(" ");

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&state),
        );

        (url, state)
    }

    /// Exchange an authorization code for a credential.
    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str, port: u16) -> Result<Credential, AuthError> {
        let redirect_uri = format!("http://localhost:{}/callback", port);
        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", &redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::FlowFailed(format!("Token exchange failed: {}", error_text)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::FlowFailed(format!("Failed to parse token response: {}", e)))?;

        Ok(token.into_credential(None))
    }

    /// Refresh an expired credential, keeping its refresh token.
    #[tracing::instrument(skip(self, credential), level = "info")]
    pub async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(AuthError::RefreshUnavailable)?;

        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(error_text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("bad token response: {}", e)))?;

        Ok(token.into_credential(credential.refresh_token.clone()))
    }
}
