//! Google OAuth2 flow: consent URL, code exchange, token refresh
//!
//! Tokens live in the local database; the web original kept them in a
//! cookie, a desktop app keeps them across restarts instead.

use serde::Deserialize;
use thiserror::Error;

use crate::db;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Read-only Drive access is all the app ever asks for
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Refresh this many seconds before the access token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Google credentials are not configured; set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET")]
    MissingCredentials,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("token request failed: {0}")]
    Http(String),

    #[error("token endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("token storage error: {0}")]
    Storage(String),
}

/// OAuth client configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok().filter(|s| !s.is_empty());
        let redirect_uri = std::env::var("DRIVEFETCH_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string());

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => Err(AuthError::MissingCredentials),
        }
    }

    /// Consent URL the user opens in a browser. Offline access with a forced
    /// consent prompt so Google always returns a refresh token.
    pub fn auth_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(DRIVE_SCOPE),
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

async fn post_token_request(params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_ENDPOINT)
        .form(params)
        .send()
        .await
        .map_err(|e| AuthError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::Http(e.to_string()))
}

/// Exchange an authorization code for a token set and persist it
pub async fn exchange_code(config: &AuthConfig, code: &str) -> Result<(), AuthError> {
    let token = post_token_request(&[
        ("code", code),
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("redirect_uri", &config.redirect_uri),
        ("grant_type", "authorization_code"),
    ])
    .await?;

    let expires_at = chrono::Utc::now().timestamp() + token.expires_in;
    db::save_tokens(
        &token.access_token,
        token.refresh_token.as_deref(),
        expires_at,
        token.scope.as_deref().unwrap_or(DRIVE_SCOPE),
    )
    .await
    .map_err(|e| AuthError::Storage(e.to_string()))?;

    log::info!("Google account connected");
    Ok(())
}

/// A valid access token for Drive calls, refreshing the stored one when it
/// is about to expire.
pub async fn current_access_token() -> Result<String, AuthError> {
    let tokens = db::get_tokens()
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?
        .ok_or(AuthError::NotAuthenticated)?;

    let now = chrono::Utc::now().timestamp();
    if tokens.expires_at - EXPIRY_MARGIN_SECS > now {
        return Ok(tokens.access_token);
    }

    // Expired (or about to): trade the refresh token for a new access token
    let refresh_token = tokens.refresh_token.ok_or(AuthError::NotAuthenticated)?;
    let config = AuthConfig::from_env()?;
    let refreshed = post_token_request(&[
        ("refresh_token", &refresh_token),
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("grant_type", "refresh_token"),
    ])
    .await?;

    let expires_at = now + refreshed.expires_in;
    db::update_access_token(tokens.id, &refreshed.access_token, expires_at)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

    log::debug!("access token refreshed");
    Ok(refreshed.access_token)
}

/// Whether an account is connected (token presence, not validity)
pub async fn is_authenticated() -> bool {
    matches!(db::get_tokens().await, Ok(Some(_)))
}
