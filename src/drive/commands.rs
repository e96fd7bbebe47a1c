//! Drive Tauri commands

use drive_walk::{enumerate, GoogleDriveClient, WalkError, WalkOptions};
use log::{error, info, warn};

use super::auth::{self, AuthConfig, AuthError};
use super::types::{extract_folder_id, AuthStatus, AuthUrl, MediaListing};
use crate::db;

/// Whether a Google account is currently connected
#[tauri::command]
pub async fn check_auth() -> Result<AuthStatus, String> {
    Ok(AuthStatus {
        authenticated: auth::is_authenticated().await,
    })
}

/// Consent URL for the OAuth flow
#[tauri::command]
pub async fn get_auth_url() -> Result<AuthUrl, String> {
    let config = AuthConfig::from_env().map_err(|e| e.to_string())?;
    Ok(AuthUrl {
        auth_url: config.auth_url(),
    })
}

/// Finish the OAuth flow with the code from the consent redirect
#[tauri::command]
pub async fn complete_auth(code: String) -> Result<(), String> {
    if code.trim().is_empty() {
        return Err("No authorization code was provided".to_string());
    }
    let config = AuthConfig::from_env().map_err(|e| e.to_string())?;
    auth::exchange_code(&config, code.trim())
        .await
        .map_err(|e| e.to_string())
}

/// Disconnect the Google account
#[tauri::command]
pub async fn sign_out() -> Result<(), String> {
    db::delete_tokens()
        .await
        .map_err(|e| format!("Failed to remove stored tokens: {}", e))?;
    info!("Google account disconnected");
    Ok(())
}

/// Enumerate every video and PDF nested under a Drive folder.
///
/// Accepts a bare folder id or a Drive folder URL. Auth problems and
/// deadline timeouts come back inside the payload (`requiresAuth`,
/// `timeout`) so the UI can react specifically; only malformed input and
/// fatal API failures are command errors.
#[tauri::command]
pub async fn list_media(folder: String) -> Result<MediaListing, String> {
    let folder_id = extract_folder_id(&folder)
        .ok_or_else(|| "No folder id was provided. Paste a Drive folder link or id.".to_string())?;

    // Precondition: never start the walk without a usable credential
    let access_token = match auth::current_access_token().await {
        Ok(token) => token,
        Err(err @ (AuthError::NotAuthenticated | AuthError::MissingCredentials)) => {
            return Ok(MediaListing::auth_required(err.to_string()));
        }
        Err(err) => return Err(err.to_string()),
    };

    let client = GoogleDriveClient::new(access_token);
    match enumerate(&client, &folder_id, WalkOptions::default()).await {
        Ok(result) => {
            info!(
                "enumerated folder {}: {} files in {} ms",
                folder_id,
                result.entries.len(),
                result.elapsed_millis
            );
            Ok(MediaListing::complete(result))
        }
        Err(WalkError::DeadlineExceeded { partial }) => {
            warn!(
                "enumeration of {} hit its deadline with {} files found",
                folder_id,
                partial.entries.len()
            );
            Ok(MediaListing::timed_out(
                partial,
                "The search is taking too long. Please try a smaller or more specific folder."
                    .to_string(),
            ))
        }
        Err(WalkError::AuthRequired) => Ok(MediaListing::auth_required(
            "Not authenticated. Please reconnect your Google account.".to_string(),
        )),
        Err(err @ WalkError::InvalidFolderId(_)) => Err(err.to_string()),
        Err(WalkError::Fatal(message)) => {
            error!("enumeration of {} failed: {}", folder_id, message);
            Err(format!("Failed to list files: {}", message))
        }
    }
}
