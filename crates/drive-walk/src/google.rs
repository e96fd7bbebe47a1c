//! Google Drive API v3 listing client

use serde::Deserialize;

use async_trait::async_trait;

use crate::client::{ChildPage, ClientError, ListingClient, RemoteItem};

/// Google Drive API base URL
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size, webViewLink)";

/// File metadata as returned by the Drive API. Only the fields we request.
/// Drive reports `size` as a decimal string and omits it for folders and
/// Workspace documents.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    size: Option<String>,
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFolderMeta {
    name: String,
}

/// Listing client backed by the Drive `files` endpoints, authenticated with
/// a bearer access token.
pub struct GoogleDriveClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleDriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(DRIVE_API_BASE, access_token)
    }

    /// Point the client at a different base URL (test servers)
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

fn classify_status(status: u16, message: String) -> ClientError {
    match status {
        401 => ClientError::AuthRequired,
        403 if message.contains("ateLimitExceeded") => ClientError::RateLimited,
        403 => ClientError::PermissionDenied(message),
        404 => ClientError::NotFound(message),
        429 => ClientError::RateLimited,
        _ => ClientError::Api { status, message },
    }
}

#[async_trait]
impl ListingClient for GoogleDriveClient {
    async fn list_children(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ChildPage, ClientError> {
        let query = format!("'{}' in parents and trashed=false", folder_id.replace('\'', "\\'"));
        let mut url = format!(
            "{}/files?q={}&pageSize={}&fields={}",
            self.base_url,
            urlencoding::encode(&query),
            page_size,
            urlencoding::encode(LIST_FIELDS),
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }

        let list: DriveFileList = self.get_json(&url).await?;

        let items = list
            .files
            .into_iter()
            .map(|file| RemoteItem {
                id: file.id,
                name: file.name,
                mime_type: file.mime_type,
                size: file.size.and_then(|s| s.parse::<u64>().ok()),
                view_link: file.web_view_link,
            })
            .collect();

        Ok(ChildPage {
            items,
            next_page_token: list.next_page_token,
        })
    }

    async fn folder_name(&self, folder_id: &str) -> Result<String, ClientError> {
        let url = format!("{}/files/{}?fields=name", self.base_url, folder_id);
        let meta: DriveFolderMeta = self.get_json(&url).await?;
        Ok(meta.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_covers_the_taxonomy() {
        assert!(matches!(classify_status(401, String::new()), ClientError::AuthRequired));
        assert!(matches!(
            classify_status(403, "userRateLimitExceeded".to_string()),
            ClientError::RateLimited
        ));
        assert!(matches!(
            classify_status(403, "insufficient permissions".to_string()),
            ClientError::PermissionDenied(_)
        ));
        assert!(matches!(classify_status(404, String::new()), ClientError::NotFound(_)));
        assert!(matches!(classify_status(429, String::new()), ClientError::RateLimited));
        assert!(matches!(
            classify_status(500, String::new()),
            ClientError::Api { status: 500, .. }
        ));
    }
}
