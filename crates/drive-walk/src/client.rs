//! Listing client contract the walker drives
//!
//! The walker only ever needs two remote operations: page through the
//! children of a folder, and resolve a folder's display name. Anything that
//! can answer those (the real Drive API, a fake in tests) can be walked.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the remote listing API, classified so the walker can decide
/// what propagates and what is absorbed per branch.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("authentication required")]
    AuthRequired,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("rate limited by the remote API")]
    RateLimited,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// One child item as reported by the listing API. Folders arrive here too,
/// marked by their MIME type.
#[derive(Debug, Clone)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Absent for folders and for files Drive reports no size for
    pub size: Option<u64>,
    pub view_link: Option<String>,
}

/// One page of a folder listing
#[derive(Debug, Clone)]
pub struct ChildPage {
    pub items: Vec<RemoteItem>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait ListingClient: Send + Sync {
    /// List one page of the direct children of a folder
    async fn list_children(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ChildPage, ClientError>;

    /// Resolve a folder's display name
    async fn folder_name(&self, folder_id: &str) -> Result<String, ClientError>;
}
