//! Folder-id parsing and payloads returned to the UI

use drive_walk::{FileKind, WalkResult, WalkSummary};
use serde::Serialize;

/// Extract a Drive folder id from user input: a bare id or any folder URL
/// (`https://drive.google.com/drive/folders/<id>?...`).
pub fn extract_folder_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // Full or partial URL containing /folders/<id>
    if let Some((_, rest)) = input.split_once("/folders/") {
        let id = rest.split(['?', '/', '#']).next().unwrap_or("");
        if id.is_empty() {
            return None;
        }
        return Some(id.to_string());
    }

    // Some other Drive URL shape (file link, shortcut) is not a folder id
    if input.contains('/') {
        return None;
    }

    // Bare id
    if input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Some(input.to_string());
    }

    None
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrl {
    pub auth_url: String,
}

/// Enumeration response: the flat file list plus per-kind partitions and
/// summary counts, mirroring what the UI renders grouped by folder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListing {
    pub success: bool,
    pub files: Vec<drive_walk::FileEntry>,
    pub videos: Vec<drive_walk::FileEntry>,
    pub pdfs: Vec<drive_walk::FileEntry>,
    pub count: usize,
    pub videos_count: usize,
    pub pdfs_count: usize,
    pub folders_count: usize,
    pub total_bytes: u64,
    pub processing_time: u64,
    /// True when the walk hit its deadline and the listing is partial
    pub truncated: bool,
    pub timeout: bool,
    pub requires_auth: bool,
    pub error: Option<String>,
}

impl MediaListing {
    fn from_result(result: WalkResult, timeout: bool, error: Option<String>) -> Self {
        let summary = WalkSummary::of(&result.entries);
        let videos: Vec<_> = result
            .entries
            .iter()
            .filter(|e| e.kind == FileKind::Video)
            .cloned()
            .collect();
        let pdfs: Vec<_> = result
            .entries
            .iter()
            .filter(|e| e.kind == FileKind::Pdf)
            .cloned()
            .collect();
        Self {
            success: !timeout,
            videos,
            pdfs,
            count: summary.total,
            videos_count: summary.videos,
            pdfs_count: summary.pdfs,
            folders_count: summary.folders,
            total_bytes: summary.total_bytes,
            processing_time: result.elapsed_millis,
            truncated: result.truncated,
            timeout,
            requires_auth: false,
            error,
            files: result.entries,
        }
    }

    /// Full listing
    pub fn complete(result: WalkResult) -> Self {
        Self::from_result(result, false, None)
    }

    /// Deadline fired: partial listing plus a retry hint
    pub fn timed_out(partial: WalkResult, message: String) -> Self {
        Self::from_result(partial, true, Some(message))
    }

    /// No usable credential; the walk was never attempted
    pub fn auth_required(message: String) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            videos: Vec::new(),
            pdfs: Vec::new(),
            count: 0,
            videos_count: 0,
            pdfs_count: 0,
            folders_count: 0,
            total_bytes: 0,
            processing_time: 0,
            truncated: false,
            timeout: false,
            requires_auth: true,
            error: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_folder_urls() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/1AbC_d-9?usp=sharing"),
            Some("1AbC_d-9".to_string())
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/u/0/folders/xyz123/"),
            Some("xyz123".to_string())
        );
    }

    #[test]
    fn passes_bare_ids_through() {
        assert_eq!(
            extract_folder_id("  1a2B3c-_d  "),
            Some("1a2B3c-_d".to_string())
        );
    }

    #[test]
    fn rejects_unrecognizable_input() {
        assert_eq!(extract_folder_id(""), None);
        assert_eq!(extract_folder_id("https://drive.google.com/file/d/abc/view"), None);
        assert_eq!(extract_folder_id("not a folder id"), None);
        assert_eq!(extract_folder_id("https://drive.google.com/drive/folders/"), None);
    }
}
