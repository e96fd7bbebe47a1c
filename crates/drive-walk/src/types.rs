//! Walk result types and summary statistics

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::FileKind;

/// Default wall-clock budget for one enumeration. Kept under the 60 second
/// hard limit the hosting environment puts on a single invocation.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(55);

/// Default maximum recursion depth
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Subfolder walks run concurrently per batch; caps outstanding Drive calls
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Children fetched per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Tuning knobs for one walk invocation
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub budget: Duration,
    pub max_depth: usize,
    pub batch_size: usize,
    pub page_size: u32,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            max_depth: DEFAULT_MAX_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One classified file discovered during a walk, annotated with the folder
/// path from the traversal root to its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileType")]
    pub kind: FileKind,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "folderPath")]
    pub folder_path: String,
    #[serde(rename = "webViewLink")]
    pub view_link: Option<String>,
}

/// Aggregate outcome of one enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkResult {
    pub entries: Vec<FileEntry>,
    pub elapsed_millis: u64,
    /// True when the deadline fired before the tree was fully explored
    pub truncated: bool,
}

/// Summary counts derived from a set of entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalkSummary {
    pub total: usize,
    pub videos: usize,
    pub pdfs: usize,
    pub folders: usize,
    pub total_bytes: u64,
}

impl WalkSummary {
    pub fn of(entries: &[FileEntry]) -> Self {
        let mut folders: HashSet<&str> = HashSet::new();
        let mut videos = 0;
        let mut pdfs = 0;
        let mut total_bytes: u64 = 0;
        for entry in entries {
            folders.insert(entry.folder_path.as_str());
            match entry.kind {
                FileKind::Video => videos += 1,
                FileKind::Pdf => pdfs += 1,
                FileKind::Other => {}
            }
            total_bytes += entry.size_bytes;
        }
        Self {
            total: entries.len(),
            videos,
            pdfs,
            folders: folders.len(),
            total_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: FileKind, folder_path: &str, size: u64) -> FileEntry {
        FileEntry {
            id: format!("{kind}-{folder_path}-{size}"),
            name: "f".to_string(),
            mime_type: String::new(),
            kind,
            size_bytes: size,
            folder_path: folder_path.to_string(),
            view_link: None,
        }
    }

    #[test]
    fn summary_counts_kinds_folders_and_bytes() {
        let entries = vec![
            entry(FileKind::Video, "Root", 100),
            entry(FileKind::Video, "Root", 50),
            entry(FileKind::Pdf, "Root/Clips", 7),
        ];
        let summary = WalkSummary::of(&entries);
        assert_eq!(
            summary,
            WalkSummary {
                total: 3,
                videos: 2,
                pdfs: 1,
                folders: 2,
                total_bytes: 157,
            }
        );
    }

    #[test]
    fn summary_of_empty_is_zeroed() {
        let summary = WalkSummary::of(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.folders, 0);
        assert_eq!(summary.total_bytes, 0);
    }

    #[test]
    fn file_entry_serializes_with_drive_field_names() {
        let json = serde_json::to_value(entry(FileKind::Pdf, "Root", 3)).unwrap();
        assert_eq!(json["fileType"], "pdf");
        assert_eq!(json["folderPath"], "Root");
        assert_eq!(json["size"], 3);
        assert!(json.get("webViewLink").is_some());
    }
}
