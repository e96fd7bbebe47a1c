//! drive-walk - recursive Google Drive folder enumeration
//!
//! Walks an arbitrary-depth Drive folder tree through the paginated
//! `files.list` API, classifies every file by MIME type and returns the
//! videos and PDFs found, each annotated with its folder path from the
//! traversal root. The walk runs subfolders in bounded-concurrency batches
//! and is cut off cooperatively by a wall-clock budget.
//!
//! This module is organized into submodules:
//! - `classify`: MIME type -> file kind mapping
//! - `client`: listing client contract and error taxonomy
//! - `google`: Drive API v3 implementation of the client
//! - `types`: entries, walk results, summary statistics
//! - `walker`: the recursive traversal itself

mod classify;
mod client;
mod error;
mod google;
mod types;
mod walker;

// Re-export classification
pub use classify::{classify, is_pdf, is_video, FileKind, FOLDER_MIME_TYPE};

// Re-export the client contract
pub use client::{ChildPage, ClientError, ListingClient, RemoteItem};

// Re-export the Drive implementation
pub use google::{GoogleDriveClient, DRIVE_API_BASE};

// Re-export result types
pub use types::{FileEntry, WalkOptions, WalkResult, WalkSummary};

// Re-export the walk entry point
pub use error::WalkError;
pub use walker::enumerate;
