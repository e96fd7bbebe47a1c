//! File download module with streaming, progress tracking, and database persistence
//!
//! Provides download functionality for Drive files with:
//! - Streaming downloads to avoid memory issues with large files
//! - Folder-structure preservation (files land under their Drive folder path)
//! - Progress tracking via Tauri events
//! - Database persistence for resume after app restart
//! - Pause/Resume/Cancel support
//! - Backend-managed download queue with concurrency control

pub mod commands;
mod types;
mod worker;
