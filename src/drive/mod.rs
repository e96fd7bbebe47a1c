//! Google Drive integration
//!
//! This module is organized into submodules:
//! - `auth`: OAuth2 consent/exchange/refresh and token persistence
//! - `types`: folder-id parsing and payloads returned to the UI
//! - `commands`: Tauri commands

pub mod commands;

mod auth;
mod types;

// Re-export for the download worker
pub use auth::current_access_token;
