use std::path::Path;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use turso::{Builder, Connection};

// Wrap Connection in Mutex to serialize database access
// turso has race conditions in its page cache when accessed concurrently
static DB_CONNECTION: OnceLock<Mutex<Connection>> = OnceLock::new();

// Custom error type for database operations
pub(crate) type DbResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Re-export submodules
pub mod downloads;
pub mod tokens;

// Re-export types
pub use downloads::DownloadSession;
pub use tokens::StoredTokens;

// ============ Connection and Initialization ============

pub(crate) fn get_connection() -> DbResult<&'static Mutex<Connection>> {
    DB_CONNECTION.get().ok_or_else(|| "Database not initialized".into())
}

/// Initialize the database with required tables
pub async fn init_db(db_path: &Path) -> DbResult<()> {
    let db = Builder::new_local(db_path.to_str().unwrap()).build().await?;
    let conn = db.connect()?;

    conn.execute_batch(&format!(
        "{}{}",
        tokens::get_table_sql(),
        downloads::get_table_sql()
    ))
    .await?;

    DB_CONNECTION.set(Mutex::new(conn)).map_err(|_| "Database already initialized")?;

    Ok(())
}

// Re-export token functions
pub use tokens::{delete_tokens, get_tokens, save_tokens, update_access_token};

// Re-export download session functions
pub use downloads::{
    count_active_downloads, create_download_session, delete_all_downloads,
    delete_download_session, delete_finished_downloads, get_download_sessions,
    get_pending_downloads, pause_all_downloads, resume_all_downloads, update_download_file_size,
    update_download_progress, update_download_status,
};
