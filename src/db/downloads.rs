use super::{get_connection, DbResult};
use serde::{Deserialize, Serialize};

/// Download session status (for future type-safe status handling)
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DownloadStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "downloading")]
    Downloading,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::Pending => write!(f, "pending"),
            DownloadStatus::Downloading => write!(f, "downloading"),
            DownloadStatus::Paused => write!(f, "paused"),
            DownloadStatus::Completed => write!(f, "completed"),
            DownloadStatus::Failed => write!(f, "failed"),
            DownloadStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<String> for DownloadStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => DownloadStatus::Pending,
            "downloading" => DownloadStatus::Downloading,
            "paused" => DownloadStatus::Paused,
            "completed" => DownloadStatus::Completed,
            "failed" => DownloadStatus::Failed,
            "cancelled" => DownloadStatus::Cancelled,
            _ => DownloadStatus::Pending,
        }
    }
}

/// One queued or finished file download. `folder_path` mirrors the Drive
/// folder chain so files land in the same structure they were found in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSession {
    pub id: String,
    pub file_id: String,
    pub file_name: String,
    pub folder_path: String,
    pub file_size: i64,
    pub downloaded_bytes: i64,
    pub local_path: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Get SQL for creating download session tables
pub fn get_table_sql() -> &'static str {
    "
    -- Download sessions table
    CREATE TABLE IF NOT EXISTS download_sessions (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL,
        file_name TEXT NOT NULL,
        folder_path TEXT NOT NULL DEFAULT '',
        file_size INTEGER NOT NULL,
        downloaded_bytes INTEGER NOT NULL DEFAULT 0,
        local_path TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        error TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_download_sessions_status ON download_sessions(status);
    "
}

/// Create a new download session
pub async fn create_download_session(session: &DownloadSession) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    conn.execute(
        "INSERT INTO download_sessions
         (id, file_id, file_name, folder_path, file_size, downloaded_bytes,
          local_path, status, error, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        turso::params![
            session.id.clone(),
            session.file_id.clone(),
            session.file_name.clone(),
            session.folder_path.clone(),
            session.file_size,
            session.downloaded_bytes,
            session.local_path.clone(),
            session.status.clone(),
            session.error.clone(),
            session.created_at,
            session.updated_at,
        ],
    )
    .await?;
    Ok(())
}

/// Update download session progress
pub async fn update_download_progress(session_id: &str, downloaded_bytes: i64) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE download_sessions SET downloaded_bytes = ?1, updated_at = ?2 WHERE id = ?3",
        turso::params![downloaded_bytes, now, session_id],
    )
    .await?;
    Ok(())
}

/// Update download session file size (when obtained from Content-Length header)
pub async fn update_download_file_size(session_id: &str, file_size: i64) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE download_sessions SET file_size = ?1, updated_at = ?2 WHERE id = ?3",
        turso::params![file_size, now, session_id],
    )
    .await?;
    Ok(())
}

/// Update download session status
pub async fn update_download_status(
    session_id: &str,
    status: &str,
    error: Option<&str>,
) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE download_sessions SET status = ?1, error = ?2, updated_at = ?3 WHERE id = ?4",
        turso::params![status, error, now, session_id],
    )
    .await?;
    Ok(())
}

/// Get all download sessions, newest activity first
pub async fn get_download_sessions() -> DbResult<Vec<DownloadSession>> {
    let conn = get_connection()?.lock().await;
    let mut rows = conn
        .query(
            "SELECT id, file_id, file_name, folder_path, file_size, downloaded_bytes,
                local_path, status, error, created_at, updated_at
         FROM download_sessions
         ORDER BY updated_at DESC",
            (),
        )
        .await?;

    let mut sessions = Vec::new();
    while let Some(row) = rows.next().await? {
        sessions.push(DownloadSession {
            id: row.get(0)?,
            file_id: row.get(1)?,
            file_name: row.get(2)?,
            folder_path: row.get(3)?,
            file_size: row.get(4)?,
            downloaded_bytes: row.get(5)?,
            local_path: row.get(6)?,
            status: row.get(7)?,
            error: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        });
    }
    Ok(sessions)
}

/// Delete a download session
pub async fn delete_download_session(session_id: &str) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    conn.execute(
        "DELETE FROM download_sessions WHERE id = ?1",
        turso::params![session_id],
    )
    .await?;
    Ok(())
}

/// Get pending download sessions (ordered by created_at)
pub async fn get_pending_downloads(limit: i64) -> DbResult<Vec<DownloadSession>> {
    let conn = get_connection()?.lock().await;
    let mut rows = conn
        .query(
            "SELECT id, file_id, file_name, folder_path, file_size, downloaded_bytes,
                local_path, status, error, created_at, updated_at
         FROM download_sessions
         WHERE status = 'pending'
         ORDER BY created_at ASC
         LIMIT ?1",
            turso::params![limit],
        )
        .await?;

    let mut sessions = Vec::new();
    while let Some(row) = rows.next().await? {
        sessions.push(DownloadSession {
            id: row.get(0)?,
            file_id: row.get(1)?,
            file_name: row.get(2)?,
            folder_path: row.get(3)?,
            file_size: row.get(4)?,
            downloaded_bytes: row.get(5)?,
            local_path: row.get(6)?,
            status: row.get(7)?,
            error: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        });
    }
    Ok(sessions)
}

/// Count active (downloading) sessions
pub async fn count_active_downloads() -> DbResult<i64> {
    let conn = get_connection()?.lock().await;
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM download_sessions WHERE status = 'downloading'",
            (),
        )
        .await?;

    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}

/// Set all downloading/pending tasks to paused (for pause all)
pub async fn pause_all_downloads() -> DbResult<i64> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE download_sessions SET status = 'paused', updated_at = ?1
         WHERE status IN ('downloading', 'pending')",
        turso::params![now],
    )
    .await?;

    // Return count of updated rows
    let mut rows = conn.query("SELECT changes()", ()).await?;
    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}

/// Set all paused tasks to pending (for start all)
pub async fn resume_all_downloads() -> DbResult<i64> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE download_sessions SET status = 'pending', updated_at = ?1
         WHERE status = 'paused'",
        turso::params![now],
    )
    .await?;

    let mut rows = conn.query("SELECT changes()", ()).await?;
    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}

/// Delete all finished downloads (completed, failed, cancelled)
pub async fn delete_finished_downloads() -> DbResult<i64> {
    let conn = get_connection()?.lock().await;
    conn.execute(
        "DELETE FROM download_sessions
         WHERE status IN ('completed', 'failed', 'cancelled')",
        (),
    )
    .await?;

    let mut rows = conn.query("SELECT changes()", ()).await?;
    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}

/// Delete all download sessions (only call when no active downloads)
pub async fn delete_all_downloads() -> DbResult<i64> {
    let conn = get_connection()?.lock().await;
    conn.execute("DELETE FROM download_sessions", ()).await?;

    let mut rows = conn.query("SELECT changes()", ()).await?;
    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}
