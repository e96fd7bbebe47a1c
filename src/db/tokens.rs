use super::{get_connection, DbResult};
use serde::{Deserialize, Serialize};

// ============ Token Struct ============

/// The Google OAuth token set for the connected account. One row at most;
/// re-authenticating replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub id: i64,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token is no longer valid
    pub expires_at: i64,
    pub scope: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Get SQL for creating the token table
pub fn get_table_sql() -> &'static str {
    "
    CREATE TABLE IF NOT EXISTS oauth_tokens (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        access_token TEXT NOT NULL,
        refresh_token TEXT,
        expires_at INTEGER NOT NULL,
        scope TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );
    "
}

// ============ Token Functions ============

/// Store a token set, replacing any previously connected account
pub async fn save_tokens(
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: i64,
    scope: &str,
) -> DbResult<StoredTokens> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute("DELETE FROM oauth_tokens", ()).await?;
    conn.execute(
        "INSERT INTO oauth_tokens (access_token, refresh_token, expires_at, scope, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        turso::params![access_token, refresh_token, expires_at, scope, now, now],
    )
    .await?;
    let id = conn.last_insert_rowid();
    Ok(StoredTokens {
        id,
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(|s| s.to_string()),
        expires_at,
        scope: scope.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get the stored token set, if an account is connected
pub async fn get_tokens() -> DbResult<Option<StoredTokens>> {
    let conn = get_connection()?.lock().await;
    let mut rows = conn
        .query(
            "SELECT id, access_token, refresh_token, expires_at, scope, created_at, updated_at
         FROM oauth_tokens LIMIT 1",
            (),
        )
        .await?;

    if let Some(row) = rows.next().await? {
        Ok(Some(StoredTokens {
            id: row.get(0)?,
            access_token: row.get(1)?,
            refresh_token: row.get(2)?,
            expires_at: row.get(3)?,
            scope: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        }))
    } else {
        Ok(None)
    }
}

/// Replace the access token after a refresh
pub async fn update_access_token(id: i64, access_token: &str, expires_at: i64) -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE oauth_tokens SET access_token = ?1, expires_at = ?2, updated_at = ?3 WHERE id = ?4",
        turso::params![access_token, expires_at, now, id],
    )
    .await?;
    Ok(())
}

/// Disconnect the account
pub async fn delete_tokens() -> DbResult<()> {
    let conn = get_connection()?.lock().await;
    conn.execute("DELETE FROM oauth_tokens", ()).await?;
    Ok(())
}
