//! Download worker - internal download logic with streaming and progress tracking

use crate::db::{self, DownloadSession};
use crate::drive::current_access_token;
use drive_walk::DRIVE_API_BASE;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tauri::{AppHandle, Emitter};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tokio::sync::Mutex;

use super::types::{DownloadProgress, DownloadStatusChanged, MAX_CONCURRENT_DOWNLOADS};

/// Write buffer size for downloads (2 MB) - reduces I/O operations
const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

// Global cancel/pause registry for downloads
lazy_static::lazy_static! {
    pub(crate) static ref DOWNLOAD_CANCEL_REGISTRY: Mutex<HashMap<String, Arc<AtomicBool>>> = Mutex::new(HashMap::new());
    pub(crate) static ref DOWNLOAD_PAUSE_REGISTRY: Mutex<HashMap<String, Arc<AtomicBool>>> = Mutex::new(HashMap::new());
}

/// Destination path for a session: the chosen directory plus the Drive
/// folder chain the file was found under.
fn destination_path(session: &DownloadSession) -> PathBuf {
    let mut path = PathBuf::from(&session.local_path);
    for segment in session.folder_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.join(&session.file_name)
}

fn percent_of(done: u64, total: u64) -> u32 {
    if total > 0 {
        std::cmp::min(((done as f64 / total as f64) * 100.0) as u32, 100)
    } else {
        0
    }
}

fn emit_progress(app: &AppHandle, task_id: &str, done: u64, total: u64, speed: f64) {
    let _ = app.emit(
        "download-progress",
        DownloadProgress {
            task_id: task_id.to_string(),
            percent: percent_of(done, total),
            downloaded_bytes: done,
            total_bytes: total,
            speed,
        },
    );
}

fn emit_status(app: &AppHandle, task_id: &str, status: &str, error: Option<String>) {
    let _ = app.emit(
        "download-status-changed",
        DownloadStatusChanged {
            task_id: task_id.to_string(),
            status: status.to_string(),
            error,
        },
    );
}

/// Download a single file with streaming and progress (internal)
#[allow(clippy::too_many_arguments)]
pub(crate) async fn download_file_internal(
    client: &Client,
    file_id: &str,
    destination: &Path,
    task_id: &str,
    file_size: u64,
    app: &AppHandle,
    cancelled: &Arc<AtomicBool>,
    paused: &Arc<AtomicBool>,
) -> Result<(), String> {
    // A fresh access token for every task; the media endpoint wants it as a
    // bearer header
    let access_token = current_access_token()
        .await
        .map_err(|e| format!("Failed to get access token: {}", e))?;
    let media_url = format!("{}/files/{}?alt=media", DRIVE_API_BASE, file_id);

    // Check if we should resume from existing partial file
    let existing_bytes = if destination.exists() {
        tokio::fs::metadata(destination)
            .await
            .map(|m| m.len())
            .unwrap_or(0)
    } else {
        0
    };

    // Start the download request with range header if resuming
    let mut request = client.get(&media_url).bearer_auth(&access_token);
    if existing_bytes > 0 {
        request = request.header("Range", format!("bytes={}-", existing_bytes));
    }

    let response = request
        .send()
        .await
        .map_err(|e| format!("Download request failed: {}", e))?;

    if !response.status().is_success() && response.status().as_u16() != 206 {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("Download failed: {} - {}", status, text));
    }

    // Enumeration may not have known the size; fall back to Content-Length
    let total_bytes = if file_size > 0 {
        file_size
    } else {
        let content_length = response.content_length().unwrap_or(0) + existing_bytes;
        if content_length > 0 {
            let _ = db::update_download_file_size(task_id, content_length as i64).await;
        }
        content_length
    };

    // Create parent directories if needed (this is what materializes the
    // Drive folder structure locally)
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    // Open or create the destination file (append mode if resuming)
    let mut file = if existing_bytes > 0 {
        let mut f = OpenOptions::new()
            .write(true)
            .open(destination)
            .await
            .map_err(|e| format!("Failed to open file: {}", e))?;
        f.seek(SeekFrom::End(0))
            .await
            .map_err(|e| format!("Failed to seek: {}", e))?;
        f
    } else {
        File::create(destination)
            .await
            .map_err(|e| format!("Failed to create file: {}", e))?
    };

    // Show the task as started right away
    emit_progress(app, task_id, existing_bytes, total_bytes, 0.0);

    let mut downloaded = existing_bytes;
    let start_time = std::time::Instant::now();
    let start_bytes = existing_bytes;
    let speed_of = |downloaded: u64, elapsed: f64| {
        if elapsed > 0.0 {
            downloaded.saturating_sub(start_bytes) as f64 / elapsed
        } else {
            0.0
        }
    };

    // Stream the response body to the file with buffered writes
    let mut stream = response.bytes_stream();
    use futures_util::StreamExt;

    let mut write_buffer = Vec::with_capacity(WRITE_BUFFER_SIZE);

    while let Some(chunk_result) = stream.next().await {
        // Check for cancel - a cancelled task discards the partial file
        if cancelled.load(Ordering::SeqCst) {
            drop(file);
            let _ = tokio::fs::remove_file(destination).await;
            let _ = db::update_download_status(task_id, "cancelled", None).await;
            emit_status(app, task_id, "cancelled", None);
            return Err("Download cancelled".to_string());
        }

        // Check for pause - flush buffer and save progress before pausing so
        // the next start resumes from the right byte
        if paused.load(Ordering::SeqCst) {
            if !write_buffer.is_empty() {
                file.write_all(&write_buffer)
                    .await
                    .map_err(|e| format!("Failed to write buffer: {}", e))?;
                write_buffer.clear();
            }

            let _ = db::update_download_progress(task_id, downloaded as i64).await;
            let _ = db::update_download_status(task_id, "paused", None).await;
            emit_progress(app, task_id, downloaded, total_bytes, 0.0);
            emit_status(app, task_id, "paused", None);
            return Err("Download paused".to_string());
        }

        let chunk = chunk_result.map_err(|e| format!("Failed to read chunk: {}", e))?;
        write_buffer.extend_from_slice(&chunk);
        downloaded += chunk.len() as u64;

        // Flush buffer when it reaches target size and report progress
        if write_buffer.len() >= WRITE_BUFFER_SIZE {
            file.write_all(&write_buffer)
                .await
                .map_err(|e| format!("Failed to write buffer: {}", e))?;
            write_buffer.clear();

            let speed = speed_of(downloaded, start_time.elapsed().as_secs_f64());
            emit_progress(app, task_id, downloaded, total_bytes, speed);
            let _ = db::update_download_progress(task_id, downloaded as i64).await;
        }
    }

    // Flush remaining buffer
    if !write_buffer.is_empty() {
        file.write_all(&write_buffer)
            .await
            .map_err(|e| format!("Failed to write remaining buffer: {}", e))?;
    }

    // Ensure all data is written
    file.flush()
        .await
        .map_err(|e| format!("Failed to flush file: {}", e))?;

    let speed = speed_of(downloaded, start_time.elapsed().as_secs_f64());
    emit_progress(app, task_id, downloaded, total_bytes.max(downloaded), speed);

    // Update DB with completed status
    let _ = db::update_download_progress(task_id, downloaded as i64).await;
    let _ = db::update_download_status(task_id, "completed", None).await;
    emit_status(app, task_id, "completed", None);

    // Emit download-complete event for queue management
    let _ = app.emit("download-complete", task_id.to_string());

    Ok(())
}

/// Spawn a download task
pub(crate) async fn spawn_download_task(app: AppHandle, session: DownloadSession) {
    let task_id = session.id.clone();

    // Register cancel and pause flags
    let cancelled = Arc::new(AtomicBool::new(false));
    let paused = Arc::new(AtomicBool::new(false));
    {
        let mut cancel_registry = DOWNLOAD_CANCEL_REGISTRY.lock().await;
        cancel_registry.insert(task_id.clone(), cancelled.clone());
        let mut pause_registry = DOWNLOAD_PAUSE_REGISTRY.lock().await;
        pause_registry.insert(task_id.clone(), paused.clone());
    }

    let client = match Client::builder().build() {
        Ok(c) => c,
        Err(e) => {
            let _ = db::update_download_status(&task_id, "failed", Some(&e.to_string())).await;
            emit_status(&app, &task_id, "failed", Some(e.to_string()));
            return;
        }
    };

    let destination = destination_path(&session);

    let result = download_file_internal(
        &client,
        &session.file_id,
        &destination,
        &task_id,
        session.file_size as u64,
        &app,
        &cancelled,
        &paused,
    )
    .await;

    // Cleanup registries
    {
        let mut cancel_registry = DOWNLOAD_CANCEL_REGISTRY.lock().await;
        cancel_registry.remove(&task_id);
        let mut pause_registry = DOWNLOAD_PAUSE_REGISTRY.lock().await;
        pause_registry.remove(&task_id);
    }

    // Pause/cancel already reported their own status
    if let Err(e) = result {
        if !e.contains("paused") && !e.contains("cancelled") {
            log::error!("download {} failed: {}", task_id, e);
            let _ = db::update_download_status(&task_id, "failed", Some(&e)).await;
            emit_status(&app, &task_id, "failed", Some(e));
        }
    }
}

/// Internal function to process download queue - returns sessions to start
pub(crate) async fn get_pending_sessions_to_start(
    app: &AppHandle,
) -> Result<Vec<DownloadSession>, String> {
    // Count currently active downloads
    let active_count = db::count_active_downloads()
        .await
        .map_err(|e| format!("Failed to count active downloads: {}", e))?;

    let slots_available = MAX_CONCURRENT_DOWNLOADS - active_count;
    if slots_available <= 0 {
        return Ok(Vec::new());
    }

    // Get pending tasks up to available slots
    let pending = db::get_pending_downloads(slots_available)
        .await
        .map_err(|e| format!("Failed to get pending downloads: {}", e))?;

    // Update status to downloading in DB for each and emit events
    for session in &pending {
        let _ = db::update_download_status(&session.id, "downloading", None).await;
        emit_status(app, &session.id, "downloading", None);
    }

    Ok(pending)
}
