//! Download Tauri commands

use crate::db::{self, DownloadSession};
use chrono::Utc;
use std::sync::atomic::Ordering;
use tauri::{AppHandle, Emitter};

use super::types::{DownloadBatchOperation, DownloadStatusChanged, DownloadTaskDeleted};
use super::worker::{
    get_pending_sessions_to_start, spawn_download_task, DOWNLOAD_CANCEL_REGISTRY,
    DOWNLOAD_PAUSE_REGISTRY,
};

/// Create a download session in the database and return its task id
#[tauri::command]
pub async fn create_download_task(
    file_id: String,
    file_name: String,
    file_size: i64,
    folder_path: String,
    local_path: String,
) -> Result<String, String> {
    if file_id.trim().is_empty() {
        return Err("No file id was provided".to_string());
    }

    let task_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();
    let session = DownloadSession {
        id: task_id.clone(),
        file_id,
        file_name,
        folder_path,
        file_size,
        downloaded_bytes: 0,
        local_path,
        status: "pending".to_string(),
        error: None,
        created_at: now,
        updated_at: now,
    };

    db::create_download_session(&session)
        .await
        .map_err(|e| format!("Failed to create download session: {}", e))?;

    Ok(task_id)
}

/// Process the download queue - start pending downloads up to MAX_CONCURRENT_DOWNLOADS
#[tauri::command]
pub async fn start_download_queue(app: AppHandle) -> Result<i64, String> {
    // Get sessions to start (this updates their status in DB and emits events)
    let sessions = get_pending_sessions_to_start(&app).await?;
    let started_count = sessions.len() as i64;

    // Spawn download tasks for each session
    for session in sessions {
        let app_clone = app.clone();
        tokio::spawn(async move {
            spawn_download_task(app_clone, session).await;
        });
    }

    Ok(started_count)
}

/// Start all paused downloads
#[tauri::command]
pub async fn start_all_downloads(app: AppHandle) -> Result<i64, String> {
    // First, set all paused tasks to pending in DB
    let resumed_count = db::resume_all_downloads()
        .await
        .map_err(|e| format!("Failed to resume downloads: {}", e))?;

    // Emit batch operation event for UI to reload
    let _ = app.emit(
        "download-batch-operation",
        DownloadBatchOperation {
            operation: "resume_all".to_string(),
        },
    );

    // Then get sessions to start and spawn tasks
    let sessions = get_pending_sessions_to_start(&app).await?;

    for session in sessions {
        let app_clone = app.clone();
        tokio::spawn(async move {
            spawn_download_task(app_clone, session).await;
        });
    }

    Ok(resumed_count)
}

/// Pause all active downloads
#[tauri::command]
pub async fn pause_all_downloads(app: AppHandle) -> Result<i64, String> {
    // Set pause flag for all active downloads
    {
        let registry = DOWNLOAD_PAUSE_REGISTRY.lock().await;
        for (_, paused) in registry.iter() {
            paused.store(true, Ordering::SeqCst);
        }
    }

    // Also update DB directly for any that might not be in registry
    let paused_count = db::pause_all_downloads()
        .await
        .map_err(|e| format!("Failed to pause downloads: {}", e))?;

    // Emit batch operation event for UI to reload
    let _ = app.emit(
        "download-batch-operation",
        DownloadBatchOperation {
            operation: "pause_all".to_string(),
        },
    );

    Ok(paused_count)
}

/// Pause a single download
#[tauri::command]
pub async fn pause_download(app: AppHandle, task_id: String) -> Result<(), String> {
    let registry = DOWNLOAD_PAUSE_REGISTRY.lock().await;
    if let Some(paused) = registry.get(&task_id) {
        paused.store(true, Ordering::SeqCst);
        // Event will be emitted by download_file_internal when it detects pause
    } else {
        // If not actively downloading, just update status in DB and emit event
        let _ = db::update_download_status(&task_id, "paused", None).await;
        let _ = app.emit(
            "download-status-changed",
            DownloadStatusChanged {
                task_id: task_id.clone(),
                status: "paused".to_string(),
                error: None,
            },
        );
    }
    Ok(())
}

/// Resume a single paused download (set status to pending)
#[tauri::command]
pub async fn resume_download(app: AppHandle, task_id: String) -> Result<(), String> {
    db::update_download_status(&task_id, "pending", None)
        .await
        .map_err(|e| format!("Failed to resume download: {}", e))?;

    // Emit status change event
    let _ = app.emit(
        "download-status-changed",
        DownloadStatusChanged {
            task_id: task_id.clone(),
            status: "pending".to_string(),
            error: None,
        },
    );

    Ok(())
}

/// Cancel a download (removes the partial file)
#[tauri::command]
pub async fn cancel_download(app: AppHandle, task_id: String) -> Result<(), String> {
    let registry = DOWNLOAD_CANCEL_REGISTRY.lock().await;
    if let Some(cancelled) = registry.get(&task_id) {
        cancelled.store(true, Ordering::SeqCst);
        // Event will be emitted by download_file_internal when it detects cancel
    } else {
        // If not actively downloading, just update status in DB and emit event
        let _ = db::update_download_status(&task_id, "cancelled", None).await;
        let _ = app.emit(
            "download-status-changed",
            DownloadStatusChanged {
                task_id: task_id.clone(),
                status: "cancelled".to_string(),
                error: None,
            },
        );
    }
    Ok(())
}

/// Delete a download task from the database
#[tauri::command]
pub async fn delete_download_task(app: AppHandle, task_id: String) -> Result<(), String> {
    // Cancel if active
    {
        let registry = DOWNLOAD_CANCEL_REGISTRY.lock().await;
        if let Some(cancelled) = registry.get(&task_id) {
            cancelled.store(true, Ordering::SeqCst);
        }
    }

    // Delete from DB
    db::delete_download_session(&task_id)
        .await
        .map_err(|e| format!("Failed to delete download task: {}", e))?;

    // Emit delete event
    let _ = app.emit(
        "download-task-deleted",
        DownloadTaskDeleted {
            task_id: task_id.clone(),
        },
    );

    Ok(())
}

/// Get all download sessions
#[tauri::command]
pub async fn get_download_tasks() -> Result<Vec<DownloadSession>, String> {
    db::get_download_sessions()
        .await
        .map_err(|e| format!("Failed to get download tasks: {}", e))
}

/// Clear all finished download tasks (completed, failed, cancelled)
#[tauri::command]
pub async fn clear_finished_downloads(app: AppHandle) -> Result<i64, String> {
    let deleted_count = db::delete_finished_downloads()
        .await
        .map_err(|e| format!("Failed to clear finished downloads: {}", e))?;

    // Emit batch operation event for UI
    let _ = app.emit(
        "download-batch-operation",
        DownloadBatchOperation {
            operation: "clear_finished".to_string(),
        },
    );

    Ok(deleted_count)
}

/// Clear all download tasks (only when no active downloads)
#[tauri::command]
pub async fn clear_all_downloads(app: AppHandle) -> Result<i64, String> {
    // Check if there are active downloads
    let active_count = db::count_active_downloads()
        .await
        .map_err(|e| format!("Failed to count active downloads: {}", e))?;

    if active_count > 0 {
        return Err("Cannot clear all downloads while downloads are active".to_string());
    }

    let deleted_count = db::delete_all_downloads()
        .await
        .map_err(|e| format!("Failed to clear all downloads: {}", e))?;

    // Emit batch operation event for UI
    let _ = app.emit(
        "download-batch-operation",
        DownloadBatchOperation {
            operation: "clear_all".to_string(),
        },
    );

    Ok(deleted_count)
}

/// Select a folder for downloading files using native dialog
#[tauri::command]
pub async fn select_download_folder(app: AppHandle) -> Result<Option<String>, String> {
    use tauri_plugin_dialog::DialogExt;

    let (tx, rx) = tokio::sync::oneshot::channel();

    app.dialog()
        .file()
        .set_title("Select Download Folder")
        .pick_folder(move |folder_path| {
            let result = folder_path.map(|p| p.to_string());
            let _ = tx.send(result);
        });

    rx.await.map_err(|_| "Dialog was closed".to_string())
}
