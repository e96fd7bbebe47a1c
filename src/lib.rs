use std::path::PathBuf;
use tauri::Manager;

mod db;
mod download;
mod drive;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_process::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            // Initialize database in app data directory
            let app_data_dir = app.path().app_data_dir().expect("Failed to get app data dir");
            std::fs::create_dir_all(&app_data_dir).expect("Failed to create app data dir");

            let db_path: PathBuf = app_data_dir.join("drivefetch.db");
            tauri::async_runtime::block_on(db::init_db(&db_path))
                .expect("Failed to initialize database");

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            drive::commands::check_auth,
            drive::commands::get_auth_url,
            drive::commands::complete_auth,
            drive::commands::sign_out,
            drive::commands::list_media,
            download::commands::create_download_task,
            download::commands::start_download_queue,
            download::commands::start_all_downloads,
            download::commands::pause_download,
            download::commands::pause_all_downloads,
            download::commands::resume_download,
            download::commands::cancel_download,
            download::commands::delete_download_task,
            download::commands::get_download_tasks,
            download::commands::clear_finished_downloads,
            download::commands::clear_all_downloads,
            download::commands::select_download_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
