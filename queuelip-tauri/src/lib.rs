mod adapters;
mod commands;
mod error;
mod types;

use std::sync::Arc;

use commands::{view, window};
use tauri::Manager;
use tauri_plugin_log::{Target, TargetKind};
use tauri_plugin_store::StoreExt;

use adapters::{TauriUiEventSink, TauriWindowHost};
use queuelip_app::{AppState, AppStateBuilder, load_ui_config};

/// 持久化设置文件
const SETTINGS_STORE: &str = "settings.json";
/// 设置文件中 UI 配置所在的键
const UI_CONFIG_KEY: &str = "ui";

/// 从 store 读取 UI 配置，缺失或无效时使用默认值
fn read_ui_config(app: &tauri::AppHandle) -> queuelip_core::types::UiConfig {
    let raw = match app.store(SETTINGS_STORE) {
        Ok(store) => store.get(UI_CONFIG_KEY),
        Err(e) => {
            log::warn!("Failed to open {SETTINGS_STORE}: {e}");
            None
        }
    };
    load_ui_config(raw)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let mut builder = tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_dialog::init());

    #[cfg(debug_assertions)]
    {
        builder = builder.plugin(
            tauri_plugin_log::Builder::new()
                .targets([Target::new(TargetKind::Stdout)])
                .level(log::LevelFilter::Debug)
                .build(),
        );
    }

    #[cfg(not(debug_assertions))]
    {
        builder = builder.plugin(
            tauri_plugin_log::Builder::new()
                .targets([Target::new(TargetKind::Stdout)])
                .level(log::LevelFilter::Warn)
                .build(),
        );
    }

    let builder = builder.setup(|app| {
        let app_handle = app.handle().clone();
        let config = read_ui_config(&app_handle);

        let window_host = Arc::new(TauriWindowHost::new(app_handle.clone(), &config));
        let event_sink = Arc::new(TauriUiEventSink::new(app_handle.clone()));

        let state = AppStateBuilder::new()
            .window_host(window_host)
            .config(config)
            .event_sink(event_sink)
            .build()
            .map_err(|e| e.to_string())?;

        app.manage(state);

        // 主窗口关闭即退出应用
        if let Some(main_window) = app.get_webview_window("main") {
            let title = app.state::<AppState>().config().windows.main_title.clone();
            main_window.set_title(&title)?;
            let app_handle = app_handle.clone();
            main_window.on_window_event(move |event| {
                if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                    log::info!("Main window close requested, exiting application");
                    api.prevent_close();
                    app_handle.exit(0);
                }
            });
        } else {
            log::warn!("Main window not found at startup");
        }

        Ok(())
    });

    #[allow(clippy::expect_used)]
    builder
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                let app_handle = window.app_handle().clone();
                let label = window.label().to_string();
                tauri::async_runtime::spawn(async move {
                    let state = app_handle.state::<AppState>();
                    state.coordinator.mark_closed(&label).await;
                });
            }
        })
        .invoke_handler(tauri::generate_handler![
            // View commands
            view::get_snapshot,
            view::switch_view,
            view::show_view,
            view::click_element,
            view::click_dashboard_element,
            view::get_dashboard_html,
            view::load_dashboard_context,
            // Window commands
            window::open_auxiliary,
            window::close_auxiliary,
            window::press_key,
            window::close_popup,
            window::list_windows,
            window::show_message,
            window::force_quit_app,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
