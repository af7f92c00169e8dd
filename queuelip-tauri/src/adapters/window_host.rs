//! Tauri 窗口宿主适配器
//!
//! 把 core 层的 `WindowHost` 命令映射到 Tauri 的 `WebviewWindow` 操作。

use std::time::Duration;

use async_trait::async_trait;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use queuelip_core::error::{CoreError, CoreResult};
use queuelip_core::services::DASHBOARD_CONTEXT_EVENT;
use queuelip_core::traits::WindowHost;
use queuelip_core::types::{UiConfig, WindowGeometry, WindowRole, WindowSize};

/// 创建窗口所需的参数
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub title: String,
    pub url: String,
    pub size: WindowSize,
    pub resizable: bool,
}

impl WindowSpec {
    /// 按窗口角色生成创建参数
    pub fn for_role(role: &WindowRole, geometry: &WindowGeometry) -> Self {
        let (title, url, size, resizable) = match role {
            WindowRole::Main => (
                geometry.main_title.clone(),
                "index.html".to_string(),
                geometry.main,
                true,
            ),
            WindowRole::Dashboard => (
                role.title(),
                "dashboard.html".to_string(),
                geometry.dashboard,
                true,
            ),
            WindowRole::Mini => (role.title(), "mini.html".to_string(), geometry.mini, false),
            WindowRole::Popup(_) => (
                role.title(),
                role.popup_url().unwrap_or_default(),
                geometry.popup,
                false,
            ),
        };
        Self {
            label: role.label(),
            title,
            url,
            size,
            resizable,
        }
    }
}

/// Tauri 窗口宿主
pub struct TauriWindowHost {
    app_handle: AppHandle,
    geometry: WindowGeometry,
    hide_main_on_open: bool,
    close_settle: Duration,
}

impl TauriWindowHost {
    pub fn new(app_handle: AppHandle, config: &UiConfig) -> Self {
        Self {
            app_handle,
            geometry: config.windows.clone(),
            hide_main_on_open: config.hide_main_on_open,
            close_settle: config.close_settle(),
        }
    }

    fn window(&self, command: &str, label: &str) -> CoreResult<WebviewWindow> {
        self.app_handle
            .get_webview_window(label)
            .ok_or_else(|| CoreError::host(command, format!("window '{label}' not found")))
    }

    fn build(&self, command: &str, spec: &WindowSpec) -> CoreResult<WebviewWindow> {
        WebviewWindowBuilder::new(
            &self.app_handle,
            spec.label.clone(),
            WebviewUrl::App(spec.url.clone().into()),
        )
        .title(spec.title.clone())
        .inner_size(spec.size.width, spec.size.height)
        .center()
        .resizable(spec.resizable)
        .build()
        .map_err(|e| CoreError::host(command, e.to_string()))
    }

    /// 已存在则显示，否则新建
    fn show_or_build(&self, command: &str, role: &WindowRole) -> CoreResult<WebviewWindow> {
        if let Some(window) = self.app_handle.get_webview_window(&role.label()) {
            window
                .show()
                .map_err(|e| CoreError::host(command, e.to_string()))?;
            warn_on_failure(window.set_focus(), &format!("focus {role} window"));
            return Ok(window);
        }
        log::debug!("Creating {role} window");
        self.build(command, &WindowSpec::for_role(role, &self.geometry))
    }

    fn open_auxiliary(
        &self,
        command: &str,
        role: &WindowRole,
        context: Option<&str>,
    ) -> CoreResult<()> {
        self.show_or_build(command, role)?;
        if let Some(context) = context {
            warn_on_failure(
                self.app_handle
                    .emit_to(role.label(), DASHBOARD_CONTEXT_EVENT, context),
                &format!("send context to {role} window"),
            );
        }
        if self.hide_main_on_open {
            if let Some(main) = self.app_handle.get_webview_window("main") {
                main.hide()
                    .map_err(|e| CoreError::host(command, e.to_string()))?;
            }
        }
        Ok(())
    }

    fn hide(&self, command: &str, label: &str) -> CoreResult<()> {
        self.window(command, label)?
            .hide()
            .map_err(|e| CoreError::host(command, e.to_string()))
    }

    fn message(&self, title: &str, message: &str, kind: MessageDialogKind) {
        self.app_handle
            .dialog()
            .message(message)
            .title(title)
            .kind(kind)
            .show(|_| {});
    }
}

/// 记录非致命的窗口操作失败，返回操作是否成功
fn warn_on_failure<E: std::fmt::Display>(result: Result<(), E>, what: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to {what}: {e}");
            false
        }
    }
}

/// 弹窗关闭时：先显示主窗口，动画结束后再真正关闭
fn intercept_popup_close(app_handle: &AppHandle, window: &WebviewWindow, settle: Duration) {
    let app_handle = app_handle.clone();
    let label = window.label().to_string();
    window.on_window_event(move |event| {
        if let tauri::WindowEvent::CloseRequested { api, .. } = event {
            log::info!("Popup window {label} close requested, showing main window");
            api.prevent_close();

            if let Some(main) = app_handle.get_webview_window("main") {
                warn_on_failure(main.show(), "show main window");
                warn_on_failure(main.set_focus(), "focus main window");
            }

            let app_handle = app_handle.clone();
            let label = label.clone();
            tauri::async_runtime::spawn(async move {
                tokio::time::sleep(settle).await;
                if let Some(window) = app_handle.get_webview_window(&label) {
                    if let Err(e) = window.destroy() {
                        log::error!("Failed to close popup window {label}: {e}");
                    }
                }
            });
        }
    });
}

#[async_trait]
impl WindowHost for TauriWindowHost {
    async fn open_dashboard(&self, context: Option<&str>) -> CoreResult<()> {
        self.open_auxiliary("open_dashboard", &WindowRole::Dashboard, context)
    }

    async fn open_mini_window(&self, context: Option<&str>) -> CoreResult<()> {
        self.open_auxiliary("open_mini_window", &WindowRole::Mini, context)
    }

    async fn close_dashboard(&self) -> CoreResult<()> {
        self.hide("close_dashboard", "dashboard")
    }

    async fn close_mini_window(&self) -> CoreResult<()> {
        self.hide("close_mini_window", "mini")
    }

    async fn show_main_window(&self) -> CoreResult<()> {
        const COMMAND: &str = "show_main_window";
        let window = self.window(COMMAND, "main")?;
        window
            .show()
            .map_err(|e| CoreError::host(COMMAND, e.to_string()))?;
        if let Err(e) = window.unminimize() {
            log::warn!("Failed to unminimize main window: {e}");
        }
        if let Err(e) = window.set_focus() {
            log::warn!("Failed to focus main window: {e}");
        }
        Ok(())
    }

    async fn create_main_window(&self) -> CoreResult<()> {
        self.show_or_build("create_main_window", &WindowRole::Main)
            .map(|_| ())
    }

    async fn create_popup_window(&self, label: &str, title: &str, url: &str) -> CoreResult<()> {
        const COMMAND: &str = "create_popup_window";
        let spec = WindowSpec {
            label: label.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            size: self.geometry.popup,
            resizable: false,
        };
        let window = self.build(COMMAND, &spec)?;
        intercept_popup_close(&self.app_handle, &window, self.close_settle);
        Ok(())
    }

    async fn close_current_window(&self, label: &str) -> CoreResult<()> {
        const COMMAND: &str = "close_current_window";
        self.window(COMMAND, label)?
            .close()
            .map_err(|e| CoreError::host(COMMAND, e.to_string()))
    }

    async fn close_window_by_label(&self, label: &str) -> CoreResult<()> {
        const COMMAND: &str = "close_window_by_label";
        self.window(COMMAND, label)?
            .destroy()
            .map_err(|e| CoreError::host(COMMAND, e.to_string()))
    }

    async fn notify_fatal(&self, message: &str) {
        log::error!("{message}");
        self.message("Queuelip", message, MessageDialogKind::Error);
    }

    async fn show_message(&self, message: &str) {
        self.message("Queuelip", message, MessageDialogKind::Info);
    }

    async fn exit_app(&self) -> CoreResult<()> {
        self.app_handle.exit(0);
        Ok(())
    }
}
