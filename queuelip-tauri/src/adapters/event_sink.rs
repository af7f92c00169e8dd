//! Tauri 事件推送适配器

use async_trait::async_trait;
use serde::Serialize;
use tauri::{AppHandle, Emitter};

use queuelip_app::UiEventSink;
use queuelip_core::services::DashboardPanel;
use queuelip_core::types::ViewSnapshot;

/// 主窗口视图状态变化
pub const VIEW_UPDATED_EVENT: &str = "view-updated";
/// 仪表盘面板变化
pub const DASHBOARD_UPDATED_EVENT: &str = "dashboard-updated";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardUpdate<'a> {
    panel: DashboardPanel,
    html: &'a str,
}

/// 通过 Tauri 事件把状态推送到对应窗口
pub struct TauriUiEventSink {
    app_handle: AppHandle,
}

impl TauriUiEventSink {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

#[async_trait]
impl UiEventSink for TauriUiEventSink {
    async fn view_updated(&self, snapshot: &ViewSnapshot) {
        if let Err(e) = self
            .app_handle
            .emit_to("main", VIEW_UPDATED_EVENT, snapshot)
        {
            log::warn!("Failed to emit {VIEW_UPDATED_EVENT}: {e}");
        }
    }

    async fn dashboard_updated(&self, panel: DashboardPanel, html: &str) {
        let payload = DashboardUpdate { panel, html };
        if let Err(e) = self
            .app_handle
            .emit_to("dashboard", DASHBOARD_UPDATED_EVENT, payload)
        {
            log::warn!("Failed to emit {DASHBOARD_UPDATED_EVENT}: {e}");
        }
    }
}
