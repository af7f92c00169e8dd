use queuelip_app::AppState;
use tauri::State;

use crate::error::AppError;
use crate::types::{ApiResponse, AppSnapshot, DashboardPanel, ViewId, ViewSnapshot};

/// 获取当前视图与窗口状态
#[tauri::command]
pub async fn get_snapshot(state: State<'_, AppState>) -> Result<ApiResponse<AppSnapshot>, AppError> {
    Ok(ApiResponse::success(state.snapshot().await))
}

/// 切换主窗口视图
#[tauri::command]
pub async fn switch_view(
    state: State<'_, AppState>,
    view: ViewId,
) -> Result<ApiResponse<ViewSnapshot>, AppError> {
    let snapshot = state.switch_view(&view).await?;
    Ok(ApiResponse::success(snapshot))
}

/// 通过导航标签切换视图
#[tauri::command]
pub async fn show_view(
    state: State<'_, AppState>,
    name: String,
) -> Result<ApiResponse<ViewSnapshot>, AppError> {
    let snapshot = state.show_view(&name).await?;
    Ok(ApiResponse::success(snapshot))
}

/// 转发主窗口内的点击
#[tauri::command]
pub async fn click_element(
    state: State<'_, AppState>,
    element_id: String,
) -> Result<ApiResponse<ViewSnapshot>, AppError> {
    let snapshot = state.click(&element_id).await?;
    Ok(ApiResponse::success(snapshot))
}

/// 转发仪表盘窗口内的点击
#[tauri::command]
pub async fn click_dashboard_element(
    state: State<'_, AppState>,
    element_id: String,
) -> Result<ApiResponse<()>, AppError> {
    state.click_dashboard(&element_id).await?;
    Ok(ApiResponse::success(()))
}

/// 获取仪表盘内容
#[tauri::command]
pub async fn get_dashboard_html(
    state: State<'_, AppState>,
) -> Result<ApiResponse<String>, AppError> {
    Ok(ApiResponse::success(state.dashboard_html().await))
}

/// 应用 `dashboard-context` 上下文
#[tauri::command]
pub async fn load_dashboard_context(
    state: State<'_, AppState>,
    context: String,
) -> Result<ApiResponse<DashboardPanel>, AppError> {
    let panel = state.load_dashboard_context(&context).await?;
    Ok(ApiResponse::success(panel))
}
