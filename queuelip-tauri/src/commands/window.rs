use queuelip_app::AppState;
use queuelip_core::types::Action;
use tauri::{State, WebviewWindow};

use crate::error::AppError;
use crate::types::{ApiResponse, WindowHandle, WindowOutcome, WindowRole};

/// 打开辅助窗口（仪表盘、迷你窗口、弹窗）
#[tauri::command]
pub async fn open_auxiliary(
    state: State<'_, AppState>,
    role: WindowRole,
    context: Option<String>,
) -> Result<ApiResponse<WindowHandle>, AppError> {
    let handle = state.open_auxiliary(role, context.as_deref()).await?;
    Ok(ApiResponse::success(handle))
}

/// 关闭辅助窗口并回到主窗口
#[tauri::command]
pub async fn close_auxiliary(
    state: State<'_, AppState>,
    role: WindowRole,
) -> Result<ApiResponse<WindowOutcome>, AppError> {
    let outcome = state.close_auxiliary(&role).await?;
    Ok(ApiResponse::success(outcome))
}

/// 转发辅助窗口内的按键
#[tauri::command]
pub async fn press_key(
    state: State<'_, AppState>,
    role: WindowRole,
    key: String,
) -> Result<ApiResponse<()>, AppError> {
    state.key_pressed(&role, &key).await?;
    Ok(ApiResponse::success(()))
}

/// 关闭调用方所在的弹窗
#[tauri::command]
pub async fn close_popup(
    state: State<'_, AppState>,
    window: WebviewWindow,
) -> Result<ApiResponse<WindowOutcome>, AppError> {
    let outcome = state.close_popup(window.label()).await?;
    Ok(ApiResponse::success(outcome))
}

/// 列出已知窗口
#[tauri::command]
pub async fn list_windows(
    state: State<'_, AppState>,
) -> Result<ApiResponse<Vec<WindowHandle>>, AppError> {
    Ok(ApiResponse::success(state.coordinator.handles().await))
}

/// 显示提示消息
#[tauri::command]
pub async fn show_message(
    state: State<'_, AppState>,
    message: String,
) -> Result<ApiResponse<()>, AppError> {
    state.dispatch(Action::ShowMessage(message)).await?;
    Ok(ApiResponse::success(()))
}

/// 退出应用
#[tauri::command]
pub async fn force_quit_app(state: State<'_, AppState>) -> Result<ApiResponse<()>, AppError> {
    state.quit().await?;
    Ok(ApiResponse::success(()))
}
