use serde::{Deserialize, Serialize};

// Re-export 命令层用到的类型
pub use queuelip_app::AppSnapshot;
pub use queuelip_core::services::{DashboardPanel, WindowOutcome};
pub use queuelip_core::types::{ViewId, ViewSnapshot, WindowHandle, WindowRole};

/// API 响应包装类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}
