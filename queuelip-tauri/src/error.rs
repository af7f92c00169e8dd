use queuelip_core::error::CoreError;
use serde::Serialize;

/// Queuelip 命令返回的错误
///
/// 序列化为内部 `CoreError` 的 `{code, details}`，转换时按 `is_expected()` 记录日志。
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct AppError(pub CoreError);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        if err.is_expected() {
            log::warn!("Command rejected: {err}");
        } else {
            log::error!("Command failed: {err}");
        }
        Self(err)
    }
}
