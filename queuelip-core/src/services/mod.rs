//! 界面协调服务层

mod dashboard_context;
mod focus_resolver;
mod view_registry;
mod view_switcher;
mod window_coordinator;

pub use dashboard_context::{DashboardPanel, DashboardView, DASHBOARD_CONTEXT_EVENT};
pub use focus_resolver::{FocusPolicy, FocusResolver};
pub use view_registry::{ViewHook, ViewRegistry, ViewScope};
pub use view_switcher::{
    main_window_document, ClickOutcome, ScheduledTask, Transition, ViewSwitcher,
};
pub use window_coordinator::{HostCommand, RecoveryPlan, WindowCoordinator, WindowOutcome};

use std::sync::Arc;

use crate::error::CoreResult;
use crate::traits::WindowHost;
use crate::types::UiConfig;

/// 服务上下文 - 持有所有依赖
///
/// 平台层创建此上下文并注入自己的 `WindowHost` 实现。
pub struct ServiceContext {
    /// 窗口宿主
    pub host: Arc<dyn WindowHost>,
    /// 界面配置
    pub config: UiConfig,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(host: Arc<dyn WindowHost>, config: UiConfig) -> Self {
        Self { host, config }
    }

    /// 窗口协调器
    #[must_use]
    pub fn window_coordinator(&self) -> WindowCoordinator {
        WindowCoordinator::from_config(Arc::clone(&self.host), &self.config)
    }

    /// 主窗口视图切换器（已初始化）
    ///
    /// 焦点策略中的选择器无效时返回错误。
    pub fn main_view_switcher(&self) -> CoreResult<ViewSwitcher> {
        ViewSwitcher::from_config(&self.config)
    }
}
