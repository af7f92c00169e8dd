//! 测试辅助模块
//!
//! 提供可编排失败的 `WindowHost` mock。

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::traits::WindowHost;

// ===== MockWindowHost =====

pub struct MockWindowHost {
    calls: RwLock<Vec<String>>,
    /// 这些命令被调用时返回错误
    failing: RwLock<HashSet<String>>,
    last_context: RwLock<Option<String>>,
    fatal: RwLock<Vec<String>>,
}

impl MockWindowHost {
    pub fn new() -> Self {
        Self {
            calls: RwLock::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            last_context: RwLock::new(None),
            fatal: RwLock::new(Vec::new()),
        }
    }

    pub async fn fail_on(&self, command: &str) {
        self.failing.write().await.insert(command.to_string());
    }

    /// 按调用顺序返回命令名
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn last_context(&self) -> Option<String> {
        self.last_context.read().await.clone()
    }

    pub async fn fatal_messages(&self) -> Vec<String> {
        self.fatal.read().await.clone()
    }

    async fn record(&self, command: &str) -> CoreResult<()> {
        self.calls.write().await.push(command.to_string());
        if self.failing.read().await.contains(command) {
            return Err(CoreError::host(command, "window not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl WindowHost for MockWindowHost {
    async fn open_dashboard(&self, context: Option<&str>) -> CoreResult<()> {
        *self.last_context.write().await = context.map(str::to_string);
        self.record("open_dashboard").await
    }

    async fn open_mini_window(&self, context: Option<&str>) -> CoreResult<()> {
        *self.last_context.write().await = context.map(str::to_string);
        self.record("open_mini_window").await
    }

    async fn close_dashboard(&self) -> CoreResult<()> {
        self.record("close_dashboard").await
    }

    async fn close_mini_window(&self) -> CoreResult<()> {
        self.record("close_mini_window").await
    }

    async fn show_main_window(&self) -> CoreResult<()> {
        self.record("show_main_window").await
    }

    async fn create_main_window(&self) -> CoreResult<()> {
        self.record("create_main_window").await
    }

    async fn create_popup_window(&self, _label: &str, _title: &str, _url: &str) -> CoreResult<()> {
        self.record("create_popup_window").await
    }

    async fn close_current_window(&self, _label: &str) -> CoreResult<()> {
        self.record("close_current_window").await
    }

    async fn close_window_by_label(&self, _label: &str) -> CoreResult<()> {
        self.record("close_window_by_label").await
    }

    async fn notify_fatal(&self, message: &str) {
        self.fatal.write().await.push(message.to_string());
    }

    async fn show_message(&self, message: &str) {
        log::info!("{message}");
    }

    async fn exit_app(&self) -> CoreResult<()> {
        self.record("exit_app").await
    }
}
