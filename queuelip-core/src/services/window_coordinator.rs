//! Window lifecycle coordinator - host window sequencing with fallback recovery

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::traits::WindowHost;
use crate::types::{UiConfig, WindowHandle, WindowRole, WindowVisibility};

/// Request sent to the windowing host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "camelCase")]
pub enum HostCommand {
    OpenDashboard(Option<String>),
    OpenMiniWindow(Option<String>),
    CloseDashboard,
    CloseMiniWindow,
    ShowMainWindow,
    CreateMainWindow,
    CreatePopupWindow {
        label: String,
        title: String,
        url: String,
    },
    CloseCurrentWindow(String),
    CloseWindowByLabel(String),
}

impl HostCommand {
    /// Host command name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenDashboard(_) => "open_dashboard",
            Self::OpenMiniWindow(_) => "open_mini_window",
            Self::CloseDashboard => "close_dashboard",
            Self::CloseMiniWindow => "close_mini_window",
            Self::ShowMainWindow => "show_main_window",
            Self::CreateMainWindow => "create_main_window",
            Self::CreatePopupWindow { .. } => "create_popup_window",
            Self::CloseCurrentWindow(_) => "close_current_window",
            Self::CloseWindowByLabel(_) => "close_window_by_label",
        }
    }

    /// Window state the host is in once the command succeeded
    fn effect(&self) -> Option<(WindowRole, WindowVisibility)> {
        match self {
            Self::OpenDashboard(_) => Some((WindowRole::Dashboard, WindowVisibility::Visible)),
            Self::OpenMiniWindow(_) => Some((WindowRole::Mini, WindowVisibility::Visible)),
            Self::CloseDashboard => Some((WindowRole::Dashboard, WindowVisibility::Hidden)),
            Self::CloseMiniWindow => Some((WindowRole::Mini, WindowVisibility::Hidden)),
            Self::ShowMainWindow | Self::CreateMainWindow => {
                Some((WindowRole::Main, WindowVisibility::Visible))
            }
            Self::CreatePopupWindow { label, .. } => {
                WindowRole::from_label(label).map(|role| (role, WindowVisibility::Visible))
            }
            Self::CloseCurrentWindow(label) | Self::CloseWindowByLabel(label) => {
                WindowRole::from_label(label).map(|role| (role, WindowVisibility::Closed))
            }
        }
    }

    fn opens_auxiliary(&self) -> bool {
        matches!(
            self,
            Self::OpenDashboard(_) | Self::OpenMiniWindow(_) | Self::CreatePopupWindow { .. }
        )
    }

    async fn execute(&self, host: &dyn WindowHost) -> CoreResult<()> {
        match self {
            Self::OpenDashboard(context) => host.open_dashboard(context.as_deref()).await,
            Self::OpenMiniWindow(context) => host.open_mini_window(context.as_deref()).await,
            Self::CloseDashboard => host.close_dashboard().await,
            Self::CloseMiniWindow => host.close_mini_window().await,
            Self::ShowMainWindow => host.show_main_window().await,
            Self::CreateMainWindow => host.create_main_window().await,
            Self::CreatePopupWindow { label, title, url } => {
                host.create_popup_window(label, title, url).await
            }
            Self::CloseCurrentWindow(label) => host.close_current_window(label).await,
            Self::CloseWindowByLabel(label) => host.close_window_by_label(label).await,
        }
    }
}

/// Primary step plus ordered recovery steps of one window operation
///
/// A step succeeds only if every command in it does; steps run until one
/// succeeds or the plan is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    pub operation: String,
    pub primary: Vec<HostCommand>,
    pub recovery: Vec<Vec<HostCommand>>,
    /// Dialog text shown when every step failed
    pub fatal_message: String,
}

impl RecoveryPlan {
    /// Open (or un-hide) an auxiliary window, falling back to the main window
    pub fn open_auxiliary(role: &WindowRole, context: Option<&str>) -> CoreResult<Self> {
        let context = context.map(str::to_string);
        let primary = match role {
            WindowRole::Dashboard => HostCommand::OpenDashboard(context),
            WindowRole::Mini => HostCommand::OpenMiniWindow(context),
            WindowRole::Popup(_) => HostCommand::CreatePopupWindow {
                label: role.label(),
                title: role.title(),
                url: role.popup_url().unwrap_or_default(),
            },
            WindowRole::Main => {
                return Err(CoreError::ValidationError(
                    "main is not an auxiliary window".to_string(),
                ))
            }
        };
        Ok(Self {
            operation: format!("open_auxiliary({role})"),
            primary: vec![primary],
            recovery: vec![vec![HostCommand::ShowMainWindow]],
            fatal_message: format!("Could not open the {role} window or return to the main window."),
        })
    }

    /// Hide an auxiliary window and bring back the main window
    pub fn close_auxiliary(role: &WindowRole) -> CoreResult<Self> {
        let hide = match role {
            WindowRole::Dashboard => HostCommand::CloseDashboard,
            WindowRole::Mini => HostCommand::CloseMiniWindow,
            WindowRole::Popup(_) => return Ok(Self::close_popup(&role.label())),
            WindowRole::Main => {
                return Err(CoreError::ValidationError(
                    "main is not an auxiliary window".to_string(),
                ))
            }
        };
        Ok(Self {
            operation: format!("close_auxiliary({role})"),
            primary: vec![hide, HostCommand::ShowMainWindow],
            recovery: vec![
                vec![HostCommand::ShowMainWindow],
                vec![HostCommand::CreateMainWindow],
            ],
            fatal_message: "The main window could not be restored. Please restart the application."
                .to_string(),
        })
    }

    /// Close a popup and show the main window
    #[must_use]
    pub fn close_popup(label: &str) -> Self {
        Self {
            operation: format!("close_popup({label})"),
            primary: vec![
                HostCommand::ShowMainWindow,
                HostCommand::CloseCurrentWindow(label.to_string()),
            ],
            recovery: vec![vec![
                HostCommand::CloseWindowByLabel(label.to_string()),
                HostCommand::CreateMainWindow,
            ]],
            fatal_message: "Failed to return to the main window. Please restart the application."
                .to_string(),
        }
    }

    /// Primary step followed by the recovery steps
    pub fn steps(&self) -> impl Iterator<Item = &[HostCommand]> {
        std::iter::once(self.primary.as_slice()).chain(self.recovery.iter().map(Vec::as_slice))
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        1 + self.recovery.len()
    }
}

/// How a window operation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WindowOutcome {
    /// Primary step succeeded
    Completed,
    /// Recovery step `step` (1-based) succeeded
    Recovered { step: usize },
}

/// Sequences host window requests and records the last commanded state of
/// every window
pub struct WindowCoordinator {
    host: Arc<dyn WindowHost>,
    windows: RwLock<HashMap<WindowRole, WindowHandle>>,
    hide_main_on_open: bool,
}

impl WindowCoordinator {
    /// Create a coordinator; the main window starts out visible
    #[must_use]
    pub fn new(host: Arc<dyn WindowHost>, hide_main_on_open: bool) -> Self {
        let mut windows = HashMap::new();
        windows.insert(
            WindowRole::Main,
            WindowHandle::new(WindowRole::Main, WindowVisibility::Visible),
        );
        Self {
            host,
            windows: RwLock::new(windows),
            hide_main_on_open,
        }
    }

    #[must_use]
    pub fn from_config(host: Arc<dyn WindowHost>, config: &UiConfig) -> Self {
        Self::new(host, config.hide_main_on_open)
    }

    /// Open or un-hide an auxiliary window
    ///
    /// When the host rejects the request the main window is shown instead;
    /// the returned handle then still reports the auxiliary window's last
    /// known state.
    pub async fn open_auxiliary(
        &self,
        role: WindowRole,
        context: Option<&str>,
    ) -> CoreResult<WindowHandle> {
        let plan = RecoveryPlan::open_auxiliary(&role, context)?;
        log::info!("Opening {role} window (context: {context:?})");
        let outcome = self.run(&plan).await?;
        if let WindowOutcome::Recovered { .. } = outcome {
            log::warn!("{role} window could not be opened, main window shown instead");
        }
        Ok(self.handle(&role).await)
    }

    /// Hide an auxiliary window and return to the main window
    pub async fn close_auxiliary(&self, role: &WindowRole) -> CoreResult<WindowOutcome> {
        let plan = RecoveryPlan::close_auxiliary(role)?;
        log::info!("Closing {role} window");
        self.run(&plan).await
    }

    /// Close a popup and show the main window (already visible counts as
    /// success)
    pub async fn close_popup(&self, label: &str) -> CoreResult<WindowOutcome> {
        log::info!("Closing popup window: {label}");
        self.run(&RecoveryPlan::close_popup(label)).await
    }

    /// Terminate the application
    pub async fn quit(&self) -> CoreResult<()> {
        log::info!("Quitting application");
        self.host.exit_app().await
    }

    /// Record a window the host reports as destroyed
    pub async fn mark_closed(&self, label: &str) {
        if let Some(role) = WindowRole::from_label(label) {
            self.record(role, WindowVisibility::Closed).await;
        }
    }

    /// Last commanded state of `role` (`Closed` when never opened)
    pub async fn handle(&self, role: &WindowRole) -> WindowHandle {
        self.windows
            .read()
            .await
            .get(role)
            .cloned()
            .unwrap_or_else(|| WindowHandle::new(role.clone(), WindowVisibility::Closed))
    }

    /// Every window the coordinator has a record of, sorted by label
    pub async fn handles(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<WindowHandle> = self.windows.read().await.values().cloned().collect();
        handles.sort_by(|a, b| a.label.cmp(&b.label));
        handles
    }

    #[must_use]
    pub fn host(&self) -> &Arc<dyn WindowHost> {
        &self.host
    }

    async fn record(&self, role: WindowRole, visibility: WindowVisibility) {
        self.windows
            .write()
            .await
            .insert(role.clone(), WindowHandle::new(role, visibility));
    }

    async fn run_step(&self, step: &[HostCommand]) -> CoreResult<()> {
        for command in step {
            command.execute(self.host.as_ref()).await?;
            if let Some((role, visibility)) = command.effect() {
                self.record(role, visibility).await;
            }
            if command.opens_auxiliary() && self.hide_main_on_open {
                self.record(WindowRole::Main, WindowVisibility::Hidden).await;
            }
        }
        Ok(())
    }

    async fn run(&self, plan: &RecoveryPlan) -> CoreResult<WindowOutcome> {
        for (index, step) in plan.steps().enumerate() {
            match self.run_step(step).await {
                Ok(()) if index == 0 => return Ok(WindowOutcome::Completed),
                Ok(()) => {
                    log::info!("{} recovered at step {index}", plan.operation);
                    return Ok(WindowOutcome::Recovered { step: index });
                }
                Err(e) => {
                    let names: Vec<&str> = step.iter().map(HostCommand::name).collect();
                    log::warn!("{} step {index} ({}) failed: {e}", plan.operation, names.join(" + "));
                }
            }
        }

        log::error!("{} failed after {} attempts", plan.operation, plan.attempts());
        self.host.notify_fatal(&plan.fatal_message).await;
        Err(CoreError::WindowRecoveryExhausted {
            operation: plan.operation.clone(),
            attempts: plan.attempts(),
        })
    }
}
