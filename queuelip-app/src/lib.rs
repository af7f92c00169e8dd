//! Platform-agnostic application state for Queuelip.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (host injection),
//! and `UiEventSink` (platform-specific push of state changes to the webview).

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use queuelip_core::error::{CoreError, CoreResult};
use queuelip_core::services::{
    DashboardPanel, DashboardView, ScheduledTask, ServiceContext, Transition, ViewSwitcher,
    WindowCoordinator, WindowOutcome,
};
use queuelip_core::traits::WindowHost;
use queuelip_core::types::{Action, UiConfig, ViewId, ViewSnapshot, WindowHandle, WindowRole};

/// Platform-specific sink for state changes that happen outside a command.
///
/// Frontends implement this to push updates to the webview (e.g. after a
/// focus timer fired). Use `NoopUiEventSink` when nothing listens.
#[async_trait::async_trait]
pub trait UiEventSink: Send + Sync {
    /// Called after a scheduled task changed the main window's views.
    async fn view_updated(&self, _snapshot: &ViewSnapshot) {}

    /// Called after the dashboard switched panels.
    async fn dashboard_updated(&self, _panel: DashboardPanel, _html: &str) {}
}

/// No-op sink for frontends that poll instead.
pub struct NoopUiEventSink;

#[async_trait::async_trait]
impl UiEventSink for NoopUiEventSink {}

/// Views and windows as reported to the webview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub views: ViewSnapshot,
    pub windows: Vec<WindowHandle>,
}

/// Parse the stored UI configuration, falling back to defaults.
#[must_use]
pub fn load_ui_config(raw: Option<serde_json::Value>) -> UiConfig {
    match raw {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Invalid UI configuration, using defaults: {e}");
            UiConfig::default()
        }),
        None => UiConfig::default(),
    }
}

/// Platform-agnostic application state.
///
/// Holds the main window's view switcher, the dashboard document and the
/// window coordinator. Every frontend constructs this once at startup via
/// `AppStateBuilder`.
pub struct AppState {
    /// Service context (host + config)
    pub ctx: Arc<ServiceContext>,
    /// Window lifecycle coordinator
    pub coordinator: Arc<WindowCoordinator>,
    /// View switcher of the main window
    pub switcher: Arc<Mutex<ViewSwitcher>>,
    /// Dashboard window content
    pub dashboard: Arc<Mutex<DashboardView>>,
    events: Arc<dyn UiEventSink>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &UiConfig {
        &self.ctx.config
    }

    /// Switch the main window to `view`.
    pub async fn switch_view(&self, view: &ViewId) -> CoreResult<ViewSnapshot> {
        let (transition, snapshot) = {
            let mut switcher = self.switcher.lock().await;
            let transition = switcher.switch_view(view)?;
            (transition, switcher.snapshot())
        };
        self.schedule(transition).await;
        Ok(snapshot)
    }

    /// Switch through the navigation tab bound to `name`.
    pub async fn show_view(&self, name: &str) -> CoreResult<ViewSnapshot> {
        let (outcome, snapshot) = {
            let mut switcher = self.switcher.lock().await;
            let outcome = switcher.show_view(name)?;
            (outcome, switcher.snapshot())
        };
        for transition in outcome.transitions {
            self.schedule(transition).await;
        }
        for action in outcome.actions {
            self.dispatch(action).await?;
        }
        Ok(snapshot)
    }

    /// Click an element of the main window.
    ///
    /// View switches run first; window and message actions afterwards,
    /// without holding the switcher.
    pub async fn click(&self, element_id: &str) -> CoreResult<ViewSnapshot> {
        let outcome = self.switcher.lock().await.click_by_id(element_id)?;
        for transition in outcome.transitions {
            self.schedule(transition).await;
        }
        for action in outcome.actions {
            self.dispatch(action).await?;
        }
        Ok(self.switcher.lock().await.snapshot())
    }

    /// Click an element of the dashboard window.
    pub async fn click_dashboard(&self, element_id: &str) -> CoreResult<()> {
        let actions = self.dashboard.lock().await.click_by_id(element_id)?;
        for action in actions {
            self.dispatch(action).await?;
        }
        Ok(())
    }

    /// Key pressed in an auxiliary window; unbound keys do nothing.
    pub async fn key_pressed(&self, role: &WindowRole, key: &str) -> CoreResult<()> {
        let actions = match role {
            WindowRole::Dashboard => self.dashboard.lock().await.key(key),
            _ => Action::for_key(role, key).into_iter().collect(),
        };
        for action in actions {
            self.dispatch(action).await?;
        }
        Ok(())
    }

    /// Carry out a listener action.
    pub async fn dispatch(&self, action: Action) -> CoreResult<()> {
        log::debug!("Dispatching action: {action:?}");
        match action {
            Action::SwitchView(view) => self.switch_view(&view).await.map(|_| ()),
            Action::OpenAuxiliary { role, context } => self
                .open_auxiliary(role, context.as_deref())
                .await
                .map(|_| ()),
            Action::CloseAuxiliary(role) => self.close_auxiliary(&role).await.map(|_| ()),
            Action::ClosePopup(label) => self.close_popup(&label).await.map(|_| ()),
            Action::ShowMessage(message) => {
                self.ctx.host.show_message(&message).await;
                Ok(())
            }
        }
    }

    /// Open an auxiliary window; an opened dashboard gets the context panel.
    pub async fn open_auxiliary(
        &self,
        role: WindowRole,
        context: Option<&str>,
    ) -> CoreResult<WindowHandle> {
        let handle = self.coordinator.open_auxiliary(role.clone(), context).await?;
        if role == WindowRole::Dashboard {
            if let Some(payload) = context {
                self.load_dashboard_context(payload).await?;
            }
        }
        Ok(handle)
    }

    /// Close an auxiliary window once its closing animation settled.
    pub async fn close_auxiliary(&self, role: &WindowRole) -> CoreResult<WindowOutcome> {
        let settle = self.config().close_settle();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        self.coordinator.close_auxiliary(role).await
    }

    pub async fn close_popup(&self, label: &str) -> CoreResult<WindowOutcome> {
        self.coordinator.close_popup(label).await
    }

    pub async fn quit(&self) -> CoreResult<()> {
        self.coordinator.quit().await
    }

    /// Apply a `dashboard-context` payload.
    pub async fn load_dashboard_context(&self, payload: &str) -> CoreResult<DashboardPanel> {
        let (panel, html) = {
            let mut dashboard = self.dashboard.lock().await;
            let panel = dashboard.load_context(payload)?;
            (panel, dashboard.content_html())
        };
        self.events.dashboard_updated(panel, &html).await;
        Ok(panel)
    }

    pub async fn dashboard_html(&self) -> String {
        self.dashboard.lock().await.content_html()
    }

    pub async fn snapshot(&self) -> AppSnapshot {
        let views = self.switcher.lock().await.snapshot();
        AppSnapshot {
            views,
            windows: self.coordinator.handles().await,
        }
    }

    /// Wait for every task scheduled so far.
    pub async fn wait_for_scheduled(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.pending.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("Scheduled view task failed: {e}");
            }
        }
    }

    async fn schedule(&self, transition: Transition) {
        let mut pending = self.pending.lock().await;
        pending.retain(|handle| !handle.is_finished());
        for task in transition.scheduled {
            pending.push(self.spawn_task(task));
        }
    }

    fn spawn_task(&self, task: ScheduledTask) -> JoinHandle<()> {
        let switcher = Arc::clone(&self.switcher);
        let events = Arc::clone(&self.events);
        tokio::spawn(async move {
            let delay = task.delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let snapshot = {
                let mut switcher = switcher.lock().await;
                switcher.fire(&task).then(|| switcher.snapshot())
            };
            if let Some(snapshot) = snapshot {
                events.view_updated(&snapshot).await;
            }
        })
    }
}

/// Builder for constructing `AppState` with a platform-specific host.
///
/// # Required
/// - `window_host`: the windowing host
///
/// # Optional
/// - `config`: defaults to `UiConfig::default()`
/// - `event_sink`: defaults to `NoopUiEventSink`
pub struct AppStateBuilder {
    window_host: Option<Arc<dyn WindowHost>>,
    config: Option<UiConfig>,
    event_sink: Option<Arc<dyn UiEventSink>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_host: None,
            config: None,
            event_sink: None,
        }
    }

    #[must_use]
    pub fn window_host(mut self, host: Arc<dyn WindowHost>) -> Self {
        self.window_host = Some(host);
        self
    }

    #[must_use]
    pub fn config(mut self, config: UiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn UiEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if the host is missing, or
    /// `CoreError::InvalidSelector` for a bad static focus selector.
    pub fn build(self) -> CoreResult<AppState> {
        let host = self
            .window_host
            .ok_or_else(|| CoreError::ValidationError("window_host is required".to_string()))?;
        let config = self.config.unwrap_or_default();
        let events = self
            .event_sink
            .unwrap_or_else(|| Arc::new(NoopUiEventSink));

        let ctx = Arc::new(ServiceContext::new(host, config));
        let switcher = ctx.main_view_switcher()?;
        let coordinator = Arc::new(ctx.window_coordinator());

        log::debug!(
            "App state built (focus delay {:?}, enter animation {:?})",
            ctx.config.focus_delay(),
            ctx.config.enter_animation()
        );

        Ok(AppState {
            ctx,
            coordinator,
            switcher: Arc::new(Mutex::new(switcher)),
            dashboard: Arc::new(Mutex::new(DashboardView::new())),
            events,
            pending: Mutex::new(Vec::new()),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
