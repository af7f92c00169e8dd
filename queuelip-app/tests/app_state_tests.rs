#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppStateBuilder` and `AppState` coordination.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use queuelip_app::{load_ui_config, AppState, AppStateBuilder, UiEventSink};
use queuelip_core::error::{CoreError, CoreResult};
use queuelip_core::services::DashboardPanel;
use queuelip_core::traits::WindowHost;
use queuelip_core::types::{
    Action, FocusPolicyConfig, UiConfig, ViewId, ViewSnapshot, WindowRole, WindowVisibility,
};
use tokio::sync::RwLock;

// ===== Mock Implementations =====

/// Windowing host that records commands and fails the ones it is told to.
struct RecordingHost {
    calls: RwLock<Vec<String>>,
    failing: RwLock<HashSet<String>>,
    fatal: RwLock<Vec<String>>,
    messages: RwLock<Vec<String>>,
}

impl RecordingHost {
    fn new() -> Self {
        Self {
            calls: RwLock::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            fatal: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Make the named command fail.
    fn failing_on(self, command: &str) -> Self {
        self.failing
            .try_write()
            .unwrap()
            .insert(command.to_string());
        self
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, command: String) -> CoreResult<()> {
        let name = command
            .split('(')
            .next()
            .unwrap_or_default()
            .to_string();
        self.calls.write().await.push(command);
        if self.failing.read().await.contains(&name) {
            return Err(CoreError::HostCommandFailed {
                command: name,
                message: "window not found".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WindowHost for RecordingHost {
    async fn open_dashboard(&self, context: Option<&str>) -> CoreResult<()> {
        self.record(format!("open_dashboard({})", context.unwrap_or("")))
            .await
    }

    async fn open_mini_window(&self, _context: Option<&str>) -> CoreResult<()> {
        self.record("open_mini_window".to_string()).await
    }

    async fn close_dashboard(&self) -> CoreResult<()> {
        self.record("close_dashboard".to_string()).await
    }

    async fn close_mini_window(&self) -> CoreResult<()> {
        self.record("close_mini_window".to_string()).await
    }

    async fn show_main_window(&self) -> CoreResult<()> {
        self.record("show_main_window".to_string()).await
    }

    async fn create_main_window(&self) -> CoreResult<()> {
        self.record("create_main_window".to_string()).await
    }

    async fn create_popup_window(&self, label: &str, _title: &str, url: &str) -> CoreResult<()> {
        self.record(format!("create_popup_window({label},{url})"))
            .await
    }

    async fn close_current_window(&self, label: &str) -> CoreResult<()> {
        self.record(format!("close_current_window({label})")).await
    }

    async fn close_window_by_label(&self, label: &str) -> CoreResult<()> {
        self.record(format!("close_window_by_label({label})")).await
    }

    async fn notify_fatal(&self, message: &str) {
        self.fatal.write().await.push(message.to_string());
    }

    async fn show_message(&self, message: &str) {
        self.messages.write().await.push(message.to_string());
    }

    async fn exit_app(&self) -> CoreResult<()> {
        self.record("exit_app".to_string()).await
    }
}

/// Event sink that keeps every pushed update.
#[derive(Default)]
struct CollectingSink {
    views: RwLock<Vec<ViewSnapshot>>,
    panels: RwLock<Vec<DashboardPanel>>,
}

#[async_trait]
impl UiEventSink for CollectingSink {
    async fn view_updated(&self, snapshot: &ViewSnapshot) {
        self.views.write().await.push(snapshot.clone());
    }

    async fn dashboard_updated(&self, panel: DashboardPanel, _html: &str) {
        self.panels.write().await.push(panel);
    }
}

fn fast_config() -> UiConfig {
    UiConfig {
        focus_delay_ms: 5,
        enter_animation_ms: 5,
        close_settle_ms: 0,
        ..UiConfig::default()
    }
}

fn build(host: &Arc<RecordingHost>, config: UiConfig) -> AppState {
    AppStateBuilder::new()
        .window_host(host.clone())
        .config(config)
        .build()
        .expect("build should succeed")
}

// ===== Builder =====

#[tokio::test]
async fn builder_without_host_fails() {
    let result = AppStateBuilder::new().build();
    assert!(matches!(result, Err(CoreError::ValidationError(_))));
}

#[tokio::test]
async fn builder_rejects_invalid_focus_selector() {
    let host = Arc::new(RecordingHost::new());
    let config = UiConfig {
        focus_policy: FocusPolicyConfig::Static {
            selectors: [("a".to_string(), "#a > b".to_string())]
                .into_iter()
                .collect(),
        },
        ..UiConfig::default()
    };
    let result = AppStateBuilder::new()
        .window_host(host)
        .config(config)
        .build();
    assert!(matches!(result, Err(CoreError::InvalidSelector(_))));
}

#[tokio::test]
async fn starts_on_main_with_main_window_visible() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, UiConfig::default());

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.views.active, ViewId::main());
    assert_eq!(snapshot.windows.len(), 1);
    assert_eq!(snapshot.windows[0].label, "main");
    assert_eq!(snapshot.windows[0].visibility, WindowVisibility::Visible);
    assert!(host.calls().await.is_empty());
}

#[test]
fn stored_config_falls_back_to_defaults() {
    assert_eq!(load_ui_config(None), UiConfig::default());
    assert_eq!(
        load_ui_config(Some(serde_json::json!({ "focusDelayMs": "soon" }))),
        UiConfig::default()
    );
    assert_eq!(
        load_ui_config(Some(serde_json::json!({ "focusDelayMs": 0 }))).focus_delay_ms,
        0
    );
}

// ===== View switching =====

#[tokio::test]
async fn rapid_switch_focuses_the_latest_view() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, UiConfig::default());

    state.switch_view(&ViewId::from("a")).await.unwrap();
    state.switch_view(&ViewId::from("b")).await.unwrap();
    state.wait_for_scheduled().await;

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.views.active, ViewId::from("b"));
    assert_eq!(snapshot.views.focused.as_deref(), Some("#popButtonB"));
    let switcher = state.switcher.lock().await;
    let doc = switcher.document();
    let focused = doc.focused().unwrap();
    let view_a = doc.element_by_id("view-a").unwrap();
    assert!(!doc.is_within(focused, view_a));
}

#[tokio::test]
async fn unregistered_view_keeps_previous_state() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state.switch_view(&ViewId::from("c")).await.unwrap();
    state.wait_for_scheduled().await;
    let before = state.snapshot().await.views;

    let err = state.switch_view(&ViewId::from("zzz")).await.unwrap_err();
    assert!(matches!(err, CoreError::ViewNotFound(_)));
    assert_eq!(state.snapshot().await.views, before);
}

#[tokio::test]
async fn timers_push_updates_to_the_sink() {
    let host = Arc::new(RecordingHost::new());
    let sink = Arc::new(CollectingSink::default());
    let state = AppStateBuilder::new()
        .window_host(host.clone())
        .config(fast_config())
        .event_sink(sink.clone())
        .build()
        .unwrap();

    state.show_view("a").await.unwrap();
    state.wait_for_scheduled().await;

    let views = sink.views.read().await;
    assert!(!views.is_empty());
    let last = views.last().unwrap();
    assert_eq!(last.active, ViewId::from("a"));
    assert!(views
        .iter()
        .any(|s| s.focused.as_deref() == Some("#popButtonA")));
}

#[tokio::test]
async fn legacy_button_click_switches_view() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());

    let snapshot = state.click("buttonC").await.unwrap();
    assert_eq!(snapshot.active, ViewId::from("c"));
    assert!(snapshot.html.contains("View C"));
    assert!(host.calls().await.is_empty());
}

// ===== Windows =====

#[tokio::test]
async fn pop_button_opens_dashboard_with_view_context() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state.switch_view(&ViewId::from("a")).await.unwrap();

    state.click("popButtonA").await.unwrap();

    assert_eq!(host.calls().await, vec!["open_dashboard(view-a)"]);
    assert_eq!(
        state.dashboard.lock().await.panel(),
        DashboardPanel::ClipboardMonitor
    );
    let windows = state.snapshot().await.windows;
    let main = windows.iter().find(|w| w.label == "main").unwrap();
    let dashboard = windows.iter().find(|w| w.label == "dashboard").unwrap();
    assert_eq!(main.visibility, WindowVisibility::Hidden);
    assert_eq!(dashboard.visibility, WindowVisibility::Visible);
}

#[tokio::test]
async fn dashboard_open_failure_falls_back_to_main() {
    let host = Arc::new(RecordingHost::new().failing_on("open_dashboard"));
    let state = build(&host, fast_config());

    let handle = state
        .open_auxiliary(WindowRole::Dashboard, Some("view-b"))
        .await
        .unwrap();

    assert_eq!(handle.visibility, WindowVisibility::Closed);
    assert_eq!(
        host.calls().await,
        vec!["open_dashboard(view-b)", "show_main_window"]
    );
    assert!(host.fatal.read().await.is_empty());
}

#[tokio::test]
async fn dashboard_open_and_show_main_failure_is_fatal_without_retry() {
    let host = Arc::new(
        RecordingHost::new()
            .failing_on("open_dashboard")
            .failing_on("show_main_window"),
    );
    let state = build(&host, fast_config());

    let err = state
        .dispatch(Action::OpenAuxiliary {
            role: WindowRole::Dashboard,
            context: Some("view-a".to_string()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::WindowRecoveryExhausted { .. }));
    assert_eq!(host.fatal.read().await.len(), 1);
    assert_eq!(host.calls().await.len(), 2);
}

#[tokio::test]
async fn closing_mini_shows_main() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state.open_auxiliary(WindowRole::Mini, None).await.unwrap();

    state
        .dispatch(Action::CloseAuxiliary(WindowRole::Mini))
        .await
        .unwrap();

    let windows = state.snapshot().await.windows;
    let visibility = |label: &str| {
        windows
            .iter()
            .find(|w| w.label == label)
            .map(|w| w.visibility)
    };
    assert_eq!(visibility("main"), Some(WindowVisibility::Visible));
    assert_eq!(visibility("mini"), Some(WindowVisibility::Hidden));
}

#[tokio::test]
async fn dashboard_close_button_returns_to_main() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state
        .open_auxiliary(WindowRole::Dashboard, None)
        .await
        .unwrap();

    state.click_dashboard("closeButton").await.unwrap();

    assert_eq!(
        host.calls().await,
        vec!["open_dashboard()", "close_dashboard", "show_main_window"]
    );
}

#[tokio::test]
async fn escape_closes_dashboard_and_mini() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state
        .open_auxiliary(WindowRole::Dashboard, None)
        .await
        .unwrap();
    state.key_pressed(&WindowRole::Dashboard, "Enter").await.unwrap();
    state
        .key_pressed(&WindowRole::Dashboard, "Escape")
        .await
        .unwrap();

    state.open_auxiliary(WindowRole::Mini, None).await.unwrap();
    state.key_pressed(&WindowRole::Mini, "Escape").await.unwrap();

    assert_eq!(
        host.calls().await,
        vec![
            "open_dashboard()",
            "close_dashboard",
            "show_main_window",
            "open_mini_window",
            "close_mini_window",
            "show_main_window",
        ]
    );
}

#[tokio::test]
async fn escape_in_main_window_does_nothing() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());
    state.key_pressed(&WindowRole::Main, "Escape").await.unwrap();
    assert!(host.calls().await.is_empty());
}

#[tokio::test]
async fn popup_round_trip_recovers_by_label() {
    let host = Arc::new(RecordingHost::new().failing_on("close_current_window"));
    let state = build(&host, fast_config());
    state
        .open_auxiliary(WindowRole::Popup("A".to_string()), None)
        .await
        .unwrap();

    state
        .dispatch(Action::ClosePopup("popupA".to_string()))
        .await
        .unwrap();

    assert_eq!(
        host.calls().await,
        vec![
            "create_popup_window(popupA,popupA.html)",
            "show_main_window",
            "close_current_window(popupA)",
            "close_window_by_label(popupA)",
            "create_main_window",
        ]
    );
}

#[tokio::test]
async fn dashboard_context_event_selects_panel() {
    let host = Arc::new(RecordingHost::new());
    let sink = Arc::new(CollectingSink::default());
    let state = AppStateBuilder::new()
        .window_host(host)
        .event_sink(sink.clone())
        .build()
        .unwrap();

    assert_eq!(
        state.load_dashboard_context("view-b").await.unwrap(),
        DashboardPanel::Clock
    );
    assert!(state.dashboard_html().await.contains("current-time"));
    state.load_dashboard_context("something-else").await.unwrap();
    assert_eq!(
        *sink.panels.read().await,
        vec![DashboardPanel::Clock, DashboardPanel::Placeholder]
    );
}

#[tokio::test]
async fn messages_and_quit_reach_the_host() {
    let host = Arc::new(RecordingHost::new());
    let state = build(&host, fast_config());

    state
        .dispatch(Action::ShowMessage("View A popup!".to_string()))
        .await
        .unwrap();
    state.quit().await.unwrap();

    assert_eq!(*host.messages.read().await, vec!["View A popup!"]);
    assert_eq!(host.calls().await, vec!["exit_app"]);
}
