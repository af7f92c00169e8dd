//! UI configuration

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_focus_delay_ms() -> u64 {
    100
}

fn default_enter_animation_ms() -> u64 {
    300
}

fn default_close_settle_ms() -> u64 {
    200
}

fn default_hide_main_on_open() -> bool {
    true
}

/// How the focus target of a view is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FocusPolicyConfig {
    /// First visible focusable element outside the tab region
    #[default]
    Dynamic,
    /// Fixed `view id -> selector` table
    Static { selectors: BTreeMap<String, String> },
}

/// Size of a host window in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Window geometry used by the host adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    #[serde(default = "WindowGeometry::default_title")]
    pub main_title: String,
    #[serde(default = "WindowGeometry::default_main")]
    pub main: WindowSize,
    #[serde(default = "WindowGeometry::default_popup")]
    pub popup: WindowSize,
    #[serde(default = "WindowGeometry::default_dashboard")]
    pub dashboard: WindowSize,
    #[serde(default = "WindowGeometry::default_mini")]
    pub mini: WindowSize,
}

impl WindowGeometry {
    fn default_title() -> String {
        "Queuelip".to_string()
    }

    fn default_main() -> WindowSize {
        WindowSize::new(800.0, 600.0)
    }

    fn default_popup() -> WindowSize {
        WindowSize::new(300.0, 400.0)
    }

    fn default_dashboard() -> WindowSize {
        WindowSize::new(420.0, 560.0)
    }

    fn default_mini() -> WindowSize {
        WindowSize::new(320.0, 240.0)
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            main_title: Self::default_title(),
            main: Self::default_main(),
            popup: Self::default_popup(),
            dashboard: Self::default_dashboard(),
            mini: Self::default_mini(),
        }
    }
}

/// UI configuration (every field optional in the stored JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Delay before focusing a newly activated view
    #[serde(default = "default_focus_delay_ms")]
    pub focus_delay_ms: u64,
    /// Lifetime of the `fade-in` class
    #[serde(default = "default_enter_animation_ms")]
    pub enter_animation_ms: u64,
    /// Pause between an auxiliary window's closing animation and the host command
    #[serde(default = "default_close_settle_ms")]
    pub close_settle_ms: u64,
    /// Whether opening an auxiliary window hides the main window
    #[serde(default = "default_hide_main_on_open")]
    pub hide_main_on_open: bool,
    #[serde(default)]
    pub focus_policy: FocusPolicyConfig,
    #[serde(default)]
    pub windows: WindowGeometry,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            focus_delay_ms: default_focus_delay_ms(),
            enter_animation_ms: default_enter_animation_ms(),
            close_settle_ms: default_close_settle_ms(),
            hide_main_on_open: default_hide_main_on_open(),
            focus_policy: FocusPolicyConfig::default(),
            windows: WindowGeometry::default(),
        }
    }
}

impl UiConfig {
    #[must_use]
    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    #[must_use]
    pub fn enter_animation(&self) -> Duration {
        Duration::from_millis(self.enter_animation_ms)
    }

    #[must_use]
    pub fn close_settle(&self) -> Duration {
        Duration::from_millis(self.close_settle_ms)
    }
}
