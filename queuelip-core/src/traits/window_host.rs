//! Windowing host abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;

/// Windowing host capability
///
/// The host owns the real windows; every call is a request that may fail
/// because the target window is missing or already destroyed.
///
/// Platform implementation:
/// - Tauri: `TauriWindowHost` (`WebviewWindowBuilder` + dialog plugin)
/// - No host: `NoopWindowHost`
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Create or un-hide the dashboard window, optionally delivering a context tag
    async fn open_dashboard(&self, context: Option<&str>) -> CoreResult<()>;

    /// Create or un-hide the mini window
    async fn open_mini_window(&self, context: Option<&str>) -> CoreResult<()>;

    /// Hide the dashboard window
    async fn close_dashboard(&self) -> CoreResult<()>;

    /// Hide the mini window
    async fn close_mini_window(&self) -> CoreResult<()>;

    /// Show, un-minimize and focus the main window; already visible is success
    async fn show_main_window(&self) -> CoreResult<()>;

    /// Recreate the main window (shows it instead if it still exists)
    async fn create_main_window(&self) -> CoreResult<()>;

    /// Create a popup window
    ///
    /// # Arguments
    /// * `label` - Host label (`popupA`)
    /// * `title` - Window title
    /// * `url` - Page to load (`popupA.html`)
    async fn create_popup_window(&self, label: &str, title: &str, url: &str) -> CoreResult<()>;

    /// Close the window issuing the request (goes through close-requested handling)
    async fn close_current_window(&self, label: &str) -> CoreResult<()>;

    /// Close a window by label without close-requested handling
    async fn close_window_by_label(&self, label: &str) -> CoreResult<()>;

    /// Blocking, user-visible error. Used once recovery is exhausted.
    async fn notify_fatal(&self, message: &str);

    /// Non-fatal message dialog
    async fn show_message(&self, message: &str);

    /// Terminate the application
    async fn exit_app(&self) -> CoreResult<()>;
}

/// Host stand-in for environments without a windowing host
///
/// Every command succeeds without effect; dialogs go to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWindowHost;

#[async_trait]
impl WindowHost for NoopWindowHost {
    async fn open_dashboard(&self, _context: Option<&str>) -> CoreResult<()> {
        Ok(())
    }

    async fn open_mini_window(&self, _context: Option<&str>) -> CoreResult<()> {
        Ok(())
    }

    async fn close_dashboard(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn close_mini_window(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn show_main_window(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn create_main_window(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn create_popup_window(&self, _label: &str, _title: &str, _url: &str) -> CoreResult<()> {
        Ok(())
    }

    async fn close_current_window(&self, _label: &str) -> CoreResult<()> {
        Ok(())
    }

    async fn close_window_by_label(&self, _label: &str) -> CoreResult<()> {
        Ok(())
    }

    async fn notify_fatal(&self, message: &str) {
        log::error!("{message}");
    }

    async fn show_message(&self, message: &str) {
        log::info!("{message}");
    }

    async fn exit_app(&self) -> CoreResult<()> {
        Ok(())
    }
}
