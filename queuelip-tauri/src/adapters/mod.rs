//! 平台适配器模块

mod event_sink;
mod window_host;

pub use event_sink::TauriUiEventSink;
pub use window_host::TauriWindowHost;
