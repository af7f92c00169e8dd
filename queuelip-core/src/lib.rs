//! Queuelip Core Library
//!
//! Platform-independent coordination logic of the Queuelip desktop front-end:
//! - Focus resolution for newly activated views
//! - View registry and the per-window view switcher
//! - Window lifecycle coordination with fallback recovery
//!
//! The windowing host is abstracted behind the `WindowHost` trait, so the
//! same logic runs under Tauri or without any host at all.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{NoopWindowHost, WindowHost};
