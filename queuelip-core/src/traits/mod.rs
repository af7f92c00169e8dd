//! Host abstraction trait definition

mod window_host;

pub use window_host::{NoopWindowHost, WindowHost};
