//! 类型定义模块

mod action;
mod config;
mod dom;
mod selector;
mod template;
mod view;
mod window;

pub use action::{Action, CLOSE_KEY};
pub use config::{FocusPolicyConfig, UiConfig, WindowGeometry, WindowSize};
pub use dom::{
    ComputedStyle, Display, Document, Element, ElementId, LayoutBox, ListenerId, Visibility,
};
pub use selector::Selector;
pub use template::{accordion, accordion_group, escape, Node};
pub use view::{
    ViewContent, ViewId, ViewSnapshot, ViewStatus, ACTIVE_CLASS, DATA_VIEW_ATTR, ENTERING_CLASS,
    NAV_TABS_CLASS, NAV_TAB_CLASS, VIEW_CLASS,
};
pub use window::{popup_type_from_path, WindowHandle, WindowRole, WindowVisibility};
