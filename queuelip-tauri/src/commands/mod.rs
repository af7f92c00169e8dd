pub mod view;
pub mod window;
