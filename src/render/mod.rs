pub mod app_view;
pub mod context;
pub mod layout;

pub use context::RenderContext;
pub use layout::{app_layout, AppLayout};
