//! Terminal rendering using ratatui.
//!
//! Each view module renders into a content area handed down from the main
//! loop; `common` carries the chrome shared by every view (header, tabs,
//! status bar, help overlay).

pub mod common;
pub mod dashboard;
pub mod history;
pub mod patients;
pub mod settings;
pub mod theme;

pub use theme::Theme;
