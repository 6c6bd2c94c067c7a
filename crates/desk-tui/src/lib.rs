//! Terminal UI for the service desk monitor.
//!
//! Renders the current ticket queue, flashes the unassigned badge and keeps
//! the alert scheduler in step with the queue and the sound toggle.
//!
//! ## Hotkeys
//!
//! - `s` or `m` - Toggle sound alerts
//! - `r` - Refresh the queue now
//! - `t` - Cycle color theme
//! - `j`/`k`, arrows, `g`/`G` - Scroll
//! - `?` or `h` - Help
//! - `Esc` - Close help
//! - `q` - Quit

pub mod app;
pub mod event;
pub mod theme;
pub mod widget;

pub use app::{App, AppResult};
pub use theme::{Theme, ThemeName};
