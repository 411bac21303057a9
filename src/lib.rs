//! A desktop of draggable, resizable, stackable windows hosted in a terminal.
//!
//! The window core ([`drag`], [`window`], [`geometry`]) is independent of the
//! terminal: it works in integer units scaled by [`window::WindowMetrics`].
//! [`app::Desktop`] binds it to crossterm input and ratatui rendering along
//! with the collaborators in [`desktop`].

pub mod app;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod drag;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod keybindings;
pub mod log_buffer;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use app::Desktop;
pub use config::{Cli, DesktopConfig};
pub use error::{FetchError, WmError};
