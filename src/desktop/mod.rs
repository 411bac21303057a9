//! Collaborators around the window host: content loading, the menu bar, the
//! sign-on form and the clock. None of them reach into window state; they go
//! through `WindowHost`'s public operations.

pub mod blog;
pub mod clock;
pub mod content;
pub mod menu;
pub mod sign_on;

pub use blog::{BlogConfig, BlogLoader, PaneText, TreeItem};
pub use clock::Clock;
pub use content::{ContentSource, DirSource, EmbeddedSource};
pub use menu::{Menu, MenuAction, MenuBar, MenuEntry};
pub use sign_on::{SignOnForm, SignOnOutcome};
