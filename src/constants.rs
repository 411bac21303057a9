//! Shared crate-wide constants.
//!
//! The window core works in abstract units. These are the defaults for a
//! pixel host; the terminal preset in `WindowMetrics::terminal` scales them
//! down to cells.

/// Height of the title region measured from the top of the window.
///
/// `reposition` keeps `y + TITLE_HEIGHT` inside the bounding root so the
/// title bar can always be grabbed again.
pub const TITLE_HEIGHT: i32 = 30;

/// Thickness of the frame around the content area. Pointer presses that
/// land here hit the frame itself rather than a child control.
pub const FRAME_BORDER: i32 = 4;

/// Distance from any window edge within which hovering the frame arms a
/// resize on that edge.
pub const RESIZE_EDGE_ZONE: i32 = 20;

/// Distance from the top of the bounding root at which a title drag
/// snaps the window to maximized.
pub const TOP_SNAP_ZONE: i32 = 5;

/// A window may hang off the left edge by at most `width - MIN_VISIBLE_LEFT`.
pub const MIN_VISIBLE_LEFT: i32 = 50;

/// At least this much of the window stays inside the right edge.
pub const MIN_VISIBLE_RIGHT: i32 = 30;

/// Pointer travel required before dragging a maximized window's title
/// starts to restore it.
pub const MAXIMIZED_DRAG_THRESHOLD: u32 = 10;

/// Resize never shrinks a window below these dimensions.
pub const MIN_WINDOW_WIDTH: i32 = 50;
pub const MIN_WINDOW_HEIGHT: i32 = 30;

/// Width of each title-bar button (close, maximize).
pub const TITLE_BUTTON_WIDTH: i32 = 20;

/// Two presses on the same title bar within this window toggle maximize.
pub const DOUBLE_CLICK_MS: u64 = 500;

/// Lines kept by the in-memory log buffer unless configured otherwise.
pub const DEFAULT_LOG_LINES: usize = 2000;
