//! Host-relative coordinates shared by the drag controller and windows.
//!
//! Window origins are signed because the clamp rules let a window hang off
//! the left edge of the bounding root. Sizes are signed too so the
//! intermediate arithmetic of a resize never has to juggle casts.

use ratatui::prelude::Rect;

use crate::error::WmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset from `from` to `self`, saturating at the `i32` range.
    pub fn delta_from(self, from: Point) -> Delta {
        Delta {
            dx: self.x.saturating_sub(from.x),
            dy: self.y.saturating_sub(from.y),
        }
    }

    /// Squared euclidean distance; the drag threshold compares squares to
    /// stay in integers. Saturates at `i64::MAX`.
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

impl Delta {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn checked_add(self, other: Delta) -> Result<Delta, WmError> {
        Ok(Delta {
            dx: self.dx.checked_add(other.dx).ok_or(WmError::GeometryOverflow)?,
            dy: self.dy.checked_add(other.dy).ok_or(WmError::GeometryOverflow)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            width: rect.width as i32,
            height: rect.height as i32,
        }
    }
}

/// Signed window rectangle in bounding-root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometry covering the whole bounding root.
    pub fn filling(root: Size) -> Self {
        Self::new(0, 0, root.width, root.height)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.width > 0
            && self.height > 0
            && point.x >= self.x
            && point.x < self.right()
            && point.y >= self.y
            && point.y < self.bottom()
    }

    pub fn translated(self, delta: Delta) -> Result<Geometry, WmError> {
        Ok(Geometry {
            x: self.x.checked_add(delta.dx).ok_or(WmError::GeometryOverflow)?,
            y: self.y.checked_add(delta.dy).ok_or(WmError::GeometryOverflow)?,
            ..self
        })
    }

    /// Portion of this geometry visible inside `root`, placed at `origin`
    /// on screen. Returns an empty rect when nothing is visible.
    pub fn visible_rect(&self, root: Size, origin: (u16, u16)) -> Rect {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.right().min(root.width);
        let bottom = self.bottom().min(root.height);
        if right <= left || bottom <= top {
            return Rect::default();
        }
        Rect {
            x: origin.0.saturating_add(left.min(u16::MAX as i32) as u16),
            y: origin.1.saturating_add(top.min(u16::MAX as i32) as u16),
            width: (right - left).min(u16::MAX as i32) as u16,
            height: (bottom - top).min(u16::MAX as i32) as u16,
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}
