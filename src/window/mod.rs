pub mod decorator;

mod host;

pub use host::{PointerDown, WindowHost, WindowKey};

use crate::constants::{
    FRAME_BORDER, MAXIMIZED_DRAG_THRESHOLD, MIN_VISIBLE_LEFT, MIN_VISIBLE_RIGHT, MIN_WINDOW_HEIGHT,
    MIN_WINDOW_WIDTH, RESIZE_EDGE_ZONE, TITLE_BUTTON_WIDTH, TITLE_HEIGHT, TOP_SNAP_ZONE,
};
use crate::drag::DragTarget;
use crate::error::WmError;
use crate::geometry::{Delta, Geometry, Point, Size};

/// Distances that shape hit testing, clamping and resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMetrics {
    pub title_height: i32,
    pub border: i32,
    pub edge_zone: i32,
    pub snap_zone: i32,
    pub min_visible_left: i32,
    pub min_visible_right: i32,
    pub maximized_drag_threshold: u32,
    pub min_width: i32,
    pub min_height: i32,
    pub button_width: i32,
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self {
            title_height: TITLE_HEIGHT,
            border: FRAME_BORDER,
            edge_zone: RESIZE_EDGE_ZONE,
            snap_zone: TOP_SNAP_ZONE,
            min_visible_left: MIN_VISIBLE_LEFT,
            min_visible_right: MIN_VISIBLE_RIGHT,
            maximized_drag_threshold: MAXIMIZED_DRAG_THRESHOLD,
            min_width: MIN_WINDOW_WIDTH,
            min_height: MIN_WINDOW_HEIGHT,
            button_width: TITLE_BUTTON_WIDTH,
        }
    }
}

impl WindowMetrics {
    /// Cell-sized metrics: a one-row border with the title on the row below.
    pub fn terminal() -> Self {
        Self {
            title_height: 2,
            border: 1,
            edge_zone: 2,
            snap_zone: 1,
            min_visible_left: 4,
            min_visible_right: 4,
            maximized_drag_threshold: 2,
            min_width: 12,
            min_height: 4,
            button_width: 3,
        }
    }

    /// Height left for content once the title bar and bottom border are taken.
    pub fn content_height(&self, height: i32) -> i32 {
        (height - self.title_height - self.border).max(0)
    }
}

/// Read-only view of the host handed to a window while it handles a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostView {
    pub root: Size,
    pub edge_maximize: bool,
    pub metrics: WindowMetrics,
}

/// Stable identifier of a visual surface owned by the host environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SurfaceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::borrow::Borrow<str> for SurfaceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declaration of a surface the host may wrap in a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub id: SurfaceId,
    pub title: String,
    pub geometry: Geometry,
    /// Size the content wants when shown, if it can be measured.
    pub natural_size: Option<Size>,
    pub visible: bool,
}

impl SurfaceSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: SurfaceId::new(id),
            title: title.into(),
            geometry,
            natural_size: None,
            visible: false,
        }
    }

    pub fn with_natural_size(mut self, size: Size) -> Self {
        self.natural_size = Some(size);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    /// Edge from per-axis signs: -1 is left/top, 1 is right/bottom.
    pub fn from_axes(horizontal: i32, vertical: i32) -> Option<Self> {
        match (horizontal.signum(), vertical.signum()) {
            (0, 0) => None,
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            (0, -1) => Some(Self::Top),
            (0, 1) => Some(Self::Bottom),
            (-1, -1) => Some(Self::TopLeft),
            (1, -1) => Some(Self::TopRight),
            (-1, 1) => Some(Self::BottomLeft),
            _ => Some(Self::BottomRight),
        }
    }

    pub fn horizontal(self) -> i32 {
        match self {
            Self::Left | Self::TopLeft | Self::BottomLeft => -1,
            Self::Right | Self::TopRight | Self::BottomRight => 1,
            Self::Top | Self::Bottom => 0,
        }
    }

    pub fn vertical(self) -> i32 {
        match self {
            Self::Top | Self::TopLeft | Self::TopRight => -1,
            Self::Bottom | Self::BottomLeft | Self::BottomRight => 1,
            Self::Left | Self::Right => 0,
        }
    }

    /// CSS-style cursor name, used as the cursor hint.
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Left => "w-resize",
            Self::Right => "e-resize",
            Self::Top => "n-resize",
            Self::Bottom => "s-resize",
            Self::TopLeft => "nw-resize",
            Self::TopRight => "ne-resize",
            Self::BottomLeft => "sw-resize",
            Self::BottomRight => "se-resize",
        }
    }
}

/// Which part of a window a point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Frame,
    TitleBar,
    Close,
    Maximize,
    Content,
}

/// What was last pushed to the visual surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub geometry: Geometry,
    pub content_height: i32,
}

#[derive(Debug, Clone, Copy)]
struct ResizeSession {
    edge: ResizeEdge,
    start: Geometry,
    total: Delta,
}

#[derive(Debug, Clone)]
pub struct Window {
    surface: SurfaceSpec,
    geometry: Geometry,
    saved: Option<Geometry>,
    maximized: bool,
    resize_edge: Option<ResizeEdge>,
    resize: Option<ResizeSession>,
    active: bool,
    visible: bool,
    z: u64,
    placement: Placement,
}

impl Window {
    pub(crate) fn new(surface: SurfaceSpec, view: &HostView) -> Self {
        let mut window = Self {
            geometry: surface.geometry,
            visible: surface.visible,
            surface,
            saved: None,
            maximized: false,
            resize_edge: None,
            resize: None,
            active: false,
            z: 0,
            placement: Placement::default(),
        };
        window.push(view);
        window
    }

    pub fn id(&self) -> &SurfaceId {
        &self.surface.id
    }

    pub fn title(&self) -> &str {
        &self.surface.title
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn saved_geometry(&self) -> Option<Geometry> {
        self.saved
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn z(&self) -> u64 {
        self.z
    }

    pub fn resize_edge(&self) -> Option<ResizeEdge> {
        self.resize_edge
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_z(&mut self, z: u64) {
        self.z = z;
    }

    /// Make the surface visible, adopting its natural size when known.
    /// Focus is the host's half of `show`.
    pub(crate) fn show(&mut self, view: &HostView) {
        if let Some(size) = self.surface.natural_size {
            self.geometry.width = size.width;
            self.geometry.height = size.height;
        }
        self.visible = true;
        self.reposition(view);
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
        self.resize_edge = None;
    }

    /// Toggle between normal and maximized.
    pub(crate) fn maximize(&mut self, view: &HostView) {
        if self.maximized {
            self.maximized = false;
            if let Some(saved) = self.saved.take() {
                self.geometry = saved;
            }
            self.reposition(view);
        } else {
            self.saved = Some(self.geometry);
            self.maximized = true;
            self.resize_edge = None;
            self.geometry = Geometry::filling(view.root);
            self.push(view);
        }
    }

    /// Clamp the window so its title bar stays reachable.
    pub fn reposition(&mut self, view: &HostView) {
        if self.maximized {
            self.geometry = Geometry::filling(view.root);
            self.push(view);
            return;
        }
        let m = &view.metrics;
        let g = &mut self.geometry;
        let lowest = view.root.height.saturating_sub(m.title_height);
        if g.y > lowest {
            g.y = lowest;
        }
        if g.y < 0 {
            g.y = 0;
        }
        let rightmost = view.root.width.saturating_sub(m.min_visible_right);
        if g.x > rightmost {
            g.x = rightmost;
        }
        if g.x.saturating_add(g.width) < m.min_visible_left {
            g.x = m.min_visible_left.saturating_sub(g.width);
        }
        self.push(view);
    }

    /// Threshold to use when a title drag starts.
    pub(crate) fn drag_threshold(&self, metrics: &WindowMetrics) -> u32 {
        if self.maximized {
            metrics.maximized_drag_threshold
        } else {
            0
        }
    }

    pub fn hit_part(&self, point: Point, metrics: &WindowMetrics) -> Option<HitPart> {
        if !self.geometry.contains(point) {
            return None;
        }
        let lx = point.x - self.geometry.x;
        let ly = point.y - self.geometry.y;
        let width = self.geometry.width;
        let b = metrics.border;
        if ly >= b && ly < metrics.title_height {
            let inner_right = width - b;
            let close_left = inner_right - metrics.button_width;
            let max_left = close_left - metrics.button_width;
            if lx >= close_left && lx < inner_right {
                return Some(HitPart::Close);
            }
            if lx >= max_left && lx < close_left {
                return Some(HitPart::Maximize);
            }
        }
        if lx < b || lx >= width - b || ly < b || ly >= self.geometry.height - b {
            return Some(HitPart::Frame);
        }
        if ly < metrics.title_height {
            return Some(HitPart::TitleBar);
        }
        Some(HitPart::Content)
    }

    /// Update the armed resize edge for a pointer hovering over `part`.
    pub(crate) fn hover(&mut self, point: Point, part: Option<HitPart>, metrics: &WindowMetrics) {
        if self.resize.is_some() {
            return;
        }
        if self.maximized || part != Some(HitPart::Frame) {
            self.resize_edge = None;
            return;
        }
        let lx = point.x - self.geometry.x;
        let ly = point.y - self.geometry.y;
        let zone = metrics.edge_zone;
        let horizontal = if lx < zone {
            -1
        } else if self.geometry.width - 1 - lx < zone {
            1
        } else {
            0
        };
        let vertical = if ly < zone {
            -1
        } else if self.geometry.height - 1 - ly < zone {
            1
        } else {
            0
        };
        self.resize_edge = ResizeEdge::from_axes(horizontal, vertical);
    }

    /// Enter the resizing state if an edge is armed. Returns the captured edge.
    pub(crate) fn begin_resize(&mut self) -> Option<ResizeEdge> {
        if self.maximized {
            return None;
        }
        let edge = self.resize_edge?;
        self.resize = Some(ResizeSession {
            edge,
            start: self.geometry,
            total: Delta::default(),
        });
        tracing::debug!(window = %self.surface.id, edge = edge.cursor(), "resize started");
        Some(edge)
    }

    pub(crate) fn on_drag_move(
        &mut self,
        view: &HostView,
        delta: Delta,
        point: Point,
    ) -> Result<(), WmError> {
        if let Some(session) = self.resize.as_mut() {
            session.total = session.total.checked_add(delta)?;
            self.geometry = resized(session.start, session.edge, session.total, &view.metrics)?;
        } else if point.y < view.metrics.snap_zone && view.edge_maximize {
            if !self.maximized {
                tracing::debug!(window = %self.surface.id, "snapped to maximized");
                self.maximize(view);
                return Ok(());
            }
        } else if self.maximized {
            self.restore_under(point, view);
        } else {
            self.geometry = self.geometry.translated(delta)?;
        }
        self.push(view);
        Ok(())
    }

    pub(crate) fn on_drag_end(&mut self, view: &HostView) -> Result<(), WmError> {
        if self.resize.take().is_some() {
            self.resize_edge = None;
        }
        self.reposition(view);
        Ok(())
    }

    // Leave maximized mid-drag, keeping the window under the pointer at the
    // same relative horizontal position.
    fn restore_under(&mut self, point: Point, view: &HostView) {
        let saved = self.saved.take().unwrap_or(self.geometry);
        self.maximized = false;
        self.geometry.width = saved.width;
        self.geometry.height = saved.height;
        if view.root.width > 0 {
            let offset = saved.width as i64 * point.x as i64 / view.root.width as i64;
            let x = point.x as i64 - offset;
            self.geometry.x = x.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        }
    }

    fn push(&mut self, view: &HostView) {
        self.placement = Placement {
            geometry: self.geometry,
            content_height: view.metrics.content_height(self.geometry.height),
        };
    }
}

fn resized(
    start: Geometry,
    edge: ResizeEdge,
    total: Delta,
    metrics: &WindowMetrics,
) -> Result<Geometry, WmError> {
    let (x, width) = resized_axis(
        start.x,
        start.width,
        total.dx,
        edge.horizontal(),
        metrics.min_width,
    )?;
    let (y, height) = resized_axis(
        start.y,
        start.height,
        total.dy,
        edge.vertical(),
        metrics.min_height,
    )?;
    Ok(Geometry::new(x, y, width, height))
}

// One axis of a resize. `side` is -1 for the left/top edge, 1 for the
// right/bottom edge and 0 when this axis is not being dragged. The far edge
// stays fixed when the near one hits the minimum.
fn resized_axis(
    origin: i32,
    length: i32,
    delta: i32,
    side: i32,
    min: i32,
) -> Result<(i32, i32), WmError> {
    let overflow = || WmError::GeometryOverflow;
    match side {
        -1 => {
            let far = origin.checked_add(length).ok_or_else(overflow)?;
            let length = length.checked_sub(delta).ok_or_else(overflow)?.max(min);
            Ok((far.checked_sub(length).ok_or_else(overflow)?, length))
        }
        1 => Ok((origin, length.checked_add(delta).ok_or_else(overflow)?.max(min))),
        _ => Ok((origin, length)),
    }
}

/// A window bound to the host view for the duration of one drag callback.
pub(crate) struct WindowGrip<'a> {
    pub(crate) window: &'a mut Window,
    pub(crate) view: HostView,
}

impl DragTarget for WindowGrip<'_> {
    fn on_drag_move(&mut self, delta: Delta, point: Point) -> Result<(), WmError> {
        self.window.on_drag_move(&self.view, delta, point)
    }

    fn on_drag_end(&mut self) -> Result<(), WmError> {
        self.window.on_drag_end(&self.view)
    }
}
