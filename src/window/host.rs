use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{HitPart, HostView, ResizeEdge, SurfaceId, SurfaceSpec, Window, WindowGrip, WindowMetrics};
use crate::constants::DOUBLE_CLICK_MS;
use crate::drag::DragController;
use crate::geometry::{Point, Size};

/// Index of a window inside its host. Windows are never removed, so a key
/// stays valid for the lifetime of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowKey(usize);

impl WindowKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outcome of a pointer press routed through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDown {
    /// Nothing was hit; focus was cleared.
    Background,
    /// A window was focused and the press belongs to its content.
    Focused(WindowKey),
    Dragging(WindowKey),
    Resizing(WindowKey, ResizeEdge),
    Closed(WindowKey),
    MaximizeToggled(WindowKey),
}

impl PointerDown {
    /// Whether the press was consumed by window chrome.
    pub fn consumed(self) -> bool {
        !matches!(self, PointerDown::Background | PointerDown::Focused(_))
    }
}

/// Owns every window inside one bounding root.
///
/// The host keeps the single-focus invariant, hands out z-order values from a
/// counter that only grows, and owns the one drag controller all windows
/// share. Windows get host state through a [`HostView`] snapshot instead of a
/// back reference.
#[derive(Debug)]
pub struct WindowHost {
    root: Size,
    metrics: WindowMetrics,
    edge_maximize: bool,
    // Surfaces the environment declared; a window is created on first open.
    surfaces: BTreeMap<SurfaceId, SurfaceSpec>,
    windows: Vec<Window>,
    active: Option<WindowKey>,
    top_z: u64,
    drag: DragController<WindowKey>,
    cursor_override: Option<ResizeEdge>,
    hovered: Option<WindowKey>,
    last_title_click: Option<(WindowKey, Instant)>,
}

impl WindowHost {
    pub fn new(root: Size, metrics: WindowMetrics) -> Self {
        Self {
            root,
            metrics,
            edge_maximize: true,
            surfaces: BTreeMap::new(),
            windows: Vec::new(),
            active: None,
            top_z: 0,
            drag: DragController::new(),
            cursor_override: None,
            hovered: None,
            last_title_click: None,
        }
    }

    pub fn view(&self) -> HostView {
        HostView {
            root: self.root,
            edge_maximize: self.edge_maximize,
            metrics: self.metrics,
        }
    }

    pub fn root(&self) -> Size {
        self.root
    }

    pub fn metrics(&self) -> &WindowMetrics {
        &self.metrics
    }

    pub fn edge_maximize(&self) -> bool {
        self.edge_maximize
    }

    pub fn set_edge_maximize(&mut self, enabled: bool) {
        self.edge_maximize = enabled;
    }

    pub fn window(&self, key: WindowKey) -> Option<&Window> {
        self.windows.get(key.0)
    }

    pub fn windows(&self) -> impl Iterator<Item = (WindowKey, &Window)> {
        self.windows
            .iter()
            .enumerate()
            .map(|(idx, window)| (WindowKey(idx), window))
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn active_window(&self) -> Option<WindowKey> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Make a surface known to the host without wrapping it yet.
    pub fn declare_surface(&mut self, spec: SurfaceSpec) {
        self.surfaces.insert(spec.id.clone(), spec);
    }

    /// Wrap a surface in a window. Wrapping the same surface twice returns the
    /// existing window after re-clamping and focusing it.
    pub fn create(&mut self, spec: SurfaceSpec) -> WindowKey {
        if let Some(key) = self.lookup_by_id(spec.id.as_str()) {
            let view = self.view();
            self.windows[key.0].reposition(&view);
            self.focus(Some(key));
            return key;
        }
        let key = WindowKey(self.windows.len());
        tracing::debug!(surface = %spec.id, index = key.0, "opened window");
        self.surfaces
            .entry(spec.id.clone())
            .or_insert_with(|| spec.clone());
        let window = Window::new(spec, &self.view());
        self.windows.push(window);
        self.focus(Some(key));
        key
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<WindowKey> {
        self.windows
            .iter()
            .position(|window| window.id().as_str() == id)
            .map(WindowKey)
    }

    /// Show the window for surface `id`, creating it on first use, and bring
    /// it to front. Unknown ids are logged and skipped.
    pub fn open_by_id(&mut self, id: &str) -> Option<WindowKey> {
        let key = match self.lookup_by_id(id) {
            Some(key) => key,
            None => {
                let Some(spec) = self.surfaces.get(id).cloned() else {
                    tracing::warn!(surface = id, "no surface to open");
                    return None;
                };
                self.create(spec)
            }
        };
        self.show(key);
        Some(key)
    }

    pub fn show(&mut self, key: WindowKey) {
        let view = self.view();
        let Some(window) = self.windows.get_mut(key.0) else {
            tracing::warn!(?key, "show on unknown window");
            return;
        };
        window.show(&view);
        self.focus(Some(key));
    }

    pub fn hide(&mut self, key: WindowKey) {
        let Some(window) = self.windows.get_mut(key.0) else {
            tracing::warn!(?key, "hide on unknown window");
            return;
        };
        window.hide();
        if self.hovered == Some(key) {
            self.hovered = None;
        }
        self.focus(None);
    }

    /// Toggle maximize on a window.
    pub fn maximize(&mut self, key: WindowKey) {
        let view = self.view();
        if let Some(window) = self.windows.get_mut(key.0) {
            window.maximize(&view);
        }
    }

    /// Make `key` the single active window, or clear focus with `None`.
    pub fn focus(&mut self, key: Option<WindowKey>) {
        if let Some(prev) = self.active.take()
            && let Some(window) = self.windows.get_mut(prev.0)
        {
            window.set_active(false);
        }
        let Some(key) = key else {
            return;
        };
        let Some(window) = self.windows.get_mut(key.0) else {
            tracing::warn!(?key, "focus on unknown window");
            return;
        };
        window.set_active(true);
        self.active = Some(key);
        self.bring_to_front(key);
    }

    pub fn bring_to_front(&mut self, key: WindowKey) {
        if let Some(window) = self.windows.get_mut(key.0) {
            self.top_z += 1;
            window.set_z(self.top_z);
        }
    }

    pub fn background_click(&mut self) {
        self.focus(None);
    }

    /// Adopt a new bounding-root size and re-clamp every window.
    pub fn resize_root(&mut self, root: Size) {
        self.root = root;
        let view = self.view();
        for window in &mut self.windows {
            window.reposition(&view);
        }
    }

    /// Visible windows from back to front.
    pub fn draw_order(&self) -> Vec<WindowKey> {
        let mut keys: Vec<WindowKey> = self
            .windows()
            .filter(|(_, window)| window.is_visible())
            .map(|(key, _)| key)
            .collect();
        keys.sort_by_key(|key| self.windows[key.0].z());
        keys
    }

    /// Topmost visible window under `point` and the part that was hit.
    pub fn hit_test(&self, point: Point) -> Option<(WindowKey, HitPart)> {
        self.draw_order().into_iter().rev().find_map(|key| {
            self.windows[key.0]
                .hit_part(point, &self.metrics)
                .map(|part| (key, part))
        })
    }

    pub fn pointer_down(&mut self, point: Point) -> PointerDown {
        self.pointer_down_at(point, Instant::now())
    }

    pub fn pointer_down_at(&mut self, point: Point, at: Instant) -> PointerDown {
        // A press during a live session means its release was lost; end it so
        // the old window leaves the resizing state.
        if let Some(stale) = self.drag.active() {
            tracing::debug!(?stale, "ending drag whose release never arrived");
            self.pointer_up();
        }
        let Some((key, part)) = self.hit_test(point) else {
            self.background_click();
            return PointerDown::Background;
        };
        self.focus(Some(key));
        match part {
            HitPart::Close => {
                self.hide(key);
                PointerDown::Closed(key)
            }
            HitPart::Maximize => {
                self.maximize(key);
                PointerDown::MaximizeToggled(key)
            }
            HitPart::Frame => {
                let metrics = self.metrics;
                let window = &mut self.windows[key.0];
                window.hover(point, Some(part), &metrics);
                match window.begin_resize() {
                    Some(edge) => {
                        self.cursor_override = Some(edge);
                        self.drag.start(key, point, 0);
                        PointerDown::Resizing(key, edge)
                    }
                    None => PointerDown::Focused(key),
                }
            }
            HitPart::TitleBar => {
                if let Some((prev, when)) = self.last_title_click.take()
                    && prev == key
                    && at.saturating_duration_since(when) <= Duration::from_millis(DOUBLE_CLICK_MS)
                {
                    self.maximize(key);
                    return PointerDown::MaximizeToggled(key);
                }
                self.last_title_click = Some((key, at));
                let threshold = self.windows[key.0].drag_threshold(&self.metrics);
                self.drag.start(key, point, threshold);
                PointerDown::Dragging(key)
            }
            HitPart::Content => PointerDown::Focused(key),
        }
    }

    /// Route a pointer move: to the active drag when there is one, otherwise
    /// to hover tracking. Returns true when a drag consumed the move.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let Some(key) = self.drag.active() else {
            self.hover(point);
            return false;
        };
        let view = self.view();
        let mut grip = self
            .windows
            .get_mut(key.0)
            .map(|window| WindowGrip { window, view });
        self.drag.pointer_move(point, grip.as_mut())
    }

    pub fn pointer_up(&mut self) -> bool {
        let Some(key) = self.drag.active() else {
            return false;
        };
        let view = self.view();
        let mut grip = self
            .windows
            .get_mut(key.0)
            .map(|window| WindowGrip { window, view });
        let ended = self.drag.pointer_up(grip.as_mut());
        self.cursor_override = None;
        ended
    }

    /// Track the pointer for resize-edge hinting.
    pub fn hover(&mut self, point: Point) {
        let hit = self.hit_test(point);
        let key = hit.map(|(key, _)| key);
        let metrics = self.metrics;
        if let Some(prev) = self.hovered
            && Some(prev) != key
        {
            self.windows[prev.0].hover(point, None, &metrics);
        }
        if let Some((key, part)) = hit {
            self.windows[key.0].hover(point, Some(part), &metrics);
        }
        self.hovered = key;
    }

    /// Resize cursor to display: the captured one while resizing, otherwise
    /// the edge armed under the pointer.
    pub fn cursor_hint(&self) -> Option<ResizeEdge> {
        self.cursor_override.or_else(|| {
            self.hovered
                .and_then(|key| self.windows.get(key.0))
                .and_then(|window| window.resize_edge())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn host() -> WindowHost {
        WindowHost::new(Size::new(800, 600), WindowMetrics::default())
    }

    fn spec(id: &str, x: i32, y: i32) -> SurfaceSpec {
        SurfaceSpec::new(id, id.to_uppercase(), Geometry::new(x, y, 200, 150)).visible(true)
    }

    #[test]
    fn focus_keeps_single_active_window() {
        let mut h = host();
        let a = h.create(spec("a", 0, 0));
        let b = h.create(spec("b", 50, 50));
        let c = h.create(spec("c", 100, 100));
        for key in [b, a, c, c, b] {
            h.focus(Some(key));
            let active: Vec<WindowKey> = h
                .windows()
                .filter(|(_, w)| w.is_active())
                .map(|(k, _)| k)
                .collect();
            assert_eq!(active, vec![key]);
            assert_eq!(h.active_window(), Some(key));
        }
        h.focus(None);
        assert_eq!(h.active_window(), None);
        assert!(h.windows().all(|(_, w)| !w.is_active()));
    }

    #[test]
    fn focus_order_yields_increasing_z() {
        let mut h = host();
        let a = h.create(spec("a", 0, 0));
        let b = h.create(spec("b", 50, 50));
        let c = h.create(spec("c", 100, 100));
        h.focus(Some(b));
        let zb = h.window(b).unwrap().z();
        h.focus(Some(c));
        let zc = h.window(c).unwrap().z();
        h.focus(Some(a));
        let za = h.window(a).unwrap().z();
        assert!(zb < zc && zc < za);
        assert_eq!(h.active_window(), Some(a));
        assert_eq!(h.draw_order(), vec![b, c, a]);
    }

    #[test]
    fn bring_to_front_is_monotonic_without_focus() {
        let mut h = host();
        let a = h.create(spec("a", 0, 0));
        let b = h.create(spec("b", 50, 50));
        let mut last = 0;
        for key in [a, a, b, a] {
            h.bring_to_front(key);
            let z = h.window(key).unwrap().z();
            assert!(z > last);
            last = z;
        }
        assert_eq!(h.active_window(), Some(b));
    }

    #[test]
    fn create_is_idempotent() {
        let mut h = host();
        let first = h.create(spec("a", 0, 0));
        let other = h.create(spec("b", 10, 10));
        let second = h.create(spec("a", 0, 0));
        assert_eq!(first, second);
        assert_eq!(h.len(), 2);
        // Recreating refocuses.
        assert_eq!(h.active_window(), Some(first));
        assert!(h.window(other).unwrap().z() < h.window(first).unwrap().z());
    }

    #[test]
    fn open_by_id_creates_declared_surfaces() {
        let mut h = host();
        h.declare_surface(spec("login", 10, 10).visible(false));
        assert_eq!(h.lookup_by_id("login"), None);
        let key = h.open_by_id("login").expect("declared surface");
        assert!(h.window(key).unwrap().is_visible());
        assert_eq!(h.active_window(), Some(key));
        assert_eq!(h.open_by_id("login"), Some(key));
        assert_eq!(h.len(), 1);
        assert_eq!(h.open_by_id("missing"), None);
    }

    #[test]
    fn hide_clears_focus() {
        let mut h = host();
        let a = h.create(spec("a", 0, 0));
        h.hide(a);
        assert_eq!(h.active_window(), None);
        assert!(h.draw_order().is_empty());
    }

    #[test]
    fn resize_root_repositions_every_window() {
        let mut h = host();
        let a = h.create(spec("a", 700, 550));
        let b = h.create(spec("b", 10, 10));
        h.resize_root(Size::new(400, 300));
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(370, 270, 200, 150));
        assert_eq!(h.window(b).unwrap().geometry(), Geometry::new(10, 10, 200, 150));
    }

    #[test]
    fn background_click_clears_focus() {
        let mut h = host();
        h.create(spec("a", 0, 0));
        assert_eq!(h.pointer_down(Point::new(700, 500)), PointerDown::Background);
        assert_eq!(h.active_window(), None);
    }

    #[test]
    fn title_drag_moves_topmost_window() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        let b = h.create(spec("b", 120, 100));
        // Both title bars overlap here; b is on top.
        let down = h.pointer_down(Point::new(200, 110));
        assert_eq!(down, PointerDown::Dragging(b));
        assert!(down.consumed());
        assert!(h.pointer_move(Point::new(230, 140)));
        assert!(h.pointer_up());
        assert_eq!(h.window(b).unwrap().geometry(), Geometry::new(150, 130, 200, 150));
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(100, 100, 200, 150));
        assert!(!h.is_dragging());
    }

    #[test]
    fn frame_press_on_armed_edge_resizes() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        h.pointer_move(Point::new(299, 249));
        assert_eq!(h.cursor_hint(), Some(ResizeEdge::BottomRight));
        let down = h.pointer_down(Point::new(299, 249));
        assert_eq!(down, PointerDown::Resizing(a, ResizeEdge::BottomRight));
        h.pointer_move(Point::new(349, 279));
        assert_eq!(h.cursor_hint(), Some(ResizeEdge::BottomRight));
        h.pointer_up();
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(100, 100, 250, 180));
        assert!(!h.window(a).unwrap().is_resizing());
    }

    #[test]
    fn press_without_release_ends_previous_resize() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        let b = h.create(spec("b", 400, 100));
        h.pointer_move(Point::new(299, 249));
        assert_eq!(
            h.pointer_down(Point::new(299, 249)),
            PointerDown::Resizing(a, ResizeEdge::BottomRight)
        );
        h.pointer_move(Point::new(319, 269));
        // The release for the resize never arrives.
        assert_eq!(h.pointer_down(Point::new(450, 110)), PointerDown::Dragging(b));
        assert!(!h.window(a).unwrap().is_resizing());
        assert_eq!(h.window(a).unwrap().resize_edge(), None);
        assert_eq!(h.cursor_hint(), None);
        h.pointer_up();

        assert_eq!(h.pointer_down(Point::new(150, 110)), PointerDown::Dragging(a));
        h.pointer_move(Point::new(170, 130));
        h.pointer_up();
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(120, 120, 220, 170));
    }

    #[test]
    fn extreme_pointer_moves_do_not_panic() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        assert_eq!(h.pointer_down(Point::new(150, 110)), PointerDown::Dragging(a));
        assert!(h.pointer_move(Point::new(i32::MIN, 110)));
        assert!(h.pointer_up());
        // Release clamps the window back so its title stays reachable.
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(50 - 200, 100, 200, 150));
    }

    #[test]
    fn resize_root_clamps_far_out_windows() {
        let mut h = host();
        let a = h.create(spec("a", 10, i32::MAX - 5));
        h.resize_root(Size::new(400, 300));
        assert_eq!(h.window(a).unwrap().geometry(), Geometry::new(10, 270, 200, 150));
    }

    #[test]
    fn title_buttons_close_and_maximize() {
        let mut h = host();
        let a = h.create(spec("a", 0, 0));
        assert_eq!(
            h.pointer_down(Point::new(170, 10)),
            PointerDown::MaximizeToggled(a)
        );
        assert!(h.window(a).unwrap().is_maximized());
        // Close sits at the right edge of the now maximized title bar.
        assert_eq!(h.pointer_down(Point::new(790, 10)), PointerDown::Closed(a));
        assert!(!h.window(a).unwrap().is_visible());
        assert_eq!(h.active_window(), None);
    }

    #[test]
    fn double_click_title_toggles_maximize() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        let t0 = Instant::now();
        assert_eq!(h.pointer_down_at(Point::new(150, 110), t0), PointerDown::Dragging(a));
        h.pointer_up();
        assert_eq!(
            h.pointer_down_at(Point::new(150, 110), t0 + Duration::from_millis(200)),
            PointerDown::MaximizeToggled(a)
        );
        assert!(h.window(a).unwrap().is_maximized());
    }

    #[test]
    fn maximized_title_drag_waits_for_threshold() {
        let mut h = host();
        let a = h.create(spec("a", 100, 100));
        h.maximize(a);
        assert_eq!(h.pointer_down(Point::new(400, 10)), PointerDown::Dragging(a));
        h.pointer_move(Point::new(403, 14));
        assert!(h.window(a).unwrap().is_maximized());
        h.pointer_move(Point::new(406, 18));
        let w = h.window(a).unwrap();
        assert!(!w.is_maximized());
        assert_eq!((w.geometry().width, w.geometry().height), (200, 150));
        h.pointer_up();
    }

    #[test]
    fn edge_maximize_policy_is_respected() {
        let mut h = host();
        h.set_edge_maximize(false);
        let a = h.create(spec("a", 100, 100));
        h.pointer_down(Point::new(150, 110));
        h.pointer_move(Point::new(150, 2));
        h.pointer_up();
        let w = h.window(a).unwrap();
        assert!(!w.is_maximized());
        assert_eq!(w.geometry().y, 0);
    }
}
