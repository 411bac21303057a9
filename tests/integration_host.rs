use term_desk::drag::{DragController, DragTarget};
use term_desk::geometry::{Delta, Geometry, Point, Size};
use term_desk::window::{SurfaceSpec, WindowHost, WindowKey, WindowMetrics};
use term_desk::WmError;

fn host() -> WindowHost {
    WindowHost::new(Size::new(1024, 768), WindowMetrics::default())
}

fn spec(id: &str, x: i32, y: i32) -> SurfaceSpec {
    SurfaceSpec::new(id, id.to_uppercase(), Geometry::new(x, y, 300, 200)).visible(true)
}

#[test]
fn focusing_b_c_a_stacks_in_call_order() {
    let mut h = host();
    let a = h.create(spec("a", 10, 10));
    let b = h.create(spec("b", 40, 40));
    let c = h.create(spec("c", 70, 70));

    let mut last = 0;
    for key in [b, c, a] {
        h.focus(Some(key));
        let z = h.window(key).unwrap().z();
        assert!(z > last, "z-order must strictly increase");
        last = z;
    }
    assert_eq!(h.active_window(), Some(a));
    assert_eq!(h.draw_order(), vec![b, c, a]);
}

#[test]
fn any_focus_sequence_leaves_one_active_window() {
    let mut h = host();
    let keys: Vec<WindowKey> = ["a", "b", "c", "d"]
        .iter()
        .enumerate()
        .map(|(i, id)| h.create(spec(id, 20 * i as i32, 20 * i as i32)))
        .collect();
    let sequence = [Some(2), None, Some(0), Some(0), Some(3), Some(1), None, Some(2)];
    let mut expected = None;
    for step in sequence {
        let key = step.map(|i| keys[i]);
        h.focus(key);
        if key.is_some() {
            expected = key;
        } else {
            expected = None;
        }
        let active: Vec<WindowKey> = h
            .windows()
            .filter(|(_, w)| w.is_active())
            .map(|(k, _)| k)
            .collect();
        assert!(active.len() <= 1);
        assert_eq!(h.active_window(), expected);
        assert_eq!(active.first().copied(), expected);
    }
}

#[test]
fn create_twice_grows_collection_once() {
    let mut h = host();
    let first = h.create(spec("blog1", 0, 0));
    let second = h.create(spec("blog1", 0, 0));
    assert_eq!(first, second);
    assert_eq!(h.len(), 1);
    assert_eq!(h.lookup_by_id("blog1"), Some(first));
}

#[test]
fn pointer_drag_of_title_moves_then_clamps_on_release() {
    let mut h = host();
    let key = h.create(spec("w", 100, 100));
    // Middle of the title bar.
    let grab = Point::new(150, 115);
    h.pointer_down(grab);
    h.pointer_move(Point::new(grab.x - 600, grab.y + 40));
    h.pointer_up();
    let g = h.window(key).unwrap().geometry();
    assert_eq!(g.y, 140);
    assert_eq!(g.x, 50 - g.width);
}

#[test]
fn maximize_twice_restores_geometry() {
    let mut h = host();
    let key = h.create(spec("w", 33, 44));
    let before = h.window(key).unwrap().geometry();
    h.maximize(key);
    assert_eq!(
        h.window(key).unwrap().geometry(),
        Geometry::filling(h.root())
    );
    h.maximize(key);
    assert_eq!(h.window(key).unwrap().geometry(), before);
}

#[test]
fn window_placement_tracks_content_height() {
    let mut h = host();
    let key = h.create(spec("w", 0, 0));
    let placement = h.window(key).unwrap().placement();
    assert_eq!(placement.geometry, Geometry::new(0, 0, 300, 200));
    assert_eq!(placement.content_height, 200 - 30 - 4);
}

#[derive(Default)]
struct Tally {
    moves: Vec<Delta>,
    ends: usize,
}

impl DragTarget for Tally {
    fn on_drag_move(&mut self, delta: Delta, _point: Point) -> Result<(), WmError> {
        self.moves.push(delta);
        Ok(())
    }

    fn on_drag_end(&mut self) -> Result<(), WmError> {
        self.ends += 1;
        Ok(())
    }
}

#[test]
fn threshold_holds_every_sub_threshold_path() {
    let paths: [&[(i32, i32)]; 3] = [
        &[(1, 0), (2, 1), (3, 3), (-2, 4)],
        &[(0, 9), (9, 0), (-9, 0), (0, -9)],
        &[(6, 6), (7, 7)],
    ];
    for path in paths {
        let mut drag = DragController::new();
        let mut target = Tally::default();
        let origin = Point::new(500, 500);
        drag.start(1u8, origin, 10);
        for (dx, dy) in path {
            drag.pointer_move(Point::new(origin.x + dx, origin.y + dy), Some(&mut target));
        }
        assert!(target.moves.is_empty(), "path {path:?} dispatched early");
        // Crossing the threshold sends the full offset from the last point.
        let (lx, ly) = *path.last().unwrap();
        drag.pointer_move(Point::new(origin.x + 10, origin.y), Some(&mut target));
        assert_eq!(target.moves, vec![Delta::new(10 - lx, -ly)]);
        drag.pointer_up(Some(&mut target));
        assert_eq!(target.ends, 1);
    }
}
