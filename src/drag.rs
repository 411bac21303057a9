//! Single drag tracker shared by every draggable surface.
//!
//! Only one drag session exists at a time. The controller owns the pointer
//! bookkeeping (origin, last point, pending threshold) and hands the owner of
//! the active key deltas through the [`DragTarget`] capability. Callback
//! failures stop at this boundary so one broken target cannot wedge input
//! for the rest of the desktop.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use crate::error::WmError;
use crate::geometry::{Delta, Point};

/// Something that can be dragged.
pub trait DragTarget {
    fn on_drag_move(&mut self, delta: Delta, point: Point) -> Result<(), WmError>;
    fn on_drag_end(&mut self) -> Result<(), WmError>;
}

/// Whether the event that started a drag should keep its default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy)]
struct DragSession<K> {
    key: K,
    origin: Point,
    last: Point,
    // Cleared to zero the first time the pointer travels far enough.
    threshold_sq: i64,
}

#[derive(Debug)]
pub struct DragController<K: Copy + Eq + Debug> {
    session: Option<DragSession<K>>,
}

impl<K: Copy + Eq + Debug> Default for DragController<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Debug> DragController<K> {
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Begin tracking `key`. Any previous session is dropped without callbacks.
    pub fn start(&mut self, key: K, origin: Point, threshold: u32) -> Propagation {
        if let Some(prev) = self.session.take() {
            tracing::debug!(previous = ?prev.key, next = ?key, "drag target replaced");
        }
        let threshold = threshold as i64;
        self.session = Some(DragSession {
            key,
            origin,
            last: origin,
            threshold_sq: threshold * threshold,
        });
        Propagation::Stop
    }

    pub fn active(&self) -> Option<K> {
        self.session.map(|s| s.key)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session without invoking the target.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Feed a pointer move. Returns true when a session is active, whether or
    /// not the target was invoked.
    pub fn pointer_move<T: DragTarget + ?Sized>(
        &mut self,
        point: Point,
        target: Option<&mut T>,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let delta = point.delta_from(session.last);
        let mut dispatch = true;
        if session.threshold_sq > 0 {
            if point.distance_sq(session.origin) < session.threshold_sq {
                dispatch = false;
            } else {
                session.threshold_sq = 0;
            }
        }
        let key = session.key;
        session.last = point;
        if !dispatch {
            return true;
        }
        match target {
            Some(target) => guarded(key, "move", || target.on_drag_move(delta, point)),
            None => tracing::warn!(target_key = ?key, "drag target vanished during move"),
        }
        true
    }

    /// Feed a pointer release. `on_drag_end` fires exactly once per session.
    pub fn pointer_up<T: DragTarget + ?Sized>(&mut self, target: Option<&mut T>) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        match target {
            Some(target) => guarded(session.key, "end", || target.on_drag_end()),
            None => tracing::warn!(target_key = ?session.key, "drag target vanished before release"),
        }
        true
    }
}

fn guarded<K: Debug>(key: K, phase: &str, f: impl FnOnce() -> Result<(), WmError>) {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(target_key = ?key, phase, error = %err, "drag callback failed");
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic>".to_string());
            tracing::error!(target_key = ?key, phase, %message, "drag callback panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        moves: Vec<(Delta, Point)>,
        ends: usize,
        fail: bool,
        panic: bool,
    }

    impl DragTarget for Recorder {
        fn on_drag_move(&mut self, delta: Delta, point: Point) -> Result<(), WmError> {
            if self.panic {
                panic!("boom");
            }
            self.moves.push((delta, point));
            if self.fail {
                return Err(WmError::GeometryOverflow);
            }
            Ok(())
        }

        fn on_drag_end(&mut self) -> Result<(), WmError> {
            self.ends += 1;
            Ok(())
        }
    }

    #[test]
    fn zero_threshold_dispatches_every_move() {
        let mut drag = DragController::new();
        let mut target = Recorder::default();
        assert_eq!(drag.start(1u8, Point::new(0, 0), 0), Propagation::Stop);
        drag.pointer_move(Point::new(2, 1), Some(&mut target));
        drag.pointer_move(Point::new(5, 1), Some(&mut target));
        assert_eq!(
            target.moves,
            vec![
                (Delta::new(2, 1), Point::new(2, 1)),
                (Delta::new(3, 0), Point::new(5, 1)),
            ]
        );
    }

    #[test]
    fn threshold_holds_moves_then_sends_full_delta() {
        let mut drag = DragController::new();
        let mut target = Recorder::default();
        drag.start(1u8, Point::new(100, 100), 10);
        drag.pointer_move(Point::new(103, 104), Some(&mut target));
        drag.pointer_move(Point::new(105, 105), Some(&mut target));
        assert!(target.moves.is_empty());
        // 6² + 8² = 100 meets the threshold exactly.
        drag.pointer_move(Point::new(106, 108), Some(&mut target));
        assert_eq!(target.moves, vec![(Delta::new(1, 3), Point::new(106, 108))]);
        // Once crossed the threshold stays cleared, even back near the origin.
        drag.pointer_move(Point::new(101, 101), Some(&mut target));
        assert_eq!(target.moves.len(), 2);
        drag.pointer_up(Some(&mut target));
        assert_eq!(target.ends, 1);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn release_without_crossing_threshold_still_ends_once() {
        let mut drag = DragController::new();
        let mut target = Recorder::default();
        drag.start(1u8, Point::new(0, 0), 10);
        drag.pointer_move(Point::new(1, 1), Some(&mut target));
        assert!(drag.pointer_up(Some(&mut target)));
        assert!(!drag.pointer_up(Some(&mut target)));
        assert_eq!(target.ends, 1);
        assert!(target.moves.is_empty());
    }

    #[test]
    fn idle_controller_ignores_events() {
        let mut drag = DragController::<u8>::new();
        let mut target = Recorder::default();
        assert!(!drag.pointer_move(Point::new(3, 3), Some(&mut target)));
        assert!(!drag.pointer_up(Some(&mut target)));
        assert!(target.moves.is_empty());
        assert_eq!(target.ends, 0);
    }

    #[test]
    fn new_start_replaces_previous_target() {
        let mut drag = DragController::new();
        drag.start(1u8, Point::new(0, 0), 0);
        drag.start(2u8, Point::new(5, 5), 0);
        assert_eq!(drag.active(), Some(2));
        let mut target = Recorder::default();
        drag.pointer_move(Point::new(6, 5), Some(&mut target));
        assert_eq!(target.moves, vec![(Delta::new(1, 0), Point::new(6, 5))]);
    }

    #[test]
    fn failing_and_panicking_targets_do_not_escape() {
        let mut drag = DragController::new();
        let mut failing = Recorder {
            fail: true,
            ..Recorder::default()
        };
        drag.start(1u8, Point::new(0, 0), 0);
        drag.pointer_move(Point::new(1, 0), Some(&mut failing));
        drag.pointer_move(Point::new(2, 0), Some(&mut failing));
        assert_eq!(failing.moves.len(), 2);

        let mut panicking = Recorder {
            panic: true,
            ..Recorder::default()
        };
        drag.pointer_move(Point::new(3, 0), Some(&mut panicking));
        // The session survives and the last point advanced.
        drag.pointer_move(Point::new(5, 0), Some(&mut failing));
        assert_eq!(failing.moves.last(), Some(&(Delta::new(2, 0), Point::new(5, 0))));
        assert!(drag.pointer_up(Some(&mut failing)));
        assert_eq!(failing.ends, 1);
    }
}
