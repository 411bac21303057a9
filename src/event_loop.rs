use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// The message pump of the desktop.
///
/// Owns the UI thread and the input driver. Every iteration first calls the
/// handler with `None` (a tick: apply finished fetches, advance the clock,
/// redraw if needed), then waits up to `tick` for input and drains every
/// queued event into the handler before ticking again.
///
/// Content fetch threads never touch UI state; they report over a channel
/// that the tick drains.
pub struct EventLoop<D> {
    driver: D,
    tick: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, tick: Duration) -> Self {
        Self { driver, tick }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.tick)? {
                // Drain bursts (mouse drags) before the next tick so drawing
                // never falls behind the input stream.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent};
    use std::collections::VecDeque;

    struct Scripted {
        events: VecDeque<Event>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    #[test]
    fn ticks_then_drains_all_queued_events() {
        let events = (0..3)
            .map(|i| Event::Key(KeyEvent::from(KeyCode::Char((b'a' + i) as char))))
            .collect();
        let mut event_loop = EventLoop::new(Scripted { events }, Duration::from_millis(1));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                seen.push(event.is_some());
                // Quit on the second tick.
                let ticks = seen.iter().filter(|e| !**e).count();
                Ok(if ticks == 2 {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(seen, vec![false, true, true, true, false]);
        assert!(event_loop.driver().events.is_empty());
    }
}
