//! In-memory sink for log lines so tracing output never scribbles over the
//! alternate screen. The "log" window renders the tail of this buffer.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crate::constants::DEFAULT_LOG_LINES;

static GLOBAL_LOG: OnceLock<LogHandle> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn set_global_log(handle: LogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_log() -> Option<LogHandle> {
    GLOBAL_LOG.get().cloned()
}

/// Mirror panics into the global log before the previous hook runs.
pub fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(handle) = GLOBAL_LOG.get() {
            handle.push("=== PANIC ===");
            if let Some(location) = info.location() {
                handle.push(format!(
                    "{}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }
            if let Some(msg) = info.payload().downcast_ref::<&str>() {
                handle.push(format!("message: {msg}"));
            } else if let Some(msg) = info.payload().downcast_ref::<String>() {
                handle.push(format!("message: {msg}"));
            } else {
                handle.push("message: <non-string panic>");
            }
            return;
        }
        prev(info);
    }));
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
    pushed: u64,
}

impl LogBuffer {
    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        self.pushed += 1;
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LINES)
    }
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
                pushed: 0,
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    /// The last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(buffer) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = buffer.lines.len().saturating_sub(count);
        buffer.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    /// Lines pushed since creation, including ones already evicted.
    pub fn total_pushed(&self) -> u64 {
        self.inner.lock().map(|b| b.pushed).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            handle: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// `io::Write` adapter that splits incoming bytes into lines.
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    fn flush_pending(&mut self, force: bool) {
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|line| !line.is_empty()) {
            self.handle.push(line);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_lines() {
        let log = LogHandle::new(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_pushed(), 5);
        assert_eq!(log.tail(2), vec!["line 3".to_string(), "line 4".to_string()]);
    }

    #[test]
    fn writer_splits_lines_and_flushes_remainder() {
        let log = LogHandle::new(10);
        let mut writer = log.writer();
        writer.write_all(b"first\nsec").unwrap();
        assert_eq!(log.tail(10), vec!["first".to_string()]);
        writer.write_all(b"ond\nthird").unwrap();
        writer.flush().unwrap();
        assert_eq!(
            log.tail(10),
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }
}
