use chrono::{DateTime, TimeZone};

pub const CLOCK_FORMAT: &str = "%a %I:%M %p";

/// Menu-bar clock. The desktop ticks it every loop iteration; only a change
/// of the formatted text asks for a redraw.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    text: String,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reformat for `now`. Returns true when the displayed text changed.
    pub fn tick<Tz: TimeZone>(&mut self, now: DateTime<Tz>) -> bool
    where
        Tz::Offset: std::fmt::Display,
    {
        let text = now.format(CLOCK_FORMAT).to_string();
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }
}
