//! The sign-on window's form.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Color;

/// The only password the demo accepts.
pub const DEMO_PASSWORD: &str = "TheBigBoulder";

pub const LOCATIONS: [&str; 3] = ["Home", "Work", "Travel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    ScreenName,
    Password,
    Location,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::ScreenName, Field::Password, Field::Location];

    pub fn label(self) -> &'static str {
        match self {
            Field::ScreenName => "Screen Name",
            Field::Password => "Password",
            Field::Location => "Location",
        }
    }

    fn next(self) -> Self {
        match self {
            Field::ScreenName => Field::Password,
            Field::Password => Field::Location,
            Field::Location => Field::ScreenName,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::ScreenName => Field::Location,
            Field::Password => Field::ScreenName,
            Field::Location => Field::Password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Error,
    Success,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Error => Color::Red,
            Tone::Success => Color::Green,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOnOutcome {
    /// The form stays open with an error message.
    Rejected,
    /// Credentials accepted; the caller hides the sign-on window.
    Accepted,
}

#[derive(Debug, Clone, Default)]
pub struct SignOnForm {
    screen_name: String,
    password: String,
    location: usize,
    focus: Field,
    message: Option<Message>,
}

impl SignOnForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn location(&self) -> &'static str {
        LOCATIONS[self.location % LOCATIONS.len()]
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn set_screen_name(&mut self, value: impl Into<String>) {
        self.screen_name = value.into();
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
    }

    /// Text shown in a field; the password is masked.
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::ScreenName => self.screen_name.clone(),
            Field::Password => "*".repeat(self.password.chars().count()),
            Field::Location => format!("< {} >", self.location()),
        }
    }

    pub fn cycle_location(&mut self, forward: bool) {
        let len = LOCATIONS.len();
        self.location = if forward {
            (self.location + 1) % len
        } else {
            (self.location + len - 1) % len
        };
    }

    pub fn submit(&mut self) -> SignOnOutcome {
        let (text, tone, outcome) = if self.password.is_empty() {
            (
                "Please enter a password".to_string(),
                Tone::Error,
                SignOnOutcome::Rejected,
            )
        } else if self.password == DEMO_PASSWORD {
            (
                format!("Welcome, {}!", self.screen_name),
                Tone::Success,
                SignOnOutcome::Accepted,
            )
        } else {
            (
                "Invalid screen name or password".to_string(),
                Tone::Error,
                SignOnOutcome::Rejected,
            )
        };
        tracing::info!(screen_name = %self.screen_name, ?outcome, "sign-on submitted");
        self.message = Some(Message { text, tone });
        outcome
    }

    /// Edit the focused field. Returns the submit outcome when Enter was
    /// pressed, `None` otherwise.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<SignOnOutcome> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Enter => return Some(self.submit()),
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Left if self.focus == Field::Location => self.cycle_location(false),
            KeyCode::Right if self.focus == Field::Location => self.cycle_location(true),
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if let Some(text) = self.text_mut() {
                    text.push(ch);
                } else if ch == ' ' {
                    self.cycle_location(true);
                }
            }
            _ => {}
        }
        None
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::ScreenName => Some(&mut self.screen_name),
            Field::Password => Some(&mut self.password),
            Field::Location => None,
        }
    }
}
