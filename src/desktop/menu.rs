//! The one-row menu bar across the top of the screen.
//!
//! At most one menu is open at a time. Layout is computed from the labels
//! alone, so hit testing does not depend on the last rendered frame.

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::geometry::rect_contains;
use crate::keybindings::{Action, KeyBindings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the window for a surface id.
    Open(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
}

impl MenuEntry {
    pub fn open(label: impl Into<String>, surface: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Open(surface.into()),
        }
    }

    pub fn quit(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Quit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(title: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHit {
    Title(usize),
    Entry(usize, usize),
    /// Inside an open dropdown but not on an entry.
    Dropdown,
    /// Anywhere on the bar row that is not a title.
    Bar,
}

/// Result of routing a click through the menu bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuClick {
    pub action: Option<MenuAction>,
    /// The desktop below must not see the click.
    pub consumed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MenuBar {
    menus: Vec<Menu>,
    open: Option<usize>,
    selected: usize,
}

const TITLE_START: u16 = 1;

impl MenuBar {
    pub fn new(menus: Vec<Menu>) -> Self {
        Self {
            menus,
            open: None,
            selected: 0,
        }
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn open_menu(&self) -> Option<usize> {
        self.open
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open menu `index`, closing any other; an already open menu closes.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.menus.len() {
            tracing::warn!(index, "toggle on unknown menu");
            return;
        }
        if self.open == Some(index) {
            self.open = None;
        } else {
            self.open = Some(index);
            self.selected = 0;
        }
    }

    pub fn close_all(&mut self) {
        self.open = None;
    }

    /// Screen rects of the menu titles on `row`.
    pub fn title_rects(&self, row: u16) -> Vec<Rect> {
        let mut x = TITLE_START;
        self.menus
            .iter()
            .map(|menu| {
                let width = menu.title.chars().count() as u16 + 2;
                let rect = Rect::new(x, row, width, 1);
                x = x.saturating_add(width + 1);
                rect
            })
            .collect()
    }

    /// Bordered dropdown rect of menu `index`, opened below `row`.
    pub fn dropdown_rect(&self, index: usize, row: u16) -> Option<Rect> {
        let menu = self.menus.get(index)?;
        let title = self.title_rects(row).get(index).copied()?;
        let inner = menu
            .entries
            .iter()
            .map(|entry| entry.label.chars().count())
            .max()
            .unwrap_or(0) as u16;
        Some(Rect::new(
            title.x,
            row.saturating_add(1),
            inner + 4,
            menu.entries.len() as u16 + 2,
        ))
    }

    pub fn hit_test(&self, column: u16, row: u16, bar_row: u16) -> Option<MenuHit> {
        if let Some(open) = self.open
            && let Some(drop) = self.dropdown_rect(open, bar_row)
            && rect_contains(drop, column, row)
        {
            let entry = row.saturating_sub(drop.y + 1) as usize;
            let on_entry = row > drop.y
                && row < drop.y + drop.height - 1
                && column > drop.x
                && column < drop.x + drop.width - 1;
            return Some(if on_entry {
                MenuHit::Entry(open, entry)
            } else {
                MenuHit::Dropdown
            });
        }
        if row != bar_row {
            return None;
        }
        let title = self
            .title_rects(bar_row)
            .iter()
            .position(|rect| rect_contains(*rect, column, row));
        Some(title.map_or(MenuHit::Bar, MenuHit::Title))
    }

    /// Route a left click. Clicks outside the bar and its dropdown close all
    /// menus and pass through.
    pub fn click(&mut self, column: u16, row: u16, bar_row: u16) -> MenuClick {
        match self.hit_test(column, row, bar_row) {
            Some(MenuHit::Title(index)) => {
                self.toggle(index);
                MenuClick {
                    action: None,
                    consumed: true,
                }
            }
            Some(MenuHit::Entry(menu, entry)) => {
                let action = self
                    .menus
                    .get(menu)
                    .and_then(|m| m.entries.get(entry))
                    .map(|e| e.action.clone());
                self.close_all();
                MenuClick {
                    action,
                    consumed: true,
                }
            }
            Some(MenuHit::Dropdown) => MenuClick {
                action: None,
                consumed: true,
            },
            Some(MenuHit::Bar) => {
                self.close_all();
                MenuClick {
                    action: None,
                    consumed: true,
                }
            }
            None => {
                self.close_all();
                MenuClick::default()
            }
        }
    }

    /// Keyboard navigation while a menu is open. Returns `None` when the key
    /// was not for the menu bar.
    pub fn handle_key(&mut self, key: &KeyEvent, kb: &KeyBindings) -> Option<MenuClick> {
        let open = self.open?;
        let consumed = |action| {
            Some(MenuClick {
                action,
                consumed: true,
            })
        };
        let count = self.menus.get(open).map_or(0, |m| m.entries.len());
        if kb.matches(Action::CloseMenus, key) {
            self.close_all();
            consumed(None)
        } else if kb.matches(Action::MenuUp, key) {
            if count > 0 {
                self.selected = (self.selected + count - 1) % count;
            }
            consumed(None)
        } else if kb.matches(Action::MenuDown, key) {
            if count > 0 {
                self.selected = (self.selected + 1) % count;
            }
            consumed(None)
        } else if kb.matches(Action::MenuLeft, key) {
            let total = self.menus.len();
            self.toggle((open + total - 1) % total);
            consumed(None)
        } else if kb.matches(Action::MenuRight, key) {
            self.toggle((open + 1) % self.menus.len());
            consumed(None)
        } else if kb.matches(Action::MenuSelect, key) {
            let action = self
                .menus
                .get(open)
                .and_then(|m| m.entries.get(self.selected))
                .map(|e| e.action.clone());
            self.close_all();
            consumed(action)
        } else {
            None
        }
    }
}
