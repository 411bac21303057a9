use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    CloseMenus,
    OpenMenu,
    CycleNextWindow,
    CloseWindow,
    ToggleMaximize,
    // Menu navigation
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
    MenuSelect,
    // Blog tree navigation
    TreeUp,
    TreeDown,
    TreeOpen,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::CloseMenus => "Close menus",
            Action::OpenMenu => "Open menu bar",
            Action::CycleNextWindow => "Focus next window",
            Action::CloseWindow => "Close window",
            Action::ToggleMaximize => "Maximize / restore window",
            Action::MenuUp => "Menu up",
            Action::MenuDown => "Menu down",
            Action::MenuLeft => "Previous menu",
            Action::MenuRight => "Next menu",
            Action::MenuSelect => "Menu select",
            Action::TreeUp => "Previous entry",
            Action::TreeDown => "Next entry",
            Action::TreeOpen => "Open entry",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{}", n),
            other => format!("{:?}", other),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(CloseMenus, KeyCombo::plain(KeyCode::Esc));
        kb.add(OpenMenu, KeyCombo::plain(KeyCode::F(10)));
        kb.add(
            CycleNextWindow,
            KeyCombo::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
        );
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        kb.add(ToggleMaximize, KeyCombo::plain(KeyCode::F(11)));
        // Menu navigation
        kb.add(MenuUp, KeyCombo::plain(KeyCode::Up));
        kb.add(MenuDown, KeyCombo::plain(KeyCode::Down));
        kb.add(MenuLeft, KeyCombo::plain(KeyCode::Left));
        kb.add(MenuRight, KeyCombo::plain(KeyCode::Right));
        kb.add(MenuSelect, KeyCombo::plain(KeyCode::Enter));
        // Blog tree
        kb.add(TreeUp, KeyCombo::plain(KeyCode::Up));
        kb.add(TreeUp, KeyCombo::plain(KeyCode::Char('k')));
        kb.add(TreeDown, KeyCombo::plain(KeyCode::Down));
        kb.add(TreeDown, KeyCombo::plain(KeyCode::Char('j')));
        kb.add(TreeOpen, KeyCombo::plain(KeyCode::Enter));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// Display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::default();
        let ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &ev));
        assert!(!kb.matches(Action::Quit, &KeyEvent::from(KeyCode::Char('q'))));
    }

    #[test]
    fn combos_render_for_status_hints() {
        let kb = KeyBindings::default();
        assert_eq!(kb.combos_for(Action::CloseWindow), vec!["Ctrl+W".to_string()]);
        assert_eq!(kb.combos_for(Action::OpenMenu), vec!["F10".to_string()]);
    }

    #[test]
    fn maximize_is_not_bound_to_enter_aliases() {
        let kb = KeyBindings::default();
        assert!(kb.matches(Action::ToggleMaximize, &KeyEvent::from(KeyCode::F(11))));
        // Ctrl+M reaches legacy terminals as a bare Enter.
        let enter = KeyEvent::from(KeyCode::Enter);
        assert!(!kb.matches(Action::ToggleMaximize, &enter));
        let ctrl_m = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL);
        assert!(!kb.matches(Action::ToggleMaximize, &ctrl_m));
    }
}
