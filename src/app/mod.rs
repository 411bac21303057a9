//! The desktop: the window host plus its collaborators, driven by crossterm
//! events.
//!
//! Screen row 0 is the menu bar; the bounding root of the host starts on row
//! 1. Everything the host sees is translated into root coordinates here.

mod render;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use crossterm::event::{
    Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::DesktopConfig;
use crate::desktop::menu::MenuClick;
use crate::desktop::{
    BlogLoader, Clock, ContentSource, Menu, MenuAction, MenuBar, MenuEntry, SignOnForm,
    SignOnOutcome,
};
use crate::geometry::{Geometry, Point, Size, rect_contains};
use crate::keybindings::{Action, KeyBindings};
use crate::log_buffer::LogHandle;
use crate::window::decorator::{Chrome, DefaultDecorator, WindowDecorator};
use crate::window::{PointerDown, SurfaceSpec, WindowHost, WindowKey};

pub const MENU_ROWS: u16 = 1;

pub const LOGIN_SURFACE: &str = "login";
pub const WHATS_NEW_SURFACE: &str = "whatsnew";
pub const LOG_SURFACE: &str = "log";
pub const ABOUT_SURFACE: &str = "about";

/// Row of the sign-on button inside the form.
const SIGN_ON_BUTTON_ROW: u16 = 4;

/// What a window's content area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneKind {
    Blog(String),
    SignOn,
    Document(String),
    Log,
    About,
}

pub struct Desktop {
    host: WindowHost,
    menu: MenuBar,
    clock: Clock,
    sign_on: SignOnForm,
    blogs: BlogLoader,
    log: Option<LogHandle>,
    log_seen: u64,
    panes: BTreeMap<String, PaneKind>,
    scroll: BTreeMap<String, u16>,
    decorator: Box<dyn WindowDecorator>,
    keys: KeyBindings,
    screen: Rect,
    dirty: bool,
    quit: bool,
}

impl std::fmt::Debug for Desktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desktop")
            .field("host", &self.host)
            .field("screen", &self.screen)
            .field("quit", &self.quit)
            .finish_non_exhaustive()
    }
}

fn root_size(screen: Rect) -> Size {
    Size::new(
        screen.width as i32,
        screen.height.saturating_sub(MENU_ROWS) as i32,
    )
}

impl Desktop {
    pub fn new(
        config: &DesktopConfig,
        source: Arc<dyn ContentSource>,
        log: Option<LogHandle>,
        screen: Rect,
    ) -> Self {
        let mut host = WindowHost::new(root_size(screen), config.metrics);
        host.set_edge_maximize(config.edge_maximize);

        let mut panes = BTreeMap::new();
        let mut window_entries = Vec::new();
        for (idx, blog) in config.blogs.iter().enumerate() {
            let offset = 4 * idx as i32;
            host.declare_surface(SurfaceSpec::new(
                blog.surface.clone(),
                blog.title.clone(),
                Geometry::new(2 + offset, 1 + offset, 64, 18),
            ));
            panes.insert(blog.surface.clone(), PaneKind::Blog(blog.id.clone()));
            window_entries.push(MenuEntry::open(blog.title.clone(), blog.surface.clone()));
        }
        host.declare_surface(SurfaceSpec::new(
            WHATS_NEW_SURFACE,
            "What's New",
            Geometry::new(30, 3, 44, 14),
        ));
        panes.insert(
            WHATS_NEW_SURFACE.to_string(),
            PaneKind::Document(config.whats_new.clone()),
        );
        host.declare_surface(
            SurfaceSpec::new(LOGIN_SURFACE, "Sign On", Geometry::new(24, 5, 30, 8))
                .with_natural_size(Size::new(40, 10)),
        );
        panes.insert(LOGIN_SURFACE.to_string(), PaneKind::SignOn);
        host.declare_surface(SurfaceSpec::new(
            LOG_SURFACE,
            "Log",
            Geometry::new(4, 10, 76, 12),
        ));
        panes.insert(LOG_SURFACE.to_string(), PaneKind::Log);
        host.declare_surface(SurfaceSpec::new(
            ABOUT_SURFACE,
            "About",
            Geometry::new(18, 6, 44, 11),
        ));
        panes.insert(ABOUT_SURFACE.to_string(), PaneKind::About);

        window_entries.push(MenuEntry::open("What's New", WHATS_NEW_SURFACE));
        window_entries.push(MenuEntry::open("Log", LOG_SURFACE));
        let menu = MenuBar::new(vec![
            Menu::new(
                "File",
                vec![
                    MenuEntry::open("Sign On", LOGIN_SURFACE),
                    MenuEntry::quit("Quit"),
                ],
            ),
            Menu::new("Windows", window_entries),
            Menu::new("Help", vec![MenuEntry::open("About", ABOUT_SURFACE)]),
        ]);

        let mut blogs = BlogLoader::new(source, config.blogs.clone());
        blogs.load_trees();
        blogs.load_document(&config.whats_new);

        let mut desktop = Self {
            host,
            menu,
            clock: Clock::new(),
            sign_on: SignOnForm::new(),
            blogs,
            log,
            log_seen: 0,
            panes,
            scroll: BTreeMap::new(),
            decorator: Box::new(DefaultDecorator),
            keys: KeyBindings::default(),
            screen,
            dirty: true,
            quit: false,
        };
        if let Some(first) = config.blogs.first() {
            desktop.host.open_by_id(&first.surface);
        }
        desktop.host.open_by_id(LOGIN_SURFACE);
        desktop
    }

    pub fn host(&self) -> &WindowHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut WindowHost {
        &mut self.host
    }

    pub fn blogs(&self) -> &BlogLoader {
        &self.blogs
    }

    pub fn blogs_mut(&mut self) -> &mut BlogLoader {
        &mut self.blogs
    }

    pub fn sign_on(&self) -> &SignOnForm {
        &self.sign_on
    }

    pub fn menu(&self) -> &MenuBar {
        &self.menu
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn set_decorator(&mut self, decorator: Box<dyn WindowDecorator>) {
        self.decorator = decorator;
        self.dirty = true;
    }

    pub fn pane_for(&self, key: WindowKey) -> Option<&PaneKind> {
        let window = self.host.window(key)?;
        self.panes.get(window.id().as_str())
    }

    /// Open a window by surface id from outside the menu (the "page script"
    /// entry point).
    pub fn open(&mut self, surface: &str) -> Option<WindowKey> {
        self.dirty = true;
        self.host.open_by_id(surface)
    }

    /// Periodic housekeeping: apply finished fetches, advance the clock and
    /// notice new log lines. Returns true when a redraw is due.
    pub fn tick<Tz: TimeZone>(&mut self, now: DateTime<Tz>) -> bool
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut redraw = std::mem::take(&mut self.dirty);
        redraw |= self.blogs.poll();
        redraw |= self.clock.tick(now);
        if let Some(log) = &self.log {
            let pushed = log.total_pushed();
            if pushed != self.log_seen {
                self.log_seen = pushed;
                redraw |= self.is_open(LOG_SURFACE);
            }
        }
        redraw
    }

    fn is_open(&self, surface: &str) -> bool {
        self.host
            .lookup_by_id(surface)
            .and_then(|key| self.host.window(key))
            .is_some_and(|window| window.is_visible())
    }

    /// Route one input event. Returns true when the screen needs a redraw.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Key(key) => self.handle_key(key),
            Event::Resize(width, height) => {
                self.resize(Rect::new(0, 0, *width, *height));
                true
            }
            _ => false,
        }
    }

    pub fn resize(&mut self, screen: Rect) {
        self.screen = screen;
        self.host.resize_root(root_size(screen));
        self.dirty = true;
    }

    fn to_root(&self, column: u16, row: u16) -> Point {
        Point::new(
            column as i32 - self.screen.x as i32,
            row as i32 - (self.screen.y + MENU_ROWS) as i32,
        )
    }

    pub(crate) fn root_rect(&self) -> Rect {
        Rect {
            x: self.screen.x,
            y: self.screen.y.saturating_add(MENU_ROWS),
            width: self.screen.width,
            height: self.screen.height.saturating_sub(MENU_ROWS),
        }
    }

    /// On-screen chrome of a window, from its last pushed placement.
    pub(crate) fn chrome_for(&self, key: WindowKey) -> Option<Chrome<'_>> {
        let window = self.host.window(key)?;
        let root = self.root_rect();
        let geometry = window.placement().geometry;
        Some(Chrome {
            x: geometry.x + root.x as i32,
            y: geometry.y + root.y as i32,
            width: geometry.width,
            height: geometry.height,
            bounds: root,
            title: window.title(),
            focused: window.is_active(),
            maximized: window.is_maximized(),
            highlight: window.resize_edge(),
            button_width: self.host.metrics().button_width,
        })
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let point = self.to_root(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let click = self.menu.click(mouse.column, mouse.row, self.screen.y);
                if click.consumed {
                    self.apply_menu(click);
                    return true;
                }
                let down = self.host.pointer_down(point);
                tracing::trace!(?down, "pointer down");
                if let PointerDown::Focused(key) = down {
                    self.content_click(key, mouse.column, mouse.row);
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let hint = self.host.cursor_hint();
                self.host.pointer_move(point) || hint != self.host.cursor_hint()
            }
            MouseEventKind::Moved => {
                let hint = self.host.cursor_hint();
                self.host.pointer_move(point);
                hint != self.host.cursor_hint()
            }
            MouseEventKind::Up(MouseButton::Left) => self.host.pointer_up(),
            MouseEventKind::ScrollDown => self.scroll_under(point, true),
            MouseEventKind::ScrollUp => self.scroll_under(point, false),
            _ => false,
        }
    }

    fn scroll_under(&mut self, point: Point, down: bool) -> bool {
        let Some((key, _)) = self.host.hit_test(point) else {
            return false;
        };
        let Some(window) = self.host.window(key) else {
            return false;
        };
        let id = window.id().as_str().to_string();
        let offset = self.scroll.entry(id).or_insert(0);
        *offset = if down {
            offset.saturating_add(1)
        } else {
            offset.saturating_sub(1)
        };
        true
    }

    pub(crate) fn scroll_offset(&self, surface: &str) -> u16 {
        self.scroll.get(surface).copied().unwrap_or(0)
    }

    fn apply_menu(&mut self, click: MenuClick) {
        match click.action {
            Some(MenuAction::Open(surface)) => {
                if self.host.open_by_id(&surface).is_none() {
                    tracing::warn!(surface = %surface, "menu entry names no window");
                }
            }
            Some(MenuAction::Quit) => self.quit = true,
            None => {}
        }
    }

    /// A press that landed on a window's content area.
    fn content_click(&mut self, key: WindowKey, column: u16, row: u16) {
        let Some(area) = self.chrome_for(key).map(|chrome| chrome.content_rect()) else {
            return;
        };
        if !rect_contains(area, column, row) {
            return;
        }
        let (local_x, local_y) = (column - area.x, row - area.y);
        match self.pane_for(key).cloned() {
            Some(PaneKind::Blog(blog)) => {
                if local_x < render::tree_width(area.width)
                    && self.blogs.activate_index(&blog, local_y as usize)
                    && let Some(surface) = self.host.window(key).map(|w| w.id().to_string())
                {
                    self.scroll.remove(&surface);
                }
            }
            Some(PaneKind::SignOn) => {
                if let Some(field) = crate::desktop::sign_on::Field::ALL.get(local_y as usize) {
                    self.sign_on.set_focus(*field);
                } else if local_y == SIGN_ON_BUTTON_ROW {
                    self.submit_sign_on();
                }
            }
            _ => {}
        }
    }

    fn submit_sign_on(&mut self) {
        if self.sign_on.submit() == SignOnOutcome::Accepted
            && let Some(key) = self.host.lookup_by_id(LOGIN_SURFACE)
        {
            self.host.hide(key);
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if self.keys.matches(Action::Quit, key) {
            self.quit = true;
            return true;
        }
        if let Some(click) = self.menu.handle_key(key, &self.keys) {
            self.apply_menu(click);
            return true;
        }
        if self.keys.matches(Action::OpenMenu, key) {
            self.menu.toggle(0);
            return true;
        }
        if self.keys.matches(Action::CycleNextWindow, key) {
            let back = self
                .host
                .draw_order()
                .into_iter()
                .find(|k| Some(*k) != self.host.active_window());
            if let Some(back) = back {
                self.host.focus(Some(back));
            }
            return true;
        }
        let Some(active) = self.host.active_window() else {
            return false;
        };
        if self.keys.matches(Action::CloseWindow, key) {
            self.host.hide(active);
            return true;
        }
        if self.keys.matches(Action::ToggleMaximize, key) {
            self.host.maximize(active);
            return true;
        }
        match self.pane_for(active).cloned() {
            Some(PaneKind::SignOn) => {
                if self.sign_on.handle_key(key) == Some(SignOnOutcome::Accepted)
                    && let Some(login) = self.host.lookup_by_id(LOGIN_SURFACE)
                {
                    self.host.hide(login);
                }
                true
            }
            Some(PaneKind::Blog(blog)) => self.blog_key(&blog, key),
            _ => false,
        }
    }

    fn blog_key(&mut self, blog: &str, key: &KeyEvent) -> bool {
        let Some(pane) = self.blogs.pane_mut(blog) else {
            return false;
        };
        let count = pane.items().len();
        if count == 0 {
            return false;
        }
        if self.keys.matches(Action::TreeUp, key) {
            pane.selected = pane.selected.saturating_sub(1);
            true
        } else if self.keys.matches(Action::TreeDown, key) {
            pane.selected = (pane.selected + 1).min(count - 1);
            true
        } else if self.keys.matches(Action::TreeOpen, key) {
            let index = pane.selected;
            self.blogs.activate_index(blog, index)
        } else {
            false
        }
    }
}
