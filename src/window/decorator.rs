use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};

use super::ResizeEdge;
use crate::geometry::rect_contains;

/// Everything a decorator needs to draw one window's chrome, in screen cells.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    /// Outer frame; may extend past `bounds` on any side.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Drawing is clipped to this rect.
    pub bounds: Rect,
    pub title: &'a str,
    pub focused: bool,
    pub maximized: bool,
    pub highlight: Option<ResizeEdge>,
    pub button_width: i32,
}

impl Chrome<'_> {
    /// Inner content rect on screen, clipped to the bounds.
    pub fn content_rect(&self) -> Rect {
        let x = self.x + 1;
        let y = self.y + 2;
        let right = self.x + self.width - 1;
        let bottom = self.y + self.height - 1;
        clip(x, y, right, bottom, self.bounds)
    }
}

pub trait WindowDecorator: std::fmt::Debug {
    fn render_window(&self, buffer: &mut Buffer, chrome: &Chrome<'_>);
}

fn clip(left: i32, top: i32, right: i32, bottom: i32, bounds: Rect) -> Rect {
    let left = left.max(bounds.x as i32);
    let top = top.max(bounds.y as i32);
    let right = right.min(bounds.x as i32 + bounds.width as i32);
    let bottom = bottom.min(bounds.y as i32 + bounds.height as i32);
    if right <= left || bottom <= top {
        return Rect::default();
    }
    Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    }
}

/// Single-line frame with a filled title row and `[□]` / `[x]` buttons.
#[derive(Debug, Default)]
pub struct DefaultDecorator;

impl WindowDecorator for DefaultDecorator {
    fn render_window(&self, buffer: &mut Buffer, chrome: &Chrome<'_>) {
        if chrome.width < 2 || chrome.height < 2 {
            return;
        }
        let bounds = chrome.bounds;
        let mut put = |x: i32, y: i32, symbol: &str, style: Style| {
            if x < 0 || y < 0 || x > u16::MAX as i32 || y > u16::MAX as i32 {
                return;
            }
            let (x, y) = (x as u16, y as u16);
            if rect_contains(bounds, x, y)
                && let Some(cell) = buffer.cell_mut((x, y))
            {
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        };

        let header_style = if chrome.focused {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        };
        let border_style = Style::default().fg(Color::DarkGray);
        let hot_style = Style::default().fg(Color::Yellow);

        let left = chrome.x;
        let top = chrome.y;
        let right = chrome.x + chrome.width - 1;
        let bottom = chrome.y + chrome.height - 1;
        let edge = chrome.highlight;
        let hot = |h: i32, v: i32| {
            edge.is_some_and(|e| (h != 0 && e.horizontal() == h) || (v != 0 && e.vertical() == v))
        };
        let style_for = |h: i32, v: i32| if hot(h, v) { hot_style } else { border_style };

        for x in left..=right {
            let (sym_top, sym_bottom) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            let h = if x == left {
                -1
            } else if x == right {
                1
            } else {
                0
            };
            put(x, top, sym_top, style_for(h, -1));
            put(x, bottom, sym_bottom, style_for(h, 1));
        }
        for y in top + 1..bottom {
            put(left, y, "│", style_for(-1, 0));
            put(right, y, "│", style_for(1, 0));
        }

        // Header row
        let header_y = top + 1;
        if header_y >= bottom {
            return;
        }
        for x in left + 1..right {
            put(x, header_y, " ", header_style);
        }
        let bw = chrome.button_width;
        let close_x = right - bw;
        let max_x = close_x - bw;
        let title_room = (max_x - left - 1).max(0) as usize;
        let title: String = chrome.title.chars().take(title_room).collect();
        let title_len = title.chars().count() as i32;
        let start = left + 1 + (title_room as i32 - title_len) / 2;
        for (idx, ch) in title.chars().enumerate() {
            put(start + idx as i32, header_y, &ch.to_string(), header_style);
        }
        if max_x > left {
            let max_label = if chrome.maximized { "[▫]" } else { "[□]" };
            for (idx, ch) in max_label.chars().enumerate().take(bw.max(0) as usize) {
                put(max_x + idx as i32, header_y, &ch.to_string(), header_style);
            }
            for (idx, ch) in "[x]".chars().enumerate().take(bw.max(0) as usize) {
                put(close_x + idx as i32, header_y, &ch.to_string(), header_style);
            }
        }
    }
}
