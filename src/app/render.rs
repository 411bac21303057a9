use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{Desktop, MENU_ROWS, PaneKind, SIGN_ON_BUTTON_ROW};
use crate::desktop::blog::TreeState;
use crate::desktop::sign_on::Field;
use crate::desktop::PaneText;
use crate::keybindings::Action;
use crate::ui::{UiFrame, safe_set_string};
use crate::window::WindowKey;

const DESKTOP_BG: Color = Color::Rgb(0, 128, 128);

/// Width of the tree column inside a blog window.
pub(crate) fn tree_width(content_width: u16) -> u16 {
    (content_width / 3).max(14).min(content_width)
}

fn bar_style() -> Style {
    Style::default().bg(Color::Gray).fg(Color::Black)
}

fn pane_text_style(text: &PaneText) -> Style {
    match text {
        PaneText::Failed(_) => Style::default().fg(Color::Red),
        PaneText::Loading => Style::default().fg(Color::DarkGray),
        _ => Style::default(),
    }
}

impl Desktop {
    pub fn render(&self, frame: &mut UiFrame<'_>) {
        let root = self.root_rect();
        frame.render_widget(Block::new().style(Style::default().bg(DESKTOP_BG)), root);

        let root_size = self.host.root();
        for key in self.host.draw_order() {
            let Some(window) = self.host.window(key) else {
                continue;
            };
            let visible = window
                .placement()
                .geometry
                .visible_rect(root_size, (root.x, root.y));
            frame.render_widget(Clear, visible);
            let Some(chrome) = self.chrome_for(key) else {
                continue;
            };
            self.decorator.render_window(frame.buffer_mut(), &chrome);
            let content = chrome.content_rect();
            if content.width > 0 && content.height > 0 {
                self.render_pane(frame, key, content);
            }
        }

        self.render_menu_bar(frame);
    }

    fn render_pane(&self, frame: &mut UiFrame<'_>, key: WindowKey, area: Rect) {
        let Some(window) = self.host.window(key) else {
            return;
        };
        let surface = window.id().as_str();
        match self.panes.get(surface) {
            Some(PaneKind::Blog(blog)) => self.render_blog(frame, blog, surface, area),
            Some(PaneKind::SignOn) => self.render_sign_on(frame, area),
            Some(PaneKind::Document(name)) => {
                let text = self.blogs.document(name);
                frame.render_widget(
                    Paragraph::new(text.text())
                        .style(pane_text_style(text))
                        .wrap(Wrap { trim: false })
                        .scroll((self.scroll_offset(surface), 0)),
                    area,
                );
            }
            Some(PaneKind::Log) => {
                let lines: Vec<Line> = match &self.log {
                    Some(log) => log
                        .tail(area.height as usize)
                        .into_iter()
                        .map(Line::from)
                        .collect(),
                    None => vec![Line::from("Logging to stderr.")],
                };
                frame.render_widget(Paragraph::new(lines), area);
            }
            Some(PaneKind::About) => self.render_about(frame, area),
            None => {}
        }
    }

    fn render_blog(&self, frame: &mut UiFrame<'_>, blog: &str, surface: &str, area: Rect) {
        let Some(pane) = self.blogs.pane(blog) else {
            return;
        };
        let tree_w = tree_width(area.width);
        let tree_area = Rect { width: tree_w, ..area };
        let tree = match &pane.tree {
            TreeState::NotLoaded => Paragraph::new(""),
            TreeState::Loading => {
                Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray))
            }
            TreeState::Failed(text) => Paragraph::new(text.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            TreeState::Ready(items) => {
                let lines: Vec<Line> = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        let label = format!("{}{}", "  ".repeat(item.depth), item.label);
                        let mut style = if item.content_id.is_some() {
                            Style::default().fg(Color::Blue)
                        } else {
                            Style::default().add_modifier(Modifier::BOLD)
                        };
                        if idx == pane.selected {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Line::from(Span::styled(label, style))
                    })
                    .collect();
                Paragraph::new(lines)
            }
        };
        frame.render_widget(tree, tree_area);

        if area.width <= tree_w + 1 {
            return;
        }
        let sep_x = area.x + tree_w;
        for y in area.y..area.y + area.height {
            safe_set_string(
                frame.buffer_mut(),
                area,
                sep_x,
                y,
                "│",
                Style::default().fg(Color::DarkGray),
            );
        }
        let text_area = Rect {
            x: sep_x + 1,
            width: area.width - tree_w - 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new(pane.content.text())
                .style(pane_text_style(&pane.content))
                .wrap(Wrap { trim: false })
                .scroll((self.scroll_offset(surface), 0)),
            text_area,
        );
    }

    fn render_sign_on(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let form = &self.sign_on;
        let mut lines: Vec<Line> = Field::ALL
            .iter()
            .map(|field| {
                let value_style = if form.focus() == *field {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().add_modifier(Modifier::UNDERLINED)
                };
                Line::from(vec![
                    Span::raw(format!("{:<12}", field.label())),
                    Span::styled(format!("{:<16}", form.display_value(*field)), value_style),
                ])
            })
            .collect();
        while lines.len() < SIGN_ON_BUTTON_ROW as usize {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "[ Sign On ]",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if let Some(message) = form.message() {
            lines.push(Line::from(Span::styled(
                message.text.clone(),
                Style::default().fg(message.tone.color()),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_about(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let mut lines = vec![
            Line::from("term-desk"),
            Line::from("Drag a title bar to move, the frame to resize."),
            Line::default(),
        ];
        for action in [
            Action::OpenMenu,
            Action::CycleNextWindow,
            Action::ToggleMaximize,
            Action::CloseWindow,
            Action::Quit,
        ] {
            lines.push(Line::from(format!(
                "{:<8} {}",
                self.keys.combos_for(action).join(", "),
                action
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
    }

    fn render_menu_bar(&self, frame: &mut UiFrame<'_>) {
        let bar = Rect {
            height: MENU_ROWS.min(self.screen.height),
            ..self.screen
        };
        frame.render_widget(Block::new().style(bar_style()), bar);
        let open = self.menu.open_menu();
        for (idx, (menu, rect)) in self
            .menu
            .menus()
            .iter()
            .zip(self.menu.title_rects(bar.y))
            .enumerate()
        {
            let style = if open == Some(idx) {
                bar_style().add_modifier(Modifier::REVERSED)
            } else {
                bar_style()
            };
            safe_set_string(
                frame.buffer_mut(),
                bar,
                rect.x,
                rect.y,
                &format!(" {} ", menu.title),
                style,
            );
        }

        let mut status = String::new();
        if let Some(edge) = self.host.cursor_hint() {
            status.push_str(edge.cursor());
            status.push_str("  ");
        }
        status.push_str(self.clock.text());
        status.push(' ');
        let width = status.chars().count() as u16;
        if width < bar.width {
            safe_set_string(
                frame.buffer_mut(),
                bar,
                bar.x + bar.width - width,
                bar.y,
                &status,
                bar_style(),
            );
        }

        if let Some(index) = open
            && let Some(drop) = self.menu.dropdown_rect(index, bar.y)
            && let Some(menu) = self.menu.menus().get(index)
        {
            frame.render_widget(Clear, drop);
            let lines: Vec<Line> = menu
                .entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| {
                    let style = if idx == self.menu.selected() {
                        bar_style().add_modifier(Modifier::REVERSED)
                    } else {
                        bar_style()
                    };
                    Line::from(Span::styled(format!(" {} ", entry.label), style))
                })
                .collect();
            frame.render_widget(
                Paragraph::new(lines)
                    .style(bar_style())
                    .block(Block::new().borders(Borders::ALL).style(bar_style())),
                drop,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DesktopConfig;
    use crate::desktop::EmbeddedSource;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn screen_text(desktop: &Desktop) -> Vec<String> {
        let area = desktop.screen();
        let mut terminal = Terminal::new(TestBackend::new(area.width, area.height)).unwrap();
        terminal
            .draw(|f| {
                let mut frame = UiFrame::new(f);
                desktop.render(&mut frame);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn tree_column_has_a_floor() {
        assert_eq!(tree_width(90), 30);
        assert_eq!(tree_width(30), 14);
        assert_eq!(tree_width(10), 10);
    }

    #[test]
    fn renders_menu_bar_and_open_windows() {
        let desktop = Desktop::new(
            &DesktopConfig::default(),
            Arc::new(EmbeddedSource),
            None,
            Rect::new(0, 0, 100, 30),
        );
        let rows = screen_text(&desktop);
        assert!(rows[0].starts_with("  File   Windows   Help"));
        assert!(rows.iter().any(|row| row.contains("Random Thoughts")));
        assert!(rows.iter().any(|row| row.contains("Screen Name")));
        assert!(rows.iter().any(|row| row.contains("[ Sign On ]")));
    }

    #[test]
    fn open_menu_draws_its_entries() {
        let mut desktop = Desktop::new(
            &DesktopConfig::default(),
            Arc::new(EmbeddedSource),
            None,
            Rect::new(0, 0, 100, 30),
        );
        desktop.menu.toggle(2);
        let rows = screen_text(&desktop);
        assert!(rows[2].contains("About"));
    }
}
