//! Help popup rendering.
//!
//! Displays keyboard and mouse shortcuts in a modal popup.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Key binding entry for the help display.
struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

const fn binding(key: &'static str, description: &'static str) -> KeyBinding {
    KeyBinding { key, description }
}

const GENERAL_BINDINGS: &[KeyBinding] = &[
    binding("?", "Toggle this help"),
    binding("q / Ctrl+C", "Quit"),
    binding("Tab", "Cycle focus between panels"),
    binding("j k / Up Down", "Move selection"),
    binding("Esc", "Cancel the running transition"),
];

const LINK_BINDINGS: &[KeyBinding] = &[
    binding("Enter", "Open link (with transition)"),
    binding("o", "Open link in new tab (no transition)"),
    binding("f", "Follow on Instagram"),
    binding("m", "DM on Instagram"),
];

const SHOP_BINDINGS: &[KeyBinding] = &[
    binding("l / L", "Login / Logout"),
    binding("b", "Buy selected product"),
    binding("d", "Message the admin about it"),
    binding("a / e / x", "Add / edit / delete (admin)"),
    binding("r", "Reply to message (admin)"),
];

const MOUSE_BINDINGS: &[KeyBinding] = &[
    binding("Click", "Open link / select row"),
    binding("Ctrl+Click", "Open link in new tab"),
    binding("Middle-click", "Open link in new tab"),
];

/// Renders the help popup.
pub fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help - Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (title, bindings) in [
        ("General", GENERAL_BINDINGS),
        ("Links", LINK_BINDINGS),
        ("Shop", SHOP_BINDINGS),
        ("Mouse", MOUSE_BINDINGS),
    ] {
        lines.push(Line::from(Span::styled(title, section_style)));
        for binding in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("{:16}", binding.key), key_style),
                Span::styled(binding.description, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Close: ?/Esc",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        chunks[1],
    );
}
