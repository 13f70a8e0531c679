//! Modal dialogs for login, product editing and messages.

use crate::app::{App, DmTarget, ProductField};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::centered_rect;

/// Opens a cleared, bordered popup and returns its inner area.
fn popup(frame: &mut Frame, title: &str, percent_x: u16, percent_y: u16) -> Rect {
    let area = centered_rect(percent_x, percent_y, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// A text input line with a cursor when active.
fn input_line<'a>(label: &'a str, value: &'a str, active: bool) -> Line<'a> {
    let label_style = if active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(format!("{:<12}", label), label_style),
        Span::styled(value, Style::default().fg(Color::White)),
    ];
    if active {
        spans.push(Span::styled(
            "_",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    Line::from(spans)
}

fn instructions(keys: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().fg(Color::Yellow)),
                Span::styled(*action, Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    Paragraph::new(Line::from(spans))
}

/// Renders the simulated login dialog.
pub fn render_login_dialog(frame: &mut Frame, app: &App) {
    let dialog = &app.login_dialog;
    if !dialog.open {
        return;
    }

    let inner = popup(frame, "Login (simulation)", 50, 30);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Username
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Follows checkbox
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Instructions
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(input_line("Username:", &dialog.username, true)),
        chunks[0],
    );

    let checkbox = if dialog.follows { "[x]" } else { "[ ]" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(checkbox, Style::default().fg(Color::Green)),
            Span::raw(format!(" I follow @{}", app.shop.admin_username())),
        ])),
        chunks[2],
    );

    frame.render_widget(
        instructions(&[
            ("[Enter]", " Login  "),
            ("[Tab]", " Toggle follow  "),
            ("[Esc]", " Cancel"),
        ]),
        chunks[4],
    );
}

/// Renders the add/edit product dialog.
pub fn render_product_dialog(frame: &mut Frame, app: &App) {
    let dialog = &app.product_dialog;
    if !dialog.open {
        return;
    }

    let title = if dialog.editing.is_some() {
        "Edit Product"
    } else {
        "Add Product"
    };
    let inner = popup(frame, title, 60, 40);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Fields
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Instructions
        ])
        .split(inner);

    let draft = &dialog.draft;
    let fields = [
        (ProductField::Title, draft.title.as_str()),
        (ProductField::Price, draft.price.as_str()),
        (ProductField::Image, draft.image.as_str()),
        (ProductField::Desc, draft.desc.as_str()),
    ];
    let lines: Vec<Line> = fields
        .iter()
        .map(|(field, value)| input_line(field.label(), value, *field == dialog.field))
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    frame.render_widget(
        instructions(&[
            ("[Enter]", " Save  "),
            ("[Tab]", " Next field  "),
            ("[Esc]", " Cancel"),
        ]),
        chunks[2],
    );
}

/// Renders the DM dialog, for a visitor's message or an admin reply.
pub fn render_dm_dialog(frame: &mut Frame, app: &App) {
    let dialog = &app.dm_dialog;
    if !dialog.open {
        return;
    }

    let (title, to) = match &dialog.target {
        Some(DmTarget::Product { title, .. }) => (
            format!("Message about: {}", title),
            format!("To: @{} (admin)", app.shop.admin_username()),
        ),
        Some(DmTarget::Reply { to, .. }) => (format!("Reply to {}", to), format!("To: {}", to)),
        None => return,
    };

    let inner = popup(frame, &title, 60, 35);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Recipient
            Constraint::Length(1), // Spacer
            Constraint::Min(2),    // Text
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(to, Style::default().fg(Color::Gray))),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(dialog.text.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .wrap(Wrap { trim: false }),
        chunks[2],
    );
    frame.render_widget(
        instructions(&[("[Enter]", " Send  "), ("[Esc]", " Cancel")]),
        chunks[3],
    );
}
