//! Terminal user interface components.
//!
//! This module draws the landing page: the link list, the shop panel, the
//! admin mailbox, modal dialogs and the full-screen transition overlay.

mod dialogs;
mod help;
mod links;
mod overlay;
mod shop;

use crate::app::{App, FocusedPanel, LayoutRegions};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub use dialogs::{render_dm_dialog, render_login_dialog, render_product_dialog};
pub use help::render_help;
pub use links::render_links;
pub use overlay::render_overlay;
pub use shop::{render_mailbox, render_shop};

/// Width of the link column.
const LINKS_WIDTH: u16 = 28;

/// Returns the bordered block for a panel, highlighted when focused.
pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

/// Renders the complete UI and records layout regions for mouse hit testing.
///
/// Layout, top to bottom: header, body (links | shop | mailbox), status bar.
/// Dialogs draw over the body; the transition overlay draws over everything.
pub fn render(frame: &mut Frame, app: &mut App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Body
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    render_header(frame, main_chunks[0], app);

    let mut body_constraints = vec![Constraint::Length(LINKS_WIDTH), Constraint::Min(30)];
    let show_mailbox = app.shop.is_admin();
    if show_mailbox {
        body_constraints.push(Constraint::Percentage(35));
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(body_constraints)
        .split(main_chunks[1]);

    let mut layout = LayoutRegions {
        links: render_links(frame, body[0], app, app.focus == FocusedPanel::Links),
        products: render_shop(frame, body[1], app, app.focus == FocusedPanel::Shop),
        ..LayoutRegions::default()
    };
    if show_mailbox {
        layout.messages = render_mailbox(frame, body[2], app, app.focus == FocusedPanel::Mailbox);
    }
    app.layout = layout;

    render_status_bar(frame, main_chunks[2], app);

    render_login_dialog(frame, app);
    render_product_dialog(frame, app);
    render_dm_dialog(frame, app);
    if app.show_help {
        render_help(frame);
    }

    render_overlay(frame, &app.overlay());
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " MR. FLAME ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("  "));
    match app.shop.user() {
        Some(user) => {
            spans.push(Span::styled(
                format!("@{}", user.username),
                Style::default().fg(Color::Yellow),
            ));
            if app.shop.is_admin() {
                spans.push(Span::styled(" (admin)", Style::default().fg(Color::Magenta)));
            }
            spans.push(Span::styled(
                "  [L] Logout",
                Style::default().fg(Color::DarkGray),
            ));
        }
        None => spans.push(Span::styled(
            "[l] Login",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status_message {
        Some((message, _)) => Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(vec![
            Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
            Span::styled(" focus  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::styled(" open  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[f]", Style::default().fg(Color::Yellow)),
            Span::styled(" follow  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[?]", Style::default().fg(Color::Yellow)),
            Span::styled(" help  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::styled(" quit", Style::default().fg(Color::DarkGray)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Helper function to center a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
