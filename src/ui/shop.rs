//! Shop panel and admin mailbox.

use crate::app::App;
use crate::shop::ShopView;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use super::panel_block;

fn hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::styled(action, Style::default().fg(Color::DarkGray)),
    ]
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Renders the shop for the current login state.
///
/// Returns the product rows' area for hit testing; empty unless the
/// catalog is showing.
pub fn render_shop(frame: &mut Frame, area: Rect, app: &App, focused: bool) -> Rect {
    let block = panel_block("Shop", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let admin = app.shop.admin_username();
    match app.shop_view() {
        ShopView::Welcome => {
            let text = vec![
                Line::from(Span::styled(
                    "Welcome to the MR. FLAME fan shop!",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Login to see the merch."),
                Line::from(hint("[l]", " Login").to_vec()),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
            Rect::default()
        }
        ShopView::FollowPrompt => {
            let text = vec![
                Line::from(Span::styled(
                    format!("Follow @{} on Instagram to unlock the shop.", admin),
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(""),
                Line::from(
                    [hint("[f]", " Follow  "), hint("[l]", " Login again")].concat(),
                ),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
            Rect::default()
        }
        ShopView::Catalog => render_catalog(frame, inner, app, focused),
    }
}

fn render_catalog(frame: &mut Frame, inner: Rect, app: &App, focused: bool) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Products
            Constraint::Length(1), // Detail
            Constraint::Length(1), // Actions
        ])
        .split(inner);

    let lines: Vec<Line> = app
        .products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = selected_style(focused && i == app.selected_product);
            Line::from(vec![
                Span::styled(format!(" {:<24}", product.title), style),
                Span::styled(
                    format!(" {:>8}", product.price),
                    Style::default().fg(Color::Green),
                ),
            ])
        })
        .collect();
    let rows = Rect {
        height: chunks[0].height.min(lines.len() as u16),
        ..chunks[0]
    };
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(product) = app.selected_product() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{}  [{}]", product.desc, product.image),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
            )),
            chunks[1],
        );
    }

    let mut actions = [hint("[b]", " Buy  "), hint("[d]", " DM  ")].concat();
    if app.shop.is_admin() {
        actions.extend(
            [
                hint("[a]", " Add  "),
                hint("[e]", " Edit  "),
                hint("[x]", " Delete"),
            ]
            .concat(),
        );
    }
    frame.render_widget(Paragraph::new(Line::from(actions)), chunks[2]);

    rows
}

/// Renders the admin mailbox. Returns the message rows' area.
pub fn render_mailbox(frame: &mut Frame, area: Rect, app: &App, focused: bool) -> Rect {
    let block = panel_block("Messages", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.messages.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No visitor messages yet.",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return Rect::default();
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let lines: Vec<Line> = app
        .messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let sender = match &message.to {
                Some(to) => format!("{} → {}", message.from, to),
                None => message.from.clone(),
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} ", sender),
                    selected_style(focused && i == app.selected_message),
                ),
                Span::styled(
                    format!(" {} ", message.at.format("%d %b %H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(message.text.as_str()),
            ])
        })
        .collect();
    let rows = Rect {
        height: chunks[0].height.min(lines.len() as u16),
        ..chunks[0]
    };
    frame.render_widget(Paragraph::new(lines), chunks[0]);
    frame.render_widget(Paragraph::new(Line::from(hint("[r]", " Reply").to_vec())), chunks[1]);

    rows
}
