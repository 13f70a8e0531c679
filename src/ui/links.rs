//! The landing page's link list.

use crate::app::App;
use crate::sequencer::OpenMode;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::panel_block;

/// Renders the links, one per row. Returns the rows' area for hit testing.
pub fn render_links(frame: &mut Frame, area: Rect, app: &App, focused: bool) -> Rect {
    let block = panel_block("Links", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .config
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let selected = focused && i == app.selected_link;
            let label_style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            // Marks links that leave the page in a new context.
            let marker = match (link.href.starts_with('#'), link.open_mode()) {
                (true, _) => " #",
                (false, OpenMode::NewTab) => " ↗",
                (false, OpenMode::SameTab) => "",
            };
            Line::from(vec![
                Span::styled(format!(" {} ", link.label), label_style),
                Span::styled(marker, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let rows = Rect {
        height: inner.height.min(lines.len() as u16),
        ..inner
    };
    frame.render_widget(Paragraph::new(lines), inner);
    rows
}
