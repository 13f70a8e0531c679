//! The full-screen transition overlay.

use crate::sequencer::OverlayState;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

/// Covers the whole frame with the overlay message while it is visible.
pub fn render_overlay(frame: &mut Frame, state: &OverlayState) {
    if !state.visible {
        return;
    }

    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1), // Message
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Spinner line
            Constraint::Fill(1),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            state.message.as_str(),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "· · ·",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center),
        rows[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(state: &OverlayState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 9)).unwrap();
        terminal.draw(|frame| render_overlay(frame, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_visible_overlay_shows_message() {
        let state = OverlayState {
            visible: true,
            message: "Respawning...".to_string(),
        };
        assert!(draw(&state).contains("Respawning..."));
    }

    #[test]
    fn test_hidden_overlay_draws_nothing() {
        let state = OverlayState {
            visible: false,
            message: "Respawning...".to_string(),
        };
        assert!(!draw(&state).contains("Respawning"));
    }
}
