// Selection banner widget: the two matchup slots and any comparison error.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the selection banner into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if let Some(error) = &state.comparison_error {
        Line::from(vec![Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )])
    } else {
        Line::from(vec![
            Span::styled("A: ", Style::default().fg(Color::Cyan)),
            slot_span(state.team_a.as_deref()),
            Span::styled("  vs  ", Style::default().fg(Color::DarkGray)),
            Span::styled("B: ", Style::default().fg(Color::Magenta)),
            slot_span(state.team_b.as_deref()),
        ])
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Matchup Selection"),
    );
    frame.render_widget(paragraph, area);
}

/// Span for one slot: the team name, or a placeholder hint.
fn slot_span(team: Option<&str>) -> Span<'static> {
    match team {
        Some(name) => Span::styled(
            name.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("[select a team]", Style::default().fg(Color::DarkGray)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
