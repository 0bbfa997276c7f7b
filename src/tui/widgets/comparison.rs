// Comparison widget: per-dataset metric tables for the compared matchup.
//
// Each dataset renders as a heading followed by metric lines with one column
// per team; the whole panel scrolls as a single block.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::protocol::MatchupView;
use crate::tui::ViewState;

/// Width of the metric name column.
const METRIC_WIDTH: usize = 18;
/// Width of each team value column.
const VALUE_WIDTH: usize = 14;

/// Render the comparison panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (title, lines) = match &state.matchup {
        Some(view) => (
            format!("Matchup: {} vs {}", view.team_a, view.team_b),
            build_lines(view),
        ),
        None => (
            "Matchup".to_string(),
            vec![Line::from(Span::styled(
                "Select two teams and press 'c' to compare.",
                Style::default().fg(Color::DarkGray),
            ))],
        ),
    };

    let scroll = state.scroll_offset.get("matchup").copied().unwrap_or(0);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Build the styled lines for a comparison view.
pub fn build_lines(view: &MatchupView) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if view.tables.is_empty() {
        lines.push(Line::from(Span::styled(
            "No shared datasets for these teams.",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    // Column header once at the top.
    lines.push(Line::from(vec![
        Span::raw(pad("", METRIC_WIDTH)),
        Span::styled(
            pad(&view.team_a, VALUE_WIDTH),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            pad(&view.team_b, VALUE_WIDTH),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::default());

    for table in &view.tables {
        lines.push(Line::from(Span::styled(
            format!("{} Metrics", table.dataset),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for row in &table.rows {
            lines.push(Line::from(vec![
                Span::styled(
                    pad(&row.metric, METRIC_WIDTH),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(pad(&row.a, VALUE_WIDTH)),
                Span::raw(pad(&row.b, VALUE_WIDTH)),
            ]));
        }
        lines.push(Line::default());
    }

    lines
}

/// Pad or truncate a cell to a fixed display width.
fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
