// Status bar widget: load status, team count, tab indicator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::LoadOutcome;
use crate::tui::{TabId, ViewState};

/// Render the status bar into the given area.
///
/// Layout: [load indicator] [team count] [loaded-at time] [tab bar]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    // Load indicator
    let (dot, dot_color, label) = load_indicator(state);
    spans.push(Span::styled(
        format!(" {} ", dot),
        Style::default().fg(dot_color),
    ));
    spans.push(Span::styled(label, Style::default().fg(Color::White)));

    // Team count
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("{} teams", state.teams.len()),
        Style::default().fg(Color::White),
    ));

    // Loaded-at timestamp
    if let Some(loaded_at) = state.loaded_at {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("loaded {}", loaded_at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ));
    }

    // Tab bar
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.extend(tab_spans(state.active_tab));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the load indicator dot, its color, and a short label.
pub fn load_indicator(state: &ViewState) -> (&'static str, Color, &'static str) {
    if state.loading {
        return ("●", Color::Yellow, "loading...");
    }
    let failures = state
        .sources
        .iter()
        .filter(|s| matches!(s.outcome, LoadOutcome::Failed { .. }))
        .count();
    if state.sources.is_empty() {
        ("●", Color::DarkGray, "no sources")
    } else if failures == 0 {
        ("●", Color::Green, "sources ok")
    } else {
        ("●", Color::Red, "load failures")
    }
}

/// Build tab indicator spans with descriptive labels and active tab highlighted.
/// E.g. "[1:Matchup] [2:Radar] [3:Insight] [4:Sources]"
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let tabs = [
        (TabId::Matchup, "1:Matchup"),
        (TabId::Radar, "2:Radar"),
        (TabId::Insight, "3:Insight"),
        (TabId::Sources, "4:Sources"),
    ];

    let mut spans = Vec::new();
    for (tab_id, label) in tabs {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", label), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
