// Insight widget: streams the betting insight for the compared matchup.
//
// Header: "Betting Insight -- streaming.../complete/off"
// Body: view_state.insight_text with word wrap
// Auto-scroll to bottom while streaming

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::protocol::LlmStatus;
use crate::tui::ViewState;

/// Render the insight panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title_line = build_title(state.insight_status);

    let content = if state.insight_text.is_empty() {
        placeholder_text(state)
    } else {
        state.insight_text.clone()
    };

    // Compute scroll: auto-scroll to bottom while streaming
    let inner_height = area.height.saturating_sub(2) as usize; // subtract border
    let line_count = content.lines().count();
    let scroll = if state.insight_status == LlmStatus::Streaming && line_count > inner_height {
        (line_count - inner_height) as u16
    } else {
        let offset = state.scroll_offset.get("insight").copied().unwrap_or(0);
        offset as u16
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title_line)
                .border_style(border_style(state.insight_status)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Build the title line with status indicator.
fn build_title(status: LlmStatus) -> Line<'static> {
    let (status_text, status_color) = status_indicator(status);
    Line::from(vec![
        Span::styled(
            "Betting Insight",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(" -- ", Style::default().fg(Color::DarkGray)),
        Span::styled(status_text, Style::default().fg(status_color)),
    ])
}

/// Return status text and color for the insight status.
pub fn status_indicator(status: LlmStatus) -> (&'static str, Color) {
    match status {
        LlmStatus::Idle => ("off", Color::DarkGray),
        LlmStatus::Streaming => ("streaming...", Color::Yellow),
        LlmStatus::Complete => ("complete", Color::Green),
        LlmStatus::Error => ("error", Color::Red),
    }
}

/// Border style varies by status.
fn border_style(status: LlmStatus) -> Style {
    match status {
        LlmStatus::Streaming => Style::default().fg(Color::Yellow),
        LlmStatus::Error => Style::default().fg(Color::Red),
        _ => Style::default(),
    }
}

/// Placeholder text when insight_text is empty.
fn placeholder_text(state: &ViewState) -> String {
    match state.insight_status {
        LlmStatus::Idle => "Press 'i' after comparing to generate a betting insight.".to_string(),
        LlmStatus::Streaming => "Streaming...".to_string(),
        LlmStatus::Complete => "Insight complete (empty).".to_string(),
        LlmStatus::Error => state
            .insight_error
            .clone()
            .unwrap_or_else(|| "Insight unavailable.".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
