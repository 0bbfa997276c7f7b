// Sources widget: per-source load outcomes.
//
// Rendered twice: compact in the sidebar, detailed (with failure messages)
// as a main panel tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use crate::protocol::{DatasetStatus, LoadOutcome};
use crate::tui::ViewState;

/// Render the detailed sources table into the main panel.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let header = Row::new(vec![
        Cell::from("Dataset"),
        Cell::from("Rows"),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(0);

    let rows: Vec<Row> = if state.sources.is_empty() {
        vec![Row::new(vec![Cell::from("  No sources configured")])]
    } else {
        state
            .sources
            .iter()
            .map(|status| {
                let (rows_text, status_text, color) = describe(status);
                Row::new(vec![
                    Cell::from(status.name.clone()),
                    Cell::from(rows_text),
                    Cell::from(status_text).style(Style::default().fg(color)),
                ])
            })
            .collect()
    };

    let widths = [
        ratatui::layout::Constraint::Min(16),
        ratatui::layout::Constraint::Length(8),
        ratatui::layout::Constraint::Min(24),
    ];

    let title = match state.loaded_at {
        Some(at) => format!("Sources (loaded {})", at.format("%H:%M:%S")),
        None => "Sources".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// Render the compact sidebar variant: name and a one-word status.
pub fn render_sidebar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows: Vec<Row> = if state.sources.is_empty() {
        vec![Row::new(vec![Cell::from("  none")])]
    } else {
        state
            .sources
            .iter()
            .map(|status| {
                let (ok, color) = match &status.outcome {
                    LoadOutcome::Loaded { .. } => ("ok", Color::Green),
                    LoadOutcome::Failed { .. } => ("failed", Color::Red),
                };
                Row::new(vec![
                    Cell::from(status.name.clone()),
                    Cell::from(ok).style(Style::default().fg(color)),
                ])
            })
            .collect()
    };

    let widths = [
        ratatui::layout::Constraint::Min(12),
        ratatui::layout::Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Sources"),
    );
    frame.render_widget(table, area);
}

/// Row count text, status text, and status color for one source.
pub fn describe(status: &DatasetStatus) -> (String, String, Color) {
    match &status.outcome {
        LoadOutcome::Loaded { rows } => (rows.to_string(), "loaded".to_string(), Color::Green),
        LoadOutcome::Failed { message } => ("-".to_string(), message.clone(), Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(name: &str, rows: usize) -> DatasetStatus {
        DatasetStatus {
            name: name.into(),
            outcome: LoadOutcome::Loaded { rows },
        }
    }

    fn failed(name: &str, message: &str) -> DatasetStatus {
        DatasetStatus {
            name: name.into(),
            outcome: LoadOutcome::Failed {
                message: message.into(),
            },
        }
    }

    #[test]
    fn describe_loaded() {
        let (rows, status, color) = describe(&loaded("Summary", 364));
        assert_eq!(rows, "364");
        assert_eq!(status, "loaded");
        assert_eq!(color, Color::Green);
    }

    #[test]
    fn describe_failed_carries_message() {
        let (rows, status, color) = describe(&failed("Height", "fetch timed out after 10s"));
        assert_eq!(rows, "-");
        assert!(status.contains("timed out"));
        assert_eq!(color, Color::Red);
    }

    #[test]
    fn render_does_not_panic_empty() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| {
                render(frame, frame.area(), &state);
            })
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_sources() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.loaded_at = Some(chrono::Local::now());
        state.sources = vec![
            loaded("Summary", 364),
            loaded("Defense", 360),
            failed("Height", "connection refused"),
        ];
        terminal
            .draw(|frame| {
                render(frame, frame.area(), &state);
            })
            .unwrap();
    }

    #[test]
    fn render_sidebar_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.sources = vec![loaded("Summary", 364), failed("Height", "boom")];
        terminal
            .draw(|frame| {
                render_sidebar(frame, frame.area(), &state);
            })
            .unwrap();
    }
}
