// Teams widget: filterable team list with cursor and A/B slot markers.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the team list into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let filtered = state.filtered_teams();

    let items: Vec<ListItem> = if filtered.is_empty() {
        let hint = if state.teams.is_empty() {
            "  No teams loaded"
        } else {
            "  No teams match the filter"
        };
        vec![ListItem::new(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        filtered
            .iter()
            .map(|team| {
                let marker = slot_marker(state, team);
                let marker_style = match marker {
                    "A" => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    "B" => Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default(),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{marker} "), marker_style),
                    Span::raw((*team).clone()),
                ]))
            })
            .collect()
    };

    let title = build_title(state, filtered.len());

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    if !filtered.is_empty() {
        list_state.select(Some(state.selected_index.min(filtered.len() - 1)));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// The slot marker for a team: "A", "B", or a space.
pub fn slot_marker(state: &ViewState, team: &str) -> &'static str {
    if state.team_a.as_deref() == Some(team) {
        "A"
    } else if state.team_b.as_deref() == Some(team) {
        "B"
    } else {
        " "
    }
}

/// Build the title with filter info and pre-computed count.
fn build_title(state: &ViewState, filtered_count: usize) -> Line<'static> {
    let mut title = String::from("Teams");
    if !state.filter_text.is_empty() {
        title.push_str(&format!(" \"{}\"", state.filter_text));
    }
    title.push_str(&format!(" ({})", filtered_count));
    if state.filter_mode {
        title.push_str(" [filtering]");
    }
    Line::from(title)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_teams(teams: &[&str]) -> ViewState {
        let mut state = ViewState::default();
        state.teams = teams.iter().map(|t| t.to_string()).collect();
        state
    }

    #[test]
    fn slot_marker_reflects_selection() {
        let mut state = state_with_teams(&["Duke", "Kansas", "UConn"]);
        state.team_a = Some("Duke".into());
        state.team_b = Some("UConn".into());

        assert_eq!(slot_marker(&state, "Duke"), "A");
        assert_eq!(slot_marker(&state, "UConn"), "B");
        assert_eq!(slot_marker(&state, "Kansas"), " ");
    }

    #[test]
    fn render_does_not_panic_empty() {
        let backend = ratatui::backend::TestBackend::new(40, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_teams_and_filter() {
        let backend = ratatui::backend::TestBackend::new(40, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = state_with_teams(&["Duke", "Kansas", "North Carolina"]);
        state.team_a = Some("Duke".into());
        state.filter_text = "ka".into();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_when_filter_excludes_everything() {
        let backend = ratatui::backend::TestBackend::new(40, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = state_with_teams(&["Duke"]);
        state.filter_text = "zzz".into();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
