// Help bar widget: keyboard shortcut hints, context-sensitive for filter mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the help bar into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = help_text(state);
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// The hint line for the current input mode.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.filter_mode {
        " type to filter | Enter:Keep | Esc:Clear"
    } else {
        " q:Quit | 1-4:Tabs | j/k:Move | a/b/Enter:Select | c:Compare | i:Insight | r:Reload | /:Filter"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_text_normal_mode() {
        let state = ViewState::default();
        let text = help_text(&state);
        assert!(text.contains("c:Compare"));
        assert!(text.contains("i:Insight"));
    }

    #[test]
    fn help_text_filter_mode() {
        let mut state = ViewState::default();
        state.filter_mode = true;
        let text = help_text(&state);
        assert!(text.contains("type to filter"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
