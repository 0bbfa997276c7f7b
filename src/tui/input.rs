// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (e.g. tab switching,
// list navigation, filtering, slot assignment).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{TabId, ViewState};
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (e.g. Compare, RequestInsight, Quit). Returns `None`
/// when the key press was handled locally by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Quit confirmation mode: only y/q confirm, n/Esc cancel, everything else blocked
    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    // Filter mode: capture printable characters and special keys
    if view_state.filter_mode {
        return handle_filter_mode(key_event, view_state);
    }

    // Normal mode key dispatch
    match key_event.code {
        // Tab switching
        KeyCode::Char('1') => {
            view_state.active_tab = TabId::Matchup;
            None
        }
        KeyCode::Char('2') => {
            view_state.active_tab = TabId::Radar;
            None
        }
        KeyCode::Char('3') => {
            view_state.active_tab = TabId::Insight;
            None
        }
        KeyCode::Char('4') => {
            view_state.active_tab = TabId::Sources;
            None
        }

        // Team list navigation
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected_index = view_state.selected_index.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = view_state.filtered_teams().len();
            if len > 0 && view_state.selected_index + 1 < len {
                view_state.selected_index += 1;
            }
            None
        }

        // Main panel scrolling
        KeyCode::PageUp => {
            scroll_up(view_state, page_size());
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, page_size());
            None
        }
        KeyCode::Char('[') => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Char(']') => {
            scroll_down(view_state, 1);
            None
        }

        // Slot assignment
        KeyCode::Char('a') => {
            view_state.team_a = view_state.cursor_team();
            None
        }
        KeyCode::Char('b') => {
            view_state.team_b = view_state.cursor_team();
            None
        }
        // Enter fills the first empty slot.
        KeyCode::Enter => {
            if let Some(team) = view_state.cursor_team() {
                if view_state.team_a.is_none() {
                    view_state.team_a = Some(team);
                } else {
                    view_state.team_b = Some(team);
                }
            }
            None
        }
        KeyCode::Char('x') => {
            view_state.team_a = None;
            view_state.team_b = None;
            view_state.comparison_error = None;
            None
        }

        // Compare the two selected teams
        KeyCode::Char('c') => match (&view_state.team_a, &view_state.team_b) {
            (Some(a), Some(b)) => Some(UserCommand::Compare {
                team_a: a.clone(),
                team_b: b.clone(),
            }),
            _ => {
                view_state.comparison_error =
                    Some("Select two teams before comparing".to_string());
                None
            }
        },

        // Insight and reload commands
        KeyCode::Char('i') => Some(UserCommand::RequestInsight),
        KeyCode::Char('r') => Some(UserCommand::ReloadSources),

        // Filter mode entry
        KeyCode::Char('/') => {
            view_state.filter_mode = true;
            None
        }

        // Escape: clear filter text if any, otherwise no-op
        KeyCode::Esc => {
            view_state.filter_text.clear();
            view_state.clamp_cursor();
            None
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// In quit confirmation mode:
/// - `y` or `q` confirms quit (sends UserCommand::Quit)
/// - `n` or `Esc` cancels (returns to normal mode)
/// - All other keys are blocked (no-op)
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None, // Block all other input
    }
}

/// Handle key events while in filter mode.
///
/// In filter mode:
/// - Printable characters are appended to filter_text
/// - Backspace removes the last character
/// - Enter or Esc exits filter mode
fn handle_filter_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.filter_mode = false;
            // Clear filter text on Esc
            view_state.filter_text.clear();
            view_state.clamp_cursor();
            None
        }
        KeyCode::Enter => {
            view_state.filter_mode = false;
            // Keep the filter text on Enter
            None
        }
        KeyCode::Backspace => {
            view_state.filter_text.pop();
            view_state.clamp_cursor();
            None
        }
        KeyCode::Char(c) => {
            view_state.filter_text.push(c);
            view_state.clamp_cursor();
            None
        }
        _ => None,
    }
}

/// Get the widget key for scroll state based on the active tab.
fn active_widget_key(view_state: &ViewState) -> &'static str {
    match view_state.active_tab {
        TabId::Matchup => "matchup",
        TabId::Radar => "radar",
        TabId::Insight => "insight",
        TabId::Sources => "sources",
    }
}

/// Scroll the main panel up by the given number of lines.
fn scroll_up(view_state: &mut ViewState, lines: usize) {
    let key = active_widget_key(view_state);
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

/// Scroll the main panel down by the given number of lines.
fn scroll_down(view_state: &mut ViewState, lines: usize) {
    let key = active_widget_key(view_state);
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(lines);
}

/// Page size for PageUp/PageDown scrolling.
fn page_size() -> usize {
    20
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
