// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the application
// state. The app orchestrator pushes `UiUpdate` messages over an mpsc channel;
// the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{DatasetStatus, LlmStatus, MatchupView, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Main panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Matchup,
    Radar,
    Insight,
    Sources,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the dashboard.
pub struct ViewState {
    /// Selectable team identifiers (required dataset, first-seen order).
    pub teams: Vec<String>,
    /// Per-source load outcomes for the sources panel.
    pub sources: Vec<DatasetStatus>,
    /// When the store was last (re)loaded.
    pub loaded_at: Option<DateTime<Local>>,
    /// True while a reload pass is in flight.
    pub loading: bool,
    /// Cursor position within the filtered team list.
    pub selected_index: usize,
    /// The two matchup slots.
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    /// Last successful comparison result.
    pub matchup: Option<MatchupView>,
    /// Why the last compare was rejected, if it was.
    pub comparison_error: Option<String>,
    /// Accumulated insight text (streamed tokens).
    pub insight_text: String,
    pub insight_status: LlmStatus,
    /// Message shown when the insight stream failed.
    pub insight_error: Option<String>,
    /// Which tab is active in the main panel.
    pub active_tab: TabId,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    /// Current team filter text.
    pub filter_text: String,
    /// Whether the filter input is active.
    pub filter_mode: bool,
    /// Whether the quit confirmation overlay is showing.
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            teams: Vec::new(),
            sources: Vec::new(),
            loaded_at: None,
            loading: false,
            selected_index: 0,
            team_a: None,
            team_b: None,
            matchup: None,
            comparison_error: None,
            insight_text: String::new(),
            insight_status: LlmStatus::Idle,
            insight_error: None,
            active_tab: TabId::Matchup,
            scroll_offset: HashMap::new(),
            filter_text: String::new(),
            filter_mode: false,
            confirm_quit: false,
        }
    }
}

impl ViewState {
    /// Teams matching the current filter text, in list order.
    pub fn filtered_teams(&self) -> Vec<&String> {
        let needle = self.filter_text.to_lowercase();
        self.teams
            .iter()
            .filter(|t| needle.is_empty() || t.to_lowercase().contains(&needle))
            .collect()
    }

    /// The team currently under the cursor, if any.
    pub fn cursor_team(&self) -> Option<String> {
        self.filtered_teams()
            .get(self.selected_index)
            .map(|t| (*t).clone())
    }

    /// Keep the cursor within the filtered list after list or filter changes.
    pub fn clamp_cursor(&mut self) {
        let len = self.filtered_teams().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StoreLoading => {
            state.loading = true;
        }
        UiUpdate::StoreLoaded(summary) => {
            state.loading = false;
            state.teams = summary.teams;
            state.sources = summary.datasets;
            state.loaded_at = Some(summary.loaded_at);
            // A reload may have changed the team universe; drop selections
            // that no longer exist and any comparison built on the old store.
            if state
                .team_a
                .as_ref()
                .is_some_and(|t| !state.teams.contains(t))
            {
                state.team_a = None;
            }
            if state
                .team_b
                .as_ref()
                .is_some_and(|t| !state.teams.contains(t))
            {
                state.team_b = None;
            }
            state.matchup = None;
            state.comparison_error = None;
            state.clamp_cursor();
        }
        UiUpdate::ComparisonReady(view) => {
            state.matchup = Some(*view);
            state.comparison_error = None;
            state.scroll_offset.insert("matchup".to_string(), 0);
            // Surface the fresh result if the user is parked on the sources tab.
            if state.active_tab == TabId::Sources {
                state.active_tab = TabId::Matchup;
            }
        }
        UiUpdate::ComparisonFailed(message) => {
            state.comparison_error = Some(message);
        }
        UiUpdate::InsightRequested => {
            state.insight_text.clear();
            state.insight_error = None;
            state.insight_status = LlmStatus::Streaming;
            state.active_tab = TabId::Insight;
        }
        UiUpdate::InsightToken(token) => {
            state.insight_text.push_str(&token);
            state.insight_status = LlmStatus::Streaming;
        }
        UiUpdate::InsightComplete => {
            state.insight_status = LlmStatus::Complete;
        }
        UiUpdate::InsightError(message) => {
            state.insight_error = Some(message);
            state.insight_status = LlmStatus::Error;
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::selection_banner::render(frame, layout.selection_banner, state);

    match state.active_tab {
        TabId::Matchup => widgets::comparison::render(frame, layout.main_panel, state),
        TabId::Radar => widgets::radar::render(frame, layout.main_panel, state),
        TabId::Insight => widgets::insight::render(frame, layout.main_panel, state),
        TabId::Sources => widgets::sources::render(frame, layout.main_panel, state),
    }

    widgets::teams::render(frame, layout.teams, state);
    widgets::sources::render_sidebar(frame, layout.sources, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Set panic hook to restore terminal on crash.
    //    We capture the original hook and chain ours before it.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    // 3. Create ViewState
    let mut view_state = ViewState::default();

    // 4. Create crossterm EventStream for async keyboard input
    let mut event_stream = EventStream::new();

    // 5. Create render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 6. Main loop
    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                    }
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(command) = input::handle_key(key_event, &mut view_state) {
                            let quit = command == UserCommand::Quit;
                            let _ = cmd_tx.send(command).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse events, resize events, etc. -- ignore
                    }
                    Some(Err(_)) => {
                        // Input error -- break out
                        break;
                    }
                    None => {
                        // Stream ended
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 7. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{LoadOutcome, StoreSummary};

    fn summary(teams: &[&str]) -> StoreSummary {
        StoreSummary {
            teams: teams.iter().map(|t| t.to_string()).collect(),
            datasets: vec![DatasetStatus {
                name: "Summary".into(),
                outcome: LoadOutcome::Loaded { rows: teams.len() },
            }],
            loaded_at: Local::now(),
        }
    }

    fn matchup_view(a: &str, b: &str) -> MatchupView {
        MatchupView {
            team_a: a.to_string(),
            team_b: b.to_string(),
            tables: Vec::new(),
            radar: None,
            radar_error: None,
        }
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.teams.is_empty());
        assert!(state.sources.is_empty());
        assert!(state.loaded_at.is_none());
        assert!(!state.loading);
        assert!(state.team_a.is_none());
        assert!(state.team_b.is_none());
        assert!(state.matchup.is_none());
        assert!(state.comparison_error.is_none());
        assert!(state.insight_text.is_empty());
        assert_eq!(state.insight_status, LlmStatus::Idle);
        assert_eq!(state.active_tab, TabId::Matchup);
        assert!(!state.filter_mode);
        assert!(!state.confirm_quit);
    }

    // -- Filtering and cursor --

    #[test]
    fn filtered_teams_matches_case_insensitively() {
        let mut state = ViewState::default();
        state.teams = vec!["Duke".into(), "Kansas".into(), "North Carolina".into()];
        state.filter_text = "ka".into();

        let filtered = state.filtered_teams();
        assert_eq!(filtered, vec!["Kansas"]);
    }

    #[test]
    fn cursor_team_follows_filter() {
        let mut state = ViewState::default();
        state.teams = vec!["Duke".into(), "Kansas".into(), "North Carolina".into()];
        state.filter_text = "n".into();
        state.selected_index = 1;

        // Filter keeps "Kansas" and "North Carolina".
        assert_eq!(state.cursor_team(), Some("North Carolina".to_string()));
    }

    #[test]
    fn clamp_cursor_after_list_shrinks() {
        let mut state = ViewState::default();
        state.teams = vec!["Duke".into(), "Kansas".into()];
        state.selected_index = 5;
        state.clamp_cursor();
        assert_eq!(state.selected_index, 1);

        state.teams.clear();
        state.clamp_cursor();
        assert_eq!(state.selected_index, 0);
    }

    // -- Store updates --

    #[test]
    fn store_loading_sets_flag() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::StoreLoading);
        assert!(state.loading);
    }

    #[test]
    fn store_loaded_replaces_teams_and_sources() {
        let mut state = ViewState::default();
        state.loading = true;

        apply_ui_update(
            &mut state,
            UiUpdate::StoreLoaded(Box::new(summary(&["Duke", "Kansas"]))),
        );

        assert!(!state.loading);
        assert_eq!(state.teams, vec!["Duke", "Kansas"]);
        assert_eq!(state.sources.len(), 1);
        assert!(state.loaded_at.is_some());
    }

    #[test]
    fn store_loaded_drops_vanished_selections_and_matchup() {
        let mut state = ViewState::default();
        state.team_a = Some("Duke".into());
        state.team_b = Some("Gonzaga".into());
        state.matchup = Some(matchup_view("Duke", "Gonzaga"));

        apply_ui_update(
            &mut state,
            UiUpdate::StoreLoaded(Box::new(summary(&["Duke", "Kansas"]))),
        );

        assert_eq!(state.team_a.as_deref(), Some("Duke"));
        assert!(state.team_b.is_none(), "vanished team should be cleared");
        assert!(state.matchup.is_none(), "stale matchup should be cleared");
    }

    // -- Comparison updates --

    #[test]
    fn comparison_ready_stores_view_and_clears_error() {
        let mut state = ViewState::default();
        state.comparison_error = Some("old".into());
        state.scroll_offset.insert("matchup".into(), 12);

        apply_ui_update(
            &mut state,
            UiUpdate::ComparisonReady(Box::new(matchup_view("Duke", "Kansas"))),
        );

        assert!(state.matchup.is_some());
        assert!(state.comparison_error.is_none());
        assert_eq!(state.scroll_offset["matchup"], 0);
    }

    #[test]
    fn comparison_ready_leaves_matchup_tab_alone_but_exits_sources() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Radar;
        apply_ui_update(
            &mut state,
            UiUpdate::ComparisonReady(Box::new(matchup_view("Duke", "Kansas"))),
        );
        assert_eq!(state.active_tab, TabId::Radar);

        state.active_tab = TabId::Sources;
        apply_ui_update(
            &mut state,
            UiUpdate::ComparisonReady(Box::new(matchup_view("Duke", "Kansas"))),
        );
        assert_eq!(state.active_tab, TabId::Matchup);
    }

    #[test]
    fn comparison_failed_sets_error() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::ComparisonFailed("team `X` not found".into()),
        );
        assert_eq!(state.comparison_error.as_deref(), Some("team `X` not found"));
    }

    // -- Insight updates --

    #[test]
    fn insight_requested_clears_and_switches_tab() {
        let mut state = ViewState::default();
        state.insight_text = "old insight".into();
        state.insight_error = Some("old error".into());
        state.active_tab = TabId::Matchup;

        apply_ui_update(&mut state, UiUpdate::InsightRequested);

        assert!(state.insight_text.is_empty());
        assert!(state.insight_error.is_none());
        assert_eq!(state.insight_status, LlmStatus::Streaming);
        assert_eq!(state.active_tab, TabId::Insight);
    }

    #[test]
    fn insight_tokens_accumulate() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::InsightToken("Duke ".into()));
        apply_ui_update(&mut state, UiUpdate::InsightToken("controls pace".into()));
        assert_eq!(state.insight_text, "Duke controls pace");
        assert_eq!(state.insight_status, LlmStatus::Streaming);
    }

    #[test]
    fn insight_complete_updates_status() {
        let mut state = ViewState::default();
        state.insight_status = LlmStatus::Streaming;
        apply_ui_update(&mut state, UiUpdate::InsightComplete);
        assert_eq!(state.insight_status, LlmStatus::Complete);
    }

    #[test]
    fn insight_error_keeps_message() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::InsightError("Insight unavailable (timeout)".into()),
        );
        assert_eq!(state.insight_status, LlmStatus::Error);
        assert!(state
            .insight_error
            .as_deref()
            .unwrap()
            .contains("unavailable"));
    }
}
