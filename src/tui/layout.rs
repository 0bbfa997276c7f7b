// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the matchup dashboard:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Selection Banner (3 rows)                         |
// +-------------------------+------------------------+
// | Main Panel (62%)         | Sidebar (38%)          |
// | Matchup/Radar/Insight/   | +- Teams (65%) -------+|
// | Sources tab content      | +- Sources (35%) -----+|
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: load status, team count, tab indicator.
    pub status_bar: Rect,
    /// Second row: the two selected teams and any comparison error.
    pub selection_banner: Rect,
    /// Left side of the middle section: tab-switched content area.
    pub main_panel: Rect,
    /// Right sidebar top: selectable team list.
    pub teams: Rect,
    /// Right sidebar bottom: per-source load outcomes.
    pub sources: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
///
/// The layout uses fixed heights for the status bar, selection banner, and
/// help bar, with the remaining space split between the main panel and a
/// sidebar column.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | selection(3) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // selection banner
            Constraint::Min(10),   // middle section (main + sidebar)
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let selection_banner = vertical[1];
    let middle = vertical[2];
    let help_bar = vertical[3];

    // Horizontal: main panel (62%) | sidebar (38%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(middle);

    let main_panel = horizontal[0];
    let sidebar = horizontal[1];

    // Sidebar vertical: teams (65%) | sources (35%)
    let sidebar_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(sidebar);

    let teams = sidebar_sections[0];
    let sources = sidebar_sections[1];

    AppLayout {
        status_bar,
        selection_banner,
        main_panel,
        teams,
        sources,
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
