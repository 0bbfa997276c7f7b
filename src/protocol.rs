// Message types exchanged between the app orchestrator, LLM tasks, and the
// TUI render loop. The TUI never touches the store directly; everything it
// draws arrives as one of these payloads.

use chrono::{DateTime, Local};

use crate::fetch::LoadReport;
use crate::matchup::RowPair;
use crate::radar::RadarPair;

// ---------------------------------------------------------------------------
// User commands (TUI -> orchestrator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Compare the two selected teams.
    Compare { team_a: String, team_b: String },
    /// Generate a betting insight for the last compared matchup.
    RequestInsight,
    /// Re-fetch every configured source and swap the store.
    ReloadSources,
    Quit,
}

// ---------------------------------------------------------------------------
// LLM streaming events (LLM task -> orchestrator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    Token {
        text: String,
        generation: u64,
    },
    Complete {
        full_text: String,
        input_tokens: u32,
        output_tokens: u32,
        generation: u64,
    },
    Error {
        message: String,
        generation: u64,
    },
}

impl LlmEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LlmEvent::Token { generation, .. }
            | LlmEvent::Complete { generation, .. }
            | LlmEvent::Error { generation, .. } => *generation,
        }
    }
}

/// Where an insight stream currently stands, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStatus {
    Idle,
    Streaming,
    Complete,
    Error,
}

// ---------------------------------------------------------------------------
// Store summary (orchestrator -> TUI)
// ---------------------------------------------------------------------------

/// One source's outcome for the sources panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { rows: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStatus {
    pub name: String,
    pub outcome: LoadOutcome,
}

/// Everything the TUI needs to know about the loaded store: the selectable
/// team list (from the required dataset, first-seen order) and per-source
/// outcomes in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    pub teams: Vec<String>,
    pub datasets: Vec<DatasetStatus>,
    pub loaded_at: DateTime<Local>,
}

impl StoreSummary {
    /// Merge a load report into per-source statuses, keeping configured
    /// source order.
    pub fn new(teams: Vec<String>, source_names: &[String], report: &LoadReport) -> StoreSummary {
        let datasets = source_names
            .iter()
            .map(|name| {
                if let Some(summary) = report.loaded.iter().find(|d| &d.name == name) {
                    DatasetStatus {
                        name: name.clone(),
                        outcome: LoadOutcome::Loaded { rows: summary.rows },
                    }
                } else {
                    let message = report
                        .failures
                        .iter()
                        .find(|f| f.source_name() == name)
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "not loaded".to_string());
                    DatasetStatus {
                        name: name.clone(),
                        outcome: LoadOutcome::Failed { message },
                    }
                }
            })
            .collect();

        StoreSummary {
            teams,
            datasets,
            loaded_at: report.loaded_at,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.datasets
            .iter()
            .filter(|d| matches!(d.outcome, LoadOutcome::Failed { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Matchup view (orchestrator -> TUI)
// ---------------------------------------------------------------------------

/// One metric line of a comparison table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub metric: String,
    pub a: String,
    pub b: String,
}

/// A per-dataset comparison, transposed for the terminal: the two-row pair
/// becomes metric lines with one column per team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    pub dataset: String,
    pub rows: Vec<MetricRow>,
}

impl ComparisonTable {
    /// Transpose a row pair. The identifier column is dropped: the team
    /// names already label the columns.
    pub fn from_pair(pair: &RowPair, key_column: &str) -> ComparisonTable {
        let rows = pair
            .columns
            .iter()
            .filter(|c| c.as_str() != key_column)
            .map(|column| {
                let fmt = |row: &crate::store::Row| {
                    row.get(column)
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string())
                };
                MetricRow {
                    metric: column.clone(),
                    a: fmt(&pair.rows[0]),
                    b: fmt(&pair.rows[1]),
                }
            })
            .collect();

        ComparisonTable {
            dataset: pair.dataset.clone(),
            rows,
        }
    }
}

/// The complete result of a compare action. The radar may have failed on its
/// own (missing metric) while the tables are fine.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupView {
    pub team_a: String,
    pub team_b: String,
    pub tables: Vec<ComparisonTable>,
    pub radar: Option<RadarPair>,
    pub radar_error: Option<String>,
}

// ---------------------------------------------------------------------------
// UI updates (orchestrator -> TUI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// A load pass started (initial or reload).
    StoreLoading,
    /// A load pass finished; replaces the team list and source statuses.
    StoreLoaded(Box<StoreSummary>),
    /// Compare succeeded.
    ComparisonReady(Box<MatchupView>),
    /// Compare was blocked (team missing from the required dataset).
    ComparisonFailed(String),
    /// An insight stream was started; previous text should be cleared.
    InsightRequested,
    InsightToken(String),
    InsightComplete,
    InsightError(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
