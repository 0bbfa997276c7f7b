// Team record resolution and two-team comparison building.
//
// A team record is the cross-dataset bundle of one team's rows: every
// dataset that knows the team contributes its row, everything else is
// skipped silently. The comparison builder pairs two records over the
// datasets they share. Records are built per query and never persisted.

use thiserror::Error;

use crate::store::{Row, TableStore};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum MatchupError {
    /// A selected team is absent from a dataset the comparison cannot do
    /// without (the Summary table by default). Partial data would render a
    /// misleading matchup, so this blocks the comparison outright.
    #[error("team `{team}` not found in the `{dataset}` dataset")]
    TeamNotFound { team: String, dataset: String },
}

// ---------------------------------------------------------------------------
// Team records
// ---------------------------------------------------------------------------

/// One dataset's contribution to a team record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub dataset: String,
    /// Column order of the owning dataset, kept for aligned display.
    pub columns: Vec<String>,
    pub row: Row,
}

/// All rows resolved for one team, in store (source-config) order.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub team: String,
    entries: Vec<ResolvedEntry>,
}

impl TeamRecord {
    pub fn get(&self, dataset: &str) -> Option<&ResolvedEntry> {
        self.entries.iter().find(|e| e.dataset == dataset)
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.get(dataset).is_some()
    }

    pub fn dataset_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.dataset.as_str()).collect()
    }

    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Look up `team_id` in every dataset of the store.
///
/// Datasets that lack the team are skipped; absence is expected, not an
/// error. An identifier that matches nothing anywhere yields an empty
/// record. Pure lookup: resolving twice gives structurally equal records.
pub fn resolve(store: &TableStore, team_id: &str) -> TeamRecord {
    let mut entries = Vec::new();
    for dataset in store.datasets() {
        if let Some(row) = dataset.row_for(team_id) {
            entries.push(ResolvedEntry {
                dataset: dataset.name.clone(),
                columns: dataset.columns.clone(),
                row: row.clone(),
            });
        }
    }
    TeamRecord {
        team: team_id.to_string(),
        entries,
    }
}

// ---------------------------------------------------------------------------
// Comparison building
// ---------------------------------------------------------------------------

/// The two-row aligned view of one dataset for two teams.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPair {
    pub dataset: String,
    pub columns: Vec<String>,
    /// Team labels in (A, B) order.
    pub teams: [String; 2],
    /// Rows in the same order as `teams`.
    pub rows: [Row; 2],
}

/// Pair up two team records dataset by dataset.
///
/// Only datasets present in BOTH records produce a pair; a dataset resolved
/// for one side only is skipped. Output order follows record A's entry
/// order, which is the store's source order.
pub fn build_comparison(record_a: &TeamRecord, record_b: &TeamRecord) -> Vec<RowPair> {
    let mut pairs = Vec::new();
    for entry_a in &record_a.entries {
        let Some(entry_b) = record_b.get(&entry_a.dataset) else {
            continue;
        };
        pairs.push(RowPair {
            dataset: entry_a.dataset.clone(),
            columns: entry_a.columns.clone(),
            teams: [record_a.team.clone(), record_b.team.clone()],
            rows: [entry_a.row.clone(), entry_b.row.clone()],
        });
    }
    pairs
}

/// Resolve both teams and build their comparison, first checking that each
/// selected team exists in the required dataset.
pub fn compare_teams(
    store: &TableStore,
    required: &str,
    team_a: &str,
    team_b: &str,
) -> Result<(TeamRecord, TeamRecord, Vec<RowPair>), MatchupError> {
    if let Some(dataset) = store.get(required) {
        for team in [team_a, team_b] {
            if dataset.row_for(team).is_none() {
                return Err(MatchupError::TeamNotFound {
                    team: team.to_string(),
                    dataset: required.to_string(),
                });
            }
        }
    }

    let record_a = resolve(store, team_a);
    let record_b = resolve(store, team_b);
    let pairs = build_comparison(&record_a, &record_b);
    Ok((record_a, record_b, pairs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
