// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI and
// streaming events from insight tasks. Owns the immutable table store and
// pushes UI updates to the TUI render loop over an mpsc channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fetch::{self, LoadReport};
use crate::llm::client::LlmClient;
use crate::llm::prompt;
use crate::matchup::{self, TeamRecord};
use crate::protocol::{
    ComparisonTable, LlmEvent, MatchupView, StoreSummary, UiUpdate, UserCommand,
};
use crate::radar;
use crate::store::TableStore;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub store: TableStore,
    pub report: LoadReport,
    /// Records of the last successful comparison; insight prompts read from
    /// these so the insight always matches what is on screen.
    pub last_matchup: Option<(TeamRecord, TeamRecord)>,
    pub current_llm_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the current insight
    /// task. Events from stale generations are discarded in
    /// `handle_llm_event`.
    pub llm_generation: u64,
    /// LLM client for streaming Claude API calls. Wrapped in Arc for
    /// sharing with spawned tasks.
    pub llm_client: Arc<LlmClient>,
    /// Sender for LLM events; spawned tasks use a clone of this sender to
    /// stream tokens back to the main event loop.
    pub llm_tx: mpsc::Sender<LlmEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: TableStore,
        report: LoadReport,
        llm_client: LlmClient,
        llm_tx: mpsc::Sender<LlmEvent>,
    ) -> Self {
        AppState {
            config,
            store,
            report,
            last_matchup: None,
            current_llm_task: None,
            llm_generation: 0,
            llm_client: Arc::new(llm_client),
            llm_tx,
        }
    }

    /// Build the store summary pushed to the TUI after every load pass.
    ///
    /// The team list comes from the required dataset in first-seen order;
    /// if that dataset failed to load the list is empty and the sources
    /// panel shows why.
    pub fn store_summary(&self) -> StoreSummary {
        let teams = self
            .store
            .get(&self.config.store.required)
            .map(|d| d.team_ids().to_vec())
            .unwrap_or_default();
        let source_names: Vec<String> = self
            .config
            .store
            .sources
            .iter()
            .map(|s| s.name.clone())
            .collect();
        StoreSummary::new(teams, &source_names, &self.report)
    }

    /// Handle a compare command: resolve both teams, build the comparison
    /// tables and the radar view, and push the result.
    pub async fn handle_compare(
        &mut self,
        team_a: String,
        team_b: String,
        ui_tx: &mpsc::Sender<UiUpdate>,
    ) {
        let required = self.config.store.required.clone();
        match matchup::compare_teams(&self.store, &required, &team_a, &team_b) {
            Ok((record_a, record_b, pairs)) => {
                let tables: Vec<ComparisonTable> = pairs
                    .iter()
                    .map(|p| ComparisonTable::from_pair(p, &self.config.store.key_column))
                    .collect();

                let (radar, radar_error) = match radar::build_matchup_radar(
                    &record_a,
                    &record_b,
                    &required,
                    &self.config.radar.metrics,
                ) {
                    Ok(pair) => (Some(pair), None),
                    Err(e) => {
                        warn!("radar view unavailable: {e}");
                        (None, Some(e.to_string()))
                    }
                };

                info!(
                    "compared {} vs {} across {} datasets",
                    team_a,
                    team_b,
                    tables.len()
                );

                let view = MatchupView {
                    team_a: record_a.team.clone(),
                    team_b: record_b.team.clone(),
                    tables,
                    radar,
                    radar_error,
                };
                self.last_matchup = Some((record_a, record_b));
                let _ = ui_tx.send(UiUpdate::ComparisonReady(Box::new(view))).await;
            }
            Err(e) => {
                info!("comparison blocked: {e}");
                let _ = ui_tx.send(UiUpdate::ComparisonFailed(e.to_string())).await;
            }
        }
    }

    /// Handle an insight request for the last compared matchup.
    ///
    /// Aborts any in-flight insight stream, bumps the generation counter,
    /// and spawns a new streaming task.
    pub async fn handle_request_insight(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let Some((record_a, record_b)) = &self.last_matchup else {
            let _ = ui_tx
                .send(UiUpdate::InsightError(
                    "Compare two teams before requesting an insight".to_string(),
                ))
                .await;
            return;
        };

        if let Some(task) = self.current_llm_task.take() {
            task.abort();
        }
        self.llm_generation += 1;
        let generation = self.llm_generation;

        let required = &self.config.store.required;
        let metrics = &self.config.radar.metrics;
        let profile_a = prompt::team_profile(record_a, required, metrics);
        let profile_b = prompt::team_profile(record_b, required, metrics);
        let datasets: Vec<String> = matchup::build_comparison(record_a, record_b)
            .iter()
            .map(|p| p.dataset.clone())
            .collect();

        let system = prompt::system_prompt();
        let user_content = prompt::build_insight_prompt(&profile_a, &profile_b, &datasets);
        let max_tokens = self.config.llm.insight_max_tokens;

        let client = Arc::clone(&self.llm_client);
        let llm_tx = self.llm_tx.clone();
        self.current_llm_task = Some(tokio::spawn(async move {
            if let Err(e) = client
                .stream_message(&system, &user_content, max_tokens, llm_tx, generation)
                .await
            {
                warn!("insight stream task failed: {e}");
            }
        }));

        let _ = ui_tx.send(UiUpdate::InsightRequested).await;
    }

    /// Re-fetch every source and swap the store wholesale.
    pub async fn handle_reload(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let _ = ui_tx.send(UiUpdate::StoreLoading).await;
        info!("reloading {} sources", self.config.store.sources.len());

        let (store, report) = fetch::load_store(&self.config.store, &self.config.fetch).await;
        self.store = store;
        self.report = report;
        // Old records may reference datasets that just changed; drop them.
        self.last_matchup = None;

        let _ = ui_tx
            .send(UiUpdate::StoreLoaded(Box::new(self.store_summary())))
            .await;
    }

    /// Forward an insight stream event to the TUI, discarding stale
    /// generations.
    pub async fn handle_llm_event(&mut self, event: LlmEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
        if event.generation() != self.llm_generation {
            debug!(
                "discarding stale LLM event (gen {} != {})",
                event.generation(),
                self.llm_generation
            );
            return;
        }

        match event {
            LlmEvent::Token { text, .. } => {
                let _ = ui_tx.send(UiUpdate::InsightToken(text)).await;
            }
            LlmEvent::Complete {
                input_tokens,
                output_tokens,
                ..
            } => {
                info!(input_tokens, output_tokens, "insight stream complete");
                let _ = ui_tx.send(UiUpdate::InsightComplete).await;
            }
            LlmEvent::Error { message, .. } => {
                warn!("insight stream error: {message}");
                let _ = ui_tx
                    .send(UiUpdate::InsightError(format!(
                        "Insight unavailable ({message})"
                    )))
                    .await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator loop until the user quits or every command sender
/// is dropped.
pub async fn run(
    mut state: AppState,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
) -> anyhow::Result<()> {
    // Seed the TUI with the initial load outcome.
    let _ = ui_tx
        .send(UiUpdate::StoreLoaded(Box::new(state.store_summary())))
        .await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Compare { team_a, team_b }) => {
                        state.handle_compare(team_a, team_b, &ui_tx).await;
                    }
                    Some(UserCommand::RequestInsight) => {
                        state.handle_request_insight(&ui_tx).await;
                    }
                    Some(UserCommand::ReloadSources) => {
                        state.handle_reload(&ui_tx).await;
                    }
                    Some(UserCommand::Quit) | None => break,
                }
            }

            event = llm_rx.recv() => {
                match event {
                    Some(event) => state.handle_llm_event(event, &ui_tx).await,
                    None => break,
                }
            }
        }
    }

    if let Some(task) = state.current_llm_task.take() {
        task.abort();
    }

    info!("orchestrator loop finished");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::protocol::LoadOutcome;
    use crate::store::{Dataset, LoadError};

    fn test_config() -> Config {
        Config {
            store: StoreConfig {
                key_column: "TeamName".into(),
                required: "Summary".into(),
                sources: vec![
                    SourceConfig {
                        name: "Summary".into(),
                        locator: "summary.csv".into(),
                        numeric: Vec::new(),
                    },
                    SourceConfig {
                        name: "Defense".into(),
                        locator: "defense.csv".into(),
                        numeric: Vec::new(),
                    },
                ],
            },
            fetch: FetchConfig { timeout_secs: 5 },
            radar: RadarConfig {
                metrics: vec![
                    "AdjOE".into(),
                    "AdjDE".into(),
                    "AdjTempo".into(),
                    "AdjEM".into(),
                ],
            },
            llm: LlmConfig {
                model: "test".into(),
                insight_max_tokens: 400,
            },
            credentials: CredentialsConfig::default(),
        }
    }

    fn test_store() -> TableStore {
        let mut store = TableStore::new();
        let summary = "\
TeamName,AdjOE,AdjDE,AdjTempo,AdjEM
Duke,120.1,95.2,68.5,24.9
Kansas,118.0,96.1,67.2,21.9";
        store.insert(
            Dataset::parse_from_reader("Summary", "TeamName", &[], summary.as_bytes()).unwrap(),
        );
        let defense = "\
TeamName,OppPPG
Duke,62.3
Kansas,65.8";
        store.insert(
            Dataset::parse_from_reader("Defense", "TeamName", &[], defense.as_bytes()).unwrap(),
        );
        store
    }

    fn test_report() -> LoadReport {
        LoadReport {
            loaded: vec![
                crate::fetch::DatasetSummary {
                    name: "Summary".into(),
                    rows: 2,
                },
                crate::fetch::DatasetSummary {
                    name: "Defense".into(),
                    rows: 2,
                },
            ],
            failures: Vec::new(),
            loaded_at: chrono::Local::now(),
        }
    }

    fn test_state() -> (AppState, mpsc::Receiver<LlmEvent>) {
        let (llm_tx, llm_rx) = mpsc::channel(32);
        let state = AppState::new(
            test_config(),
            test_store(),
            test_report(),
            LlmClient::Disabled,
            llm_tx,
        );
        (state, llm_rx)
    }

    // ---- Store summary ----

    #[test]
    fn store_summary_lists_teams_from_required_dataset() {
        let (state, _llm_rx) = test_state();
        let summary = state.store_summary();

        assert_eq!(summary.teams, vec!["Duke", "Kansas"]);
        assert_eq!(summary.datasets.len(), 2);
        assert_eq!(summary.failure_count(), 0);
    }

    #[test]
    fn store_summary_empty_teams_when_required_failed() {
        let (mut state, _llm_rx) = test_state();
        state.store = TableStore::new();
        state.report = LoadReport {
            loaded: Vec::new(),
            failures: vec![
                LoadError::Fetch {
                    name: "Summary".into(),
                    message: "boom".into(),
                },
                LoadError::Fetch {
                    name: "Defense".into(),
                    message: "boom".into(),
                },
            ],
            loaded_at: chrono::Local::now(),
        };

        let summary = state.store_summary();
        assert!(summary.teams.is_empty());
        assert_eq!(summary.failure_count(), 2);
        assert!(matches!(
            summary.datasets[0].outcome,
            LoadOutcome::Failed { .. }
        ));
    }

    // ---- Compare ----

    #[tokio::test]
    async fn compare_pushes_comparison_ready() {
        let (mut state, _llm_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_compare("Duke".into(), "Kansas".into(), &ui_tx)
            .await;

        let update = ui_rx.recv().await.unwrap();
        match update {
            UiUpdate::ComparisonReady(view) => {
                assert_eq!(view.team_a, "Duke");
                assert_eq!(view.team_b, "Kansas");
                assert_eq!(view.tables.len(), 2);
                assert!(view.radar.is_some());
                assert!(view.radar_error.is_none());
            }
            other => panic!("expected ComparisonReady, got: {other:?}"),
        }
        assert!(state.last_matchup.is_some());
    }

    #[tokio::test]
    async fn compare_unknown_team_pushes_failure() {
        let (mut state, _llm_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_compare("Duke".into(), "Ghost U".into(), &ui_tx)
            .await;

        let update = ui_rx.recv().await.unwrap();
        match update {
            UiUpdate::ComparisonFailed(message) => {
                assert!(message.contains("Ghost U"));
                assert!(message.contains("Summary"));
            }
            other => panic!("expected ComparisonFailed, got: {other:?}"),
        }
        assert!(state.last_matchup.is_none());
    }

    #[tokio::test]
    async fn compare_with_broken_radar_still_delivers_tables() {
        let (mut state, _llm_rx) = test_state();
        // Ask for a metric the summary table does not carry.
        state.config.radar.metrics = vec![
            "AdjOE".into(),
            "AdjDE".into(),
            "DoesNotExist".into(),
        ];
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_compare("Duke".into(), "Kansas".into(), &ui_tx)
            .await;

        let update = ui_rx.recv().await.unwrap();
        match update {
            UiUpdate::ComparisonReady(view) => {
                assert_eq!(view.tables.len(), 2);
                assert!(view.radar.is_none());
                let err = view.radar_error.expect("radar error should be reported");
                assert!(err.contains("DoesNotExist"));
            }
            other => panic!("expected ComparisonReady, got: {other:?}"),
        }
    }

    // ---- Insight ----

    #[tokio::test]
    async fn insight_without_matchup_is_an_error() {
        let (mut state, _llm_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state.handle_request_insight(&ui_tx).await;

        let update = ui_rx.recv().await.unwrap();
        assert!(matches!(update, UiUpdate::InsightError(_)));
        assert_eq!(state.llm_generation, 0, "no task should have been spawned");
    }

    #[tokio::test]
    async fn insight_with_matchup_spawns_generation_counted_task() {
        let (mut state, mut llm_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_compare("Duke".into(), "Kansas".into(), &ui_tx)
            .await;
        let _ = ui_rx.recv().await.unwrap();

        state.handle_request_insight(&ui_tx).await;

        assert_eq!(state.llm_generation, 1);
        let update = ui_rx.recv().await.unwrap();
        assert_eq!(update, UiUpdate::InsightRequested);

        // The Disabled client reports immediately on the llm channel.
        let event = llm_rx.recv().await.unwrap();
        match event {
            LlmEvent::Error {
                message,
                generation,
            } => {
                assert_eq!(generation, 1);
                assert!(message.contains("not configured"));
            }
            other => panic!("expected LlmEvent::Error, got: {other:?}"),
        }
    }

    // ---- LLM event forwarding ----

    #[tokio::test]
    async fn stale_llm_events_are_discarded() {
        let (mut state, _llm_rx) = test_state();
        state.llm_generation = 5;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_llm_event(
                LlmEvent::Token {
                    text: "old".into(),
                    generation: 4,
                },
                &ui_tx,
            )
            .await;

        assert!(ui_rx.try_recv().is_err(), "stale event must not reach the UI");
    }

    #[tokio::test]
    async fn current_llm_events_are_forwarded() {
        let (mut state, _llm_rx) = test_state();
        state.llm_generation = 2;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_llm_event(
                LlmEvent::Token {
                    text: "Duke ".into(),
                    generation: 2,
                },
                &ui_tx,
            )
            .await;
        state
            .handle_llm_event(
                LlmEvent::Complete {
                    full_text: "Duke wins".into(),
                    input_tokens: 10,
                    output_tokens: 5,
                    generation: 2,
                },
                &ui_tx,
            )
            .await;

        assert_eq!(
            ui_rx.recv().await.unwrap(),
            UiUpdate::InsightToken("Duke ".into())
        );
        assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::InsightComplete);
    }

    #[tokio::test]
    async fn llm_error_surfaces_fallback_message() {
        let (mut state, _llm_rx) = test_state();
        state.llm_generation = 1;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        state
            .handle_llm_event(
                LlmEvent::Error {
                    message: "API returned status 529".into(),
                    generation: 1,
                },
                &ui_tx,
            )
            .await;

        match ui_rx.recv().await.unwrap() {
            UiUpdate::InsightError(message) => {
                assert!(message.starts_with("Insight unavailable"));
                assert!(message.contains("529"));
            }
            other => panic!("expected InsightError, got: {other:?}"),
        }
    }
}
