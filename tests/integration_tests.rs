// Integration tests for the matchup analyzer.
//
// These tests exercise the full system end-to-end using the library crate's
// public API: fan-out source loading, team record resolution, comparison
// building, the radar transform, prompt construction, and the orchestrator
// loop wired over real channels.

use std::fs;
use std::path::PathBuf;

use matchup_assistant::app::{self, AppState};
use matchup_assistant::config::*;
use matchup_assistant::fetch;
use matchup_assistant::llm::client::LlmClient;
use matchup_assistant::llm::prompt;
use matchup_assistant::matchup;
use matchup_assistant::protocol::*;
use matchup_assistant::radar;

use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

const SUMMARY_CSV: &str = "\
TeamName,AdjOE,AdjDE,AdjTempo,AdjEM
Duke,120.1,95.2,68.5,24.9
North Carolina,118.4,97.0,70.1,21.4
Kansas,117.2,94.8,66.9,22.4
Gonzaga,121.3,99.5,71.8,21.8
";

const DEFENSE_CSV: &str = "\
TeamName,OppPPG,BlockPct
Duke,62.3,12.1
North Carolina,68.9,9.4
Kansas,65.8,10.6
Gonzaga,70.2,8.8
";

const HEIGHT_CSV: &str = "\
TeamName,AvgHeight
Duke,78.2
Kansas,77.9
";

/// Write the sample CSVs into a fresh temp dir and return its path.
fn write_fixtures(dir_name: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(dir_name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(&tmp).unwrap();
    fs::write(tmp.join("summary.csv"), SUMMARY_CSV).unwrap();
    fs::write(tmp.join("defense.csv"), DEFENSE_CSV).unwrap();
    fs::write(tmp.join("height.csv"), HEIGHT_CSV).unwrap();
    tmp
}

fn source(name: &str, path: &PathBuf) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        locator: path.to_str().unwrap().to_string(),
        numeric: Vec::new(),
    }
}

/// Build a test-ready Config pointing at the fixture files (no config files).
fn inline_config(tmp: &PathBuf) -> Config {
    Config {
        store: StoreConfig {
            key_column: "TeamName".into(),
            required: "Summary".into(),
            sources: vec![
                SourceConfig {
                    name: "Summary".into(),
                    locator: tmp.join("summary.csv").to_str().unwrap().into(),
                    numeric: vec![
                        "AdjOE".into(),
                        "AdjDE".into(),
                        "AdjTempo".into(),
                        "AdjEM".into(),
                    ],
                },
                source("Defense", &tmp.join("defense.csv")),
                source("Height", &tmp.join("height.csv")),
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

// ===========================================================================
// Load -> resolve -> compare pipeline
// ===========================================================================

#[tokio::test]
async fn full_pipeline_load_resolve_compare_radar() {
    let tmp = write_fixtures("matchup_it_pipeline");
    let config = inline_config(&tmp);

    // Load
    let (store, report) = fetch::load_store(&config.store, &config.fetch).await;
    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
    assert_eq!(store.names(), vec!["Summary", "Defense", "Height"]);

    // Listing the identifier column reproduces the source order.
    let summary = store.get("Summary").unwrap();
    assert_eq!(
        summary.team_ids(),
        &["Duke", "North Carolina", "Kansas", "Gonzaga"]
    );

    // Resolve + compare
    let (record_a, record_b, pairs) =
        matchup::compare_teams(&store, "Summary", "Duke", "North Carolina").unwrap();
    assert_eq!(record_a.dataset_names(), vec!["Summary", "Defense", "Height"]);
    // North Carolina is absent from the Height table, so the pairing skips it.
    let datasets: Vec<&str> = pairs.iter().map(|p| p.dataset.as_str()).collect();
    assert_eq!(datasets, vec!["Summary", "Defense"]);

    // Radar
    let pair = radar::build_matchup_radar(&record_a, &record_b, "Summary", &config.radar.metrics)
        .unwrap();
    assert_eq!(pair.axes.len(), 4);
    assert_eq!(pair.shapes[0].points.len(), 5);
    assert!((pair.shapes[0].points[0].1 - 120.1).abs() < 1e-9);

    // Prompt
    let profile_a = prompt::team_profile(&record_a, "Summary", &config.radar.metrics);
    let profile_b = prompt::team_profile(&record_b, "Summary", &config.radar.metrics);
    let text = prompt::build_insight_prompt(
        &profile_a,
        &profile_b,
        &datasets.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
    );
    assert!(text.contains("Duke vs North Carolina"));
    assert!(text.contains("AdjOE=120.1"));
    assert!(text.contains("Summary, Defense"));

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn missing_source_resilience() {
    // Five valid sources and one whose fetch fails: the store holds exactly
    // the five valid datasets and the report carries one failure.
    let tmp = write_fixtures("matchup_it_resilience");
    for name in ["misc", "offense", "pointdist"] {
        fs::write(
            tmp.join(format!("{name}.csv")),
            "TeamName,X\nDuke,1\nKansas,2\n",
        )
        .unwrap();
    }

    let mut config = inline_config(&tmp);
    config.store.sources = vec![
        source("Summary", &tmp.join("summary.csv")),
        source("Defense", &tmp.join("defense.csv")),
        source("Misc", &tmp.join("misc.csv")),
        source("Offense", &tmp.join("offense.csv")),
        source("Point Distribution", &tmp.join("pointdist.csv")),
        source("Height", &tmp.join("missing_height.csv")),
    ];

    let (store, report) = fetch::load_store(&config.store, &config.fetch).await;

    assert_eq!(store.len(), 5);
    assert!(store.get("Height").is_none());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source_name(), "Height");

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn resolver_properties_hold_on_loaded_store() {
    let tmp = write_fixtures("matchup_it_properties");
    let config = inline_config(&tmp);
    let (store, _report) = fetch::load_store(&config.store, &config.fetch).await;

    // Idempotence
    let once = matchup::resolve(&store, "Kansas");
    let twice = matchup::resolve(&store, "Kansas");
    assert_eq!(once, twice);

    // Unknown team resolves empty and compares empty.
    let unknown = matchup::resolve(&store, "Unknown Team");
    assert!(unknown.is_empty());
    let duke = matchup::resolve(&store, "Duke");
    assert!(matchup::build_comparison(&unknown, &duke).is_empty());

    // Reflexivity: a team against itself yields identical rows everywhere.
    let pairs = matchup::build_comparison(&duke, &duke);
    assert_eq!(pairs.len(), 3);
    for pair in &pairs {
        assert_eq!(pair.rows[0], pair.rows[1]);
    }

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn comparison_blocked_for_team_missing_from_required_dataset() {
    let tmp = write_fixtures("matchup_it_blocked");
    let config = inline_config(&tmp);
    let (store, _report) = fetch::load_store(&config.store, &config.fetch).await;

    let err = matchup::compare_teams(&store, "Summary", "Duke", "Nowhere State").unwrap_err();
    assert!(err.to_string().contains("Nowhere State"));
    assert!(err.to_string().contains("Summary"));

    let _ = fs::remove_dir_all(&tmp);
}

// ===========================================================================
// Orchestrator loop over real channels
// ===========================================================================

#[tokio::test]
async fn orchestrator_loop_compare_insight_quit() {
    let tmp = write_fixtures("matchup_it_orchestrator");
    let config = inline_config(&tmp);
    let (store, report) = fetch::load_store(&config.store, &config.fetch).await;

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (llm_tx, llm_rx) = mpsc::channel(16);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);

    let state = AppState::new(config, store, report, LlmClient::Disabled, llm_tx);
    let app_handle = tokio::spawn(app::run(state, cmd_rx, llm_rx, ui_tx));

    // Startup pushes the initial store summary.
    let update = ui_rx.recv().await.unwrap();
    match update {
        UiUpdate::StoreLoaded(summary) => {
            assert_eq!(
                summary.teams,
                vec!["Duke", "North Carolina", "Kansas", "Gonzaga"]
            );
            assert_eq!(summary.failure_count(), 0);
        }
        other => panic!("expected StoreLoaded, got: {other:?}"),
    }

    // Compare
    cmd_tx
        .send(UserCommand::Compare {
            team_a: "Duke".into(),
            team_b: "Kansas".into(),
        })
        .await
        .unwrap();

    let update = ui_rx.recv().await.unwrap();
    match update {
        UiUpdate::ComparisonReady(view) => {
            assert_eq!(view.team_a, "Duke");
            assert_eq!(view.team_b, "Kansas");
            // Duke and Kansas share all three datasets.
            assert_eq!(view.tables.len(), 3);
            assert!(view.radar.is_some());

            // The transposed Summary table keeps metric names and drops the
            // identifier column.
            let summary_table = &view.tables[0];
            assert_eq!(summary_table.dataset, "Summary");
            assert!(summary_table.rows.iter().all(|r| r.metric != "TeamName"));
            let adj_oe = summary_table
                .rows
                .iter()
                .find(|r| r.metric == "AdjOE")
                .unwrap();
            assert_eq!(adj_oe.a, "120.1");
            assert_eq!(adj_oe.b, "117.2");
        }
        other => panic!("expected ComparisonReady, got: {other:?}"),
    }

    // Insight: the Disabled client turns into an error event, which the
    // orchestrator converts into a user-facing fallback message.
    cmd_tx.send(UserCommand::RequestInsight).await.unwrap();

    let update = ui_rx.recv().await.unwrap();
    assert_eq!(update, UiUpdate::InsightRequested);

    let update = ui_rx.recv().await.unwrap();
    match update {
        UiUpdate::InsightError(message) => {
            assert!(message.starts_with("Insight unavailable"));
        }
        other => panic!("expected InsightError, got: {other:?}"),
    }

    // Quit
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    app_handle.await.unwrap().unwrap();

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn orchestrator_reload_swaps_store() {
    let tmp = write_fixtures("matchup_it_reload");
    let mut config = inline_config(&tmp);
    config.store.sources = vec![source("Summary", &tmp.join("summary.csv"))];
    config.store.required = "Summary".to_string();

    let (store, report) = fetch::load_store(&config.store, &config.fetch).await;

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (llm_tx, llm_rx) = mpsc::channel(16);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);

    let state = AppState::new(config, store, report, LlmClient::Disabled, llm_tx);
    let app_handle = tokio::spawn(app::run(state, cmd_rx, llm_rx, ui_tx));

    // Initial summary.
    let UiUpdate::StoreLoaded(initial) = ui_rx.recv().await.unwrap() else {
        panic!("expected initial StoreLoaded");
    };
    assert_eq!(initial.teams.len(), 4);

    // Shrink the source file, then reload.
    fs::write(
        tmp.join("summary.csv"),
        "TeamName,AdjOE,AdjDE,AdjTempo,AdjEM\nDuke,120.1,95.2,68.5,24.9\n",
    )
    .unwrap();
    cmd_tx.send(UserCommand::ReloadSources).await.unwrap();

    assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::StoreLoading);
    let UiUpdate::StoreLoaded(reloaded) = ui_rx.recv().await.unwrap() else {
        panic!("expected StoreLoaded after reload");
    };
    assert_eq!(reloaded.teams, vec!["Duke"]);

    cmd_tx.send(UserCommand::Quit).await.unwrap();
    app_handle.await.unwrap().unwrap();

    let _ = fs::remove_dir_all(&tmp);
}
