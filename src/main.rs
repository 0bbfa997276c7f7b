// Matchup analyzer entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the LLM client from config
// 4. Fan out source fetches and assemble the table store
// 5. Create mpsc channels
// 6. Spawn the app orchestrator task
// 7. Run the TUI event loop (blocking until the user quits)
// 8. Cleanup on exit

use matchup_assistant::app;
use matchup_assistant::config;
use matchup_assistant::fetch;
use matchup_assistant::llm;
use matchup_assistant::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Matchup analyzer starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} sources, required dataset `{}`, {}s fetch timeout",
        config.store.sources.len(),
        config.store.required,
        config.fetch.timeout_secs
    );

    // 3. Build the LLM client from config
    let llm_client = llm::client::LlmClient::from_config(&config);
    match &llm_client {
        llm::client::LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        llm::client::LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }

    // 4. Fan out source fetches and assemble the table store
    info!("Loading sources...");
    let (store, report) = fetch::load_store(&config.store, &config.fetch).await;
    info!(
        "Loaded {} of {} sources ({} failed)",
        report.loaded.len(),
        config.store.sources.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        error!("source load failure: {failure}");
    }

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, store, report, llm_client, llm_tx);

    // 6. Spawn the app orchestrator task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(app_state, cmd_rx, llm_rx, ui_tx).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the TUI event loop (blocking until the user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Matchup analyzer shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchup_assistant=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
