// Source fetching and store assembly.
//
// Every configured source is fetched on its own tokio task with an
// independent timeout, then parsed into a `Dataset`. Failures are isolated:
// a dead or slow source is reported in the `LoadReport` and omitted from the
// store while the remaining sources load normally.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::{FetchConfig, SourceConfig, StoreConfig};
use crate::store::{Dataset, LoadError, TableStore};

// ---------------------------------------------------------------------------
// Source locators
// ---------------------------------------------------------------------------

/// Where a source's raw CSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Url(String),
    Path(PathBuf),
}

impl SourceLocator {
    /// Classify a raw locator string. Anything that does not look like an
    /// http(s) URL is treated as a filesystem path.
    pub fn parse(raw: &str) -> SourceLocator {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceLocator::Url(raw.to_string())
        } else {
            SourceLocator::Path(PathBuf::from(raw))
        }
    }
}

// ---------------------------------------------------------------------------
// Load report
// ---------------------------------------------------------------------------

/// Row count for one successfully loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub name: String,
    pub rows: usize,
}

/// Outcome of one load pass: what made it into the store, what failed, and
/// when. Shown in the sources panel and logged once per pass.
#[derive(Debug)]
pub struct LoadReport {
    pub loaded: Vec<DatasetSummary>,
    pub failures: Vec<LoadError>,
    pub loaded_at: DateTime<Local>,
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetch one source's raw CSV text.
async fn fetch_raw(
    client: &reqwest::Client,
    name: &str,
    locator: &SourceLocator,
) -> Result<String, LoadError> {
    match locator {
        SourceLocator::Url(url) => {
            let response = client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| LoadError::Fetch {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
            response.text().await.map_err(|e| LoadError::Fetch {
                name: name.to_string(),
                message: e.to_string(),
            })
        }
        SourceLocator::Path(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LoadError::Fetch {
                    name: name.to_string(),
                    message: format!("{}: {e}", path.display()),
                })
        }
    }
}

/// Fetch and parse one source, bounded by the per-source timeout.
async fn load_source(
    client: reqwest::Client,
    key_column: String,
    source: SourceConfig,
    timeout_secs: u64,
) -> Result<Dataset, LoadError> {
    let locator = SourceLocator::parse(&source.locator);
    let raw = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        fetch_raw(&client, &source.name, &locator),
    )
    .await
    .map_err(|_| LoadError::Timeout {
        name: source.name.clone(),
        secs: timeout_secs,
    })??;

    Dataset::parse_from_reader(&source.name, &key_column, &source.numeric, raw.as_bytes())
}

/// Fan out fetches for every configured source and assemble the store.
///
/// Store order matches the configured source order regardless of which fetch
/// finishes first. Never fails as a whole: the worst case is an empty store
/// with one failure entry per source.
pub async fn load_store(store_cfg: &StoreConfig, fetch_cfg: &FetchConfig) -> (TableStore, LoadReport) {
    let client = reqwest::Client::new();

    let handles: Vec<_> = store_cfg
        .sources
        .iter()
        .cloned()
        .map(|source| {
            let client = client.clone();
            let key_column = store_cfg.key_column.clone();
            let timeout_secs = fetch_cfg.timeout_secs;
            let name = source.name.clone();
            (
                name,
                tokio::spawn(load_source(client, key_column, source, timeout_secs)),
            )
        })
        .collect();

    let mut store = TableStore::new();
    let mut loaded = Vec::new();
    let mut failures = Vec::new();

    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(LoadError::Fetch {
                name: name.clone(),
                message: format!("load task failed: {e}"),
            }),
        };
        match result {
            Ok(dataset) => {
                info!("loaded source `{}` ({} rows)", dataset.name, dataset.len());
                loaded.push(DatasetSummary {
                    name: dataset.name.clone(),
                    rows: dataset.len(),
                });
                store.insert(dataset);
            }
            Err(e) => {
                warn!("source load failed: {e}");
                failures.push(e);
            }
        }
    }

    let report = LoadReport {
        loaded,
        failures,
        loaded_at: Local::now(),
    };

    (store, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
