// Configuration loading and parsing (sources.toml, settings.toml, credentials.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub fetch: FetchConfig,
    pub radar: RadarConfig,
    pub llm: LlmConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// sources.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[store]` table in sources.toml.
#[derive(Debug, Clone, Deserialize)]
struct SourcesFile {
    store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// The identifier column shared by every dataset.
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// The dataset that must contain both selected teams and that feeds the
    /// selection list and radar view.
    pub required: String,
    /// Ordered dataset sources. Order here is the store's iteration order.
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// URL (http/https) or filesystem path to the raw CSV.
    pub locator: String,
    /// Columns that must exist and parse as numbers for this dataset.
    #[serde(default)]
    pub numeric: Vec<String>,
}

fn default_key_column() -> String {
    "TeamName".to_string()
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    fetch: FetchConfig,
    radar: RadarConfig,
    llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-source fetch timeout in seconds. Each source times out
    /// independently; one slow source never stalls the others.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadarConfig {
    /// Ordered numeric fields read from the required dataset for the radar
    /// polygon. Axis order on screen follows this order.
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub insight_max_tokens: u32,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/sources.toml`,
/// `config/settings.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- sources.toml (required) ---
    let sources_path = config_dir.join("sources.toml");
    let sources_text = read_file(&sources_path)?;
    let sources_file: SourcesFile =
        toml::from_str(&sources_text).map_err(|e| ConfigError::ParseError {
            path: sources_path.clone(),
            source: e,
        })?;
    let store = sources_file.store;

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings_file: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        store,
        fetch: settings_file.fetch,
        radar: settings_file.radar,
        llm: settings_file.llm,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // Without defaults/ the only workable situation is a pre-populated
        // config/ directory.
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        // Skip non-files and entries without a file name
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    // Store validations
    if config.store.key_column.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "store.key_column".into(),
            message: "must not be empty".into(),
        });
    }

    if config.store.sources.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "store.sources".into(),
            message: "at least one source must be configured".into(),
        });
    }

    let mut seen = HashSet::new();
    for source in &config.store.sources {
        if source.name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "store.sources.name".into(),
                message: "source names must not be empty".into(),
            });
        }
        if source.locator.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "store.sources.locator".into(),
                message: format!("source `{}` has an empty locator", source.name),
            });
        }
        if !seen.insert(source.name.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "store.sources".into(),
                message: format!("duplicate source name `{}`", source.name),
            });
        }
    }

    if !seen.contains(config.store.required.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "store.required".into(),
            message: format!(
                "`{}` does not name a configured source",
                config.store.required
            ),
        });
    }

    // Fetch validations
    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "fetch.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    // Radar validations: fewer than three axes degenerates into a line.
    if config.radar.metrics.len() < 3 {
        return Err(ConfigError::ValidationError {
            field: "radar.metrics".into(),
            message: format!(
                "at least 3 metrics required, got {}",
                config.radar.metrics.len()
            ),
        });
    }

    // LLM validations
    if config.llm.insight_max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.insight_max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
