// Table store: named tabular datasets keyed by a shared team identifier column.
//
// Datasets are parsed from raw CSV text with dynamic headers; cells are
// coerced to numbers where they parse cleanly and kept as text otherwise.
// The store is built once per load and never mutated afterward.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use tracing::warn;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single cell value. Numbers are anything that parses as a finite f64;
/// empty cells and common NA markers are `Missing`; everything else is text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Coerce a raw CSV cell into a `Value`.
    pub fn from_cell(cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() || trimmed == "NA" || trimmed == "N/A" {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            // NaN/inf in a numeric cell is treated as absent, not as a zero.
            Ok(_) => Value::Missing,
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    /// The numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e12 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "-"),
        }
    }
}

/// One dataset row: a flat field → value mapping. Column order lives on the
/// owning `Dataset`.
pub type Row = HashMap<String, Value>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a single source failed to load. One source's failure never affects
/// the others; the failing dataset is simply absent from the store.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch source `{name}`: {message}")]
    Fetch { name: String, message: String },

    #[error("fetch for source `{name}` timed out after {secs}s")]
    Timeout { name: String, secs: u64 },

    #[error("CSV error in source `{name}`: {source}")]
    Csv { name: String, source: csv::Error },

    #[error("source `{name}` is missing required column `{column}`")]
    MissingColumn { name: String, column: String },

    #[error("source `{name}` produced zero usable rows")]
    Empty { name: String },
}

impl LoadError {
    /// The source name this failure belongs to.
    pub fn source_name(&self) -> &str {
        match self {
            LoadError::Fetch { name, .. }
            | LoadError::Timeout { name, .. }
            | LoadError::Csv { name, .. }
            | LoadError::MissingColumn { name, .. }
            | LoadError::Empty { name } => name,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// A named table of per-team rows. The identifier column is expected to be
/// unique per dataset; duplicates resolve to the first row in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub key_column: String,
    /// Header columns in file order.
    pub columns: Vec<String>,
    rows: Vec<Row>,
    /// First-seen team id → row position.
    index: HashMap<String, usize>,
    /// Team ids in first-seen order.
    order: Vec<String>,
}

impl Dataset {
    /// Parse a dataset from raw CSV bytes.
    ///
    /// The identifier column and every column named in `numeric` must exist
    /// in the header. Rows with an empty identifier are skipped with a
    /// warning; a duplicate identifier keeps the first row.
    pub fn parse_from_reader<R: Read>(
        name: &str,
        key_column: &str,
        numeric: &[String],
        rdr: R,
    ) -> Result<Dataset, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|e| LoadError::Csv {
                name: name.to_string(),
                source: e,
            })?
            .clone();
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        let key_pos = columns
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| LoadError::MissingColumn {
                name: name.to_string(),
                column: key_column.to_string(),
            })?;

        // Schema check: declared numeric columns must be present up front so
        // a renamed upstream column fails the load, not a later lookup.
        for column in numeric {
            if !columns.iter().any(|c| c == column) {
                return Err(LoadError::MissingColumn {
                    name: name.to_string(),
                    column: column.clone(),
                });
            }
        }

        let mut rows = Vec::new();
        let mut index = HashMap::new();
        let mut order = Vec::new();

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping malformed row in `{}`: {}", name, e);
                    continue;
                }
            };

            let team = record.get(key_pos).unwrap_or("").trim().to_string();
            if team.is_empty() {
                warn!("skipping row with empty `{}` in `{}`", key_column, name);
                continue;
            }

            if index.contains_key(&team) {
                warn!(
                    "duplicate `{}` value '{}' in `{}`; keeping first row",
                    key_column, team, name
                );
                continue;
            }

            let mut row = Row::with_capacity(columns.len());
            for (pos, column) in columns.iter().enumerate() {
                let cell = record.get(pos).unwrap_or("");
                row.insert(column.clone(), Value::from_cell(cell));
            }

            index.insert(team.clone(), rows.len());
            order.push(team);
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(LoadError::Empty {
                name: name.to_string(),
            });
        }

        Ok(Dataset {
            name: name.to_string(),
            key_column: key_column.to_string(),
            columns,
            rows,
            index,
            order,
        })
    }

    /// The first row whose identifier equals `team` exactly (case-sensitive).
    pub fn row_for(&self, team: &str) -> Option<&Row> {
        self.index.get(team).map(|&pos| &self.rows[pos])
    }

    /// Team identifiers in first-seen order.
    pub fn team_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TableStore
// ---------------------------------------------------------------------------

/// The loaded dataset collection. Iteration order is the configured source
/// order, which downstream comparison output inherits.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    datasets: Vec<Dataset>,
}

impl TableStore {
    pub fn new() -> TableStore {
        TableStore::default()
    }

    /// Add a dataset. Later duplicates by name are rejected at config
    /// validation, so insertion is append-only.
    pub fn insert(&mut self, dataset: Dataset) {
        self.datasets.push(dataset);
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn names(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
