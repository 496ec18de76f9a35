//! Storage engine and table option policy
//!
//! Engines are resolved case-insensitively before any option is
//! inspected; option validation runs after schema binding and before
//! catalog commit. The option schema is closed: every key is either
//! recognized and value-checked here, or rejected outright.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::catalog::TableSchema;
use crate::error::{Error, Result};

/// Upper bound for the `row_per_block` option
pub const MAX_ROW_PER_BLOCK: u64 = 1_000_000;

/// Upper bound for the `block_per_segment` option
pub const MAX_BLOCK_PER_SEGMENT: u64 = 1_000;

/// Option key for rows per storage block
pub const OPT_KEY_ROW_PER_BLOCK: &str = "row_per_block";
/// Option key for blocks per segment
pub const OPT_KEY_BLOCK_PER_SEGMENT: &str = "block_per_segment";
/// Option key for bloom index column list
pub const OPT_KEY_BLOOM_INDEX_COLUMNS: &str = "bloom_index_columns";
/// Option key for the table comment
pub const OPT_KEY_COMMENT: &str = "comment";

/// Keys managed internally by the catalog or storage layer. Never
/// settable through CREATE TABLE or ALTER TABLE SET OPTIONS.
const RESERVED_OPTION_KEYS: [&str; 4] = [
    "database_id",
    "snapshot_location",
    "snapshot_loc",
    "external_location",
];

const RECOGNIZED_OPTION_KEYS: [&str; 4] = [
    OPT_KEY_ROW_PER_BLOCK,
    OPT_KEY_BLOCK_PER_SEGMENT,
    OPT_KEY_BLOOM_INDEX_COLUMNS,
    OPT_KEY_COMMENT,
];

/// Table options, keyed lowercase, in statement order
pub type TableOptions = IndexMap<String, String>;

/// Storage engine kinds known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    /// Discards all rows
    Null,
    /// The default columnar engine
    Fuse,
    /// In-memory engine
    Memory,
}

impl EngineKind {
    /// Resolve an engine name token case-insensitively. A missing
    /// engine clause means FUSE; an unrecognized name is an error, not
    /// a silent fallback.
    pub fn resolve(name: Option<&str>) -> Result<EngineKind> {
        match name {
            None => Ok(EngineKind::Fuse),
            Some(token) => match token.to_uppercase().as_str() {
                "NULL" => Ok(EngineKind::Null),
                "FUSE" => Ok(EngineKind::Fuse),
                "MEMORY" => Ok(EngineKind::Memory),
                _ => Err(Error::UnknownEngine(token.to_string())),
            },
        }
    }

    /// Only the fuse engine maintains cluster keys
    pub fn supports_cluster_by(&self) -> bool {
        matches!(self, EngineKind::Fuse)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Null => write!(f, "NULL"),
            EngineKind::Fuse => write!(f, "FUSE"),
            EngineKind::Memory => write!(f, "MEMORY"),
        }
    }
}

/// Lowercase the keys of raw option pairs, keeping statement order
pub fn normalize_options(pairs: &[(String, String)]) -> TableOptions {
    pairs
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect()
}

/// Reject a cluster key on an engine that cannot maintain one
pub fn validate_cluster_by(engine: EngineKind, cluster_by: &[String]) -> Result<()> {
    if !cluster_by.is_empty() && !engine.supports_cluster_by() {
        return Err(Error::UnsupportedClusterBy(engine.to_string()));
    }
    Ok(())
}

/// Validate an option bag against the closed option schema and the
/// bound table schema. Runs identically for CREATE TABLE and for
/// ALTER TABLE SET OPTIONS.
pub fn validate_table_options(options: &TableOptions, schema: &TableSchema) -> Result<()> {
    for key in options.keys() {
        let key = key.to_lowercase();
        if RESERVED_OPTION_KEYS.contains(&key.as_str())
            || !RECOGNIZED_OPTION_KEYS.contains(&key.as_str())
        {
            error!(key = %key, "rejected reserved or unknown table option");
            return Err(Error::ReservedOrUnknownOption(key));
        }
    }

    if let Some(value) = options.get(OPT_KEY_ROW_PER_BLOCK) {
        check_bounded_integer(OPT_KEY_ROW_PER_BLOCK, value, MAX_ROW_PER_BLOCK)?;
    }
    if let Some(value) = options.get(OPT_KEY_BLOCK_PER_SEGMENT) {
        check_bounded_integer(OPT_KEY_BLOCK_PER_SEGMENT, value, MAX_BLOCK_PER_SEGMENT)?;
    }
    if let Some(value) = options.get(OPT_KEY_BLOOM_INDEX_COLUMNS) {
        check_bloom_index_columns(value, schema)?;
    }

    Ok(())
}

fn check_bounded_integer(key: &str, value: &str, max: u64) -> Result<()> {
    let parsed = value.parse::<u64>().map_err(|_| Error::InvalidOptionValue {
        key: key.to_string(),
        reason: format!("expected a positive integer, got '{}'", value),
    })?;
    if parsed == 0 || parsed > max {
        error!(key, value, max, "table option out of range");
        return Err(Error::InvalidOptionValue {
            key: key.to_string(),
            reason: format!("value must be between 1 and {}, got {}", max, parsed),
        });
    }
    Ok(())
}

fn check_bloom_index_columns(value: &str, schema: &TableSchema) -> Result<()> {
    for name in value.split(',') {
        let name = name.trim();
        let column = schema
            .get_column(name)
            .ok_or_else(|| Error::InvalidOptionValue {
                key: OPT_KEY_BLOOM_INDEX_COLUMNS.to_string(),
                reason: format!("column '{}' does not exist in the table", name),
            })?;
        if !column.data_type.is_bloom_indexable() {
            return Err(Error::InvalidOptionValue {
                key: OPT_KEY_BLOOM_INDEX_COLUMNS.to_string(),
                reason: format!(
                    "column '{}' of type {} does not support a bloom index",
                    name, column.data_type
                ),
            });
        }
    }
    Ok(())
}

/// A table defined against an external URI with connection properties.
///
/// Parsed from its own grammar production, so validation failures here
/// are location errors, not option errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLocation {
    /// `scheme://bucket[/path]`
    pub uri: String,
    /// Connection properties such as endpoint and credentials
    pub connection: Vec<(String, String)>,
}

impl ExternalLocation {
    /// Validate the URI shape and the connection pairs
    pub fn validate(&self) -> Result<()> {
        let (scheme, rest) = self
            .uri
            .split_once("://")
            .ok_or_else(|| Error::MalformedExternalLocation(format!(
                "uri '{}' must be of the form scheme://bucket[/path]",
                self.uri
            )))?;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::MalformedExternalLocation(format!(
                "invalid uri scheme in '{}'",
                self.uri
            )));
        }
        let bucket = rest.split('/').next().unwrap_or("");
        if bucket.is_empty() {
            return Err(Error::MalformedExternalLocation(format!(
                "uri '{}' is missing a bucket",
                self.uri
            )));
        }
        for (key, _) in &self.connection {
            if key.trim().is_empty() {
                return Err(Error::MalformedExternalLocation(
                    "connection property with empty key".to_string(),
                ));
            }
        }
        Ok(())
    }
}
