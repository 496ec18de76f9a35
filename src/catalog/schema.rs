//! Schema definitions for QuarryDB
//!
//! This module defines table schemas, column metadata, and bound
//! column defaults.

use super::types::DataType;
use crate::options::{EngineKind, TableOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A folded constant literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Unquoted literal text, used for container and variant defaults
    /// such as `[]` or `null`
    Raw(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::UInt(u) => write!(f, "{}", u),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Str(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Literal::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// A bound column default.
///
/// Most defaults fold to a literal at bind time. The one symbolic case,
/// `now()`, is stored as a deferred marker and re-evaluated against the
/// wall clock for each inserted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Literal(Literal),
    DeferredNow,
}

impl DefaultValue {
    /// The zero value a `NOT NULL` column receives when declared
    /// without an explicit default.
    pub fn zero_for(data_type: &DataType) -> DefaultValue {
        let literal = match data_type {
            DataType::Boolean => Literal::Boolean(false),
            DataType::TinyInt { unsigned: true }
            | DataType::SmallInt { unsigned: true }
            | DataType::Int { unsigned: true }
            | DataType::BigInt { unsigned: true } => Literal::UInt(0),
            DataType::TinyInt { .. }
            | DataType::SmallInt { .. }
            | DataType::Int { .. }
            | DataType::BigInt { .. } => Literal::Int(0),
            DataType::Float | DataType::Double | DataType::Decimal(_, _) => Literal::Float(0.0),
            DataType::Date => Literal::Str("1970-01-01".to_string()),
            DataType::Timestamp => Literal::Str("1970-01-01 00:00:00".to_string()),
            DataType::String => Literal::Str(String::new()),
            DataType::Variant => Literal::Raw("null".to_string()),
            DataType::Array(_) => Literal::Raw("[]".to_string()),
            DataType::Tuple(_) => Literal::Raw("()".to_string()),
            DataType::Map(_, _) => Literal::Raw("{}".to_string()),
        };
        DefaultValue::Literal(literal)
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(literal) => write!(f, "{}", literal),
            DefaultValue::DeferredNow => write!(f, "now()"),
        }
    }
}

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (stored case-sensitively; uniqueness is checked
    /// case-insensitively by the binder)
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this column nullable?
    pub nullable: bool,
    /// Bound default, if any
    pub default: Option<DefaultValue>,
}

impl Column {
    /// Create a new nullable column without a default
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the bound default
    pub fn default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Rendered default text for introspection: the literal, `now()`,
    /// or `NULL` when absent.
    pub fn default_text(&self) -> String {
        match &self.default {
            Some(value) => value.to_string(),
            None => "NULL".to_string(),
        }
    }
}

/// One row of DESCRIBE output: the rendered 5-tuple handed to the
/// text renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub nullable: String,
    pub default: String,
    pub comment: String,
}

/// Table schema - the validated structure of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Lowercased column name to index mapping
    name_to_index: HashMap<String, usize>,
    /// Storage engine
    pub engine: EngineKind,
    /// Validated table options
    pub options: TableOptions,
    /// Cluster key expressions, rendered
    pub cluster_by: Vec<String>,
    /// Transient tables forgo retention guarantees; schema-identical
    pub transient: bool,
}

impl TableSchema {
    /// Create a schema from binder-validated columns
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let name_to_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_lowercase(), i))
            .collect();
        Self {
            columns,
            name_to_index,
            engine: EngineKind::Fuse,
            options: TableOptions::new(),
            cluster_by: Vec::new(),
            transient: false,
        }
    }

    /// Set the storage engine
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Set the validated options
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the cluster key expressions
    pub fn cluster_by(mut self, cluster_by: Vec<String>) -> Self {
        self.cluster_by = cluster_by;
        self
    }

    /// Set the transient flag
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.columns[idx])
    }

    /// Check if a column exists (case-insensitive)
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(&name.to_lowercase())
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Render the per-column 5-tuples consumed by the DESCRIBE renderer
    pub fn describe(&self) -> Vec<ColumnDescription> {
        self.columns
            .iter()
            .map(|col| ColumnDescription {
                name: col.name.clone(),
                data_type: col.data_type.to_string(),
                nullable: if col.nullable { "YES" } else { "NO" }.to_string(),
                default: col.default_text(),
                comment: "(empty)".to_string(),
            })
            .collect()
    }
}

/// Table definition - full table metadata owned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Database this table belongs to
    pub database: String,
    /// Table name
    pub name: String,
    /// Table schema
    pub schema: TableSchema,
    /// Table ID, assigned by the catalog at commit
    pub id: u64,
    /// Bumped on every committed option mutation
    pub version: u64,
}

impl TableDef {
    /// Create a new table definition
    pub fn new(database: impl Into<String>, name: impl Into<String>, schema: TableSchema, id: u64) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            schema,
            id,
            version: 1,
        }
    }

    /// Get the table schema
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }
}
