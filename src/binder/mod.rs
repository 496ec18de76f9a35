//! Schema binder
//!
//! Turns parsed column specifications into validated `Column`s: type
//! tokens are resolved, default expressions folded, and name
//! uniqueness enforced case-insensitively.

pub mod ctas;
pub mod defaults;

pub use ctas::resolve_ctas_columns;
pub use defaults::{fold_default, FoldMode};

use std::collections::HashSet;

use crate::catalog::{Column, DataType, DefaultValue};
use crate::error::{Error, Result};
use crate::sql::ColumnSpec;

/// Bind an ordered list of column specifications.
///
/// A `NOT NULL` column without an explicit default receives its type's
/// zero value; a nullable one carries no default and renders as `NULL`.
pub fn bind_columns(specs: &[ColumnSpec], mode: FoldMode) -> Result<Vec<Column>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(specs.len());

    for spec in specs {
        if !seen.insert(spec.name.to_lowercase()) {
            return Err(Error::DuplicateColumnName(spec.name.clone()));
        }
        columns.push(bind_column(spec, mode)?);
    }

    Ok(columns)
}

/// Bind a single column specification.
pub fn bind_column(spec: &ColumnSpec, mode: FoldMode) -> Result<Column> {
    if spec.auto_increment {
        return Err(Error::UnsupportedColumnModifier(
            "AUTO_INCREMENT".to_string(),
        ));
    }

    let data_type = DataType::parse(&spec.type_token)?;
    let nullable = !spec.not_null;

    let default = match &spec.default {
        Some(expr) => Some(fold_default(&spec.name, expr, &data_type, nullable, mode)?),
        None if !nullable => Some(DefaultValue::zero_for(&data_type)),
        None => None,
    };

    let mut column = Column::new(spec.name.clone(), data_type).nullable(nullable);
    if let Some(default) = default {
        column = column.default(default);
    }
    Ok(column)
}
