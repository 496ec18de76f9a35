//! CTAS column resolution
//!
//! Reconciles an optional explicit column list against the projected
//! output of the query source. Duplicate names inside the projection
//! are reported before any length comparison, matching the order in
//! which a user can fix the statement.

use std::collections::HashSet;

use super::{bind_columns, FoldMode};
use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::sql::{ColumnSpec, QueryProjection};

/// Resolve the column set of a CREATE TABLE ... AS SELECT.
///
/// With an explicit column list, the declared names, types, nullability
/// and defaults define the schema and the query only supplies data; the
/// list still goes through full binder validation. Without one, the
/// projection defines the schema directly, with no defaults bound.
pub fn resolve_ctas_columns(
    specs: &[ColumnSpec],
    projection: &QueryProjection,
) -> Result<Vec<Column>> {
    let mut seen = HashSet::new();
    for projected in &projection.columns {
        if !seen.insert(projected.name.to_lowercase()) {
            return Err(Error::DuplicateColumnName(projected.name.clone()));
        }
    }

    if specs.is_empty() {
        return Ok(projection
            .columns
            .iter()
            .map(|p| Column::new(p.name.clone(), p.data_type.clone()).nullable(p.nullable))
            .collect());
    }

    if specs.len() != projection.columns.len() {
        return Err(Error::ColumnCountMismatch {
            declared: specs.len(),
            projected: projection.columns.len(),
        });
    }

    bind_columns(specs, FoldMode::Create)
}
