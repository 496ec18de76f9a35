//! DDL executor
//!
//! Orchestrates table-definition statements end to end: protected
//! namespace check, engine resolution, source resolution (plain,
//! LIKE, or AS SELECT), schema binding, option policy, and finally the
//! atomic catalog commit. Every validation failure surfaces before any
//! catalog mutation, so an aborted statement leaves the catalog
//! untouched.

use std::sync::Arc;

use tracing::debug;

use crate::binder::{bind_columns, resolve_ctas_columns, FoldMode};
use crate::catalog::{Catalog, Column, ColumnDescription, TableDef, TableSchema, DEFAULT_DATABASE};
use crate::error::Result;
use crate::options::{
    normalize_options, validate_cluster_by, validate_table_options, EngineKind,
};
use crate::sql::{
    AlterTableStatement, CreateTableSource, CreateTableStatement, DropTableStatement,
};

/// Executes DDL statements against a shared catalog
pub struct DdlExecutor {
    catalog: Arc<Catalog>,
}

impl DdlExecutor {
    /// Create an executor over a shared catalog
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Access the underlying catalog
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Execute CREATE TABLE (plain, LIKE, or AS SELECT)
    pub fn create_table(&self, stmt: &CreateTableStatement) -> Result<Arc<TableDef>> {
        let database = database_or_default(&stmt.database);
        self.catalog.assert_mutable_database(database)?;

        let engine = EngineKind::resolve(stmt.engine.as_deref())?;

        let columns = match &stmt.source {
            Some(CreateTableSource::Like {
                database: src_database,
                table: src_table,
            }) => {
                let src_database = database_or_default(src_database);
                let source = self.catalog.get_table(src_database, src_table)?;
                copy_structure(source.schema())
            }
            Some(CreateTableSource::Query(projection)) => {
                resolve_ctas_columns(&stmt.columns, projection)?
            }
            None => bind_columns(&stmt.columns, FoldMode::Create)?,
        };

        validate_cluster_by(engine, &stmt.cluster_by)?;
        if let Some(external) = &stmt.external {
            external.validate()?;
        }

        let schema = TableSchema::from_columns(columns)
            .engine(engine)
            .transient(stmt.transient);
        let options = normalize_options(&stmt.options);
        validate_table_options(&options, &schema)?;

        let schema = schema
            .options(options)
            .cluster_by(stmt.cluster_by.clone());

        let table = self
            .catalog
            .create_table(database, &stmt.table, schema, stmt.if_not_exists)?;
        debug!(database, table = %stmt.table, engine = %engine, "create table committed");
        Ok(table)
    }

    /// Execute DROP TABLE
    pub fn drop_table(&self, stmt: &DropTableStatement) -> Result<()> {
        let database = database_or_default(&stmt.database);
        self.catalog
            .drop_table(database, &stmt.table, stmt.if_exists)
    }

    /// Execute ALTER TABLE ... SET OPTIONS: the same option policy as
    /// CREATE TABLE, re-run against the existing table's engine and
    /// schema. Validation runs inside the catalog's write-locked
    /// read-modify-write, so it always sees the entry being committed
    /// to, even if the table was dropped and recreated concurrently.
    pub fn alter_table_options(&self, stmt: &AlterTableStatement) -> Result<Arc<TableDef>> {
        let database = database_or_default(&stmt.database);
        self.catalog.assert_mutable_database(database)?;

        let options = normalize_options(&stmt.set_options);
        self.catalog
            .update_table_options(database, &stmt.table, &options, |schema| {
                validate_table_options(&options, schema)
            })
    }

    /// Render the DESCRIBE rows for a table
    pub fn describe_table(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnDescription>> {
        let database = database.unwrap_or(DEFAULT_DATABASE);
        let table = self.catalog.get_table(database, table)?;
        Ok(table.schema().describe())
    }
}

fn database_or_default(database: &Option<String>) -> &str {
    database.as_deref().unwrap_or(DEFAULT_DATABASE)
}

/// LIKE copies names, types, and nullability only; defaults and
/// options stay behind.
fn copy_structure(schema: &TableSchema) -> Vec<Column> {
    schema
        .columns()
        .iter()
        .map(|c| Column::new(c.name.clone(), c.data_type.clone()).nullable(c.nullable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataType, DefaultValue, Literal};
    use crate::error::Error;
    use crate::sql::{ColumnSpec, Expr, ProjectedColumn, QueryProjection};

    fn executor() -> DdlExecutor {
        DdlExecutor::new(Arc::new(Catalog::new()))
    }

    fn create(table: &str, columns: Vec<ColumnSpec>) -> CreateTableStatement {
        CreateTableStatement {
            table: table.to_string(),
            columns,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_create_table() {
        let exec = executor();
        let stmt = create(
            "t",
            vec![
                ColumnSpec::new("id", "INT8").not_null(true),
                ColumnSpec::new("a", "INT8").not_null(true).default(Expr::BinaryOp {
                    op: crate::sql::BinaryOperator::Plus,
                    left: Box::new(Expr::int(1)),
                    right: Box::new(Expr::int(2)),
                }),
            ],
        );
        let table = exec.create_table(&stmt).unwrap();
        assert_eq!(table.schema().engine, EngineKind::Fuse);
        assert_eq!(
            table.schema().get_column("a").unwrap().default,
            Some(DefaultValue::Literal(Literal::Int(3)))
        );

        let rows = exec.describe_table(None, "t").unwrap();
        assert_eq!(rows[1].default, "3");
    }

    #[test]
    fn test_validation_failure_leaves_catalog_unchanged() {
        let exec = executor();
        let stmt = create(
            "t",
            vec![ColumnSpec::new("a", "INT"), ColumnSpec::new("a", "INT")],
        );
        assert!(matches!(
            exec.create_table(&stmt),
            Err(Error::DuplicateColumnName(_))
        ));
        assert!(!exec.catalog().table_exists(DEFAULT_DATABASE, "t"));
    }

    #[test]
    fn test_system_database_rejected_before_anything_else() {
        let exec = executor();
        // Even a statement that would fail binding reports the
        // protected namespace first.
        let mut stmt = create(
            "t",
            vec![ColumnSpec::new("a", "INT"), ColumnSpec::new("a", "INT")],
        );
        stmt.database = Some("system".to_string());
        let err = exec.create_table(&stmt).unwrap_err();
        assert!(matches!(err, Error::ProtectedNamespace(_)));
        assert_eq!(err.code(), 1002);
    }

    #[test]
    fn test_create_table_like() {
        let exec = executor();
        let stmt = create(
            "src",
            vec![
                ColumnSpec::new("id", "INT").not_null(true),
                ColumnSpec::new("name", "VARCHAR"),
            ],
        );
        exec.create_table(&stmt).unwrap();

        let like = CreateTableStatement {
            table: "copy".to_string(),
            source: Some(CreateTableSource::Like {
                database: None,
                table: "src".to_string(),
            }),
            ..Default::default()
        };
        let copy = exec.create_table(&like).unwrap();
        let id = copy.schema().get_column("id").unwrap();
        assert_eq!(id.data_type, DataType::Int { unsigned: false });
        assert!(!id.nullable);
        // Defaults are not copied: the zero default of the source's
        // NOT NULL column is dropped.
        assert_eq!(id.default, None);

        let missing = CreateTableStatement {
            table: "copy2".to_string(),
            source: Some(CreateTableSource::Like {
                database: None,
                table: "absent".to_string(),
            }),
            ..Default::default()
        };
        assert!(matches!(
            exec.create_table(&missing),
            Err(Error::TableNotFound(_, _))
        ));
    }

    #[test]
    fn test_ctas_paths() {
        let exec = executor();
        let projection = QueryProjection {
            columns: vec![
                ProjectedColumn {
                    name: "a".to_string(),
                    data_type: DataType::Int { unsigned: false },
                    nullable: true,
                },
                ProjectedColumn {
                    name: "b".to_string(),
                    data_type: DataType::String,
                    nullable: false,
                },
            ],
        };

        let stmt = CreateTableStatement {
            table: "t".to_string(),
            source: Some(CreateTableSource::Query(projection.clone())),
            ..Default::default()
        };
        let table = exec.create_table(&stmt).unwrap();
        assert_eq!(table.schema().column_count(), 2);
        assert_eq!(table.schema().get_column("b").unwrap().data_type, DataType::String);

        let mismatched = CreateTableStatement {
            table: "t2".to_string(),
            columns: vec![ColumnSpec::new("x", "INT")],
            source: Some(CreateTableSource::Query(projection)),
            ..Default::default()
        };
        assert!(matches!(
            exec.create_table(&mismatched),
            Err(Error::ColumnCountMismatch { .. })
        ));
    }

    #[test]
    fn test_engine_and_cluster_key_policy() {
        let exec = executor();

        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.engine = Some("Paxos".to_string());
        assert!(matches!(
            exec.create_table(&stmt),
            Err(Error::UnknownEngine(_))
        ));

        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.engine = Some("MEMORY".to_string());
        stmt.cluster_by = vec!["a".to_string()];
        assert!(matches!(
            exec.create_table(&stmt),
            Err(Error::UnsupportedClusterBy(_))
        ));

        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.engine = Some("fuse".to_string());
        stmt.cluster_by = vec!["a".to_string()];
        let table = exec.create_table(&stmt).unwrap();
        assert_eq!(table.schema().cluster_by, vec!["a".to_string()]);
    }

    #[test]
    fn test_option_policy_applies_to_create_and_alter() {
        let exec = executor();

        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.options = vec![("row_per_block".to_string(), "100000000000".to_string())];
        assert!(matches!(
            exec.create_table(&stmt),
            Err(Error::InvalidOptionValue { .. })
        ));

        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.options = vec![("row_per_block".to_string(), "10000".to_string())];
        exec.create_table(&stmt).unwrap();

        let alter = AlterTableStatement {
            database: None,
            table: "t".to_string(),
            set_options: vec![("snapshot_location".to_string(), "x".to_string())],
        };
        let err = exec.alter_table_options(&alter).unwrap_err();
        assert!(matches!(err, Error::ReservedOrUnknownOption(_)));
        assert_eq!(err.code(), 3001);

        let alter = AlterTableStatement {
            database: None,
            table: "t".to_string(),
            set_options: vec![("bloom_index_columns".to_string(), "a".to_string())],
        };
        let updated = exec.alter_table_options(&alter).unwrap();
        assert_eq!(updated.version, 2);
        // The earlier option survives the merge.
        assert_eq!(
            updated.schema().options.get("row_per_block").map(String::as_str),
            Some("10000")
        );
    }

    #[test]
    fn test_alter_options_judged_against_current_table() {
        let exec = executor();
        exec.create_table(&create("t", vec![ColumnSpec::new("a", "INT")]))
            .unwrap();

        let bloom_on_a = AlterTableStatement {
            database: None,
            table: "t".to_string(),
            set_options: vec![("bloom_index_columns".to_string(), "a".to_string())],
        };
        exec.alter_table_options(&bloom_on_a).unwrap();

        // Drop and recreate the table without column `a`: the same
        // option bag must now be rejected, since validation runs
        // against the entry that would receive the options.
        exec.drop_table(&crate::sql::DropTableStatement {
            database: None,
            table: "t".to_string(),
            if_exists: false,
        })
        .unwrap();
        exec.create_table(&create("t", vec![ColumnSpec::new("b", "INT")]))
            .unwrap();

        let err = exec.alter_table_options(&bloom_on_a).unwrap_err();
        assert!(matches!(err, Error::InvalidOptionValue { .. }));
        let table = exec.catalog().get_table(DEFAULT_DATABASE, "t").unwrap();
        assert!(!table.schema().options.contains_key("bloom_index_columns"));
    }

    #[test]
    fn test_transient_flag_round_trips() {
        let exec = executor();
        let mut stmt = create("t", vec![ColumnSpec::new("a", "INT")]);
        stmt.transient = true;
        let table = exec.create_table(&stmt).unwrap();
        assert!(table.schema().transient);
    }
}
