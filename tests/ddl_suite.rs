use std::sync::Arc;
use std::thread;

use quarrydb::catalog::{Catalog, DataType, DEFAULT_DATABASE};
use quarrydb::executor::DdlExecutor;
use quarrydb::sql::{
    AlterTableStatement, ColumnSpec, CreateTableSource, CreateTableStatement, DropTableStatement,
    Expr, ProjectedColumn, QueryProjection,
};
use quarrydb::Error;

fn executor() -> DdlExecutor {
    DdlExecutor::new(Arc::new(Catalog::new()))
}

fn create_stmt(table: &str, columns: Vec<ColumnSpec>) -> CreateTableStatement {
    CreateTableStatement {
        table: table.to_string(),
        columns,
        ..Default::default()
    }
}

#[test]
fn test_type_rendering_round_trips_through_describe() {
    let exec = executor();
    let stmt = create_stmt(
        "t",
        vec![
            ColumnSpec::new("a", "INT"),
            ColumnSpec::new("b", "BIGINT UNSIGNED"),
            ColumnSpec::new("c", "ARRAY(INT)"),
            ColumnSpec::new("d", "TUPLE(INT, BOOLEAN)"),
            ColumnSpec::new("e", "MAP(INT, VARCHAR)"),
            ColumnSpec::new("f", "DECIMAL(4, 2)"),
        ],
    );
    exec.create_table(&stmt).unwrap();

    let table = exec.catalog().get_table(DEFAULT_DATABASE, "t").unwrap();
    for row in exec.describe_table(None, "t").unwrap() {
        let reparsed = DataType::parse(&row.data_type).unwrap();
        let bound = &table.schema().get_column(&row.name).unwrap().data_type;
        assert_eq!(&reparsed, bound, "type column must round-trip");
    }

    let rows = exec.describe_table(None, "t").unwrap();
    assert_eq!(rows[0].data_type, "INT32");
    assert_eq!(rows[1].data_type, "INT64 UNSIGNED");
    assert_eq!(rows[2].data_type, "ARRAY(INT32)");
    assert_eq!(rows[3].data_type, "TUPLE(1 INT32, 2 BOOLEAN)");
    assert_eq!(rows[4].data_type, "MAP(INT32, STRING)");
    assert_eq!(rows[5].data_type, "DECIMAL(4, 2)");
}

#[test]
fn test_not_null_columns_get_zero_defaults() {
    let exec = executor();
    let stmt = create_stmt(
        "t",
        vec![
            ColumnSpec::new("i", "INT").not_null(true),
            ColumnSpec::new("b", "BOOLEAN").not_null(true),
            ColumnSpec::new("s", "VARCHAR").not_null(true),
            ColumnSpec::new("d", "DATE").not_null(true),
            ColumnSpec::new("ts", "TIMESTAMP").not_null(true),
            ColumnSpec::new("arr", "ARRAY(INT)").not_null(true),
            ColumnSpec::new("v", "VARIANT").not_null(true),
            ColumnSpec::new("n", "INT"),
        ],
    );
    exec.create_table(&stmt).unwrap();

    let rows = exec.describe_table(None, "t").unwrap();
    assert_eq!(rows[0].default, "0");
    assert_eq!(rows[0].nullable, "NO");
    assert_eq!(rows[1].default, "false");
    assert_eq!(rows[2].default, "''");
    assert_eq!(rows[3].default, "'1970-01-01'");
    assert_eq!(rows[4].default, "'1970-01-01 00:00:00'");
    assert_eq!(rows[5].default, "[]");
    assert_eq!(rows[6].default, "null");
    assert_eq!(rows[7].default, "NULL");
    assert_eq!(rows[7].nullable, "YES");
    assert_eq!(rows[7].comment, "(empty)");
}

#[test]
fn test_concurrent_create_has_exactly_one_winner() {
    let catalog = Arc::new(Catalog::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let catalog = catalog.clone();
            thread::spawn(move || {
                let exec = DdlExecutor::new(catalog);
                let stmt = create_stmt("race", vec![ColumnSpec::new(format!("c{}", i), "INT")]);
                exec.create_table(&stmt).map(|t| (i, t.id))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one CREATE must win");
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, Error::TableAlreadyExists(_, _)));
            assert_eq!(err.code(), 2302);
        }
    }

    // The surviving entry is the winner's schema.
    let (winner, winner_id) = *winners[0].as_ref().unwrap();
    let table = catalog.get_table(DEFAULT_DATABASE, "race").unwrap();
    assert_eq!(table.id, winner_id);
    assert!(table.schema().has_column(&format!("c{}", winner)));
    assert_eq!(table.schema().column_count(), 1);
}

#[test]
fn test_create_if_not_exists_is_idempotent() {
    let exec = executor();
    let mut first = create_stmt("t", vec![ColumnSpec::new("a", "INT")]);
    first.if_not_exists = true;
    let original = exec.create_table(&first).unwrap();

    let mut second = create_stmt("t", vec![ColumnSpec::new("b", "STRING")]);
    second.if_not_exists = true;
    let kept = exec.create_table(&second).unwrap();

    assert_eq!(kept.id, original.id);
    assert_eq!(kept.schema(), original.schema());
    assert!(kept.schema().has_column("a"));
    assert!(!kept.schema().has_column("b"));

    // Without the flag the same statement fails.
    let third = create_stmt("t", vec![ColumnSpec::new("a", "INT")]);
    assert!(matches!(
        exec.create_table(&third),
        Err(Error::TableAlreadyExists(_, _))
    ));
}

#[test]
fn test_drop_table_if_exists() {
    let exec = executor();
    exec.create_table(&create_stmt("t", vec![ColumnSpec::new("a", "INT")]))
        .unwrap();

    exec.drop_table(&DropTableStatement {
        database: None,
        table: "t".to_string(),
        if_exists: false,
    })
    .unwrap();

    let err = exec
        .drop_table(&DropTableStatement {
            database: None,
            table: "t".to_string(),
            if_exists: false,
        })
        .unwrap_err();
    assert!(matches!(err, Error::TableNotFound(_, _)));

    exec.drop_table(&DropTableStatement {
        database: None,
        table: "t".to_string(),
        if_exists: true,
    })
    .unwrap();
}

#[test]
fn test_ctas_column_list_reconciliation() {
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
                nullable: true,
            },
        ],
    };

    // Length mismatch
    let stmt = CreateTableStatement {
        table: "t".to_string(),
        columns: vec![ColumnSpec::new("x", "INT")],
        source: Some(CreateTableSource::Query(projection.clone())),
        ..Default::default()
    };
    let err = exec.create_table(&stmt).unwrap_err();
    assert!(matches!(err, Error::ColumnCountMismatch { .. }));
    assert_eq!(err.code(), 1006);

    // Duplicate projected name, detected before the length check
    let dup = QueryProjection {
        columns: vec![
            ProjectedColumn {
                name: "a".to_string(),
                data_type: DataType::Int { unsigned: false },
                nullable: true,
            },
            ProjectedColumn {
                name: "A".to_string(),
                data_type: DataType::Int { unsigned: false },
                nullable: true,
            },
        ],
    };
    let stmt = CreateTableStatement {
        table: "t".to_string(),
        columns: vec![ColumnSpec::new("x", "INT")],
        source: Some(CreateTableSource::Query(dup)),
        ..Default::default()
    };
    assert!(matches!(
        exec.create_table(&stmt),
        Err(Error::DuplicateColumnName(_))
    ));

    // Explicit list defines the schema
    let stmt = CreateTableStatement {
        table: "t".to_string(),
        columns: vec![
            ColumnSpec::new("x", "STRING").not_null(true),
            ColumnSpec::new("y", "INT"),
        ],
        source: Some(CreateTableSource::Query(projection)),
        ..Default::default()
    };
    let table = exec.create_table(&stmt).unwrap();
    assert_eq!(table.schema().column_names(), vec!["x", "y"]);
    assert_eq!(table.schema().get_column("x").unwrap().data_type, DataType::String);
}

#[test]
fn test_spec_scenarios() {
    let exec = executor();

    // CREATE TABLE t(a INT, a INT) -> duplicate column
    let err = exec
        .create_table(&create_stmt(
            "t",
            vec![ColumnSpec::new("a", "INT"), ColumnSpec::new("a", "INT")],
        ))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateColumnName(_)));

    // row_per_block out of range fails, in range succeeds
    let mut stmt = create_stmt("t", vec![ColumnSpec::new("a", "INT")]);
    stmt.options = vec![("row_per_block".to_string(), "100000000000".to_string())];
    assert!(matches!(
        exec.create_table(&stmt),
        Err(Error::InvalidOptionValue { .. })
    ));

    let mut stmt = create_stmt("t", vec![ColumnSpec::new("a", "INT")]);
    stmt.options = vec![("row_per_block".to_string(), "10000".to_string())];
    exec.create_table(&stmt).unwrap();

    // bloom index over a decimal column fails
    let mut stmt = create_stmt("t2", vec![ColumnSpec::new("a", "DECIMAL(4,2)")]);
    stmt.options = vec![("bloom_index_columns".to_string(), "a".to_string())];
    assert!(matches!(
        exec.create_table(&stmt),
        Err(Error::InvalidOptionValue { .. })
    ));

    // DEFAULT CURRENT_TIMESTAMP is outside the allow-list
    let stmt = create_stmt(
        "t3",
        vec![
            ColumnSpec::new("id", "INT8"),
            ColumnSpec::new("created", "TIMESTAMP").default(Expr::call("current_timestamp")),
        ],
    );
    let err = exec.create_table(&stmt).unwrap_err();
    assert!(matches!(err, Error::InvalidDefaultExpression { .. }));
    assert_eq!(err.code(), 1065);

    // DEFAULT 1+2 folds to 3
    let stmt = create_stmt(
        "t4",
        vec![
            ColumnSpec::new("id", "INT8").not_null(true),
            ColumnSpec::new("a", "INT8").not_null(true).default(Expr::BinaryOp {
                op: quarrydb::sql::BinaryOperator::Plus,
                left: Box::new(Expr::int(1)),
                right: Box::new(Expr::int(2)),
            }),
        ],
    );
    exec.create_table(&stmt).unwrap();
    let rows = exec.describe_table(None, "t4").unwrap();
    assert_eq!(rows[1].default, "3");

    // CREATE TABLE system.t -> protected namespace
    let mut stmt = create_stmt("t", vec![ColumnSpec::new("a", "INT")]);
    stmt.database = Some("system".to_string());
    let err = exec.create_table(&stmt).unwrap_err();
    assert!(matches!(err, Error::ProtectedNamespace(_)));
    assert_eq!(err.code(), 1002);
}

#[test]
fn test_deferred_now_default() {
    let exec = executor();
    let stmt = create_stmt(
        "t",
        vec![ColumnSpec::new("created", "TIMESTAMP").default(Expr::call("now"))],
    );
    exec.create_table(&stmt).unwrap();
    let rows = exec.describe_table(None, "t").unwrap();
    assert_eq!(rows[0].default, "now()");
}

#[test]
fn test_concurrent_alters_on_distinct_tables() {
    let catalog = Arc::new(Catalog::new());
    let exec = DdlExecutor::new(catalog.clone());
    for name in ["a", "b", "c", "d"] {
        exec.create_table(&create_stmt(name, vec![ColumnSpec::new("x", "INT")]))
            .unwrap();
    }

    let handles: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| {
            let catalog = catalog.clone();
            thread::spawn(move || {
                let exec = DdlExecutor::new(catalog);
                for i in 1..=10u64 {
                    exec.alter_table_options(&AlterTableStatement {
                        database: None,
                        table: name.to_string(),
                        set_options: vec![("row_per_block".to_string(), (1000 + i).to_string())],
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for name in ["a", "b", "c", "d"] {
        let table = catalog.get_table(DEFAULT_DATABASE, name).unwrap();
        assert_eq!(table.version, 11);
        assert_eq!(
            table.schema().options.get("row_per_block").map(String::as_str),
            Some("1010")
        );
    }
}
