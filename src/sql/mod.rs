//! DDL statement AST consumed from the external SQL parser

pub mod ast;

pub use ast::{
    AlterTableStatement, BinaryOperator, ColumnSpec, CreateTableSource, CreateTableStatement,
    DropTableStatement, Expr, ProjectedColumn, QueryProjection, Statement, UnaryOperator,
};
