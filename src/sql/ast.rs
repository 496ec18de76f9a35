//! DDL Abstract Syntax Tree (AST)
//!
//! This module defines the statement shapes consumed from the external
//! SQL parser. The parser owns all text-level concerns; everything here
//! is already tokenized into names, type tokens, and expression trees.

use crate::catalog::{DataType, Literal};
use crate::options::ExternalLocation;

/// A DDL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement (plain, LIKE, or AS SELECT)
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// ALTER TABLE ... SET OPTIONS statement
    AlterTable(AlterTableStatement),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Target database; the session default when absent
    pub database: Option<String>,
    /// Table name
    pub table: String,
    /// Explicit column specifications (may be empty for CTAS/LIKE)
    pub columns: Vec<ColumnSpec>,
    /// Engine name token, if an ENGINE clause was given
    pub engine: Option<String>,
    /// Raw option key/value pairs in statement order
    pub options: Vec<(String, String)>,
    /// Rendered cluster key expressions
    pub cluster_by: Vec<String>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
    /// TRANSIENT flag
    pub transient: bool,
    /// External stored-location clause, if present
    pub external: Option<ExternalLocation>,
    /// LIKE or AS SELECT source, if present
    pub source: Option<CreateTableSource>,
}

impl Default for CreateTableStatement {
    fn default() -> Self {
        Self {
            database: None,
            table: String::new(),
            columns: Vec::new(),
            engine: None,
            options: Vec::new(),
            cluster_by: Vec::new(),
            if_not_exists: false,
            transient: false,
            external: None,
            source: None,
        }
    }
}

/// The structural source of a CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub enum CreateTableSource {
    /// CREATE TABLE ... LIKE other_table
    Like {
        database: Option<String>,
        table: String,
    },
    /// CREATE TABLE ... AS SELECT, carrying the query's projected
    /// output as resolved by the query planner
    Query(QueryProjection),
}

/// The ordered projected output of a SELECT source
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProjection {
    pub columns: Vec<ProjectedColumn>,
}

/// One projected output column of a query source
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedColumn {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub database: Option<String>,
    pub table: String,
    pub if_exists: bool,
}

/// ALTER TABLE ... SET OPTIONS statement
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub database: Option<String>,
    pub table: String,
    /// Raw option key/value pairs to set
    pub set_options: Vec<(String, String)>,
}

/// A column specification as written in the statement
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Unparsed type token, e.g. `VARCHAR` or `MAP(INT, STRING)`
    pub type_token: String,
    /// NOT NULL flag
    pub not_null: bool,
    /// DEFAULT expression, if any
    pub default: Option<Expr>,
    /// AUTO_INCREMENT-style modifier; always rejected by the binder
    pub auto_increment: bool,
}

impl ColumnSpec {
    /// Create a plain nullable column spec
    pub fn new(name: impl Into<String>, type_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_token: type_token.into(),
            not_null: false,
            default: None,
            auto_increment: false,
        }
    }

    /// Set the NOT NULL flag
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Set the DEFAULT expression
    pub fn default(mut self, expr: Expr) -> Self {
        self.default = Some(expr);
        self
    }

    /// Set the AUTO_INCREMENT flag
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }
}

/// A default-clause expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value
    Literal(Literal),
    /// A reference to another column; never foldable
    Column(String),
    /// A function call
    FunctionCall { name: String, args: Vec<Expr> },
    /// A unary operation
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },
    /// A binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Shorthand for an integer literal
    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    /// Shorthand for a string literal
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(value.into()))
    }

    /// Shorthand for a zero-argument function call
    pub fn call(name: impl Into<String>) -> Self {
        Expr::FunctionCall {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// Binary operators permitted in default expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

/// Unary operators permitted in default expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}
