//! Schema catalog: data types, table schemas, and the shared namespace

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::{Catalog, DEFAULT_DATABASE, SYSTEM_DATABASE};
pub use schema::{Column, ColumnDescription, DefaultValue, Literal, TableDef, TableSchema};
pub use types::DataType;
