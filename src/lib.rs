//! QuarryDB - table-definition subsystem for a SQL engine
//!
//! This library provides the DDL core of a SQL database:
//! - Type system (scalar and nested composite column types)
//! - Default-expression constant folding
//! - Storage engine and table option policy
//! - Schema binder and CTAS column resolution
//! - Shared, linearizable schema catalog
//!
//! SQL text parsing, query execution, and physical storage are
//! external collaborators; statements enter as a pre-parsed AST and
//! leave as committed catalog entries or typed errors.

pub mod binder;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod options;
pub mod sql;

pub use error::{Error, Result};
