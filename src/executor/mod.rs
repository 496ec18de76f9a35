//! Statement execution

pub mod ddl;

pub use ddl::DdlExecutor;
