//! Schema catalog for QuarryDB
//!
//! The catalog is the authoritative namespace of databases and tables,
//! shared by all sessions. A single lock spans every check-then-mutate
//! sequence, so create/drop/alter on one qualified name linearize: two
//! concurrent CREATEs of the same table yield exactly one success.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::schema::{TableDef, TableSchema};
use crate::error::{Error, Result};
use crate::options::TableOptions;

/// The reserved, read-only namespace
pub const SYSTEM_DATABASE: &str = "system";

/// The database used when a statement names none
pub const DEFAULT_DATABASE: &str = "default";

/// A named catalog node holding table definitions
#[derive(Debug, Default, Clone)]
struct Database {
    tables: HashMap<String, Arc<TableDef>>,
}

/// Shared, linearizable namespace of databases and tables
#[derive(Debug)]
pub struct Catalog {
    /// All databases; one lock spans every check-then-mutate sequence
    databases: RwLock<HashMap<String, Database>>,
    /// Next table ID / version marker
    next_table_id: RwLock<u64>,
}

impl Catalog {
    /// Create a catalog with the built-in `default` and `system`
    /// databases.
    pub fn new() -> Self {
        let mut databases = HashMap::new();
        databases.insert(DEFAULT_DATABASE.to_string(), Database::default());
        databases.insert(SYSTEM_DATABASE.to_string(), Database::default());
        Self {
            databases: RwLock::new(databases),
            next_table_id: RwLock::new(1),
        }
    }

    /// Fail with `ProtectedNamespace` for any mutation aimed at the
    /// system database. Runs before existence checks.
    pub fn assert_mutable_database(&self, database: &str) -> Result<()> {
        if database.eq_ignore_ascii_case(SYSTEM_DATABASE) {
            return Err(Error::ProtectedNamespace(database.to_string()));
        }
        Ok(())
    }

    /// Create a database
    pub fn create_database(&self, name: &str, if_not_exists: bool) -> Result<()> {
        self.assert_mutable_database(name)?;
        let mut databases = self.databases.write().unwrap();
        if databases.contains_key(name) {
            if if_not_exists {
                return Ok(());
            }
            return Err(Error::DatabaseAlreadyExists(name.to_string()));
        }
        databases.insert(name.to_string(), Database::default());
        debug!(database = name, "created database");
        Ok(())
    }

    /// Drop a database and all of its tables
    pub fn drop_database(&self, name: &str, if_exists: bool) -> Result<()> {
        self.assert_mutable_database(name)?;
        let mut databases = self.databases.write().unwrap();
        if databases.remove(name).is_none() && !if_exists {
            return Err(Error::DatabaseNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Atomically create a table: the existence check and the insert
    /// happen under one write lock.
    ///
    /// With `if_not_exists`, creating over an existing table is a no-op
    /// success and the original schema is retained unchanged.
    pub fn create_table(
        &self,
        database: &str,
        table: &str,
        schema: TableSchema,
        if_not_exists: bool,
    ) -> Result<Arc<TableDef>> {
        self.assert_mutable_database(database)?;
        let mut databases = self.databases.write().unwrap();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;

        if let Some(existing) = db.tables.get(table) {
            if if_not_exists {
                return Ok(existing.clone());
            }
            return Err(Error::TableAlreadyExists(
                database.to_string(),
                table.to_string(),
            ));
        }

        let mut next_id = self.next_table_id.write().unwrap();
        let table_def = Arc::new(TableDef::new(database, table, schema, *next_id));
        *next_id += 1;

        db.tables.insert(table.to_string(), table_def.clone());
        debug!(database, table, id = table_def.id, "created table");
        Ok(table_def)
    }

    /// Drop a table. With `if_exists` the transition is idempotent.
    pub fn drop_table(&self, database: &str, table: &str, if_exists: bool) -> Result<()> {
        self.assert_mutable_database(database)?;
        let mut databases = self.databases.write().unwrap();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;

        if db.tables.remove(table).is_none() && !if_exists {
            return Err(Error::TableNotFound(
                database.to_string(),
                table.to_string(),
            ));
        }
        debug!(database, table, "dropped table");
        Ok(())
    }

    /// Get a table by qualified name
    pub fn get_table(&self, database: &str, table: &str) -> Result<Arc<TableDef>> {
        let databases = self.databases.read().unwrap();
        let db = databases
            .get(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;
        db.tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(database.to_string(), table.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, database: &str, table: &str) -> bool {
        let databases = self.databases.read().unwrap();
        databases
            .get(database)
            .map(|db| db.tables.contains_key(table))
            .unwrap_or(false)
    }

    /// List all table names in a database
    pub fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        let databases = self.databases.read().unwrap();
        let db = databases
            .get(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;
        Ok(db.tables.keys().cloned().collect())
    }

    /// List all database names
    pub fn list_databases(&self) -> Vec<String> {
        let databases = self.databases.read().unwrap();
        databases.keys().cloned().collect()
    }

    /// Apply options to an existing table as a single
    /// read-modify-write, bumping the table version.
    ///
    /// `validate` runs against the entry under the same write lock
    /// that commits, so the schema it sees cannot be replaced between
    /// validation and commit. A validation error aborts with no
    /// mutation.
    pub fn update_table_options<F>(
        &self,
        database: &str,
        table: &str,
        options: &TableOptions,
        validate: F,
    ) -> Result<Arc<TableDef>>
    where
        F: FnOnce(&TableSchema) -> Result<()>,
    {
        self.assert_mutable_database(database)?;
        let mut databases = self.databases.write().unwrap();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;
        let existing = db
            .tables
            .get(table)
            .ok_or_else(|| Error::TableNotFound(database.to_string(), table.to_string()))?;

        validate(&existing.schema)?;

        let mut updated = (**existing).clone();
        for (key, value) in options {
            updated.schema.options.insert(key.clone(), value.clone());
        }
        updated.version += 1;

        let updated = Arc::new(updated);
        db.tables.insert(table.to_string(), updated.clone());
        debug!(database, table, version = updated.version, "updated table options");
        Ok(updated)
    }

    /// Save the catalog to disk as JSON
    pub fn save_to_disk(&self, path: &str) -> Result<()> {
        let data = CatalogData {
            databases: self
                .databases
                .read()
                .unwrap()
                .iter()
                .map(|(name, db)| {
                    (
                        name.clone(),
                        db.tables.values().map(|t| (**t).clone()).collect(),
                    )
                })
                .collect(),
            next_table_id: *self.next_table_id.read().unwrap(),
        };
        let json =
            serde_json::to_string_pretty(&data).map_err(|e| Error::Internal(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a catalog from disk
    pub fn load_from_disk(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let data: CatalogData =
            serde_json::from_str(&json).map_err(|e| Error::Internal(e.to_string()))?;

        let mut databases = HashMap::new();
        for (name, tables) in data.databases {
            let tables = tables
                .into_iter()
                .map(|t| (t.name.clone(), Arc::new(t)))
                .collect();
            databases.insert(name, Database { tables });
        }

        Ok(Self {
            databases: RwLock::new(databases),
            next_table_id: RwLock::new(data.next_table_id),
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable proxy for Catalog
#[derive(serde::Serialize, serde::Deserialize)]
struct CatalogData {
    databases: Vec<(String, Vec<TableDef>)>,
    next_table_id: u64,
}
