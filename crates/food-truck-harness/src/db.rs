// crates/food-truck-harness/src/db.rs
// ============================================================================
// Module: Database Verification Helper
// Description: Read-only SQLite queries returning JSON rows.
// Purpose: Support direct storage checks once the service exposes a database.
// Dependencies: rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteHelper`] opens the database read-only for each query and returns
//! rows as JSON objects keyed by column name. The live suite does not use it
//! yet; the data-integrity test that would is ignored until the service ships
//! a database.

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::ToSql;
use rusqlite::types::ValueRef;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// Database file used when no path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "food_trucks.db";

/// One result row keyed by column name.
pub type Row = Map<String, Value>;

/// Database helper failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be opened.
    #[error("failed to open database {}: {source}", .path.display())]
    Open {
        /// Database path.
        path: PathBuf,
        /// Driver error.
        #[source]
        source: rusqlite::Error,
    },
    /// The query failed.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Read-only SQLite query helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteHelper {
    /// Database file.
    path: PathBuf,
}

impl SqliteHelper {
    /// Uses `path`, or [`DEFAULT_DATABASE_PATH`] when `None`.
    #[must_use]
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), Path::to_path_buf),
        }
    }

    /// Database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the database cannot be opened or the query
    /// fails.
    pub fn execute_query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, DbError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DbError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Map::new();
            for (index, column) in columns.iter().enumerate() {
                record.insert(column.clone(), json_value(row.get_ref(index)?));
            }
            out.push(record);
        }
        Ok(out)
    }

    /// Returns true when a `food_trucks` row has exactly this applicant.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on open or query failure.
    pub fn verify_truck_exists(&self, applicant: &str) -> Result<bool, DbError> {
        let rows = self.execute_query(
            "SELECT * FROM food_trucks WHERE applicant = ?1",
            &[&applicant as &dyn ToSql],
        )?;
        Ok(!rows.is_empty())
    }
}

/// Converts a SQLite value into JSON.
fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => Value::from(number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()),
    }
}
