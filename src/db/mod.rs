// History store: SQLite storage for past predictions.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever VERACITY_DB_PATH points
// (defaults to ./history.db).

pub mod models;
#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use models::PredictionRecord;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::Database;

use anyhow::Result;
use std::sync::Arc;

#[cfg(feature = "sqlite")]
use anyhow::Context;
#[cfg(feature = "sqlite")]
use rusqlite::Connection;
#[cfg(feature = "sqlite")]
use std::path::Path;

/// Open (or create) the database and run migrations.
///
/// Called by `veracity init` and by `serve`, which should work on a fresh
/// checkout.
#[cfg(feature = "sqlite")]
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
#[cfg(feature = "sqlite")]
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `veracity init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Databases created by older builds may predate the current schema.
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Create (if needed) and wrap the database behind the trait.
pub fn initialize_database(db_path: &str) -> Result<Arc<dyn Database>> {
    #[cfg(feature = "sqlite")]
    {
        Ok(Arc::new(SqliteDatabase::new(initialize(db_path)?)))
    }
    #[cfg(not(feature = "sqlite"))]
    anyhow::bail!(
        "No history backend compiled in (database path {db_path}).\n\
         Rebuild with: cargo build --features sqlite"
    )
}

/// Open an existing database behind the trait.
pub fn open_database(db_path: &str) -> Result<Arc<dyn Database>> {
    #[cfg(feature = "sqlite")]
    {
        Ok(Arc::new(SqliteDatabase::new(open(db_path)?)))
    }
    #[cfg(not(feature = "sqlite"))]
    anyhow::bail!(
        "No history backend compiled in (database path {db_path}).\n\
         Rebuild with: cargo build --features sqlite"
    )
}
