//! Database configuration module for `SalesBuddy`.
//!
//! This module opens the storage connection and creates the sales table using `SeaORM`.
//! The connection is opened once by the hosting process and passed by reference into
//! every operation; there is no global handle. Table and index definitions are derived
//! from the entity with `Schema::create_table_from_entity`, so the same code creates the
//! schema on `SQLite` (local) and Postgres (production).

use crate::entities::Sale;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the local `SQLite` database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/sales_buddy.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file. A `postgres://` URL selects the Postgres backend.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(&dir)?;
    }
    debug!("Connecting to database");
    let db = Database::connect(database_url).await?;
    info!(backend = ?db.get_database_backend(), "Database connection established");
    Ok(db)
}

/// Directory that must exist before a file-backed `SQLite` URL can be opened.
fn sqlite_parent_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Creates the sales table and its indexes if they do not exist yet.
///
/// Existing data is never touched, so this is safe to run on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let sale_table = schema.create_table_from_entity(Sale).if_not_exists().to_owned();
    db.execute(builder.build(&sale_table)).await?;

    for mut index in schema.create_index_from_entity(Sale) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}

/// Closes the connection, releasing pooled resources. Called once on shutdown.
pub async fn close_connection(db: DatabaseConnection) -> Result<()> {
    db.close().await?;
    info!("Database connection closed");
    Ok(())
}
