//! Local record store: connection and table creation.
//!
//! The store is a `SQLite` database reached through `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! guarded by `IF NOT EXISTS` so an existing database file is reused as is.

use crate::entities::Record;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Store used when neither `DATABASE_URL` nor the settings file name one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/pipeline_desk.sqlite?mode=rwc";

/// Resolves the store URL: `DATABASE_URL`, then the configured value, then [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Directory an `sqlite://` file URL lives in, if it names one.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url.strip_prefix("sqlite://")?.split('?').next()?;
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}

/// Connects to the store, creating the database directory first when needed.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        debug!("Ensuring database directory {:?} exists", dir);
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::connect(database_url).await?;
    info!("Connected to record store at {}", database_url);
    Ok(db)
}

/// Creates the `records` table if it is missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut records_table = schema.create_table_from_entity(Record);
    records_table.if_not_exists();
    db.execute(builder.build(&records_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RecordModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let rows: Vec<RecordModel> = Record::find().limit(1).all(&db).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/pipeline_desk.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://crm.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }
}
