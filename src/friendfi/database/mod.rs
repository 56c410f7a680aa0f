use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    sqlite::SqlitePoolOptions,
    Sqlite, SqlitePool,
};
use std::{
    path::PathBuf,
    sync::LazyLock,
    time::{Duration, SystemTime},
};
use thiserror::Error;

pub mod accounts;
pub mod app_settings;
pub mod resolved_content;

pub static MIGRATOR: LazyLock<Migrator> = LazyLock::new(|| sqlx::migrate!("./db_migrations"));

const DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_BUSY_TIMEOUT_MS: u32 = 5000;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),
    #[error("Invalid timestamp: {timestamp} cannot be converted to DateTime")]
    InvalidTimestamp { timestamp: i64 },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: SqlitePool,
    pub path: PathBuf,
    pub last_connected: SystemTime,
}

impl Database {
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        // Create parent directories if they don't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}", db_path.display());

        tracing::debug!("Checking if DB exists...{:?}", db_url);
        match Sqlite::database_exists(&db_url).await {
            Ok(true) => {
                tracing::debug!("DB exists");
            }
            Ok(false) => {
                tracing::debug!("DB does not exist, creating...");
                Sqlite::create_database(&db_url).await.map_err(|e| {
                    tracing::error!("Error creating DB: {:?}", e);
                    DatabaseError::Sqlx(e)
                })?;
                tracing::debug!("DB created");
            }
            Err(e) => {
                tracing::warn!(
                    "Could not check if database exists: {:?}, attempting to create",
                    e
                );
                Sqlite::create_database(&db_url).await.map_err(|e| {
                    tracing::error!("Error creating DB: {:?}", e);
                    DatabaseError::Sqlx(e)
                })?;
            }
        }

        let pool = Self::create_connection_pool(&db_url).await?;

        // Automatically run migrations
        MIGRATOR.run(&pool).await?;

        Ok(Self {
            pool,
            path: db_path,
            last_connected: SystemTime::now(),
        })
    }

    /// Creates and configures a SQLite connection pool
    async fn create_connection_pool(db_url: &str) -> Result<SqlitePool, DatabaseError> {
        tracing::debug!("Creating connection pool...");
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(DB_ACQUIRE_TIMEOUT_SECS))
            .max_connections(DB_MAX_CONNECTIONS)
            .after_connect(|conn, _| {
                Box::pin(async move {
                    let conn = &mut *conn;
                    // Enable WAL mode for better concurrent access
                    sqlx::query("PRAGMA journal_mode=WAL")
                        .execute(&mut *conn)
                        .await?;
                    // Set busy timeout for lock contention
                    sqlx::query(&format!("PRAGMA busy_timeout={DB_BUSY_TIMEOUT_MS}"))
                        .execute(&mut *conn)
                        .await?;
                    // Enable foreign keys and triggers
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA recursive_triggers = ON")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(&format!("{db_url}?mode=rwc"))
            .await?;
        Ok(pool)
    }

    /// Runs all pending database migrations
    ///
    /// This method is idempotent - it's safe to call multiple times.
    /// Only new migrations will be applied.
    pub async fn migrate_up(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Deletes all data by dropping and recreating all tables
    ///
    /// This method:
    /// - Temporarily disables foreign key constraints
    /// - Drops all user tables (including migration tracking)
    /// - Re-enables foreign key constraints
    /// - Re-runs migrations to recreate the current schema from scratch
    /// - Uses a transaction to ensure atomicity
    pub async fn delete_all_data(&self) -> Result<(), DatabaseError> {
        let mut txn = self.pool.begin().await?;

        // Disable foreign key constraints temporarily to allow dropping tables in any order
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *txn)
            .await?;

        // Get all user tables (excluding only SQLite system tables)
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master
             WHERE type='table'
             AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&mut *txn)
        .await?;

        // Drop all user tables (order doesn't matter with FK constraints disabled)
        for (table_name,) in tables {
            let drop_query = format!("DROP TABLE IF EXISTS {}", table_name);
            sqlx::query(&drop_query).execute(&mut *txn).await?;
        }

        // Re-enable foreign key constraints
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *txn)
            .await?;

        txn.commit().await?;

        // Re-run migrations to recreate the current schema
        MIGRATOR.run(&self.pool).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path)
            .await
            .expect("Failed to create test database");
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_database_creation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        let db = Database::new(db_path.clone()).await;
        assert!(db.is_ok());

        let db = db.unwrap();
        assert_eq!(db.path, db_path);
        assert!(db.last_connected.elapsed().unwrap().as_secs() < 2);
    }

    #[tokio::test]
    async fn test_database_creation_with_nested_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("nested").join("path").join("test.db");

        // Database should be created successfully even with nested directories
        let db = Database::new(db_path.clone()).await;
        assert!(db.is_ok());

        let db = db.unwrap();
        assert_eq!(db.path, db_path);
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_database_migrations_applied() {
        let (db, _temp_dir) = create_test_db().await;

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .fetch_all(&db.pool)
                .await
                .expect("Failed to fetch table names");

        let table_names: Vec<String> = tables.into_iter().map(|t| t.0).collect();
        assert!(table_names.contains(&"accounts".to_string()));
        assert!(table_names.contains(&"app_settings".to_string()));
        assert!(table_names.contains(&"resolved_content".to_string()));
    }

    #[tokio::test]
    async fn test_database_pragma_settings() {
        let (db, _temp_dir) = create_test_db().await;

        // Check that foreign keys are enabled
        let foreign_keys: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to check foreign_keys pragma");
        assert_eq!(foreign_keys.0, 1);

        // Check that recursive triggers are enabled
        let recursive_triggers: (i64,) = sqlx::query_as("PRAGMA recursive_triggers")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to check recursive_triggers pragma");
        assert_eq!(recursive_triggers.0, 1);

        // Check that WAL mode is enabled
        let journal_mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to check journal_mode pragma");
        assert_eq!(journal_mode.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_delete_all_data() {
        let (db, _temp_dir) = create_test_db().await;

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at)
             VALUES ('0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa', 'alice', 'ephemeral', 0, 0)",
        )
        .execute(&db.pool)
        .await
        .expect("Failed to insert test account");

        sqlx::query(
            "INSERT INTO resolved_content (pointer, metadata, fetched_at)
             VALUES ('ipfs://QmTest', '{}', 0)",
        )
        .execute(&db.pool)
        .await
        .expect("Failed to insert test content");

        let account_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to count accounts");
        assert_eq!(account_count.0, 1);

        let content_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resolved_content")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to count resolved content");
        assert_eq!(content_count.0, 1);

        let result = db.delete_all_data().await;
        assert!(result.is_ok());

        let account_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to count accounts after deletion");
        assert_eq!(account_count.0, 0);

        let content_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resolved_content")
            .fetch_one(&db.pool)
            .await
            .expect("Failed to count resolved content after deletion");
        assert_eq!(content_count.0, 0);
    }

    #[tokio::test]
    async fn test_database_reopen_existing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        let db1 = Database::new(db_path.clone())
            .await
            .expect("Failed to create database");

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at)
             VALUES ('0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb', NULL, 'local', 0, 0)",
        )
        .execute(&db1.pool)
        .await
        .expect("Failed to insert test account");

        drop(db1);

        // Reopen the same database
        let db2 = Database::new(db_path.clone())
            .await
            .expect("Failed to reopen database");

        let account: (String, Option<String>) =
            sqlx::query_as("SELECT address, username FROM accounts")
                .fetch_one(&db2.pool)
                .await
                .expect("Failed to fetch account");
        assert_eq!(account.0, "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        assert!(account.1.is_none());
    }

    #[tokio::test]
    async fn test_migrate_up() {
        let (db, _temp_dir) = create_test_db().await;

        // Migrations already applied during creation; reapplying is a no-op
        let result = db.migrate_up().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_database_error_handling() {
        let invalid_path = PathBuf::from("/invalid/path/that/should/fail.db");
        let result = Database::new(invalid_path).await;

        // This might succeed or fail depending on permissions, but shouldn't panic
        match result {
            Ok(_) => {}
            Err(e) => match e {
                DatabaseError::FileSystem(_) | DatabaseError::Sqlx(_) => {}
                _ => panic!("Unexpected error type: {:?}", e),
            },
        }
    }
}
