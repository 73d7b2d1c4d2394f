// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live SQLite client
//!
//! Reads tables and views from `sqlite_master` and columns from the
//! `pragma_table_info` table-valued function.
//!
//! The `database` setting is the path of the database file and is required.
//! A missing file is a connection failure; it is never created. Host, port and
//! user have no meaning for a file engine and default to empty values.
//!
//! An unknown table yields an empty column list.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::{IntrospectError, IntrospectResult};
use crate::metadata::{Nullability, RawField};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

const DEFAULT_HOST: &str = "";
const DEFAULT_PORT: u16 = 0;
const DEFAULT_USER: &str = "";

const TABLES_QUERY: &str = r#"
    SELECT name
    FROM sqlite_master
    WHERE type IN ('table', 'view')
      AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
    ORDER BY name
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT name, type, "notnull", dflt_value
    FROM pragma_table_info(?1)
    ORDER BY cid
"#;

/// Row shape of [`COLUMNS_QUERY`]
type ColumnRow = (String, String, i64, Option<String>);

/// Live SQLite client
pub struct Sqlite3Client {
    settings: ConnectionSettings,
    pool: Option<SqlitePool>,
}

impl Sqlite3Client {
    /// Create a disconnected client
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: None,
        }
    }

    fn connect_options(&self) -> IntrospectResult<SqliteConnectOptions> {
        let path = self.settings.database().ok_or_else(|| {
            IntrospectError::InvalidSettings(
                "sqlite3 requires 'database' to be the database file path".to_string(),
            )
        })?;

        Ok(SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false))
    }

    fn pool(&self) -> IntrospectResult<&SqlitePool> {
        self.pool.as_ref().ok_or(IntrospectError::NotConnected)
    }

    fn to_raw_field(row: ColumnRow) -> RawField {
        let (name, declared_type, not_null, default) = row;
        RawField::new(name, declared_type)
            .with_null(Nullability::from_not_null(not_null != 0))
            .with_default(default)
    }
}

#[async_trait]
impl DatabaseClient for Sqlite3Client {
    fn adapter(&self) -> Adapter {
        Adapter::Sqlite3
    }

    fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn default_host(&self) -> &'static str {
        DEFAULT_HOST
    }

    fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    fn default_user(&self) -> &'static str {
        DEFAULT_USER
    }

    fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    async fn connect(&mut self) -> IntrospectResult<()> {
        if self.pool.is_some() {
            debug!("SQLite client already connected");
            return Ok(());
        }

        let options = self.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                IntrospectError::ConnectionFailed(format!("Failed to open SQLite database: {}", e))
            })?;

        info!(path = ?self.settings.database(), "Opened SQLite database");
        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Closed SQLite database");
        }
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        let pool = self.pool()?;

        let tables = sqlx::query_scalar::<_, String>(TABLES_QUERY)
            .fetch_all(pool)
            .await
            .map_err(|e| IntrospectError::QueryFailed(format!("Failed to list tables: {}", e)))?;

        debug!(count = tables.len(), "Listed SQLite tables");
        Ok(tables)
    }

    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
        let pool = self.pool()?;

        let rows = sqlx::query_as::<_, ColumnRow>(COLUMNS_QUERY)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                IntrospectError::QueryFailed(format!(
                    "Failed to get columns for table '{}': {}",
                    table, e
                ))
            })?;

        debug!(table, count = rows.len(), "Described SQLite table");
        Ok(rows.into_iter().map(Self::to_raw_field).collect())
    }
}
