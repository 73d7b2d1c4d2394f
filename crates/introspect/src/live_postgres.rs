// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live PostgreSQL client
//!
//! Reads table and column metadata from `information_schema`, restricted to
//! the schemas on the session's search path.
//!
//! - A name present in two schemas on the search path is listed and described
//!   once, from the schema an unqualified reference would resolve to
//!   (`pg_table_is_visible`).
//! - Column comments come from `col_description`.
//! - User-defined types (enums, domains) report their type name instead of
//!   `USER-DEFINED`.
//! - An unknown table yields an empty column list.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::error::{IntrospectError, IntrospectResult};
use crate::metadata::{Nullability, RawField};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";

/// Pool acquire timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const TABLES_QUERY: &str = r#"
    SELECT t.table_name::text
    FROM information_schema.tables t
    WHERE t.table_schema::name = ANY (current_schemas(false))
      AND t.table_type IN ('BASE TABLE', 'VIEW')
      AND pg_catalog.pg_table_is_visible(
          format('%I.%I', t.table_schema, t.table_name)::regclass
      )
    ORDER BY t.table_name
"#;

// $1 is compared against relname, so the name is matched exactly and never
// parsed as SQL.
const COLUMNS_QUERY: &str = r#"
    SELECT
        c.column_name::text,
        CASE WHEN c.data_type = 'USER-DEFINED' THEN c.udt_name::text
             ELSE c.data_type::text END,
        c.is_nullable::text,
        c.column_default::text,
        col_description(r.oid, c.ordinal_position::int)
    FROM pg_catalog.pg_class r
    JOIN pg_catalog.pg_namespace n ON n.oid = r.relnamespace
    JOIN information_schema.columns c
      ON c.table_schema::name = n.nspname
     AND c.table_name::name = r.relname
    WHERE r.relname = $1::text
      AND r.relkind IN ('r', 'p', 'v', 'm', 'f')
      AND pg_catalog.pg_table_is_visible(r.oid)
    ORDER BY c.ordinal_position
"#;

/// Row shape of [`COLUMNS_QUERY`]
type ColumnRow = (String, String, String, Option<String>, Option<String>);

/// Live PostgreSQL client
pub struct PostgresClient {
    settings: ConnectionSettings,
    pool: Option<PgPool>,
}

impl PostgresClient {
    /// Create a disconnected client
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: None,
        }
    }

    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(self.settings.host_or(DEFAULT_HOST))
            .port(self.settings.port_or(DEFAULT_PORT))
            .username(self.settings.user_or(DEFAULT_USER))
            .password(self.settings.password());

        match self.settings.database() {
            Some(database) => options.database(database),
            None => options,
        }
    }

    fn pool(&self) -> IntrospectResult<&PgPool> {
        self.pool.as_ref().ok_or(IntrospectError::NotConnected)
    }

    fn to_raw_field(row: ColumnRow) -> RawField {
        let (name, data_type, is_nullable, default, comment) = row;
        RawField::new(name, data_type)
            .with_null(Nullability::from_is_nullable(&is_nullable))
            .with_default(default)
            .with_comment(comment.unwrap_or_default())
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn adapter(&self) -> Adapter {
        Adapter::Postgres
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
            debug!("PostgreSQL client already connected");
            return Ok(());
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_with(self.connect_options())
            .await
            .map_err(|e| {
                IntrospectError::ConnectionFailed(format!(
                    "Failed to connect to PostgreSQL: {}",
                    e
                ))
            })?;

        info!(
            host = self.settings.host_or(DEFAULT_HOST),
            port = self.settings.port_or(DEFAULT_PORT),
            database = ?self.settings.database(),
            "Connected to PostgreSQL"
        );
        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Disconnected from PostgreSQL");
        }
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        let pool = self.pool()?;

        let tables = sqlx::query_scalar::<_, String>(TABLES_QUERY)
            .fetch_all(pool)
            .await
            .map_err(|e| IntrospectError::QueryFailed(format!("Failed to list tables: {}", e)))?;

        debug!(count = tables.len(), "Listed PostgreSQL tables");
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

        debug!(table, count = rows.len(), "Described PostgreSQL table");
        Ok(rows.into_iter().map(Self::to_raw_field).collect())
    }
}
