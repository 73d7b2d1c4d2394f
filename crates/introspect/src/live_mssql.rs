// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live SQL Server client
//!
//! Connects with Tiberius over a Tokio TCP stream and reads metadata from
//! `INFORMATION_SCHEMA` in the current database (`DB_NAME()`).
//!
//! - SQL authentication with the resolved user and password; the server
//!   certificate is trusted.
//! - When a table name exists in several schemas it is listed once, and
//!   described from the caller's default schema, then the first schema by name.
//! - Column comments are not read; [`RawField::comment`] is always empty.
//! - An unknown table yields an empty column list.

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

use crate::error::{IntrospectError, IntrospectResult};
use crate::metadata::{Nullability, RawField};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 1433;
const DEFAULT_USER: &str = "master";

const TABLES_QUERY: &str = r#"
    SELECT DISTINCT TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_CATALOG = DB_NAME()
      AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')
    ORDER BY TABLE_NAME
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        COLUMN_NAME,
        DATA_TYPE,
        IS_NULLABLE,
        COLUMN_DEFAULT
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_CATALOG = DB_NAME()
      AND TABLE_NAME = @P1
      AND TABLE_SCHEMA = (
          SELECT TOP 1 TABLE_SCHEMA
          FROM INFORMATION_SCHEMA.TABLES
          WHERE TABLE_CATALOG = DB_NAME() AND TABLE_NAME = @P1
          ORDER BY CASE WHEN TABLE_SCHEMA = SCHEMA_NAME() THEN 0 ELSE 1 END, TABLE_SCHEMA
      )
    ORDER BY ORDINAL_POSITION
"#;

type MsSqlConnection = Client<Compat<TcpStream>>;

/// Live SQL Server client
pub struct MsSqlClient {
    settings: ConnectionSettings,
    conn: Option<MsSqlConnection>,
}

impl MsSqlClient {
    /// Create a disconnected client
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            conn: None,
        }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(self.settings.host_or(DEFAULT_HOST));
        config.port(self.settings.port_or(DEFAULT_PORT));
        if let Some(database) = self.settings.database() {
            config.database(database);
        }
        config.authentication(AuthMethod::sql_server(
            self.settings.user_or(DEFAULT_USER),
            self.settings.password(),
        ));
        config.trust_cert();
        config
    }

    fn conn(&mut self) -> IntrospectResult<&mut MsSqlConnection> {
        self.conn.as_mut().ok_or(IntrospectError::NotConnected)
    }

    fn to_raw_field(row: &Row) -> IntrospectResult<RawField> {
        let name = get_str(row, 0)?.unwrap_or_default();
        let data_type = get_str(row, 1)?.unwrap_or_default();
        let is_nullable = get_str(row, 2)?.unwrap_or_default();
        let default = get_str(row, 3)?.map(str::to_string);

        Ok(RawField::new(name, data_type)
            .with_null(Nullability::from_is_nullable(is_nullable))
            .with_default(default))
    }
}

fn get_str(row: &Row, idx: usize) -> IntrospectResult<Option<&str>> {
    row.try_get::<&str, _>(idx)
        .map_err(|e| IntrospectError::QueryFailed(format!("Unexpected column {}: {}", idx, e)))
}

fn query_error(context: &str, e: tiberius::error::Error) -> IntrospectError {
    IntrospectError::QueryFailed(format!("{}: {}", context, e))
}

#[async_trait]
impl DatabaseClient for MsSqlClient {
    fn adapter(&self) -> Adapter {
        Adapter::MsSql
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
        self.conn.is_some()
    }

    async fn connect(&mut self) -> IntrospectResult<()> {
        if self.conn.is_some() {
            debug!("SQL Server client already connected");
            return Ok(());
        }

        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            IntrospectError::ConnectionFailed(format!(
                "Failed to reach SQL Server at {}: {}",
                config.get_addr(),
                e
            ))
        })?;
        tcp.set_nodelay(true).ok();

        let conn = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| {
                IntrospectError::ConnectionFailed(format!(
                    "Failed to connect to SQL Server: {}",
                    e
                ))
            })?;

        info!(
            host = self.settings.host_or(DEFAULT_HOST),
            port = self.settings.port_or(DEFAULT_PORT),
            database = ?self.settings.database(),
            "Connected to SQL Server"
        );
        self.conn = Some(conn);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => info!("Disconnected from SQL Server"),
                Err(e) => warn!("Failed to close SQL Server connection: {}", e),
            }
        }
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        let conn = self.conn()?;

        let rows = conn
            .simple_query(TABLES_QUERY)
            .await
            .map_err(|e| query_error("Failed to list tables", e))?
            .into_first_result()
            .await
            .map_err(|e| query_error("Failed to list tables", e))?;

        let tables = rows
            .iter()
            .map(|row| get_str(row, 0).map(|name| name.unwrap_or_default().to_string()))
            .collect::<IntrospectResult<Vec<_>>>()?;

        debug!(count = tables.len(), "Listed SQL Server tables");
        Ok(tables)
    }

    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
        let conn = self.conn()?;
        let context = format!("Failed to get columns for table '{}'", table);

        let mut query = Query::new(COLUMNS_QUERY);
        query.bind(table);

        let rows = query
            .query(conn)
            .await
            .map_err(|e| query_error(&context, e))?
            .into_first_result()
            .await
            .map_err(|e| query_error(&context, e))?;

        let fields = rows
            .iter()
            .map(Self::to_raw_field)
            .collect::<IntrospectResult<Vec<_>>>()?;

        debug!(table, count = fields.len(), "Described SQL Server table");
        Ok(fields)
    }
}
