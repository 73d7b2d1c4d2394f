// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema Introspect
//!
//! Database-agnostic table and column introspection.
//!
//! Given [`ConnectionSettings`] for one of several relational engines, this
//! crate connects and exposes one operation set to enumerate tables and
//! describe their columns, hiding each engine's catalog format behind the
//! canonical [`RawField`] shape.
//!
//! ## Backends
//!
//! | Identifier               | Client             | Catalog source                    |
//! |--------------------------|--------------------|-----------------------------------|
//! | `mysql`                  | [`MySqlClient`]    | `information_schema`              |
//! | `postgres`, `postgresql` | [`PostgresClient`] | `information_schema`, `pg_catalog`|
//! | `sqlite3`                | [`Sqlite3Client`]  | `sqlite_master`, `pragma_table_info` |
//! | `bigquery`               | [`BigQueryClient`] | BigQuery v2 REST API              |
//! | `mssql`                  | [`MsSqlClient`]    | `INFORMATION_SCHEMA`              |
//!
//! Each backend sits behind a cargo feature (`mysql`, `postgresql`, `sqlite`,
//! `bigquery`, `mssql`), all enabled by default.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schema_introspect::{get_database_client, introspect_schema, ConnectionSettings};
//!
//! let settings = ConnectionSettings::new("postgresql")
//!     .with_database("app")
//!     .with_user("reader");
//!
//! let mut client = get_database_client(&settings)?;
//! for table in introspect_schema(client.as_mut()).await? {
//!     println!("{} ({} columns)", table.name, table.fields.len());
//! }
//! ```
//!
//! ## Implementing a client
//!
//! ```rust,ignore
//! use schema_introspect::{DatabaseClient, IntrospectResult, RawField};
//! use async_trait::async_trait;
//!
//! #[async_trait]
//! impl DatabaseClient for MyClient {
//!     async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
//!         // Your implementation here
//!     }
//!
//!     async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
//!         // Your implementation here
//!     }
//!
//!     // ...
//! }
//! ```

pub mod error;
pub mod factory;
pub mod metadata;
pub mod schema;
pub mod settings;
pub mod r#trait;

#[cfg(feature = "bigquery")]
pub mod live_bigquery;
#[cfg(feature = "mssql")]
pub mod live_mssql;
#[cfg(feature = "mysql")]
pub mod live_mysql;
#[cfg(feature = "postgresql")]
pub mod live_postgres;
#[cfg(feature = "sqlite")]
pub mod live_sqlite;

// Re-exports
pub use error::{IntrospectError, IntrospectResult};
pub use factory::get_database_client;
pub use metadata::{Nullability, RawField, TableSchema};
pub use schema::{ClientFuture, introspect_schema, with_connection};
pub use settings::{Adapter, ConnectionSettings};
pub use r#trait::DatabaseClient;

#[cfg(feature = "bigquery")]
pub use live_bigquery::BigQueryClient;
#[cfg(feature = "mssql")]
pub use live_mssql::MsSqlClient;
#[cfg(feature = "mysql")]
pub use live_mysql::MySqlClient;
#[cfg(feature = "postgresql")]
pub use live_postgres::PostgresClient;
#[cfg(feature = "sqlite")]
pub use live_sqlite::Sqlite3Client;
