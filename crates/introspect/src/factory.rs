// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Client factory
//!
//! Maps an adapter identifier to a freshly constructed, disconnected client.

use crate::error::{IntrospectError, IntrospectResult};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

#[cfg(feature = "bigquery")]
use crate::live_bigquery::BigQueryClient;
#[cfg(feature = "mssql")]
use crate::live_mssql::MsSqlClient;
#[cfg(feature = "mysql")]
use crate::live_mysql::MySqlClient;
#[cfg(feature = "postgresql")]
use crate::live_postgres::PostgresClient;
#[cfg(feature = "sqlite")]
use crate::live_sqlite::Sqlite3Client;

/// Build the client for `settings.adapter`
///
/// The settings are copied into the client; nothing is connected yet.
///
/// # Errors
///
/// Returns `IntrospectError::UnsupportedAdapter` for an unknown identifier.
/// Returns `IntrospectError::NotSupported` for a known backend whose cargo
/// feature is disabled.
///
/// # Examples
///
/// ```rust,ignore
/// let settings = ConnectionSettings::new("postgresql").with_database("app");
/// let mut client = get_database_client(&settings)?;
/// client.connect().await?;
/// ```
pub fn get_database_client(
    settings: &ConnectionSettings,
) -> IntrospectResult<Box<dyn DatabaseClient>> {
    let adapter = settings.adapter_kind()?;
    let settings = settings.clone();

    match adapter {
        #[cfg(feature = "mysql")]
        Adapter::MySql => Ok(Box::new(MySqlClient::new(settings))),
        #[cfg(feature = "postgresql")]
        Adapter::Postgres => Ok(Box::new(PostgresClient::new(settings))),
        #[cfg(feature = "sqlite")]
        Adapter::Sqlite3 => Ok(Box::new(Sqlite3Client::new(settings))),
        #[cfg(feature = "bigquery")]
        Adapter::BigQuery => Ok(Box::new(BigQueryClient::new(settings))),
        #[cfg(feature = "mssql")]
        Adapter::MsSql => Ok(Box::new(MsSqlClient::new(settings))),
        #[allow(unreachable_patterns)]
        disabled => Err(IntrospectError::NotSupported(format!(
            "adapter '{}' requires the '{}' feature enabled",
            disabled,
            disabled.feature()
        ))),
    }
}

#[cfg(all(
    test,
    feature = "mysql",
    feature = "postgresql",
    feature = "sqlite",
    feature = "bigquery",
    feature = "mssql"
))]
mod tests {
    use super::*;

    #[test]
    fn test_every_identifier_builds_matching_client() {
        let cases = [
            ("mysql", Adapter::MySql),
            ("postgres", Adapter::Postgres),
            ("postgresql", Adapter::Postgres),
            ("sqlite3", Adapter::Sqlite3),
            ("bigquery", Adapter::BigQuery),
            ("mssql", Adapter::MsSql),
        ];

        for (identifier, expected) in cases {
            let client = get_database_client(&ConnectionSettings::new(identifier)).unwrap();
            assert_eq!(client.adapter(), expected, "identifier {}", identifier);
            assert!(!client.is_connected());
            assert_eq!(client.settings().adapter, identifier);
        }
    }

    #[test]
    fn test_unknown_identifier_fails() {
        for identifier in ["oracle", "sqlite", "", "my sql"] {
            let result = get_database_client(&ConnectionSettings::new(identifier));
            assert!(
                matches!(result, Err(IntrospectError::UnsupportedAdapter(_))),
                "identifier {:?}",
                identifier
            );
        }
    }

    #[test]
    fn test_client_owns_a_copy_of_settings() {
        let mut settings = ConnectionSettings::new("mysql").with_host("db-1");
        let client = get_database_client(&settings).unwrap();
        settings.host = Some("db-2".to_string());

        assert_eq!(client.settings().host.as_deref(), Some("db-1"));
    }
}
