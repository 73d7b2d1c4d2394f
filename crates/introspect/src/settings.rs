// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Connection settings
//!
//! The record a settings store hands to the client factory. Only `adapter` is
//! required; every other field falls back to a backend-specific default when
//! unset.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schema_introspect::ConnectionSettings;
//!
//! let settings = ConnectionSettings::new("postgres")
//!     .with_host("db.internal")
//!     .with_database("app")
//!     .with_user("reader");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntrospectError;

/// Supported backend kinds
///
/// This is a closed set. Adding a backend means adding a variant here, an
/// adapter module, and a case in [`get_database_client`](crate::get_database_client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adapter {
    MySql,
    Postgres,
    Sqlite3,
    BigQuery,
    MsSql,
}

impl Adapter {
    /// All adapters, in the order they are documented
    pub const ALL: [Adapter; 5] = [
        Adapter::MySql,
        Adapter::Postgres,
        Adapter::Sqlite3,
        Adapter::BigQuery,
        Adapter::MsSql,
    ];

    /// Canonical identifier for this adapter
    pub fn as_str(&self) -> &'static str {
        match self {
            Adapter::MySql => "mysql",
            Adapter::Postgres => "postgres",
            Adapter::Sqlite3 => "sqlite3",
            Adapter::BigQuery => "bigquery",
            Adapter::MsSql => "mssql",
        }
    }

    /// Cargo feature that compiles this adapter in
    pub fn feature(&self) -> &'static str {
        match self {
            Adapter::MySql => "mysql",
            Adapter::Postgres => "postgresql",
            Adapter::Sqlite3 => "sqlite",
            Adapter::BigQuery => "bigquery",
            Adapter::MsSql => "mssql",
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adapter {
    type Err = IntrospectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Adapter::MySql),
            "postgres" | "postgresql" => Ok(Adapter::Postgres),
            "sqlite3" => Ok(Adapter::Sqlite3),
            "bigquery" => Ok(Adapter::BigQuery),
            "mssql" => Ok(Adapter::MsSql),
            _ => Err(IntrospectError::UnsupportedAdapter(format!("not support {}", s))),
        }
    }
}

/// Connection settings for a single backend
///
/// Empty strings and a zero port are treated the same as unset values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Adapter identifier (e.g. "mysql", "postgresql", "sqlite3")
    pub adapter: String,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Database name; the file path for sqlite3, the dataset for bigquery
    #[serde(default)]
    pub database: Option<String>,

    /// User name; the project id for bigquery
    #[serde(default)]
    pub user: Option<String>,

    /// Password; an OAuth2 access token for bigquery
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Create settings for the given adapter with every other field unset
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Parse the adapter identifier
    pub fn adapter_kind(&self) -> Result<Adapter, IntrospectError> {
        self.adapter.parse()
    }

    /// Host, or `default` when unset
    pub fn host_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty(self.host.as_deref()).unwrap_or(default)
    }

    /// Port, or `default` when unset
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.filter(|port| *port != 0).unwrap_or(default)
    }

    /// User, or `default` when unset
    pub fn user_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty(self.user.as_deref()).unwrap_or(default)
    }

    /// Database name, if set
    pub fn database(&self) -> Option<&str> {
        non_empty(self.database.as_deref())
    }

    /// Password, or the empty string when unset
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("adapter", &self.adapter)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_from_str() {
        assert_eq!("mysql".parse::<Adapter>().unwrap(), Adapter::MySql);
        assert_eq!("postgres".parse::<Adapter>().unwrap(), Adapter::Postgres);
        assert_eq!("postgresql".parse::<Adapter>().unwrap(), Adapter::Postgres);
        assert_eq!("sqlite3".parse::<Adapter>().unwrap(), Adapter::Sqlite3);
        assert_eq!("bigquery".parse::<Adapter>().unwrap(), Adapter::BigQuery);
        assert_eq!(" MSSQL ".parse::<Adapter>().unwrap(), Adapter::MsSql);
    }

    #[test]
    fn test_adapter_from_str_unknown() {
        let err = "oracle".parse::<Adapter>().unwrap_err();
        assert_eq!(err, IntrospectError::UnsupportedAdapter("not support oracle".to_string()));

        assert!("sqlite".parse::<Adapter>().is_err());
        assert!("".parse::<Adapter>().is_err());
    }

    #[test]
    fn test_adapter_display_round_trips() {
        for adapter in Adapter::ALL {
            assert_eq!(adapter.to_string().parse::<Adapter>().unwrap(), adapter);
        }
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let settings = ConnectionSettings::new("mssql");
        assert_eq!(settings.host_or("localhost"), "localhost");
        assert_eq!(settings.port_or(1433), 1433);
        assert_eq!(settings.user_or("master"), "master");
        assert_eq!(settings.database(), None);
        assert_eq!(settings.password(), "");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let settings = ConnectionSettings::new("mysql")
            .with_host("")
            .with_port(0)
            .with_user("")
            .with_database("");

        assert_eq!(settings.host_or("localhost"), "localhost");
        assert_eq!(settings.port_or(3306), 3306);
        assert_eq!(settings.user_or("root"), "root");
        assert_eq!(settings.database(), None);
    }

    #[test]
    fn test_explicit_values_win() {
        let settings = ConnectionSettings::new("postgres")
            .with_host("db.internal")
            .with_port(6543)
            .with_user("reader")
            .with_database("app")
            .with_password("secret");

        assert_eq!(settings.host_or("localhost"), "db.internal");
        assert_eq!(settings.port_or(5432), 6543);
        assert_eq!(settings.user_or("postgres"), "reader");
        assert_eq!(settings.database(), Some("app"));
        assert_eq!(settings.password(), "secret");
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = ConnectionSettings::new("mysql").with_password("hunter2");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_deserialize_with_only_adapter() {
        let settings: ConnectionSettings =
            serde_json::from_str(r#"{ "adapter": "sqlite3", "database": "app.db" }"#).unwrap();

        assert_eq!(settings.adapter_kind().unwrap(), Adapter::Sqlite3);
        assert_eq!(settings.database(), Some("app.db"));
        assert_eq!(settings.host, None);
        assert_eq!(settings.port, None);
    }
}
