// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scoped introspection
//!
//! Helpers that pair every `connect` they perform with a `disconnect`, on the
//! success path and on every error path. A connection the caller opened
//! beforehand is left open.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::error::IntrospectResult;
use crate::metadata::TableSchema;
use crate::r#trait::DatabaseClient;

/// Boxed future returned by the closure passed to [`with_connection`]
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = IntrospectResult<T>> + Send + 'a>>;

/// Connect, run `f` against the connected client, then disconnect
///
/// `disconnect` runs whether `f` succeeds or fails. If `connect` fails, `f`
/// is not run and the client is left disconnected. A client that was already
/// connected on entry is reused and stays connected afterwards.
///
/// # Examples
///
/// ```rust,ignore
/// let tables = with_connection(client.as_mut(), |client| {
///     Box::pin(async move { client.get_tables().await })
/// })
/// .await?;
/// ```
pub async fn with_connection<C, T, F>(client: &mut C, f: F) -> IntrospectResult<T>
where
    C: DatabaseClient + ?Sized,
    F: for<'a> FnOnce(&'a mut C) -> ClientFuture<'a, T>,
{
    let was_connected = client.is_connected();
    client.connect().await?;
    let result = f(client).await;
    if !was_connected {
        client.disconnect().await;
    }
    result
}

/// Describe every table and view visible to the client
///
/// Tables come back in the order the backend lists them, each with its fields
/// in ordinal order. This is the shape a diagram generator consumes.
pub async fn introspect_schema<C>(client: &mut C) -> IntrospectResult<Vec<TableSchema>>
where
    C: DatabaseClient + ?Sized,
{
    with_connection(client, |client| {
        Box::pin(async move {
            let tables = client.get_tables().await?;
            let mut schema = Vec::with_capacity(tables.len());

            for name in tables {
                let fields = client.get_columns(&name).await?;
                debug!(table = %name, fields = fields.len(), "Described table");
                schema.push(TableSchema::new(name, fields));
            }

            Ok(schema)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::IntrospectError;
    use crate::metadata::RawField;
    use crate::settings::{Adapter, ConnectionSettings};

    struct CountingClient {
        settings: ConnectionSettings,
        connected: bool,
        disconnects: usize,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                settings: ConnectionSettings::new("sqlite3"),
                connected: false,
                disconnects: 0,
            }
        }
    }

    #[async_trait]
    impl DatabaseClient for CountingClient {
        fn adapter(&self) -> Adapter {
            Adapter::Sqlite3
        }

        fn settings(&self) -> &ConnectionSettings {
            &self.settings
        }

        fn default_host(&self) -> &'static str {
            ""
        }

        fn default_port(&self) -> u16 {
            0
        }

        fn default_user(&self) -> &'static str {
            ""
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> IntrospectResult<()> {
            self.connected = true;
            Ok(())
        }

        async fn disconnect(&mut self) {
            self.connected = false;
            self.disconnects += 1;
        }

        async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
            Ok(vec!["t".to_string()])
        }

        async fn get_columns(&mut self, _table: &str) -> IntrospectResult<Vec<RawField>> {
            Err(IntrospectError::QueryFailed("boom".to_string()))
        }
    }

    #[test]
    fn test_with_connection_returns_body_result() {
        let mut client = CountingClient::new();

        let tables = tokio_test::block_on(with_connection(&mut client, |client| {
            Box::pin(async move { client.get_tables().await })
        }))
        .unwrap();

        assert_eq!(tables, vec!["t"]);
        assert!(!client.connected);
        assert_eq!(client.disconnects, 1);
    }

    #[test]
    fn test_with_connection_keeps_caller_connection_open() {
        let mut client = CountingClient::new();
        tokio_test::block_on(client.connect()).unwrap();

        let tables = tokio_test::block_on(with_connection(&mut client, |client| {
            Box::pin(async move { client.get_tables().await })
        }))
        .unwrap();

        assert_eq!(tables, vec!["t"]);
        assert!(client.connected);
        assert_eq!(client.disconnects, 0);
    }

    #[test]
    fn test_introspect_schema_propagates_first_error() {
        let mut client = CountingClient::new();

        let result = tokio_test::block_on(introspect_schema(&mut client));

        assert_eq!(result, Err(IntrospectError::QueryFailed("boom".to_string())));
        assert_eq!(client.disconnects, 1);
    }
}
