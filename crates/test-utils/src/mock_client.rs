// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock client implementation for testing
//!
//! Provides an in-memory client with builder pattern for easy test setup.
//! It follows the same state machine as the live clients, and counts
//! connect/disconnect calls so scoped helpers can be checked.

use schema_introspect::{
    Adapter, ConnectionSettings, DatabaseClient, IntrospectError, IntrospectResult, Nullability,
    RawField, TableSchema,
};

/// In-memory mock client for testing
#[derive(Debug, Clone)]
pub struct MockClient {
    settings: ConnectionSettings,
    adapter: Adapter,
    tables: Vec<TableSchema>,
    connected: bool,
    connect_error: Option<IntrospectError>,
    failing_table: Option<String>,
    /// Number of successful `connect` calls
    pub connect_calls: usize,
    /// Number of `disconnect` calls, including no-op ones
    pub disconnect_calls: usize,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self {
            settings: ConnectionSettings::new("mysql"),
            adapter: Adapter::MySql,
            tables: Vec::new(),
            connected: false,
            connect_error: None,
            failing_table: None,
            connect_calls: 0,
            disconnect_calls: 0,
        }
    }

    /// Add a table; tables are listed in insertion order
    pub fn add_table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Make every `connect` fail with `error`
    pub fn fail_connect(mut self, error: IntrospectError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Make `get_columns` fail with a query error for `table`
    pub fn fail_columns_for(mut self, table: impl Into<String>) -> Self {
        self.failing_table = Some(table.into());
        self
    }

    /// Report as a different backend
    pub fn with_adapter(mut self, adapter: Adapter) -> Self {
        self.adapter = adapter;
        self.settings = ConnectionSettings::new(adapter.as_str());
        self
    }
}

#[async_trait::async_trait]
impl DatabaseClient for MockClient {
    fn adapter(&self) -> Adapter {
        self.adapter
    }

    fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn default_host(&self) -> &'static str {
        "mock"
    }

    fn default_port(&self) -> u16 {
        0
    }

    fn default_user(&self) -> &'static str {
        "mock"
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> IntrospectResult<()> {
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }
        self.connected = true;
        self.connect_calls += 1;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
        self.disconnect_calls += 1;
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        if !self.connected {
            return Err(IntrospectError::NotConnected);
        }
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
        if !self.connected {
            return Err(IntrospectError::NotConnected);
        }
        if self.failing_table.as_deref() == Some(table) {
            return Err(IntrospectError::QueryFailed(format!(
                "Failed to get columns for table '{}': permission denied",
                table
            )));
        }
        Ok(self
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.fields.clone())
            .unwrap_or_default())
    }
}

/// Builder for creating mock clients with a fluent API
pub struct MockClientBuilder {
    client: MockClient,
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            client: MockClient::new(),
        }
    }

    /// Add the standard test schema (users and orders tables)
    pub fn with_standard_schema(mut self) -> Self {
        self.client = self
            .client
            .add_table(TableSchema::new(
                "users",
                vec![
                    RawField::new("id", "bigint"),
                    RawField::new("email", "varchar").with_comment("Login address"),
                    RawField::new("name", "varchar").with_null(Nullability::Yes),
                    RawField::new("created_at", "timestamp")
                        .with_null(Nullability::Yes)
                        .with_default(Some("CURRENT_TIMESTAMP".to_string())),
                ],
            ))
            .add_table(TableSchema::new(
                "orders",
                vec![
                    RawField::new("id", "bigint"),
                    RawField::new("user_id", "bigint"),
                    RawField::new("total", "decimal").with_null(Nullability::Yes),
                    RawField::new("status", "varchar")
                        .with_default(Some("'pending'".to_string())),
                ],
            ));

        self
    }

    /// Add a custom table
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.client = self.client.add_table(table);
        self
    }

    /// Build the mock client
    pub fn build(self) -> MockClient {
        self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_state_machine() {
        let mut client = MockClientBuilder::new().with_standard_schema().build();

        assert_eq!(client.get_tables().await, Err(IntrospectError::NotConnected));

        client.connect().await.unwrap();
        assert_eq!(client.get_tables().await.unwrap(), vec!["users", "orders"]);
        assert_eq!(client.get_columns("users").await.unwrap().len(), 4);
        assert!(client.get_columns("missing").await.unwrap().is_empty());

        client.disconnect().await;
        assert_eq!(client.get_columns("users").await, Err(IntrospectError::NotConnected));
    }

    #[tokio::test]
    async fn test_mock_client_connect_failure() {
        let mut client = MockClient::new()
            .fail_connect(IntrospectError::ConnectionFailed("refused".to_string()));

        assert!(client.connect().await.is_err());
        assert!(!client.is_connected());
        assert_eq!(client.connect_calls, 0);
    }
}
