// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Client contract
//!
//! The async trait every backend adapter implements.

use crate::error::IntrospectResult;
use crate::metadata::RawField;
use crate::settings::{Adapter, ConnectionSettings};

/// Client contract for schema introspection
///
/// A client starts disconnected and holds only its settings. [`connect`]
/// moves it to the connected state; [`disconnect`] moves it back. Catalog
/// operations are only valid while connected and fail with
/// [`IntrospectError::NotConnected`](crate::IntrospectError::NotConnected)
/// otherwise.
///
/// Every operation takes `&mut self`: a client is never shared between two
/// in-flight operations. Use one client per concurrent task.
///
/// # Examples
///
/// ```rust,ignore
/// use schema_introspect::{DatabaseClient, IntrospectResult};
///
/// async fn print_schema(client: &mut dyn DatabaseClient) -> IntrospectResult<()> {
///     client.connect().await?;
///     for table in client.get_tables().await? {
///         for field in client.get_columns(&table).await? {
///             println!("{}.{}: {}", table, field.field, field.data_type);
///         }
///     }
///     client.disconnect().await;
///     Ok(())
/// }
/// ```
///
/// [`connect`]: DatabaseClient::connect
/// [`disconnect`]: DatabaseClient::disconnect
#[async_trait::async_trait]
pub trait DatabaseClient: Send {
    /// Which backend this client talks to
    fn adapter(&self) -> Adapter;

    /// Settings this client was built with
    fn settings(&self) -> &ConnectionSettings;

    /// Host used when the settings leave it unset
    fn default_host(&self) -> &'static str;

    /// Port used when the settings leave it unset
    fn default_port(&self) -> u16;

    /// User used when the settings leave it unset
    fn default_user(&self) -> &'static str;

    /// Whether a connection handle is currently held
    fn is_connected(&self) -> bool;

    /// Establish the backend connection
    ///
    /// On failure the client stays disconnected and `connect` may be called
    /// again. Calling it while already connected keeps the existing handle.
    ///
    /// # Errors
    ///
    /// Returns `IntrospectError::ConnectionFailed` on network or auth failure.
    /// Returns `IntrospectError::InvalidSettings` if a required setting is missing.
    async fn connect(&mut self) -> IntrospectResult<()>;

    /// Release the connection handle
    ///
    /// Best-effort and idempotent: close failures are logged, never returned,
    /// and calling this while disconnected does nothing.
    async fn disconnect(&mut self);

    /// List base tables and views visible to the configured database
    ///
    /// Ordering is backend-specific and must not be relied on.
    ///
    /// # Errors
    ///
    /// Returns `IntrospectError::NotConnected` before a successful connect.
    /// Returns `IntrospectError::QueryFailed` if the catalog query fails.
    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>>;

    /// Describe the columns of `table` in ordinal order
    ///
    /// Whether an unknown table yields an empty list or
    /// `IntrospectError::TableNotFound` is documented per adapter.
    ///
    /// # Errors
    ///
    /// Returns `IntrospectError::NotConnected` before a successful connect.
    /// Returns `IntrospectError::QueryFailed` if the catalog query fails.
    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>>;
}
