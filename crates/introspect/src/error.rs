// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for introspection
//!
//! Every failure is returned to the immediate caller. Nothing in this crate
//! logs-and-swallows an error, with the single exception of
//! [`DatabaseClient::disconnect`](crate::DatabaseClient::disconnect), which is
//! best-effort.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for introspection operations
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Errors that can occur while building a client or reading a catalog
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum IntrospectError {
    /// The adapter identifier is not one of the known backends
    #[error("Unsupported adapter: {0}")]
    UnsupportedAdapter(String),

    /// The settings are missing something the backend cannot default
    #[error("Invalid connection settings: {0}")]
    InvalidSettings(String),

    /// Network or authentication failure while connecting
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A catalog operation was invoked before a successful connect
    #[error("Don't have database connection")]
    NotConnected,

    /// The catalog query itself failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// The backend reported that the table does not exist
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// The backend is known but was not compiled into this build
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl IntrospectError {
    /// Whether this error came from calling a catalog operation while disconnected
    pub fn is_not_connected(&self) -> bool {
        matches!(self, IntrospectError::NotConnected)
    }

    /// Whether calling `connect` again could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntrospectError::ConnectionFailed(_))
    }
}
