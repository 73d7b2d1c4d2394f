// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for schema-introspect
//!
//! This crate provides common testing components including:
//! - A mock client implementing the client contract
//! - A SQLite fixture schema with its expected metadata
//! - Field and table assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_client;

// Re-exports for convenience
pub use assertions::FieldAssertions;
pub use fixtures::{SchemaFixtures, create_sqlite_fixture};
pub use mock_client::{MockClient, MockClientBuilder};

/// Install a test subscriber honoring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
