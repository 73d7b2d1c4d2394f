// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end introspection against a live PostgreSQL server
//!
//! Run with `cargo test -p schema-introspect --test postgres_test -- --ignored`.
//! The server is located through `PGHOST`, `PGPORT`, `PGUSER` and
//! `PGPASSWORD`; the user needs `CREATEDB`. Each test works in its own
//! throwaway database.

#![cfg(feature = "postgresql")]

use std::env;

use schema_introspect::{
    ConnectionSettings, DatabaseClient, Nullability, get_database_client, introspect_schema,
};
use schema_introspect_test_utils::{FieldAssertions, SchemaFixtures, init_tracing};
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};

struct PgFixture {
    database: String,
    admin: PgConnectOptions,
}

fn server_settings() -> ConnectionSettings {
    let mut settings = ConnectionSettings::new("postgresql");
    if let Ok(host) = env::var("PGHOST") {
        settings = settings.with_host(host);
    }
    if let Some(port) = env::var("PGPORT").ok().and_then(|p| p.parse().ok()) {
        settings = settings.with_port(port);
    }
    if let Ok(user) = env::var("PGUSER") {
        settings = settings.with_user(user);
    }
    if let Ok(password) = env::var("PGPASSWORD") {
        settings = settings.with_password(password);
    }
    settings
}

fn connect_options(settings: &ConnectionSettings, database: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(settings.host_or("localhost"))
        .port(settings.port_or(5432))
        .username(settings.user_or("postgres"))
        .password(settings.password())
        .database(database)
}

impl PgFixture {
    /// Create a fresh database holding the multi-schema fixture
    async fn create(name: &str) -> Self {
        init_tracing();
        let settings = server_settings();
        let database = format!("introspect_{}_{}", name, std::process::id());
        let admin = connect_options(&settings, "postgres");

        let mut conn = PgConnection::connect_with(&admin).await.unwrap();
        sqlx::query(&format!("DROP DATABASE IF EXISTS {}", database))
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query(&format!("CREATE DATABASE {}", database))
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query(&format!(
            "ALTER DATABASE {} SET search_path = app, public",
            database
        ))
        .execute(&mut conn)
        .await
        .unwrap();
        conn.close().await.unwrap();

        let mut conn = PgConnection::connect_with(&connect_options(&settings, &database))
            .await
            .unwrap();
        for statement in SchemaFixtures::postgres_ddl() {
            sqlx::query(statement).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();

        Self { database, admin }
    }

    fn client(&self) -> Box<dyn DatabaseClient> {
        get_database_client(&server_settings().with_database(self.database.clone())).unwrap()
    }

    async fn drop_database(self) {
        let mut conn = PgConnection::connect_with(&self.admin).await.unwrap();
        sqlx::query(&format!("DROP DATABASE IF EXISTS {}", self.database))
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_shadowed_table_is_listed_once() {
    let fixture = PgFixture::create("listing").await;
    let mut client = fixture.client();
    client.connect().await.unwrap();

    let tables = client.get_tables().await.unwrap();
    FieldAssertions::assert_same_tables(&tables, SchemaFixtures::postgres_tables());

    let users = client.get_columns("users").await.unwrap();
    FieldAssertions::assert_field_names(&users, &["id", "name"]);

    client.disconnect().await;
    fixture.drop_database().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_columns_carry_defaults_and_comments() {
    let fixture = PgFixture::create("columns").await;
    let mut client = fixture.client();
    client.connect().await.unwrap();

    let users = client.get_columns("users").await.unwrap();
    FieldAssertions::assert_field(&users[0], "id", "integer", Nullability::No, None);
    FieldAssertions::assert_field(
        &users[1],
        "name",
        "text",
        Nullability::Yes,
        Some("'anon'::text"),
    );
    assert_eq!(users[1].comment, "Display name");
    assert_eq!(users[0].comment, "");

    let view = client.get_columns("active_users").await.unwrap();
    FieldAssertions::assert_field_names(&view, &["id"]);

    client.disconnect().await;
    fixture.drop_database().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_names_are_matched_exactly() {
    let fixture = PgFixture::create("names").await;
    let mut client = fixture.client();
    client.connect().await.unwrap();

    let mixed = client.get_columns("Mixed").await.unwrap();
    FieldAssertions::assert_field_names(&mixed, &["Id", "Label"]);
    assert!(client.get_columns("mixed").await.unwrap().is_empty());

    let quoted = client
        .get_columns(SchemaFixtures::QUOTED_TABLE)
        .await
        .unwrap();
    FieldAssertions::assert_field_names(&quoted, &["weird col", "n"]);
    assert_eq!(quoted[1].null, Nullability::No);

    let hostile = client
        .get_columns("users'); DROP TABLE app.users; --")
        .await
        .unwrap();
    assert!(hostile.is_empty());
    assert_eq!(client.get_columns("users").await.unwrap().len(), 2);

    client.disconnect().await;
    fixture.drop_database().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_introspect_schema_yields_unique_tables() {
    let fixture = PgFixture::create("schema").await;
    let mut client = fixture.client();

    let schema = introspect_schema(client.as_mut()).await.unwrap();

    let names: Vec<String> = schema.iter().map(|t| t.name.clone()).collect();
    FieldAssertions::assert_same_tables(&names, SchemaFixtures::postgres_tables());
    assert!(!client.is_connected());

    fixture.drop_database().await;
}
