// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: a small blog schema for the embedded engine and a
//! multi-schema layout for PostgreSQL

use std::path::Path;

use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

/// Fixture schema and the metadata it is expected to produce
pub struct SchemaFixtures;

impl SchemaFixtures {
    /// Table whose name contains both quote characters
    pub const QUOTED_TABLE: &'static str = r#"o'brien "quotes""#;

    /// DDL for the blog fixture, one statement per entry
    pub const fn blog_ddl() -> &'static [&'static str] {
        &[
            r#"CREATE TABLE authors (
                id INTEGER NOT NULL PRIMARY KEY,
                name TEXT NOT NULL,
                email VARCHAR(255),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )"#,
            r#"CREATE TABLE posts (
                id INTEGER NOT NULL PRIMARY KEY,
                author_id INTEGER NOT NULL REFERENCES authors(id),
                title TEXT NOT NULL DEFAULT 'untitled',
                body,
                status TEXT NOT NULL DEFAULT 'draft',
                score REAL DEFAULT 0.5,
                published_at DATETIME
            )"#,
            // AUTOINCREMENT makes SQLite create its internal sqlite_sequence table
            r#"CREATE TABLE comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE "o'brien ""quotes""" (
                "weird col" TEXT DEFAULT 'it''s',
                n INTEGER
            )"#,
            r#"CREATE VIEW published_posts AS
                SELECT id, title FROM posts WHERE status = 'published'"#,
            r#"CREATE INDEX idx_posts_author ON posts (author_id)"#,
        ]
    }

    /// Tables and views the blog fixture exposes
    pub const fn blog_tables() -> &'static [&'static str] {
        &[
            "authors",
            "comments",
            Self::QUOTED_TABLE,
            "posts",
            "published_posts",
        ]
    }

    /// DDL for the PostgreSQL fixture; run with `search_path = app, public`
    ///
    /// `users` exists in both schemas, and `app.users` shadows `public.users`.
    pub const fn postgres_ddl() -> &'static [&'static str] {
        &[
            "CREATE SCHEMA app",
            r#"CREATE TABLE public.users (
                id INTEGER NOT NULL,
                email TEXT,
                legacy BOOLEAN
            )"#,
            r#"CREATE TABLE app.users (
                id INTEGER NOT NULL,
                name TEXT DEFAULT 'anon'
            )"#,
            "COMMENT ON COLUMN app.users.name IS 'Display name'",
            r#"CREATE TABLE public."Mixed" ("Id" INTEGER, "Label" TEXT)"#,
            r#"CREATE TABLE public."o'brien ""quotes""" ("weird col" TEXT, n INTEGER NOT NULL)"#,
            "CREATE VIEW app.active_users AS SELECT id FROM app.users",
        ]
    }

    /// Tables and views the PostgreSQL fixture exposes on its search path
    pub const fn postgres_tables() -> &'static [&'static str] {
        &["Mixed", "active_users", Self::QUOTED_TABLE, "users"]
    }

    /// Column names of `posts` in declared order
    pub const fn posts_columns() -> &'static [&'static str] {
        &[
            "id",
            "author_id",
            "title",
            "body",
            "status",
            "score",
            "published_at",
        ]
    }
}

/// Create a SQLite database at `path` holding the blog fixture
pub async fn create_sqlite_fixture(path: &Path) -> Result<(), sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await?;

    for statement in SchemaFixtures::blog_ddl() {
        sqlx::query(statement).execute(&mut conn).await?;
    }

    conn.close().await
}
