// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live BigQuery client
//!
//! Talks to the BigQuery v2 REST API instead of a SQL catalog.
//!
//! ## Settings
//!
//! - `user`: GCP project id (required)
//! - `database`: dataset id (required)
//! - `password`: OAuth2 access token, sent as a bearer token when non-empty
//! - `host`: API host, `bigquery.googleapis.com` by default. A value that
//!   carries a scheme (`http://localhost:9050`) is used as-is, which is how
//!   emulators are reached.
//!
//! ## Mapping
//!
//! - Tables come from `tables.list`, following `nextPageToken`. Tables,
//!   views, materialized views and external tables are returned; snapshots
//!   are not.
//! - Columns are the top-level `schema.fields` of `tables.get`, in declared
//!   order. Mode `REQUIRED` is `No`; `NULLABLE`, `REPEATED` or no mode is `Yes`.
//! - `defaultValueExpression` fills the default and `description` the comment.
//! - An unknown table is [`IntrospectError::TableNotFound`].

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{IntrospectError, IntrospectResult};
use crate::metadata::{Nullability, RawField};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

const DEFAULT_HOST: &str = "bigquery.googleapis.com";
const DEFAULT_PORT: u16 = 443;
const DEFAULT_USER: &str = "";

/// Page size requested from `tables.list`
const PAGE_SIZE: &str = "1000";

/// Table types reported by `tables.list` that count as tables or views
const LISTED_TABLE_TYPES: [&str; 4] = ["TABLE", "VIEW", "MATERIALIZED_VIEW", "EXTERNAL"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableList {
    #[serde(default)]
    tables: Vec<TableListEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableListEntry {
    table_reference: TableReference,
    #[serde(rename = "type")]
    table_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableReference {
    table_id: String,
}

#[derive(Debug, Deserialize)]
struct Table {
    schema: Option<TableFieldList>,
}

#[derive(Debug, Deserialize)]
struct TableFieldList {
    #[serde(default)]
    fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableFieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    mode: Option<String>,
    description: Option<String>,
    default_value_expression: Option<String>,
}

impl TableListEntry {
    fn is_listed(&self) -> bool {
        self.table_type
            .as_deref()
            .is_none_or(|table_type| LISTED_TABLE_TYPES.contains(&table_type))
    }
}

impl From<TableFieldSchema> for RawField {
    fn from(field: TableFieldSchema) -> Self {
        let required = field
            .mode
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("REQUIRED"));

        RawField::new(field.name, field.field_type)
            .with_null(Nullability::from_not_null(required))
            .with_default(field.default_value_expression)
            .with_comment(field.description.unwrap_or_default())
    }
}

/// Failure of a single API call
enum ApiError {
    NotFound,
    Failed(String),
}

/// State held while connected
struct Session {
    http: reqwest::Client,
    dataset_url: Url,
    token: String,
}

impl Session {
    fn url(&self, segments: &[&str]) -> IntrospectResult<Url> {
        append_segments(&self.dataset_url, segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let mut request = self.http.get(url);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Failed(format!("HTTP {}: {}", status, body.trim())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Failed(format!("Invalid response body: {}", e)))
    }
}

fn append_segments(base: &Url, segments: &[&str]) -> IntrospectResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| IntrospectError::InvalidSettings(format!("Invalid API base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Live BigQuery client
pub struct BigQueryClient {
    settings: ConnectionSettings,
    session: Option<Session>,
}

impl BigQueryClient {
    /// Create a disconnected client
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    /// URL of the configured dataset resource
    fn dataset_url(&self) -> IntrospectResult<Url> {
        let project = self.settings.user.as_deref().filter(|p| !p.is_empty()).ok_or_else(|| {
            IntrospectError::InvalidSettings("bigquery requires 'user' to be the project id".into())
        })?;
        let dataset = self.settings.database().ok_or_else(|| {
            IntrospectError::InvalidSettings(
                "bigquery requires 'database' to be the dataset id".into(),
            )
        })?;

        let host = self.settings.host_or(DEFAULT_HOST);
        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let mut url = Url::parse(&base)
            .map_err(|e| IntrospectError::InvalidSettings(format!("Invalid host '{}': {}", host, e)))?;
        if let Some(port) = self.settings.port.filter(|p| *p != 0) {
            url.set_port(Some(port))
                .map_err(|_| IntrospectError::InvalidSettings(format!("Invalid port {}", port)))?;
        }

        append_segments(
            &url,
            &["bigquery", "v2", "projects", project, "datasets", dataset],
        )
    }

    fn session(&self) -> IntrospectResult<&Session> {
        self.session.as_ref().ok_or(IntrospectError::NotConnected)
    }
}

#[async_trait]
impl DatabaseClient for BigQueryClient {
    fn adapter(&self) -> Adapter {
        Adapter::BigQuery
    }

    fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn default_host(&self) -> &'static str {
        DEFAULT_HOST
    }

    fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    fn default_user(&self) -> &'static str {
        DEFAULT_USER
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    async fn connect(&mut self) -> IntrospectResult<()> {
        if self.session.is_some() {
            debug!("BigQuery client already connected");
            return Ok(());
        }

        let session = Session {
            http: reqwest::Client::new(),
            dataset_url: self.dataset_url()?,
            token: self.settings.password().to_string(),
        };

        // Fetching the dataset checks reachability, credentials and existence at once
        match session
            .get_json::<serde_json::Value>(session.dataset_url.clone())
            .await
        {
            Ok(_) => {}
            Err(ApiError::NotFound) => {
                return Err(IntrospectError::ConnectionFailed(format!(
                    "Dataset not found: {}",
                    session.dataset_url
                )));
            }
            Err(ApiError::Failed(e)) => {
                return Err(IntrospectError::ConnectionFailed(format!(
                    "Failed to connect to BigQuery: {}",
                    e
                )));
            }
        }

        info!(url = %session.dataset_url, "Connected to BigQuery");
        self.session = Some(session);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.session.take().is_some() {
            info!("Disconnected from BigQuery");
        }
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        let session = self.session()?;
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = session.url(&["tables"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxResults", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let page = session.get_json::<TableList>(url).await.map_err(|e| match e {
                ApiError::NotFound => {
                    IntrospectError::QueryFailed("Failed to list tables: dataset not found".into())
                }
                ApiError::Failed(e) => {
                    IntrospectError::QueryFailed(format!("Failed to list tables: {}", e))
                }
            })?;

            tables.extend(
                page.tables
                    .into_iter()
                    .filter(TableListEntry::is_listed)
                    .map(|entry| entry.table_reference.table_id),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = tables.len(), "Listed BigQuery tables");
        Ok(tables)
    }

    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
        let session = self.session()?;
        let url = session.url(&["tables", table])?;

        let metadata = session.get_json::<Table>(url).await.map_err(|e| match e {
            ApiError::NotFound => IntrospectError::TableNotFound(table.to_string()),
            ApiError::Failed(e) => IntrospectError::QueryFailed(format!(
                "Failed to get columns for table '{}': {}",
                table, e
            )),
        })?;

        let fields: Vec<RawField> = metadata
            .schema
            .map(|schema| schema.fields.into_iter().map(RawField::from).collect())
            .unwrap_or_default();

        debug!(table, count = fields.len(), "Described BigQuery table");
        Ok(fields)
    }
}
