//! Table API client (`/rest/v1/<table>`).
//!
//! Requests follow the PostgREST conventions: filters are query pairs
//! (`column=eq.value`), ordering is `order=column.desc`, single-row reads use
//! the `application/vnd.pgrst.object+json` media type, and writes ask for the
//! stored rows back with `Prefer: return=representation`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{Endpoint, check_response, http_client};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.to_string(),
        }
    }

    fn query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    fn query_value(&self) -> String {
        let dir = if self.ascending { "asc" } else { "desc" };
        format!("{}.{dir}", self.column)
    }
}

/// Select request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    columns: String,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<usize>,
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string pairs in request order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().map(Filter::query_pair));
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.query_value()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::query_pair).collect()
}

/// Client for the table endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl RestClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            http: http_client(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        bearer: &str,
    ) -> reqwest::RequestBuilder {
        debug!(%method, table, "table request");
        self.http
            .request(method, self.endpoint.join(&format!("rest/v1/{table}")))
            .header("apikey", &self.endpoint.anon_key)
            .bearer_auth(bearer)
    }

    /// Selects rows.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &SelectQuery,
        bearer: &str,
    ) -> Result<Vec<T>> {
        let response = self
            .request(reqwest::Method::GET, table, bearer)
            .query(&query.query_pairs())
            .send()
            .await
            .with_context(|| format!("Failed to send select on {table}"))?;

        check_response(response)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse rows from {table}"))
    }

    /// Selects exactly one row; zero or many rows is a service error.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &SelectQuery,
        bearer: &str,
    ) -> Result<T> {
        let response = self
            .request(reqwest::Method::GET, table, bearer)
            .header("Accept", SINGLE_OBJECT)
            .query(&query.query_pairs())
            .send()
            .await
            .with_context(|| format!("Failed to send select on {table}"))?;

        check_response(response)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse row from {table}"))
    }

    /// Inserts one row and returns it as stored.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
        bearer: &str,
    ) -> Result<T> {
        let response = self
            .request(reqwest::Method::POST, table, bearer)
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row)
            .send()
            .await
            .with_context(|| format!("Failed to send insert on {table}"))?;

        check_response(response)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse inserted row from {table}"))
    }

    /// Applies a partial update to the single row matching `filters`.
    ///
    /// # Errors
    /// Returns the service error unchanged (including when no row matched),
    /// or a transport error.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &B,
        bearer: &str,
    ) -> Result<T> {
        let response = self
            .request(reqwest::Method::PATCH, table, bearer)
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&filter_pairs(filters))
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Failed to send update on {table}"))?;

        check_response(response)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse updated row from {table}"))
    }

    /// Deletes rows matching `filters`; returns the number of rows removed.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn delete(&self, table: &str, filters: &[Filter], bearer: &str) -> Result<usize> {
        let response = self
            .request(reqwest::Method::DELETE, table, bearer)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&filter_pairs(filters))
            .send()
            .await
            .with_context(|| format!("Failed to send delete on {table}"))?;

        let body = check_response(response)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read delete response from {table}"))?;
        if body.trim().is_empty() {
            return Ok(0);
        }
        let rows: Vec<Value> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse deleted rows from {table}"))?;
        Ok(rows.len())
    }

    /// Inserts or merges one row keyed by the `on_conflict` column.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &B,
        bearer: &str,
    ) -> Result<T> {
        let response = self
            .request(reqwest::Method::POST, table, bearer)
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", MERGE_DUPLICATES)
            .query(&[("on_conflict", on_conflict)])
            .json(row)
            .send()
            .await
            .with_context(|| format!("Failed to send upsert on {table}"))?;

        check_response(response)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse upserted row from {table}"))
    }
}
