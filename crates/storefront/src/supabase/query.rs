//! PostgREST request builder.
//!
//! Filters are encoded the PostgREST way (`category=eq.women`,
//! `order=created_at.desc`, `limit=6`). Writes ask for `return=minimal`,
//! so callers re-read when they need the stored rows.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{SupabaseClient, SupabaseError, Table, error_for_status, parse_json};

/// `Accept` value asking PostgREST for exactly one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// A request against one table, built up before a terminal call.
#[derive(Clone)]
#[must_use = "a query does nothing until a terminal method is awaited"]
pub struct QueryBuilder {
    client: SupabaseClient,
    table: Table,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
    on_conflict: Option<String>,
    access_token: Option<String>,
}

impl QueryBuilder {
    pub(super) fn new(client: SupabaseClient, table: Table) -> Self {
        Self {
            client,
            table,
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            on_conflict: None,
            access_token: None,
        }
    }

    /// Columns to return; embedded resources use `clothes(*)` syntax.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    /// Return at most `count` rows.
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Unique columns an upsert merges on.
    pub fn on_conflict(mut self, columns: &str) -> Self {
        self.on_conflict = Some(columns.to_string());
        self
    }

    /// Run the request as the signed-in user.
    pub fn auth(mut self, access_token: &str) -> Self {
        self.access_token = Some(access_token.to_string());
        self
    }

    // =========================================================================
    // Terminal operations
    // =========================================================================

    /// `GET` the matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows do not parse.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let response = self.build(Method::GET, true)?.send().await?;
        let response = error_for_status(response).await?;
        parse_json(response).await
    }

    /// `GET` exactly one row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row matches.
    pub async fn single<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let response = self
            .build(Method::GET, true)?
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        parse_json(response).await
    }

    /// `POST` a new row (or rows, when `body` is a sequence).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the row.
    pub async fn insert<B: Serialize + ?Sized>(self, body: &B) -> Result<(), SupabaseError> {
        let request = self
            .build(Method::POST, false)?
            .header("Prefer", "return=minimal")
            .json(body);
        error_for_status(request.send().await?).await?;
        Ok(())
    }

    /// `POST` a row, merging into an existing one on the `on_conflict` columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the row.
    pub async fn upsert<B: Serialize + ?Sized>(self, body: &B) -> Result<(), SupabaseError> {
        let request = self
            .build(Method::POST, false)?
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body);
        error_for_status(request.send().await?).await?;
        Ok(())
    }

    /// `PATCH` the filtered rows.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::MissingFilter` when no filter was added.
    pub async fn update<B: Serialize + ?Sized>(self, body: &B) -> Result<(), SupabaseError> {
        if self.filters.is_empty() {
            return Err(SupabaseError::MissingFilter("update"));
        }
        let request = self
            .build(Method::PATCH, false)?
            .header("Prefer", "return=minimal")
            .json(body);
        error_for_status(request.send().await?).await?;
        Ok(())
    }

    /// `DELETE` the filtered rows.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::MissingFilter` when no filter was added.
    pub async fn delete(self) -> Result<(), SupabaseError> {
        if self.filters.is_empty() {
            return Err(SupabaseError::MissingFilter("delete"));
        }
        let request = self.build(Method::DELETE, false)?;
        error_for_status(request.send().await?).await?;
        Ok(())
    }

    /// Query parameters in PostgREST order: select, filters, order, limit.
    fn params(&self, reading: bool) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if reading {
            let select = self.select.as_deref().unwrap_or("*");
            params.push(("select".to_string(), select.to_string()));
        }
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(columns) = &self.on_conflict {
            params.push(("on_conflict".to_string(), columns.clone()));
        }
        params
    }

    fn build(&self, method: Method, reading: bool) -> Result<reqwest::RequestBuilder, SupabaseError> {
        let endpoints = self.client.endpoints()?;
        let mut url = Url::parse(&format!("{}/{}", endpoints.rest, self.table.as_str()))?;

        let params = self.params(reading);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(&params);
        }

        debug!(%method, table = self.table.as_str(), query = url.query().unwrap_or(""), "PostgREST request");
        self.client
            .request(method, url, self.access_token.as_deref())
    }
}
