use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// One row as returned by the hosted database; column order is preserved.
pub type Row = Map<String, Value>;

/// Table-scoped access to the hosted database. Only inserts and full selects
/// are needed.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Inserts one row and returns the rows echoed back by the backend.
    /// An empty result means nothing was written.
    async fn insert(&self, table: &str, row: Value) -> AppResult<Vec<Row>>;

    async fn select_all(&self, table: &str) -> AppResult<Vec<Row>>;
}

/// PostgREST client for a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("fundhunt-backend/supabase")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn read_rows(response: reqwest::Response, table: &str) -> AppResult<Vec<Row>> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Supabase request on {table} failed: HTTP {}: {error_text}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TableStore for SupabaseClient {
    async fn insert(&self, table: &str, row: Value) -> AppResult<Vec<Row>> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let rows = Self::read_rows(response, table).await?;
        log::debug!("Inserted into {table}, {} row(s) echoed", rows.len());
        Ok(rows)
    }

    async fn select_all(&self, table: &str) -> AppResult<Vec<Row>> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("select", "*")])
            .send()
            .await?;

        Self::read_rows(response, table).await
    }
}
