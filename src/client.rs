use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize)]
struct QueryRequest {
    query: String,
}

/// Response payload for `POST /query`. Every field is optional; the server
/// sends whatever subset applies to the question asked.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryResponse {
    pub response: Option<String>,
    pub data: Option<Vec<Map<String, Value>>>,
    pub sql_query: Option<String>,
    pub error: Option<String>,
}

/// Data dictionary from `GET /schema`: table name to ordered column names.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Schema {
    #[serde(default)]
    pub tables: Map<String, Value>,
}

impl Schema {
    /// Columns of a table, tolerating malformed entries (non-array values
    /// or non-string columns just drop out).
    pub fn columns(&self, table: &str) -> Vec<&str> {
        self.tables
            .get(table)
            .and_then(|v| v.as_array())
            .map(|cols| cols.iter().filter_map(|c| c.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct QueryClient {
    client: Client,
    base_url: String,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness check. Any 2xx counts as up; the body is ignored.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("health check returned status {}", response.status()));
        }

        Ok(())
    }

    pub async fn schema(&self) -> Result<Schema> {
        let url = format!("{}/schema", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("schema request failed with status {}", response.status()));
        }

        let schema: Schema = response.json().await?;
        Ok(schema)
    }

    /// Send a natural-language question. Non-2xx is an error regardless of
    /// body content; a well-formed body may still carry a server-side
    /// `error` field, which is the caller's to surface.
    pub async fn query(&self, query: &str) -> Result<QueryResponse> {
        let url = format!("{}/query", self.base_url);

        let request = QueryRequest {
            query: query.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("query request failed with status {}", response.status()));
        }

        let payload: QueryResponse = response.json().await?;
        Ok(payload)
    }
}
