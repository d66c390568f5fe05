use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{classify_response, ResultSet};
use crate::config::SearxngConfig;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search failed: status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction over the meta-search backend. Implemented by `SearxngClient`
/// for production; mock implementations used in tests.
pub trait SearchBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<ResultSet, SearchError>;
}

#[derive(Debug, Clone)]
pub struct SearxngClient {
    http: Client,
    base_url: String,
    categories: String,
    language: String,
    time_range: String,
    engines: Option<String>,
}

impl SearxngClient {
    pub fn new(http: Client, config: &SearxngConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            categories: config.categories.clone(),
            language: config.language.clone(),
            time_range: config.time_range.clone(),
            engines: config.engines.clone(),
        }
    }
}

impl SearchBackend for SearxngClient {
    async fn search(&self, query: &str, limit: usize) -> Result<ResultSet, SearchError> {
        let url = format!("{}/search", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("categories", self.categories.clone()),
            ("language", self.language.clone()),
            ("time_range", self.time_range.clone()),
            ("num_results", limit.to_string()),
        ];
        if let Some(engines) = &self.engines {
            params.push(("engines", engines.clone()));
        }

        let response = self
            .http
            .get(&url)
            .query(&params)
            .header("Accept", "application/json")
            .header("User-Agent", crate::USER_AGENT)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, query, "searxng returned non-success status");
            return Err(SearchError::Status(status.as_u16()));
        }

        let raw: serde_json::Value = response.json().await?;
        let set = classify_response(&raw).into_result_set(query);
        debug!(query, results = set.results.len(), "searxng search complete");
        Ok(set)
    }
}
