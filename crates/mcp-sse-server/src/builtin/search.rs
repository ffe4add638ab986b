//! Outbound web search.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::{McpError, McpResult};

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Capability that answers web queries.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> McpResult<Vec<SearchHit>>;
}

/// Client for a Brave-style search API: `GET endpoint?q=..&count=..` with
/// the key in `X-Subscription-Token`.
#[derive(Debug, Clone)]
pub struct BraveSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
}

impl BraveSearchClient {
    pub fn new(config: &SearchConfig) -> McpResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| McpError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for BraveSearchClient {
    async fn search(&self, query: &str, count: usize) -> McpResult<Vec<SearchHit>> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            McpError::Upstream("search API key is not configured (set SEARCH_API_KEY)".into())
        })?;

        tracing::debug!("Searching for {query:?} (count {count})");
        let count = count.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .send()
            .await
            .map_err(|e| McpError::Upstream(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(McpError::Upstream(format!(
                "search provider returned {status}"
            )));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| McpError::Upstream(format!("unreadable search response: {e}")))?;

        Ok(body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: r.description.unwrap_or_default(),
            })
            .collect())
    }
}
