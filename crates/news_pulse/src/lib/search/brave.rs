use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::search::{truncate_chars, NewsSearch, SearchResult, DESCRIPTION_BUDGET};

#[derive(Debug, thiserror::Error)]
pub enum BraveError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Brave web search client, tuned for recent news: `freshness=pw`
/// restricts results to the past week.
#[derive(Debug, Clone)]
pub struct BraveSearch {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BraveSearch {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.search.brave.com/res/v1/web/search".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn send_search_request(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<SearchResult>, BraveError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("count", &count.to_string()),
                ("freshness", "pw"),
                ("text_decorations", "false"),
            ])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .timeout(Self::REQUEST_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(BraveError::Api { status, message });
        }

        let body = resp.json::<WebSearchResponse>().await?;

        let results = body
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SearchResult {
                title: r.title.unwrap_or_default(),
                description: truncate_chars(&r.description.unwrap_or_default(), DESCRIPTION_BUDGET),
                url: r.url.unwrap_or_default(),
                published: r.age,
            })
            .collect();

        Ok(results)
    }
}

impl NewsSearch for BraveSearch {
    const MAX_RESULTS: usize = 20;

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        let count = count.clamp(1, Self::MAX_RESULTS);

        match self.send_search_request(query, count).await {
            Ok(results) => {
                tracing::debug!(count = results.len(), "Search returned results");
                results
            }
            Err(e) => {
                tracing::warn!(error = ?e, query, "Search failed, returning empty results");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    age: Option<String>,
}
