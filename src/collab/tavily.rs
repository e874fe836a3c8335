use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchSettings;

use super::error::{CollaboratorError, check_status};
use super::retry::RetryPolicy;
use super::{SearchDepth, SearchHit, WebSearch};

const SERVICE: &str = "web search";

/// Tavily search API client.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    http: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: SearchDepth,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilySearch {
    pub fn new(settings: &SearchSettings, retry: RetryPolicy) -> Result<Self, CollaboratorError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CollaboratorError::Network {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timeout,
            retry,
        })
    }

    async fn search_once(
        &self,
        url: &str,
        body: &SearchRequest<'_>,
    ) -> Result<Vec<SearchHit>, CollaboratorError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))?;

        let response = check_status(SERVICE, response).await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))?;
        Ok(parsed.results)
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, CollaboratorError> {
        debug!(query, %depth, max_results, "search");
        let url = format!("{}/search", self.base_url);
        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: depth,
            max_results,
        };

        let mut hits = self
            .retry
            .run("search", || self.search_once(&url, &body))
            .await?;
        hits.truncate(max_results);
        Ok(hits)
    }
}
