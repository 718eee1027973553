#![forbid(unsafe_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::events::MarketEvents;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("indexer transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("indexer query failed: {0}")]
    Query(String),
    #[error("indexer response missing data")]
    MissingData,
}

/// Read-only subgraph access; injected so the pipeline and market layers can
/// run against fakes in tests.
pub trait IndexerClient {
    fn market_events(&self) -> impl Future<Output = Result<MarketEvents, IndexerError>> + Send;

    fn seller_events(
        &self,
        seller: &str,
    ) -> impl Future<Output = Result<MarketEvents, IndexerError>> + Send;
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

#[derive(Clone)]
pub struct GraphIndexerClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    page_size: u32,
    request_timeout: Duration,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct GraphQlRequest {
    query: String,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<MarketEvents>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphIndexerClient {
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        page_size: u32,
        request_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            page_size,
            request_timeout,
            retry,
        }
    }

    fn market_query(&self) -> String {
        let first = self.page_size;
        format!(
            "{{\n  itemListeds(first: {first}) {{ id tokenId nftAddress seller price }}\n  itemBoughts(first: {first}) {{ id buyer nftAddress tokenId }}\n  itemCanceleds(first: {first}) {{ id seller nftAddress tokenId }}\n}}"
        )
    }

    fn seller_query(&self) -> String {
        let first = self.page_size;
        format!(
            "query sellerListings($seller: String!) {{\n  itemListeds(where: {{ seller: $seller }}, first: {first}) {{ id tokenId nftAddress seller price }}\n  itemBoughts(first: {first}) {{ id buyer nftAddress tokenId }}\n  itemCanceleds(where: {{ seller: $seller }}, first: {first}) {{ id seller nftAddress tokenId }}\n}}"
        )
    }

    async fn execute(
        &self,
        query: String,
        variables: serde_json::Value,
    ) -> Result<MarketEvents, IndexerError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .timeout(self.request_timeout)
            .json(&GraphQlRequest { query, variables });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: GraphQlResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(errors) = response.errors {
            let combined = errors
                .into_iter()
                .map(|err| err.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(IndexerError::Query(combined));
        }
        response.data.ok_or(IndexerError::MissingData)
    }

    /// The subgraph is a shared endpoint that flakes under load; failures
    /// retry with doubling delay up to the configured cap, then surface the
    /// last error.
    async fn execute_with_retry(
        &self,
        query: String,
        variables: serde_json::Value,
    ) -> Result<MarketEvents, IndexerError> {
        let mut delay = Duration::from_millis(self.retry.base_delay_ms);
        let max_delay = Duration::from_millis(self.retry.max_delay_ms);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.execute(query.clone(), variables.clone()).await {
                Ok(events) => return Ok(events),
                Err(err) if attempt >= self.retry.max_attempts.max(1) => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, attempt, "indexer query failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(max_delay);
                }
            }
        }
    }
}

impl IndexerClient for GraphIndexerClient {
    async fn market_events(&self) -> Result<MarketEvents, IndexerError> {
        self.execute_with_retry(self.market_query(), serde_json::json!({}))
            .await
    }

    async fn seller_events(&self, seller: &str) -> Result<MarketEvents, IndexerError> {
        let variables = serde_json::json!({ "seller": seller.to_lowercase() });
        self.execute_with_retry(self.seller_query(), variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::GraphQlResponse;
    use serde_json::json;

    #[test]
    fn decodes_feed_payload() {
        let payload = json!({
            "data": {
                "itemListeds": [
                    {"id": "1", "tokenId": "7", "nftAddress": "0xAA", "seller": "0xS", "price": "1000000"},
                ],
                "itemBoughts": [],
                "itemCanceleds": [],
            }
        });

        let response: GraphQlResponse = serde_json::from_value(payload).expect("response");
        let events = response.data.expect("data");
        assert_eq!(events.listed.len(), 1);
        assert_eq!(events.listed[0].token_id, "7");
    }

    #[test]
    fn surfaces_graphql_errors() {
        let payload = json!({
            "errors": [{"message": "rate limited"}],
        });
        let response: GraphQlResponse = serde_json::from_value(payload).expect("response");
        assert!(response.data.is_none());
        assert_eq!(response.errors.expect("errors")[0].message, "rate limited");
    }
}
