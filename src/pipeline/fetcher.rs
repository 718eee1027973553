#![forbid(unsafe_code)]

use std::time::Duration;

use thiserror::Error;

use crate::core::metadata::{self, NftMetadata};
use crate::core::uri::{self, MetadataDecodeError, Resolved};

#[derive(Debug, Error)]
enum FetchError {
    #[error("empty token uri")]
    EmptyUri,
    #[error(transparent)]
    Decode(#[from] MetadataDecodeError),
    #[error("metadata transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("metadata fetch returned status {0}")]
    Status(u16),
}

/// Retrieves and normalizes token metadata. `fetch` never fails: every error
/// path substitutes the marked fallback record so one bad token cannot sink
/// a batch.
#[derive(Clone)]
pub struct MetadataFetcher {
    http: reqwest::Client,
    gateways: Vec<String>,
    timeout: Duration,
}

impl MetadataFetcher {
    pub fn new(mut gateways: Vec<String>, timeout: Duration) -> Self {
        if gateways.is_empty() {
            gateways.push(crate::app::config::DEFAULT_IPFS_GATEWAY.to_string());
        }
        Self {
            http: reqwest::Client::new(),
            gateways,
            timeout,
        }
    }

    /// The gateway used for image rewriting and inline payloads.
    pub fn primary_gateway(&self) -> &str {
        &self.gateways[0]
    }

    pub async fn fetch(&self, token_uri: &str) -> NftMetadata {
        match self.try_fetch(token_uri).await {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::warn!(error = %err, token_uri, "metadata fetch failed, using fallback");
                metadata::fallback()
            }
        }
    }

    async fn try_fetch(&self, token_uri: &str) -> Result<NftMetadata, FetchError> {
        if token_uri.is_empty() {
            return Err(FetchError::EmptyUri);
        }

        // Inline payloads resolve identically under every gateway; decode
        // failures fall back, never retry.
        if let Resolved::Inline(raw) = uri::resolve(token_uri, self.primary_gateway())? {
            return Ok(metadata::normalize(&raw, self.primary_gateway()));
        }

        // Only ipfs:// locators vary by gateway; for everything else the
        // candidate list collapses to one URL.
        let mut last_error = None;
        let mut tried = Vec::new();
        for gateway in &self.gateways {
            let url = uri::rewrite_url(token_uri, gateway);
            if tried.contains(&url) {
                continue;
            }
            match self.fetch_json(&url).await {
                Ok(raw) => return Ok(metadata::normalize(&raw, gateway)),
                Err(err) => {
                    tracing::debug!(error = %err, url, "metadata gateway attempt failed");
                    last_error = Some(err);
                    tried.push(url);
                }
            }
        }
        Err(last_error.unwrap_or(FetchError::EmptyUri))
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::MetadataFetcher;
    use crate::core::metadata::FAILED_TO_LOAD;
    use std::time::Duration;

    fn fetcher() -> MetadataFetcher {
        MetadataFetcher::new(
            vec!["https://gateway.pinata.cloud".to_string()],
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn inline_metadata_needs_no_network() {
        // {"name":"T","image":"ipfs://Qm1"}
        let uri = "data:application/json;base64,eyJuYW1lIjoiVCIsImltYWdlIjoiaXBmczovL1FtMSJ9";
        let metadata = fetcher().fetch(uri).await;
        assert_eq!(metadata.name, "T");
        assert_eq!(metadata.image, "https://gateway.pinata.cloud/ipfs/Qm1");
    }

    #[tokio::test]
    async fn bad_inline_payload_falls_back() {
        let metadata = fetcher().fetch("data:application/json;base64,!!!").await;
        assert_eq!(metadata.name, FAILED_TO_LOAD);
    }

    #[tokio::test]
    async fn unreachable_url_falls_back() {
        let metadata = fetcher()
            .fetch("http://127.0.0.1:1/metadata.json")
            .await;
        assert_eq!(metadata.name, FAILED_TO_LOAD);
        assert!(metadata.attributes.is_empty());
    }

    #[tokio::test]
    async fn empty_uri_falls_back() {
        let metadata = fetcher().fetch("").await;
        assert_eq!(metadata.name, FAILED_TO_LOAD);
    }
}
