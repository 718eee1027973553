use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::indexer::RetryConfig;

pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud";

fn default_rpc_addr() -> String {
    "127.0.0.1:7070".to_string()
}

fn default_max_request_body_size() -> u32 {
    10 * 1024 * 1024
}

fn default_max_response_body_size() -> u32 {
    10 * 1024 * 1024
}

fn default_max_connections() -> u32 {
    100
}

fn default_page_size() -> u32 {
    1000
}

fn default_chain_label() -> String {
    "Fuji".to_string()
}

fn default_call_timeout_secs() -> u64 {
    10
}

fn default_confirmations() -> u64 {
    1
}

fn default_receipt_poll_ms() -> u64 {
    2000
}

fn default_receipt_poll_attempts() -> u32 {
    30
}

fn default_ipfs_gateways() -> Vec<String> {
    vec![DEFAULT_IPFS_GATEWAY.to_string()]
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_item_delay_ms() -> u64 {
    100
}

fn default_chunk_size() -> usize {
    5
}

fn default_chunk_delay_ms() -> u64 {
    500
}

fn default_settle_attempts() -> u32 {
    10
}

fn default_settle_delay_ms() -> u64 {
    2000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_addr")]
    pub addr: String,
    #[serde(default = "default_max_request_body_size")]
    pub max_request_body_size: u32,
    #[serde(default = "default_max_response_body_size")]
    pub max_response_body_size: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub batch_request_limit: Option<u32>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            addr: default_rpc_addr(),
            max_request_body_size: default_max_request_body_size(),
            max_response_body_size: default_max_response_body_size(),
            max_connections: default_max_connections(),
            batch_request_limit: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IndexerConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_fetch_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_label")]
    pub label: String,
    pub marketplace: String,
    pub stablecoin: String,
    /// Node-managed account used for signing; market write methods are
    /// unavailable without it.
    #[serde(default)]
    pub wallet_account: Option<String>,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_poll_attempts")]
    pub receipt_poll_attempts: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_ipfs_gateways")]
    pub ipfs_gateways: Vec<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    #[serde(default = "default_settle_attempts")]
    pub settle_attempts: u32,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ipfs_gateways: default_ipfs_gateways(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            item_delay_ms: default_item_delay_ms(),
            chunk_size: default_chunk_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
            settle_attempts: default_settle_attempts(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Configuration {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub rpc_addr: Option<String>,
    pub indexer: IndexerConfig,
    pub chain: ChainConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Configuration {
    pub fn rpc_addr(&self) -> &str {
        self.rpc_addr.as_deref().unwrap_or(self.rpc.addr.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub config: Configuration,
}

pub fn load(path: &Path) -> anyhow::Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("read config {}: {err}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .map_err(|err| anyhow::anyhow!("parse config {}: {err}", path.display()))?;
    Ok(settings)
}
