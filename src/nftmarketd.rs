use std::time::{Duration, Instant};

use alloy_primitives::Address;
use anyhow::Context as _;
use url::Url;

use crate::app::config::Configuration;
use crate::chain::{EvmChainReader, RpcWalletProvider};
use crate::indexer::GraphIndexerClient;
use crate::market::SettlePolicy;
use crate::pipeline::{EnrichOptions, MetadataFetcher};

#[derive(Clone)]
pub struct Nftmarketd {
    pub(crate) started: Instant,
    pub indexer: GraphIndexerClient,
    pub chain: EvmChainReader,
    pub wallet: Option<RpcWalletProvider>,
    pub fetcher: MetadataFetcher,
    pub chain_label: String,
    pub marketplace: Address,
    pub stablecoin: Address,
    pub confirmations: u64,
    pub enrich_options: EnrichOptions,
    pub settle_policy: SettlePolicy,
    pub info: serde_json::Value,
}

impl Nftmarketd {
    pub fn new(config: &Configuration) -> anyhow::Result<Self> {
        let indexer_endpoint: Url = config
            .indexer
            .endpoint
            .parse()
            .context("indexer endpoint url")?;
        let chain_endpoint: Url = config.chain.rpc_url.parse().context("chain rpc url")?;
        let marketplace: Address = config
            .chain
            .marketplace
            .parse()
            .context("marketplace address")?;
        let stablecoin: Address = config
            .chain
            .stablecoin
            .parse()
            .context("stablecoin address")?;

        let indexer = GraphIndexerClient::new(
            indexer_endpoint,
            config.indexer.api_key.clone(),
            config.indexer.page_size,
            Duration::from_secs(config.indexer.request_timeout_secs),
            config.indexer.retry.clone(),
        );

        let call_timeout = Duration::from_secs(config.chain.call_timeout_secs);
        let chain = EvmChainReader::new(chain_endpoint.clone(), marketplace, stablecoin, call_timeout);

        let wallet = config
            .chain
            .wallet_account
            .as_deref()
            .map(|account| -> anyhow::Result<RpcWalletProvider> {
                let account: Address = account.parse().context("wallet account address")?;
                Ok(RpcWalletProvider::new(
                    chain_endpoint.clone(),
                    account,
                    call_timeout,
                    Duration::from_millis(config.chain.receipt_poll_ms),
                    config.chain.receipt_poll_attempts,
                ))
            })
            .transpose()?;

        let fetcher = MetadataFetcher::new(
            config.pipeline.ipfs_gateways.clone(),
            Duration::from_secs(config.pipeline.fetch_timeout_secs),
        );

        let enrich_options = EnrichOptions {
            chain_label: config.chain.label.clone(),
            item_delay: Duration::from_millis(config.pipeline.item_delay_ms),
            chunk_size: config.pipeline.chunk_size,
            chunk_delay: Duration::from_millis(config.pipeline.chunk_delay_ms),
        };
        let settle_policy = SettlePolicy {
            attempts: config.pipeline.settle_attempts,
            delay: Duration::from_millis(config.pipeline.settle_delay_ms),
        };

        let info = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "build": option_env!("GIT_HASH").unwrap_or("unknown"),
        });

        Ok(Self {
            started: Instant::now(),
            indexer,
            chain,
            wallet,
            fetcher,
            chain_label: config.chain.label.clone(),
            marketplace,
            stablecoin,
            confirmations: config.chain.confirmations,
            enrich_options,
            settle_policy,
            info,
        })
    }
}
