#![forbid(unsafe_code)]

pub mod api;
pub mod app;
pub mod chain;
pub mod core;
pub mod indexer;
pub mod market;
pub mod nftmarketd;
pub mod pipeline;

use anyhow::Result;

pub use app::cli::Args as cli_args;
pub use app::config;
use tracing::info;

use crate::nftmarketd::Nftmarketd;

pub async fn run_nftmarketd(settings: &config::Settings, args: &cli_args) -> Result<()> {
    let state = Nftmarketd::new(&settings.config)?;

    if state.wallet.is_none() {
        info!("no wallet account configured; market write methods are disabled");
    }

    let addr_text = args
        .rpc_addr
        .as_deref()
        .unwrap_or_else(|| settings.config.rpc_addr());
    let addr: std::net::SocketAddr = addr_text.parse()?;
    let handle = api::jsonrpc::start_rpc(state, addr, &settings.config.rpc).await?;
    info!("JSON-RPC listening on {addr}");

    let stop_handle = handle.clone();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down…");
            let _ = stop_handle.stop();
        }
        _ = handle.stopped() => {}
    }

    Ok(())
}
