#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Result;
use jsonrpsee::server::{RpcModule, ServerHandle};

use crate::app::config::RpcConfig;
use crate::nftmarketd::Nftmarketd;

mod context;
mod error;
mod params;
mod registry;
mod server;

pub mod methods;

pub use context::RpcContext;
pub use error::RpcError;
pub use registry::MethodRegistry;

pub async fn start_rpc(
    state: Nftmarketd,
    addr: SocketAddr,
    rpc_cfg: &RpcConfig,
) -> Result<ServerHandle> {
    let methods = MethodRegistry::default();
    let ctx = RpcContext {
        state,
        methods: methods.clone(),
    };

    let mut root = RpcModule::new(ctx.clone());
    methods::register_all(&mut root, ctx, methods)?;

    let server = server::build_server(addr, rpc_cfg).await?;
    Ok(server.start(root))
}
