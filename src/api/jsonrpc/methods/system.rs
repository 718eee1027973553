#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::Serialize;

use crate::api::jsonrpc::{MethodRegistry, RpcContext, RpcError};

#[derive(Clone, Debug, Serialize)]
struct SystemInfoResponse {
    version: Option<serde_json::Value>,
    build: Option<serde_json::Value>,
    uptime_secs: u64,
    chain: String,
    marketplace: String,
    stablecoin: String,
    wallet_enabled: bool,
}

pub fn module(ctx: RpcContext, registry: MethodRegistry) -> Result<RpcModule<RpcContext>> {
    let mut m = RpcModule::new(ctx);

    registry.track("system.ping");
    m.register_method("system.ping", |_p, _ctx, _| "pong")?;

    registry.track("system.get_info");
    m.register_method("system.get_info", |_p, ctx, _| {
        let uptime = ctx.state.started.elapsed().as_secs();
        Ok::<SystemInfoResponse, RpcError>(SystemInfoResponse {
            version: ctx.state.info.get("version").cloned(),
            build: ctx.state.info.get("build").cloned(),
            uptime_secs: uptime,
            chain: ctx.state.chain_label.clone(),
            marketplace: ctx.state.marketplace.to_string(),
            stablecoin: ctx.state.stablecoin.to_string(),
            wallet_enabled: ctx.state.wallet.is_some(),
        })
    })?;

    registry.track("system.help");
    m.register_method("system.help", |_p, ctx, _| ctx.methods.list())?;

    Ok(m)
}
