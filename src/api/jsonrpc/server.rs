#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Result;
use jsonrpsee::server::{BatchRequestConfig, Server, ServerBuilder, ServerConfigBuilder};

use crate::app::config::RpcConfig;

pub async fn build_server(addr: SocketAddr, rpc_cfg: &RpcConfig) -> Result<Server> {
    let batch = match rpc_cfg.batch_request_limit {
        Some(0) => BatchRequestConfig::Disabled,
        Some(limit) => BatchRequestConfig::Limit(limit),
        None => BatchRequestConfig::Unlimited,
    };
    let config = ServerConfigBuilder::new()
        .max_request_body_size(rpc_cfg.max_request_body_size)
        .max_response_body_size(rpc_cfg.max_response_body_size)
        .max_connections(rpc_cfg.max_connections)
        .set_batch_request_config(batch)
        .build();

    let server = ServerBuilder::with_config(config).build(addr).await?;
    Ok(server)
}
