#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;

use super::{context::RpcContext, registry::MethodRegistry};

pub mod listings;
pub mod market;
pub mod nft;
pub mod system;

pub fn register_all(
    root: &mut RpcModule<RpcContext>,
    ctx: RpcContext,
    registry: MethodRegistry,
) -> Result<()> {
    root.merge(system::module(ctx.clone(), registry.clone())?)?;
    root.merge(listings::module(ctx.clone(), registry.clone())?)?;
    root.merge(nft::module(ctx.clone(), registry.clone())?)?;
    root.merge(market::module(ctx, registry)?)?;
    Ok(())
}
