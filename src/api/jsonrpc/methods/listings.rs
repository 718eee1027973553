#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::{Deserialize, Serialize};

use crate::api::jsonrpc::{params, MethodRegistry, RpcContext, RpcError};
use crate::core::events::ListingEvent;
use crate::core::reconcile::active_listings;
use crate::core::record::EnrichedNft;
use crate::indexer::IndexerClient as _;
use crate::pipeline::enrich_all;

#[derive(Clone, Debug, Serialize)]
struct ListingsResponse {
    listings: Vec<EnrichedNft>,
}

#[derive(Clone, Debug, Serialize)]
struct ReconciledResponse {
    listings: Vec<ListingEvent>,
}

#[derive(Debug, Deserialize)]
struct UserListingsParams {
    seller: String,
}

pub fn module(ctx: RpcContext, registry: MethodRegistry) -> Result<RpcModule<RpcContext>> {
    let mut m = RpcModule::new(ctx);

    registry.track("listings.active");
    m.register_async_method("listings.active", |_p, ctx, _| async move {
        let events = ctx.state.indexer.market_events().await?;
        let active = active_listings(&events.listed, &events.bought, &events.canceled);
        let listings = enrich_all(
            &ctx.state.chain,
            &ctx.state.fetcher,
            &active,
            &ctx.state.enrich_options,
        )
        .await;
        Ok::<ListingsResponse, RpcError>(ListingsResponse { listings })
    })?;

    registry.track("listings.reconciled");
    m.register_async_method("listings.reconciled", |_p, ctx, _| async move {
        let events = ctx.state.indexer.market_events().await?;
        let listings = active_listings(&events.listed, &events.bought, &events.canceled);
        Ok::<ReconciledResponse, RpcError>(ReconciledResponse { listings })
    })?;

    registry.track("listings.user");
    m.register_async_method("listings.user", |p, ctx, _| async move {
        let UserListingsParams { seller } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        params::parse_address("seller", &seller)?;

        let events = ctx.state.indexer.seller_events(&seller).await?;
        let active = active_listings(&events.listed, &events.bought, &events.canceled);
        let listings = enrich_all(
            &ctx.state.chain,
            &ctx.state.fetcher,
            &active,
            &ctx.state.enrich_options,
        )
        .await;
        Ok::<ListingsResponse, RpcError>(ListingsResponse { listings })
    })?;

    Ok(m)
}
