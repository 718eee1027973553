#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::{Deserialize, Serialize};

use crate::api::jsonrpc::{params, MethodRegistry, RpcContext, RpcError};
use crate::chain::{ChainReader as _, RpcWalletProvider, WalletProvider as _};
use crate::market::{self, PurchaseState};

#[derive(Debug, Deserialize)]
struct StatusParams {
    nft_address: String,
    token_id: String,
}

#[derive(Clone, Debug, Serialize)]
struct StatusResponse {
    listed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase: Option<PurchaseState>,
}

#[derive(Debug, Deserialize)]
struct ApproveParams {
    amount: String,
}

#[derive(Clone, Debug, Serialize)]
struct ApproveResponse {
    tx_hash: String,
    confirmed: bool,
    allowance: String,
}

#[derive(Debug, Deserialize)]
struct BuyParams {
    nft_address: String,
    token_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    nft_address: String,
    token_ids: Vec<String>,
    prices: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CancelParams {
    nft_address: String,
    token_id: String,
}

#[derive(Clone, Debug, Serialize)]
struct TxResponse {
    tx_hash: String,
    confirmed: bool,
    settled: bool,
}

fn wallet(ctx: &RpcContext) -> Result<&RpcWalletProvider, RpcError> {
    ctx.state.wallet.as_ref().ok_or(RpcError::NoWallet)
}

pub fn module(ctx: RpcContext, registry: MethodRegistry) -> Result<RpcModule<RpcContext>> {
    let mut m = RpcModule::new(ctx);

    registry.track("market.status");
    m.register_async_method("market.status", |p, ctx, _| async move {
        let StatusParams {
            nft_address,
            token_id,
        } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        params::parse_address("nft_address", &nft_address)?;
        params::parse_token_id("token_id", &token_id)?;

        let Some(listing) = ctx.state.chain.get_listing(&nft_address, &token_id).await? else {
            return Ok::<StatusResponse, RpcError>(StatusResponse {
                listed: false,
                price: None,
                seller: None,
                purchase: None,
            });
        };

        let seller = listing.seller.to_string();
        let buyer = ctx.state.wallet.as_ref().map(|wallet| wallet.address());
        let purchase =
            market::evaluate_purchase(&ctx.state.chain, listing.price, &seller, buyer).await?;

        Ok::<StatusResponse, RpcError>(StatusResponse {
            listed: true,
            price: Some(listing.price.to_string()),
            seller: Some(seller),
            purchase: Some(purchase),
        })
    })?;

    registry.track("market.approve");
    m.register_async_method("market.approve", |p, ctx, _| async move {
        let ApproveParams { amount } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        let amount = params::parse_amount("amount", &amount)?;
        let wallet = wallet(&ctx)?;

        let outcome = market::approve_spend(
            wallet,
            ctx.state.stablecoin,
            ctx.state.marketplace,
            amount,
            ctx.state.confirmations,
        )
        .await?;

        let allowance = ctx
            .state
            .chain
            .marketplace_allowance(&wallet.address().to_string())
            .await?;

        Ok::<ApproveResponse, RpcError>(ApproveResponse {
            tx_hash: outcome.tx_hash,
            confirmed: outcome.confirmed,
            allowance: allowance.to_string(),
        })
    })?;

    registry.track("market.buy");
    m.register_async_method("market.buy", |p, ctx, _| async move {
        let BuyParams {
            nft_address,
            token_ids,
        } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        let address = params::parse_address("nft_address", &nft_address)?;
        let ids = params::parse_token_ids("token_ids", &token_ids)?;
        let wallet = wallet(&ctx)?;

        let outcome = market::buy(
            wallet,
            ctx.state.marketplace,
            address,
            ids,
            ctx.state.confirmations,
        )
        .await?;

        let mut settled = outcome.confirmed;
        if outcome.confirmed {
            for token_id in &token_ids {
                settled &= market::await_delisted(
                    &ctx.state.indexer,
                    &nft_address,
                    token_id,
                    &ctx.state.settle_policy,
                )
                .await?;
            }
        }

        Ok::<TxResponse, RpcError>(TxResponse {
            tx_hash: outcome.tx_hash,
            confirmed: outcome.confirmed,
            settled,
        })
    })?;

    registry.track("market.list");
    m.register_async_method("market.list", |p, ctx, _| async move {
        let ListParams {
            nft_address,
            token_ids,
            prices,
        } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        if token_ids.len() != prices.len() {
            return Err(RpcError::InvalidParams(
                "token_ids and prices must have the same length".to_string(),
            ));
        }
        let address = params::parse_address("nft_address", &nft_address)?;
        let ids = params::parse_token_ids("token_ids", &token_ids)?;
        let amounts = prices
            .iter()
            .map(|price| params::parse_amount("prices", price))
            .collect::<Result<Vec<_>, _>>()?;
        let wallet = wallet(&ctx)?;

        let outcome = market::list_for_sale(
            wallet,
            ctx.state.marketplace,
            address,
            ids,
            amounts,
            ctx.state.confirmations,
        )
        .await?;

        let mut settled = outcome.confirmed;
        if outcome.confirmed {
            for token_id in &token_ids {
                settled &= market::await_listed(
                    &ctx.state.indexer,
                    &nft_address,
                    token_id,
                    &ctx.state.settle_policy,
                )
                .await?;
            }
        }

        Ok::<TxResponse, RpcError>(TxResponse {
            tx_hash: outcome.tx_hash,
            confirmed: outcome.confirmed,
            settled,
        })
    })?;

    registry.track("market.cancel");
    m.register_async_method("market.cancel", |p, ctx, _| async move {
        let CancelParams {
            nft_address,
            token_id,
        } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        let address = params::parse_address("nft_address", &nft_address)?;
        let id = params::parse_token_id("token_id", &token_id)?;
        let wallet = wallet(&ctx)?;

        let outcome = market::cancel_listing(
            wallet,
            ctx.state.marketplace,
            address,
            id,
            ctx.state.confirmations,
        )
        .await?;

        let mut settled = outcome.confirmed;
        if outcome.confirmed {
            settled = market::await_delisted(
                &ctx.state.indexer,
                &nft_address,
                &token_id,
                &ctx.state.settle_policy,
            )
            .await?;
        }

        Ok::<TxResponse, RpcError>(TxResponse {
            tx_hash: outcome.tx_hash,
            confirmed: outcome.confirmed,
            settled,
        })
    })?;

    Ok(m)
}
