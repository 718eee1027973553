#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::{Deserialize, Serialize};

use crate::api::jsonrpc::{params, MethodRegistry, RpcContext, RpcError};
use crate::chain::ChainReader as _;
use crate::core::metadata::{self, NftAttribute};
use crate::core::record::{display_name, UNKNOWN_CONTRACT};

#[derive(Debug, Deserialize)]
struct NftGetParams {
    nft_address: String,
    token_id: String,
}

#[derive(Clone, Debug, Serialize)]
struct ListingView {
    price: String,
    seller: String,
}

#[derive(Clone, Debug, Serialize)]
struct NftGetResponse {
    nft_address: String,
    token_id: String,
    name: String,
    description: String,
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
    attributes: Vec<NftAttribute>,
    contract_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing: Option<ListingView>,
    chain: String,
}

pub fn module(ctx: RpcContext, registry: MethodRegistry) -> Result<RpcModule<RpcContext>> {
    let mut m = RpcModule::new(ctx);

    registry.track("nft.get");
    m.register_async_method("nft.get", |p, ctx, _| async move {
        let NftGetParams {
            nft_address,
            token_id,
        } = p
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        params::parse_address("nft_address", &nft_address)?;
        params::parse_token_id("token_id", &token_id)?;

        let chain = &ctx.state.chain;
        let (name_result, uri_result, owner_result, listing_result) = tokio::join!(
            chain.contract_name(&nft_address),
            chain.token_uri(&nft_address, &token_id),
            chain.owner_of(&nft_address, &token_id),
            chain.get_listing(&nft_address, &token_id),
        );

        let contract_name = match name_result {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => UNKNOWN_CONTRACT.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, nft_address, "contract name read failed");
                UNKNOWN_CONTRACT.to_string()
            }
        };

        let metadata = match uri_result {
            Ok(uri) if !uri.is_empty() => ctx.state.fetcher.fetch(&uri).await,
            Ok(_) => metadata::placeholder(),
            Err(err) => {
                tracing::warn!(error = %err, nft_address, token_id, "token uri read failed");
                metadata::placeholder()
            }
        };

        let owner = match owner_result {
            Ok(owner) => Some(owner),
            Err(err) => {
                tracing::warn!(error = %err, nft_address, token_id, "owner read failed");
                None
            }
        };

        let listing = match listing_result {
            Ok(listing) => listing.map(|listing| ListingView {
                price: listing.price.to_string(),
                seller: listing.seller.to_string(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, nft_address, token_id, "listing read failed");
                None
            }
        };

        let name = display_name(&metadata.name, &contract_name, &token_id);
        Ok::<NftGetResponse, RpcError>(NftGetResponse {
            nft_address,
            token_id,
            name,
            description: metadata.description,
            image: metadata.image,
            external_url: metadata.external_url,
            attributes: metadata.attributes,
            contract_name,
            owner,
            listing,
            chain: ctx.state.chain_label.clone(),
        })
    })?;

    Ok(m)
}
