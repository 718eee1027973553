#![forbid(unsafe_code)]

use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde_json::json;
use url::Url;

use crate::chain::rpc::{self, RpcFailure};
use crate::chain::{abi, parse_address, parse_token_id, ChainError, ChainReader, Listing};

/// `eth_call`-backed reader against one JSON-RPC endpoint. Knows the
/// marketplace and stablecoin addresses so callers deal in domain reads, not
/// contract plumbing.
#[derive(Clone)]
pub struct EvmChainReader {
    http: reqwest::Client,
    endpoint: Url,
    marketplace: Address,
    stablecoin: Address,
    call_timeout: Duration,
}

impl EvmChainReader {
    pub fn new(
        endpoint: Url,
        marketplace: Address,
        stablecoin: Address,
        call_timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            marketplace,
            stablecoin,
            call_timeout,
        }
    }

    pub fn marketplace(&self) -> Address {
        self.marketplace
    }

    pub fn stablecoin(&self) -> Address {
        self.stablecoin
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let params = json!([
            {
                "to": to,
                "data": format!("0x{}", alloy_primitives::hex::encode(data)),
            },
            "latest",
        ]);
        let result = rpc::call(&self.http, &self.endpoint, "eth_call", params, self.call_timeout)
            .await
            .map_err(|failure| match failure {
                RpcFailure::Transport(err) => ChainError::Transport(err),
                RpcFailure::Rpc(body) => ChainError::Rpc {
                    code: body.code,
                    message: body.message,
                },
            })?;
        rpc::decode_hex_bytes(&result)
            .ok_or_else(|| ChainError::Decode("eth_call result is not hex data".to_string()))
    }
}

fn is_revert(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("revert") || message.contains("item not listed")
}

fn decode_error(err: alloy_sol_types::Error) -> ChainError {
    ChainError::Decode(err.to_string())
}

impl ChainReader for EvmChainReader {
    async fn contract_name(&self, nft_address: &str) -> Result<String, ChainError> {
        let to = parse_address(nft_address)?;
        let out = self.eth_call(to, abi::nameCall {}.abi_encode()).await?;
        abi::nameCall::abi_decode_returns(&out).map_err(decode_error)
    }

    async fn token_uri(&self, nft_address: &str, token_id: &str) -> Result<String, ChainError> {
        let to = parse_address(nft_address)?;
        let call = abi::tokenURICall {
            tokenId: parse_token_id(token_id)?,
        };
        let out = self.eth_call(to, call.abi_encode()).await?;
        abi::tokenURICall::abi_decode_returns(&out).map_err(decode_error)
    }

    async fn owner_of(&self, nft_address: &str, token_id: &str) -> Result<String, ChainError> {
        let to = parse_address(nft_address)?;
        let call = abi::ownerOfCall {
            tokenId: parse_token_id(token_id)?,
        };
        let out = self.eth_call(to, call.abi_encode()).await?;
        let owner = abi::ownerOfCall::abi_decode_returns(&out).map_err(decode_error)?;
        Ok(owner.to_string())
    }

    async fn get_listing(
        &self,
        nft_address: &str,
        token_id: &str,
    ) -> Result<Option<Listing>, ChainError> {
        let call = abi::getListingCall {
            nftAddress: parse_address(nft_address)?,
            tokenId: parse_token_id(token_id)?,
        };
        let out = match self.eth_call(self.marketplace, call.abi_encode()).await {
            Ok(out) => out,
            // A revert here means "not listed", not a failure.
            Err(ChainError::Rpc { message, .. }) if is_revert(&message) => return Ok(None),
            Err(err) => return Err(err),
        };
        let listing = abi::getListingCall::abi_decode_returns(&out).map_err(decode_error)?;
        if listing.price.is_zero() || listing.seller.is_zero() {
            return Ok(None);
        }
        Ok(Some(Listing {
            price: listing.price,
            seller: listing.seller,
        }))
    }

    async fn stablecoin_balance(&self, owner: &str) -> Result<U256, ChainError> {
        let call = abi::balanceOfCall {
            account: parse_address(owner)?,
        };
        let out = self.eth_call(self.stablecoin, call.abi_encode()).await?;
        abi::balanceOfCall::abi_decode_returns(&out).map_err(decode_error)
    }

    async fn marketplace_allowance(&self, owner: &str) -> Result<U256, ChainError> {
        let call = abi::allowanceCall {
            owner: parse_address(owner)?,
            spender: self.marketplace,
        };
        let out = self.eth_call(self.stablecoin, call.abi_encode()).await?;
        abi::allowanceCall::abi_decode_returns(&out).map_err(decode_error)
    }
}
