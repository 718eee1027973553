#![forbid(unsafe_code)]

pub mod abi;
pub mod evm;
mod rpc;
pub mod wallet;

use alloy_primitives::{Address, U256};
use thiserror::Error;

pub use evm::EvmChainReader;
pub use wallet::{RpcWalletProvider, WalletError, WalletProvider};

/// A marketplace listing as reported by `getListing`. Zero price or
/// zero-address seller never reach this type; they decode to "not listed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub price: U256,
    pub seller: Address,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chain rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),
    #[error("malformed call result: {0}")]
    Decode(String),
}

/// Read-only contract access. Implementations are injected so tests can
/// substitute fakes; the production implementation speaks `eth_call`.
pub trait ChainReader {
    fn contract_name(
        &self,
        nft_address: &str,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;

    fn token_uri(
        &self,
        nft_address: &str,
        token_id: &str,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;

    fn owner_of(
        &self,
        nft_address: &str,
        token_id: &str,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;

    fn get_listing(
        &self,
        nft_address: &str,
        token_id: &str,
    ) -> impl Future<Output = Result<Option<Listing>, ChainError>> + Send;

    fn stablecoin_balance(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<U256, ChainError>> + Send;

    fn marketplace_allowance(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<U256, ChainError>> + Send;
}

pub fn parse_address(value: &str) -> Result<Address, ChainError> {
    value
        .parse()
        .map_err(|_| ChainError::InvalidAddress(value.to_string()))
}

pub fn parse_token_id(value: &str) -> Result<U256, ChainError> {
    // from_str_radix maps "" to zero; reject it before it aliases token 0.
    if value.is_empty() {
        return Err(ChainError::InvalidTokenId(value.to_string()));
    }
    U256::from_str_radix(value, 10).map_err(|_| ChainError::InvalidTokenId(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_address, parse_token_id, ChainError};
    use alloy_primitives::U256;

    #[test]
    fn parse_address_accepts_any_case() {
        assert!(parse_address("0x3213EB712A2A97E06E9F13a1349ad49FA4331443").is_ok());
        assert!(parse_address("0x3213eb712a2a97e06e9f13a1349ad49fa4331443").is_ok());
    }

    #[test]
    fn parse_address_rejects_garbage() {
        let err = parse_address("not-an-address").expect_err("invalid");
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }

    #[test]
    fn parse_token_id_is_decimal() {
        assert_eq!(parse_token_id("42").expect("decimal"), U256::from(42u64));
        assert!(parse_token_id("0x2a").is_err());
        assert!(parse_token_id("").is_err());
    }
}
