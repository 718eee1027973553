#![forbid(unsafe_code)]

use jsonrpsee::types::{ErrorObject, ErrorObjectOwned};
use thiserror::Error;

use crate::chain::{ChainError, WalletError};
use crate::indexer::IndexerError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("wallet account not configured; set chain.wallet_account")]
    NoWallet,
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("transaction rejected by wallet")]
    Rejected,
    #[error("indexer unavailable: {0}")]
    Indexer(String),
    #[error("{0}")]
    Other(String),
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidParams(msg) => ErrorObject::owned(-32602, msg, None::<()>),
            RpcError::NoWallet => ErrorObject::owned(-32001, err.to_string(), None::<()>),
            RpcError::Rejected => ErrorObject::owned(-32003, err.to_string(), None::<()>),
            RpcError::Indexer(msg) => ErrorObject::owned(-32010, msg, None::<()>),
            other => ErrorObject::owned(-32000, other.to_string(), None::<()>),
        }
    }
}

impl From<IndexerError> for RpcError {
    fn from(err: IndexerError) -> Self {
        RpcError::Indexer(err.to_string())
    }
}

impl From<ChainError> for RpcError {
    fn from(err: ChainError) -> Self {
        RpcError::Other(err.to_string())
    }
}

impl From<WalletError> for RpcError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected => RpcError::Rejected,
            other => RpcError::Other(other.to_string()),
        }
    }
}
