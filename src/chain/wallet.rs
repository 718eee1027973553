#![forbid(unsafe_code)]

use std::time::Duration;

use alloy_primitives::{Address, B256};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::chain::rpc::{self, RpcFailure};

// EIP-1193 code for a signature request the user declined.
const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("wallet rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transaction rejected by wallet")]
    Rejected,
    #[error("malformed wallet response: {0}")]
    Decode(String),
    #[error("timed out waiting for transaction {0}")]
    ConfirmationTimeout(B256),
}

/// Transaction submission capability. The daemon never touches key material;
/// the production implementation delegates signing to the node account named
/// in configuration.
pub trait WalletProvider {
    fn address(&self) -> Address;

    fn send_transaction(
        &self,
        to: Address,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<B256, WalletError>> + Send;

    /// Waits until the transaction has the required number of confirmations.
    /// `Ok(false)` means the transaction was mined but reverted.
    fn await_confirmation(
        &self,
        tx_hash: B256,
        confirmations: u64,
    ) -> impl Future<Output = Result<bool, WalletError>> + Send;
}

#[derive(Clone)]
pub struct RpcWalletProvider {
    http: reqwest::Client,
    endpoint: Url,
    account: Address,
    request_timeout: Duration,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl RpcWalletProvider {
    pub fn new(
        endpoint: Url,
        account: Address,
        request_timeout: Duration,
        poll_interval: Duration,
        poll_attempts: u32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            account,
            request_timeout,
            poll_interval,
            poll_attempts,
        }
    }

    async fn rpc(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        rpc::call(&self.http, &self.endpoint, method, params, self.request_timeout)
            .await
            .map_err(|failure| match failure {
                RpcFailure::Transport(err) => WalletError::Transport(err),
                RpcFailure::Rpc(body) if is_rejection(body.code, &body.message) => {
                    WalletError::Rejected
                }
                RpcFailure::Rpc(body) => WalletError::Rpc {
                    code: body.code,
                    message: body.message,
                },
            })
    }

    async fn block_number(&self) -> Result<u64, WalletError> {
        let result = self.rpc("eth_blockNumber", json!([])).await?;
        rpc::decode_hex_u64(&result)
            .ok_or_else(|| WalletError::Decode("eth_blockNumber is not a quantity".to_string()))
    }
}

fn is_rejection(code: i64, message: &str) -> bool {
    let message = message.to_lowercase();
    code == USER_REJECTED_CODE || message.contains("rejected") || message.contains("denied")
}

#[derive(Debug, serde::Deserialize)]
struct ReceiptView {
    status: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
}

impl WalletProvider for RpcWalletProvider {
    fn address(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, to: Address, data: Vec<u8>) -> Result<B256, WalletError> {
        let params = json!([{
            "from": self.account,
            "to": to,
            "data": format!("0x{}", alloy_primitives::hex::encode(data)),
        }]);
        let result = self.rpc("eth_sendTransaction", params).await?;
        result
            .as_str()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| WalletError::Decode("transaction hash is not valid".to_string()))
    }

    async fn await_confirmation(&self, tx_hash: B256, confirmations: u64) -> Result<bool, WalletError> {
        let mut receipt: Option<ReceiptView> = None;
        for _ in 0..self.poll_attempts {
            let result = self
                .rpc("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !result.is_null() {
                receipt = Some(
                    serde_json::from_value(result)
                        .map_err(|err| WalletError::Decode(err.to_string()))?,
                );
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        let receipt = receipt.ok_or(WalletError::ConfirmationTimeout(tx_hash))?;
        if receipt.status != "0x1" {
            return Ok(false);
        }

        let mined_at = u64::from_str_radix(receipt.block_number.trim_start_matches("0x"), 16)
            .map_err(|_| WalletError::Decode("receipt block number is not a quantity".to_string()))?;
        if confirmations > 1 {
            let target = mined_at + confirmations - 1;
            for _ in 0..self.poll_attempts {
                if self.block_number().await? >= target {
                    return Ok(true);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
            return Err(WalletError::ConfirmationTimeout(tx_hash));
        }
        Ok(true)
    }
}
