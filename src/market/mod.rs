#![forbid(unsafe_code)]

use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;

use crate::chain::{abi, ChainError, ChainReader, WalletError, WalletProvider};
use crate::core::events::listing_key;
use crate::core::reconcile::active_listings;
use crate::indexer::{IndexerClient, IndexerError};

/// Per-listing action state as seen by a prospective buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum PurchaseState {
    NeedsApproval,
    ReadyToBuy,
    NotEligible(IneligibleReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IneligibleReason {
    Seller,
    InsufficientFunds,
    Disconnected,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub confirmed: bool,
}

/// Evaluates the purchase transition rule for one listing: balance first,
/// then the seller check, then allowance.
pub async fn evaluate_purchase<C: ChainReader>(
    chain: &C,
    price: U256,
    seller: &str,
    buyer: Option<Address>,
) -> Result<PurchaseState, ChainError> {
    let Some(buyer) = buyer else {
        return Ok(PurchaseState::NotEligible(IneligibleReason::Disconnected));
    };

    let buyer_text = buyer.to_string();
    let (balance, allowance) = tokio::join!(
        chain.stablecoin_balance(&buyer_text),
        chain.marketplace_allowance(&buyer_text),
    );
    let balance = balance?;
    let allowance = allowance?;

    if balance < price {
        return Ok(PurchaseState::NotEligible(IneligibleReason::InsufficientFunds));
    }
    if is_same_account(seller, buyer) {
        return Ok(PurchaseState::NotEligible(IneligibleReason::Seller));
    }
    if allowance >= price {
        Ok(PurchaseState::ReadyToBuy)
    } else {
        Ok(PurchaseState::NeedsApproval)
    }
}

fn is_same_account(seller: &str, buyer: Address) -> bool {
    match seller.parse::<Address>() {
        Ok(seller) => seller == buyer,
        Err(_) => seller.to_lowercase() == buyer.to_string().to_lowercase(),
    }
}

/// Submits an ERC-20 approval for the marketplace and, once confirmed,
/// re-reads the allowance so the caller can re-run the transition rule.
pub async fn approve_spend<W: WalletProvider>(
    wallet: &W,
    stablecoin: Address,
    marketplace: Address,
    amount: U256,
    confirmations: u64,
) -> Result<TxOutcome, WalletError> {
    let call = abi::approveCall {
        spender: marketplace,
        amount,
    };
    submit(wallet, stablecoin, call.abi_encode(), confirmations).await
}

pub async fn buy<W: WalletProvider>(
    wallet: &W,
    marketplace: Address,
    nft_address: Address,
    token_ids: Vec<U256>,
    confirmations: u64,
) -> Result<TxOutcome, WalletError> {
    let call = abi::buyManyCall {
        nftAddress: nft_address,
        tokenIds: token_ids,
    };
    submit(wallet, marketplace, call.abi_encode(), confirmations).await
}

pub async fn list_for_sale<W: WalletProvider>(
    wallet: &W,
    marketplace: Address,
    nft_address: Address,
    token_ids: Vec<U256>,
    prices: Vec<U256>,
    confirmations: u64,
) -> Result<TxOutcome, WalletError> {
    let call = abi::offerManyCall {
        nftAddress: nft_address,
        tokenIds: token_ids,
        prices,
    };
    submit(wallet, marketplace, call.abi_encode(), confirmations).await
}

pub async fn cancel_listing<W: WalletProvider>(
    wallet: &W,
    marketplace: Address,
    nft_address: Address,
    token_id: U256,
    confirmations: u64,
) -> Result<TxOutcome, WalletError> {
    let call = abi::cancelListingCall {
        nftAddress: nft_address,
        tokenId: token_id,
    };
    submit(wallet, marketplace, call.abi_encode(), confirmations).await
}

async fn submit<W: WalletProvider>(
    wallet: &W,
    to: Address,
    data: Vec<u8>,
    confirmations: u64,
) -> Result<TxOutcome, WalletError> {
    let tx_hash = wallet.send_transaction(to, data).await?;
    let confirmed = wallet.await_confirmation(tx_hash, confirmations).await?;
    Ok(TxOutcome {
        tx_hash: tx_hash.to_string(),
        confirmed,
    })
}

#[derive(Debug, Clone)]
pub struct SettlePolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// Polls the indexer until the reconciled set no longer contains the key.
/// The subgraph is eventually consistent, so a confirmed transaction shows
/// up only after ingestion; a single timed re-query would race it.
pub async fn await_delisted<I: IndexerClient>(
    indexer: &I,
    nft_address: &str,
    token_id: &str,
    policy: &SettlePolicy,
) -> Result<bool, IndexerError> {
    poll_active(indexer, nft_address, token_id, policy, false).await
}

/// Polls until the key appears in the reconciled set, for fresh offers.
pub async fn await_listed<I: IndexerClient>(
    indexer: &I,
    nft_address: &str,
    token_id: &str,
    policy: &SettlePolicy,
) -> Result<bool, IndexerError> {
    poll_active(indexer, nft_address, token_id, policy, true).await
}

async fn poll_active<I: IndexerClient>(
    indexer: &I,
    nft_address: &str,
    token_id: &str,
    policy: &SettlePolicy,
    want_present: bool,
) -> Result<bool, IndexerError> {
    let key = listing_key(nft_address, token_id);
    for attempt in 0..policy.attempts.max(1) {
        if attempt > 0 && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
        let events = indexer.market_events().await?;
        let active = active_listings(&events.listed, &events.bought, &events.canceled);
        let present = active.iter().any(|listing| listing.key() == key);
        if present == want_present {
            return Ok(true);
        }
    }
    tracing::warn!(nft_address, token_id, "indexer did not settle within poll budget");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{
        await_delisted, evaluate_purchase, IneligibleReason, PurchaseState, SettlePolicy,
    };
    use crate::chain::{ChainError, ChainReader, Listing};
    use crate::core::events::{BoughtEvent, ListingEvent, MarketEvents};
    use crate::indexer::{IndexerClient, IndexerError};
    use alloy_primitives::{Address, U256};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FakeBalances {
        balance: U256,
        allowance: U256,
    }

    impl ChainReader for FakeBalances {
        async fn contract_name(&self, _nft_address: &str) -> Result<String, ChainError> {
            Ok(String::new())
        }

        async fn token_uri(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<String, ChainError> {
            Ok(String::new())
        }

        async fn owner_of(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<String, ChainError> {
            Ok(String::new())
        }

        async fn get_listing(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<Option<Listing>, ChainError> {
            Ok(None)
        }

        async fn stablecoin_balance(&self, _owner: &str) -> Result<U256, ChainError> {
            Ok(self.balance)
        }

        async fn marketplace_allowance(&self, _owner: &str) -> Result<U256, ChainError> {
            Ok(self.allowance)
        }
    }

    fn buyer() -> Address {
        "0x00000000000000000000000000000000000000b1".parse().expect("address")
    }

    const SELLER: &str = "0x00000000000000000000000000000000000000a1";

    #[tokio::test]
    async fn no_wallet_means_disconnected() {
        let chain = FakeBalances {
            balance: U256::ZERO,
            allowance: U256::ZERO,
        };
        let state = evaluate_purchase(&chain, U256::from(100u64), SELLER, None)
            .await
            .expect("state");
        assert_eq!(
            state,
            PurchaseState::NotEligible(IneligibleReason::Disconnected)
        );
    }

    #[tokio::test]
    async fn insufficient_balance_wins_over_everything() {
        let chain = FakeBalances {
            balance: U256::from(50u64),
            allowance: U256::from(1000u64),
        };
        let state = evaluate_purchase(&chain, U256::from(100u64), SELLER, Some(buyer()))
            .await
            .expect("state");
        assert_eq!(
            state,
            PurchaseState::NotEligible(IneligibleReason::InsufficientFunds)
        );
    }

    #[tokio::test]
    async fn seller_cannot_buy_own_listing() {
        let chain = FakeBalances {
            balance: U256::from(1000u64),
            allowance: U256::from(1000u64),
        };
        let seller_address: Address = SELLER.parse().expect("address");
        let state = evaluate_purchase(&chain, U256::from(100u64), SELLER, Some(seller_address))
            .await
            .expect("state");
        assert_eq!(state, PurchaseState::NotEligible(IneligibleReason::Seller));
    }

    #[tokio::test]
    async fn allowance_gates_ready_to_buy() {
        let chain = FakeBalances {
            balance: U256::from(1000u64),
            allowance: U256::from(10u64),
        };
        let state = evaluate_purchase(&chain, U256::from(100u64), SELLER, Some(buyer()))
            .await
            .expect("state");
        assert_eq!(state, PurchaseState::NeedsApproval);

        let chain = FakeBalances {
            balance: U256::from(1000u64),
            allowance: U256::from(100u64),
        };
        let state = evaluate_purchase(&chain, U256::from(100u64), SELLER, Some(buyer()))
            .await
            .expect("state");
        assert_eq!(state, PurchaseState::ReadyToBuy);
    }

    struct SettlingIndexer {
        calls: AtomicU32,
        settled_after: u32,
    }

    impl IndexerClient for SettlingIndexer {
        async fn market_events(&self) -> Result<MarketEvents, IndexerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let mut events = MarketEvents {
                listed: vec![ListingEvent {
                    id: "1".to_string(),
                    nft_address: "0xAA".to_string(),
                    token_id: "7".to_string(),
                    seller: "0xS".to_string(),
                    price: "1".to_string(),
                }],
                bought: Vec::new(),
                canceled: Vec::new(),
            };
            if call >= self.settled_after {
                events.bought.push(BoughtEvent {
                    id: "b1".to_string(),
                    nft_address: "0xaa".to_string(),
                    token_id: "7".to_string(),
                    buyer: "0xB".to_string(),
                });
            }
            Ok(events)
        }

        async fn seller_events(&self, _seller: &str) -> Result<MarketEvents, IndexerError> {
            self.market_events().await
        }
    }

    #[tokio::test]
    async fn await_delisted_polls_until_the_buy_is_ingested() {
        let indexer = SettlingIndexer {
            calls: AtomicU32::new(0),
            settled_after: 2,
        };
        let policy = SettlePolicy {
            attempts: 5,
            delay: Duration::ZERO,
        };

        let settled = await_delisted(&indexer, "0xAA", "7", &policy)
            .await
            .expect("poll");

        assert!(settled);
        assert_eq!(indexer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn await_delisted_reports_unsettled_after_budget() {
        let indexer = SettlingIndexer {
            calls: AtomicU32::new(0),
            settled_after: 100,
        };
        let policy = SettlePolicy {
            attempts: 3,
            delay: Duration::ZERO,
        };

        let settled = await_delisted(&indexer, "0xAA", "7", &policy)
            .await
            .expect("poll");

        assert!(!settled);
    }
}
