#![forbid(unsafe_code)]

use std::time::Duration;

use crate::chain::ChainReader;
use crate::core::events::ListingEvent;
use crate::core::metadata;
use crate::core::record::{EnrichedNft, UNKNOWN_CONTRACT};
use crate::pipeline::fetcher::MetadataFetcher;

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub chain_label: String,
    pub item_delay: Duration,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            chain_label: String::new(),
            item_delay: Duration::from_millis(100),
            chunk_size: 5,
            chunk_delay: Duration::from_millis(500),
        }
    }
}

/// Joins one active listing with its on-chain reads and resolved metadata.
/// Every step degrades independently; this function cannot fail.
pub async fn enrich_one<C: ChainReader>(
    chain: &C,
    fetcher: &MetadataFetcher,
    listing: &ListingEvent,
    chain_label: &str,
) -> EnrichedNft {
    let (name_result, uri_result) = tokio::join!(
        chain.contract_name(&listing.nft_address),
        chain.token_uri(&listing.nft_address, &listing.token_id),
    );

    let contract_name = match name_result {
        Ok(name) if !name.is_empty() => name,
        Ok(_) => UNKNOWN_CONTRACT.to_string(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                nft_address = %listing.nft_address,
                "contract name read failed"
            );
            UNKNOWN_CONTRACT.to_string()
        }
    };

    let metadata = match uri_result {
        Ok(uri) if !uri.is_empty() => fetcher.fetch(&uri).await,
        Ok(_) => metadata::placeholder(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                nft_address = %listing.nft_address,
                token_id = %listing.token_id,
                "token uri read failed"
            );
            metadata::placeholder()
        }
    };

    EnrichedNft::assemble(listing, contract_name, metadata, chain_label)
}

/// Enriches a reconciled batch in order, one record per input. Items run
/// serialized with a throttle delay, and larger batches pause between chunks,
/// to stay under third-party rate limits.
pub async fn enrich_all<C: ChainReader>(
    chain: &C,
    fetcher: &MetadataFetcher,
    listings: &[ListingEvent],
    options: &EnrichOptions,
) -> Vec<EnrichedNft> {
    let chunk_size = options.chunk_size.max(1);
    let mut records = Vec::with_capacity(listings.len());

    for (chunk_index, chunk) in listings.chunks(chunk_size).enumerate() {
        if chunk_index > 0 && !options.chunk_delay.is_zero() {
            tokio::time::sleep(options.chunk_delay).await;
        }
        for (item_index, listing) in chunk.iter().enumerate() {
            if (chunk_index > 0 || item_index > 0) && !options.item_delay.is_zero() {
                tokio::time::sleep(options.item_delay).await;
            }
            records.push(enrich_one(chain, fetcher, listing, &options.chain_label).await);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::{enrich_all, enrich_one, EnrichOptions};
    use crate::chain::{ChainError, ChainReader, Listing};
    use crate::core::events::{CanceledEvent, ListingEvent};
    use crate::core::reconcile::active_listings;
    use crate::core::record::UNKNOWN_CONTRACT;
    use crate::pipeline::fetcher::MetadataFetcher;
    use alloy_primitives::U256;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeChain {
        name: Result<String, ()>,
        token_uri: Result<String, ()>,
    }

    impl ChainReader for FakeChain {
        async fn contract_name(&self, _nft_address: &str) -> Result<String, ChainError> {
            self.name
                .clone()
                .map_err(|_| ChainError::Decode("name failed".to_string()))
        }

        async fn token_uri(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<String, ChainError> {
            self.token_uri
                .clone()
                .map_err(|_| ChainError::Decode("uri failed".to_string()))
        }

        async fn owner_of(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<String, ChainError> {
            Ok("0x0000000000000000000000000000000000000001".to_string())
        }

        async fn get_listing(
            &self,
            _nft_address: &str,
            _token_id: &str,
        ) -> Result<Option<Listing>, ChainError> {
            Ok(None)
        }

        async fn stablecoin_balance(&self, _owner: &str) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn marketplace_allowance(&self, _owner: &str) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }
    }

    fn listing(id: &str, token_id: &str) -> ListingEvent {
        ListingEvent {
            id: id.to_string(),
            nft_address: "0xAA".to_string(),
            token_id: token_id.to_string(),
            seller: "0xS".to_string(),
            price: "1000000".to_string(),
        }
    }

    fn fetcher() -> MetadataFetcher {
        MetadataFetcher::new(
            vec!["https://gateway.pinata.cloud".to_string()],
            Duration::from_millis(50),
        )
    }

    fn fast_options() -> EnrichOptions {
        EnrichOptions {
            chain_label: "Fuji".to_string(),
            item_delay: Duration::ZERO,
            chunk_size: 2,
            chunk_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn inline_metadata_flows_end_to_end() {
        // {"name":"Cat","image":"ipfs://Qm1"}
        let chain = FakeChain {
            name: Ok("Cats".to_string()),
            token_uri: Ok(
                "data:application/json;base64,eyJuYW1lIjoiQ2F0IiwiaW1hZ2UiOiJpcGZzOi8vUW0xIn0="
                    .to_string(),
            ),
        };

        let record = enrich_one(&chain, &fetcher(), &listing("1", "1"), "Fuji").await;

        assert_eq!(record.name, "Cat");
        assert_eq!(record.image, "https://gateway.pinata.cloud/ipfs/Qm1");
        assert_eq!(record.price, "1000000");
        assert_eq!(record.contract_name, "Cats");
        assert_eq!(record.chain, "Fuji");
    }

    #[tokio::test]
    async fn failed_contract_read_still_yields_a_record() {
        let chain = FakeChain {
            name: Err(()),
            token_uri: Ok(String::new()),
        };

        let record = enrich_one(&chain, &fetcher(), &listing("1", "7"), "Fuji").await;

        assert_eq!(record.contract_name, UNKNOWN_CONTRACT);
        assert_eq!(record.name, "NFT #7");
        assert!(!record.description.is_empty());
    }

    #[tokio::test]
    async fn failed_uri_read_skips_metadata_fetch() {
        let chain = FakeChain {
            name: Ok("Cats".to_string()),
            token_uri: Err(()),
        };

        let record = enrich_one(&chain, &fetcher(), &listing("1", "3"), "Fuji").await;

        assert_eq!(record.name, "Cats #3");
        assert_eq!(record.image, "");
    }

    struct RecordingChain {
        token_ids_read: Mutex<Vec<String>>,
    }

    impl ChainReader for RecordingChain {
        async fn contract_name(&self, _nft_address: &str) -> Result<String, ChainError> {
            Ok("Cats".to_string())
        }

        async fn token_uri(
            &self,
            _nft_address: &str,
            token_id: &str,
        ) -> Result<String, ChainError> {
            self.token_ids_read
                .lock()
                .expect("lock")
                .push(token_id.to_string());
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
            Ok(U256::ZERO)
        }

        async fn marketplace_allowance(&self, _owner: &str) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }
    }

    #[tokio::test]
    async fn canceled_listings_trigger_no_chain_reads() {
        let listed = vec![listing("a", "1"), listing("b", "2")];
        let canceled = vec![CanceledEvent {
            id: "c1".to_string(),
            nft_address: "0xaa".to_string(),
            token_id: "2".to_string(),
            seller: "0xS".to_string(),
        }];
        let chain = RecordingChain {
            token_ids_read: Mutex::new(Vec::new()),
        };

        let active = active_listings(&listed, &[], &canceled);
        let records = enrich_all(&chain, &fetcher(), &active, &fast_options()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token_id, "1");
        assert_eq!(*chain.token_ids_read.lock().expect("lock"), vec!["1"]);
    }

    #[tokio::test]
    async fn batch_returns_one_record_per_listing_in_order() {
        let chain = FakeChain {
            name: Ok("Cats".to_string()),
            token_uri: Ok(String::new()),
        };
        let listings = vec![
            listing("a", "1"),
            listing("b", "2"),
            listing("c", "3"),
            listing("d", "4"),
            listing("e", "5"),
        ];

        let records = enrich_all(&chain, &fetcher(), &listings, &fast_options()).await;

        assert_eq!(records.len(), 5);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }
}
