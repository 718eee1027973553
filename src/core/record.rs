#![forbid(unsafe_code)]

use serde::Serialize;

use crate::core::events::ListingEvent;
use crate::core::metadata::{NftAttribute, NftMetadata, FAILED_TO_LOAD, UNNAMED_NFT};

pub const UNKNOWN_CONTRACT: &str = "Unknown Contract";

/// The terminal artifact of one enrichment pass: listing fields joined with
/// resolved metadata and on-chain reads. Built fresh every query cycle and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedNft {
    pub id: String,
    pub nft_address: String,
    pub token_id: String,
    pub seller: String,
    pub price: String,
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub attributes: Vec<NftAttribute>,
    pub contract_name: String,
    pub chain: String,
}

impl EnrichedNft {
    pub fn assemble(
        listing: &ListingEvent,
        contract_name: String,
        metadata: NftMetadata,
        chain: &str,
    ) -> Self {
        let name = display_name(&metadata.name, &contract_name, &listing.token_id);
        Self {
            id: listing.id.clone(),
            nft_address: listing.nft_address.clone(),
            token_id: listing.token_id.clone(),
            seller: listing.seller.clone(),
            price: listing.price.clone(),
            name,
            description: metadata.description,
            image: metadata.image,
            external_url: metadata.external_url,
            attributes: metadata.attributes,
            contract_name,
            chain: chain.to_string(),
        }
    }
}

/// Metadata's own name wins unless it is one of the sentinel fallback
/// strings; then `<contract> #<token>` and finally `NFT #<token>`.
pub fn display_name(metadata_name: &str, contract_name: &str, token_id: &str) -> String {
    if !metadata_name.is_empty()
        && metadata_name != UNNAMED_NFT
        && metadata_name != FAILED_TO_LOAD
    {
        return metadata_name.to_string();
    }
    if !contract_name.is_empty() && contract_name != UNKNOWN_CONTRACT {
        return format!("{contract_name} #{token_id}");
    }
    format!("NFT #{token_id}")
}
