#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize};

/// Join/dedup key shared by all three event feeds. Addresses are compared
/// case-insensitively, token ids as exact decimal strings.
pub fn listing_key(nft_address: &str, token_id: &str) -> String {
    format!("{}-{}", nft_address.to_lowercase(), token_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEvent {
    pub id: String,
    #[serde(rename = "nftAddress")]
    pub nft_address: String,
    #[serde(rename = "tokenId", deserialize_with = "decimal_string")]
    pub token_id: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default, deserialize_with = "decimal_string_opt")]
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoughtEvent {
    pub id: String,
    #[serde(rename = "nftAddress")]
    pub nft_address: String,
    #[serde(rename = "tokenId", deserialize_with = "decimal_string")]
    pub token_id: String,
    #[serde(default)]
    pub buyer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanceledEvent {
    pub id: String,
    #[serde(rename = "nftAddress")]
    pub nft_address: String,
    #[serde(rename = "tokenId", deserialize_with = "decimal_string")]
    pub token_id: String,
    #[serde(default)]
    pub seller: String,
}

/// One snapshot of the three append-only indexer feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarketEvents {
    #[serde(default, rename = "itemListeds")]
    pub listed: Vec<ListingEvent>,
    #[serde(default, rename = "itemBoughts")]
    pub bought: Vec<BoughtEvent>,
    #[serde(default, rename = "itemCanceleds")]
    pub canceled: Vec<CanceledEvent>,
}

impl ListingEvent {
    pub fn key(&self) -> String {
        listing_key(&self.nft_address, &self.token_id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireScalar {
    Text(String),
    Number(serde_json::Number),
}

impl WireScalar {
    fn into_string(self) -> String {
        match self {
            WireScalar::Text(s) => s,
            WireScalar::Number(n) => n.to_string(),
        }
    }
}

/// Indexer deployments disagree on whether numeric columns arrive as JSON
/// strings or numbers; both normalize to the exact decimal string. Any other
/// shape is a decode error.
fn decimal_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(WireScalar::deserialize(deserializer)?.into_string())
}

fn decimal_string_opt<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireScalar>::deserialize(deserializer)?;
    Ok(value.map(WireScalar::into_string).unwrap_or_default())
}
