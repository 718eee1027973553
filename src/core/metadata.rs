#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::core::uri::rewrite_url;

pub const UNNAMED_NFT: &str = "Unnamed NFT";
pub const FAILED_TO_LOAD: &str = "Failed to Load";
pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: AttributeValue,
}

/// Displayable token metadata. Always fully populated: `name` and
/// `description` are non-empty, `attributes` may be empty but never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<NftAttribute>,
}

/// Substituted whenever metadata retrieval or decoding fails.
pub fn fallback() -> NftMetadata {
    NftMetadata {
        name: FAILED_TO_LOAD.to_string(),
        description: "Could not fetch metadata".to_string(),
        image: String::new(),
        external_url: None,
        attributes: Vec::new(),
    }
}

/// Used when the token has no URI at all, so there was nothing to fetch.
pub fn placeholder() -> NftMetadata {
    NftMetadata {
        name: UNNAMED_NFT.to_string(),
        description: NO_DESCRIPTION.to_string(),
        image: String::new(),
        external_url: None,
        attributes: Vec::new(),
    }
}

/// Projects raw metadata JSON into the fixed shape, tolerating the common
/// alternate field names (`title` for `name`, `traits` for `attributes`) and
/// rewriting the image locator through the gateway rules.
pub fn normalize(raw: &serde_json::Value, ipfs_gateway: &str) -> NftMetadata {
    let name = non_empty_string(raw.get("name"))
        .or_else(|| non_empty_string(raw.get("title")))
        .unwrap_or_else(|| UNNAMED_NFT.to_string());
    let description = non_empty_string(raw.get("description"))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let image = non_empty_string(raw.get("image"))
        .map(|image| rewrite_url(&image, ipfs_gateway))
        .unwrap_or_default();
    let external_url = non_empty_string(raw.get("external_url"));
    let attributes = raw
        .get("attributes")
        .or_else(|| raw.get("traits"))
        .and_then(serde_json::Value::as_array)
        .map(|entries| entries.iter().filter_map(attribute).collect())
        .unwrap_or_default();

    NftMetadata {
        name,
        description,
        image,
        external_url,
        attributes,
    }
}

fn attribute(entry: &serde_json::Value) -> Option<NftAttribute> {
    let trait_type = non_empty_string(entry.get("trait_type"))?;
    let value = match entry.get("value")? {
        serde_json::Value::String(text) => AttributeValue::Text(text.clone()),
        serde_json::Value::Number(number) => AttributeValue::Number(number.as_f64()?),
        _ => return None,
    };
    Some(NftAttribute { trait_type, value })
}

fn non_empty_string(value: Option<&serde_json::Value>) -> Option<String> {
    value
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
