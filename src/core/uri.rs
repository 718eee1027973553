#![forbid(unsafe_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

pub const ARWEAVE_GATEWAY: &str = "https://arweave.net";

const INLINE_JSON_PREFIX: &str = "data:application/json;base64,";
const IPFS_SCHEME: &str = "ipfs://";
const ARWEAVE_SCHEME: &str = "ar://";

/// A token URI after resolution: either metadata embedded in the URI itself,
/// or an HTTP URL to fetch it from.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Inline(serde_json::Value),
    Http(String),
}

#[derive(Debug, Error)]
pub enum MetadataDecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid inline metadata json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolves a token-metadata locator against one IPFS gateway.
///
/// Unrecognized schemes pass through untouched; the fetch against them will
/// most likely fail and the caller falls back. Decode failures on inline
/// payloads are not retryable and must fall back immediately.
pub fn resolve(uri: &str, ipfs_gateway: &str) -> Result<Resolved, MetadataDecodeError> {
    if let Some(encoded) = uri.strip_prefix(INLINE_JSON_PREFIX) {
        let raw = BASE64.decode(encoded)?;
        let metadata = serde_json::from_slice(&raw)?;
        return Ok(Resolved::Inline(metadata));
    }
    Ok(Resolved::Http(rewrite_url(uri, ipfs_gateway)))
}

/// Rewrites `ipfs://` and `ar://` locators to gateway URLs; HTTP and unknown
/// schemes pass through. Also applied to the `image` field inside fetched
/// metadata.
pub fn rewrite_url(uri: &str, ipfs_gateway: &str) -> String {
    if let Some(hash) = uri.strip_prefix(IPFS_SCHEME) {
        return format!("{}/ipfs/{hash}", ipfs_gateway.trim_end_matches('/'));
    }
    if let Some(hash) = uri.strip_prefix(ARWEAVE_SCHEME) {
        return format!("{ARWEAVE_GATEWAY}/{hash}");
    }
    uri.to_string()
}

#[cfg(test)]
mod tests {
    use super::{resolve, rewrite_url, MetadataDecodeError, Resolved};
    use serde_json::json;

    const GATEWAY: &str = "https://gateway.pinata.cloud";

    #[test]
    fn resolves_ipfs_to_gateway_url() {
        let resolved = resolve("ipfs://Qm123", GATEWAY).expect("resolve");
        assert_eq!(
            resolved,
            Resolved::Http("https://gateway.pinata.cloud/ipfs/Qm123".to_string())
        );
    }

    #[test]
    fn gateway_trailing_slash_is_tolerated() {
        let url = rewrite_url("ipfs://Qm123", "https://ipfs.io/");
        assert_eq!(url, "https://ipfs.io/ipfs/Qm123");
    }

    #[test]
    fn resolves_arweave_to_public_gateway() {
        let url = rewrite_url("ar://abc123", GATEWAY);
        assert_eq!(url, "https://arweave.net/abc123");
    }

    #[test]
    fn http_urls_pass_through_unchanged() {
        let resolved = resolve("https://example.com/1.json", GATEWAY).expect("resolve");
        assert_eq!(
            resolved,
            Resolved::Http("https://example.com/1.json".to_string())
        );
    }

    #[test]
    fn unknown_schemes_pass_through_unchanged() {
        let resolved = resolve("ftp://example.com/1.json", GATEWAY).expect("resolve");
        assert_eq!(
            resolved,
            Resolved::Http("ftp://example.com/1.json".to_string())
        );
    }

    #[test]
    fn decodes_inline_base64_json() {
        // {"name":"T"}
        let resolved =
            resolve("data:application/json;base64,eyJuYW1lIjoiVCJ9", GATEWAY).expect("resolve");
        assert_eq!(resolved, Resolved::Inline(json!({"name": "T"})));
    }

    #[test]
    fn bad_base64_is_a_decode_error() {
        let err = resolve("data:application/json;base64,!!!", GATEWAY).expect_err("decode error");
        assert!(matches!(err, MetadataDecodeError::Base64(_)));
    }

    #[test]
    fn bad_inline_json_is_a_decode_error() {
        // base64 of "not-json"
        let err =
            resolve("data:application/json;base64,bm90LWpzb24=", GATEWAY).expect_err("json error");
        assert!(matches!(err, MetadataDecodeError::Json(_)));
    }
}
