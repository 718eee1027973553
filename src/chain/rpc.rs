#![forbid(unsafe_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    // Null and absent results both land on Value::Null; callers interpret
    // null per method (a pending receipt, for instance).
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorBody {
    pub code: i64,
    pub message: String,
}

#[derive(Debug)]
pub(crate) enum RpcFailure {
    Transport(reqwest::Error),
    Rpc(JsonRpcErrorBody),
}

impl From<reqwest::Error> for RpcFailure {
    fn from(err: reqwest::Error) -> Self {
        RpcFailure::Transport(err)
    }
}

/// One JSON-RPC round trip against the node.
pub(crate) async fn call(
    http: &reqwest::Client,
    endpoint: &Url,
    method: &str,
    params: serde_json::Value,
    timeout: Duration,
) -> Result<serde_json::Value, RpcFailure> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method,
        params,
    };
    let response: JsonRpcResponse = http
        .post(endpoint.clone())
        .timeout(timeout)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(error) = response.error {
        return Err(RpcFailure::Rpc(error));
    }
    Ok(response.result)
}

pub(crate) fn decode_hex_bytes(value: &serde_json::Value) -> Option<Vec<u8>> {
    let text = value.as_str()?;
    alloy_primitives::hex::decode(text).ok()
}

pub(crate) fn decode_hex_u64(value: &serde_json::Value) -> Option<u64> {
    let text = value.as_str()?.strip_prefix("0x")?;
    u64::from_str_radix(text, 16).ok()
}
