//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub(crate) fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Revert payloads usually arrive as a hex string; anything else is kept as JSON text.
    pub(crate) fn data_text(&self) -> Option<String> {
        self.data.as_ref().map(|data| match data {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// Decode a `0x`-prefixed hex payload (`eth_call`, `eth_getCode`).
pub(crate) fn decode_hex_data(raw: &str) -> Option<Vec<u8>> {
    let digits = raw.strip_prefix("0x")?;
    alloy_primitives::hex::decode(digits).ok()
}

/// Decode a hex quantity such as `0xaa36a7`.
pub(crate) fn decode_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
