//! JSON-RPC client for read-only EVM contract calls.
//!
//! # Architecture
//!
//! - [`RpcClient`] - one HTTP connection pool bound to one JSON-RPC endpoint
//! - [`ReadOnlyCaller`] - the seam the trust service depends on; `RpcClient`
//!   is the production implementation
//! - calldata and return data go through `alloy-dyn-abi`, driven by the
//!   function description from the contract's JSON ABI
//!
//! # Error Handling
//!
//! Every call makes exactly one attempt. Failures are classified as:
//!
//! | Error | Meaning |
//! |-------|---------|
//! | `Connection` | endpoint unreachable, timed out, non-success HTTP, bad URL |
//! | `Call` | node rejected the call, or the call is invalid for the interface |
//! | `InvalidResponse` | reply is not a JSON-RPC envelope with a usable result |
//! | `Decode` | return data does not match the declared outputs |
//!
//! Endpoint URLs often embed provider API keys, so error messages only ever
//! show the scheme and host.

mod rpc;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_dyn_abi::{FunctionExt, JsonAbiExt};
use alloy_primitives::hex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use url::{Host, Url};

pub use alloy_dyn_abi::DynSolValue;
pub use trustgate_types;
use trustgate_types::{ChainAddress, ChainSettings, ContractInterface, is_read_only};

use rpc::{JsonRpcRequest, JsonRpcResponse, decode_hex_data, decode_quantity};

const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("cannot reach RPC endpoint {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },
    #[error(transparent)]
    Call(#[from] CallError),
    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
    #[error("cannot decode return data: {0}")]
    Decode(#[from] alloy_dyn_abi::Error),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("method {method} with {arity} argument(s) is not in the contract interface")]
    UnknownMethod { method: String, arity: usize },
    #[error("method {signature} is not read-only")]
    NotReadOnly { signature: String },
    #[error("invalid arguments for {signature}: {source}")]
    Arguments {
        signature: String,
        source: alloy_dyn_abi::Error,
    },
    #[error("node rejected the call ({code}): {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },
}

/// A read-only contract invocation against some chain.
pub trait ReadOnlyCaller {
    /// Call `method` on `contract`, encoding `args` and decoding the result
    /// with the function description found in `interface`.
    fn call_read_only(
        &self,
        contract: &ChainAddress,
        interface: &ContractInterface,
        method: &str,
        args: &[DynSolValue],
    ) -> impl Future<Output = Result<Vec<DynSolValue>, ChainError>> + Send;
}

/// JSON-RPC client bound to a single endpoint.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    label: String,
    next_id: AtomicU64,
}

/// `scheme://host[:port]`, safe to log.
#[must_use]
pub fn endpoint_label(url: &Url) -> String {
    let host = url.host_str().unwrap_or("<no host>");
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn client_builder(settings: &ChainSettings) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .user_agent(concat!("trustgate/", env!("CARGO_PKG_VERSION")))
}

impl RpcClient {
    pub fn new(settings: &ChainSettings) -> Result<Self, ChainError> {
        let endpoint = settings.rpc_url().clone();
        let label = endpoint_label(&endpoint);
        let misconfigured = |reason: String| ChainError::Connection {
            endpoint: label.clone(),
            reason,
        };

        match endpoint.scheme() {
            "https" => {}
            "http" if settings.allow_insecure_http() || is_loopback(&endpoint) => {}
            "http" => {
                return Err(misconfigured(
                    "plain http is only allowed for loopback hosts (set chain.allow_insecure_http to override)"
                        .to_string(),
                ));
            }
            other => return Err(misconfigured(format!("unsupported URL scheme {other:?}"))),
        }
        if endpoint.host().is_none() {
            return Err(misconfigured("URL has no host".to_string()));
        }

        let http = client_builder(settings)
            .build()
            .map_err(|e| misconfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            label,
            next_id: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn endpoint_label(&self) -> &str {
        &self.label
    }

    fn connection_error(&self, reason: impl Into<String>) -> ChainError {
        ChainError::Connection {
            endpoint: self.label.clone(),
            reason: reason.into(),
        }
    }

    /// Send one JSON-RPC request and deserialize its `result`.
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params);
        tracing::debug!(endpoint = %self.label, method, id, "JSON-RPC request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.without_url().to_string()
                };
                self.connection_error(reason)
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.connection_error(e.without_url().to_string()))?;

        let parsed = serde_json::from_slice::<JsonRpcResponse>(&bytes);
        if !status.is_success() {
            // Some providers pair a JSON-RPC error object with a 4xx/5xx status.
            if let Ok(JsonRpcResponse {
                error: Some(error), ..
            }) = parsed
            {
                return Err(rpc_error(error).into());
            }
            return Err(self.connection_error(format!(
                "HTTP {status}: {}",
                capped_text(&bytes)
            )));
        }

        let envelope = parsed.map_err(|e| ChainError::InvalidResponse(e.to_string()))?;
        if let Some(error) = envelope.error {
            tracing::debug!(code = error.code, message = %error.message, "JSON-RPC error");
            return Err(rpc_error(error).into());
        }
        let result = envelope.result.ok_or_else(|| {
            ChainError::InvalidResponse("response has neither result nor error".to_string())
        })?;
        serde_json::from_value(result).map_err(|e| ChainError::InvalidResponse(e.to_string()))
    }

    /// `eth_call` at the latest block; returns the raw return data.
    pub async fn eth_call(&self, to: &ChainAddress, calldata: &[u8]) -> Result<Vec<u8>, ChainError> {
        let params = json!([
            { "to": to.to_checksum(), "data": format!("0x{}", hex::encode(calldata)) },
            "latest"
        ]);
        let raw: String = self.request("eth_call", params).await?;
        decode_hex_data(&raw)
            .ok_or_else(|| ChainError::InvalidResponse(format!("eth_call result is not hex: {raw:?}")))
    }

    /// `eth_chainId`, used as a liveness probe.
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        decode_quantity(&raw)
            .ok_or_else(|| ChainError::InvalidResponse(format!("chain id is not a quantity: {raw:?}")))
    }

    /// Deployed bytecode at `address`; empty when nothing is deployed there.
    pub async fn code_at(&self, address: &ChainAddress) -> Result<Vec<u8>, ChainError> {
        let raw: String = self
            .request("eth_getCode", json!([address.to_checksum(), "latest"]))
            .await?;
        decode_hex_data(&raw)
            .ok_or_else(|| ChainError::InvalidResponse(format!("code is not hex: {raw:?}")))
    }
}

impl ReadOnlyCaller for RpcClient {
    async fn call_read_only(
        &self,
        contract: &ChainAddress,
        interface: &ContractInterface,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ChainError> {
        let function = interface
            .function(method, args.len())
            .ok_or_else(|| CallError::UnknownMethod {
                method: method.to_string(),
                arity: args.len(),
            })?;
        let signature = function.signature();
        if !is_read_only(function) {
            return Err(CallError::NotReadOnly { signature }.into());
        }

        let calldata = function.abi_encode_input(args).map_err(|source| CallError::Arguments {
            signature: signature.clone(),
            source,
        })?;

        tracing::debug!(contract = %contract, %signature, "Read-only contract call");
        let data = self.eth_call(contract, &calldata).await?;
        Ok(function.abi_decode_output(&data)?)
    }
}

fn rpc_error(error: rpc::JsonRpcError) -> CallError {
    CallError::Rpc {
        code: error.code,
        data: error.data_text(),
        message: error.message,
    }
}

fn capped_text(bytes: &[u8]) -> String {
    if bytes.len() > MAX_ERROR_BODY_BYTES {
        let text = String::from_utf8_lossy(&bytes[..MAX_ERROR_BODY_BYTES]);
        format!("{text}...(truncated)")
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
