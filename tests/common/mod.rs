//! Shared fixtures: a mock JSON-RPC node and an on-disk registry descriptor.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use trustgate_config::TrustGateConfig;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REGISTRY: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const AGENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const OTHER_REGISTRY: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

pub fn registry_abi() -> Value {
    json!([
        { "type": "constructor", "inputs": [], "stateMutability": "nonpayable" },
        {
            "type": "event",
            "name": "AgentRegistered",
            "anonymous": false,
            "inputs": [{ "indexed": true, "name": "agent", "type": "address" }]
        },
        {
            "type": "function",
            "name": "isTrusted",
            "inputs": [{ "internalType": "address", "name": "agent", "type": "address" }],
            "outputs": [{ "internalType": "bool", "name": "", "type": "bool" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "registerAgent",
            "inputs": [{ "internalType": "address", "name": "agent", "type": "address" }],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ])
}

/// Write a descriptor for `address` into `dir` and return its path.
pub fn write_descriptor_for(dir: &Path, address: &str) -> PathBuf {
    let path = dir.join("contract_info.json");
    let body = json!({ "address": address, "abi": registry_abi() });
    std::fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    path
}

pub fn write_descriptor(dir: &Path) -> PathBuf {
    write_descriptor_for(dir, REGISTRY)
}

/// ABI-encoded `bool` return data.
pub fn encoded_bool(value: bool) -> String {
    format!("0x{:064x}", u8::from(value))
}

pub async fn start_node() -> MockServer {
    MockServer::start().await
}

/// Answer every `eth_call` with the given boolean, expecting `calls` requests.
pub async fn mount_trust_answer(server: &MockServer, trusted: bool, calls: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": encoded_bool(trusted)
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Fail the test if the node receives any request at all.
pub async fn forbid_requests(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Config as TOML text, the way an operator would write it.
pub fn config_toml(rpc_url: Option<&str>, target: Option<&str>, descriptor: &Path) -> String {
    let mut toml = String::new();
    if let Some(url) = rpc_url {
        toml.push_str(&format!("[chain]\nrpc_url = \"{url}\"\nrequest_timeout_secs = 5\n\n"));
    }
    toml.push_str(&format!(
        "[registry]\ndescriptor_path = '{}'\n\n",
        descriptor.display()
    ));
    if let Some(target) = target {
        toml.push_str(&format!("[gate]\ntarget_address = \"{target}\"\n"));
    }
    toml
}

pub fn config(rpc_url: Option<&str>, target: Option<&str>, descriptor: &Path) -> TrustGateConfig {
    TrustGateConfig::parse(&config_toml(rpc_url, target, descriptor)).unwrap()
}
