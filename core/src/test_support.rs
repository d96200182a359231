//! Shared fixtures for unit tests in this crate.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use trustgate_chain::{CallError, ChainError, DynSolValue, ReadOnlyCaller};
use trustgate_types::{ChainAddress, ContractInterface, RegistrySettings};

pub const REGISTRY: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const AGENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

pub fn registry_abi() -> serde_json::Value {
    serde_json::json!([
        { "type": "constructor", "inputs": [], "stateMutability": "nonpayable" },
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

/// Write `contract_info.json` into `dir` and return its path.
pub fn write_descriptor(dir: &Path) -> PathBuf {
    let path = dir.join("contract_info.json");
    let body = serde_json::json!({ "address": REGISTRY, "abi": registry_abi() });
    std::fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    path
}

pub fn registry_settings(path: &Path) -> RegistrySettings {
    RegistrySettings::new(path)
}

#[derive(Debug, Clone)]
pub enum FakeReply {
    Values(Vec<DynSolValue>),
    Unreachable,
    Reverted,
}

/// In-memory [`ReadOnlyCaller`] that records each call it receives.
#[derive(Debug)]
pub struct FakeCaller {
    reply: FakeReply,
    calls: AtomicUsize,
    last_args: Mutex<Vec<DynSolValue>>,
}

impl FakeCaller {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(value: bool) -> Self {
        Self::new(FakeReply::Values(vec![DynSolValue::Bool(value)]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_args(&self) -> Vec<DynSolValue> {
        self.last_args.lock().unwrap().clone()
    }
}

impl ReadOnlyCaller for FakeCaller {
    async fn call_read_only(
        &self,
        _contract: &ChainAddress,
        interface: &ContractInterface,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = args.to_vec();

        if interface.function(method, args.len()).is_none() {
            return Err(CallError::UnknownMethod {
                method: method.to_string(),
                arity: args.len(),
            }
            .into());
        }

        match &self.reply {
            FakeReply::Values(values) => Ok(values.clone()),
            FakeReply::Unreachable => Err(ChainError::Connection {
                endpoint: "http://127.0.0.1:1".to_string(),
                reason: "connection refused".to_string(),
            }),
            FakeReply::Reverted => Err(CallError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
                data: None,
            }
            .into()),
        }
    }
}
