//! Registry health probe.
//!
//! Walks the same path a trust query takes, one step at a time, and records
//! how far it got: endpoint liveness, descriptor on disk, bytecode at the
//! descriptor's address, then the configured method in the ABI.

use serde::Serialize;
use trustgate_chain::RpcClient;
use trustgate_types::{RegistrySettings, is_read_only};

use crate::descriptor::load_descriptor;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegistryStatus {
    pub endpoint: String,
    pub chain_id: Option<u64>,
    pub descriptor_path: String,
    pub contract_address: Option<String>,
    pub contract_deployed: Option<bool>,
    pub method: String,
    pub method_present: Option<bool>,
    pub method_read_only: Option<bool>,
    /// First failure encountered; later fields stay unset.
    pub error: Option<String>,
}

impl RegistryStatus {
    /// True when every probe step succeeded and the registry is callable.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.error.is_none()
            && self.chain_id.is_some()
            && self.contract_deployed == Some(true)
            && self.method_present == Some(true)
            && self.method_read_only == Some(true)
    }
}

pub async fn probe_registry(client: &RpcClient, registry: &RegistrySettings) -> RegistryStatus {
    let mut status = RegistryStatus {
        endpoint: client.endpoint_label().to_string(),
        chain_id: None,
        descriptor_path: registry.descriptor_path().display().to_string(),
        contract_address: None,
        contract_deployed: None,
        method: registry.method().to_string(),
        method_present: None,
        method_read_only: None,
        error: None,
    };

    match client.chain_id().await {
        Ok(id) => status.chain_id = Some(id),
        Err(err) => {
            status.error = Some(err.to_string());
            return status;
        }
    }

    let descriptor = match load_descriptor(registry.descriptor_path()) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            status.error = Some(err.to_string());
            return status;
        }
    };
    status.contract_address = Some(descriptor.address.to_checksum());

    match client.code_at(&descriptor.address).await {
        Ok(code) => status.contract_deployed = Some(!code.is_empty()),
        Err(err) => {
            status.error = Some(err.to_string());
            return status;
        }
    }

    // The trust query takes exactly one address argument.
    let function = descriptor.abi.function(registry.method(), 1);
    status.method_present = Some(function.is_some());
    status.method_read_only = function.map(is_read_only);

    tracing::debug!(
        endpoint = %status.endpoint,
        chain_id = ?status.chain_id,
        ready = status.is_ready(),
        "Registry probe finished"
    );
    status
}
