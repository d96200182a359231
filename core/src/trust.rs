//! Trust query service.
//!
//! Answers "is this address trusted by the registry?" with a [`TrustOutcome`].
//! The service never returns an error: anything that prevents a positive
//! answer becomes [`TrustOutcome::Unavailable`] carrying the reason, so
//! callers can tell "confirmed untrusted" apart from "could not verify".

use thiserror::Error;
use trustgate_chain::{ChainError, DynSolValue, ReadOnlyCaller, RpcClient};
use trustgate_config::TrustGateConfig;
use trustgate_types::{AddressError, ChainAddress, RegistrySettings};

use crate::descriptor::{DescriptorError, load_descriptor};
use crate::setup::SetupError;

#[derive(Debug, Error)]
pub enum TrustError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("invalid target address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("registry returned a non-boolean result: {0}")]
    MalformedResult(String),
}

#[derive(Debug)]
pub enum TrustOutcome {
    Trusted,
    Untrusted,
    Unavailable(TrustError),
}

impl TrustOutcome {
    /// Fail-closed projection: only a positive registry answer counts.
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted)
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Runs trust queries against the registry described on disk.
#[derive(Debug)]
pub struct TrustService<C> {
    caller: C,
    registry: RegistrySettings,
}

impl<C: ReadOnlyCaller> TrustService<C> {
    pub fn new(caller: C, registry: RegistrySettings) -> Self {
        Self { caller, registry }
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    pub fn registry(&self) -> &RegistrySettings {
        &self.registry
    }

    pub async fn query(&self, address: &str) -> TrustOutcome {
        match self.try_query(address).await {
            Ok(true) => {
                tracing::debug!(address, "Registry reports address as trusted");
                TrustOutcome::Trusted
            }
            Ok(false) => {
                tracing::debug!(address, "Registry reports address as untrusted");
                TrustOutcome::Untrusted
            }
            Err(err) => {
                tracing::warn!(address, error = %err, "Trust verification unavailable; failing closed");
                TrustOutcome::Unavailable(err)
            }
        }
    }

    pub async fn is_trusted(&self, address: &str) -> bool {
        self.query(address).await.is_trusted()
    }

    async fn try_query(&self, address: &str) -> Result<bool, TrustError> {
        let descriptor = load_descriptor(self.registry.descriptor_path())?;
        let target = ChainAddress::parse(address)?;

        let values = self
            .caller
            .call_read_only(
                &descriptor.address,
                &descriptor.abi,
                self.registry.method(),
                &[DynSolValue::Address(target.into_inner())],
            )
            .await?;
        coerce_bool(&values)
    }
}

impl TrustService<RpcClient> {
    /// Service bound to the configured endpoint and registry. The target
    /// address is not needed here; callers pass it per query.
    pub fn from_config(config: &TrustGateConfig) -> Result<Self, SetupError> {
        let client = RpcClient::new(&config.chain_settings()?)?;
        Ok(Self::new(client, config.registry_settings()))
    }
}

fn coerce_bool(values: &[DynSolValue]) -> Result<bool, TrustError> {
    match values.first() {
        Some(DynSolValue::Bool(flag)) => Ok(*flag),
        Some(DynSolValue::Uint(number, _)) => Ok(!number.is_zero()),
        Some(DynSolValue::Int(number, _)) => Ok(!number.is_zero()),
        Some(other) => Err(TrustError::MalformedResult(format!("{other:?}"))),
        None => Err(TrustError::MalformedResult("no return value".to_string())),
    }
}
