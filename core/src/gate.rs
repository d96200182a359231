//! Verification gate consulted before delegating to a remote agent.
//!
//! The gate is a zero-argument check: the target address comes from
//! configuration, and the result is one of four fixed textual verdicts that a
//! natural-language decision step can match on. Only `TRUSTED` permits
//! delegation.
//!
//! ```text
//! [start] --target missing--> NotConfigured
//! [start] --target present--> TrustService::query
//!     Trusted     --> "TRUSTED"
//!     Untrusted   --> "UNTRUSTED"
//!     Unavailable --> "ERROR: <reason>"
//! ```

use std::fmt;

use trustgate_chain::{ReadOnlyCaller, RpcClient};
use trustgate_config::TrustGateConfig;
use trustgate_types::{GateSettings, MissingSetting};

pub use crate::setup::SetupError;
use crate::trust::{TrustOutcome, TrustService};

pub const TRUSTED: &str = "TRUSTED";
pub const UNTRUSTED: &str = "UNTRUSTED";
pub const ERROR_PREFIX: &str = "ERROR: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Trusted,
    Untrusted,
    Error(String),
    NotConfigured(MissingSetting),
}

impl GateVerdict {
    #[must_use]
    pub fn from_outcome(outcome: TrustOutcome) -> Self {
        match outcome {
            TrustOutcome::Trusted => Self::Trusted,
            TrustOutcome::Untrusted => Self::Untrusted,
            TrustOutcome::Unavailable(err) => Self::Error(err.to_string()),
        }
    }

    #[must_use]
    pub fn permits_delegation(&self) -> bool {
        matches!(self, Self::Trusted)
    }

    /// Stable machine-readable classification.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::Untrusted => "untrusted",
            Self::Error(_) => "error",
            Self::NotConfigured(_) => "not_configured",
        }
    }
}

impl fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trusted => f.write_str(TRUSTED),
            Self::Untrusted => f.write_str(UNTRUSTED),
            Self::Error(reason) => write!(f, "{ERROR_PREFIX}{reason}"),
            Self::NotConfigured(setting) => {
                write!(f, "{setting}; cannot verify the remote agent.")
            }
        }
    }
}

impl From<SetupError> for GateVerdict {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::Missing(setting) => Self::NotConfigured(setting),
            other => Self::Error(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct VerificationGate<C> {
    settings: GateSettings,
    service: TrustService<C>,
}

impl<C: ReadOnlyCaller> VerificationGate<C> {
    pub fn new(settings: GateSettings, service: TrustService<C>) -> Self {
        Self { settings, service }
    }

    pub fn service(&self) -> &TrustService<C> {
        &self.service
    }

    pub async fn verify(&self) -> GateVerdict {
        let Some(target) = self.settings.target_address() else {
            tracing::warn!("No target address configured; refusing to verify");
            return GateVerdict::NotConfigured(MissingSetting::TargetAddress);
        };
        let verdict = GateVerdict::from_outcome(self.service.query(target).await);
        tracing::info!(target_address = target, verdict = verdict.kind(), "Verification gate decided");
        verdict
    }
}

impl VerificationGate<RpcClient> {
    /// Build the production gate. The target address is checked first, so a
    /// missing target is reported even when the RPC endpoint is also absent.
    pub fn from_config(config: &TrustGateConfig) -> Result<Self, SetupError> {
        let settings = config.gate_settings();
        if settings.target_address().is_none() {
            return Err(SetupError::Missing(MissingSetting::TargetAddress));
        }
        Ok(Self::new(settings, TrustService::from_config(config)?))
    }
}

/// Build the gate from configuration and run it once.
pub async fn run_gate(config: &TrustGateConfig) -> GateVerdict {
    match VerificationGate::from_config(config) {
        Ok(gate) => gate.verify().await,
        Err(err) => {
            tracing::warn!(error = %err, "Verification gate could not be built");
            err.into()
        }
    }
}
