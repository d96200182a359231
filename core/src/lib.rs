//! On-chain trust verification for delegation to a remote agent.
//!
//! ```text
//! VerificationGate::verify()
//!     -> TrustService::query(target)
//!         -> load_descriptor(path)            (re-read on every query)
//!         -> ReadOnlyCaller::call_read_only   (one eth_call, no retries)
//!     -> GateVerdict  ("TRUSTED" | "UNTRUSTED" | "ERROR: ..." | not configured)
//! ```
//!
//! The flow is fail-closed: only a registry that positively answers `true`
//! yields [`GateVerdict::Trusted`]. Every failure below the gate is folded
//! into [`TrustOutcome::Unavailable`], which the gate reports as an error.

pub mod descriptor;
pub mod gate;
pub mod setup;
pub mod status;
pub mod trust;

#[cfg(test)]
mod test_support;

pub use descriptor::{DescriptorError, RegistryDescriptor, load_descriptor};
pub use gate::{GateVerdict, SetupError, VerificationGate, run_gate};
pub use status::{RegistryStatus, probe_registry};
pub use trust::{TrustError, TrustOutcome, TrustService};
