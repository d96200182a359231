//! Core domain types for trustgate.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.
//!
//! - [`ChainAddress`]: a 20-byte EVM address with EIP-55 checksum normalization
//! - [`ContractInterface`]: the JSON ABI written next to a deployed registry
//! - [`settings`]: resolved configuration shared by the chain client and the gate

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod abi;
mod address;
pub mod settings;

pub use abi::{ContractInterface, is_read_only};
pub use address::{AddressError, ChainAddress, normalize_address};
pub use settings::{ChainSettings, GateSettings, MissingSetting, RegistrySettings};
