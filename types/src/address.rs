use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, hex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must not be empty")]
    Empty,
    #[error("address contains non-hex character {0:?}")]
    NonHex(char),
    #[error("address must be {ADDRESS_HEX_LEN} hex digits, got {0}")]
    Length(usize),
    #[error("mixed-case address {0} does not match its EIP-55 checksum")]
    BadChecksum(String),
}

/// A 20-byte EVM account or contract address.
///
/// Parsing accepts the all-lowercase and all-uppercase spellings (with or
/// without the `0x` prefix). Mixed-case input is treated as an EIP-55
/// checksum claim and must match it exactly. Display always renders the
/// checksummed form, so `parse(x).to_string()` is the canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainAddress(Address);

impl ChainAddress {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::NonHex(bad));
        }
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::Length(digits.len()));
        }

        let bytes = hex::decode(digits).map_err(|_| AddressError::Length(digits.len()))?;
        let address = Address::from_slice(&bytes);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper {
            let checksummed = address.to_checksum(None);
            if checksummed.strip_prefix("0x") != Some(digits) {
                return Err(AddressError::BadChecksum(trimmed.to_string()));
            }
        }

        Ok(Self(address))
    }

    /// EIP-55 mixed-case rendering, `0x`-prefixed.
    #[must_use]
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Address::ZERO
    }

    #[must_use]
    pub fn into_inner(self) -> Address {
        self.0
    }
}

/// Parse and re-render an address in checksummed form.
///
/// Idempotent: normalizing an already canonical address returns it unchanged.
pub fn normalize_address(raw: &str) -> Result<String, AddressError> {
    ChainAddress::parse(raw).map(|address| address.to_checksum())
}

impl From<Address> for ChainAddress {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

impl FromStr for ChainAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChainAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChainAddress> for String {
    fn from(value: ChainAddress) -> Self {
        value.to_checksum()
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
