//! Configuration for trustgate.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. `~/.trustgate/config.toml` (or an explicit path)
//! 2. `${VAR}` references inside string values, expanded from the environment
//! 3. `TRUSTGATE_*` environment variables (plus the legacy `INFURA_URL` and
//!    `AGENT_PRIME_ETH_ADDRESS` names)
//!
//! ```toml
//! [chain]
//! rpc_url = "https://sepolia.infura.io/v3/${INFURA_KEY}"
//! request_timeout_secs = 10
//!
//! [registry]
//! descriptor_path = "contracts/contract_info.json"
//!
//! [gate]
//! target_address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
//! ```
//!
//! The raw structs here keep every field optional. Callers resolve them into
//! the validated types from [`trustgate_types::settings`].

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use trustgate_types::{ChainSettings, GateSettings, MissingSetting, RegistrySettings};
use url::Url;

pub const RPC_URL_ENV: &str = "TRUSTGATE_RPC_URL";
pub const LEGACY_RPC_URL_ENV: &str = "INFURA_URL";
pub const TARGET_ADDRESS_ENV: &str = "TRUSTGATE_TARGET_ADDRESS";
pub const LEGACY_TARGET_ADDRESS_ENV: &str = "AGENT_PRIME_ETH_ADDRESS";
pub const DESCRIPTOR_PATH_ENV: &str = "TRUSTGATE_DESCRIPTOR_PATH";
pub const REQUEST_TIMEOUT_ENV: &str = "TRUSTGATE_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrustGateConfig {
    pub chain: Option<ChainConfig>,
    pub registry: Option<RegistryConfig>,
    pub gate: Option<GateConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// A setting that is present but cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Missing(MissingSetting),
    #[error("invalid RPC URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// JSON-RPC endpoint settings.
///
/// ```toml
/// [chain]
/// rpc_url = "https://mainnet.example/rpc"
/// request_timeout_secs = 10
/// connect_timeout_secs = 5
/// allow_insecure_http = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// Permit plain `http://` endpoints on non-loopback hosts.
    #[serde(default)]
    pub allow_insecure_http: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// JSON file with `address` and `abi`, written by the deploy step.
    pub descriptor_path: Option<String>,
    /// Read-only contract method answering the trust query. Default: `isTrusted`.
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateConfig {
    /// Address of the remote agent that must be trusted before delegation.
    pub target_address: Option<String>,
}

/// Expand `${VAR}` references from the process environment.
///
/// Unset variables expand to the empty string. An unclosed `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    expand_vars_with(value, |name| env::var(name).ok())
}

pub fn expand_vars_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &after[..end];
        if !name.is_empty()
            && let Some(replacement) = lookup(name)
        {
            out.push_str(&replacement);
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TrustGateConfig {
    /// Load the default config file, if it exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load an explicit config file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(config.expand_with(|name| env::var(name).ok())),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    fn expand_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let expand = |value: &mut Option<String>| {
            if let Some(raw) = value.as_mut() {
                *raw = expand_vars_with(raw, &lookup);
            }
        };
        if let Some(chain) = self.chain.as_mut() {
            expand(&mut chain.rpc_url);
        }
        if let Some(registry) = self.registry.as_mut() {
            expand(&mut registry.descriptor_path);
            expand(&mut registry.method);
        }
        if let Some(gate) = self.gate.as_mut() {
            expand(&mut gate.target_address);
        }
        self
    }

    /// Apply `TRUSTGATE_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment.
    ///
    /// Blank values count as unset, so an empty variable never clobbers the file.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| non_blank(lookup(name));

        if let Some(url) = get(RPC_URL_ENV).or_else(|| get(LEGACY_RPC_URL_ENV)) {
            self.chain.get_or_insert_with(Default::default).rpc_url = Some(url);
        }
        if let Some(raw) = get(REQUEST_TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    self.chain
                        .get_or_insert_with(Default::default)
                        .request_timeout_secs = Some(secs);
                }
                _ => tracing::warn!(value = %raw, "Ignoring invalid {REQUEST_TIMEOUT_ENV}"),
            }
        }
        if let Some(path) = get(DESCRIPTOR_PATH_ENV) {
            self.registry
                .get_or_insert_with(Default::default)
                .descriptor_path = Some(path);
        }
        if let Some(address) = get(TARGET_ADDRESS_ENV).or_else(|| get(LEGACY_TARGET_ADDRESS_ENV)) {
            self.gate.get_or_insert_with(Default::default).target_address = Some(address);
        }
        self
    }

    /// Resolve the chain section. A missing RPC URL is reported, not defaulted.
    pub fn chain_settings(&self) -> Result<ChainSettings, SettingsError> {
        let chain = self.chain.clone().unwrap_or_default();
        let raw = non_blank(chain.rpc_url).ok_or(SettingsError::Missing(MissingSetting::RpcUrl))?;
        let url = Url::parse(&raw).map_err(|source| SettingsError::InvalidUrl {
            value: raw.clone(),
            source,
        })?;

        let mut settings = ChainSettings::new(url).with_insecure_http(chain.allow_insecure_http);
        if let Some(secs) = chain.request_timeout_secs {
            if secs == 0 {
                return Err(SettingsError::ZeroTimeout {
                    field: "chain.request_timeout_secs",
                });
            }
            settings = settings.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = chain.connect_timeout_secs {
            if secs == 0 {
                return Err(SettingsError::ZeroTimeout {
                    field: "chain.connect_timeout_secs",
                });
            }
            settings = settings.with_connect_timeout(Duration::from_secs(secs));
        }
        Ok(settings)
    }

    #[must_use]
    pub fn registry_settings(&self) -> RegistrySettings {
        let registry = self.registry.clone().unwrap_or_default();
        let mut settings = match non_blank(registry.descriptor_path) {
            Some(path) => RegistrySettings::new(path),
            None => RegistrySettings::default(),
        };
        if let Some(method) = non_blank(registry.method) {
            settings = settings.with_method(method);
        }
        settings
    }

    #[must_use]
    pub fn gate_settings(&self) -> GateSettings {
        GateSettings::new(
            self.gate
                .as_ref()
                .and_then(|gate| gate.target_address.clone()),
        )
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".trustgate").join("config.toml"))
}
