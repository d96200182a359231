//! Resolved configuration types shared across crates.
//!
//! These types represent validated, resolved configuration state.
//! Raw TOML deserialization structs (with `Option` fields) stay in
//! `trustgate-config`. The config loader resolves them into these types at
//! the parse boundary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DESCRIPTOR_PATH: &str = "contracts/contract_info.json";
pub const DEFAULT_TRUST_METHOD: &str = "isTrusted";

/// A required setting that was not provided by file or environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingSetting {
    TargetAddress,
    RpcUrl,
}

impl MissingSetting {
    /// Primary environment variable that supplies this setting.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::TargetAddress => "TRUSTGATE_TARGET_ADDRESS",
            Self::RpcUrl => "TRUSTGATE_RPC_URL",
        }
    }

    /// Dotted key of this setting in `config.toml`.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::TargetAddress => "gate.target_address",
            Self::RpcUrl => "chain.rpc_url",
        }
    }
}

impl fmt::Display for MissingSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not set", self.env_var())
    }
}

/// Connection settings for the JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    rpc_url: Url,
    request_timeout: Duration,
    connect_timeout: Duration,
    allow_insecure_http: bool,
}

impl ChainSettings {
    #[must_use]
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            allow_insecure_http: false,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_insecure_http(mut self, allow: bool) -> Self {
        self.allow_insecure_http = allow;
        self
    }

    #[must_use]
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub const fn allow_insecure_http(&self) -> bool {
        self.allow_insecure_http
    }
}

/// Where the registry descriptor lives and which method answers the trust query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    descriptor_path: PathBuf,
    method: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            descriptor_path: PathBuf::from(DEFAULT_DESCRIPTOR_PATH),
            method: DEFAULT_TRUST_METHOD.to_string(),
        }
    }
}

impl RegistrySettings {
    #[must_use]
    pub fn new(descriptor_path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_path: descriptor_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use]
    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// Settings consumed by the verification gate.
///
/// The target address is kept as raw text: its absence is a reportable
/// outcome, and its validity is checked by the trust query itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateSettings {
    target_address: Option<String>,
}

impl GateSettings {
    #[must_use]
    pub fn new(target_address: Option<String>) -> Self {
        Self {
            target_address: target_address.filter(|value| !value.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn target_address(&self) -> Option<&str> {
        self.target_address.as_deref()
    }
}
