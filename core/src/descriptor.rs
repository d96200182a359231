//! Boundary: reads the registry descriptor written by the deploy step.
//!
//! The descriptor is never cached. A redeploy may replace the file between
//! two runs, and each query must see whatever is on disk right now.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use trustgate_types::{ChainAddress, ContractInterface};

/// Deployed registry contract: where it lives and how to call it.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDescriptor {
    pub address: ChainAddress,
    pub abi: ContractInterface,
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("registry descriptor not found at {}; run the deploy step first", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read registry descriptor at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed registry descriptor at {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DescriptorError {
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Read { path, .. } | Self::Malformed { path, .. } => {
                path
            }
        }
    }
}

pub fn load_descriptor(path: &Path) -> Result<RegistryDescriptor, DescriptorError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DescriptorError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DescriptorError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let descriptor: RegistryDescriptor =
        serde_json::from_str(&content).map_err(|source| DescriptorError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        path = %path.display(),
        contract = %descriptor.address,
        functions = descriptor.abi.function_count(),
        "Loaded registry descriptor"
    );
    Ok(descriptor)
}
