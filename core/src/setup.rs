//! Errors raised while wiring a chain-backed service from configuration.

use thiserror::Error;
use trustgate_chain::ChainError;
use trustgate_config::SettingsError;
use trustgate_types::MissingSetting;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{0}")]
    Missing(MissingSetting),
    #[error(transparent)]
    Settings(SettingsError),
    #[error(transparent)]
    Client(#[from] ChainError),
}

impl From<SettingsError> for SetupError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Missing(setting) => Self::Missing(setting),
            other => Self::Settings(other),
        }
    }
}
