use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("time unit must be non-zero")]
    ZeroUnit,
    #[error("{0} cadence must be at least one unit")]
    ZeroCadence(EntityKind),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
