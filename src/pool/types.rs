use std::fmt;

use thiserror::Error;

use super::config::ConfigBuilderError;

/// Errors that can occur while configuring or starting a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The configuration failed validation.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(#[from] ConfigBuilderError),

    /// `start` was called outside of a tokio runtime.
    #[error("no tokio runtime available to spawn workers")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Identifier of one start/stop generation of a pool.
///
/// Every effective `start` opens a new epoch with a larger id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochId(pub(crate) u64);

impl EpochId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch-{}", self.0)
    }
}
