// pulse-core/src/config.rs
use std::time::Duration;

use crate::entity::EntityKind;
use crate::error::{ConfigError, Result};

/// What `Store::start` does when timers are already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPolicy {
    /// A second `start()` is ignored.
    #[default]
    Idempotent,
    /// Every `start()` registers another timer pair; `stop()` cancels them all.
    StackTimers,
}

/// Timing configuration for a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base time quantum.
    pub unit: Duration,
    /// Cheap refresh cadence, in units.
    pub cheap_every: u32,
    /// Expensive refresh cadence, in units.
    pub expensive_every: u32,
    pub start_policy: StartPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            cheap_every: 1,
            expensive_every: 10,
            start_policy: StartPolicy::default(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn with_cheap_every(mut self, units: u32) -> Self {
        self.cheap_every = units;
        self
    }

    #[must_use]
    pub fn with_expensive_every(mut self, units: u32) -> Self {
        self.expensive_every = units;
        self
    }

    #[must_use]
    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.unit.is_zero() {
            return Err(ConfigError::ZeroUnit);
        }
        for kind in EntityKind::ALL {
            if self.cadence(kind) == 0 {
                return Err(ConfigError::ZeroCadence(kind));
            }
        }
        Ok(())
    }

    /// Cadence of `kind`, in units.
    pub fn cadence(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Cheap => self.cheap_every,
            EntityKind::Expensive => self.expensive_every,
        }
    }

    /// Refresh period of `kind` as wall/virtual time.
    pub fn period(&self, kind: EntityKind) -> Duration {
        self.unit.saturating_mul(self.cadence(kind))
    }

    /// Convert a whole number of units into time.
    pub fn units(&self, n: u64) -> Duration {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.unit.saturating_mul(n)
    }
}
