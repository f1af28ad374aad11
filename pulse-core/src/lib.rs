//! Observable store with selector-aware subscriptions.
//!
//! A [`Store`](store::Store) holds a "cheap" and an "expensive" entity that
//! are replaced by two periodic timers on a single-threaded
//! [`Scheduler`](scheduler::Scheduler). Consumers attach either a broad
//! subscription ([`watch`](watch::watch)) that fires on every notification,
//! or a narrow one ([`select`](watch::select)) that fires only when a
//! projection of the store changes identity.

pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod scheduler;
pub mod store;
pub mod watch;

pub use config::{StartPolicy, StoreConfig};
pub use entity::{Entity, EntityKind, same_entity};
pub use error::ConfigError;
pub use id::{IdGenerator, SequentialIds, UuidIds};
pub use lifecycle::Lifecycle;
pub use scheduler::{Scheduler, TimerHandle};
pub use store::{Store, StoreState, Subscription};
pub use watch::{Selection, select, select_entity, watch};
