// pulse-core/src/id.rs
use std::cell::Cell;

use uuid::Uuid;

/// Source of statistically unique identifiers.
///
/// Used both for entity ids and for the store's revision marker.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs in hyphenated lowercase form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

/// Deterministic `"<prefix>-<n>"` ids, for reproducible runs.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.get() - 1
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{}", self.prefix, n)
    }
}
