// pulse-core/src/entity.rs
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, SecondsFormat, Utc};

/// Which of the two store slots an entity lives in.
///
/// The variants differ only in refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Cheap,
    Expensive,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Cheap, EntityKind::Expensive];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Cheap => "cheap",
            EntityKind::Expensive => "expensive",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable timestamped value.
///
/// Equality and hashing look at `id` only; two entities stamped at the same
/// instant are still different entities.
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    last_updated: DateTime<Utc>,
}

impl Entity {
    pub fn new(id: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            last_updated,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// ISO-8601 rendering of `last_updated`, millisecond precision, `Z` suffix.
    pub fn timestamp(&self) -> String {
        self.last_updated.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        same_entity(self, other)
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Identity comparator handed to narrow subscriptions.
pub fn same_entity(a: &Entity, b: &Entity) -> bool {
    a.id == b.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn equality_ignores_timestamp() {
        let a = Entity::new("a", at(0));
        let a_later = Entity::new("a", at(60));
        let b = Entity::new("b", at(0));

        assert_eq!(a, a_later);
        assert_ne!(a, b);
        assert!(same_entity(&a, &a));
    }

    #[test]
    fn timestamp_is_iso8601_utc() {
        let e = Entity::new("x", at(1_700_000_000));
        assert_eq!(e.timestamp(), "2023-11-14T22:13:20.000Z");
    }
}
