use tracing::trace;

use crate::entity::{Entity, EntityKind, same_entity};
use crate::store::{Store, StoreState, Subscription};

/// A projection of the store plus the last value it produced.
///
/// `last_value` only moves when a fresh projection differs from it under
/// the supplied comparator.
pub struct Selection<T> {
    projection: Box<dyn Fn(&StoreState) -> T>,
    same: Box<dyn Fn(&T, &T) -> bool>,
    last: T,
}

impl<T> Selection<T> {
    /// Capture the baseline projection of `initial`.
    pub fn new(
        initial: &StoreState,
        projection: impl Fn(&StoreState) -> T + 'static,
        same: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        let last = projection(initial);
        Self {
            projection: Box::new(projection),
            same: Box::new(same),
            last,
        }
    }

    pub fn last_value(&self) -> &T {
        &self.last
    }

    /// Recompute against `state`.
    ///
    /// Returns the previous value when the projection changed (the new one
    /// is then available via [`last_value`](Self::last_value)), `None` otherwise.
    pub fn update(&mut self, state: &StoreState) -> Option<T> {
        let next = (self.projection)(state);
        if (self.same)(&self.last, &next) {
            None
        } else {
            Some(std::mem::replace(&mut self.last, next))
        }
    }
}

/// Broad subscription: `on_change` runs on every notification.
pub fn watch<F>(store: &Store, on_change: F) -> Subscription
where
    F: FnMut(&StoreState) + 'static,
{
    let sub = store.subscribe(on_change);
    trace!(?sub, "watch registered");
    sub
}

/// Narrow subscription: `on_change(new, old)` runs only when `projection`
/// yields a value that `same` considers different from the cached one.
///
/// The baseline is taken when subscribing; there is no initial callback.
pub fn select<T, P, E, F>(store: &Store, projection: P, same: E, mut on_change: F) -> Subscription
where
    T: 'static,
    P: Fn(&StoreState) -> T + 'static,
    E: Fn(&T, &T) -> bool + 'static,
    F: FnMut(&T, &T) + 'static,
{
    let mut selection = Selection::new(&store.state(), projection, same);
    let sub = store.subscribe(move |state| {
        // Cache is updated before user code so the callback may touch the store.
        if let Some(old) = selection.update(state) {
            on_change(selection.last_value(), &old);
        }
    });
    trace!(?sub, "select registered");
    sub
}

/// [`select`] on one entity slot, compared by identity.
pub fn select_entity<F>(store: &Store, kind: EntityKind, on_change: F) -> Subscription
where
    F: FnMut(&Entity, &Entity) + 'static,
{
    select(
        store,
        move |state: &StoreState| state.entity(kind).clone(),
        same_entity,
        on_change,
    )
}
