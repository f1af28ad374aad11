// pulse-core/src/store.rs

//! The observable store.
//!
//! One coarse notification channel: every mutation ends in [`Store::notify`],
//! which rotates the revision id and calls each listener, in registration
//! order, with a snapshot of the state. Fine-grained filtering lives in
//! [`crate::watch`].
//!
//! # Invariants
//!
//! 1. `cheap` and `expensive` are always present once the store exists.
//! 2. Each `notify()` delivers exactly one snapshot to every listener that is
//!    still registered when its turn comes.
//! 3. A `notify()` issued while listeners are running is queued and delivered
//!    after the current pass; dispatch never nests.
//! 4. Dropping a [`Subscription`] stops deliveries to its listener, including
//!    later turns of a pass already in progress.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, trace};

use crate::config::{StartPolicy, StoreConfig};
use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::id::IdGenerator;
use crate::scheduler::{Scheduler, TimerHandle};

/// Snapshot handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// Rotated on every notification; carries no meaning beyond "changed".
    pub revision_id: String,
    pub cheap: Entity,
    pub expensive: Entity,
}

impl StoreState {
    pub fn entity(&self, kind: EntityKind) -> &Entity {
        match kind {
            EntityKind::Cheap => &self.cheap,
            EntityKind::Expensive => &self.expensive,
        }
    }
}

type Listener = Rc<RefCell<dyn FnMut(&StoreState)>>;

struct ListenerEntry {
    id: u64,
    listener: Listener,
}

struct StoreInner {
    config: StoreConfig,
    scheduler: Scheduler,
    ids: Box<dyn IdGenerator>,
    state: RefCell<StoreState>,
    timers: RefCell<Vec<TimerHandle>>,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_listener: Cell<u64>,
    notifications: Cell<u64>,
    dispatching: Cell<bool>,
    queued: Cell<u64>,
}

impl StoreInner {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|e| e.id == id)
    }
}

/// Shared handle to the store. Clones point at the same state.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("timers", &self.inner.timers.borrow().len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("notifications", &self.inner.notifications.get())
            .finish()
    }
}

impl Store {
    /// Build a store with fresh entities stamped at the scheduler's current time.
    ///
    /// Timers are not started.
    pub fn new(
        config: StoreConfig,
        scheduler: Scheduler,
        ids: impl IdGenerator + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let now = scheduler.now();
        let state = StoreState {
            revision_id: ids.next_id(),
            cheap: Entity::new(ids.next_id(), now),
            expensive: Entity::new(ids.next_id(), now),
        };
        debug!(revision = %state.revision_id, "store created");

        Ok(Self {
            inner: Rc::new(StoreInner {
                config,
                scheduler,
                ids: Box::new(ids),
                state: RefCell::new(state),
                timers: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                notifications: Cell::new(0),
                dispatching: Cell::new(false),
                queued: Cell::new(0),
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Register the two refresh timers.
    ///
    /// Under [`StartPolicy::Idempotent`] a call while running does nothing;
    /// under [`StartPolicy::StackTimers`] it adds another pair.
    pub fn start(&self) {
        let running = self.is_running();
        if running && self.inner.config.start_policy == StartPolicy::Idempotent {
            debug!("start ignored, timers already running");
            return;
        }

        let mut handles = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let weak: Weak<StoreInner> = Rc::downgrade(&self.inner);
            let period = self.inner.config.period(kind);
            let handle = self.inner.scheduler.set_interval(period, move || {
                if let Some(inner) = weak.upgrade() {
                    Store { inner }.refresh(kind);
                }
            });
            handles.push(handle);
        }
        self.inner.timers.borrow_mut().extend(handles);

        info!(
            timers = self.active_timer_count(),
            stacked = running,
            "store started"
        );
    }

    /// Cancel every refresh timer, then notify once.
    pub fn stop(&self) {
        let handles = std::mem::take(&mut *self.inner.timers.borrow_mut());
        let cancelled = handles
            .into_iter()
            .filter(|h| self.inner.scheduler.cancel(*h))
            .count();
        info!(cancelled, "store stopped");
        self.notify();
    }

    /// Replace the `kind` entity with a fresh one and notify.
    ///
    /// This is what each timer tick does.
    pub fn refresh(&self, kind: EntityKind) {
        let entity = Entity::new(self.inner.ids.next_id(), self.inner.scheduler.now());
        debug!(%kind, id = entity.id(), at = %entity.timestamp(), "entity replaced");
        {
            let mut state = self.inner.state.borrow_mut();
            match kind {
                EntityKind::Cheap => state.cheap = entity,
                EntityKind::Expensive => state.expensive = entity,
            }
        }
        self.notify();
    }

    /// Rotate the revision id and run every listener with the new snapshot.
    pub fn notify(&self) {
        let inner = &self.inner;
        let revision = inner.ids.next_id();
        trace!(%revision, "notify");
        inner.state.borrow_mut().revision_id = revision;
        inner.notifications.set(inner.notifications.get() + 1);

        if inner.dispatching.get() {
            inner.queued.set(inner.queued.get() + 1);
            trace!(queued = inner.queued.get(), "notify queued behind running dispatch");
            return;
        }

        let _guard = DispatchGuard::enter(inner);
        loop {
            let snapshot = inner.state.borrow().clone();
            let listeners: Vec<(u64, Listener)> = inner
                .listeners
                .borrow()
                .iter()
                .map(|e| (e.id, Rc::clone(&e.listener)))
                .collect();

            for (id, listener) in listeners {
                // Unsubscribed by an earlier listener in this pass.
                if !inner.is_registered(id) {
                    continue;
                }
                let mut f = listener.borrow_mut();
                (&mut *f)(&snapshot);
            }

            let queued = inner.queued.get();
            if queued == 0 {
                break;
            }
            inner.queued.set(queued - 1);
        }
    }

    /// Register a listener called on every notification.
    pub fn subscribe(&self, listener: impl FnMut(&StoreState) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.inner
            .listeners
            .borrow_mut()
            .push(ListenerEntry { id, listener });
        trace!(id, "listener subscribed");
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn cheap(&self) -> Entity {
        self.inner.state.borrow().cheap.clone()
    }

    pub fn expensive(&self) -> Entity {
        self.inner.state.borrow().expensive.clone()
    }

    pub fn entity(&self, kind: EntityKind) -> Entity {
        self.inner.state.borrow().entity(kind).clone()
    }

    pub fn revision_id(&self) -> String {
        self.inner.state.borrow().revision_id.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.inner.timers.borrow().is_empty()
    }

    /// Number of refresh timers currently registered (two per running pair).
    pub fn active_timer_count(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Total `notify()` calls so far.
    pub fn notification_count(&self) -> u64 {
        self.inner.notifications.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Clears the dispatching flag and any queued passes, even if a listener
/// panics, so the next `notify()` starts from a clean slate.
struct DispatchGuard<'a> {
    inner: &'a StoreInner,
}

impl<'a> DispatchGuard<'a> {
    fn enter(inner: &'a StoreInner) -> Self {
        inner.dispatching.set(true);
        Self { inner }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.inner.queued.set(0);
        self.inner.dispatching.set(false);
    }
}

/// RAII registration; dropping it unsubscribes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Subscription {
    /// True while the listener is registered and the store is alive.
    pub fn is_active(&self) -> bool {
        self.store
            .upgrade()
            .is_some_and(|inner| inner.is_registered(self.id))
    }

    /// Explicit form of dropping the guard.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            // Release the borrow before the closure (and whatever it owns) drops.
            let removed = {
                let mut listeners = inner.listeners.borrow_mut();
                listeners
                    .iter()
                    .position(|e| e.id == self.id)
                    .map(|i| listeners.remove(i))
            };
            if removed.is_some() {
                trace!(id = self.id, "listener unsubscribed");
            }
        }
    }
}
