// pulse-core/src/scheduler.rs

//! Single-threaded, cooperative timer loop over virtual time.
//!
//! Time only moves when the owner calls [`Scheduler::advance_to`] (or
//! [`Scheduler::advance_by`]). Due timers fire one at a time in
//! `(deadline, registration)` order and each callback runs to completion
//! before the next one is looked up, so a callback may freely register or
//! cancel timers. A timer cancelled before its turn never fires again.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{trace, warn};

/// Shortest period a timer may have; shorter requests are clamped.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Identifies a registered periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

type Callback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Timer {
    period: Duration,
    due: Duration,
    callback: Callback,
}

struct SchedulerState {
    epoch: DateTime<Utc>,
    now: Duration,
    next_handle: u64,
    timers: BTreeMap<TimerHandle, Timer>,
    fired: u64,
}

/// Cloning a `Scheduler` yields another handle to the same loop.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerState>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("epoch", &st.epoch)
            .field("elapsed", &st.now)
            .field("timers", &st.timers.len())
            .field("fired", &st.fired)
            .finish()
    }
}

impl Scheduler {
    /// Create a loop whose virtual clock reads `epoch` at elapsed zero.
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerState {
                epoch,
                now: Duration::ZERO,
                next_handle: 1,
                timers: BTreeMap::new(),
                fired: 0,
            })),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Virtual time since the epoch.
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Current virtual wall-clock reading.
    pub fn now(&self) -> DateTime<Utc> {
        let st = self.inner.borrow();
        let delta = TimeDelta::from_std(st.now).unwrap_or(TimeDelta::MAX);
        st.epoch
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Register `callback` to run every `period`, first at `elapsed() + period`.
    pub fn set_interval(&self, period: Duration, callback: impl FnMut() + 'static) -> TimerHandle {
        let period = if period < MIN_PERIOD {
            warn!(?period, min = ?MIN_PERIOD, "timer period clamped");
            MIN_PERIOD
        } else {
            period
        };

        let mut st = self.inner.borrow_mut();
        let handle = TimerHandle(st.next_handle);
        st.next_handle += 1;
        let due = st.now.saturating_add(period);
        st.timers.insert(
            handle,
            Timer {
                period,
                due,
                callback: Rc::new(RefCell::new(Box::new(callback))),
            },
        );
        trace!(?handle, ?period, "timer registered");
        handle
    }

    /// Cancel a timer. Returns `false` when it was not registered.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let removed = self.inner.borrow_mut().timers.remove(&handle).is_some();
        if removed {
            trace!(?handle, "timer cancelled");
        }
        removed
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.inner.borrow().timers.contains_key(&handle)
    }

    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Elapsed time at which the next timer is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().timers.values().map(|t| t.due).min()
    }

    /// Advance the clock by `delta`, firing everything that falls due.
    pub fn advance_by(&self, delta: Duration) -> usize {
        let target = self.elapsed().saturating_add(delta);
        self.advance_to(target)
    }

    /// Advance the clock to `target` (elapsed time), firing due timers in order.
    ///
    /// Returns the number of callbacks fired. A target in the past fires
    /// nothing and leaves the clock where it is.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            let callback = {
                let mut st = self.inner.borrow_mut();
                let next = st
                    .timers
                    .iter()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|&(h, t)| (t.due, *h))
                    .map(|(h, _)| *h);
                let Some(handle) = next else { break };
                let Some(timer) = st.timers.get_mut(&handle) else {
                    break;
                };
                let due = timer.due;
                timer.due = due.saturating_add(timer.period);
                let callback = Rc::clone(&timer.callback);
                // Pinned at the end of time; it cannot fall due again.
                if timer.due == due {
                    st.timers.remove(&handle);
                    trace!(?handle, "timer exhausted");
                }
                st.now = st.now.max(due);
                st.fired += 1;
                trace!(?handle, ?due, "timer fired");
                callback
            };

            // A callback that advances the loop itself cannot re-enter its own body.
            let Ok(mut f) = callback.try_borrow_mut() else {
                warn!("timer callback re-entered; tick skipped");
                continue;
            };
            (&mut *f)();
            fired += 1;
        }

        let mut st = self.inner.borrow_mut();
        if st.now < target {
            st.now = target;
        }
        fired
    }
}
