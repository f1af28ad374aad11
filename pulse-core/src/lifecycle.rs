// pulse-core/src/lifecycle.rs
use std::cell::RefCell;

use tracing::trace;

/// Mount/unmount hooks for one component tree.
///
/// Owned by whoever mounts the tree rather than stored globally, so two
/// trees never run each other's hooks.
#[derive(Default)]
pub struct Lifecycle {
    mounted: RefCell<Vec<Box<dyn FnOnce()>>>,
    destroy: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook to run when the tree is mounted
    pub fn on_mounted(&self, f: impl FnOnce() + 'static) {
        self.mounted.borrow_mut().push(Box::new(f));
    }

    /// Register a hook to run before the tree is destroyed
    pub fn before_destroy(&self, f: impl FnOnce() + 'static) {
        self.destroy.borrow_mut().push(Box::new(f));
    }

    /// Run and clear the mounted hooks, in registration order.
    pub fn run_mounted_hooks(&self) -> usize {
        run_all(&self.mounted, "mounted")
    }

    /// Run and clear the destroy hooks, most recent first.
    pub fn run_destroy_hooks(&self) -> usize {
        self.destroy.borrow_mut().reverse();
        run_all(&self.destroy, "destroy")
    }

    pub fn pending_destroy_hooks(&self) -> usize {
        self.destroy.borrow().len()
    }
}

fn run_all(hooks: &RefCell<Vec<Box<dyn FnOnce()>>>, phase: &'static str) -> usize {
    // Take the list first so a hook may register further hooks.
    let drained: Vec<Box<dyn FnOnce()>> = hooks.borrow_mut().drain(..).collect();
    let count = drained.len();
    for hook in drained {
        hook();
    }
    trace!(phase, count, "lifecycle hooks ran");
    count
}
