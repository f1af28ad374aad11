//! The mounted component tree: three displays and the controls.

use std::cell::RefCell;
use std::rc::Rc;

use pulse_core::lifecycle::Lifecycle;
use pulse_core::store::Store;
use tracing::info;

use crate::controls::Controls;
use crate::diff::{Patch, diff};
use crate::display::{DisplayNode, DisplaySource};
use crate::{VNode, h};

pub struct App {
    store: Store,
    lifecycle: Lifecycle,
    cheap: Rc<DisplayNode>,
    expensive: Rc<DisplayNode>,
    revision: Rc<DisplayNode>,
    controls: Controls,
    committed: RefCell<VNode>,
}

impl App {
    /// Build the tree, mount every display against `store`, and commit the
    /// first render.
    pub fn mount(store: &Store) -> Self {
        let lifecycle = Lifecycle::new();
        let cheap = DisplayNode::new(DisplaySource::Cheap);
        let expensive = DisplayNode::new(DisplaySource::Expensive);
        let revision = DisplayNode::new(DisplaySource::Revision);

        for node in [&cheap, &expensive, &revision] {
            let mounted = Rc::clone(node);
            let store = store.clone();
            lifecycle.on_mounted(move || mounted.mount(&store));

            let destroyed = Rc::clone(node);
            lifecycle.before_destroy(move || {
                destroyed.unmount();
            });
        }
        let mounted = lifecycle.run_mounted_hooks();

        let mut app = Self {
            store: store.clone(),
            lifecycle,
            cheap,
            expensive,
            revision,
            controls: Controls::new(store.clone()),
            committed: RefCell::new(VNode::Text(String::new())),
        };
        let first = app.render();
        *app.committed.get_mut() = first;
        info!(nodes = mounted, subscribers = store.subscriber_count(), "app mounted");
        app
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn display(&self, source: DisplaySource) -> &DisplayNode {
        match source {
            DisplaySource::Cheap => &*self.cheap,
            DisplaySource::Expensive => &*self.expensive,
            DisplaySource::Revision => &*self.revision,
        }
    }

    /// Displays in tree order.
    pub fn displays(&self) -> [&DisplayNode; 3] {
        [&*self.cheap, &*self.expensive, &*self.revision]
    }

    pub fn render(&self) -> VNode {
        let mut children: Vec<VNode> = self.displays().iter().map(|d| d.render()).collect();
        children.push(self.controls.render());
        h("main", vec![("id", "app")], children)
    }

    /// Render, diff against the last committed tree, and commit.
    pub fn frame(&self) -> Vec<Patch> {
        let next = self.render();
        let mut committed = self.committed.borrow_mut();
        let patches = diff(&committed, &next);
        *committed = next;
        patches
    }

    /// Last committed tree.
    pub fn committed(&self) -> VNode {
        self.committed.borrow().clone()
    }

    /// Run the destroy hooks, releasing every display's subscription.
    ///
    /// Returns the number of hooks run; zero on a second call.
    pub fn unmount(&self) -> usize {
        let ran = self.lifecycle.run_destroy_hooks();
        if ran > 0 {
            info!(hooks = ran, "app unmounted");
        }
        ran
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}
