//! Read-only displays bound to one slice of the store.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pulse_core::entity::EntityKind;
use pulse_core::store::{Store, StoreState, Subscription};
use pulse_core::watch::{select_entity, watch};
use tracing::{debug, warn};

use crate::{VNode, h, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySource {
    /// Timestamp of the cheap entity; narrow subscription.
    Cheap,
    /// Timestamp of the expensive entity; narrow subscription.
    Expensive,
    /// The store's revision id; broad subscription.
    Revision,
}

impl DisplaySource {
    pub const ALL: [DisplaySource; 3] = [
        DisplaySource::Cheap,
        DisplaySource::Expensive,
        DisplaySource::Revision,
    ];

    pub fn dom_id(self) -> &'static str {
        match self {
            DisplaySource::Cheap => "cheap",
            DisplaySource::Expensive => "expensive",
            DisplaySource::Revision => "revision",
        }
    }

    /// Entity slot behind a narrow display; `None` for the broad revision display.
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            DisplaySource::Cheap => Some(EntityKind::Cheap),
            DisplaySource::Expensive => Some(EntityKind::Expensive),
            DisplaySource::Revision => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DisplaySource::Cheap => "Cheap updated",
            DisplaySource::Expensive => "Expensive updated",
            DisplaySource::Revision => "Store revision",
        }
    }

    fn read(self, state: &StoreState) -> String {
        match self {
            DisplaySource::Cheap => state.cheap.timestamp(),
            DisplaySource::Expensive => state.expensive.timestamp(),
            DisplaySource::Revision => state.revision_id.clone(),
        }
    }
}

/// One presentation node: holds exactly one subscription while mounted.
#[derive(Debug)]
pub struct DisplayNode {
    source: DisplaySource,
    value: RefCell<String>,
    renders: Cell<u64>,
    subscription: RefCell<Option<Subscription>>,
}

impl DisplayNode {
    pub fn new(source: DisplaySource) -> Rc<Self> {
        Rc::new(Self {
            source,
            value: RefCell::new(String::new()),
            renders: Cell::new(0),
            subscription: RefCell::new(None),
        })
    }

    pub fn source(&self) -> DisplaySource {
        self.source
    }

    /// Take the initial value from `store` and subscribe.
    pub fn mount(self: &Rc<Self>, store: &Store) {
        if self.is_mounted() {
            warn!(node = self.source.dom_id(), "display already mounted");
            return;
        }
        *self.value.borrow_mut() = self.source.read(&store.state());

        let weak = Rc::downgrade(self);
        let sub = match self.source.entity_kind() {
            Some(kind) => select_entity(store, kind, move |new, _old| {
                if let Some(node) = weak.upgrade() {
                    node.rerender(new.timestamp());
                }
            }),
            None => watch(store, move |state| {
                if let Some(node) = weak.upgrade() {
                    node.rerender(state.revision_id.clone());
                }
            }),
        };
        *self.subscription.borrow_mut() = Some(sub);
        debug!(node = self.source.dom_id(), "display mounted");
    }

    /// Release the subscription. Returns `false` if the node was not mounted.
    pub fn unmount(&self) -> bool {
        let sub = self.subscription.borrow_mut().take();
        let was_mounted = sub.is_some();
        drop(sub);
        if was_mounted {
            debug!(node = self.source.dom_id(), renders = self.renders.get(), "display unmounted");
        }
        was_mounted
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Re-renders caused by store notifications (the mount render is not counted).
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn rerender(&self, value: String) {
        self.renders.set(self.renders.get() + 1);
        debug!(node = self.source.dom_id(), %value, "display re-rendered");
        *self.value.borrow_mut() = value;
    }

    pub fn render(&self) -> VNode {
        h(
            "div",
            vec![("id", self.source.dom_id()), ("class", "display")],
            vec![
                h("span", vec![("class", "label")], vec![text(self.source.label())]),
                h(
                    "span",
                    vec![("class", "value")],
                    vec![text(self.value.borrow().as_str())],
                ),
            ],
        )
    }
}
