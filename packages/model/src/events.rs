//! # Typed Model Events
//!
//! Change notification for the entity tree.
//!
//! Every mutation of the tree emits a [`ModelEvent`] on the owning
//! context's [`EventBus`]. Observers subscribe with a closure and match
//! on the variants they care about; payload shapes are checked at
//! compile time. Events identify entities by key (block uuid, region
//! name, tab id), so per-entity and per-attribute filtering is a match
//! on the subscriber side.

use crate::collection::Direction;
use crate::tab::TabId;

/// Any observable change in the entity tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    App(AppEvent),
    Layout(LayoutEvent),
    Region(RegionEvent),
    Block(BlockEvent),
    Tab(TabEvent),
}

/// Application-root changes.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The editor was enabled or disabled.
    ActiveChanged { active: bool },
    /// The unsaved-edits indicator flipped.
    UnsavedChanged { unsaved: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    ActiveChanged { id: String, active: bool },
    /// The whole tree was replaced by a layout change.
    Replaced { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    ActiveChanged { name: String, active: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockEvent {
    ActiveChanged {
        uuid: String,
        active: bool,
    },
    /// Server-rendered markup arrived.
    HtmlLoaded {
        uuid: String,
    },
    Inserted {
        uuid: String,
        region: String,
        index: usize,
    },
    Removed {
        uuid: String,
        region: String,
    },
    Moved {
        uuid: String,
        region: String,
        index: usize,
    },
    Shifted {
        uuid: String,
        direction: Direction,
    },
    /// Save reconciled a client-temporary uuid to a server-assigned one.
    UuidRemapped {
        old: String,
        new: String,
    },
    /// Transient UI cue after a move; not persisted state.
    Highlighted {
        uuid: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    ActiveChanged { id: TabId, active: bool },
    LoadingChanged { id: TabId, loading: bool },
    TrayOpened { id: TabId },
    TrayClosed,
}

/// Handle for detaching a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ModelEvent) + Send>;

/// Explicit subscription registry for [`ModelEvent`]s.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; keep the id to detach it later.
    pub fn subscribe(&mut self, listener: impl FnMut(&ModelEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Detach a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Deliver an event to every subscriber, synchronously and in
    /// subscription order.
    pub fn emit(&mut self, event: ModelEvent) {
        for (_, listener) in self.subscribers.iter_mut() {
            listener(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
