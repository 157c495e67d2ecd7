//! # Mosaic Model
//!
//! Entity model for the Mosaic in-place page editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Layout: current arrangement of the page     │
//! │   └─ Region (ordered, fixed by the layout)  │
//! │        └─ Block (ordered, user-arranged)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Entities are plain records. All mutation goes through the editor
//! crate, which emits typed [`ModelEvent`]s on an [`EventBus`] so
//! observers get compile-time checked payloads instead of string-named
//! signals.
//!
//! ## Identity
//!
//! - A `Block` is identified by its `uuid`; the plugin id is a catalog
//!   reference, never identity.
//! - A `Region` is identified by its machine `name`, unique within a
//!   layout.
//! - Exactly one `Layout` is current per editing session.

mod block;
mod collection;
mod events;
mod layout;
mod plugin;
mod region;
mod tab;

pub use block::Block;
pub use collection::{CollectionError, Direction, Keyed, OrderedSet};
pub use events::{
    AppEvent, BlockEvent, EventBus, LayoutEvent, ModelEvent, RegionEvent, SubscriptionId, TabEvent,
};
pub use layout::Layout;
pub use plugin::{category_counts, BlockPlugin, CategoryCount};
pub use region::Region;
pub use tab::{Tab, TabId};
