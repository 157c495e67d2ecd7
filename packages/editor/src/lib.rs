//! # Mosaic Editor
//!
//! Client-side editing core for in-place page-layout editing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Layout → Region → Block entities     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: AppContext + controllers            │
//! │  - Validated tree edits (move/shift/insert) │
//! │  - Root-down active-state propagation       │
//! │  - Exclusive tab tray multiplexer           │
//! │  - Drag/reorder targets                     │
//! │  - Pure render descriptions                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sync: draft reconciliation with the server  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One context, no globals**: every component operates on an
//!    [`AppContext`] constructed once by the embedder.
//! 2. **Typed events**: all change notification goes through the
//!    model's `EventBus` with compile-time checked payloads.
//! 3. **Pure rendering**: [`render`] maps context state to a
//!    [`RenderTree`] description; reconciliation against a real surface
//!    is the embedder's concern.
//! 4. **Edits are local**: nothing here touches the network; the sync
//!    crate pushes the tree on explicit save.

mod context;
mod edits;
mod propagation;
mod render;
mod reorder;
mod tabs;

pub use context::{AppContext, BootBlock, BootRegion, BootSettings, LayoutOption};
pub use edits::{Edit, EditError};
pub use propagation::{reapply, set_active};
pub use render::{
    render, BlockAffordances, BlockNode, LayoutNode, PanelNode, RegionChild, RegionNode,
    RenderTree, TabNode, TrayNode,
};
pub use reorder::{assign_region, drop_block, drop_targets, step_block, DropTarget};
pub use tabs::{TabMultiplexer, TrayState, TrayTransition};
