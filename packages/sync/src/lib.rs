//! # Mosaic Sync
//!
//! Draft synchronization between an editing context and the
//! page-composition service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ wire:   serde documents for the JSON contract│
//! └──────────────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────────────────────────────┐
//! │ api:    ComposerApi trait + reqwest client   │
//! └──────────────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────────────────────────────┐
//! │ engine: SyncEngine: layout change, block     │
//! │         hydration, save, cancel              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Edits made through `mosaic-editor` stay local; the engine pushes the
//! whole tree on an explicit save and lets the service answer with a
//! uuid map for blocks it had never seen. Everything network-facing is
//! behind the [`ComposerApi`] trait so the engine tests run against an
//! in-memory fake.

mod api;
mod engine;
mod wire;

pub use api::{ComposerApi, HttpComposerApi, SyncConfig, SyncError};
pub use engine::{CancelOutcome, SyncEngine, SyncState};
pub use wire::{
    BlockDoc, BlockRef, FormResult, LayoutDoc, LayoutSummary, RegionDef, RegionEntry, SaveRequest,
    SaveResponse,
};
