//! # Tree Edits
//!
//! High-level semantic operations on the Layout → Region → Block tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each edit is one user gesture
//! 2. **Validated**: structural constraints are checked before mutating
//! 3. **Single notification**: a coordinated remove-then-insert emits
//!    exactly one change event, never two
//! 4. **Local**: no edit touches the network; the sync engine pushes
//!    the tree on explicit save
//!
//! ## Move semantics
//!
//! A free-form drop supplies its target index against the *pre-removal*
//! ordering of the target region (the index of the visual gap the user
//! dropped into). When source and target region coincide and the target
//! sits past the block's own position, removal shifts the tail left by
//! one, so the insertion index is adjusted down to land in that gap.
//! Dropping a block at its own position, or into the gap just after
//! itself, leaves the ordering unchanged.

use crate::context::AppContext;
use mosaic_model::{Block, BlockEvent, CollectionError, Direction, ModelEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic edit operations on the current layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    /// Insert a block into a region, at an index (default append).
    InsertBlock {
        block: Block,
        region: String,
        index: Option<usize>,
    },

    /// Remove a block, recording the deletion for the next save.
    RemoveBlock { uuid: String },

    /// Relocate a block to (region, index), index taken against the
    /// pre-removal ordering.
    MoveBlock {
        uuid: String,
        region: String,
        index: usize,
    },

    /// Move a block to the end of another region (selector mechanism).
    AssignRegion { uuid: String, region: String },

    /// Swap a block with its neighbor inside its own region.
    ShiftBlock { uuid: String, direction: Direction },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

impl Edit {
    /// Validate without applying.
    pub fn validate(&self, ctx: &AppContext) -> Result<(), EditError> {
        match self {
            Edit::InsertBlock { block, region, .. } => {
                Self::require_region(ctx, region)?;
                if ctx.layout.find_block(&block.uuid).is_some() {
                    return Err(EditError::Collection(CollectionError::DuplicateKey(
                        block.uuid.clone(),
                    )));
                }
                Ok(())
            }
            Edit::RemoveBlock { uuid } | Edit::ShiftBlock { uuid, .. } => {
                Self::require_block(ctx, uuid)?;
                Ok(())
            }
            Edit::MoveBlock { uuid, region, .. } | Edit::AssignRegion { uuid, region } => {
                Self::require_block(ctx, uuid)?;
                Self::require_region(ctx, region)?;
                Ok(())
            }
        }
    }

    /// Apply to the context tree with validation.
    ///
    /// Marks the session unsaved and emits the gesture's single change
    /// event; move-producing edits also set the highlight cue.
    pub fn apply(&self, ctx: &mut AppContext) -> Result<(), EditError> {
        self.validate(ctx)?;

        match self {
            Edit::InsertBlock {
                block,
                region,
                index,
            } => Self::apply_insert(ctx, block, region, *index),
            Edit::RemoveBlock { uuid } => Self::apply_remove(ctx, uuid),
            Edit::MoveBlock {
                uuid,
                region,
                index,
            } => Self::apply_move(ctx, uuid, region, *index),
            Edit::AssignRegion { uuid, region } => Self::apply_assign(ctx, uuid, region),
            Edit::ShiftBlock { uuid, direction } => Self::apply_shift(ctx, uuid, *direction),
        }
    }

    fn apply_insert(
        ctx: &mut AppContext,
        block: &Block,
        region_name: &str,
        index: Option<usize>,
    ) -> Result<(), EditError> {
        let active = ctx.active;
        let region = ctx
            .layout
            .regions
            .get_mut(region_name)
            .ok_or_else(|| EditError::RegionNotFound(region_name.to_string()))?;

        let mut block = block.clone();
        block.region = region_name.to_string();
        block.active = active;
        let uuid = block.uuid.clone();

        let at = index.unwrap_or(region.blocks.len());
        region.blocks.insert_at(block, at)?;
        let at = at.min(region.blocks.len() - 1);

        ctx.set_unsaved(true);
        ctx.bus.emit(ModelEvent::Block(BlockEvent::Inserted {
            uuid,
            region: region_name.to_string(),
            index: at,
        }));
        Ok(())
    }

    fn apply_remove(ctx: &mut AppContext, uuid: &str) -> Result<(), EditError> {
        let region_name = Self::owning_region(ctx, uuid)?;
        let region = ctx
            .layout
            .regions
            .get_mut(&region_name)
            .ok_or_else(|| EditError::RegionNotFound(region_name.clone()))?;

        let removed = region.blocks.remove(uuid)?;

        // Blocks the server has never seen need no deletion record.
        if !removed.is_new {
            ctx.deleted_blocks.push(removed.uuid.clone());
        }

        ctx.set_unsaved(true);
        ctx.bus.emit(ModelEvent::Block(BlockEvent::Removed {
            uuid: uuid.to_string(),
            region: region_name,
        }));
        Ok(())
    }

    fn apply_move(
        ctx: &mut AppContext,
        uuid: &str,
        target_name: &str,
        index: usize,
    ) -> Result<(), EditError> {
        let origin_name = Self::owning_region(ctx, uuid)?;

        // Silent removal: the gesture ends with exactly one event.
        let (block, from_index) = {
            let origin = ctx
                .layout
                .regions
                .get_mut(&origin_name)
                .ok_or_else(|| EditError::RegionNotFound(origin_name.clone()))?;
            let from_index = origin
                .blocks
                .position(uuid)
                .ok_or_else(|| EditError::BlockNotFound(uuid.to_string()))?;
            (origin.blocks.remove(uuid)?, from_index)
        };

        let target = ctx
            .layout
            .regions
            .get_mut(target_name)
            .ok_or_else(|| EditError::RegionNotFound(target_name.to_string()))?;

        let mut index = index.min(target.blocks.len());
        if origin_name == target_name && index > from_index {
            index -= 1;
        }

        let mut block = block;
        block.region = target_name.to_string();
        target.blocks.insert_at(block, index)?;

        ctx.set_unsaved(true);
        ctx.bus.emit(ModelEvent::Block(BlockEvent::Moved {
            uuid: uuid.to_string(),
            region: target_name.to_string(),
            index,
        }));
        ctx.set_highlight(uuid);
        Ok(())
    }

    fn apply_assign(ctx: &mut AppContext, uuid: &str, target_name: &str) -> Result<(), EditError> {
        let origin_name = Self::owning_region(ctx, uuid)?;
        if origin_name == target_name {
            // Selector pointing at the current region: nothing to do.
            return Ok(());
        }

        let end = ctx
            .layout
            .regions
            .get(target_name)
            .map(|r| r.blocks.len())
            .ok_or_else(|| EditError::RegionNotFound(target_name.to_string()))?;

        Edit::MoveBlock {
            uuid: uuid.to_string(),
            region: target_name.to_string(),
            index: end,
        }
        .apply(ctx)
    }

    fn apply_shift(
        ctx: &mut AppContext,
        uuid: &str,
        direction: Direction,
    ) -> Result<(), EditError> {
        let region_name = Self::owning_region(ctx, uuid)?;
        let region = ctx
            .layout
            .regions
            .get_mut(&region_name)
            .ok_or_else(|| EditError::RegionNotFound(region_name.clone()))?;

        let moved = region.blocks.shift(uuid, direction)?;
        if moved {
            ctx.set_unsaved(true);
            ctx.bus.emit(ModelEvent::Block(BlockEvent::Shifted {
                uuid: uuid.to_string(),
                direction,
            }));
            ctx.set_highlight(uuid);
        }
        Ok(())
    }

    fn owning_region(ctx: &AppContext, uuid: &str) -> Result<String, EditError> {
        ctx.layout
            .region_of(uuid)
            .map(str::to_string)
            .ok_or_else(|| EditError::BlockNotFound(uuid.to_string()))
    }

    fn require_block(ctx: &AppContext, uuid: &str) -> Result<(), EditError> {
        if ctx.layout.find_block(uuid).is_none() {
            return Err(EditError::BlockNotFound(uuid.to_string()));
        }
        Ok(())
    }

    fn require_region(ctx: &AppContext, name: &str) -> Result<(), EditError> {
        if !ctx.layout.regions.contains(name) {
            return Err(EditError::RegionNotFound(name.to_string()));
        }
        Ok(())
    }
}
