//! # Drag/Reorder Controller
//!
//! Computes move targets for blocks and applies the three move
//! mechanisms. All of them end in the same postcondition, a block
//! relocated to a specific index of a specific region, and all are
//! purely client-local: no network traffic until an explicit save.

use crate::context::AppContext;
use crate::edits::{Edit, EditError};
use mosaic_model::{Direction, Layout};
use serde::Serialize;

/// A droppable gap: before the block at `index` in `region`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTarget {
    pub region: String,
    pub index: usize,
}

/// Enumerate the drop targets the layout offers: one immediately before
/// each block, plus one at each region's head (the head target doubles
/// as the sole target of an empty region). Appending to a region's tail
/// goes through the region selector instead.
pub fn drop_targets(layout: &Layout) -> Vec<DropTarget> {
    let mut targets = Vec::new();
    for region in layout.regions.iter() {
        for index in 0..region.blocks.len().max(1) {
            targets.push(DropTarget {
                region: region.name.clone(),
                index,
            });
        }
    }
    targets
}

/// Free-form drop: relocate `uuid` into the gap the target describes.
///
/// The target index refers to the pre-removal ordering; the edit layer
/// accounts for the removal shift on same-region moves.
pub fn drop_block(ctx: &mut AppContext, uuid: &str, target: &DropTarget) -> Result<(), EditError> {
    Edit::MoveBlock {
        uuid: uuid.to_string(),
        region: target.region.clone(),
        index: target.index,
    }
    .apply(ctx)
}

/// Stepper mechanism: swap the block with its neighbor.
pub fn step_block(ctx: &mut AppContext, uuid: &str, direction: Direction) -> Result<(), EditError> {
    Edit::ShiftBlock {
        uuid: uuid.to_string(),
        direction,
    }
    .apply(ctx)
}

/// Region-selector mechanism: append the block to the chosen region.
pub fn assign_region(ctx: &mut AppContext, uuid: &str, region: &str) -> Result<(), EditError> {
    Edit::AssignRegion {
        uuid: uuid.to_string(),
        region: region.to_string(),
    }
    .apply(ctx)
}
