//! # Active-State Propagation
//!
//! Broadcasts the root `active` flag down the entity tree.
//!
//! This is a fan-out, not a negotiated transaction: there is no partial
//! activation. Events are emitted root-down (app, layout, each region
//! in order, each of its blocks in order) so a block's edit affordances
//! never render before its owning region's wrapper exists.

use crate::context::AppContext;
use mosaic_model::{AppEvent, BlockEvent, LayoutEvent, ModelEvent, RegionEvent};

/// Enable or disable the editor, propagating through the whole tree.
///
/// Setting the flag to its current value is a no-op.
pub fn set_active(ctx: &mut AppContext, active: bool) {
    if ctx.active == active {
        return;
    }
    ctx.active = active;
    ctx.bus
        .emit(ModelEvent::App(AppEvent::ActiveChanged { active }));

    propagate_tree(ctx, active);
}

/// Re-broadcast the current root flag through the tree.
///
/// Used after a layout change replaces the tree while the editor is
/// enabled: the fresh entities start inactive and need the flag.
pub fn reapply(ctx: &mut AppContext) {
    propagate_tree(ctx, ctx.active);
}

fn propagate_tree(ctx: &mut AppContext, active: bool) {
    ctx.layout.current = true;

    let layout_id = ctx.layout.id.clone();
    ctx.bus.emit(ModelEvent::Layout(LayoutEvent::ActiveChanged {
        id: layout_id,
        active,
    }));

    // Collect per-level changes first so events fire strictly after the
    // tree state is consistent, still in root-down order.
    let mut region_events = Vec::new();
    let mut block_events = Vec::new();
    for region in ctx.layout.regions.iter_mut() {
        region.active = active;
        region_events.push(RegionEvent::ActiveChanged {
            name: region.name.clone(),
            active,
        });
        for block in region.blocks.iter_mut() {
            block.active = active;
            block_events.push(BlockEvent::ActiveChanged {
                uuid: block.uuid.clone(),
                active,
            });
        }
    }

    for event in region_events {
        ctx.bus.emit(ModelEvent::Region(event));
    }
    for event in block_events {
        ctx.bus.emit(ModelEvent::Block(event));
    }
}
