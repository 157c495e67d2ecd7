//! # Render Descriptions
//!
//! A pure function from context state to a declarative render tree.
//!
//! The core never touches a document surface: [`render`] describes what
//! should be on screen and the embedder reconciles it against whatever
//! rendering environment it has. This keeps every state transition
//! testable without one.

use crate::context::{AppContext, LayoutOption};
use crate::tabs::TrayState;
use mosaic_model::{category_counts, BlockPlugin, CategoryCount, TabId};
use serde::Serialize;

/// Complete description of the editor surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub tray: TrayNode,
    pub layout: LayoutNode,
    /// Unsaved-edits indicator.
    pub unsaved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrayNode {
    pub state: TrayState,
    pub tabs: Vec<TabNode>,
    /// The disclosed panel, present only while the tray is open.
    pub panel: Option<PanelNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabNode {
    pub id: TabId,
    pub title: String,
    pub active: bool,
    pub loading: bool,
}

/// Content of the open tray panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelNode {
    LayoutPicker {
        current: Option<LayoutOption>,
        options: Vec<LayoutOption>,
    },
    BlockPicker {
        categories: Vec<CategoryCount>,
        plugins: Vec<BlockPlugin>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub html: Option<String>,
    pub regions: Vec<RegionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionNode {
    pub name: String,
    pub label: String,
    pub active: bool,
    pub children: Vec<RegionChild>,
}

/// Region content interleaves drop targets with blocks while the editor
/// is active; inactive regions list bare blocks only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionChild {
    DropTarget { index: usize },
    Block(BlockNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockNode {
    pub uuid: String,
    pub label: String,
    pub html: Option<String>,
    pub active: bool,
    /// Transient cue set by the most recent move.
    pub highlighted: bool,
    /// Edit affordances, present only while active.
    pub affordances: Option<BlockAffordances>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockAffordances {
    pub can_step_up: bool,
    pub can_step_down: bool,
    /// Names of the regions the selector offers (all of them; choosing
    /// the current one is a no-op).
    pub region_options: Vec<String>,
}

/// Describe the full editor surface for the current context state.
pub fn render(ctx: &AppContext) -> RenderTree {
    RenderTree {
        tray: render_tray(ctx),
        layout: render_layout(ctx),
        unsaved: ctx.unsaved,
    }
}

fn render_tray(ctx: &AppContext) -> TrayNode {
    let tabs = ctx
        .tabs
        .iter()
        .map(|t| TabNode {
            id: t.id,
            title: t.title.clone(),
            active: t.active,
            loading: t.loading,
        })
        .collect();

    let panel = if ctx.tray == TrayState::Open {
        ctx.tabs
            .iter()
            .find(|t| t.active && t.id.has_panel())
            .map(|t| render_panel(ctx, t.id))
    } else {
        None
    };

    TrayNode {
        state: ctx.tray,
        tabs,
        panel,
    }
}

fn render_panel(ctx: &AppContext, id: TabId) -> PanelNode {
    match id {
        TabId::ChangeLayout => PanelNode::LayoutPicker {
            current: ctx.layout_options.iter().find(|o| o.current).cloned(),
            options: ctx
                .layout_options
                .iter()
                .filter(|o| !o.current)
                .cloned()
                .collect(),
        },
        _ => PanelNode::BlockPicker {
            categories: category_counts(&ctx.catalog),
            plugins: ctx.catalog.clone(),
        },
    }
}

fn render_layout(ctx: &AppContext) -> LayoutNode {
    let region_names: Vec<String> = ctx.layout.regions.keys().map(str::to_string).collect();

    let regions = ctx
        .layout
        .regions
        .iter()
        .map(|region| {
            let mut children = Vec::new();
            if ctx.active {
                children.push(RegionChild::DropTarget { index: 0 });
            }
            for (index, block) in region.blocks.iter().enumerate() {
                if ctx.active && index > 0 {
                    children.push(RegionChild::DropTarget { index });
                }
                children.push(RegionChild::Block(BlockNode {
                    uuid: block.uuid.clone(),
                    label: block.label.clone(),
                    html: block.html.clone(),
                    active: block.active,
                    highlighted: ctx.highlighted.as_deref() == Some(block.uuid.as_str()),
                    affordances: block.active.then(|| BlockAffordances {
                        can_step_up: index > 0,
                        can_step_down: index + 1 < region.blocks.len(),
                        region_options: region_names.clone(),
                    }),
                }));
            }
            RegionNode {
                name: region.name.clone(),
                label: region.label.clone(),
                active: region.active,
                children,
            }
        })
        .collect();

    LayoutNode {
        id: ctx.layout.id.clone(),
        html: ctx.layout.html.clone(),
        regions,
    }
}
