//! # Application Context
//!
//! The single root object for an editing session.
//!
//! Replaces the ambient application singleton of classic in-place
//! editors: constructed once by the embedder and passed explicitly to
//! the tab multiplexer, the reorder controller and the sync engine.

use crate::tabs::TrayState;
use mosaic_model::{
    AppEvent, Block, BlockEvent, BlockPlugin, EventBus, Layout, ModelEvent, OrderedSet, Region,
    Tab, TabEvent, TabId,
};
use serde::{Deserialize, Serialize};

/// One entry in the layout picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub current: bool,
}

/// Initial hydration document supplied by the host page.
///
/// Mirrors the settings blob the composition service embeds alongside
/// the rendered page: the current layout and its regions, each with the
/// blocks that are already on screen (markup included when the server
/// rendered them in place).
#[derive(Debug, Clone, Deserialize)]
pub struct BootSettings {
    pub layout_id: String,
    pub layout_label: String,
    #[serde(default)]
    pub regions: Vec<BootRegion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootRegion {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub blocks: Vec<BootBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootBlock {
    pub uuid: String,
    pub label: String,
    pub plugin_id: String,
    #[serde(default)]
    pub html: Option<String>,
}

/// Root state of one editing session.
pub struct AppContext {
    /// Editor enabled/disabled. Propagates to the whole tree.
    pub active: bool,

    /// The current layout. Exactly one per session.
    pub layout: Layout,

    /// The fixed tray tabs.
    pub tabs: OrderedSet<Tab>,

    /// Tray disclosure state, owned here so rendering can see it.
    pub tray: TrayState,

    /// Uuids deleted locally, sent with the next save.
    pub deleted_blocks: Vec<String>,

    /// Whether local edits diverge from the server draft.
    pub unsaved: bool,

    /// Transient cue on the most recently moved block.
    pub highlighted: Option<String>,

    /// Cached layout picker entries.
    pub layout_options: Vec<LayoutOption>,

    /// Cached block catalog.
    pub catalog: Vec<BlockPlugin>,

    /// Subscription registry for typed change events.
    pub bus: EventBus,
}

impl AppContext {
    /// Context over an already-assembled layout, with the standard tabs.
    pub fn new(mut layout: Layout) -> Self {
        layout.current = true;
        Self {
            active: false,
            layout,
            tabs: Self::standard_tabs(),
            tray: TrayState::Closed,
            deleted_blocks: Vec::new(),
            unsaved: false,
            highlighted: None,
            layout_options: Vec::new(),
            catalog: Vec::new(),
            bus: EventBus::new(),
        }
    }

    /// Assemble the initial tree from the host page's settings document.
    pub fn bootstrap(settings: BootSettings) -> Self {
        let mut layout = Layout::new(settings.layout_id, settings.layout_label);
        for boot_region in settings.regions {
            let mut region = Region::new(boot_region.name.clone(), boot_region.label);
            for boot_block in boot_region.blocks {
                let mut block = Block::existing(
                    boot_block.uuid,
                    boot_block.plugin_id,
                    boot_block.label,
                    boot_region.name.clone(),
                );
                block.html = boot_block.html;
                if let Err(e) = region.blocks.push(block) {
                    tracing::warn!(region = %region.name, error = %e, "skipping block during bootstrap");
                }
            }
            if let Err(e) = layout.regions.push(region) {
                tracing::warn!(error = %e, "skipping region during bootstrap");
            }
        }
        Self::new(layout)
    }

    fn standard_tabs() -> OrderedSet<Tab> {
        [
            Tab::new(TabId::Edit, "Edit"),
            Tab::new(TabId::ManageContent, "Manage Content"),
            Tab::new(TabId::ChangeLayout, "Change Layout"),
            Tab::new(TabId::Save, "Save"),
            Tab::new(TabId::Cancel, "Cancel"),
        ]
        .into_iter()
        .collect()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(id.as_str())
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(id.as_str())
    }

    /// The currently active tab, if any.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    /// Flip a tab's loading flag, notifying observers.
    ///
    /// Unknown tabs are a defensive no-op.
    pub fn set_tab_loading(&mut self, id: TabId, loading: bool) {
        match self.tabs.get_mut(id.as_str()) {
            Some(tab) if tab.loading != loading => {
                tab.loading = loading;
                self.bus
                    .emit(ModelEvent::Tab(TabEvent::LoadingChanged { id, loading }));
            }
            Some(_) => {}
            None => tracing::warn!(tab = %id, "loading toggle for unknown tab"),
        }
    }

    /// Flip a tab's active flag, notifying observers.
    pub fn set_tab_active(&mut self, id: TabId, active: bool) {
        match self.tabs.get_mut(id.as_str()) {
            Some(tab) if tab.active != active => {
                tab.active = active;
                self.bus
                    .emit(ModelEvent::Tab(TabEvent::ActiveChanged { id, active }));
            }
            Some(_) => {}
            None => tracing::warn!(tab = %id, "active toggle for unknown tab"),
        }
    }

    /// Flip the unsaved-edits indicator, notifying observers on change.
    pub fn set_unsaved(&mut self, unsaved: bool) {
        if self.unsaved != unsaved {
            self.unsaved = unsaved;
            self.bus
                .emit(ModelEvent::App(AppEvent::UnsavedChanged { unsaved }));
        }
    }

    /// Record the transient highlight cue on a moved block.
    pub fn set_highlight(&mut self, uuid: impl Into<String>) {
        let uuid = uuid.into();
        self.highlighted = Some(uuid.clone());
        self.bus
            .emit(ModelEvent::Block(BlockEvent::Highlighted { uuid }));
    }

    /// Consume the highlight cue. Embedders call this after playing the
    /// cue once so the next render comes out clean; until then the cue
    /// is only replaced by the next move.
    pub fn take_highlight(&mut self) -> Option<String> {
        self.highlighted.take()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("active", &self.active)
            .field("layout", &self.layout.id)
            .field("tray", &self.tray)
            .field("unsaved", &self.unsaved)
            .field("deleted_blocks", &self.deleted_blocks.len())
            .finish()
    }
}
