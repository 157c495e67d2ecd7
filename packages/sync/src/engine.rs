//! # Synchronization Engine
//!
//! Optimistic draft reconciliation between one editing context and the
//! page-composition service.
//!
//! Edits stay client-local; the engine pushes the whole tree on an
//! explicit save and pulls layout/block documents on demand. Responses
//! carry a request generation: a response issued for a superseded
//! request is discarded instead of applied. Block hydration is
//! concurrent and unordered; each fragment is applied as it arrives,
//! with no barrier, and a failed fetch degrades only that block.

use crate::api::{ComposerApi, SyncError};
use crate::wire::{FormResult, LayoutDoc, SaveRequest};
use futures::stream::{FuturesUnordered, StreamExt};
use mosaic_editor::{reapply, AppContext, Edit, LayoutOption};
use mosaic_model::{Block, BlockEvent, Layout, LayoutEvent, ModelEvent, Region, TabId};

/// Where the engine is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No server interaction yet (fresh bootstrap).
    Unsynced,
    FetchingLayout,
    HydratingBlocks,
    Ready,
    Saving,
    Cancelling,
}

/// What the embedder must do after a successful cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The client tree is abandoned; reload the page to pick up the
    /// server's state. No reconciliation happens client-side.
    ReloadPage,
}

/// Sync driver over a [`ComposerApi`] implementation.
pub struct SyncEngine<A: ComposerApi> {
    api: A,
    state: SyncState,
    generation: u64,
}

impl<A: ComposerApi> SyncEngine<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: SyncState::Unsynced,
            generation: 0,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Refresh the layout picker cache.
    pub async fn fetch_layout_list(&mut self, ctx: &mut AppContext) -> Result<(), SyncError> {
        let summaries = self.api.layouts().await?;
        ctx.layout_options = summaries
            .into_iter()
            .map(|s| LayoutOption {
                id: s.id,
                label: s.label,
                current: s.current,
            })
            .collect();
        Ok(())
    }

    /// Refresh the block catalog cache.
    pub async fn fetch_catalog(&mut self, ctx: &mut AppContext) -> Result<(), SyncError> {
        ctx.catalog = self.api.block_plugins().await?;
        Ok(())
    }

    /// Switch the session to another layout.
    ///
    /// Fetches the layout document, replaces the tree, carries existing
    /// blocks forward into the new layout's first region (best-effort
    /// preservation, not layout-aware placement) and hydrates blocks
    /// that still lack markup. The ChangeLayout tab's loading flag is
    /// held for the duration, so a second swap is refused while one is
    /// in flight.
    pub async fn change_layout(&mut self, ctx: &mut AppContext, id: &str) -> Result<(), SyncError> {
        if ctx.tab(TabId::ChangeLayout).is_some_and(|t| t.loading) {
            return Err(SyncError::Busy);
        }
        ctx.set_tab_loading(TabId::ChangeLayout, true);
        let result = self.change_layout_inner(ctx, id).await;
        ctx.set_tab_loading(TabId::ChangeLayout, false);
        result
    }

    async fn change_layout_inner(
        &mut self,
        ctx: &mut AppContext,
        id: &str,
    ) -> Result<(), SyncError> {
        let generation = self.next_generation();
        self.state = SyncState::FetchingLayout;
        tracing::info!(layout = %id, "fetching layout");

        let doc = self.api.layout(id).await?;
        if !self.apply_layout_doc(ctx, generation, doc)? {
            return Ok(());
        }
        self.hydrate(ctx, generation).await
    }

    /// Hydrate every block of the current layout that lacks markup.
    ///
    /// Used after bootstrap, when the host page embedded blocks without
    /// their rendered fragments.
    pub async fn hydrate_missing(&mut self, ctx: &mut AppContext) -> Result<(), SyncError> {
        let generation = self.next_generation();
        self.hydrate(ctx, generation).await
    }

    /// Push the full tree to the service.
    ///
    /// On success the server's uuid map is applied to client-new blocks,
    /// the deletion list and unsaved flag are cleared, and the Save tab
    /// is released. On failure the Save tab keeps its loading guard and
    /// the error is returned; the local tree is untouched either way.
    pub async fn save(&mut self, ctx: &mut AppContext) -> Result<(), SyncError> {
        if ctx.tab(TabId::Save).is_some_and(|t| t.loading) {
            return Err(SyncError::Busy);
        }
        ctx.set_tab_loading(TabId::Save, true);
        self.state = SyncState::Saving;

        let request = SaveRequest::from_context(ctx);
        tracing::info!(
            layout = %request.id,
            deleted = request.deleted_blocks.len(),
            "saving draft"
        );
        let response = self.api.save_layout(&request).await?;

        for (old, new) in response.new_blocks {
            Self::remap_uuid(ctx, &old, new);
        }
        ctx.deleted_blocks.clear();
        ctx.set_unsaved(false);
        ctx.set_tab_active(TabId::Save, false);
        ctx.set_tab_loading(TabId::Save, false);
        self.state = SyncState::Ready;
        Ok(())
    }

    /// Discard the server-side draft.
    ///
    /// The local tree is abandoned rather than reconciled; the caller
    /// must reload the page. The Cancel tab keeps its loading guard for
    /// the remainder of the session.
    pub async fn cancel(&mut self, ctx: &mut AppContext) -> Result<CancelOutcome, SyncError> {
        if ctx.tab(TabId::Cancel).is_some_and(|t| t.loading) {
            return Err(SyncError::Busy);
        }
        ctx.set_tab_loading(TabId::Cancel, true);
        self.state = SyncState::Cancelling;
        tracing::info!("discarding draft");

        self.api.cancel().await?;
        Ok(CancelOutcome::ReloadPage)
    }

    /// Merge a finalized block description from the form subsystem:
    /// update the block in place when it already exists, insert it into
    /// its region otherwise.
    pub fn merge_form_result(
        &mut self,
        ctx: &mut AppContext,
        result: FormResult,
    ) -> Result<(), SyncError> {
        if let Some(block) = ctx.layout.find_block_mut(&result.uuid) {
            block.label = result.label;
            block.plugin_id = result.id;
            block.html = result.html;
            let uuid = result.uuid;
            ctx.set_unsaved(true);
            ctx.bus.emit(ModelEvent::Block(BlockEvent::HtmlLoaded {
                uuid: uuid.clone(),
            }));
            // The configure form offers the region options, so its
            // result may hand the block to another region.
            if ctx.layout.region_of(&uuid) != Some(result.region.as_str()) {
                Edit::AssignRegion {
                    uuid,
                    region: result.region,
                }
                .apply(ctx)?;
            }
            return Ok(());
        }

        let mut block = Block::existing(result.uuid, result.id, result.label, result.region.clone());
        block.html = result.html;
        block.is_new = result.new;
        Edit::InsertBlock {
            block,
            region: result.region,
            index: None,
        }
        .apply(ctx)?;
        Ok(())
    }

    // Replace the tree with a fetched layout document, carrying blocks
    // forward. Returns false when the response is stale.
    fn apply_layout_doc(
        &mut self,
        ctx: &mut AppContext,
        generation: u64,
        doc: LayoutDoc,
    ) -> Result<bool, SyncError> {
        if generation != self.generation {
            tracing::debug!(layout = %doc.id, "discarding stale layout response");
            return Ok(false);
        }

        let mut layout = Layout::new(doc.id.clone(), doc.label);
        layout.html = doc.html;
        for def in doc.regions {
            layout.regions.push(Region::new(def.name, def.label))?;
        }

        let previous = std::mem::replace(&mut ctx.layout, layout);

        // Best-effort block preservation, not layout-aware placement:
        // everything lands in the new layout's first region.
        match ctx.layout.regions.first().map(|r| r.name.clone()) {
            Some(first) => {
                for region in previous.regions {
                    for mut block in region.blocks {
                        block.region = first.clone();
                        if let Some(target) = ctx.layout.regions.first_mut() {
                            target.blocks.push(block)?;
                        }
                    }
                }
            }
            None => {
                if previous.block_count() > 0 {
                    tracing::warn!(layout = %doc.id, "dropping blocks: layout has no regions");
                }
            }
        }

        for option in ctx.layout_options.iter_mut() {
            option.current = option.id == doc.id;
        }

        ctx.bus
            .emit(ModelEvent::Layout(LayoutEvent::Replaced { id: doc.id }));
        if ctx.active {
            reapply(ctx);
        } else {
            ctx.layout.current = true;
        }
        ctx.set_unsaved(true);
        Ok(true)
    }

    // Fetch markup for every block lacking it, concurrently, applying
    // fragments in arrival order.
    async fn hydrate(&mut self, ctx: &mut AppContext, generation: u64) -> Result<(), SyncError> {
        self.state = SyncState::HydratingBlocks;

        let missing: Vec<String> = ctx
            .layout
            .regions
            .iter()
            .flat_map(|r| r.blocks.iter())
            .filter(|b| !b.has_html())
            .map(|b| b.uuid.clone())
            .collect();

        let api = &self.api;
        let mut fetches: FuturesUnordered<_> = missing
            .into_iter()
            .map(|uuid| async move {
                let result = api.block(&uuid).await;
                (uuid, result)
            })
            .collect();

        while let Some((uuid, result)) = fetches.next().await {
            if generation != self.generation {
                tracing::debug!(%uuid, "discarding stale block response");
                continue;
            }
            match result {
                Ok(doc) => match ctx.layout.find_block_mut(&uuid) {
                    Some(block) => {
                        block.html = doc.html;
                        ctx.bus
                            .emit(ModelEvent::Block(BlockEvent::HtmlLoaded { uuid }));
                    }
                    None => tracing::warn!(%uuid, "markup arrived for a removed block"),
                },
                // The block keeps its placeholder; no retry.
                Err(error) => tracing::warn!(%uuid, %error, "block fetch failed"),
            }
        }

        self.state = SyncState::Ready;
        Ok(())
    }

    fn remap_uuid(ctx: &mut AppContext, old: &str, new: String) {
        let Some(region_name) = ctx.layout.region_of(old).map(str::to_string) else {
            tracing::warn!(uuid = %old, "uuid remap for unknown block");
            return;
        };
        let Some(region) = ctx.layout.regions.get_mut(&region_name) else {
            return;
        };
        let Some(index) = region.blocks.position(old) else {
            return;
        };

        // The collection is keyed by uuid, so the rename is a
        // remove-then-reinsert at the same position.
        let Ok(mut block) = region.blocks.remove(old) else {
            return;
        };
        block.uuid = new.clone();
        block.is_new = false;
        if let Err(error) = region.blocks.insert_at(block, index) {
            tracing::warn!(uuid = %new, %error, "could not reinsert remapped block");
            return;
        }
        ctx.bus.emit(ModelEvent::Block(BlockEvent::UuidRemapped {
            old: old.to_string(),
            new,
        }));
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
