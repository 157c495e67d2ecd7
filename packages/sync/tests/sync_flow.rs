//! Engine flows against an in-memory composition service: save
//! round-trips, unordered block hydration, layout switching and draft
//! cancellation.

use async_trait::async_trait;
use mosaic_editor::{assign_region, AppContext, BootSettings, Edit};
use mosaic_model::{Block, BlockEvent, BlockPlugin, ModelEvent, TabId};
use mosaic_sync::{
    BlockDoc, CancelOutcome, ComposerApi, LayoutDoc, LayoutSummary, RegionDef, SaveRequest,
    SaveResponse, SyncEngine, SyncError, SyncState,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct FakeComposer {
    layouts: Vec<LayoutSummary>,
    layout_docs: HashMap<String, LayoutDoc>,
    blocks: HashMap<String, BlockDoc>,
    plugins: Vec<BlockPlugin>,
    save_response: SaveResponse,
    fail_save: bool,

    calls: Mutex<Vec<String>>,
    save_requests: Mutex<Vec<SaveRequest>>,

    // When set, the fetch for `gated` parks until `release` is served,
    // forcing a deterministic out-of-order arrival.
    gated: Option<String>,
    release: Option<String>,
    gate: Notify,
}

impl FakeComposer {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComposerApi for FakeComposer {
    async fn layouts(&self) -> Result<Vec<LayoutSummary>, SyncError> {
        self.record("layouts");
        Ok(self.layouts.clone())
    }

    async fn layout(&self, id: &str) -> Result<LayoutDoc, SyncError> {
        self.record(format!("layout:{id}"));
        self.layout_docs
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::Service(format!("no layout {id}")))
    }

    async fn block(&self, uuid: &str) -> Result<BlockDoc, SyncError> {
        self.record(format!("block:{uuid}"));
        if self.gated.as_deref() == Some(uuid) {
            self.gate.notified().await;
        }
        let doc = self
            .blocks
            .get(uuid)
            .cloned()
            .ok_or_else(|| SyncError::Service(format!("no block {uuid}")));
        if self.release.as_deref() == Some(uuid) {
            self.gate.notify_one();
        }
        doc
    }

    async fn block_plugins(&self) -> Result<Vec<BlockPlugin>, SyncError> {
        self.record("block_plugins");
        Ok(self.plugins.clone())
    }

    async fn save_layout(&self, request: &SaveRequest) -> Result<SaveResponse, SyncError> {
        self.record("save");
        if self.fail_save {
            return Err(SyncError::Service("draft rejected".to_string()));
        }
        self.save_requests.lock().unwrap().push(request.clone());
        Ok(self.save_response.clone())
    }

    async fn cancel(&self) -> Result<(), SyncError> {
        self.record("cancel");
        Ok(())
    }
}

fn boot(regions: serde_json::Value) -> AppContext {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let settings: BootSettings = serde_json::from_value(serde_json::json!({
        "layout_id": "twocol",
        "layout_label": "Two Column",
        "regions": regions,
    }))
    .unwrap();
    AppContext::bootstrap(settings)
}

fn block_doc(uuid: &str, html: &str) -> BlockDoc {
    BlockDoc {
        uuid: uuid.to_string(),
        label: uuid.to_string(),
        id: "plugin".to_string(),
        html: Some(html.to_string()),
    }
}

#[tokio::test]
async fn save_serializes_post_move_ordering() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "a",
            "label": "A",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin", "html": "<p>1</p>"},
                {"uuid": "b2", "label": "Two", "plugin_id": "plugin", "html": "<p>2</p>"}
            ]
        },
        {"name": "b", "label": "B"}
    ]));
    let mut engine = SyncEngine::new(FakeComposer::default());

    assign_region(&mut ctx, "b2", "b").unwrap();
    engine.save(&mut ctx).await.unwrap();

    let request = engine.api().save_requests.lock().unwrap()[0].clone();
    assert_eq!(request.id, "twocol");
    assert_eq!(request.region_collection[0].name, "a");
    let uuids: Vec<&str> = request.region_collection[0]
        .block_collection
        .iter()
        .map(|b| b.uuid.as_str())
        .collect();
    assert_eq!(uuids, vec!["b1"]);
    let uuids: Vec<&str> = request.region_collection[1]
        .block_collection
        .iter()
        .map(|b| b.uuid.as_str())
        .collect();
    assert_eq!(uuids, vec!["b2"]);

    assert!(!ctx.unsaved);
    assert!(!ctx.tab(TabId::Save).unwrap().loading);
    assert_eq!(engine.state(), SyncState::Ready);
}

#[tokio::test]
async fn save_applies_server_uuid_map_and_clears_deletions() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "a",
            "label": "A",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin", "html": "<p>1</p>"}
            ]
        }
    ]));

    let fresh = Block::new("plugin", "Fresh", "a");
    let tmp_uuid = fresh.uuid.clone();
    Edit::InsertBlock {
        block: fresh,
        region: "a".to_string(),
        index: Some(0),
    }
    .apply(&mut ctx)
    .unwrap();
    Edit::RemoveBlock {
        uuid: "b1".to_string(),
    }
    .apply(&mut ctx)
    .unwrap();
    assert_eq!(ctx.deleted_blocks, vec!["b1".to_string()]);

    let mut api = FakeComposer::default();
    api.save_response.new_blocks = HashMap::from([(tmp_uuid.clone(), "srv-1".to_string())]);
    let mut engine = SyncEngine::new(api);

    let remaps = Arc::new(Mutex::new(Vec::new()));
    let sink = remaps.clone();
    ctx.bus.subscribe(move |event| {
        if let ModelEvent::Block(BlockEvent::UuidRemapped { old, new }) = event {
            sink.lock().unwrap().push((old.clone(), new.clone()));
        }
    });

    engine.save(&mut ctx).await.unwrap();

    let region = ctx.layout.regions.get("a").unwrap();
    assert_eq!(region.blocks.position("srv-1"), Some(0));
    assert!(!region.blocks.contains(&tmp_uuid));
    assert!(!region.blocks.get("srv-1").unwrap().is_new);

    assert_eq!(*remaps.lock().unwrap(), vec![(tmp_uuid, "srv-1".to_string())]);
    assert!(ctx.deleted_blocks.is_empty());
    assert!(!ctx.tab(TabId::Save).unwrap().active);
}

#[tokio::test]
async fn failed_save_keeps_loading_guard_engaged() {
    let mut ctx = boot(serde_json::json!([{"name": "a", "label": "A"}]));
    let mut engine = SyncEngine::new(FakeComposer {
        fail_save: true,
        ..FakeComposer::default()
    });

    let error = engine.save(&mut ctx).await.unwrap_err();
    assert!(matches!(error, SyncError::Service(_)));
    assert!(ctx.tab(TabId::Save).unwrap().loading);
    assert_eq!(engine.state(), SyncState::Saving);

    // The guard refuses a second attempt without touching the service.
    assert!(matches!(
        engine.save(&mut ctx).await.unwrap_err(),
        SyncError::Busy
    ));
    assert_eq!(engine.api().calls(), vec!["save"]);
}

#[tokio::test]
async fn hydration_applies_fragments_in_arrival_order() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "top",
            "label": "Top",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin"},
                {"uuid": "b2", "label": "Two", "plugin_id": "plugin"}
            ]
        }
    ]));

    // b1's response parks until b2's has been served.
    let mut api = FakeComposer::default();
    api.blocks.insert("b1".to_string(), block_doc("b1", "<p>1</p>"));
    api.blocks.insert("b2".to_string(), block_doc("b2", "<p>2</p>"));
    api.gated = Some("b1".to_string());
    api.release = Some("b2".to_string());
    let mut engine = SyncEngine::new(api);

    let loaded = Arc::new(Mutex::new(Vec::new()));
    let sink = loaded.clone();
    ctx.bus.subscribe(move |event| {
        if let ModelEvent::Block(BlockEvent::HtmlLoaded { uuid }) = event {
            sink.lock().unwrap().push(uuid.clone());
        }
    });

    engine.hydrate_missing(&mut ctx).await.unwrap();

    // Fragments landed out of order; the tree order is untouched.
    assert_eq!(*loaded.lock().unwrap(), vec!["b2", "b1"]);
    let top = ctx.layout.regions.get("top").unwrap();
    assert_eq!(top.blocks.keys().collect::<Vec<_>>(), vec!["b1", "b2"]);
    assert_eq!(top.blocks.get("b1").unwrap().html.as_deref(), Some("<p>1</p>"));
    assert_eq!(top.blocks.get("b2").unwrap().html.as_deref(), Some("<p>2</p>"));
    assert_eq!(engine.state(), SyncState::Ready);
}

#[tokio::test]
async fn failed_block_fetch_degrades_only_that_block() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "top",
            "label": "Top",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin"},
                {"uuid": "b2", "label": "Two", "plugin_id": "plugin"}
            ]
        }
    ]));

    let mut api = FakeComposer::default();
    api.blocks.insert("b1".to_string(), block_doc("b1", "<p>1</p>"));
    let mut engine = SyncEngine::new(api);

    engine.hydrate_missing(&mut ctx).await.unwrap();

    assert!(ctx.layout.find_block("b1").unwrap().has_html());
    assert!(!ctx.layout.find_block("b2").unwrap().has_html());
    assert_eq!(engine.state(), SyncState::Ready);
}

#[tokio::test]
async fn change_layout_fetches_replaces_and_hydrates() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "top",
            "label": "Top",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin", "html": "<p>1</p>"}
            ]
        },
        {
            "name": "bottom",
            "label": "Bottom",
            "blocks": [
                {"uuid": "b2", "label": "Two", "plugin_id": "plugin"}
            ]
        }
    ]));
    mosaic_editor::set_active(&mut ctx, true);

    let mut api = FakeComposer::default();
    api.layout_docs.insert(
        "onecol".to_string(),
        LayoutDoc {
            id: "onecol".to_string(),
            label: "One Column".to_string(),
            current: false,
            html: Some("<div/>".to_string()),
            regions: vec![RegionDef {
                name: "content".to_string(),
                label: "Content".to_string(),
            }],
        },
    );
    api.blocks.insert("b2".to_string(), block_doc("b2", "<p>2</p>"));
    let mut engine = SyncEngine::new(api);
    ctx.layout_options = vec![
        mosaic_editor::LayoutOption {
            id: "twocol".to_string(),
            label: "Two Column".to_string(),
            current: true,
        },
        mosaic_editor::LayoutOption {
            id: "onecol".to_string(),
            label: "One Column".to_string(),
            current: false,
        },
    ];

    engine.change_layout(&mut ctx, "onecol").await.unwrap();

    assert_eq!(ctx.layout.id, "onecol");
    assert!(ctx.layout.current);
    assert!(ctx.unsaved);

    // Both blocks carried into the only region; the editor stayed on.
    let content = ctx.layout.regions.get("content").unwrap();
    assert_eq!(content.blocks.keys().collect::<Vec<_>>(), vec!["b1", "b2"]);
    assert!(content.active);
    assert!(content.blocks.iter().all(|b| b.active));

    // Only the fragment that was missing got fetched, and the tab's
    // guard was released on completion.
    assert_eq!(engine.api().calls(), vec!["layout:onecol", "block:b2"]);
    assert!(!ctx.tab(TabId::ChangeLayout).unwrap().loading);
    assert_eq!(
        ctx.layout.find_block("b2").unwrap().html.as_deref(),
        Some("<p>2</p>")
    );

    // The picker cache follows the current layout.
    let current: Vec<&str> = ctx
        .layout_options
        .iter()
        .filter(|o| o.current)
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(current, vec!["onecol"]);
}

#[tokio::test]
async fn layout_swap_guard_blocks_reentry_and_releases() {
    let mut ctx = boot(serde_json::json!([{"name": "a", "label": "A"}]));
    let mut engine = SyncEngine::new(FakeComposer::default());

    // While a swap is in flight the tab is loading; a second swap is
    // refused without touching the service.
    ctx.set_tab_loading(TabId::ChangeLayout, true);
    assert!(matches!(
        engine.change_layout(&mut ctx, "onecol").await.unwrap_err(),
        SyncError::Busy
    ));
    assert!(engine.api().calls().is_empty());
    ctx.set_tab_loading(TabId::ChangeLayout, false);

    // A failed fetch releases the guard and leaves the tree untouched.
    let error = engine.change_layout(&mut ctx, "missing").await.unwrap_err();
    assert!(matches!(error, SyncError::Service(_)));
    assert!(!ctx.tab(TabId::ChangeLayout).unwrap().loading);
    assert_eq!(ctx.layout.id, "twocol");
}

#[tokio::test]
async fn cancel_sends_only_the_discard_call() {
    let mut ctx = boot(serde_json::json!([{"name": "a", "label": "A"}]));
    let mut engine = SyncEngine::new(FakeComposer::default());

    let outcome = engine.cancel(&mut ctx).await.unwrap();

    assert_eq!(outcome, CancelOutcome::ReloadPage);
    assert_eq!(engine.api().calls(), vec!["cancel"]);

    // The guard stays engaged: the page reload is what resets it.
    assert!(ctx.tab(TabId::Cancel).unwrap().loading);
    assert!(matches!(
        engine.cancel(&mut ctx).await.unwrap_err(),
        SyncError::Busy
    ));
    assert_eq!(engine.api().calls(), vec!["cancel"]);
}

#[tokio::test]
async fn picker_caches_fill_from_the_service() {
    let mut ctx = boot(serde_json::json!([{"name": "a", "label": "A"}]));
    let mut api = FakeComposer::default();
    api.layouts = vec![
        LayoutSummary {
            id: "twocol".to_string(),
            label: "Two Column".to_string(),
            current: true,
        },
        LayoutSummary {
            id: "onecol".to_string(),
            label: "One Column".to_string(),
            current: false,
        },
    ];
    api.plugins = vec![BlockPlugin {
        plugin_id: "views:news".to_string(),
        id: "news".to_string(),
        label: "News".to_string(),
        category: "Lists".to_string(),
        provider: "views".to_string(),
    }];
    let mut engine = SyncEngine::new(api);

    engine.fetch_layout_list(&mut ctx).await.unwrap();
    engine.fetch_catalog(&mut ctx).await.unwrap();

    assert_eq!(ctx.layout_options.len(), 2);
    assert!(ctx.layout_options[0].current);
    assert_eq!(ctx.catalog[0].plugin_id, "views:news");
}

#[tokio::test]
async fn merge_form_result_inserts_and_updates() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "a",
            "label": "A",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin", "html": "<p>1</p>"}
            ]
        },
        {"name": "b", "label": "B"}
    ]));
    let mut engine = SyncEngine::new(FakeComposer::default());

    // A finished add form delivers a brand-new block.
    engine
        .merge_form_result(
            &mut ctx,
            serde_json::from_value(serde_json::json!({
                "uuid": "b9",
                "label": "Nine",
                "id": "plugin",
                "region": "a",
                "html": "<p>9</p>",
                "new": true
            }))
            .unwrap(),
        )
        .unwrap();

    let nine = ctx.layout.find_block("b9").unwrap();
    assert!(nine.is_new);
    assert_eq!(nine.html.as_deref(), Some("<p>9</p>"));
    assert!(ctx.unsaved);

    // A finished configure form updates in place.
    engine
        .merge_form_result(
            &mut ctx,
            serde_json::from_value(serde_json::json!({
                "uuid": "b1",
                "label": "One, renamed",
                "id": "plugin",
                "region": "a",
                "html": "<p>1'</p>"
            }))
            .unwrap(),
        )
        .unwrap();

    let one = ctx.layout.find_block("b1").unwrap();
    assert_eq!(one.label, "One, renamed");
    assert_eq!(one.html.as_deref(), Some("<p>1'</p>"));
    assert_eq!(ctx.layout.regions.get("a").unwrap().blocks.len(), 2);
}

#[tokio::test]
async fn form_result_can_reassign_the_region() {
    let mut ctx = boot(serde_json::json!([
        {
            "name": "a",
            "label": "A",
            "blocks": [
                {"uuid": "b1", "label": "One", "plugin_id": "plugin", "html": "<p>1</p>"}
            ]
        },
        {"name": "b", "label": "B"}
    ]));
    let mut engine = SyncEngine::new(FakeComposer::default());

    // The configure form offered the region options and the user picked
    // the other one.
    engine
        .merge_form_result(
            &mut ctx,
            serde_json::from_value(serde_json::json!({
                "uuid": "b1",
                "label": "One",
                "id": "plugin",
                "region": "b",
                "html": "<p>1</p>"
            }))
            .unwrap(),
        )
        .unwrap();

    assert_eq!(ctx.layout.region_of("b1"), Some("b"));
    assert_eq!(ctx.layout.find_block("b1").unwrap().region, "b");
    assert!(ctx.layout.regions.get("a").unwrap().blocks.is_empty());
    assert!(ctx.unsaved);
}
