//! # Wire Documents
//!
//! Serde types for the page-composition service's JSON contract.
//!
//! Field casing follows the service (camelCase collection keys on the
//! save payload). The save payload carries ordering implicitly: region
//! and block weights are the positions of the entries in their arrays.

use mosaic_editor::AppContext;
use mosaic_model::Block;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the layout listing (`GET {root}/layouts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub current: bool,
}

/// Region shape inside a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDef {
    pub name: String,
    pub label: String,
}

/// Full layout document (`GET {root}/layouts/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDoc {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub regions: Vec<RegionDef>,
}

/// Rendered block document (`GET {root}/blocks/{uuid}`).
///
/// `id` is the catalog plugin id, per the service's naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDoc {
    pub uuid: String,
    pub label: String,
    pub id: String,
    #[serde(default)]
    pub html: Option<String>,
}

/// A block's placement inside the save payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRef {
    pub uuid: String,
    pub id: String,
    pub label: String,
    pub region: String,
}

impl From<&Block> for BlockRef {
    fn from(block: &Block) -> Self {
        Self {
            uuid: block.uuid.clone(),
            id: block.plugin_id.clone(),
            label: block.label.clone(),
            region: block.region.clone(),
        }
    }
}

/// One region and its ordered blocks inside the save payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    pub name: String,
    pub block_collection: Vec<BlockRef>,
}

/// Full-tree save payload (`PUT {root}/layouts/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub id: String,
    pub region_collection: Vec<RegionEntry>,
    pub deleted_blocks: Vec<String>,
}

impl SaveRequest {
    /// Serialize the context's current tree and pending deletions.
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            id: ctx.layout.id.clone(),
            region_collection: ctx
                .layout
                .regions
                .iter()
                .map(|region| RegionEntry {
                    name: region.name.clone(),
                    block_collection: region.blocks.iter().map(BlockRef::from).collect(),
                })
                .collect(),
            deleted_blocks: ctx.deleted_blocks.clone(),
        }
    }
}

/// Save acknowledgement: client-temporary uuid → server-assigned uuid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    #[serde(default)]
    pub new_blocks: HashMap<String, String>,
}

/// Finalized block description handed back by the external form
/// subsystem when a block add/configure form completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResult {
    pub uuid: String,
    pub label: String,
    pub id: String,
    pub region: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub new: bool,
}
