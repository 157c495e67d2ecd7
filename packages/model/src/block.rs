//! Block entity: a unit of content with stable identity.

use crate::collection::Keyed;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A content block placed in a region.
///
/// Owned by exactly one region's child collection at a time. The `uuid`
/// is the sole cross-component identity key; `plugin_id` is a catalog
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identity. Client-generated (v4) until the first save
    /// reconciles it against a server-assigned id.
    pub uuid: String,

    /// Catalog reference for the block kind.
    pub plugin_id: String,

    /// Human-readable label.
    pub label: String,

    /// Name of the owning region.
    pub region: String,

    /// Server-rendered markup fragment, lazily loaded.
    #[serde(default)]
    pub html: Option<String>,

    /// Edit-mode flag, broadcast from the application root.
    #[serde(default)]
    pub active: bool,

    /// True until the server has acknowledged this block on save.
    #[serde(default)]
    pub is_new: bool,
}

impl Block {
    /// A freshly added block with a client-temporary uuid.
    pub fn new(plugin_id: impl Into<String>, label: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            plugin_id: plugin_id.into(),
            label: label.into(),
            region: region.into(),
            html: None,
            active: false,
            is_new: true,
        }
    }

    /// A block already known to the server.
    pub fn existing(
        uuid: impl Into<String>,
        plugin_id: impl Into<String>,
        label: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            plugin_id: plugin_id.into(),
            label: label.into(),
            region: region.into(),
            html: None,
            active: false,
            is_new: false,
        }
    }

    pub fn has_html(&self) -> bool {
        self.html.is_some()
    }
}

impl Keyed for Block {
    fn key(&self) -> &str {
        &self.uuid
    }
}
