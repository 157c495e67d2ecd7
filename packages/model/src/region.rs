//! Region entity: a named placement slot within a layout.

use crate::block::Block;
use crate::collection::{Keyed, OrderedSet};
use serde::{Deserialize, Serialize};

/// A placement slot holding an ordered list of blocks.
///
/// Regions are defined by the layout and never reordered relative to
/// each other; only their block contents change order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Machine name, unique within a layout.
    pub name: String,

    /// Human-readable label.
    pub label: String,

    /// Ordered blocks in this region.
    #[serde(default = "OrderedSet::new")]
    pub blocks: OrderedSet<Block>,

    /// Edit-mode flag, broadcast from the application root.
    #[serde(default)]
    pub active: bool,
}

impl Region {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            blocks: OrderedSet::new(),
            active: false,
        }
    }
}

impl Keyed for Region {
    fn key(&self) -> &str {
        &self.name
    }
}
