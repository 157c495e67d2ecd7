//! Layout entity: a named arrangement of regions.

use crate::block::Block;
use crate::collection::{Keyed, OrderedSet};
use crate::region::Region;
use serde::{Deserialize, Serialize};

/// A named arrangement of regions. Exactly one layout is current per
/// editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Layout machine name.
    pub id: String,

    /// Human-readable label.
    pub label: String,

    /// Whether this is the session's current layout.
    #[serde(default)]
    pub current: bool,

    /// Wrapping markup, fetched once with the layout document.
    #[serde(default)]
    pub html: Option<String>,

    /// Ordered regions contained in this layout.
    #[serde(default = "OrderedSet::new")]
    pub regions: OrderedSet<Region>,
}

impl Layout {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            current: false,
            html: None,
            regions: OrderedSet::new(),
        }
    }

    /// Name of the region owning the given block, if any.
    pub fn region_of(&self, uuid: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.blocks.contains(uuid))
            .map(|r| r.name.as_str())
    }

    pub fn find_block(&self, uuid: &str) -> Option<&Block> {
        self.regions.iter().find_map(|r| r.blocks.get(uuid))
    }

    pub fn find_block_mut(&mut self, uuid: &str) -> Option<&mut Block> {
        self.regions.iter_mut().find_map(|r| r.blocks.get_mut(uuid))
    }

    /// All block uuids in region order, then block order.
    pub fn block_uuids(&self) -> Vec<String> {
        self.regions
            .iter()
            .flat_map(|r| r.blocks.iter().map(|b| b.uuid.clone()))
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.regions.iter().map(|r| r.blocks.len()).sum()
    }
}

impl Keyed for Layout {
    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with_blocks() -> Layout {
        let mut layout = Layout::new("twocol", "Two Column");
        let mut top = Region::new("top", "Top");
        top.blocks
            .push(Block::existing("b1", "plugin_a", "A", "top"))
            .unwrap();
        top.blocks
            .push(Block::existing("b2", "plugin_b", "B", "top"))
            .unwrap();
        let bottom = Region::new("bottom", "Bottom");
        layout.regions.push(top).unwrap();
        layout.regions.push(bottom).unwrap();
        layout
    }

    #[test]
    fn region_of_finds_owning_region() {
        let layout = layout_with_blocks();
        assert_eq!(layout.region_of("b2"), Some("top"));
        assert_eq!(layout.region_of("nope"), None);
    }

    #[test]
    fn block_uuids_follow_region_then_block_order() {
        let layout = layout_with_blocks();
        assert_eq!(layout.block_uuids(), vec!["b1", "b2"]);
        assert_eq!(layout.block_count(), 2);
    }
}
