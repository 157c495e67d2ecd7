//! Block plugin catalog entries.

use crate::collection::Keyed;
use serde::{Deserialize, Serialize};

/// A block kind available to add from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlugin {
    /// Fully qualified plugin id (collection identity).
    pub plugin_id: String,

    /// Machine name of the block kind.
    pub id: String,

    /// Human-readable label.
    pub label: String,

    /// Catalog category used for grouping in the picker.
    pub category: String,

    /// Module or package providing the block.
    pub provider: String,
}

impl Keyed for BlockPlugin {
    fn key(&self) -> &str {
        &self.plugin_id
    }
}

/// A category and the number of plugins in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Group a catalog by category, in first-seen order.
pub fn category_counts(plugins: &[BlockPlugin]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for plugin in plugins {
        match counts.iter_mut().find(|c| c.name == plugin.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                name: plugin.category.clone(),
                count: 1,
            }),
        }
    }
    counts
}
