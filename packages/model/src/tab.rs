//! Tab entity: one of the fixed set of editor panels and actions.

use crate::collection::Keyed;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of tray tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    /// Toggles edit mode; no tray panel.
    Edit,
    /// Block catalog picker panel.
    ManageContent,
    /// Layout picker panel.
    ChangeLayout,
    /// Commits the draft; no tray panel.
    Save,
    /// Discards the draft; no tray panel.
    Cancel,
}

impl TabId {
    /// Whether activating this tab opens tray content.
    pub fn has_panel(self) -> bool {
        matches!(self, TabId::ManageContent | TabId::ChangeLayout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TabId::Edit => "edit",
            TabId::ManageContent => "manage_content",
            TabId::ChangeLayout => "change_layout",
            TabId::Save => "save",
            TabId::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tray tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,

    /// At most one tab is active at a time.
    #[serde(default)]
    pub active: bool,

    /// A loading tab ignores activation until loading clears.
    #[serde(default)]
    pub loading: bool,
}

impl Tab {
    pub fn new(id: TabId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            active: false,
            loading: false,
        }
    }
}

impl Keyed for Tab {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}
