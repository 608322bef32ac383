//! Item data model
//!
//! Items carry their spells as lore lines.

use lorebound_core::ItemId;
use serde::{Deserialize, Serialize};

/// What sort of item this is; decides which spell table it rolls from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Armor,
    Bow,
    Tool,
    Other,
}

impl ItemKind {
    /// Maximum spell lines an item of this kind can hold
    pub fn max_lore_lines(self) -> usize {
        match self {
            Self::Weapon => 3,
            Self::Armor => 1,
            Self::Bow => 2,
            Self::Tool => 1,
            Self::Other => 0,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Weapon => "Weapon",
            Self::Armor => "Armor",
            Self::Bow => "Bow",
            Self::Tool => "Tool",
            Self::Other => "Other",
        }
    }
}

/// A game item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Spell tokens, one per line
    #[serde(default)]
    pub lore: Vec<String>,
}

impl Item {
    /// Create an item with no lore
    pub fn new(id: u64, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            kind,
            lore: Vec::new(),
        }
    }

    /// Builder-style helper to attach lore lines
    pub fn with_lore<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lore = lines.into_iter().map(Into::into).collect();
        self
    }

    /// First lore line, the only one armor spells read
    pub fn first_lore(&self) -> Option<&str> {
        self.lore.first().map(|s| s.as_str())
    }

    /// Whether another spell line fits
    pub fn has_lore_room(&self) -> bool {
        self.lore.len() < self.kind.max_lore_lines()
    }
}
