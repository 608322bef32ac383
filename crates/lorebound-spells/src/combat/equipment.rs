//! Equipment slots and the per-actor equipment set
//!
//! Four armor slots carry continuous and defensive spells; the main hand
//! carries the weapon, bow, or tool.

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Equipment slots the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    MainHand,
    Head,
    Chest,
    Legs,
    Feet,
}

/// Armor slots in scan order
pub const ARMOR_SLOTS: [EquipmentSlot; 4] = [
    EquipmentSlot::Head,
    EquipmentSlot::Chest,
    EquipmentSlot::Legs,
    EquipmentSlot::Feet,
];

impl EquipmentSlot {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::MainHand => "Main Hand",
            Self::Head => "Head",
            Self::Chest => "Chest",
            Self::Legs => "Legs",
            Self::Feet => "Feet",
        }
    }

    /// Position in `ARMOR_SLOTS`, `None` for the main hand
    pub fn armor_index(self) -> Option<usize> {
        match self {
            Self::MainHand => None,
            Self::Head => Some(0),
            Self::Chest => Some(1),
            Self::Legs => Some(2),
            Self::Feet => Some(3),
        }
    }
}

/// An actor's equipped items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentSet {
    pub main_hand: Option<Item>,
    pub head: Option<Item>,
    pub chest: Option<Item>,
    pub legs: Option<Item>,
    pub feet: Option<Item>,
}

impl EquipmentSet {
    /// Create an empty equipment set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a reference to the item in a slot
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        match slot {
            EquipmentSlot::MainHand => self.main_hand.as_ref(),
            EquipmentSlot::Head => self.head.as_ref(),
            EquipmentSlot::Chest => self.chest.as_ref(),
            EquipmentSlot::Legs => self.legs.as_ref(),
            EquipmentSlot::Feet => self.feet.as_ref(),
        }
    }

    /// Get a mutable reference to the item slot
    pub fn get_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Item> {
        match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::Head => &mut self.head,
            EquipmentSlot::Chest => &mut self.chest,
            EquipmentSlot::Legs => &mut self.legs,
            EquipmentSlot::Feet => &mut self.feet,
        }
    }

    /// Put an item in a slot, returning the previous one
    pub fn equip(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.get_mut(slot).replace(item)
    }

    /// Unequip the item from a slot, returning it
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.get_mut(slot).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::item::ItemKind;

    #[test]
    fn test_armor_slot_order() {
        for (i, slot) in ARMOR_SLOTS.iter().enumerate() {
            assert_eq!(slot.armor_index(), Some(i));
        }
        assert_eq!(EquipmentSlot::MainHand.armor_index(), None);
    }

    #[test]
    fn test_equip_replaces_existing() {
        let mut set = EquipmentSet::new();
        assert!(set.equip(EquipmentSlot::Head, Item::new(1, "Cap", ItemKind::Armor)).is_none());
        let prev = set.equip(EquipmentSlot::Head, Item::new(2, "Helm", ItemKind::Armor));
        assert_eq!(prev.map(|i| i.name), Some("Cap".to_string()));
        assert_eq!(set.get(EquipmentSlot::Head).map(|i| i.name.as_str()), Some("Helm"));
    }

    #[test]
    fn test_unequip_roundtrip() {
        let mut set = EquipmentSet::new();
        set.equip(EquipmentSlot::Feet, Item::new(3, "Boots", ItemKind::Armor));
        assert!(set.unequip(EquipmentSlot::Feet).is_some());
        assert!(set.get(EquipmentSlot::Feet).is_none());
    }
}
