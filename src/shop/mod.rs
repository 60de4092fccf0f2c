//! Merchant catalog, purchase rules and equipment

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hero::{Attributes, StatBonus};
use crate::store::inventory::InventoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
    Consumable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub price: u32,
    pub min_level: u32,
    pub stat_bonus: StatBonus,
    pub description: &'static str,
    pub image_url: &'static str,
}

const fn bonus(str: u32, sta: u32, will: u32) -> StatBonus {
    StatBonus { str, sta, will }
}

static CATALOG: [ShopItem; 5] = [
    ShopItem {
        id: "s-1",
        name: "Protein Potion",
        item_type: ItemType::Consumable,
        rarity: Rarity::Common,
        price: 50,
        min_level: 1,
        stat_bonus: bonus(0, 0, 0),
        description: "Instantly restores energy and boosts recovery.",
        image_url: "https://picsum.photos/seed/potion/100/100",
    },
    ShopItem {
        id: "s-4",
        name: "Chalk of Grip",
        item_type: ItemType::Consumable,
        rarity: Rarity::Common,
        price: 25,
        min_level: 1,
        stat_bonus: bonus(0, 0, 0),
        description: "Never let go. Increases grip strength for one session.",
        image_url: "https://picsum.photos/seed/chalk/100/100",
    },
    ShopItem {
        id: "s-2",
        name: "Iron Belt",
        item_type: ItemType::Accessory,
        rarity: Rarity::Rare,
        price: 350,
        min_level: 5,
        stat_bonus: bonus(5, 0, 0),
        description: "Increases core stability. Adds +5 STR.",
        image_url: "https://picsum.photos/seed/belt/100/100",
    },
    ShopItem {
        id: "s-3",
        name: "Berserker Wraps",
        item_type: ItemType::Weapon,
        rarity: Rarity::Epic,
        price: 800,
        min_level: 10,
        stat_bonus: bonus(3, 0, 8),
        description: "Wrist wraps infused with ancient rage.",
        image_url: "https://picsum.photos/seed/wraps/100/100",
    },
    ShopItem {
        id: "s-5",
        name: "Golden Dumbbell",
        item_type: ItemType::Weapon,
        rarity: Rarity::Legendary,
        price: 2500,
        min_level: 20,
        stat_bonus: bonus(15, 0, 0),
        description: "Forged in the heart of a dying star.",
        image_url: "https://picsum.photos/seed/golddumb/100/100",
    },
];

pub fn catalog() -> &'static [ShopItem] {
    &CATALOG
}

pub fn find_item(id: &str) -> Option<&'static ShopItem> {
    CATALOG.iter().find(|item| item.id == id)
}

/// A catalog item as one hero sees it
#[derive(Debug, Clone, Serialize)]
pub struct ShopListing {
    #[serde(flatten)]
    pub item: &'static ShopItem,
    /// Hero level below the item's tier
    pub locked: bool,
    pub affordable: bool,
}

pub fn listing(level: u32, gold: u32) -> Vec<ShopListing> {
    CATALOG
        .iter()
        .map(|item| ShopListing {
            item,
            locked: level < item.min_level,
            affordable: gold >= item.price,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Requires level {required}")]
    LevelTooLow { required: u32 },

    #[error("Not enough gold! Need {price}, have {gold}")]
    NotEnoughGold { price: u32, gold: u32 },

    #[error("Item is not in your inventory")]
    NotOwned,

    #[error("Consumables cannot be equipped")]
    NotEquippable,
}

/// Check a purchase and return the hero's remaining gold
pub fn check_purchase(level: u32, gold: u32, item: &ShopItem) -> Result<u32, ShopError> {
    if level < item.min_level {
        return Err(ShopError::LevelTooLow {
            required: item.min_level,
        });
    }
    gold.checked_sub(item.price).ok_or(ShopError::NotEnoughGold {
        price: item.price,
        gold,
    })
}

/// Inventory writes needed to toggle one entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EquipPlan {
    pub equip: Option<Uuid>,
    pub unequip: Vec<Uuid>,
}

/// Toggle an owned entry. Equipping takes the slot from any other equipped
/// item of the same type.
pub fn plan_toggle(inventory: &[InventoryEntry], entry_id: Uuid) -> Result<EquipPlan, ShopError> {
    let entry = inventory
        .iter()
        .find(|e| e.id == entry_id)
        .ok_or(ShopError::NotOwned)?;

    if entry.is_equipped {
        return Ok(EquipPlan {
            equip: None,
            unequip: vec![entry.id],
        });
    }

    let item = find_item(&entry.item_id).ok_or_else(|| ShopError::UnknownItem(entry.item_id.clone()))?;
    if item.item_type == ItemType::Consumable {
        return Err(ShopError::NotEquippable);
    }

    let unequip = inventory
        .iter()
        .filter(|other| other.is_equipped && other.id != entry.id)
        .filter(|other| find_item(&other.item_id).map(|i| i.item_type) == Some(item.item_type))
        .map(|other| other.id)
        .collect();

    Ok(EquipPlan {
        equip: Some(entry.id),
        unequip,
    })
}

/// Base attributes plus the bonuses of everything equipped
pub fn effective_attributes(base: Attributes, inventory: &[InventoryEntry]) -> Attributes {
    inventory
        .iter()
        .filter(|entry| entry.is_equipped)
        .filter_map(|entry| find_item(&entry.item_id))
        .fold(base, |attrs, item| attrs.with_bonus(&item.stat_bonus))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item_id: &str, equipped: bool) -> InventoryEntry {
        InventoryEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            item_id: item_id.to_string(),
            is_equipped: equipped,
        }
    }

    #[test]
    fn listing_marks_locked_and_affordable() {
        let items = listing(5, 400);
        let belt = items.iter().find(|l| l.item.id == "s-2").unwrap();
        assert!(!belt.locked);
        assert!(belt.affordable);
        let wraps = items.iter().find(|l| l.item.id == "s-3").unwrap();
        assert!(wraps.locked);
        assert!(!wraps.affordable);
    }

    #[test]
    fn purchase_requires_level_then_gold() {
        let belt = find_item("s-2").unwrap();
        assert_eq!(
            check_purchase(4, 10_000, belt),
            Err(ShopError::LevelTooLow { required: 5 })
        );
        assert_eq!(
            check_purchase(5, 349, belt),
            Err(ShopError::NotEnoughGold {
                price: 350,
                gold: 349
            })
        );
        assert_eq!(check_purchase(5, 350, belt), Ok(0));
    }

    #[test]
    fn equipping_replaces_same_slot_only() {
        let wraps = entry("s-3", true);
        let belt = entry("s-2", true);
        let golden = entry("s-5", false);
        let inventory = vec![wraps.clone(), belt.clone(), golden.clone()];

        let plan = plan_toggle(&inventory, golden.id).unwrap();
        assert_eq!(plan.equip, Some(golden.id));
        assert_eq!(plan.unequip, vec![wraps.id]);
    }

    #[test]
    fn toggling_an_equipped_item_unequips_it() {
        let belt = entry("s-2", true);
        let plan = plan_toggle(&[belt.clone()], belt.id).unwrap();
        assert_eq!(plan.equip, None);
        assert_eq!(plan.unequip, vec![belt.id]);
    }

    #[test]
    fn consumables_and_foreign_entries_are_refused() {
        let potion = entry("s-1", false);
        assert_eq!(
            plan_toggle(&[potion.clone()], potion.id),
            Err(ShopError::NotEquippable)
        );
        assert_eq!(
            plan_toggle(&[potion], Uuid::new_v4()),
            Err(ShopError::NotOwned)
        );
    }

    #[test]
    fn equipped_bonuses_stack_on_base_attributes() {
        let inventory = vec![entry("s-2", true), entry("s-3", true), entry("s-5", false)];
        let attrs = effective_attributes(Attributes::default(), &inventory);
        assert_eq!(
            attrs,
            Attributes {
                str: 18,
                sta: 10,
                will: 18
            }
        );
    }
}
