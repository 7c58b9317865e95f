use engine::{Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::catalog::{FoodType, KeyType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl PlayerRecord {
    pub fn from_transform(transform: Transform) -> Self {
        Self {
            position: transform.position.to_array(),
            rotation: transform.rotation.to_array(),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: Vec3::from_array(self.position),
            rotation: Vec3::from_array(self.rotation),
        }
    }
}

/// One placed key. `key_type` stays a raw name so content renamed in a
/// newer build is skipped with a warning instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub name: String,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub key_type: String,
    #[serde(default)]
    pub consumed: bool,
}

impl KeyRecord {
    pub fn is_held(&self) -> bool {
        self.collected && !self.consumed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    pub name: String,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub food_type: String,
    #[serde(default)]
    pub eaten: bool,
}

impl FoodRecord {
    pub fn is_held(&self) -> bool {
        self.collected && !self.eaten
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default)]
    pub collected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorRecord {
    pub name: String,
    #[serde(default)]
    pub opened: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestRecord {
    pub id: String,
    #[serde(default)]
    pub opened: bool,
}

/// An inventory line as written to disk: a key or food type name, or a
/// gem instance name, with whether it is still held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldEntry {
    pub name: String,
    #[serde(default)]
    pub collected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryData {
    pub collected_keys: Vec<HeldEntry>,
    pub collected_items: Vec<HeldEntry>,
    pub opened_doors: Vec<DoorRecord>,
    pub collected_food: Vec<HeldEntry>,
}

/// The canonical in-memory store. One record per placed instance; what
/// the player currently holds is derived from the record flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    pub player: PlayerRecord,
    pub keys: Vec<KeyRecord>,
    pub food: Vec<FoodRecord>,
    pub items: Vec<ItemRecord>,
    pub doors: Vec<DoorRecord>,
    pub chests: Vec<ChestRecord>,
    pub score: i64,
}

impl WorldState {
    pub fn find_key(&self, name: &str) -> Option<&KeyRecord> {
        self.keys.iter().find(|record| record.name == name)
    }

    pub fn find_food(&self, name: &str) -> Option<&FoodRecord> {
        self.food.iter().find(|record| record.name == name)
    }

    pub fn find_item(&self, name: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|record| record.name == name)
    }

    pub fn find_door(&self, name: &str) -> Option<&DoorRecord> {
        self.doors.iter().find(|record| record.name == name)
    }

    pub fn find_chest(&self, id: &str) -> Option<&ChestRecord> {
        self.chests.iter().find(|record| record.id == id)
    }

    pub fn key_collected(&self, name: &str) -> bool {
        self.find_key(name).is_some_and(|record| record.collected)
    }

    pub fn food_collected(&self, name: &str) -> bool {
        self.find_food(name).is_some_and(|record| record.collected)
    }

    pub fn item_collected(&self, name: &str) -> bool {
        self.find_item(name).is_some_and(|record| record.collected)
    }

    pub fn door_opened(&self, name: &str) -> bool {
        self.find_door(name).is_some_and(|record| record.opened)
    }

    pub fn chest_opened(&self, id: &str) -> bool {
        self.find_chest(id).is_some_and(|record| record.opened)
    }

    pub fn held_key_count(&self, key_type: KeyType) -> usize {
        self.keys
            .iter()
            .filter(|record| record.is_held() && record.key_type == key_type.as_str())
            .count()
    }

    pub fn held_food_count(&self, food_type: FoodType) -> usize {
        self.food
            .iter()
            .filter(|record| record.is_held() && record.food_type == food_type.as_str())
            .count()
    }

    /// Projects the records into the inventory layout. Keys and food that
    /// were picked up appear once each, named by type, with `collected`
    /// cleared once used up.
    pub fn inventory_view(&self) -> InventoryData {
        InventoryData {
            collected_keys: self
                .keys
                .iter()
                .filter(|record| record.collected)
                .map(|record| HeldEntry {
                    name: record.key_type.clone(),
                    collected: !record.consumed,
                })
                .collect(),
            collected_items: self
                .items
                .iter()
                .filter(|record| record.collected)
                .map(|record| HeldEntry {
                    name: record.name.clone(),
                    collected: true,
                })
                .collect(),
            opened_doors: self.doors.clone(),
            collected_food: self
                .food
                .iter()
                .filter(|record| record.collected)
                .map(|record| HeldEntry {
                    name: record.food_type.clone(),
                    collected: !record.eaten,
                })
                .collect(),
        }
    }
}

/// On-disk layout of `savegame.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveFile {
    pub player: PlayerRecord,
    pub chests: Vec<ChestRecord>,
    pub world_items: Vec<ItemRecord>,
    pub world_keys: Vec<KeyRecord>,
    pub world_food: Vec<FoodRecord>,
    pub score: i64,
    pub inventory: InventoryData,
    pub opened_doors: Vec<DoorRecord>,
}

impl SaveFile {
    pub fn from_state(state: &WorldState) -> Self {
        Self {
            player: state.player,
            chests: state.chests.clone(),
            world_items: state.items.clone(),
            world_keys: state.keys.clone(),
            world_food: state.food.clone(),
            score: state.score,
            inventory: state.inventory_view(),
            opened_doors: state.doors.clone(),
        }
    }

    /// The `inventory` section is a projection and is dropped here; it is
    /// recomputed from the records.
    pub fn into_state(self) -> WorldState {
        WorldState {
            player: self.player,
            keys: self.world_keys,
            food: self.world_food,
            items: self.world_items,
            doors: self.opened_doors,
            chests: self.chests,
            score: self.score,
        }
    }
}
