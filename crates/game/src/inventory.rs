use tracing::{debug, info, warn};

use crate::catalog::{FoodType, KeyType};
use crate::save::{InventoryData, SaveSystem};
use crate::ui::UiSink;

/// Runtime mirror of what the player holds. The save store stays
/// authoritative; `load_from_store` rebuilds this from its projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    keys: Vec<KeyType>,
    food: Vec<FoodType>,
    items: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[KeyType] {
        &self.keys
    }

    pub fn food(&self) -> &[FoodType] {
        &self.food
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn add_key(&mut self, key_type: KeyType, ui: &mut dyn UiSink) {
        self.keys.push(key_type);
        ui.refresh_keys(&self.keys);
        debug!(key_type = %key_type, total = self.keys.len(), "key_added");
    }

    pub fn has_key(&self, key_type: KeyType) -> bool {
        self.keys.contains(&key_type)
    }

    /// Removes one key of `key_type`. Using a key that is not held is a
    /// logged no-op.
    pub fn use_key(&mut self, key_type: KeyType, ui: &mut dyn UiSink) -> bool {
        let Some(index) = self.keys.iter().position(|held| *held == key_type) else {
            warn!(key_type = %key_type, "nothing_to_use");
            return false;
        };
        self.keys.remove(index);
        ui.refresh_keys(&self.keys);
        debug!(key_type = %key_type, remaining = self.keys.len(), "key_used");
        true
    }

    pub fn total_key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn add_food(&mut self, food_type: FoodType, ui: &mut dyn UiSink) {
        self.food.push(food_type);
        ui.refresh_food(&self.food);
    }

    pub fn has_food(&self) -> bool {
        !self.food.is_empty()
    }

    /// Removes the oldest held food and returns it.
    pub fn use_food(&mut self, ui: &mut dyn UiSink) -> Option<FoodType> {
        if self.food.is_empty() {
            warn!(kind = "food", "nothing_to_use");
            return None;
        }
        let food_type = self.food.remove(0);
        ui.refresh_food(&self.food);
        Some(food_type)
    }

    pub fn add_item(&mut self, name: impl Into<String>, ui: &mut dyn UiSink) {
        self.items.push(name.into());
        ui.refresh_item_count(self.items.len());
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn load_from_store(&mut self, data: &InventoryData, ui: &mut dyn UiSink) {
        self.keys.clear();
        self.food.clear();
        self.items.clear();

        for entry in data.collected_keys.iter().filter(|entry| entry.collected) {
            match entry.name.parse::<KeyType>() {
                Ok(key_type) => self.keys.push(key_type),
                Err(error) => warn!(name = %entry.name, error = %error, "key_type_unknown"),
            }
        }
        for entry in data.collected_food.iter().filter(|entry| entry.collected) {
            match entry.name.parse::<FoodType>() {
                Ok(food_type) => self.food.push(food_type),
                Err(error) => warn!(name = %entry.name, error = %error, "food_type_unknown"),
            }
        }
        self.items.extend(
            data.collected_items
                .iter()
                .filter(|entry| entry.collected)
                .map(|entry| entry.name.clone()),
        );

        ui.refresh_keys(&self.keys);
        ui.refresh_food(&self.food);
        ui.refresh_item_count(self.items.len());
        info!(
            keys = self.keys.len(),
            food = self.food.len(),
            items = self.items.len(),
            "inventory_rebuilt"
        );
    }

    /// Score lives in the save store; the inventory keeps no ledger.
    pub fn total_score(&self, saves: &SaveSystem) -> i64 {
        saves.store().score
    }

    pub fn log_summary(&self, saves: &SaveSystem) {
        info!(
            keys = ?self.keys,
            food = ?self.food,
            items = self.items.len(),
            score = self.total_score(saves),
            "inventory_summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::HeldEntry;
    use crate::ui::Hud;

    fn held(name: &str, collected: bool) -> HeldEntry {
        HeldEntry {
            name: name.to_string(),
            collected,
        }
    }

    #[test]
    fn use_key_removes_one_matching_key() {
        let mut hud = Hud::default();
        let mut inventory = Inventory::new();
        inventory.add_key(KeyType::Gold, &mut hud);
        inventory.add_key(KeyType::Gold, &mut hud);

        assert!(inventory.use_key(KeyType::Gold, &mut hud));
        assert_eq!(inventory.keys(), &[KeyType::Gold]);
        assert_eq!(hud.keys(), &[KeyType::Gold]);
    }

    #[test]
    fn use_key_without_key_is_a_no_op() {
        let mut hud = Hud::default();
        let mut inventory = Inventory::new();
        inventory.add_key(KeyType::Bronze, &mut hud);

        assert!(!inventory.use_key(KeyType::Master, &mut hud));
        assert_eq!(inventory.total_key_count(), 1);
    }

    #[test]
    fn use_food_on_empty_list_is_a_no_op() {
        let mut hud = Hud::default();
        let mut inventory = Inventory::new();

        assert_eq!(inventory.use_food(&mut hud), None);
        assert!(!inventory.has_food());
        assert!(inventory.food().is_empty());
    }

    #[test]
    fn load_from_store_skips_spent_and_unknown_entries() {
        let mut hud = Hud::default();
        let mut inventory = Inventory::new();
        inventory.add_key(KeyType::Master, &mut hud);

        let data = InventoryData {
            collected_keys: vec![
                held("GoldSchlüssel", true),
                held("SilberSchlüssel", false),
                held("KupferSchlüssel", true),
            ],
            collected_items: vec![held("Gem_01", true)],
            opened_doors: Vec::new(),
            collected_food: vec![held("Schinken", true), held("Schinken", false)],
        };
        inventory.load_from_store(&data, &mut hud);

        assert_eq!(inventory.keys(), &[KeyType::Gold]);
        assert_eq!(inventory.food(), &[FoodType::Schinken]);
        assert_eq!(inventory.item_count(), 1);
        assert_eq!(hud.keys(), &[KeyType::Gold]);
        assert_eq!(hud.food(), &[FoodType::Schinken]);
        assert_eq!(hud.item_count(), 1);
    }
}
