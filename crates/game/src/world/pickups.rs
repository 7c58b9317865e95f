use crate::catalog::{FoodType, KeyType};
use crate::inventory::Inventory;
use crate::save::WorldState;

use super::interactable::{InteractContext, InteractOutcome, Interactable, Reconciled};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPickup {
    name: String,
    key_type: KeyType,
}

impl KeyPickup {
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }
}

impl Interactable for KeyPickup {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "key"
    }

    fn interaction_text(&self, _inventory: &Inventory) -> String {
        format!("[E] Pick up {}", self.key_type)
    }

    fn can_interact(&self, _inventory: &Inventory) -> bool {
        true
    }

    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        ctx.inventory.add_key(self.key_type, ctx.ui);
        ctx.saves.mark_key_collected(&self.name, self.key_type);
        ctx.ui.show_message(&format!("{} picked up!", self.key_type));
        InteractOutcome::Consumed
    }

    fn reconcile(&mut self, store: &WorldState) -> Reconciled {
        if store.key_collected(&self.name) {
            Reconciled::Remove
        } else {
            Reconciled::Keep
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodPickup {
    name: String,
    food_type: FoodType,
}

impl FoodPickup {
    pub fn new(name: impl Into<String>, food_type: FoodType) -> Self {
        Self {
            name: name.into(),
            food_type,
        }
    }
}

impl Interactable for FoodPickup {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "food"
    }

    fn interaction_text(&self, _inventory: &Inventory) -> String {
        format!("[E] Pick up {}", self.food_type)
    }

    fn can_interact(&self, _inventory: &Inventory) -> bool {
        true
    }

    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        ctx.inventory.add_food(self.food_type, ctx.ui);
        ctx.saves.mark_food_collected(&self.name, self.food_type);
        ctx.ui.show_message(&format!("{} collected!", self.food_type));
        InteractOutcome::Consumed
    }

    fn reconcile(&mut self, store: &WorldState) -> Reconciled {
        if store.food_collected(&self.name) {
            Reconciled::Remove
        } else {
            Reconciled::Keep
        }
    }
}

/// A scored collectible. Reward and mark are persisted in one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemPickup {
    name: String,
    label: String,
    points: i64,
}

impl GemPickup {
    pub fn new(name: impl Into<String>, label: impl Into<String>, points: i64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            points,
        }
    }
}

impl Interactable for GemPickup {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "gem"
    }

    fn interaction_text(&self, _inventory: &Inventory) -> String {
        format!("[E] Pick up {}", self.label)
    }

    fn can_interact(&self, _inventory: &Inventory) -> bool {
        true
    }

    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        ctx.inventory.add_item(self.name.clone(), ctx.ui);
        ctx.saves.collect_item(&self.name, self.points);
        ctx.ui
            .show_message(&format!("{} found! +{} points", self.label, self.points));
        InteractOutcome::Consumed
    }

    fn reconcile(&mut self, store: &WorldState) -> Reconciled {
        if store.item_collected(&self.name) {
            Reconciled::Remove
        } else {
            Reconciled::Keep
        }
    }
}
