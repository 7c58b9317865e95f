use crate::catalog::ItemType;
use crate::inventory::Inventory;
use crate::save::WorldState;

use super::interactable::{InteractContext, InteractOutcome, Interactable, Reconciled};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestItem {
    pub kind: ItemType,
    pub name: String,
    pub points: i64,
}

impl ChestItem {
    pub fn new(kind: ItemType, name: impl Into<String>, points: i64) -> Self {
        Self {
            kind,
            name: name.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasureChest {
    name: String,
    contents: Vec<ChestItem>,
    opened: bool,
}

impl TreasureChest {
    pub fn new(name: impl Into<String>, contents: Vec<ChestItem>) -> Self {
        Self {
            name: name.into(),
            contents,
            opened: false,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn contents(&self) -> &[ChestItem] {
        &self.contents
    }

    pub fn total_points(&self) -> i64 {
        self.contents
            .iter()
            .fold(0_i64, |total, item| total.saturating_add(item.points))
    }
}

impl Interactable for TreasureChest {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "chest"
    }

    fn interaction_text(&self, _inventory: &Inventory) -> String {
        if self.opened {
            String::new()
        } else {
            "[E] Open chest".to_string()
        }
    }

    fn can_interact(&self, _inventory: &Inventory) -> bool {
        !self.opened
    }

    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        if self.opened {
            return InteractOutcome::Ignored;
        }
        self.opened = true;
        let reward = self.total_points();
        let names = self
            .contents
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.contents.clear();

        ctx.saves.open_chest(&self.name, reward);
        if names.is_empty() {
            ctx.ui.show_message("Chest opened!");
        } else {
            ctx.ui.show_message(&format!("Chest opened! {names} found!"));
        }
        InteractOutcome::Updated
    }

    fn reconcile(&mut self, store: &WorldState) -> Reconciled {
        if store.chest_opened(&self.name) {
            self.opened = true;
            self.contents.clear();
        }
        Reconciled::Keep
    }
}
