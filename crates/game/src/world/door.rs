use tracing::info;

use crate::catalog::KeyType;
use crate::inventory::Inventory;
use crate::save::WorldState;

use super::interactable::{InteractContext, InteractOutcome, Interactable, Reconciled};

/// Locked until the matching key is shown. Once open it never closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    name: String,
    label: String,
    required_key: KeyType,
    consume_key: bool,
    locked: bool,
    open: bool,
}

impl Door {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        required_key: KeyType,
        consume_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required_key,
            consume_key,
            locked: true,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn open_with(&mut self, ctx: &mut InteractContext<'_>, consumed: Option<KeyType>) {
        self.locked = false;
        self.open = true;
        ctx.saves.mark_door_opened(&self.name, consumed);
        info!(door = %self.name, consumed = ?consumed, "door_opened");
    }
}

impl Interactable for Door {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "door"
    }

    fn interaction_text(&self, inventory: &Inventory) -> String {
        if self.open {
            String::new()
        } else if !inventory.has_key(self.required_key) {
            format!("{} (required to open)", self.required_key)
        } else {
            format!("[E] Open {}", self.label)
        }
    }

    fn can_interact(&self, _inventory: &Inventory) -> bool {
        !self.open
    }

    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        if self.open {
            return InteractOutcome::Ignored;
        }
        if !ctx.inventory.has_key(self.required_key) {
            ctx.ui.show_message(&format!(
                "{} is locked! You need a {}!",
                self.label, self.required_key
            ));
            return InteractOutcome::Refused;
        }

        if self.consume_key {
            ctx.inventory.use_key(self.required_key, ctx.ui);
            self.open_with(ctx, Some(self.required_key));
            ctx.ui.show_message(&format!(
                "{} unlocked! ({} used)",
                self.label, self.required_key
            ));
        } else {
            self.open_with(ctx, None);
            ctx.ui.show_message(&format!("{} unlocked!", self.label));
        }
        InteractOutcome::Updated
    }

    fn reconcile(&mut self, store: &WorldState) -> Reconciled {
        if store.door_opened(&self.name) {
            self.locked = false;
            self.open = true;
        }
        Reconciled::Keep
    }
}
