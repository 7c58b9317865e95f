use engine::EntityId;
use tracing::debug;

use crate::inventory::Inventory;
use crate::save::{LoadListener, WorldState};

use super::interactable::{InteractContext, InteractOutcome, Interactable, Reconciled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the save load to finish.
    Pending,
    Active,
    Removed,
}

/// A world-placed interactable bound to its scene entity. It resolves
/// against the store exactly once, after the load signal fires.
#[derive(Debug)]
pub struct Placed {
    entity: EntityId,
    item: Box<dyn Interactable>,
    phase: Phase,
    listener: LoadListener,
}

impl Placed {
    pub fn new(entity: EntityId, item: Box<dyn Interactable>, listener: LoadListener) -> Self {
        Self {
            entity,
            item,
            phase: Phase::Pending,
            listener,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn kind(&self) -> &'static str {
        self.item.kind()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Resolves a pending object once the load has finished. Returns the
    /// new phase only on the tick it changes.
    pub fn poll(&mut self, store: &WorldState) -> Option<Phase> {
        if self.phase != Phase::Pending {
            return None;
        }
        let outcome = self.listener.poll()?;
        self.phase = match self.item.reconcile(store) {
            Reconciled::Remove => Phase::Removed,
            Reconciled::Keep => Phase::Active,
        };
        debug!(
            name = self.item.name(),
            kind = self.item.kind(),
            load = outcome.as_str(),
            phase = ?self.phase,
            "interactable_reconciled"
        );
        Some(self.phase)
    }

    pub fn is_interactable(&self, inventory: &Inventory) -> bool {
        self.phase == Phase::Active && self.item.can_interact(inventory)
    }

    pub fn interaction_text(&self, inventory: &Inventory) -> String {
        if self.phase == Phase::Active {
            self.item.interaction_text(inventory)
        } else {
            String::new()
        }
    }

    pub fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome {
        if !self.is_interactable(ctx.inventory) {
            return InteractOutcome::Ignored;
        }
        let outcome = self.item.interact(ctx);
        if outcome == InteractOutcome::Consumed {
            self.phase = Phase::Removed;
        }
        outcome
    }
}
