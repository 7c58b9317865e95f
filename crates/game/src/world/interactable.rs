use std::fmt;

use crate::inventory::Inventory;
use crate::save::{SaveSystem, WorldState};
use crate::ui::UiSink;

/// Services an interaction may touch. Rewards go through `saves` so the
/// store stays authoritative.
pub struct InteractContext<'a> {
    pub saves: &'a mut SaveSystem,
    pub inventory: &'a mut Inventory,
    pub ui: &'a mut dyn UiSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractOutcome {
    /// Reward granted; the object leaves the scene.
    Consumed,
    /// State changed; the object stays.
    Updated,
    /// Requirement missing; a message was shown.
    Refused,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Remove,
    Keep,
}

pub trait Interactable: fmt::Debug {
    fn name(&self) -> &str;
    fn kind(&self) -> &'static str;
    fn interaction_text(&self, inventory: &Inventory) -> String;
    fn can_interact(&self, inventory: &Inventory) -> bool;
    fn interact(&mut self, ctx: &mut InteractContext<'_>) -> InteractOutcome;
    /// Applies the persisted state for this instance. Never grants rewards.
    fn reconcile(&mut self, store: &WorldState) -> Reconciled;
}
