mod chest;
mod daylight;
mod door;
mod interactable;
mod pickups;
mod reconcile;

pub use chest::{ChestItem, TreasureChest};
pub use daylight::{DayNightCycle, DayPhase, Lantern, Lanterns, MIDNIGHT, NOON, SUNRISE, SUNSET};
pub use door::Door;
pub use interactable::{InteractContext, InteractOutcome, Interactable, Reconciled};
pub use pickups::{FoodPickup, GemPickup, KeyPickup};
pub use reconcile::{Phase, Placed};
