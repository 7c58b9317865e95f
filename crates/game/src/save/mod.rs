mod error;
mod schema;
mod signal;
mod system;

pub use error::SaveError;
pub use schema::{
    ChestRecord, DoorRecord, FoodRecord, HeldEntry, InventoryData, ItemRecord, KeyRecord,
    PlayerRecord, SaveFile, WorldState,
};
pub use signal::{LoadListener, LoadOutcome};
pub use system::{LoadHooks, SaveEvent, SaveSystem, SAVE_FILE_NAME};
