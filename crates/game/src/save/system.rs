use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{write_text_atomic, Transform};
use tracing::{debug, error, info, warn};

use super::error::SaveError;
use super::schema::{
    ChestRecord, DoorRecord, FoodRecord, InventoryData, ItemRecord, KeyRecord, PlayerRecord,
    SaveFile, WorldState,
};
use super::signal::{LoadListener, LoadOutcome, LoadSignal};
use crate::catalog::{FoodType, KeyType};

pub const SAVE_FILE_NAME: &str = "savegame.json";

/// Side effects `load` performs, in order, before notifying listeners.
pub trait LoadHooks {
    fn restore_player(&mut self, transform: Transform);
    fn rebuild_inventory(&mut self, inventory: &InventoryData);
    fn refresh_score(&mut self, score: i64);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    ScoreChanged(i64),
    Saved(PathBuf),
    SaveFailed,
}

/// Sole owner of the world state and its backing file. Every mark entry
/// point writes the whole file before returning.
#[derive(Debug)]
pub struct SaveSystem {
    path: PathBuf,
    state: WorldState,
    tracked_player: Option<Transform>,
    signal: LoadSignal,
    events: Vec<SaveEvent>,
}

impl SaveSystem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut system = Self {
            path: path.into(),
            state: WorldState::default(),
            tracked_player: None,
            signal: LoadSignal::default(),
            events: Vec::new(),
        };
        system.initialize();
        system
    }

    pub fn in_dir(saves_dir: &Path) -> Self {
        Self::new(saves_dir.join(SAVE_FILE_NAME))
    }

    pub fn initialize(&mut self) {
        self.state = WorldState::default();
        self.tracked_player = None;
        self.signal.rearm();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &WorldState {
        &self.state
    }

    pub fn subscribe(&mut self) -> LoadListener {
        self.signal.subscribe()
    }

    pub fn load_outcome(&self) -> Option<LoadOutcome> {
        self.signal.fired()
    }

    pub fn load(&mut self, hooks: &mut dyn LoadHooks) -> LoadOutcome {
        let outcome = match self.try_load() {
            Ok(Some(state)) => {
                info!(
                    path = %self.path.display(),
                    score = state.score,
                    keys = state.keys.len(),
                    doors = state.doors.len(),
                    chests = state.chests.len(),
                    "save_loaded"
                );
                self.state = state;
                let transform = self.state.player.transform();
                self.tracked_player = Some(transform);
                hooks.restore_player(transform);
                LoadOutcome::Restored
            }
            Ok(None) => {
                info!(path = %self.path.display(), "save_not_found");
                LoadOutcome::NoSave
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "save_corrupt");
                LoadOutcome::Corrupt
            }
        };

        hooks.rebuild_inventory(&self.state.inventory_view());
        hooks.refresh_score(self.state.score);
        self.signal.fire(outcome);
        outcome
    }

    pub fn save(&mut self) -> bool {
        if let Some(transform) = self.tracked_player {
            self.state.player = PlayerRecord::from_transform(transform);
        }
        match self.try_save() {
            Ok(()) => {
                info!(path = %self.path.display(), score = self.state.score, "save_written");
                self.events.push(SaveEvent::Saved(self.path.clone()));
                true
            }
            Err(error) => {
                error!(error = %error, "save_failed");
                self.events.push(SaveEvent::SaveFailed);
                false
            }
        }
    }

    pub fn track_player(&mut self, transform: Transform) {
        self.tracked_player = Some(transform);
    }

    pub fn mark_key_collected(&mut self, name: &str, key_type: KeyType) {
        self.record_key(name, key_type);
        self.save();
    }

    /// Opens the door record. With `consumed_key`, the first held key of
    /// that type is used up.
    pub fn mark_door_opened(&mut self, name: &str, consumed_key: Option<KeyType>) {
        match self.state.doors.iter_mut().find(|record| record.name == name) {
            Some(record) => record.opened = true,
            None => self.state.doors.push(DoorRecord {
                name: name.to_string(),
                opened: true,
            }),
        }

        if let Some(key_type) = consumed_key {
            match self
                .state
                .keys
                .iter_mut()
                .find(|record| record.is_held() && record.key_type == key_type.as_str())
            {
                Some(record) => {
                    record.consumed = true;
                    debug!(door = name, key = %record.name, "key_consumed");
                }
                None => warn!(door = name, key_type = %key_type, "nothing_to_use"),
            }
        }
        self.save();
    }

    pub fn mark_chest_opened(&mut self, name: &str) {
        self.record_chest(name);
        self.save();
    }

    pub fn mark_food_collected(&mut self, name: &str, food_type: FoodType) {
        self.record_food(name, food_type);
        self.save();
    }

    /// Uses up one held food of `food_type`. Returns false, without
    /// writing, when none is held.
    pub fn mark_food_eaten(&mut self, food_type: FoodType) -> bool {
        let Some(record) = self
            .state
            .food
            .iter_mut()
            .find(|record| record.is_held() && record.food_type == food_type.as_str())
        else {
            warn!(food_type = %food_type, "nothing_to_use");
            return false;
        };
        record.eaten = true;
        self.save();
        true
    }

    pub fn mark_item_collected(&mut self, name: &str) {
        self.record_item(name);
        self.save();
    }

    pub fn add_score(&mut self, delta: i64) {
        self.record_score(delta);
        self.save();
    }

    /// Marks the chest and grants its reward in a single write.
    pub fn open_chest(&mut self, name: &str, reward: i64) {
        self.record_chest(name);
        self.record_score(reward);
        self.save();
    }

    /// Marks the gem and grants its reward in a single write.
    pub fn collect_item(&mut self, name: &str, reward: i64) {
        self.record_item(name);
        self.record_score(reward);
        self.save();
    }

    /// Removes the backing file and resets to a fresh store. The reset
    /// happens even when the removal fails.
    pub fn delete_save_file(&mut self) -> bool {
        let deleted = match self.try_delete() {
            Ok(existed) => {
                info!(path = %self.path.display(), existed, "save_deleted");
                true
            }
            Err(error) => {
                warn!(error = %error, "save_delete_failed");
                false
            }
        };
        self.initialize();
        deleted
    }

    pub fn save_file_exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn drain_events(&mut self) -> Vec<SaveEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn try_load(&self) -> Result<Option<WorldState>, SaveError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SaveError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let file = parse_save_file(&raw, &self.path)?;
        validate_player(&file.player)?;
        Ok(Some(file.into_state()))
    }

    pub(crate) fn try_save(&self) -> Result<(), SaveError> {
        let file = SaveFile::from_state(&self.state);
        validate_player(&file.player)?;
        let json = serde_json::to_string_pretty(&file).map_err(SaveError::Encode)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SaveError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_text_atomic(&self.path, &json).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn try_delete(&self) -> Result<bool, SaveError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SaveError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn record_key(&mut self, name: &str, key_type: KeyType) {
        match self.state.keys.iter_mut().find(|record| record.name == name) {
            Some(record) => {
                record.collected = true;
                if record.key_type.is_empty() {
                    record.key_type = key_type.as_str().to_string();
                }
            }
            None => self.state.keys.push(KeyRecord {
                name: name.to_string(),
                collected: true,
                key_type: key_type.as_str().to_string(),
                consumed: false,
            }),
        }
    }

    fn record_food(&mut self, name: &str, food_type: FoodType) {
        match self.state.food.iter_mut().find(|record| record.name == name) {
            Some(record) => {
                record.collected = true;
                if record.food_type.is_empty() {
                    record.food_type = food_type.as_str().to_string();
                }
            }
            None => self.state.food.push(FoodRecord {
                name: name.to_string(),
                collected: true,
                food_type: food_type.as_str().to_string(),
                eaten: false,
            }),
        }
    }

    fn record_item(&mut self, name: &str) {
        match self.state.items.iter_mut().find(|record| record.name == name) {
            Some(record) => record.collected = true,
            None => self.state.items.push(ItemRecord {
                name: name.to_string(),
                collected: true,
            }),
        }
    }

    fn record_chest(&mut self, name: &str) {
        match self.state.chests.iter_mut().find(|record| record.id == name) {
            Some(record) => record.opened = true,
            None => self.state.chests.push(ChestRecord {
                id: name.to_string(),
                opened: true,
            }),
        }
    }

    fn record_score(&mut self, delta: i64) {
        self.state.score = self.state.score.saturating_add(delta);
        self.events.push(SaveEvent::ScoreChanged(self.state.score));
    }
}

pub(crate) fn parse_save_file(raw: &str, path: &Path) -> Result<SaveFile, SaveError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SaveFile>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        SaveError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn validate_player(player: &PlayerRecord) -> Result<(), SaveError> {
    let fields = [("position", &player.position), ("rotation", &player.rotation)];
    for (field, values) in fields {
        for (axis, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(SaveError::Validate {
                    field: format!("player.{field}[{axis}]"),
                    expected: "finite number",
                    actual: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use engine::Vec3;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::save::HeldEntry;

    #[derive(Default)]
    struct RecordingHooks {
        restored: Option<Transform>,
        inventory: Option<InventoryData>,
        score: Option<i64>,
        calls: Vec<&'static str>,
    }

    impl LoadHooks for RecordingHooks {
        fn restore_player(&mut self, transform: Transform) {
            self.calls.push("restore_player");
            self.restored = Some(transform);
        }

        fn rebuild_inventory(&mut self, inventory: &InventoryData) {
            self.calls.push("rebuild_inventory");
            self.inventory = Some(inventory.clone());
        }

        fn refresh_score(&mut self, score: i64) {
            self.calls.push("refresh_score");
            self.score = Some(score);
        }
    }

    fn temp_system() -> (TempDir, SaveSystem) {
        let temp = TempDir::new().expect("temp");
        let system = SaveSystem::in_dir(temp.path());
        (temp, system)
    }

    #[test]
    fn mark_key_collected_twice_keeps_one_record_and_one_held_entry() {
        let (_temp, mut saves) = temp_system();

        saves.mark_key_collected("Key_01", KeyType::Gold);
        saves.mark_key_collected("Key_01", KeyType::Gold);

        let store = saves.store();
        assert_eq!(store.keys.len(), 1);
        assert!(store.keys[0].collected);
        assert_eq!(
            store.inventory_view().collected_keys,
            vec![HeldEntry {
                name: "GoldSchlüssel".to_string(),
                collected: true
            }]
        );
    }

    #[test]
    fn every_mark_writes_the_file() {
        let (_temp, mut saves) = temp_system();
        assert!(!saves.save_file_exists());

        saves.mark_chest_opened("Chest_01");
        assert!(saves.save_file_exists());

        let raw = fs::read_to_string(saves.path()).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["chests"][0], json!({ "id": "Chest_01", "opened": true }));
    }

    #[test]
    fn round_trip_restores_every_field() {
        let temp = TempDir::new().expect("temp");
        let mut saves = SaveSystem::in_dir(temp.path());
        saves.track_player(Transform {
            position: Vec3::new(1.5, 0.0, -3.2),
            rotation: Vec3::new(0.0, 45.0, 0.0),
        });
        saves.mark_key_collected("Key_01", KeyType::Gold);
        saves.mark_key_collected("Key_02", KeyType::Bronze);
        saves.mark_door_opened("Door_A", None);
        saves.add_score(150);
        let written = saves.store().clone();

        let mut reloaded = SaveSystem::in_dir(temp.path());
        let mut hooks = RecordingHooks::default();
        let outcome = reloaded.load(&mut hooks);

        assert_eq!(outcome, LoadOutcome::Restored);
        assert!(outcome.found());
        assert_eq!(reloaded.store(), &written);
        assert_eq!(reloaded.store().score, 150);
        assert_eq!(reloaded.store().player.position, [1.5, 0.0, -3.2]);
        let names: Vec<_> = reloaded.store().keys.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["Key_01", "Key_02"]);
        assert_eq!(
            hooks.restored.map(|t| t.position),
            Some(Vec3::new(1.5, 0.0, -3.2))
        );
        assert_eq!(hooks.score, Some(150));
        assert_eq!(
            hooks.inventory.map(|inventory| inventory.collected_keys.len()),
            Some(2)
        );
    }

    #[test]
    fn load_runs_hooks_before_notifying_listeners() {
        let (_temp, mut saves) = temp_system();
        let mut listener = saves.subscribe();
        let mut hooks = RecordingHooks::default();

        assert_eq!(listener.poll(), None);
        let outcome = saves.load(&mut hooks);

        assert_eq!(outcome, LoadOutcome::NoSave);
        assert_eq!(hooks.calls, vec!["rebuild_inventory", "refresh_score"]);
        assert_eq!(listener.poll(), Some(LoadOutcome::NoSave));
        assert_eq!(saves.load_outcome(), Some(LoadOutcome::NoSave));
    }

    #[test]
    fn restored_load_restores_player_first() {
        let (_temp, mut saves) = temp_system();
        saves.add_score(5);

        let mut hooks = RecordingHooks::default();
        saves.load(&mut hooks);
        assert_eq!(
            hooks.calls,
            vec!["restore_player", "rebuild_inventory", "refresh_score"]
        );
    }

    #[test]
    fn corrupt_file_degrades_to_default_store() {
        let (_temp, mut saves) = temp_system();
        fs::write(saves.path(), "{ this is not json").expect("write");

        let mut listener = saves.subscribe();
        let mut hooks = RecordingHooks::default();
        let outcome = saves.load(&mut hooks);

        assert_eq!(outcome, LoadOutcome::Corrupt);
        assert!(!outcome.found());
        assert_eq!(saves.store(), &WorldState::default());
        assert!(hooks.restored.is_none());
        assert_eq!(listener.poll(), Some(LoadOutcome::Corrupt));
    }

    #[test]
    fn corrupt_file_reports_json_path() {
        let raw = json!({ "score": 1, "worldKeys": [{ "name": "Key_01", "collected": "yes" }] })
            .to_string();
        let error = parse_save_file(&raw, Path::new("savegame.json")).expect_err("type mismatch");

        match error {
            SaveError::Parse { json_path, .. } => assert_eq!(json_path, "worldKeys[0].collected"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_player_component_makes_file_corrupt() {
        let (_temp, mut saves) = temp_system();
        let raw = json!({ "player": { "position": [1.0, null, 0.0], "rotation": [0.0, 0.0, 0.0] } })
            .to_string();
        fs::write(saves.path(), raw).expect("write");

        assert!(saves.try_load().is_err());
        assert_eq!(
            saves.load(&mut RecordingHooks::default()),
            LoadOutcome::Corrupt
        );
    }

    #[test]
    fn non_finite_player_is_not_written() {
        let (_temp, mut saves) = temp_system();
        saves.track_player(Transform::at(Vec3::new(f32::NAN, 0.0, 0.0)));

        assert!(!saves.save());
        assert!(!saves.save_file_exists());
        assert!(saves.drain_events().contains(&SaveEvent::SaveFailed));
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let temp = TempDir::new().expect("temp");
        let blocker = temp.path().join("not_a_dir");
        fs::write(&blocker, "file").expect("write blocker");
        let mut saves = SaveSystem::new(blocker.join("savegame.json"));

        saves.add_score(10);

        assert_eq!(saves.store().score, 10);
        assert!(!saves.save_file_exists());
        assert_eq!(
            saves.drain_events(),
            vec![SaveEvent::ScoreChanged(10), SaveEvent::SaveFailed]
        );
    }

    #[test]
    fn door_unlock_consumes_first_held_key_of_type() {
        let (_temp, mut saves) = temp_system();
        saves.mark_key_collected("Key_Gold", KeyType::Gold);
        saves.mark_key_collected("Key_Bronze", KeyType::Bronze);

        saves.mark_door_opened("Door_A", Some(KeyType::Gold));

        let store = saves.store();
        assert!(store.door_opened("Door_A"));
        assert!(store.find_key("Key_Gold").is_some_and(|k| k.consumed));
        assert!(store.find_key("Key_Bronze").is_some_and(|k| !k.consumed));
        assert_eq!(store.score, 0);
        let gold = store
            .inventory_view()
            .collected_keys
            .into_iter()
            .find(|entry| entry.name == "GoldSchlüssel")
            .expect("gold entry");
        assert!(!gold.collected);
        assert!(store.key_collected("Key_Gold"));
    }

    #[test]
    fn eating_without_food_is_a_no_op() {
        let (_temp, mut saves) = temp_system();
        assert!(!saves.mark_food_eaten(FoodType::Schinken));
        assert!(saves.store().food.is_empty());
        assert!(!saves.save_file_exists());
    }

    #[test]
    fn eating_uses_up_one_food() {
        let (_temp, mut saves) = temp_system();
        saves.mark_food_collected("Ham_01", FoodType::Schinken);
        saves.mark_food_collected("Ham_02", FoodType::Schinken);

        assert!(saves.mark_food_eaten(FoodType::Schinken));
        assert_eq!(saves.store().held_food_count(FoodType::Schinken), 1);
        assert!(saves.store().food_collected("Ham_01"));
    }

    #[test]
    fn score_is_sum_of_deltas_since_reset() {
        let (_temp, mut saves) = temp_system();
        for delta in [10, 0, 25, 5] {
            saves.add_score(delta);
        }
        assert_eq!(saves.store().score, 40);

        saves.delete_save_file();
        saves.add_score(7);
        saves.open_chest("Chest_01", 3);
        saves.collect_item("Gem_01", 20);
        assert_eq!(saves.store().score, 30);
    }

    #[test]
    fn combined_reward_and_mark_are_written_together() {
        let (_temp, mut saves) = temp_system();
        saves.open_chest("Chest_01", 50);
        let events = saves.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SaveEvent::ScoreChanged(50));
        assert!(matches!(events[1], SaveEvent::Saved(_)));

        let state = saves.try_load().expect("load").expect("exists");
        assert!(state.chest_opened("Chest_01"));
        assert_eq!(state.score, 50);
    }

    #[test]
    fn delete_save_file_resets_store_and_rearms_signal() {
        let (_temp, mut saves) = temp_system();
        saves.add_score(50);
        saves.load(&mut RecordingHooks::default());
        assert!(saves.save_file_exists());

        assert!(saves.delete_save_file());

        assert!(!saves.save_file_exists());
        assert_eq!(saves.store(), &WorldState::default());
        assert_eq!(saves.load_outcome(), None);
        assert!(saves.delete_save_file());
    }

    #[test]
    fn untracked_player_keeps_loaded_transform() {
        let (_temp, mut saves) = temp_system();
        saves.track_player(Transform::at(Vec3::new(2.0, 0.0, 4.0)));
        saves.save();

        let mut reloaded = SaveSystem::new(saves.path());
        reloaded.load(&mut RecordingHooks::default());
        reloaded.add_score(1);

        let state = reloaded.try_load().expect("load").expect("exists");
        assert_eq!(state.player.position, [2.0, 0.0, 4.0]);
    }
}
