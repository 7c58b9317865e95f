use engine::{
    EntityId, InputAction, InputSnapshot, Scene, SceneCommand, SceneWorld, Transform, Vec3,
};
use tracing::{debug, info};

use crate::inventory::Inventory;
use crate::level::LevelLayout;
use crate::save::{InventoryData, LoadHooks, LoadOutcome, SaveEvent, SaveSystem};
use crate::ui::{Hud, UiSink};
use crate::world::{
    DayNightCycle, DayPhase, InteractContext, InteractOutcome, Lanterns, Phase, Placed,
};

const PLAYER_NAME: &str = "player";
const PLAYER_SPEED_UNITS_PER_SECOND: f32 = 5.0;
const INTERACTION_RANGE_UNITS: f32 = 3.0;

pub struct GameplayScene {
    level: LevelLayout,
    saves: SaveSystem,
    inventory: Inventory,
    hud: Hud,
    clock: DayNightCycle,
    lanterns: Lanterns,
    placed: Vec<Placed>,
    focus: Option<(EntityId, String)>,
    player_yaw: f32,
    last_load: Option<LoadOutcome>,
}

impl GameplayScene {
    pub fn new(level: LevelLayout, saves: SaveSystem) -> Self {
        let clock = level.day_night.build();
        Self {
            level,
            saves,
            inventory: Inventory::new(),
            hud: Hud::default(),
            clock,
            lanterns: Lanterns::new(),
            placed: Vec::new(),
            focus: None,
            player_yaw: 0.0,
            last_load: None,
        }
    }

    pub fn saves(&self) -> &SaveSystem {
        &self.saves
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn clock(&self) -> &DayNightCycle {
        &self.clock
    }

    pub fn lanterns(&self) -> &Lanterns {
        &self.lanterns
    }

    pub fn last_load(&self) -> Option<LoadOutcome> {
        self.last_load
    }

    pub fn focused_name(&self) -> Option<&str> {
        let (entity, _) = self.focus.as_ref()?;
        self.placed
            .iter()
            .find(|placed| placed.entity() == *entity)
            .map(Placed::name)
    }

    fn move_player(&mut self, dt: f32, input: &InputSnapshot, world: &mut SceneWorld) {
        let turn = input.turn_degrees();
        let (forward, right) = input.movement();
        if turn == 0.0 && forward == 0.0 && right == 0.0 {
            return;
        }
        let Some(mut transform) = world.player_transform() else {
            return;
        };

        self.player_yaw = (self.player_yaw + turn).rem_euclid(360.0);
        let yaw = self.player_yaw.to_radians();
        let (sin, cos) = yaw.sin_cos();
        let mut direction = Vec3::new(
            forward * sin + right * cos,
            0.0,
            forward * cos - right * sin,
        );
        let length_squared = direction.x * direction.x + direction.z * direction.z;
        if length_squared > 1.0 {
            direction = direction.scale(1.0 / length_squared.sqrt());
        }

        transform.position = transform
            .position
            .add(direction.scale(PLAYER_SPEED_UNITS_PER_SECOND * dt));
        transform.rotation.y = self.player_yaw;
        if transform.position.is_finite() && world.set_player_transform(transform) {
            self.saves.track_player(transform);
        }
    }

    fn reconcile_placed(&mut self, world: &mut SceneWorld) {
        let store = self.saves.store();
        for placed in &mut self.placed {
            if placed.poll(store) == Some(Phase::Removed) {
                world.despawn(placed.entity());
            }
        }
    }

    fn refresh_focus(&mut self, world: &SceneWorld) {
        let next = world.player_transform().and_then(|player| {
            let placed = &self.placed;
            let inventory = &self.inventory;
            let entity = world.pick_nearest_interactable(
                player.position,
                INTERACTION_RANGE_UNITS,
                |entity| {
                    placed
                        .iter()
                        .any(|item| item.entity() == entity.id && item.is_interactable(inventory))
                },
            )?;
            let text = placed
                .iter()
                .find(|item| item.entity() == entity)?
                .interaction_text(inventory);
            Some((entity, text))
        });

        if next == self.focus {
            return;
        }
        match &next {
            Some((_, text)) if !text.is_empty() => self.hud.show_prompt(text),
            _ => self.hud.hide_prompt(),
        }
        self.focus = next;
    }

    fn interact_focused(&mut self, world: &mut SceneWorld) {
        let Some((entity, _)) = self.focus.take() else {
            return;
        };
        let Some(placed) = self.placed.iter_mut().find(|item| item.entity() == entity) else {
            return;
        };
        let mut ctx = InteractContext {
            saves: &mut self.saves,
            inventory: &mut self.inventory,
            ui: &mut self.hud,
        };
        let outcome = placed.interact(&mut ctx);
        debug!(name = placed.name(), kind = placed.kind(), outcome = ?outcome, "interacted");
        if outcome == InteractOutcome::Consumed {
            world.despawn(entity);
        }
    }

    fn eat_food(&mut self) {
        let Some(food_type) = self.inventory.use_food(&mut self.hud) else {
            return;
        };
        if self.saves.mark_food_eaten(food_type) {
            self.hud.show_message(&format!("{food_type} eaten!"));
        }
    }

    fn set_clock(&mut self, hours: u32, minutes: u32) {
        self.clock.set_time_hm(hours, minutes);
        self.lanterns.set_all(self.clock.is_night());
        info!(time = %self.clock.readable_time(), "clock_set");
    }

    fn forward_save_events(&mut self) {
        for event in self.saves.drain_events() {
            match event {
                SaveEvent::ScoreChanged(score) => self.hud.refresh_score(score),
                SaveEvent::Saved(_) | SaveEvent::SaveFailed => {}
            }
        }
    }

    fn log_status(&self, world: &SceneWorld) {
        self.inventory.log_summary(&self.saves);
        let position = world
            .player_transform()
            .map(|transform| transform.position)
            .unwrap_or_default();
        info!(
            time = %self.clock.readable_time(),
            night = self.clock.is_night(),
            lanterns_lit = self.lanterns.is_lit(),
            x = position.x,
            y = position.y,
            z = position.z,
            focus = self.focused_name().unwrap_or("-"),
            "status"
        );
    }
}

struct SceneLoadHooks<'a> {
    world: &'a mut SceneWorld,
    inventory: &'a mut Inventory,
    hud: &'a mut Hud,
    player_yaw: &'a mut f32,
}

impl LoadHooks for SceneLoadHooks<'_> {
    fn restore_player(&mut self, transform: Transform) {
        if self.world.set_player_transform(transform) {
            *self.player_yaw = transform.rotation.y;
        }
    }

    fn rebuild_inventory(&mut self, inventory: &InventoryData) {
        self.inventory.load_from_store(inventory, &mut *self.hud);
    }

    fn refresh_score(&mut self, score: i64) {
        self.hud.refresh_score(score);
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.saves.initialize();
        self.inventory = Inventory::new();
        self.hud.reset();
        self.clock = self.level.day_night.build();
        self.lanterns.clear();
        self.placed.clear();
        self.focus = None;

        let spawn = self.level.player.transform();
        world.spawn_player(PLAYER_NAME, spawn);
        self.player_yaw = spawn.rotation.y;
        for def in &self.level.objects {
            let entity = world.spawn_named(def.name.clone(), Transform::at(def.position), true);
            let listener = self.saves.subscribe();
            self.placed.push(Placed::new(entity, def.build(), listener));
        }
        for lantern in &self.level.lanterns {
            world.spawn_named(lantern.name.clone(), Transform::at(lantern.position), false);
            self.lanterns.add(lantern.name.clone());
        }
        world.apply_pending();

        let outcome = self.saves.load(&mut SceneLoadHooks {
            world: &mut *world,
            inventory: &mut self.inventory,
            hud: &mut self.hud,
            player_yaw: &mut self.player_yaw,
        });
        if let Some(transform) = world.player_transform() {
            self.saves.track_player(transform);
        }
        self.last_load = Some(outcome);
        self.reconcile_placed(world);
        self.lanterns.set_all(self.clock.is_night());

        info!(
            entity_count = world.entity_count(),
            objects = self.placed.len(),
            lanterns = self.lanterns.len(),
            load = outcome.as_str(),
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.is_pressed(InputAction::NewGame) {
            self.saves.delete_save_file();
            self.hud.reset();
            info!("new_game_started");
            return SceneCommand::Reload;
        }

        self.move_player(fixed_dt_seconds, input, world);
        self.reconcile_placed(world);

        if let Some(phase) = self.clock.advance(fixed_dt_seconds) {
            self.lanterns.set_all(phase == DayPhase::Night);
        }
        if let Some((hours, minutes)) = input.set_clock() {
            self.set_clock(hours, minutes);
        }
        self.hud.tick(fixed_dt_seconds);

        self.refresh_focus(world);
        if input.is_pressed(InputAction::Interact) {
            self.interact_focused(world);
        }
        if input.is_pressed(InputAction::EatFood) {
            self.eat_food();
        }
        if input.is_pressed(InputAction::ToggleInventory) {
            self.hud.toggle_inventory();
        }
        if input.is_pressed(InputAction::Status) {
            self.log_status(world);
        }

        self.forward_save_events();
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.placed.clear();
        self.focus = None;
        self.lanterns.clear();
        info!(score = self.saves.store().score, "scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some(format!(
            "{} | {} | {} | {}",
            self.clock.readable_time(),
            self.hud.score_text(),
            self.hud.key_count_text(),
            self.hud.item_count_text()
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::catalog::{FoodType, KeyType};
    use crate::level::parse_level;

    const LEVEL: &str = r#"<Level>
        <Player x="0" z="0" yaw="0"/>
        <DayNight dayLengthMinutes="10" startTime="0.5"/>
        <Key name="Key_Gold" type="GoldSchlüssel" x="0" z="2"/>
        <Food name="Ham_01" type="Schinken" x="2" z="0"/>
        <Door name="Door_Cellar" label="Cellar door" requiredKey="GoldSchlüssel" consumeKey="true" x="0" z="20"/>
        <Gem name="Gem_Ruby" label="Ruby" points="25" x="0" z="40"/>
        <Lantern name="Lantern_01" x="0" y="2" z="0"/>
    </Level>"#;

    fn scene(dir: &Path) -> GameplayScene {
        let level = parse_level(Path::new("level.xml"), LEVEL).expect("level");
        GameplayScene::new(level, SaveSystem::in_dir(dir))
    }

    fn loaded(dir: &Path) -> (GameplayScene, SceneWorld) {
        let mut scene = scene(dir);
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        world.apply_pending();
        (scene, world)
    }

    fn tick(
        scene: &mut GameplayScene,
        world: &mut SceneWorld,
        input: InputSnapshot,
    ) -> SceneCommand {
        let command = scene.update(1.0 / 60.0, &input, world);
        world.apply_pending();
        command
    }

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action, true)
    }

    fn walk_to(scene: &mut GameplayScene, world: &mut SceneWorld, target: Vec3) {
        let mut transform = world.player_transform().expect("player");
        transform.position = target;
        world.set_player_transform(transform);
        scene.saves.track_player(transform);
        tick(scene, world, InputSnapshot::empty());
    }

    #[test]
    fn fresh_load_spawns_everything_and_breaks_focus_ties_by_spawn_order() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut world) = loaded(temp.path());

        assert_eq!(scene.last_load(), Some(LoadOutcome::NoSave));
        assert!(world.find_by_name("Key_Gold").is_some());
        assert!(world.find_by_name("Lantern_01").is_some());
        assert!(!scene.lanterns().is_lit());

        tick(&mut scene, &mut world, InputSnapshot::empty());
        assert_eq!(scene.focused_name(), Some("Key_Gold"));
        assert_eq!(scene.hud().prompt(), Some("[E] Pick up GoldSchlüssel"));
    }

    #[test]
    fn movement_follows_heading() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut world) = loaded(temp.path());

        for _ in 0..60 {
            tick(
                &mut scene,
                &mut world,
                InputSnapshot::empty().with_movement(1.0, 0.0),
            );
        }
        let position = world.player_transform().expect("player").position;
        assert!((position.z - 5.0).abs() < 1e-3);
        assert!(position.x.abs() < 1e-3);

        tick(
            &mut scene,
            &mut world,
            InputSnapshot::empty().with_turn_degrees(90.0),
        );
        for _ in 0..60 {
            tick(
                &mut scene,
                &mut world,
                InputSnapshot::empty().with_movement(1.0, 0.0),
            );
        }
        let position = world.player_transform().expect("player").position;
        assert!((position.x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn collected_objects_stay_gone_after_restart() {
        let temp = TempDir::new().expect("temp");
        {
            let (mut scene, mut world) = loaded(temp.path());
            walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 1.5));
            assert_eq!(scene.focused_name(), Some("Key_Gold"));
            tick(&mut scene, &mut world, press(InputAction::Interact));
            assert!(world.find_by_name("Key_Gold").is_none());
            assert_eq!(scene.inventory().keys(), &[KeyType::Gold]);

            walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 39.0));
            tick(&mut scene, &mut world, press(InputAction::Interact));
            assert_eq!(scene.hud().score(), 25);
        }

        let (scene, world) = loaded(temp.path());
        assert_eq!(scene.last_load(), Some(LoadOutcome::Restored));
        assert!(world.find_by_name("Key_Gold").is_none());
        assert!(world.find_by_name("Gem_Ruby").is_none());
        assert!(world.find_by_name("Ham_01").is_some());
        assert_eq!(scene.inventory().keys(), &[KeyType::Gold]);
        assert_eq!(scene.hud().score(), 25);
        let position = world.player_transform().expect("player").position;
        assert_eq!(position, Vec3::new(0.0, 0.0, 39.0));
    }

    #[test]
    fn failed_save_keeps_interaction_message() {
        let temp = TempDir::new().expect("temp");
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        let level = parse_level(Path::new("level.xml"), LEVEL).expect("level");
        let mut scene = GameplayScene::new(level, SaveSystem::in_dir(&blocker));
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        world.apply_pending();

        walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 1.5));
        tick(&mut scene, &mut world, press(InputAction::Interact));

        assert!(!scene.saves().save_file_exists());
        assert_eq!(scene.inventory().keys(), &[KeyType::Gold]);
        assert_eq!(scene.hud().message(), Some("GoldSchlüssel picked up!"));
    }

    #[test]
    fn door_opens_with_key_and_stays_open_after_restart() {
        let temp = TempDir::new().expect("temp");
        {
            let (mut scene, mut world) = loaded(temp.path());
            walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 18.0));
            assert_eq!(
                scene.hud().prompt(),
                Some("GoldSchlüssel (required to open)")
            );
            tick(&mut scene, &mut world, press(InputAction::Interact));
            assert!(!scene.saves().store().door_opened("Door_Cellar"));

            walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 1.5));
            tick(&mut scene, &mut world, press(InputAction::Interact));
            walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 18.0));
            tick(&mut scene, &mut world, press(InputAction::Interact));
            assert!(scene.saves().store().door_opened("Door_Cellar"));
            assert!(scene.inventory().keys().is_empty());
        }

        let (mut scene, mut world) = loaded(temp.path());
        assert!(world.find_by_name("Door_Cellar").is_some());
        tick(&mut scene, &mut world, InputSnapshot::empty());
        assert_eq!(scene.focused_name(), None);
        assert!(scene.inventory().keys().is_empty());
    }

    #[test]
    fn eating_uses_collected_food() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut world) = loaded(temp.path());
        walk_to(&mut scene, &mut world, Vec3::new(1.5, 0.0, 0.0));
        tick(&mut scene, &mut world, press(InputAction::Interact));
        assert_eq!(scene.inventory().food(), &[FoodType::Schinken]);

        tick(&mut scene, &mut world, press(InputAction::EatFood));
        assert!(scene.inventory().food().is_empty());
        assert_eq!(scene.saves().store().held_food_count(FoodType::Schinken), 0);
        assert_eq!(scene.hud().message(), Some("Schinken eaten!"));
    }

    #[test]
    fn new_game_deletes_save_and_reloads() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut world) = loaded(temp.path());
        walk_to(&mut scene, &mut world, Vec3::new(0.0, 0.0, 1.5));
        tick(&mut scene, &mut world, press(InputAction::Interact));
        assert!(scene.saves().save_file_exists());

        let command = tick(&mut scene, &mut world, press(InputAction::NewGame));
        assert_eq!(command, SceneCommand::Reload);
        assert!(!scene.saves().save_file_exists());

        scene.unload(&mut world);
        world.clear();
        scene.load(&mut world);
        world.apply_pending();
        assert_eq!(scene.last_load(), Some(LoadOutcome::NoSave));
        assert!(world.find_by_name("Key_Gold").is_some());
        assert!(scene.inventory().keys().is_empty());
        assert_eq!(scene.hud().score(), 0);
    }

    #[test]
    fn setting_clock_to_night_lights_lanterns() {
        let temp = TempDir::new().expect("temp");
        let (mut scene, mut world) = loaded(temp.path());

        tick(
            &mut scene,
            &mut world,
            InputSnapshot::empty().with_set_clock(Some((22, 0))),
        );
        assert!(scene.clock().is_night());
        assert!(scene.lanterns().is_lit());
        assert_eq!(scene.clock().readable_time(), "22:00");
    }
}
