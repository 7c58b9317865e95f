use super::input::{ActionStates, InputAction};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(values: [f32; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, factor: f32) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance_squared(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// `rotation` holds Euler angles in degrees; `y` is the heading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Reload,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    actions: ActionStates,
    move_forward: f32,
    move_right: f32,
    turn_degrees: f32,
    set_clock: Option<(u32, u32)>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.actions.is_pressed(action)
    }

    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.actions.set(action, pressed);
        self
    }

    pub fn with_movement(mut self, forward: f32, right: f32) -> Self {
        self.move_forward = forward.clamp(-1.0, 1.0);
        self.move_right = right.clamp(-1.0, 1.0);
        self
    }

    pub fn with_turn_degrees(mut self, turn_degrees: f32) -> Self {
        self.turn_degrees = turn_degrees;
        self
    }

    pub fn with_set_clock(mut self, set_clock: Option<(u32, u32)>) -> Self {
        self.set_clock = set_clock;
        self
    }

    pub fn movement(&self) -> (f32, f32) {
        (self.move_forward, self.move_right)
    }

    pub fn turn_degrees(&self) -> f32 {
        self.turn_degrees
    }

    pub fn set_clock(&self) -> Option<(u32, u32)> {
        self.set_clock
    }

    pub fn quit_requested(&self) -> bool {
        self.is_pressed(InputAction::Quit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub interactable: bool,
    applied_spawn_order: u64,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    player: Option<EntityId>,
}

impl SceneWorld {
    pub fn spawn_named(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        interactable: bool,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            name: name.into(),
            transform,
            interactable,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn spawn_player(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = self.spawn_named(name, transform, false);
        self.player = Some(id);
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_spawns.is_empty() {
            for mut entity in self.pending_spawns.drain(..) {
                entity.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                self.entities.push(entity);
            }
        }

        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities.retain(|entity| {
                pending
                    .binary_search_by_key(&entity.id.0, |id| id.0)
                    .is_err()
            });
            if let Some(player) = self.player {
                if pending.binary_search_by_key(&player.0, |id| id.0).is_ok() {
                    self.player = None;
                }
            }
            self.pending_despawns.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.player = None;
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player_transform(&self) -> Option<Transform> {
        self.player
            .and_then(|id| self.find_entity(id))
            .map(|entity| entity.transform)
    }

    pub fn set_player_transform(&mut self, transform: Transform) -> bool {
        let Some(id) = self.player else {
            return false;
        };
        match self.find_entity_mut(id) {
            Some(entity) => {
                entity.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Nearest interactable entity within `range` of `from` that passes
    /// `filter`. Ties go to the entity spawned first.
    pub fn pick_nearest_interactable<F>(
        &self,
        from: Vec3,
        range: f32,
        filter: F,
    ) -> Option<EntityId>
    where
        F: Fn(&Entity) -> bool,
    {
        let range_squared = range * range;
        let mut best: Option<(f32, u64, EntityId)> = None;

        for entity in &self.entities {
            if !entity.interactable {
                continue;
            }
            let distance_squared = entity.transform.position.distance_squared(from);
            if distance_squared > range_squared || !filter(entity) {
                continue;
            }

            match best {
                Some((best_distance, best_order, _))
                    if best_distance < distance_squared
                        || (best_distance == distance_squared
                            && best_order <= entity.applied_spawn_order) => {}
                _ => best = Some((distance_squared, entity.applied_spawn_order, entity.id)),
            }
        }

        best.map(|(_, _, id)| id)
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.load(world);
        world.apply_pending();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let (scene, world) = (&mut self.scene, &mut self.world);
        let command = scene.update(fixed_dt_seconds, input, world);
        world.apply_pending();
        command
    }

    pub(crate) fn reload(&mut self) {
        self.shutdown();
        self.load();
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            let (scene, world) = (&mut self.scene, &mut self.world);
            scene.unload(world);
            world.clear();
            self.is_loaded = false;
        }
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }
}
