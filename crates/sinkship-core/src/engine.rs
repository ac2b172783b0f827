//! Ship simulation - hosts one character in a hecs world.
//!
//! `ShipSim` plays the part of the physics/trigger/room collaborator for the
//! character state machine. The host loop calls [`ShipSim::frame`] once per
//! rendered frame and [`ShipSim::fixed_update`] once per physics step.

use std::collections::HashSet;

use hecs::{Entity, EntityBuilder, World};
use sinkship_logic::character::{
    Character, CharacterError, CharacterEvent, EntityId, Interactable, LadderRef,
};
use sinkship_logic::config::GameConfig;
use sinkship_logic::geometry::{Rect, Vec2};
use sinkship_logic::intent::{PlayerController, PlayerInput, StepOutcome};

use crate::components::*;

/// Main simulation engine
pub struct ShipSim {
    /// ECS world containing rooms, floors and interactables
    pub world: World,
    character: Character,
    controller: PlayerController,
    config: GameConfig,
    /// Floors the character currently passes through
    ignored_floors: HashSet<Entity>,
    /// Trigger volumes containing the character as of the last step
    overlapping: HashSet<Entity>,
    /// Simulation time in seconds
    sim_time: f64,
}

impl ShipSim {
    /// Create an empty ship with the character standing at `spawn`.
    pub fn new(config: GameConfig, spawn: Vec2) -> Self {
        Self {
            world: World::new(),
            character: Character::new(config.clone(), spawn),
            controller: PlayerController::new(config.clone()),
            config,
            ignored_floors: HashSet::new(),
            overlapping: HashSet::new(),
            sim_time: 0.0,
        }
    }

    // ── Building ────────────────────────────────────────────────────────

    pub fn spawn_room(&mut self, name: impl Into<String>, bounds: Rect) -> Entity {
        self.world.spawn((Room::new(name, bounds),))
    }

    pub fn spawn_floor(&mut self, floor: Floor) -> Entity {
        self.world.spawn((floor,))
    }

    pub fn spawn_ladder(&mut self, volume: Rect, transition_floor: Entity) -> Entity {
        self.world.spawn((Ladder { transition_floor }, Trigger(volume)))
    }

    /// Spawn an unrepaired breach, counting it against its room.
    pub fn spawn_breach(&mut self, volume: Rect, room: Option<Entity>) -> Entity {
        if let Some(r) = room {
            match self.world.get::<&mut Room>(r) {
                Ok(mut room) => room.open_breaches += 1,
                Err(_) => log::warn!("Breach spawned for missing room {:?}", r),
            }
        }
        self.world.spawn((
            Breach {
                room,
                repaired: false,
            },
            Trigger(volume),
        ))
    }

    /// Spawn a door. `state` is `None` for doors without an open/closed
    /// sub-state; toggling those only warns.
    pub fn spawn_door(&mut self, volume: Rect, state: Option<DoorState>) -> Entity {
        let mut builder = EntityBuilder::new();
        builder.add(Door).add(Trigger(volume));
        if let Some(state) = state {
            builder.add(state);
        }
        self.world.spawn(builder.build())
    }

    pub fn spawn_water(&mut self, area: Rect) -> Entity {
        self.character.add_water_area(area);
        self.world.spawn((WaterBody(area),))
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn is_floor_ignored(&self, floor: Entity) -> bool {
        self.ignored_floors.contains(&floor)
    }

    /// `None` if the entity has no door sub-state.
    pub fn door_closed(&self, door: Entity) -> Option<bool> {
        self.world.get::<&DoorState>(door).ok().map(|s| s.closed)
    }

    pub fn room(&self, room: Entity) -> Option<Room> {
        self.world.get::<&Room>(room).ok().map(|r| (*r).clone())
    }

    pub fn breach_repaired(&self, breach: Entity) -> Option<bool> {
        self.world.get::<&Breach>(breach).ok().map(|b| b.repaired)
    }

    /// Count rooms
    pub fn room_count(&self) -> usize {
        self.world.query::<&Room>().iter().count()
    }

    pub fn leaking_room_count(&self) -> usize {
        self.world
            .query::<&Room>()
            .iter()
            .filter(|(_, room)| room.is_leaking())
            .count()
    }

    /// The ship sinks once the leaking fraction of rooms reaches
    /// `percentage_for_sink`.
    pub fn is_sinking(&self) -> bool {
        let total = self.room_count();
        if total == 0 {
            return false;
        }
        let leaking = self.leaking_room_count() as f32 / total as f32;
        leaking > 0.0 && leaking >= self.config.percentage_for_sink
    }

    /// Downward ray against every floor not currently ignored.
    pub fn is_grounded(&self, origin: Vec2, distance: f32) -> bool {
        floor_below(&self.world, &self.ignored_floors, origin, distance)
    }

    // ── Host callbacks ──────────────────────────────────────────────────

    /// Per-frame update: water and ground contact.
    pub fn frame(&mut self) {
        let world = &self.world;
        let ignored = &self.ignored_floors;
        self.character
            .update_frame(&|origin, distance| floor_below(world, ignored, origin, distance));
    }

    /// Per-physics-step update: input, movement, landing, triggers, events.
    ///
    /// A rejected character call is returned after the rest of the step has
    /// still run, so the world never skips a physics tick.
    pub fn fixed_update(
        &mut self,
        input: PlayerInput,
        dt: f32,
    ) -> Result<StepOutcome, CharacterError> {
        self.sim_time += dt as f64;

        let outcome = self.controller.fixed_update(&mut self.character, input, dt);

        let feet_before = self.character.feet_position();
        self.character.physics_step(dt);
        self.resolve_landing(feet_before);

        self.detect_triggers();
        self.apply_events();

        outcome
    }

    /// Convenience for a frame followed by one physics step.
    pub fn step(&mut self, input: PlayerInput, dt: f32) -> Result<StepOutcome, CharacterError> {
        self.frame();
        self.fixed_update(input, dt)
    }

    /// Drown / kill the character.
    pub fn kill(&mut self) {
        self.character.die();
        self.apply_events();
    }

    // ── Physics stand-ins ───────────────────────────────────────────────

    /// Stop a downward move at the highest solid floor it crossed.
    fn resolve_landing(&mut self, feet_before: Vec2) {
        if self.character.is_climbing() {
            return;
        }
        let feet_after = self.character.feet_position();
        if feet_after.y >= feet_before.y {
            return;
        }

        let mut landing: Option<f32> = None;
        for (entity, floor) in self.world.query::<&Floor>().iter() {
            if self.ignored_floors.contains(&entity) || !floor.spans(feet_after.x) {
                continue;
            }
            if feet_before.y >= floor.y - CONTACT_SKIN && feet_after.y < floor.y {
                landing = Some(landing.map_or(floor.y, |y| y.max(floor.y)));
            }
        }

        if let Some(y) = landing {
            let pos = self.character.position();
            self.character
                .land_at(Vec2::new(pos.x, pos.y + (y - feet_after.y)));
        }
    }

    /// Diff trigger overlap against the previous step; exits go first.
    fn detect_triggers(&mut self) {
        let pos = self.character.position();
        let now: HashSet<Entity> = self
            .world
            .query::<&Trigger>()
            .iter()
            .filter(|(_, t)| t.0.contains(pos))
            .map(|(e, _)| e)
            .collect();

        let mut exited: Vec<Entity> = self.overlapping.difference(&now).copied().collect();
        let mut entered: Vec<Entity> = now.difference(&self.overlapping).copied().collect();
        exited.sort_by_key(|e| e.to_bits());
        entered.sort_by_key(|e| e.to_bits());

        for e in exited {
            self.character.on_trigger_exit(entity_id(e));
        }
        for e in entered {
            if let Some(other) = self.interactable(e) {
                self.character.on_trigger_enter(other);
            }
        }

        // Leaving one of two overlapping ladders (stacked decks) would
        // otherwise drop the one still around the character
        if self.character.ladder().is_none() {
            let mut ladders: Vec<Entity> = now
                .iter()
                .copied()
                .filter(|&e| self.world.get::<&Ladder>(e).is_ok())
                .collect();
            ladders.sort_by_key(|e| e.to_bits());
            if let Some(other) = ladders.first().and_then(|&e| self.interactable(e)) {
                self.character.on_trigger_enter(other);
            }
        }

        self.overlapping = now;
    }

    fn interactable(&self, e: Entity) -> Option<Interactable> {
        if let Ok(ladder) = self.world.get::<&Ladder>(e) {
            return Some(Interactable::Ladder(LadderRef {
                id: entity_id(e),
                transition_floor: entity_id(ladder.transition_floor),
            }));
        }
        if self.world.get::<&Breach>(e).is_ok() {
            return Some(Interactable::Breach(entity_id(e)));
        }
        if self.world.get::<&Door>(e).is_ok() {
            return Some(Interactable::Door(entity_id(e)));
        }
        None
    }

    // ── Character requests ──────────────────────────────────────────────

    fn apply_events(&mut self) {
        for event in self.character.drain_events() {
            match event {
                CharacterEvent::SetCollisionIgnored { floor, ignored } => {
                    self.set_floor_ignored(floor, ignored)
                }
                CharacterEvent::BreachRepaired { breach } => self.repair_breach(breach),
                CharacterEvent::DoorToggleRequested { door } => self.toggle_door(door),
                CharacterEvent::Died { head_under_water } => {
                    log::info!(
                        "Character died at t={:.2}s ({})",
                        self.sim_time,
                        if head_under_water { "drowned" } else { "above water" }
                    );
                }
            }
        }
    }

    fn set_floor_ignored(&mut self, floor: EntityId, ignored: bool) {
        let Some(entity) = entity_from_id(floor) else {
            log::warn!("Collision toggle for unknown floor {:?}", floor);
            return;
        };
        if ignored {
            self.ignored_floors.insert(entity);
        } else {
            self.ignored_floors.remove(&entity);
        }
    }

    fn repair_breach(&mut self, breach: EntityId) {
        let Some(entity) = entity_from_id(breach) else {
            log::warn!("Repair reported for unknown breach {:?}", breach);
            return;
        };
        let room = match self.world.get::<&mut Breach>(entity) {
            Ok(mut b) => {
                b.repaired = true;
                b.room
            }
            Err(_) => {
                log::warn!("Repaired breach {:?} no longer exists", entity);
                return;
            }
        };
        // A repaired breach stops being interactable.
        let _ = self.world.remove_one::<Trigger>(entity);

        match room.and_then(|r| self.world.get::<&mut Room>(r).ok()) {
            Some(mut room) => {
                room.complete_repair();
                log::info!(
                    "Room '{}' breach repaired ({} still open)",
                    room.name,
                    room.open_breaches
                );
            }
            None => log::warn!("Couldn't find room for breach {:?}", entity),
        }
    }

    fn toggle_door(&mut self, door: EntityId) {
        let Some(entity) = entity_from_id(door) else {
            log::warn!("Toggle requested for unknown door {:?}", door);
            return;
        };
        match self.world.get::<&mut DoorState>(entity) {
            Ok(mut state) => {
                state.closed = !state.closed;
                log::debug!("Door {:?} closed={}", entity, state.closed);
            }
            Err(_) => log::warn!("Door {:?} has no open/closed state", entity),
        }
    }
}

/// Downward ray against every floor not in `ignored`.
fn floor_below(world: &World, ignored: &HashSet<Entity>, origin: Vec2, distance: f32) -> bool {
    world
        .query::<&Floor>()
        .iter()
        .any(|(e, f)| !ignored.contains(&e) && f.hit_by_ray(origin, distance))
}
