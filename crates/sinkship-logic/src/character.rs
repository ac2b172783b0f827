//! Character interaction state machine.
//!
//! Tracks which interactables (ladder, breach, door) the character overlaps
//! and which activity it is performing. Activities are mutually exclusive:
//!
//! ```text
//!            start_climbing / stop_climbing
//!   Idle|Walking  <-------------------------->  Climbing
//!        |   ^
//!        |   | N hits with a breach, or stop_repairing
//!        v   |
//!     Repairing
//!
//!   any ----die----> Dead   (terminal)
//! ```
//!
//! The character never touches the physics world directly. Requests for the
//! collaborator (ignore a floor collider, repair a breach, toggle a door) are
//! queued as [`CharacterEvent`]s and drained by the host each step, and the
//! ground query arrives as a closure.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, GROUND_PROBE_DISTANCE};
use crate::geometry::{inside_any, Rect, Vec2};

/// Opaque handle of an object owned by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// A ladder the character overlaps, with the floor collider that gets
/// ignored while climbing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderRef {
    pub id: EntityId,
    pub transition_floor: EntityId,
}

/// Payload of a trigger-enter notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    Ladder(LadderRef),
    Breach(EntityId),
    Door(EntityId),
}

impl Interactable {
    pub fn id(&self) -> EntityId {
        match self {
            Interactable::Ladder(l) => l.id,
            Interactable::Breach(id) | Interactable::Door(id) => *id,
        }
    }
}

/// What the character is doing. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activity {
    #[default]
    Idle,
    Walking,
    Climbing,
    Repairing,
    Dead,
}

impl Activity {
    pub fn name(self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Walking => "walking",
            Activity::Climbing => "climbing",
            Activity::Repairing => "repairing",
            Activity::Dead => "dead",
        }
    }
}

/// Requests for the host world, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacterEvent {
    /// Stop (or resume) colliding with a ladder's transition floor.
    SetCollisionIgnored { floor: EntityId, ignored: bool },
    /// The breach took its last hit; forward to the room that owns it.
    BreachRepaired { breach: EntityId },
    /// Flip the door's closed state.
    DoorToggleRequested { door: EntityId },
    Died { head_under_water: bool },
}

/// Outcome of a single hammer hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairProgress {
    Hit { hits: u32, needed: u32 },
    Completed { breach: EntityId },
}

/// A transition was requested whose precondition does not hold.
/// State is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterError {
    Dead,
    NoLadder,
    NoBreach,
    NoDoor,
    NotClimbing,
    NotRepairing,
    AlreadyClimbing,
    AlreadyRepairing,
    /// The current activity excludes the attempted one.
    Busy { current: Activity, attempted: Activity },
}

impl std::fmt::Display for CharacterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterError::Dead => write!(f, "Character is dead"),
            CharacterError::NoLadder => {
                write!(f, "Can't start climbing when not overlapping a ladder")
            }
            CharacterError::NoBreach => write!(f, "Can't repair a breach when not overlapping one"),
            CharacterError::NoDoor => write!(f, "Can't toggle a door when not overlapping one"),
            CharacterError::NotClimbing => write!(f, "Character is not climbing"),
            CharacterError::NotRepairing => write!(f, "Character is not repairing"),
            CharacterError::AlreadyClimbing => write!(f, "Character is already climbing"),
            CharacterError::AlreadyRepairing => write!(f, "Character is already repairing"),
            CharacterError::Busy { current, attempted } => write!(
                f,
                "Character can't be {} while {}",
                attempted.name(),
                current.name()
            ),
        }
    }
}

impl std::error::Error for CharacterError {}

/// Feet and head points relative to the character origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterBody {
    pub feet_offset: Vec2,
    pub head_offset: Vec2,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            feet_offset: Vec2::new(0.0, -0.5),
            head_offset: Vec2::new(0.0, 0.5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    config: GameConfig,
    body: CharacterBody,
    position: Vec2,
    activity: Activity,
    /// Normalized animation speed signal (0 or 1).
    speed: f32,
    facing_left: bool,
    touching_ground: bool,
    feet_under_water: bool,
    head_under_water: bool,
    // Overlapped interactables, held regardless of the current activity.
    ladder: Option<LadderRef>,
    breach: Option<EntityId>,
    door: Option<EntityId>,
    /// Transition floor ignored by the current climb; restored when it ends.
    climbing_floor: Option<EntityId>,
    repair_hits: u32,
    /// Target position for the next physics step.
    pending_move: Option<Vec2>,
    /// Vertical velocity of a dead body (positive is up).
    dead_velocity: f32,
    water: Vec<Rect>,
    events: Vec<CharacterEvent>,
}

impl Character {
    pub fn new(config: GameConfig, position: Vec2) -> Self {
        Self::with_body(config, position, CharacterBody::default())
    }

    pub fn with_body(config: GameConfig, position: Vec2, body: CharacterBody) -> Self {
        Self {
            config,
            body,
            position,
            activity: Activity::Idle,
            speed: 0.0,
            facing_left: false,
            touching_ground: false,
            feet_under_water: false,
            head_under_water: false,
            ladder: None,
            breach: None,
            door: None,
            climbing_floor: None,
            repair_hits: 0,
            pending_move: None,
            dead_velocity: 0.0,
            water: Vec::new(),
            events: Vec::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn activity(&self) -> Activity {
        self.activity
    }
    pub fn is_climbing(&self) -> bool {
        self.activity == Activity::Climbing
    }
    pub fn is_repairing(&self) -> bool {
        self.activity == Activity::Repairing
    }
    pub fn is_dead(&self) -> bool {
        self.activity == Activity::Dead
    }
    pub fn touching_ground(&self) -> bool {
        self.touching_ground
    }
    pub fn feet_under_water(&self) -> bool {
        self.feet_under_water
    }
    pub fn head_under_water(&self) -> bool {
        self.head_under_water
    }
    pub fn speed(&self) -> f32 {
        self.speed
    }
    /// Render flip flag.
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }
    pub fn ladder(&self) -> Option<LadderRef> {
        self.ladder
    }
    pub fn breach(&self) -> Option<EntityId> {
        self.breach
    }
    pub fn door(&self) -> Option<EntityId> {
        self.door
    }
    pub fn repair_hits(&self) -> u32 {
        self.repair_hits
    }
    pub fn position(&self) -> Vec2 {
        self.position
    }
    pub fn pending_move(&self) -> Option<Vec2> {
        self.pending_move
    }
    pub fn feet_position(&self) -> Vec2 {
        self.position + self.body.feet_offset
    }
    pub fn head_position(&self) -> Vec2 {
        self.position + self.body.head_offset
    }
    pub fn water_areas(&self) -> &[Rect] {
        &self.water
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<CharacterEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Host-side writes ────────────────────────────────────────────────

    pub fn set_water_areas(&mut self, areas: Vec<Rect>) {
        self.water = areas;
    }

    pub fn add_water_area(&mut self, area: Rect) {
        self.water.push(area);
    }

    /// Teleport, keeping any dead-body velocity.
    pub fn place_at(&mut self, pos: Vec2) {
        self.position = pos;
    }

    /// Teleport onto a surface, cancelling vertical velocity.
    pub fn land_at(&mut self, pos: Vec2) {
        self.position = pos;
        self.dead_velocity = 0.0;
    }

    // ── Overlap tracking ────────────────────────────────────────────────

    pub fn on_trigger_enter(&mut self, other: Interactable) {
        if self.is_dead() {
            log::debug!("Ignoring trigger enter {:?} while dead", other);
            return;
        }
        match other {
            // The ladder being climbed stays current until it is exited
            Interactable::Ladder(l) if self.is_climbing() && self.ladder != Some(l) => {
                log::debug!("Ignoring ladder {:?} while climbing {:?}", l.id, self.ladder);
            }
            Interactable::Ladder(l) => self.ladder = Some(l),
            Interactable::Breach(id) => self.breach = Some(id),
            Interactable::Door(id) => self.door = Some(id),
        }
    }

    pub fn on_trigger_exit(&mut self, other: EntityId) {
        if self.ladder.map(|l| l.id) == Some(other) {
            if self.is_climbing() {
                self.leave_ladder();
            }
            self.ladder = None;
        }
        if self.breach == Some(other) {
            if self.is_repairing() {
                log::debug!("Left breach mid-repair after {} hits", self.repair_hits);
                self.activity = Activity::Idle;
                self.repair_hits = 0;
            }
            self.breach = None;
        }
        if self.door == Some(other) {
            self.door = None;
        }
    }

    // ── Climbing ────────────────────────────────────────────────────────

    pub fn start_climbing(&mut self) -> Result<(), CharacterError> {
        match self.activity {
            Activity::Dead => return Err(CharacterError::Dead),
            Activity::Climbing => return Err(CharacterError::AlreadyClimbing),
            Activity::Repairing => {
                return Err(CharacterError::Busy {
                    current: Activity::Repairing,
                    attempted: Activity::Climbing,
                })
            }
            Activity::Idle | Activity::Walking => {}
        }
        let ladder = self.ladder.ok_or(CharacterError::NoLadder)?;

        self.events.push(CharacterEvent::SetCollisionIgnored {
            floor: ladder.transition_floor,
            ignored: true,
        });
        self.climbing_floor = Some(ladder.transition_floor);
        self.activity = Activity::Climbing;
        log::debug!("Started climbing ladder {:?}", ladder.id);
        Ok(())
    }

    pub fn stop_climbing(&mut self) -> Result<(), CharacterError> {
        if !self.is_climbing() {
            return Err(CharacterError::NotClimbing);
        }
        self.leave_ladder();
        Ok(())
    }

    /// Climbing -> Idle, restoring the transition floor collision.
    fn leave_ladder(&mut self) {
        if let Some(floor) = self.climbing_floor.take() {
            self.events.push(CharacterEvent::SetCollisionIgnored {
                floor,
                ignored: false,
            });
        }
        self.activity = Activity::Idle;
        log::debug!("Stopped climbing");
    }

    // ── Movement intents (one physics step each) ────────────────────────

    pub fn walk_to(&mut self, pos: Vec2) -> Result<(), CharacterError> {
        match self.activity {
            Activity::Dead => return Err(CharacterError::Dead),
            current @ (Activity::Climbing | Activity::Repairing) => {
                return Err(CharacterError::Busy {
                    current,
                    attempted: Activity::Walking,
                })
            }
            Activity::Idle | Activity::Walking => {}
        }
        self.face_towards(pos);
        self.pending_move = Some(pos);
        self.speed = 1.0;
        self.activity = Activity::Walking;
        Ok(())
    }

    /// Call `start_climbing` first.
    pub fn climb_to(&mut self, pos: Vec2) -> Result<(), CharacterError> {
        if self.is_dead() {
            return Err(CharacterError::Dead);
        }
        if !self.is_climbing() {
            return Err(CharacterError::NotClimbing);
        }
        self.face_towards(pos);
        self.pending_move = Some(pos);
        self.speed = 1.0;
        Ok(())
    }

    /// No directional input this step, though the character may still be
    /// falling.
    pub fn idle_to(&mut self, pos: Vec2) -> Result<(), CharacterError> {
        if self.is_dead() {
            return Err(CharacterError::Dead);
        }
        self.pending_move = Some(pos);
        self.speed = 0.0;
        if self.activity == Activity::Walking {
            self.activity = Activity::Idle;
        }
        Ok(())
    }

    fn face_towards(&mut self, pos: Vec2) {
        self.facing_left = pos.x < self.position.x;
    }

    // ── Repairing ───────────────────────────────────────────────────────

    pub fn start_repairing(&mut self) -> Result<(), CharacterError> {
        match self.activity {
            Activity::Dead => return Err(CharacterError::Dead),
            Activity::Repairing => return Err(CharacterError::AlreadyRepairing),
            Activity::Climbing => {
                return Err(CharacterError::Busy {
                    current: Activity::Climbing,
                    attempted: Activity::Repairing,
                })
            }
            Activity::Idle | Activity::Walking => {}
        }
        self.activity = Activity::Repairing;
        self.repair_hits = 0;
        self.speed = 0.0;
        log::debug!("Started repairing {:?}", self.breach);
        Ok(())
    }

    /// Land one hammer hit. The hit that reaches `repair_hits_needed`
    /// completes the breach and ends the repair.
    pub fn repair_hit(&mut self) -> Result<RepairProgress, CharacterError> {
        if !self.is_repairing() {
            return Err(CharacterError::NotRepairing);
        }
        let needed = self.config.repair_hits_needed;
        // Saturate so a retried completion (after NoBreach) can't overflow.
        self.repair_hits = (self.repair_hits + 1).min(needed);
        if self.repair_hits < needed {
            return Ok(RepairProgress::Hit {
                hits: self.repair_hits,
                needed,
            });
        }
        let breach = self.complete_repair()?;
        Ok(RepairProgress::Completed { breach })
    }

    fn complete_repair(&mut self) -> Result<EntityId, CharacterError> {
        let breach = self.breach.ok_or(CharacterError::NoBreach)?;
        self.events.push(CharacterEvent::BreachRepaired { breach });
        self.activity = Activity::Idle;
        self.repair_hits = 0;
        log::info!("Breach {:?} repaired", breach);
        Ok(breach)
    }

    pub fn stop_repairing(&mut self) -> Result<(), CharacterError> {
        if !self.is_repairing() {
            return Err(CharacterError::NotRepairing);
        }
        self.activity = Activity::Idle;
        self.repair_hits = 0;
        Ok(())
    }

    // ── Doors ───────────────────────────────────────────────────────────

    pub fn toggle_door(&mut self) -> Result<(), CharacterError> {
        if self.is_dead() {
            return Err(CharacterError::Dead);
        }
        let door = self.door.ok_or(CharacterError::NoDoor)?;
        self.events.push(CharacterEvent::DoorToggleRequested { door });
        Ok(())
    }

    // ── Death ───────────────────────────────────────────────────────────

    /// One-way. Dying again is a no-op.
    pub fn die(&mut self) {
        if self.is_dead() {
            return;
        }
        if self.is_climbing() {
            self.leave_ladder();
        }
        self.activity = Activity::Dead;
        self.speed = 0.0;
        self.repair_hits = 0;
        self.pending_move = None;
        self.touching_ground = false;
        self.dead_velocity = 0.0;
        self.events.push(CharacterEvent::Died {
            head_under_water: self.head_under_water,
        });
        log::info!(
            "Character died at ({:.2}, {:.2}), head under water: {}",
            self.position.x,
            self.position.y,
            self.head_under_water
        );
    }

    // ── Host callbacks ──────────────────────────────────────────────────

    /// Per-frame: refresh submersion and ground contact.
    /// `ground_probe(origin, distance)` casts a ray straight down.
    pub fn update_frame(&mut self, ground_probe: &dyn Fn(Vec2, f32) -> bool) {
        self.feet_under_water = inside_any(&self.water, self.feet_position());
        self.head_under_water = inside_any(&self.water, self.head_position());

        self.touching_ground = if self.is_dead() {
            false
        } else {
            ground_probe(self.feet_position(), GROUND_PROBE_DISTANCE)
        };
    }

    /// Per-physics-step: apply the pending move, or let a dead body sink
    /// or float.
    pub fn physics_step(&mut self, dt: f32) {
        if let Some(target) = self.pending_move.take() {
            self.position = target;
            return;
        }
        if self.is_dead() {
            let accel = if self.head_under_water {
                self.config.buoyancy
            } else {
                self.config.dead_gravity
            };
            self.dead_velocity -= accel * dt;
            self.position.y += self.dead_velocity * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LADDER: LadderRef = LadderRef {
        id: EntityId(1),
        transition_floor: EntityId(2),
    };
    const BREACH: EntityId = EntityId(10);
    const DOOR: EntityId = EntityId(20);

    fn character() -> Character {
        Character::new(GameConfig::default(), Vec2::new(0.0, 0.0))
    }

    fn on_ladder() -> Character {
        let mut c = character();
        c.on_trigger_enter(Interactable::Ladder(LADDER));
        c
    }

    fn at_breach() -> Character {
        let mut c = character();
        c.on_trigger_enter(Interactable::Breach(BREACH));
        c
    }

    // --- Climbing ---

    #[test]
    fn start_climbing_ignores_transition_floor() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        assert_eq!(c.activity(), Activity::Climbing);
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: true
            }]
        );
    }

    #[test]
    fn stop_climbing_restores_transition_floor() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.drain_events();
        c.stop_climbing().unwrap();
        assert_eq!(c.activity(), Activity::Idle);
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: false
            }]
        );
    }

    const UPPER_LADDER: LadderRef = LadderRef {
        id: EntityId(5),
        transition_floor: EntityId(6),
    };

    #[test]
    fn overlapping_ladder_keeps_climbed_ladder() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.on_trigger_enter(Interactable::Ladder(UPPER_LADDER));
        assert_eq!(c.ladder(), Some(LADDER));
        c.drain_events();

        c.stop_climbing().unwrap();
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: false
            }]
        );
    }

    #[test]
    fn exiting_climbed_ladder_inside_another_restores_its_floor() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.on_trigger_enter(Interactable::Ladder(UPPER_LADDER));
        c.drain_events();

        // Leaving the other ladder changes nothing
        c.on_trigger_exit(UPPER_LADDER.id);
        assert!(c.is_climbing());
        assert!(c.drain_events().is_empty());

        c.on_trigger_exit(LADDER.id);
        assert!(!c.is_climbing());
        assert_eq!(c.ladder(), None);
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: false
            }]
        );
        assert_eq!(c.stop_climbing(), Err(CharacterError::NotClimbing));
    }

    #[test]
    fn dying_restores_climbed_floor_not_latest_ladder() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.on_trigger_enter(Interactable::Ladder(UPPER_LADDER));
        c.drain_events();
        c.die();
        assert_eq!(
            c.drain_events()[0],
            CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: false
            }
        );
    }

    #[test]
    fn ladder_replaced_when_not_climbing() {
        let mut c = on_ladder();
        c.on_trigger_enter(Interactable::Ladder(UPPER_LADDER));
        assert_eq!(c.ladder(), Some(UPPER_LADDER));
        c.start_climbing().unwrap();
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(6),
                ignored: true
            }]
        );
    }

    #[test]
    fn start_climbing_without_ladder_fails() {
        let mut c = character();
        assert_eq!(c.start_climbing(), Err(CharacterError::NoLadder));
        assert_eq!(c.activity(), Activity::Idle);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn double_start_climbing_fails() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        assert_eq!(c.start_climbing(), Err(CharacterError::AlreadyClimbing));
    }

    #[test]
    fn stop_climbing_when_not_climbing_fails() {
        let mut c = on_ladder();
        assert_eq!(c.stop_climbing(), Err(CharacterError::NotClimbing));
    }

    #[test]
    fn climbing_blocked_while_repairing() {
        let mut c = at_breach();
        c.on_trigger_enter(Interactable::Ladder(LADDER));
        c.start_repairing().unwrap();
        assert_eq!(
            c.start_climbing(),
            Err(CharacterError::Busy {
                current: Activity::Repairing,
                attempted: Activity::Climbing
            })
        );
        assert!(c.is_repairing());
    }

    // --- Movement ---

    #[test]
    fn walk_sets_target_speed_and_facing() {
        let mut c = character();
        c.walk_to(Vec2::new(-0.1, 0.0)).unwrap();
        assert_eq!(c.activity(), Activity::Walking);
        assert_eq!(c.speed(), 1.0);
        assert!(c.facing_left());
        assert_eq!(c.pending_move(), Some(Vec2::new(-0.1, 0.0)));

        c.physics_step(0.02);
        assert_eq!(c.position(), Vec2::new(-0.1, 0.0));
        assert_eq!(c.pending_move(), None);

        c.walk_to(Vec2::new(0.5, 0.0)).unwrap();
        assert!(!c.facing_left());
    }

    #[test]
    fn walk_while_climbing_fails() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        let err = c.walk_to(Vec2::new(1.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            CharacterError::Busy {
                current: Activity::Climbing,
                attempted: Activity::Walking
            }
        );
        assert_eq!(err.to_string(), "Character can't be walking while climbing");
        assert_eq!(c.pending_move(), None);
    }

    #[test]
    fn climb_to_requires_climbing() {
        let mut c = on_ladder();
        assert_eq!(
            c.climb_to(Vec2::new(0.0, 1.0)),
            Err(CharacterError::NotClimbing)
        );
        c.start_climbing().unwrap();
        c.climb_to(Vec2::new(0.0, 0.1)).unwrap();
        assert_eq!(c.speed(), 1.0);
        c.physics_step(0.02);
        assert_eq!(c.position(), Vec2::new(0.0, 0.1));
    }

    #[test]
    fn idle_to_keeps_climbing_but_stops_walking() {
        let mut c = on_ladder();
        c.walk_to(Vec2::new(0.1, 0.0)).unwrap();
        c.idle_to(Vec2::new(0.1, -0.05)).unwrap();
        assert_eq!(c.activity(), Activity::Idle);
        assert_eq!(c.speed(), 0.0);

        c.start_climbing().unwrap();
        c.idle_to(Vec2::new(0.1, 0.0)).unwrap();
        assert_eq!(c.activity(), Activity::Climbing);
        assert_eq!(c.speed(), 0.0);
    }

    // --- Overlap tracking ---

    #[test]
    fn exit_ladder_while_climbing_stops_climbing() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.drain_events();
        c.on_trigger_exit(LADDER.id);
        assert_eq!(c.activity(), Activity::Idle);
        assert_eq!(c.ladder(), None);
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::SetCollisionIgnored {
                floor: EntityId(2),
                ignored: false
            }]
        );
    }

    #[test]
    fn exit_unrelated_trigger_keeps_references() {
        let mut c = on_ladder();
        c.on_trigger_enter(Interactable::Door(DOOR));
        c.on_trigger_exit(EntityId(999));
        assert_eq!(c.ladder(), Some(LADDER));
        assert_eq!(c.door(), Some(DOOR));
        c.on_trigger_exit(DOOR);
        assert_eq!(c.door(), None);
        assert_eq!(c.ladder(), Some(LADDER));
    }

    #[test]
    fn entering_second_ladder_replaces_first() {
        let mut c = on_ladder();
        c.on_trigger_enter(Interactable::Ladder(UPPER_LADDER));
        assert_eq!(c.ladder(), Some(UPPER_LADDER));
        // Leaving the old one no longer matches
        c.on_trigger_exit(LADDER.id);
        assert_eq!(c.ladder(), Some(UPPER_LADDER));
    }

    #[test]
    fn exit_breach_abandons_repair() {
        let mut c = at_breach();
        c.start_repairing().unwrap();
        c.repair_hit().unwrap();
        c.on_trigger_exit(BREACH);
        assert_eq!(c.activity(), Activity::Idle);
        assert_eq!(c.repair_hits(), 0);
        assert_eq!(c.breach(), None);
    }

    // --- Repairing ---

    #[test]
    fn repair_completes_on_threshold() {
        let mut c = at_breach();
        c.start_repairing().unwrap();
        for i in 1..5 {
            assert_eq!(
                c.repair_hit(),
                Ok(RepairProgress::Hit { hits: i, needed: 5 })
            );
        }
        assert!(c.drain_events().is_empty());
        assert_eq!(
            c.repair_hit(),
            Ok(RepairProgress::Completed { breach: BREACH })
        );
        assert_eq!(c.activity(), Activity::Idle);
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::BreachRepaired { breach: BREACH }]
        );
    }

    #[test]
    fn start_repairing_resets_hits() {
        let mut c = at_breach();
        c.start_repairing().unwrap();
        c.repair_hit().unwrap();
        c.repair_hit().unwrap();
        c.stop_repairing().unwrap();
        c.start_repairing().unwrap();
        assert_eq!(c.repair_hits(), 0);
    }

    #[test]
    fn repair_without_breach_fails_at_completion() {
        let config = GameConfig {
            repair_hits_needed: 2,
            ..GameConfig::default()
        };
        let mut c = Character::new(config, Vec2::ZERO);
        c.start_repairing().unwrap();
        c.repair_hit().unwrap();
        assert_eq!(c.repair_hit(), Err(CharacterError::NoBreach));
        assert!(c.is_repairing());
        assert!(c.drain_events().is_empty());

        // Arriving at a breach lets the next hit finish the job
        c.on_trigger_enter(Interactable::Breach(BREACH));
        assert_eq!(
            c.repair_hit(),
            Ok(RepairProgress::Completed { breach: BREACH })
        );
    }

    #[test]
    fn repair_hit_requires_repairing() {
        let mut c = at_breach();
        assert_eq!(c.repair_hit(), Err(CharacterError::NotRepairing));
        assert_eq!(c.stop_repairing(), Err(CharacterError::NotRepairing));
    }

    #[test]
    fn repair_blocked_while_climbing() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        assert_eq!(
            c.start_repairing(),
            Err(CharacterError::Busy {
                current: Activity::Climbing,
                attempted: Activity::Repairing
            })
        );
    }

    #[test]
    fn double_start_repairing_fails() {
        let mut c = at_breach();
        c.start_repairing().unwrap();
        assert_eq!(c.start_repairing(), Err(CharacterError::AlreadyRepairing));
    }

    // --- Doors ---

    #[test]
    fn toggle_door_requires_door() {
        let mut c = character();
        assert_eq!(c.toggle_door(), Err(CharacterError::NoDoor));
        c.on_trigger_enter(Interactable::Door(DOOR));
        c.toggle_door().unwrap();
        assert_eq!(
            c.drain_events(),
            vec![CharacterEvent::DoorToggleRequested { door: DOOR }]
        );
    }

    // --- Death ---

    #[test]
    fn die_while_climbing_exits_climbing_first() {
        let mut c = on_ladder();
        c.start_climbing().unwrap();
        c.drain_events();
        c.die();
        assert!(c.is_dead());
        assert_eq!(
            c.drain_events(),
            vec![
                CharacterEvent::SetCollisionIgnored {
                    floor: EntityId(2),
                    ignored: false
                },
                CharacterEvent::Died {
                    head_under_water: false
                },
            ]
        );
    }

    #[test]
    fn die_is_idempotent() {
        let mut c = character();
        c.die();
        c.drain_events();
        c.die();
        assert!(c.is_dead());
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn dead_blocks_everything() {
        let mut c = on_ladder();
        c.on_trigger_enter(Interactable::Breach(BREACH));
        c.on_trigger_enter(Interactable::Door(DOOR));
        c.die();
        assert_eq!(c.start_climbing(), Err(CharacterError::Dead));
        assert_eq!(c.start_repairing(), Err(CharacterError::Dead));
        assert_eq!(c.walk_to(Vec2::new(1.0, 0.0)), Err(CharacterError::Dead));
        assert_eq!(c.climb_to(Vec2::new(0.0, 1.0)), Err(CharacterError::Dead));
        assert_eq!(c.idle_to(Vec2::ZERO), Err(CharacterError::Dead));
        assert_eq!(c.toggle_door(), Err(CharacterError::Dead));
        assert_eq!(c.activity(), Activity::Dead);
    }

    #[test]
    fn dead_ignores_trigger_enter() {
        let mut c = character();
        c.die();
        c.on_trigger_enter(Interactable::Ladder(LADDER));
        assert_eq!(c.ladder(), None);
    }

    #[test]
    fn dead_has_no_ground_contact() {
        let mut c = character();
        c.update_frame(&|_, _| true);
        assert!(c.touching_ground());
        c.die();
        c.update_frame(&|_, _| true);
        assert!(!c.touching_ground());
    }

    #[test]
    fn dead_body_falls_in_air_and_floats_under_water() {
        let mut c = character();
        c.die();
        c.update_frame(&|_, _| false);
        c.physics_step(0.1);
        // v = -10 * 0.1 = -1, y = -0.1
        assert!((c.position().y + 0.1).abs() < 1e-5, "y={}", c.position().y);

        let mut c = character();
        c.add_water_area(Rect::new(Vec2::new(-5.0, -5.0), Vec2::new(5.0, 5.0)));
        c.update_frame(&|_, _| false);
        assert!(c.head_under_water());
        c.die();
        c.physics_step(1.0);
        // buoyancy -0.1 → accelerates upward
        assert!(c.position().y > 0.0, "y={}", c.position().y);
    }

    #[test]
    fn land_at_cancels_dead_velocity() {
        let mut c = character();
        c.die();
        c.physics_step(0.5);
        c.land_at(Vec2::new(0.0, -1.0));
        c.physics_step(0.0);
        assert_eq!(c.position(), Vec2::new(0.0, -1.0));
    }

    // --- Water ---

    #[test]
    fn water_flags_follow_feet_and_head() {
        let mut c = character();
        // Surface at y = 0: feet (-0.5) under, head (+0.5) dry
        c.set_water_areas(vec![Rect::new(
            Vec2::new(-10.0, -10.0),
            Vec2::new(10.0, 0.0),
        )]);
        c.update_frame(&|_, _| false);
        assert!(c.feet_under_water());
        assert!(!c.head_under_water());
    }

    #[test]
    fn water_boundary_is_submerged() {
        let mut c = character();
        // Top edge exactly at the head
        c.set_water_areas(vec![Rect::new(
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, 0.5),
        )]);
        c.update_frame(&|_, _| false);
        assert!(c.head_under_water());
    }

    #[test]
    fn no_water_is_dry() {
        let mut c = character();
        c.update_frame(&|_, _| false);
        assert!(!c.feet_under_water());
        assert!(!c.head_under_water());
    }

    #[test]
    fn ground_probe_uses_feet() {
        let mut c = character();
        c.update_frame(&|origin, dist| {
            (origin.y + 0.5).abs() < 1e-6 && (dist - GROUND_PROBE_DISTANCE).abs() < 1e-6
        });
        assert!(c.touching_ground());
    }
}
