//! Component definitions for the ship world.
//!
//! Components are pure data attached to hecs entities. A ladder, breach or
//! door is an entity carrying its marker component plus a [`Trigger`] volume.

use hecs::Entity;
use serde::{Deserialize, Serialize};
use sinkship_logic::character::EntityId;
use sinkship_logic::geometry::{Rect, Vec2};

/// Convert a world entity into the handle the character logic stores.
pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Inverse of [`entity_id`]. `None` for handles that never came from a world.
pub fn entity_from_id(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

/// Tolerance below a floor surface that still counts as standing on it.
pub const CONTACT_SKIN: f32 = 1.0e-4;

/// Trigger volume. Overlap is tested against the character origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Trigger(pub Rect);

/// Walkable one-way surface at height `y` spanning `min_x..=max_x`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Floor {
    pub min_x: f32,
    pub max_x: f32,
    pub y: f32,
}

impl Floor {
    pub fn new(min_x: f32, max_x: f32, y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            y,
        }
    }

    pub fn spans(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    /// Downward ray from `origin` of length `distance` hits this floor.
    pub fn hit_by_ray(&self, origin: Vec2, distance: f32) -> bool {
        let drop = origin.y - self.y;
        self.spans(origin.x) && (-CONTACT_SKIN..=distance).contains(&drop)
    }
}

/// Ladder volume; `transition_floor` is the floor entity at its top that the
/// climber passes through.
#[derive(Debug, Clone, Copy)]
pub struct Ladder {
    pub transition_floor: Entity,
}

/// Hull breach, owned by a room.
#[derive(Debug, Clone, Copy)]
pub struct Breach {
    pub room: Option<Entity>,
    pub repaired: bool,
}

/// Door marker. The open/closed sub-state lives in [`DoorState`], which a
/// door may lack.
#[derive(Debug, Clone, Copy, Default)]
pub struct Door;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorState {
    pub closed: bool,
}

/// A room of the ship; receives repair-complete notifications for its breaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub bounds: Rect,
    pub open_breaches: u32,
    pub repairs_completed: u32,
}

impl Room {
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            bounds,
            open_breaches: 0,
            repairs_completed: 0,
        }
    }

    pub fn is_leaking(&self) -> bool {
        self.open_breaches > 0
    }

    /// Repair-complete entry point.
    pub fn complete_repair(&mut self) {
        self.open_breaches = self.open_breaches.saturating_sub(1);
        self.repairs_completed += 1;
    }
}

/// Body of water; its rectangle is handed to the character for submersion
/// tests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaterBody(pub Rect);
