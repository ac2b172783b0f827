//! Ship generation - decks of rooms stacked on top of each other, joined by
//! ladders through hatches in the deck above.

use hecs::Entity;
use rand::Rng;
use sinkship_logic::geometry::{Rect, Vec2};

use crate::components::{DoorState, Floor};
use crate::engine::ShipSim;

/// Width of a ladder and the hatch above it.
const LADDER_WIDTH: f32 = 1.0;
/// How far a ladder volume reaches above the deck it leads to, so a
/// character standing on the hatch is still on the ladder.
const LADDER_OVERHANG: f32 = 0.6;
const DOOR_WIDTH: f32 = 1.0;
const DOOR_HEIGHT: f32 = 2.0;
const BREACH_WIDTH: f32 = 1.5;
const BREACH_HEIGHT: f32 = 1.5;

/// Configuration for ship generation
#[derive(Debug, Clone)]
pub struct ShipConfig {
    pub name: String,
    pub num_decks: u32,
    pub rooms_per_deck: u32,
    /// Room width in meters
    pub room_width: f32,
    /// Floor-to-floor height in meters
    pub deck_height: f32,
    /// Chance that any given room starts with a breach
    pub breach_chance: f64,
    /// Initial water surface height, if the ship is already taking water
    pub water_level: Option<f32>,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            name: "Mary Rose".to_string(),
            num_decks: 3,
            rooms_per_deck: 3,
            room_width: 6.0,
            deck_height: 3.0,
            breach_chance: 0.3,
            water_level: Some(0.8),
        }
    }
}

/// Entities created for one deck.
#[derive(Debug, Clone)]
pub struct DeckLayout {
    pub level: u32,
    pub floor_y: f32,
    pub floors: Vec<Entity>,
    /// Hatch above the ladder from the deck below, if any
    pub hatch: Option<Entity>,
    pub rooms: Vec<Entity>,
    pub doors: Vec<Entity>,
}

/// Generated ship structure
#[derive(Debug, Clone)]
pub struct ShipLayout {
    pub name: String,
    pub width: f32,
    pub decks: Vec<DeckLayout>,
    /// `ladders[i]` joins deck `i` to deck `i + 1`
    pub ladders: Vec<Entity>,
    pub breaches: Vec<Entity>,
    pub water: Option<Entity>,
}

impl ShipLayout {
    pub fn room_count(&self) -> usize {
        self.decks.iter().map(|d| d.rooms.len()).sum()
    }

    /// Standing position (character origin) at `x` on deck `level`.
    pub fn standing_spot(&self, level: usize, x: f32) -> Option<Vec2> {
        self.decks
            .get(level)
            .map(|d| Vec2::new(x, d.floor_y + 0.5))
    }
}

/// Generate a ship into `sim`.
pub fn generate_ship(sim: &mut ShipSim, config: &ShipConfig, rng: &mut impl Rng) -> ShipLayout {
    let rooms_per_deck = config.rooms_per_deck.max(1);
    // Leave room for floor on both sides of a hatch
    let room_width = config.room_width.max(LADDER_WIDTH * 3.0);
    let width = rooms_per_deck as f32 * room_width;
    let num_decks = config.num_decks.max(1);

    // Ladder x positions, one per deck gap
    let ladder_xs: Vec<f32> = (1..num_decks)
        .map(|_| rng.gen_range(LADDER_WIDTH..width - LADDER_WIDTH))
        .collect();

    let mut layout = ShipLayout {
        name: config.name.clone(),
        width,
        decks: Vec::new(),
        ladders: Vec::new(),
        breaches: Vec::new(),
        water: None,
    };

    for level in 0..num_decks {
        let floor_y = level as f32 * config.deck_height;
        let mut deck = DeckLayout {
            level,
            floor_y,
            floors: Vec::new(),
            hatch: None,
            rooms: Vec::new(),
            doors: Vec::new(),
        };

        // Floors: solid on the bottom deck, split around the hatch above
        // each ladder otherwise
        if level == 0 {
            deck.floors.push(sim.spawn_floor(Floor::new(0.0, width, floor_y)));
        } else {
            let lx = ladder_xs[level as usize - 1];
            let half = LADDER_WIDTH / 2.0;
            deck.floors
                .push(sim.spawn_floor(Floor::new(0.0, lx - half, floor_y)));
            let hatch = sim.spawn_floor(Floor::new(lx - half, lx + half, floor_y));
            deck.floors.push(hatch);
            deck.floors
                .push(sim.spawn_floor(Floor::new(lx + half, width, floor_y)));
            deck.hatch = Some(hatch);
        }

        for i in 0..rooms_per_deck {
            let x0 = i as f32 * room_width;
            let bounds = Rect::new(
                Vec2::new(x0, floor_y),
                Vec2::new(x0 + room_width, floor_y + config.deck_height),
            );
            let room = sim.spawn_room(format!("Deck {} Room {}", level, i), bounds);
            deck.rooms.push(room);

            if i > 0 {
                let door = sim.spawn_door(
                    Rect::from_center_size(
                        Vec2::new(x0, floor_y + DOOR_HEIGHT / 2.0),
                        DOOR_WIDTH,
                        DOOR_HEIGHT,
                    ),
                    Some(DoorState::default()),
                );
                deck.doors.push(door);
            }

            if rng.gen_bool(config.breach_chance.clamp(0.0, 1.0)) {
                let half = BREACH_WIDTH / 2.0;
                let bx = rng.gen_range(x0 + half..x0 + room_width - half);
                let breach = sim.spawn_breach(
                    Rect::from_center_size(
                        Vec2::new(bx, floor_y + BREACH_HEIGHT / 2.0),
                        BREACH_WIDTH,
                        BREACH_HEIGHT,
                    ),
                    Some(room),
                );
                layout.breaches.push(breach);
            }
        }

        layout.decks.push(deck);
    }

    // Ladders need the hatch of the deck above
    for (gap, &lx) in ladder_xs.iter().enumerate() {
        let lower = &layout.decks[gap];
        let upper = &layout.decks[gap + 1];
        let Some(hatch) = upper.hatch else {
            continue;
        };
        let volume = Rect::new(
            Vec2::new(lx - LADDER_WIDTH / 2.0, lower.floor_y),
            Vec2::new(lx + LADDER_WIDTH / 2.0, upper.floor_y + LADDER_OVERHANG),
        );
        layout.ladders.push(sim.spawn_ladder(volume, hatch));
    }

    if let Some(level) = config.water_level {
        let area = Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(width + 1.0, level));
        layout.water = Some(sim.spawn_water(area));
    }

    log::info!(
        "Generated '{}': {} decks, {} rooms, {} ladders, {} breaches",
        layout.name,
        layout.decks.len(),
        layout.room_count(),
        layout.ladders.len(),
        layout.breaches.len()
    );

    layout
}
