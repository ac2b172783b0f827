//! SinkShip Core - headless ship world for the character logic
//!
//! A small ECS world (via `hecs`) that stands in for the game engine:
//! - **Entities**: rooms, floors, ladders, breaches, doors, water bodies
//! - **Components**: plain data ([`components`])
//! - **Engine**: [`engine::ShipSim`] runs the per-frame and per-physics-step
//!   callbacks, detects trigger overlaps, and applies the character's
//!   requests (ignore a floor, repair a breach, toggle a door)
//!
//! # Example
//!
//! ```rust,no_run
//! use rand::SeedableRng;
//! use sinkship_core::prelude::*;
//! use sinkship_core::generation::{generate_ship, ShipConfig};
//!
//! let mut sim = ShipSim::new(GameConfig::default(), Vec2::new(1.0, 0.5));
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! generate_ship(&mut sim, &ShipConfig::default(), &mut rng);
//!
//! loop {
//!     sim.step(PlayerInput::walk(1.0), 1.0 / 50.0).ok();
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::ShipSim;
    pub use sinkship_logic::character::{Activity, Character, CharacterError, RepairProgress};
    pub use sinkship_logic::config::GameConfig;
    pub use sinkship_logic::geometry::{Rect, Vec2};
    pub use sinkship_logic::intent::{PlayerInput, StepOutcome};
}
