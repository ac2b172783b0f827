//! Input → character intent, once per physics step.
//!
//! The controller owns nothing but its fall velocity; every decision is a
//! call into [`Character`], so it can never put the character in a state the
//! state machine would reject. It only makes calls whose preconditions it has
//! checked, and any error that still comes back is passed to the caller.

use crate::character::{Activity, Character, CharacterError, RepairProgress};
use crate::config::GameConfig;
use crate::geometry::Vec2;

/// Raw input for one step. Axes are in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub move_x: f32,
    pub move_y: f32,
    /// Swing the hammer this step.
    pub hammer: bool,
    pub use_door: bool,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn walk(move_x: f32) -> Self {
        Self {
            move_x,
            ..Self::default()
        }
    }

    pub fn climb(move_y: f32) -> Self {
        Self {
            move_y,
            ..Self::default()
        }
    }

    pub fn hammer() -> Self {
        Self {
            hammer: true,
            ..Self::default()
        }
    }

    pub fn door() -> Self {
        Self {
            use_door: true,
            ..Self::default()
        }
    }
}

/// What the controller made the character do this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Dead,
    Walked,
    Idled,
    Climbed,
    StartedClimbing,
    StoppedClimbing,
    Repair(RepairProgress),
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    config: GameConfig,
    /// Downward speed while airborne.
    fall_velocity: f32,
}

impl PlayerController {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            fall_velocity: 0.0,
        }
    }

    pub fn fall_velocity(&self) -> f32 {
        self.fall_velocity
    }

    /// Zero out axis values inside the dead zone.
    fn axis(&self, value: f32) -> f32 {
        if value.abs() < self.config.direction_input_min_threshold {
            0.0
        } else {
            value.clamp(-1.0, 1.0)
        }
    }

    /// Vertical displacement from our own gravity this step.
    fn fall(&mut self, character: &Character, dt: f32) -> f32 {
        if character.touching_ground() {
            self.fall_velocity = 0.0;
            return 0.0;
        }
        self.fall_velocity += self.config.gravity * dt;
        -self.fall_velocity * dt
    }

    /// Drive `character` for one physics step.
    pub fn fixed_update(
        &mut self,
        character: &mut Character,
        input: PlayerInput,
        dt: f32,
    ) -> Result<StepOutcome, CharacterError> {
        if character.is_dead() {
            self.fall_velocity = 0.0;
            return Ok(StepOutcome::Dead);
        }

        let dx = self.axis(input.move_x);
        let dy = self.axis(input.move_y);
        let pos = character.position();

        if input.use_door && character.door().is_some() {
            character.toggle_door()?;
        }

        if character.is_climbing() {
            self.fall_velocity = 0.0;
            let grounded = character.touching_ground();
            if grounded && (dx != 0.0 || dy < 0.0) {
                character.stop_climbing()?;
                return Ok(StepOutcome::StoppedClimbing);
            }
            if dy != 0.0 {
                let step = self.config.climb_speed * dt;
                character.climb_to(Vec2::new(pos.x, pos.y + dy * step))?;
                return Ok(StepOutcome::Climbed);
            }
            character.idle_to(pos)?;
            return Ok(StepOutcome::Idled);
        }

        if dy != 0.0 && character.ladder().is_some() && !character.is_repairing() {
            character.start_climbing()?;
            return Ok(StepOutcome::StartedClimbing);
        }

        if character.is_repairing() && dx != 0.0 {
            character.stop_repairing()?;
        }

        if input.hammer && character.breach().is_some() {
            if !character.is_repairing() {
                character.start_repairing()?;
            }
            let progress = character.repair_hit()?;
            let fall = self.fall(character, dt);
            character.idle_to(Vec2::new(pos.x, pos.y + fall))?;
            return Ok(StepOutcome::Repair(progress));
        }

        let fall = self.fall(character, dt);
        if dx != 0.0 && character.activity() != Activity::Repairing {
            let step = self.config.walk_speed * dt;
            character.walk_to(Vec2::new(pos.x + dx * step, pos.y + fall))?;
            Ok(StepOutcome::Walked)
        } else {
            character.idle_to(Vec2::new(pos.x, pos.y + fall))?;
            Ok(StepOutcome::Idled)
        }
    }
}
