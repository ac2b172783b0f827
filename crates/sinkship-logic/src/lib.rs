//! Pure character logic for SinkShip.
//!
//! This crate contains the character's interaction state machine and
//! everything it needs, independent of any engine. The host feeds it
//! trigger notifications, a ground-probe closure and per-step input, and
//! drains the events it produces, so every rule is unit-testable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`character`] | Idle/Walking/Climbing/Repairing/Dead state machine, overlap tracking, events |
//! | [`config`] | Game tunables, JSON loading and validation |
//! | [`geometry`] | 2D vectors and edge-inclusive rectangles (water areas) |
//! | [`intent`] | Player input → character calls, with hand-rolled gravity |

pub mod character;
pub mod config;
pub mod geometry;
pub mod intent;
