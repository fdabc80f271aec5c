//! arlq - a turn-based dungeon crawl
//!
//! Walk a maze of rooms in the dark, fight whatever you bump into, and
//! find the treasure chest before your food runs out.
//!
//! The library is the rule engine: build a [`Stage`] from a
//! [`StageConfig`], feed it [`Input`]s through [`Stage::step`], and draw
//! the [`Snapshot`] it hands back. The terminal front end lives behind the
//! `tui` feature.

pub mod game;
pub mod ecs;
pub mod world;
pub mod entities;
pub mod combat;
pub mod data;
pub mod error;
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use game::{EngineState, Input, MoveOutcome, Snapshot, Stage, StageConfig, TurnEvent, TurnReport};
pub use error::{ConfigError, DataError, GenerationError, StageError};
pub use ecs::components::*;
pub use world::map::Grid;
