//! Entity Component System module
//!
//! Components for everything that stands in the dungeon, and the queries
//! run against them.

pub mod components;
pub mod systems;

pub use components::*;
pub use systems::{occupant_at, Occupant};
