//! World module
//!
//! Contains the grid, cell kinds, fog of war, and procedural generation.

pub mod map;
pub mod tile;
pub mod fov;
pub mod generation;

pub use map::{Grid, Room, ROOM_HEIGHT, ROOM_WIDTH};
pub use tile::CellKind;
pub use fov::{torch_area, Reveal, Visibility, TORCH_RADIUS};
