//! Procedural dungeon generation
//!
//! A generation attempt can come out degenerate; the stage builder throws
//! those away and tries again with a fresh seed, up to
//! [`MAX_GENERATION_ATTEMPTS`] times.

pub mod maze;

pub use maze::{generate_maze, Dungeon};

use crate::world::map::{ROOM_HEIGHT, ROOM_WIDTH};

/// Attempts before generation is given up as impossible
pub const MAX_GENERATION_ATTEMPTS: u32 = 16;

/// A playable maze holds at least two rooms worth of floor
pub const MIN_FLOOR_CELLS: usize = (2 * ROOM_WIDTH * ROOM_HEIGHT) as usize;

/// Check a maze is usable: enough floor, and every walkable cell reachable
/// from the start room
pub fn is_playable(dungeon: &Dungeon) -> bool {
    if dungeon.grid.walkable_count() < MIN_FLOOR_CELLS {
        log::debug!("Rejecting maze: only {} floor cells", dungeon.grid.walkable_count());
        return false;
    }
    if dungeon.lair == dungeon.start_room {
        log::debug!("Rejecting maze: no room left for the lair");
        return false;
    }
    if !dungeon.grid.is_connected_from(dungeon.start_room.center()) {
        log::debug!("Rejecting maze: not fully connected");
        return false;
    }
    true
}
