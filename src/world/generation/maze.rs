//! Room maze generator
//!
//! The field is a lattice of equal rooms. A randomized Prim spanning tree
//! over the rooms decides which shared walls get a corridor, so every room
//! joins the maze by extending from one that is already connected.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ecs::Position;
use crate::game::FieldSize;
use crate::world::map::{Grid, Room, ROOM_HEIGHT, ROOM_WIDTH};
use crate::world::CellKind;

/// Corridor size through a vertical wall (rows)
pub const CORRIDOR_H_WIDTH: i32 = 2;
/// Corridor size through a horizontal wall (columns)
pub const CORRIDOR_V_WIDTH: i32 = 3;

/// A generated maze and its notable rooms
#[derive(Debug, Clone)]
pub struct Dungeon {
    pub grid: Grid,
    /// Where the spanning tree started; the player starts here
    pub start_room: Room,
    /// Guarded room holding the treasure chest
    pub lair: Room,
    /// Rooms with a single corridor (start room excluded)
    pub dead_ends: Vec<Room>,
    /// Spanning tree edges, in carving order
    pub passages: Vec<(Room, Room)>,
}

/// Generate a connected room maze
pub fn generate_maze(rng: &mut StdRng, field: FieldSize, narrow_corridors: bool) -> Dungeon {
    let mut grid = Grid::new(field);
    let rooms: Vec<Room> = grid.rooms().collect();

    for room in &rooms {
        for cell in room.cells() {
            grid.set_cell(cell, CellKind::Floor);
        }
    }

    let (start_room, passages) = spanning_tree(rng, &grid, &rooms);

    let (h_width, v_width) = if narrow_corridors {
        (CORRIDOR_H_WIDTH - 1, CORRIDOR_V_WIDTH - 1)
    } else {
        (CORRIDOR_H_WIDTH, CORRIDOR_V_WIDTH)
    };
    for &(a, b) in &passages {
        carve_passage(rng, &mut grid, a, b, h_width, v_width);
    }

    let (lair, dead_ends) = designate_rooms(&rooms, start_room, &passages);

    Dungeon { grid, start_room, lair, dead_ends, passages }
}

/// Randomized Prim over the room lattice
fn spanning_tree(rng: &mut StdRng, grid: &Grid, rooms: &[Room]) -> (Room, Vec<(Room, Room)>) {
    let mut unconnected: HashSet<Room> = rooms.iter().copied().collect();
    let start = rooms[rng.gen_range(0..rooms.len())];
    unconnected.remove(&start);

    let mut frontier = vec![start];
    let mut passages = Vec::with_capacity(rooms.len().saturating_sub(1));

    while !frontier.is_empty() {
        let i = rng.gen_range(0..frontier.len());
        let current = frontier[i];

        let candidates: Vec<Room> = current
            .adjacent()
            .into_iter()
            .filter(|r| grid.contains_room(*r) && unconnected.contains(r))
            .collect();

        match candidates.choose(rng) {
            Some(&next) => {
                unconnected.remove(&next);
                frontier.push(next);
                passages.push((current, next));
            }
            None => {
                // Nothing left to grow into from here
                frontier.swap_remove(i);
            }
        }
    }

    (start, passages)
}

/// Open a corridor through the wall shared by two adjacent rooms
fn carve_passage(rng: &mut StdRng, grid: &mut Grid, a: Room, b: Room, h_width: i32, v_width: i32) {
    let (first, second) = if (a.col, a.row) <= (b.col, b.row) { (a, b) } else { (b, a) };

    if first.row == second.row {
        let x = second.col * (ROOM_WIDTH + 1);
        let d = rng.gen_range(0..=ROOM_HEIGHT - h_width) + 1;
        for dy in 0..h_width {
            grid.set_cell(Position::new(x, first.row * (ROOM_HEIGHT + 1) + d + dy), CellKind::Floor);
        }
    } else {
        let y = second.row * (ROOM_HEIGHT + 1);
        let d = rng.gen_range(0..=ROOM_WIDTH - v_width) + 1;
        for dx in 0..v_width {
            grid.set_cell(Position::new(first.col * (ROOM_WIDTH + 1) + d + dx, y), CellKind::Floor);
        }
    }
}

/// Pick the lair (the dead end farthest from the start along the tree) and
/// list the dead ends
fn designate_rooms(rooms: &[Room], start: Room, passages: &[(Room, Room)]) -> (Room, Vec<Room>) {
    let mut links: HashMap<Room, Vec<Room>> = HashMap::new();
    for &(a, b) in passages {
        links.entry(a).or_default().push(b);
        links.entry(b).or_default().push(a);
    }

    let mut depth: HashMap<Room, u32> = HashMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(room) = queue.pop_front() {
        let d = depth[&room];
        for next in links.get(&room).into_iter().flatten() {
            if !depth.contains_key(next) {
                depth.insert(*next, d + 1);
                queue.push_back(*next);
            }
        }
    }

    let dead_ends: Vec<Room> = rooms
        .iter()
        .copied()
        .filter(|r| *r != start && links.get(r).map_or(0, Vec::len) == 1)
        .collect();

    let farthest = |candidates: &mut dyn Iterator<Item = Room>| {
        candidates.fold(None::<(Room, u32)>, |best, room| {
            let d = depth.get(&room).copied().unwrap_or(0);
            match best {
                Some((_, best_d)) if best_d >= d => best,
                _ => Some((room, d)),
            }
        })
    };

    let lair = farthest(&mut dead_ends.iter().copied())
        .or_else(|| farthest(&mut rooms.iter().copied().filter(|r| *r != start)))
        .map_or(start, |(room, _)| room);

    (lair, dead_ends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_tree_spans_all_rooms() {
        let mut rng = StdRng::seed_from_u64(7);
        let dungeon = generate_maze(&mut rng, FieldSize::STANDARD, false);
        assert_eq!(dungeon.passages.len(), 27);
        assert!(dungeon.grid.is_connected_from(dungeon.start_room.center()));
    }

    #[test]
    fn test_lair_is_not_start() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let dungeon = generate_maze(&mut rng, FieldSize::new(2, 1), false);
            assert_ne!(dungeon.lair, dungeon.start_room);
            assert_eq!(dungeon.dead_ends, vec![dungeon.lair]);
        }
    }

    #[test]
    fn test_narrow_corridors_open_fewer_cells() {
        let wide = generate_maze(&mut StdRng::seed_from_u64(3), FieldSize::STANDARD, false);
        let narrow = generate_maze(&mut StdRng::seed_from_u64(3), FieldSize::STANDARD, true);
        assert!(narrow.grid.walkable_count() < wide.grid.walkable_count());
        assert!(narrow.grid.is_connected_from(narrow.start_room.center()));
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate_maze(&mut StdRng::seed_from_u64(99), FieldSize::LARGE, false);
        let b = generate_maze(&mut StdRng::seed_from_u64(99), FieldSize::LARGE, false);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.lair, b.lair);
    }
}
