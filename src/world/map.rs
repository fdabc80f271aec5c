//! Grid data structure
//!
//! The 2D cell array of a stage, laid out as a lattice of rooms separated
//! by one-cell walls.

use super::tile::CellKind;
use crate::ecs::Position;
use crate::game::FieldSize;

/// Floor cells per room, horizontally
pub const ROOM_WIDTH: i32 = 10;
/// Floor cells per room, vertically
pub const ROOM_HEIGHT: i32 = 4;

/// A room of the lattice, addressed by its column and row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Room {
    pub col: i32,
    pub row: i32,
}

impl Room {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Top-left floor cell
    pub fn origin(&self) -> Position {
        Position::new(self.col * (ROOM_WIDTH + 1) + 1, self.row * (ROOM_HEIGHT + 1) + 1)
    }

    pub fn center(&self) -> Position {
        self.origin().offset(ROOM_WIDTH / 2, ROOM_HEIGHT / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        let o = self.origin();
        pos.x >= o.x && pos.x < o.x + ROOM_WIDTH && pos.y >= o.y && pos.y < o.y + ROOM_HEIGHT
    }

    /// All floor cells of the room, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let o = self.origin();
        (0..ROOM_HEIGHT).flat_map(move |dy| (0..ROOM_WIDTH).map(move |dx| o.offset(dx, dy)))
    }

    /// Rooms sharing a wall with this one (may be outside the lattice)
    pub fn adjacent(&self) -> [Room; 4] {
        [
            Room::new(self.col, self.row - 1),
            Room::new(self.col, self.row + 1),
            Room::new(self.col - 1, self.row),
            Room::new(self.col + 1, self.row),
        ]
    }
}

/// A stage's cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    rooms_wide: i32,
    rooms_high: i32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Create a grid that is wall everywhere: an unbreakable border around
    /// breakable interior walls
    pub fn new(field: FieldSize) -> Self {
        let rooms_wide = field.rooms_wide as i32;
        let rooms_high = field.rooms_high as i32;
        let width = (ROOM_WIDTH + 1) * rooms_wide + 1;
        let height = (ROOM_HEIGHT + 1) * rooms_high + 1;

        let mut cells = vec![CellKind::BreakableWall; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[(y * width + x) as usize] = CellKind::Wall;
                }
            }
        }

        Self { width, height, rooms_wide, rooms_high, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rooms_wide(&self) -> i32 {
        self.rooms_wide
    }

    pub fn rooms_high(&self) -> i32 {
        self.rooms_high
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_pos(&self, idx: usize) -> Position {
        let idx = idx as i32;
        Position::new(idx % self.width, idx / self.width)
    }

    /// Check if a position is within bounds
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Cell kind at a position; anything outside the field is wall
    pub fn cell_at(&self, pos: Position) -> CellKind {
        if self.in_bounds(pos) {
            self.cells[self.xy_to_idx(pos.x, pos.y)]
        } else {
            CellKind::Wall
        }
    }

    /// Set the cell kind at a position (ignored outside the field)
    pub fn set_cell(&mut self, pos: Position, kind: CellKind) {
        if self.in_bounds(pos) {
            let idx = self.xy_to_idx(pos.x, pos.y);
            self.cells[idx] = kind;
        }
    }

    /// Check if the player can step onto a position. Breakable walls count
    /// as walkable while a sword is held.
    pub fn is_walkable(&self, pos: Position, sword_held: bool) -> bool {
        let cell = self.cell_at(pos);
        cell.is_walkable() || (sword_held && cell.is_breakable())
    }

    /// The four orthogonal neighbours (may be out of bounds)
    pub fn neighbors(&self, pos: Position) -> [Position; 4] {
        [pos.offset(0, -1), pos.offset(0, 1), pos.offset(-1, 0), pos.offset(1, 0)]
    }

    /// Smash a breakable wall into floor. Returns false if there was none.
    pub fn break_wall(&mut self, pos: Position) -> bool {
        if self.cell_at(pos).is_breakable() {
            self.set_cell(pos, CellKind::Floor);
            true
        } else {
            false
        }
    }

    /// Room whose floor contains the position, if any
    pub fn room_of(&self, pos: Position) -> Option<Room> {
        if !self.in_bounds(pos) {
            return None;
        }
        let room = Room::new((pos.x - 1) / (ROOM_WIDTH + 1), (pos.y - 1) / (ROOM_HEIGHT + 1));
        (self.contains_room(room) && room.contains(pos)).then_some(room)
    }

    pub fn room_count(&self) -> u32 {
        (self.rooms_wide * self.rooms_high) as u32
    }

    pub fn contains_room(&self, room: Room) -> bool {
        room.col >= 0 && room.col < self.rooms_wide && room.row >= 0 && room.row < self.rooms_high
    }

    /// Every room of the lattice, row by row
    pub fn rooms(&self) -> impl Iterator<Item = Room> + '_ {
        (0..self.rooms_high).flat_map(move |row| (0..self.rooms_wide).map(move |col| Room::new(col, row)))
    }

    /// Get all walkable positions
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_walkable())
            .map(|(idx, _)| self.idx_to_pos(idx))
            .collect()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_walkable()).count()
    }

    /// Flood fill over walkable cells; returns a per-cell reached mask
    pub fn reachable_from(&self, start: Position) -> Vec<bool> {
        let mut visited = vec![false; self.cells.len()];
        if !self.cell_at(start).is_walkable() {
            return visited;
        }

        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            let idx = self.xy_to_idx(pos.x, pos.y);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            for next in self.neighbors(pos) {
                if self.cell_at(next).is_walkable() && !visited[self.xy_to_idx(next.x, next.y)] {
                    stack.push(next);
                }
            }
        }
        visited
    }

    /// True when every walkable cell can be reached from `start`
    pub fn is_connected_from(&self, start: Position) -> bool {
        let reached = self.reachable_from(start);
        self.cells
            .iter()
            .zip(&reached)
            .all(|(cell, reached)| !cell.is_walkable() || *reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Grid {
        Grid::new(FieldSize::new(2, 2))
    }

    #[test]
    fn test_dimensions() {
        let grid = Grid::new(FieldSize::STANDARD);
        assert_eq!(grid.width(), 78);
        assert_eq!(grid.height(), 21);
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = small();
        assert_eq!(grid.cell_at(Position::new(-1, 3)), CellKind::Wall);
        assert_eq!(grid.cell_at(Position::new(3, 999)), CellKind::Wall);
        assert!(!grid.is_walkable(Position::new(-1, 3), true));
    }

    #[test]
    fn test_border_and_interior_walls() {
        let grid = small();
        assert_eq!(grid.cell_at(Position::new(0, 0)), CellKind::Wall);
        assert_eq!(grid.cell_at(Position::new(11, 3)), CellKind::BreakableWall);
    }

    #[test]
    fn test_breakable_wall_needs_sword() {
        let mut grid = small();
        let wall = Position::new(11, 3);
        assert!(!grid.is_walkable(wall, false));
        assert!(grid.is_walkable(wall, true));
        assert!(grid.break_wall(wall));
        assert_eq!(grid.cell_at(wall), CellKind::Floor);
        assert!(!grid.break_wall(Position::new(0, 0)));
    }

    #[test]
    fn test_room_lookup() {
        let grid = small();
        let room = Room::new(1, 1);
        assert_eq!(room.origin(), Position::new(12, 6));
        assert_eq!(room.cells().count(), (ROOM_WIDTH * ROOM_HEIGHT) as usize);
        assert!(room.cells().all(|p| grid.room_of(p) == Some(room)));
        assert_eq!(grid.room_of(Position::new(11, 3)), None);
        assert_eq!(grid.room_of(Position::new(0, 0)), None);
    }

    #[test]
    fn test_flood_fill() {
        let mut grid = small();
        for cell in Room::new(0, 0).cells() {
            grid.set_cell(cell, CellKind::Floor);
        }
        let start = Room::new(0, 0).origin();
        assert!(grid.is_connected_from(start));

        for cell in Room::new(1, 0).cells() {
            grid.set_cell(cell, CellKind::Floor);
        }
        assert!(!grid.is_connected_from(start));

        grid.set_cell(Position::new(11, 2), CellKind::Floor);
        assert!(grid.is_connected_from(start));
    }
}
