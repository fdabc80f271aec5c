//! ECS Components
//!
//! Components attached to the stationary entities living on a stage.

use serde::{Deserialize, Serialize};

use crate::entities::{CompanionKind, MonsterKind};

// ============================================================================
// Position & Movement
// ============================================================================

/// Position on the field (`x` is the column, `y` the row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Position shifted by a delta
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Position one step in a direction
    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

/// Orthogonal movement directions (no diagonals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

// ============================================================================
// Occupants
// ============================================================================

/// Whether a monster is the common form of its kind or the rare one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Normal,
    Rare,
}

/// A stationary monster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monster {
    pub kind: MonsterKind,
    pub rarity: Rarity,
}

impl Monster {
    pub fn new(kind: MonsterKind, rarity: Rarity) -> Self {
        Self { kind, rarity }
    }

    pub fn normal(kind: MonsterKind) -> Self {
        Self::new(kind, Rarity::Normal)
    }

    /// Glyph shown once the kind has been revealed
    pub fn glyph(&self) -> char {
        self.kind.glyph(self.rarity)
    }
}

/// A companion waiting to join the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Companion {
    pub kind: CompanionKind,
}

/// Marks the monster that guards the treasure chest
#[derive(Debug, Clone, Copy, Default)]
pub struct Guardian;

/// A monster that arrived in the dark and stays unseen until its cell is
/// lit again
#[derive(Debug, Clone, Copy, Default)]
pub struct Lurking;

/// The stage's treasure chest
#[derive(Debug, Clone, Copy, Default)]
pub struct TreasureChest {
    pub unlocked: bool,
}
