//! Cell definitions
//!
//! The handful of cell kinds a stage is built from and their properties.

use serde::{Deserialize, Serialize};

/// Kinds of cells on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    /// Outer border; nothing gets through
    #[default]
    Wall,
    /// Interior wall, can be smashed with a sword
    BreakableWall,
    Floor,
    /// Floor strewn with caltrops; costs extra food to step on
    Caltrops,
}

impl CellKind {
    /// Walkable without any help
    pub fn is_walkable(&self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Caltrops)
    }

    pub fn is_breakable(&self) -> bool {
        *self == CellKind::BreakableWall
    }

    pub fn is_hazard(&self) -> bool {
        *self == CellKind::Caltrops
    }

    pub fn glyph(&self) -> char {
        match self {
            CellKind::Wall => '#',
            CellKind::BreakableWall => '#',
            CellKind::Floor => ' ',
            CellKind::Caltrops => 'x',
        }
    }

    pub fn fg_color(&self) -> (u8, u8, u8) {
        match self {
            CellKind::Wall => (130, 110, 90),
            CellKind::BreakableWall => (90, 170, 90),
            CellKind::Floor => (80, 80, 80),
            CellKind::Caltrops => (200, 200, 80),
        }
    }
}
