//! Field of view and fog of war
//!
//! The player carries a torch that lights an ellipse around them, wider
//! than it is tall to match terminal cell proportions. Walls do not block
//! torchlight. Anything lit once stays explored for the rest of the stage.

use std::collections::HashSet;

use crate::ecs::Position;
use crate::entities::{CompanionKind, MonsterKind};

/// Base torch radius, in rows
pub const TORCH_RADIUS: i32 = 4;
/// Horizontal stretch of the torch ellipse
pub const TORCH_WIDTH_RATIO: f64 = 1.5;

/// Something whose true identity can be revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reveal {
    Monster(MonsterKind),
    Companion(CompanionKind),
}

/// Cells of a torch-shaped area around `origin`, clipped to the field
pub fn torch_area(origin: Position, radius: i32, width: i32, height: i32) -> Vec<Position> {
    let mut cells = Vec::new();
    if radius < 0 {
        return cells;
    }

    let reach = radius as f64 * TORCH_WIDTH_RATIO;
    for dy in -radius..=radius {
        let y = origin.y + dy;
        if y < 0 || y >= height {
            continue;
        }
        let half_width = ((reach * reach - (dy * dy) as f64).sqrt() + 0.5) as i32;
        for dx in -half_width..=half_width {
            let x = origin.x + dx;
            if x >= 0 && x < width {
                cells.push(Position::new(x, y));
            }
        }
    }
    cells
}

/// Fog of war for one stage
#[derive(Debug, Clone)]
pub struct Visibility {
    width: i32,
    height: i32,
    /// Ever lit; never cleared
    explored: Vec<bool>,
    /// Lit by the torch this turn
    lit: Vec<bool>,
    revealed: HashSet<Reveal>,
    treasure_pointer: bool,
}

impl Visibility {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            explored: vec![false; len],
            lit: vec![false; len],
            revealed: HashSet::new(),
            treasure_pointer: false,
        }
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        (pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Relight the torch at `origin`: the previous lit area goes dark, the
    /// new one is lit and explored
    pub fn illuminate(&mut self, origin: Position, radius: i32) {
        self.lit.iter_mut().for_each(|lit| *lit = false);
        for pos in torch_area(origin, radius, self.width, self.height) {
            let idx = (pos.y * self.width + pos.x) as usize;
            self.lit[idx] = true;
            self.explored[idx] = true;
        }
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.idx(pos).is_some_and(|idx| self.explored[idx])
    }

    pub fn is_lit(&self, pos: Position) -> bool {
        self.idx(pos).is_some_and(|idx| self.lit[idx])
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|e| **e).count()
    }

    /// The explored mask, row-major
    pub fn explored(&self) -> &[bool] {
        &self.explored
    }

    /// Learn the true identity of a kind. Returns true if it was new.
    pub fn reveal(&mut self, reveal: Reveal) -> bool {
        self.revealed.insert(reveal)
    }

    pub fn is_revealed(&self, reveal: Reveal) -> bool {
        self.revealed.contains(&reveal)
    }

    pub fn revealed(&self) -> &HashSet<Reveal> {
        &self.revealed
    }

    /// The chest shows through the fog from now on
    pub fn set_treasure_pointer(&mut self) {
        self.treasure_pointer = true;
    }

    pub fn treasure_pointer(&self) -> bool {
        self.treasure_pointer
    }
}
