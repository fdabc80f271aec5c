//! Read-only render state
//!
//! A snapshot holds only what the player is allowed to know: unexplored
//! cells are `None`, and unrevealed kinds show as generic markers.

use crate::combat::{strongest_beatable, Buff};
use crate::ecs::systems::{companions, find_chest, is_lurking, monsters};
use crate::ecs::{Position, Rarity};
use crate::world::{CellKind, Reveal};

use super::state::{EngineState, Stage};

/// Shown for a monster whose kind is still unknown
pub const UNKNOWN_MONSTER_GLYPH: char = '?';
/// Shown for a companion whose kind is still unknown
pub const UNKNOWN_COMPANION_GLYPH: char = '!';
pub const CHEST_GLYPH: char = '$';
pub const PLAYER_GLYPH: char = '@';

/// A cell the player has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenCell {
    pub kind: CellKind,
    /// Inside the torch light this turn
    pub lit: bool,
    /// Glyph of whatever stands here, player excluded
    pub occupant: Option<char>,
}

/// Player state for the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub pos: Position,
    pub level: u32,
    pub food: i32,
    pub max_food: i32,
    /// Attack power for the next battle
    pub attack: u32,
    pub buffs: Vec<Buff>,
    /// Glyph of the strongest kind the current attack beats
    pub strongest_beatable: Option<char>,
    pub turn: u32,
}

/// Everything a renderer needs after a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major; `None` for cells never seen
    pub cells: Vec<Option<SeenCell>>,
    pub player: PlayerView,
    pub chest_unlocked: bool,
    pub state: EngineState,
    pub stage: u8,
}

impl Snapshot {
    pub fn cell(&self, pos: Position) -> Option<&SeenCell> {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            return None;
        }
        self.cells[(pos.y * self.width + pos.x) as usize].as_ref()
    }

    /// What to draw at a position: player, occupant, cell, or blank for fog
    pub fn glyph_at(&self, pos: Position) -> char {
        if pos == self.player.pos {
            return PLAYER_GLYPH;
        }
        match self.cell(pos) {
            Some(SeenCell { occupant: Some(glyph), .. }) => *glyph,
            Some(cell) => cell.kind.glyph(),
            None => ' ',
        }
    }

    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Stage {
    /// Build the render state for the current turn
    pub fn snapshot(&self) -> Snapshot {
        let width = self.grid.width();
        let height = self.grid.height();
        let visibility = &self.visibility;

        let mut cells: Vec<Option<SeenCell>> = (0..width * height)
            .map(|idx| {
                let pos = Position::new(idx % width, idx / width);
                visibility.is_explored(pos).then(|| SeenCell {
                    kind: self.grid.cell_at(pos),
                    lit: visibility.is_lit(pos),
                    occupant: None,
                })
            })
            .collect();

        for (entity, pos, monster) in monsters(&self.world) {
            if is_lurking(&self.world, entity) {
                continue;
            }
            if let Some(cell) = cells[self.grid.xy_to_idx(pos.x, pos.y)].as_mut() {
                cell.occupant = Some(if visibility.is_revealed(Reveal::Monster(monster.kind)) {
                    monster.glyph()
                } else {
                    UNKNOWN_MONSTER_GLYPH
                });
            }
        }

        for (_, pos, companion) in companions(&self.world) {
            if let Some(cell) = cells[self.grid.xy_to_idx(pos.x, pos.y)].as_mut() {
                cell.occupant = Some(if visibility.is_revealed(Reveal::Companion(companion.kind)) {
                    companion.kind.glyph()
                } else {
                    UNKNOWN_COMPANION_GLYPH
                });
            }
        }

        // The chest stays hidden until its guardian has been met: under
        // either chest rule that unlocks it or sets the treasure pointer
        let mut chest_unlocked = false;
        let known_chest = find_chest(&self.world).filter(|(_, _, chest)| chest.unlocked || visibility.treasure_pointer());
        if let Some((_, pos, chest)) = known_chest {
            chest_unlocked = chest.unlocked;
            let slot = &mut cells[self.grid.xy_to_idx(pos.x, pos.y)];
            if let Some(cell) = slot.as_mut() {
                cell.occupant = Some(CHEST_GLYPH);
            } else if visibility.treasure_pointer() {
                // The treasure pointer shows the chest through the fog
                *slot = Some(SeenCell { kind: self.grid.cell_at(pos), lit: false, occupant: Some(CHEST_GLYPH) });
            }
        }

        let attack = self.player.attack();
        Snapshot {
            width,
            height,
            cells,
            player: PlayerView {
                pos: self.player.pos,
                level: self.player.level,
                food: self.player.food,
                max_food: self.config.rules.max_food,
                attack,
                buffs: self.player.buffs.iter().copied().collect(),
                strongest_beatable: strongest_beatable(attack).map(|kind| kind.glyph(Rarity::Normal)),
                turn: self.player.turn,
            },
            chest_unlocked,
            state: self.state,
            stage: self.stage_id.number(),
        }
    }
}
