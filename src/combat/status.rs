//! Player buffs
//!
//! A small closed set of effects. Companions grant stage-long buffs (and the
//! one-shot wall pass); battles grant or take away the single battle buff
//! slot shared by swords and poison.

use std::mem::discriminant;

use serde::{Deserialize, Serialize};

/// An effect carried by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Buff {
    /// Wider torch
    Vision { bonus: i32 },
    /// Reveals the kind of anything standing next to the player
    Identify,
    /// Fly over one wall
    WallPass,
    /// Multiplies attack in the next battle; also smashes one wall
    Sword { multiplier: u32 },
    /// Divides attack in the next battle
    Poison { divisor: u32 },
}

/// When a buff goes away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffLifetime {
    /// Until the stage ends
    Stage,
    /// Until its ability is used once
    UntilUsed,
    /// Until the next battle, won or lost
    NextBattle,
}

impl Buff {
    pub fn lifetime(&self) -> BuffLifetime {
        match self {
            Buff::Vision { .. } | Buff::Identify => BuffLifetime::Stage,
            Buff::WallPass => BuffLifetime::UntilUsed,
            Buff::Sword { .. } | Buff::Poison { .. } => BuffLifetime::NextBattle,
        }
    }

    pub fn is_battle_buff(&self) -> bool {
        self.lifetime() == BuffLifetime::NextBattle
    }

    /// Get display name for this buff
    pub fn name(&self) -> String {
        match self {
            Buff::Vision { bonus } => format!("Torch+{bonus}"),
            Buff::Identify => "Identify".to_string(),
            Buff::WallPass => "Wall Pass".to_string(),
            Buff::Sword { multiplier } => format!("Sword x{multiplier}"),
            Buff::Poison { divisor } => format!("Poisoned /{divisor}"),
        }
    }

    /// Get display color for this buff (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Buff::Vision { .. } => (255, 255, 100),
            Buff::Identify => (180, 120, 255),
            Buff::WallPass => (100, 200, 255),
            Buff::Sword { .. } => (255, 150, 100),
            Buff::Poison { .. } => (100, 200, 100),
        }
    }
}

/// The player's active buffs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffs {
    active: Vec<Buff>,
}

impl Buffs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a buff. A battle buff replaces whichever battle buff is held;
    /// any other buff replaces one of its own variant.
    pub fn add(&mut self, buff: Buff) {
        if buff.is_battle_buff() {
            self.active.retain(|b| !b.is_battle_buff());
        } else {
            self.active.retain(|b| discriminant(b) != discriminant(&buff));
        }
        self.active.push(buff);
    }

    pub fn contains(&self, buff: Buff) -> bool {
        self.active.contains(&buff)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.active.iter()
    }

    /// Total torch bonus from vision buffs
    pub fn vision_bonus(&self) -> i32 {
        self.active
            .iter()
            .map(|b| match b {
                Buff::Vision { bonus } => *bonus,
                _ => 0,
            })
            .sum()
    }

    pub fn has_identify(&self) -> bool {
        self.active.contains(&Buff::Identify)
    }

    pub fn has_wall_pass(&self) -> bool {
        self.active.contains(&Buff::WallPass)
    }

    /// The buff that will apply to the next battle, if any
    pub fn battle_buff(&self) -> Option<Buff> {
        self.active.iter().copied().find(Buff::is_battle_buff)
    }

    pub fn has_sword(&self) -> bool {
        matches!(self.battle_buff(), Some(Buff::Sword { .. }))
    }

    /// Use up the wall pass. Returns false if there was none.
    pub fn consume_wall_pass(&mut self) -> bool {
        self.remove(|b| *b == Buff::WallPass)
    }

    /// Use up the sword on a wall. Returns false if there was none.
    pub fn consume_sword(&mut self) -> bool {
        self.remove(|b| matches!(b, Buff::Sword { .. }))
    }

    /// Drop the sword or poison after a battle. Returns the dropped buff.
    pub fn clear_battle_buffs(&mut self) -> Option<Buff> {
        let held = self.battle_buff();
        self.active.retain(|b| !b.is_battle_buff());
        held
    }

    fn remove(&mut self, pred: impl Fn(&Buff) -> bool) -> bool {
        let before = self.active.len();
        self.active.retain(|b| !pred(b));
        self.active.len() < before
    }
}
