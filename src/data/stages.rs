//! Per-stage population tables
//!
//! Which monsters and companions a stage holds, how the chest is guarded,
//! and how densely things are packed. Loaded from RON, with the tables
//! below as the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::entities::{CompanionKind, MonsterKind};
use crate::error::DataError;
use crate::game::StageId;

/// Number of rooms the draw counts are tuned for
pub const STANDARD_ROOM_COUNT: u32 = 28;

/// When contact with the guardian unlocks the chest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestRule {
    /// Walking into the guardian is enough, whatever the battle outcome
    OnEncounter,
    /// The guardian has to be defeated
    OnDefeat,
}

/// One entry of the weighted monster table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterWeight {
    pub kind: MonsterKind,
    pub weight: u32,
}

/// Monsters placed a fixed number of times, outside the weighted draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSpawn {
    pub kind: MonsterKind,
    pub count: u32,
}

/// A companion and the probability that it shows up at all
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanionChance {
    pub kind: CompanionKind,
    pub chance: f64,
}

/// Everything placement needs to know about one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTable {
    pub stage: u8,
    /// Kind standing guard next to the chest
    pub guardian: MonsterKind,
    pub chest_rule: ChestRule,
    /// Weighted draws on a standard field
    pub draws: u32,
    pub weights: Vec<MonsterWeight>,
    #[serde(default)]
    pub fixed: Vec<FixedSpawn>,
    #[serde(default)]
    pub companions: Vec<CompanionChance>,
    /// Chance for a drawn kind with a rare form to come out rare
    pub rare_chance: f64,
    /// Minimum Chebyshev gap between placed entities
    pub spacing: i32,
}

impl StageTable {
    /// Weighted draws for a field of `room_count` rooms, never fewer than one
    pub fn scaled_draws(&self, room_count: u32) -> u32 {
        if self.draws == 0 {
            return 0;
        }
        let scaled = u64::from(self.draws) * u64::from(room_count) / u64::from(STANDARD_ROOM_COUNT);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|w| u64::from(w.weight)).sum()
    }

    pub fn validate(&self) -> Result<(), DataError> {
        let invalid = |reason| DataError::InvalidTable { stage: self.stage, reason };

        if self.draws > 0 && self.total_weight() == 0 {
            return Err(invalid("monster weights must not all be zero"));
        }
        if !(0.0..=1.0).contains(&self.rare_chance) {
            return Err(invalid("rare chance must be between 0 and 1"));
        }
        if self.companions.iter().any(|c| !(0.0..=1.0).contains(&c.chance)) {
            return Err(invalid("companion chance must be between 0 and 1"));
        }
        if self.spacing < 1 {
            return Err(invalid("spacing must be at least 1"));
        }
        Ok(())
    }
}

/// Tables for every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTables {
    pub stages: Vec<StageTable>,
}

impl StageTables {
    /// Find the table for a stage
    pub fn find(&self, stage: StageId) -> Option<&StageTable> {
        self.stages.iter().find(|t| t.stage == stage.number())
    }

    pub fn get(&self, stage: StageId) -> Result<&StageTable, DataError> {
        self.find(stage).ok_or(DataError::MissingStage(stage.number()))
    }

    pub fn validate(&self) -> Result<(), DataError> {
        self.stages.iter().try_for_each(StageTable::validate)
    }
}

impl Default for StageTables {
    fn default() -> Self {
        default_stage_tables()
    }
}

const fn weight(kind: MonsterKind, weight: u32) -> MonsterWeight {
    MonsterWeight { kind, weight }
}

fn all_companions(chance: f64) -> Vec<CompanionChance> {
    CompanionKind::ALL.iter().map(|&kind| CompanionChance { kind, chance }).collect()
}

/// Create default stage tables (hardcoded fallback)
pub fn default_stage_tables() -> StageTables {
    StageTables {
        stages: vec![
            // === STAGE 1: the dragon only needs to be found ===
            StageTable {
                stage: 1,
                guardian: MonsterKind::Dragon,
                chest_rule: ChestRule::OnEncounter,
                draws: 42,
                weights: vec![
                    weight(MonsterKind::Amoeba, 30),
                    weight(MonsterKind::Bison, 4),
                    weight(MonsterKind::Chimera, 4),
                    weight(MonsterKind::Komodo, 4),
                ],
                fixed: Vec::new(),
                companions: all_companions(0.7),
                rare_chance: 0.03,
                spacing: 1,
            },
            // === STAGE 2: the dragon must fall, and the maze bites back ===
            StageTable {
                stage: 2,
                guardian: MonsterKind::Dragon,
                chest_rule: ChestRule::OnDefeat,
                draws: 46,
                weights: vec![
                    weight(MonsterKind::Amoeba, 30),
                    weight(MonsterKind::Bison, 4),
                    weight(MonsterKind::Chimera, 4),
                    weight(MonsterKind::Komodo, 4),
                    weight(MonsterKind::Erebus, 4),
                ],
                fixed: vec![
                    FixedSpawn { kind: MonsterKind::Eldritch, count: 1 },
                    FixedSpawn { kind: MonsterKind::CaltropPlant, count: 2 },
                ],
                companions: all_companions(0.7),
                rare_chance: 0.03,
                spacing: 1,
            },
        ],
    }
}
