//! Data loading and external game content
//!
//! Stage tables live in RON files so populations can be tuned without a
//! rebuild.

pub mod loader;
pub mod stages;

pub use loader::{load_stage_tables, parse_stage_tables, save_stage_tables, DataManager, STAGES_FILE};
pub use stages::{
    default_stage_tables, ChestRule, CompanionChance, FixedSpawn, MonsterWeight, StageTable, StageTables,
    STANDARD_ROOM_COUNT,
};
