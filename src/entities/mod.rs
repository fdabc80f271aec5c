//! Entity kinds and placement

pub mod monsters;
pub mod companions;
pub mod spawner;

pub use monsters::{DefeatEffect, MonsterDef, MonsterKind};
pub use companions::CompanionKind;
pub use spawner::{
    populate, restock_monster, spawn_chest, spawn_companion, spawn_guardian, spawn_monster, Population,
};
