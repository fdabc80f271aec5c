//! Combat system

pub mod resolver;
pub mod status;

pub use resolver::{apply_food_yield, effective_attack, resolve, strongest_beatable, BattleOutcome, Reward};
pub use status::{Buff, BuffLifetime, Buffs};
