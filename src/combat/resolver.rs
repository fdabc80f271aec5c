//! Battle resolution
//!
//! Battles are decided by comparing numbers, nothing is rolled. The
//! resolver only computes the outcome; the turn engine applies it.

use crate::ecs::Rarity;
use crate::entities::{DefeatEffect, MonsterKind};

use super::status::{Buff, Buffs};

/// Attack power for a level under the current battle buff
pub fn effective_attack(level: u32, battle_buff: Option<Buff>) -> u32 {
    match battle_buff {
        Some(Buff::Sword { multiplier }) => level.saturating_mul(multiplier),
        Some(Buff::Poison { divisor }) => level.div_ceil(divisor.max(1)),
        _ => level,
    }
}

/// What the player gains from a win
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub levels: u32,
    /// Food change, negative for draining kinds
    pub food_yield: i32,
    /// Battle buff handed over after the fight
    pub grants: Option<Buff>,
    pub treasure_pointer: bool,
    pub scatters_caltrops: bool,
    pub effect: Option<DefeatEffect>,
}

/// Result of one battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Won(Reward),
    Lost,
}

impl BattleOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, BattleOutcome::Won(_))
    }
}

/// Resolve a battle between the player and a monster.
///
/// Only the outcome is computed. Consuming the battle buff and applying
/// the reward is left to the caller.
pub fn resolve(level: u32, buffs: &Buffs, kind: MonsterKind, rarity: Rarity) -> BattleOutcome {
    let def = kind.def(rarity);
    let attack = effective_attack(level, buffs.battle_buff());

    if attack < def.level {
        log::debug!("Battle lost: attack {} vs {} level {}", attack, def.name, def.level);
        return BattleOutcome::Lost;
    }

    log::debug!("Battle won: attack {} vs {} level {}", attack, def.name, def.level);
    BattleOutcome::Won(Reward {
        levels: def.levels,
        food_yield: def.food,
        grants: def.item,
        treasure_pointer: def.effect == Some(DefeatEffect::TreasurePointer),
        scatters_caltrops: def.effect == Some(DefeatEffect::CaltropSpread),
        effect: def.effect,
    })
}

/// Food after a reward. Gains cap at `max_food`; a drain never takes the
/// player below 1 unless they were already there.
pub fn apply_food_yield(food: i32, food_yield: i32, max_food: i32) -> i32 {
    if food_yield >= 0 {
        food.saturating_add(food_yield).min(max_food)
    } else {
        food.saturating_add(food_yield).max(food.min(1))
    }
}

/// The highest level kind an attack is enough for
pub fn strongest_beatable(attack: u32) -> Option<MonsterKind> {
    MonsterKind::ALL
        .iter()
        .rev()
        .filter(|kind| kind.level() <= attack)
        .max_by_key(|kind| kind.level())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_buffs() -> Buffs {
        Buffs::new()
    }

    #[test]
    fn test_effective_attack() {
        assert_eq!(effective_attack(7, None), 7);
        assert_eq!(effective_attack(7, Some(Buff::Sword { multiplier: 2 })), 14);
        assert_eq!(effective_attack(7, Some(Buff::Sword { multiplier: 3 })), 21);
        assert_eq!(effective_attack(7, Some(Buff::Poison { divisor: 3 })), 3);
        assert_eq!(effective_attack(1, Some(Buff::Poison { divisor: 3 })), 1);
        // Companion buffs do not touch attack
        assert_eq!(effective_attack(7, Some(Buff::Identify)), 7);
    }

    #[test]
    fn test_equal_level_wins() {
        let outcome = resolve(1, &no_buffs(), MonsterKind::Amoeba, Rarity::Normal);
        match outcome {
            BattleOutcome::Won(reward) => {
                assert_eq!(reward.levels, 1);
                assert_eq!(reward.food_yield, 12);
                assert_eq!(reward.grants, None);
            }
            BattleOutcome::Lost => panic!("level 1 should beat an amoeba"),
        }
    }

    #[test]
    fn test_higher_level_loses() {
        assert_eq!(resolve(4, &no_buffs(), MonsterKind::Bison, Rarity::Normal), BattleOutcome::Lost);
    }

    #[test]
    fn test_sword_carries_battle() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::Sword { multiplier: 2 });
        assert!(resolve(5, &buffs, MonsterKind::Chimera, Rarity::Normal).is_win());

        let mut poisoned = Buffs::new();
        poisoned.add(Buff::Poison { divisor: 3 });
        assert_eq!(resolve(12, &poisoned, MonsterKind::Chimera, Rarity::Normal), BattleOutcome::Lost);
    }

    #[test]
    fn test_rewards_by_kind() {
        let won = |kind, rarity| match resolve(999, &no_buffs(), kind, rarity) {
            BattleOutcome::Won(reward) => reward,
            BattleOutcome::Lost => panic!("level 999 should win"),
        };

        assert_eq!(won(MonsterKind::Amoeba, Rarity::Rare).levels, 10);
        assert_eq!(won(MonsterKind::Bison, Rarity::Rare).food_yield, 30);
        assert_eq!(won(MonsterKind::Chimera, Rarity::Rare).grants, Some(Buff::Sword { multiplier: 3 }));
        assert_eq!(won(MonsterKind::Komodo, Rarity::Normal).grants, Some(Buff::Poison { divisor: 3 }));
        assert!(won(MonsterKind::Dragon, Rarity::Normal).treasure_pointer);
        assert!(won(MonsterKind::CaltropPlant, Rarity::Normal).scatters_caltrops);
        assert_eq!(won(MonsterKind::Erebus, Rarity::Normal).food_yield, -12);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for kind in MonsterKind::ALL {
            for level in [1, 5, 10, 40] {
                let first = resolve(level, &no_buffs(), kind, Rarity::Normal);
                let second = resolve(level, &no_buffs(), kind, Rarity::Normal);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_food_yield_caps() {
        assert_eq!(apply_food_yield(50, 12, 100), 62);
        assert_eq!(apply_food_yield(95, 12, 100), 100);
        assert_eq!(apply_food_yield(50, -12, 100), 38);
        assert_eq!(apply_food_yield(5, -12, 100), 1);
        assert_eq!(apply_food_yield(0, -12, 100), 0);
    }

    #[test]
    fn test_strongest_beatable() {
        assert_eq!(strongest_beatable(0), None);
        assert_eq!(strongest_beatable(1), Some(MonsterKind::Amoeba));
        assert_eq!(strongest_beatable(9), Some(MonsterKind::Bison));
        assert_eq!(strongest_beatable(39), Some(MonsterKind::Komodo));
        assert_eq!(strongest_beatable(40), Some(MonsterKind::Dragon));
    }
}
