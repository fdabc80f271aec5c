//! Property tests for generation, fog, food accounting and battles.

use arlq::combat::{effective_attack, resolve, BattleOutcome, Buff, Buffs};
use arlq::data::default_stage_tables;
use arlq::entities::MonsterKind;
use arlq::game::{FieldSize, Input, MoveOutcome, Rules, Stage, StageConfig, TurnEvent};
use arlq::world::generation::generate_maze;
use arlq::world::{CellKind, Grid, Room};
use arlq::{EngineState, Position, Rarity};
use hecs::World;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn input(n: u8) -> Input {
    match n % 4 {
        0 => Input::Up,
        1 => Input::Down,
        2 => Input::Left,
        _ => Input::Right,
    }
}

fn battle_buff() -> impl Strategy<Value = Option<Buff>> {
    prop_oneof![
        Just(None),
        Just(Some(Buff::Sword { multiplier: 2 })),
        Just(Some(Buff::Sword { multiplier: 3 })),
        Just(Some(Buff::Poison { divisor: 3 })),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every floor cell of a generated maze is reachable from the start room.
    #[test]
    fn prop_generated_mazes_are_connected(
        seed: u64,
        rooms_wide in 2u32..10,
        rooms_high in 1u32..7,
        narrow: bool
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let dungeon = generate_maze(&mut rng, FieldSize::new(rooms_wide, rooms_high), narrow);

        prop_assert!(dungeon.grid.is_connected_from(dungeon.start_room.center()));
        prop_assert_eq!(dungeon.passages.len() as u32, rooms_wide * rooms_high - 1);
    }

    /// Battles are pure: same inputs, same outcome, and a win exactly when
    /// the attack reaches the monster's level.
    #[test]
    fn prop_resolution_is_deterministic(
        level in 1u32..1000,
        kind in prop::sample::select(MonsterKind::ALL.to_vec()),
        rare: bool,
        buff in battle_buff()
    ) {
        let rarity = if rare { Rarity::Rare } else { Rarity::Normal };
        let mut buffs = Buffs::new();
        if let Some(buff) = buff {
            buffs.add(buff);
        }

        let first = resolve(level, &buffs, kind, rarity);
        let second = resolve(level, &buffs, kind, rarity);
        prop_assert_eq!(first, second);

        let wins = effective_attack(level, buff) >= kind.def(rarity).level;
        prop_assert_eq!(first.is_win(), wins);
        if let BattleOutcome::Won(reward) = first {
            prop_assert!(reward.levels >= 1);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Full stages keep every walkable cell reachable from the player.
    #[test]
    fn prop_stages_are_connected(seed: u64, rooms_wide in 3u32..8, rooms_high in 2u32..6, stage in 1u8..=2) {
        let config = StageConfig::default()
            .with_seed(seed)
            .with_stage(stage)
            .with_field(FieldSize::new(rooms_wide, rooms_high));
        let stage = Stage::new(config).unwrap();
        prop_assert!(stage.grid().is_connected_from(stage.player().pos));
    }

    /// Explored cells never return to fog.
    #[test]
    fn prop_fog_is_monotonic(seed: u64, moves in prop::collection::vec(0u8..4, 1..150)) {
        let mut stage = Stage::new(StageConfig::default().with_seed(seed)).unwrap();
        let mut seen = stage.visibility().explored().to_vec();

        for m in moves {
            stage.step(input(m));
            let now = stage.visibility().explored();
            for (before, after) in seen.iter().zip(now) {
                prop_assert!(!*before || *after);
            }
            seen = now.to_vec();
        }
    }

    /// Each successful move costs exactly the per-move amount unless a won
    /// battle changed food; caltrops cost extra; blocked moves cost nothing.
    #[test]
    fn prop_food_accounting(seed: u64, stage in 1u8..=2, moves in prop::collection::vec(0u8..4, 1..150)) {
        let mut stage = Stage::new(StageConfig::default().with_seed(seed).with_stage(stage)).unwrap();
        let cost = stage.rules().per_move_cost;

        for m in moves {
            let before = stage.player().food;
            let report = stage.step(input(m));
            let after = stage.player().food;

            match report.outcome {
                MoveOutcome::Moved => {
                    let won = report.events.iter().any(|e| matches!(e, TurnEvent::BattleWon { .. }));
                    if !won {
                        let hazard: i32 = report
                            .events
                            .iter()
                            .map(|e| match e {
                                TurnEvent::CaltropsStepped { damage } => *damage,
                                _ => 0,
                            })
                            .sum();
                        prop_assert_eq!(after, before - cost - hazard);
                    }
                }
                MoveOutcome::Rejected | MoveOutcome::Ignored => prop_assert_eq!(after, before),
            }
        }
    }

    /// Without food from battles the player starves after exactly
    /// initial_food / per_move_cost moves.
    #[test]
    fn prop_starvation_is_exact(moves_to_death in 1i32..80, cost in 1i32..5) {
        let mut grid = Grid::new(FieldSize::new(2, 1));
        for cell in Room::new(0, 0).cells().chain(Room::new(1, 0).cells()) {
            grid.set_cell(cell, CellKind::Floor);
        }
        let mut config = StageConfig::default().with_seed(1);
        config.rules = Rules {
            initial_food: moves_to_death * cost,
            max_food: moves_to_death * cost,
            per_move_cost: cost,
            caltrop_damage: 2,
        };
        let table = default_stage_tables().stages[0].clone();
        let mut stage = Stage::from_parts(grid, World::new(), Position::new(1, 1), config, table).unwrap();

        for turn in 1..=moves_to_death {
            let direction = if turn % 2 == 1 { Input::Right } else { Input::Left };
            let report = stage.step(direction);
            prop_assert_eq!(report.outcome, MoveOutcome::Moved);
            if turn < moves_to_death {
                prop_assert_eq!(stage.state(), EngineState::Exploring);
            }
        }
        prop_assert_eq!(stage.state(), EngineState::Dead);
        prop_assert_eq!(stage.step(Input::Right).outcome, MoveOutcome::Ignored);
    }
}
