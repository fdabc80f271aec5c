//! Entity placement
//!
//! Fills a generated dungeon: the player in the start room, the chest and
//! its guardian in the lair, then the stage's monsters and companions.
//! Monsters only stand on room cells away from corridor mouths, and no two
//! entities stand within `spacing` of each other, so nothing can wall off
//! part of the maze.

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::StageTable;
use crate::ecs::systems::{any_within, find_chest};
use crate::ecs::{Companion, Guardian, Monster, Position, Rarity, TreasureChest};
use crate::world::generation::Dungeon;
use crate::world::{torch_area, CellKind, Grid, Room};

use super::{CompanionKind, MonsterKind};

/// Everything placed for one stage
pub struct Population {
    pub world: World,
    pub player: Position,
    pub chest: Position,
    pub guardian: Position,
}

// =============================================================================
// Spawning Functions
// =============================================================================

/// Spawn a monster at a given position
pub fn spawn_monster(world: &mut World, monster: Monster, pos: Position) -> Entity {
    world.spawn((pos, monster))
}

/// Spawn the monster guarding the chest
pub fn spawn_guardian(world: &mut World, kind: MonsterKind, pos: Position) -> Entity {
    world.spawn((pos, Monster::normal(kind), Guardian))
}

pub fn spawn_companion(world: &mut World, kind: CompanionKind, pos: Position) -> Entity {
    world.spawn((pos, Companion { kind }))
}

/// Spawn the (locked) treasure chest
pub fn spawn_chest(world: &mut World, pos: Position) -> Entity {
    world.spawn((pos, TreasureChest::default()))
}

// =============================================================================
// Placement
// =============================================================================

/// Walkable cells that touch a walkable cell outside their own room
fn is_corridor_mouth(grid: &Grid, pos: Position) -> bool {
    let room = grid.room_of(pos);
    grid.neighbors(pos)
        .iter()
        .any(|&next| grid.cell_at(next).is_walkable() && grid.room_of(next) != room)
}

/// Cells a monster may stand on without blocking a path
fn monster_cells(grid: &Grid, lair: Option<Room>) -> Vec<Position> {
    grid.rooms()
        .filter(|&room| Some(room) != lair)
        .flat_map(|room| room.cells())
        .filter(|&pos| grid.cell_at(pos) == CellKind::Floor && !is_corridor_mouth(grid, pos))
        .collect()
}

fn roll_rarity(rng: &mut StdRng, kind: MonsterKind, rare_chance: f64) -> Rarity {
    if kind.has_rare_variant() && rng.gen_bool(rare_chance) {
        Rarity::Rare
    } else {
        Rarity::Normal
    }
}

/// Take a random free cell out of `candidates`
fn take_cell(
    rng: &mut StdRng,
    candidates: &mut Vec<Position>,
    world: &World,
    player: Position,
    spacing: i32,
) -> Option<Position> {
    candidates.shuffle(rng);
    let idx = candidates
        .iter()
        .position(|pos| pos.chebyshev_distance(&player) > spacing && !any_within(world, *pos, spacing))?;
    Some(candidates.swap_remove(idx))
}

/// Monster kinds drawn for a stage, with their rarity
pub fn draw_monsters(rng: &mut StdRng, table: &StageTable, room_count: u32) -> Vec<Monster> {
    let mut drawn = Vec::new();

    let draws = table.scaled_draws(room_count);
    if draws > 0 {
        let Ok(index) = WeightedIndex::new(table.weights.iter().map(|w| w.weight)) else {
            log::warn!("Stage {} has no usable monster weights", table.stage);
            return drawn;
        };
        for _ in 0..draws {
            let kind = table.weights[index.sample(rng)].kind;
            drawn.push(Monster::new(kind, roll_rarity(rng, kind, table.rare_chance)));
        }
    }

    for fixed in &table.fixed {
        drawn.extend((0..fixed.count).map(|_| Monster::normal(fixed.kind)));
    }
    drawn
}

/// Place everything for one stage. Returns None when the dungeon cannot
/// hold it all, which makes the attempt degenerate.
pub fn populate(rng: &mut StdRng, dungeon: &Dungeon, table: &StageTable, torch_radius: i32) -> Option<Population> {
    let grid = &dungeon.grid;
    let mut world = World::new();
    let spacing = table.spacing;

    let start_cells: Vec<Position> = dungeon.start_room.cells().collect();
    let player = *start_cells.choose(rng)?;

    // The chest starts out of the player's sight
    let initial_view: HashSet<Position> = torch_area(player, torch_radius, grid.width(), grid.height())
        .into_iter()
        .collect();
    let chest_cells: Vec<Position> = dungeon.lair.cells().filter(|pos| !initial_view.contains(pos)).collect();
    let Some(&chest) = chest_cells.choose(rng) else {
        log::debug!("Lair {:?} lies entirely inside the starting view", dungeon.lair);
        return None;
    };
    spawn_chest(&mut world, chest);

    let guardian_cells: Vec<Position> = dungeon
        .lair
        .cells()
        .filter(|&pos| pos != chest && !is_corridor_mouth(grid, pos))
        .collect();
    let guardian = *guardian_cells.choose(rng)?;
    spawn_guardian(&mut world, table.guardian, guardian);

    let mut candidates = monster_cells(grid, Some(dungeon.lair));
    let monsters = draw_monsters(rng, table, dungeon.grid.room_count());
    for monster in &monsters {
        let Some(pos) = take_cell(rng, &mut candidates, &world, player, spacing) else {
            log::debug!("No room left for {:?}; {} monsters placed", monster.kind, world.len() - 2);
            return None;
        };
        spawn_monster(&mut world, *monster, pos);
    }

    let mut companion_cells: Vec<Position> = grid
        .walkable_positions()
        .into_iter()
        .filter(|&pos| pos != chest)
        .collect();
    let mut companions = 0;
    for entry in &table.companions {
        if !rng.gen_bool(entry.chance) {
            continue;
        }
        let Some(pos) = take_cell(rng, &mut companion_cells, &world, player, spacing) else {
            log::debug!("No room left for companion {:?}", entry.kind);
            return None;
        };
        spawn_companion(&mut world, entry.kind, pos);
        companions += 1;
    }

    log::info!(
        "Placed {} monsters and {} companions; chest at ({}, {})",
        monsters.len() + 1,
        companions,
        chest.x,
        chest.y
    );
    Some(Population { world, player, chest, guardian })
}

/// Pick a returning monster and a free cell for it, under the same rules as
/// initial placement. Only kinds the stage draws at random come back.
pub fn restock_monster(
    rng: &mut StdRng,
    grid: &Grid,
    world: &World,
    table: &StageTable,
    player: Position,
) -> Option<(Monster, Position)> {
    let kinds: Vec<MonsterKind> = table
        .weights
        .iter()
        .filter(|w| w.weight > 0 && w.kind != table.guardian)
        .map(|w| w.kind)
        .collect();
    let kind = *kinds.choose(rng)?;

    let lair = find_chest(world).and_then(|(_, pos, _)| grid.room_of(pos));
    let mut candidates = monster_cells(grid, lair);
    let pos = take_cell(rng, &mut candidates, world, player, table.spacing)?;
    Some((Monster::new(kind, roll_rarity(rng, kind, table.rare_chance)), pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_stage_tables;
    use crate::ecs::systems::{companions, find_chest, monsters};
    use crate::game::FieldSize;
    use crate::world::generation::generate_maze;
    use crate::world::TORCH_RADIUS;
    use rand::SeedableRng;

    fn populated(seed: u64, stage: usize) -> (Dungeon, Population) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tables = default_stage_tables();
        let table = &tables.stages[stage];
        loop {
            let dungeon = generate_maze(&mut rng, FieldSize::STANDARD, false);
            if let Some(population) = populate(&mut rng, &dungeon, table, TORCH_RADIUS) {
                return (dungeon, population);
            }
        }
    }

    #[test]
    fn test_one_chest_one_guardian_in_lair() {
        for seed in 0..10 {
            let (dungeon, population) = populated(seed, 0);
            let world = &population.world;

            let (_, chest_pos, chest) = find_chest(world).unwrap();
            assert!(!chest.unlocked);
            assert!(dungeon.lair.contains(chest_pos));

            let guardians: Vec<_> = world.query::<(&Position, &Guardian)>().iter().map(|(_, (p, _))| *p).collect();
            assert_eq!(guardians.len(), 1);
            assert!(dungeon.lair.contains(guardians[0]));
        }
    }

    #[test]
    fn test_placement_constraints() {
        for seed in 0..10 {
            let (dungeon, population) = populated(seed, 1);
            let world = &population.world;
            let spacing = default_stage_tables().stages[1].spacing;

            for (_, pos, monster) in monsters(world) {
                assert!(dungeon.grid.cell_at(pos).is_walkable());
                assert_ne!(pos, population.player);
                if monster.kind != MonsterKind::Dragon {
                    assert!(!dungeon.lair.contains(pos), "{:?} inside the lair", monster.kind);
                }
            }

            let positions: Vec<Position> = world.query::<&Position>().iter().map(|(_, p)| *p).collect();
            for (i, a) in positions.iter().enumerate() {
                for b in &positions[i + 1..] {
                    assert!(a.chebyshev_distance(b) > spacing || (dungeon.lair.contains(*a) && dungeon.lair.contains(*b)));
                }
            }
        }
    }

    #[test]
    fn test_chest_starts_in_fog() {
        for seed in 0..10 {
            let (dungeon, population) = populated(seed, 0);
            let view = torch_area(population.player, TORCH_RADIUS, dungeon.grid.width(), dungeon.grid.height());
            assert!(!view.contains(&population.chest));
        }
    }

    #[test]
    fn test_draws_include_fixed_spawns() {
        let mut rng = StdRng::seed_from_u64(3);
        let tables = default_stage_tables();
        let table = &tables.stages[1];
        let drawn = draw_monsters(&mut rng, table, 28);
        assert_eq!(drawn.len(), 46 + 3);
        assert_eq!(drawn.iter().filter(|m| m.kind == MonsterKind::Eldritch).count(), 1);
        assert_eq!(drawn.iter().filter(|m| m.kind == MonsterKind::CaltropPlant).count(), 2);
        assert!(drawn.iter().all(|m| m.rarity == Rarity::Normal || m.kind.has_rare_variant()));
    }

    #[test]
    fn test_companions_only_when_rolled() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut table = default_stage_tables().stages[0].clone();
        for entry in &mut table.companions {
            entry.chance = 0.0;
        }
        let dungeon = generate_maze(&mut rng, FieldSize::STANDARD, false);
        if let Some(population) = populate(&mut rng, &dungeon, &table, TORCH_RADIUS) {
            assert!(companions(&population.world).is_empty());
        }
    }

    #[test]
    fn test_restock_follows_placement_rules() {
        let tables = default_stage_tables();
        let table = &tables.stages[0];
        for seed in 0..10 {
            let (dungeon, population) = populated(seed, 0);
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let (monster, pos) =
                restock_monster(&mut rng, &dungeon.grid, &population.world, table, population.player).unwrap();

            assert_ne!(monster.kind, table.guardian);
            assert!(table.weights.iter().any(|w| w.kind == monster.kind));
            assert_eq!(dungeon.grid.cell_at(pos), CellKind::Floor);
            assert!(!dungeon.lair.contains(pos));
            assert!(pos.chebyshev_distance(&population.player) > table.spacing);
            assert!(!any_within(&population.world, pos, table.spacing));
        }
    }
}
