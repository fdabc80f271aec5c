//! ECS queries
//!
//! Nothing in the dungeon moves on its own, so the "systems" here are
//! lookups the turn engine and the snapshot run against the world.

use hecs::{Entity, World};

use crate::ecs::{Companion, Guardian, Lurking, Monster, Position, TreasureChest};

/// Whatever stands on a cell, besides the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Monster { entity: Entity, monster: Monster, guardian: bool },
    Companion { entity: Entity, companion: Companion },
    Chest { entity: Entity, unlocked: bool },
}

/// Find the occupant of a cell
pub fn occupant_at(world: &World, pos: Position) -> Option<Occupant> {
    let monster = world
        .query::<(&Position, &Monster)>()
        .iter()
        .find(|(_, (p, _))| **p == pos)
        .map(|(entity, (_, monster))| (entity, *monster));
    if let Some((entity, monster)) = monster {
        let guardian = world.get::<&Guardian>(entity).is_ok();
        return Some(Occupant::Monster { entity, monster, guardian });
    }

    let companion = world
        .query::<(&Position, &Companion)>()
        .iter()
        .find(|(_, (p, _))| **p == pos)
        .map(|(entity, (_, companion))| Occupant::Companion { entity, companion: *companion });
    if companion.is_some() {
        return companion;
    }

    let chest = world
        .query::<(&Position, &TreasureChest)>()
        .iter()
        .find(|(_, (p, _))| **p == pos)
        .map(|(entity, (_, chest))| Occupant::Chest { entity, unlocked: chest.unlocked });
    chest
}

/// Positions of every entity in the world
pub fn occupied_positions(world: &World) -> Vec<Position> {
    world.query::<&Position>().iter().map(|(_, p)| *p).collect()
}

/// Bring lurking monsters on lit cells into view. Returns how many surfaced.
pub fn surface_lurkers(world: &mut World, is_lit: impl Fn(Position) -> bool) -> usize {
    let surfaced: Vec<Entity> = world
        .query::<(&Position, &Lurking)>()
        .iter()
        .filter(|(_, (pos, _))| is_lit(**pos))
        .map(|(entity, _)| entity)
        .collect();
    for &entity in &surfaced {
        world.remove_one::<Lurking>(entity).ok();
    }
    surfaced.len()
}

pub fn is_lurking(world: &World, entity: Entity) -> bool {
    world.get::<&Lurking>(entity).is_ok()
}

/// True if some entity stands within `range` (Chebyshev) of `pos`
pub fn any_within(world: &World, pos: Position, range: i32) -> bool {
    world
        .query::<&Position>()
        .iter()
        .any(|(_, p)| p.chebyshev_distance(&pos) <= range)
}

/// The chest entity and where it stands
pub fn find_chest(world: &World) -> Option<(Entity, Position, TreasureChest)> {
    let found = world
        .query::<(&Position, &TreasureChest)>()
        .iter()
        .next()
        .map(|(entity, (pos, chest))| (entity, *pos, *chest));
    found
}

/// Unlock the chest. Returns true if it was locked before.
pub fn unlock_chest(world: &mut World) -> bool {
    let mut newly_unlocked = false;
    for (_, chest) in world.query_mut::<&mut TreasureChest>() {
        newly_unlocked |= !chest.unlocked;
        chest.unlocked = true;
    }
    newly_unlocked
}

/// All monsters with their positions
pub fn monsters(world: &World) -> Vec<(Entity, Position, Monster)> {
    let found = world
        .query::<(&Position, &Monster)>()
        .iter()
        .map(|(entity, (pos, monster))| (entity, *pos, *monster))
        .collect();
    found
}

/// All waiting companions with their positions
pub fn companions(world: &World) -> Vec<(Entity, Position, Companion)> {
    let found = world
        .query::<(&Position, &Companion)>()
        .iter()
        .map(|(entity, (pos, companion))| (entity, *pos, *companion))
        .collect();
    found
}

/// Remove an entity that was defeated or joined the player
pub fn remove(world: &mut World, entity: Entity) {
    if world.despawn(entity).is_err() {
        log::warn!("Tried to remove entity {:?} twice", entity);
    }
}
