//! Turn resolution
//!
//! One call to [`Stage::step`] is one complete turn: the move, any battle
//! or companion it leads to, hazards, the chest, and the food check.
//! Every [`MONSTER_RESPAWN_RATE`] moves a monster returns somewhere in the
//! dark.

use std::collections::HashSet;

use hecs::Entity;
use rand::seq::SliceRandom;

use crate::combat::{apply_food_yield, resolve, BattleOutcome, Buff};
use crate::data::ChestRule;
use crate::ecs::systems::{occupied_positions, remove, unlock_chest};
use crate::ecs::{occupant_at, Companion, Direction, Lurking, Monster, Occupant, Position, Rarity};
use crate::entities::{restock_monster, CompanionKind, MonsterKind};
use crate::world::{torch_area, CellKind, Reveal};

use super::snapshot::Snapshot;
use super::state::{EngineState, Stage};

/// Farthest a pegasus flight can carry the player, in cells
pub const PEGASUS_STEP: i32 = 9;
/// Radius of the caltrop patch a defeated plant leaves behind
pub const CALTROP_SPREAD_RADIUS: i32 = 3;
/// Moves between returning monsters
pub const MONSTER_RESPAWN_RATE: u32 = 120;

/// Player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Quit,
}

impl Input {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Input::Up => Some(Direction::Up),
            Input::Down => Some(Direction::Down),
            Input::Left => Some(Direction::Left),
            Input::Right => Some(Direction::Right),
            Input::Quit => None,
        }
    }
}

impl From<Direction> for Input {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Input::Up,
            Direction::Down => Input::Down,
            Direction::Left => Input::Left,
            Direction::Right => Input::Right,
        }
    }
}

/// What became of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player moved and the turn was spent
    Moved,
    /// Blocked; nothing changed and no food was spent
    Rejected,
    /// Not a move: the stage is over, or the input was Quit
    Ignored,
}

/// Something that happened during a turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    WallBroken { at: Position },
    FlewOverWall { from: Position, to: Position },
    Revealed(Reveal),
    BattleWon { kind: MonsterKind, rarity: Rarity, level: u32, food: i32 },
    BattleLost { kind: MonsterKind, rarity: Rarity },
    BattleBuffSpent(Buff),
    ItemGained(Buff),
    Respawned { at: Position },
    ChestUnlocked,
    TreasureSighted,
    CompanionJoined(CompanionKind),
    CaltropsScattered { cells: usize },
    CaltropsStepped { damage: i32 },
    /// A monster came back; it stays hidden until its cell is lit
    MonsterSpawned { kind: MonsterKind, at: Position },
    StateChanged(EngineState),
}

/// Result of one call to [`Stage::step`]
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub outcome: MoveOutcome,
    pub events: Vec<TurnEvent>,
    pub snapshot: Snapshot,
}

impl Stage {
    /// Advance the stage by one input
    pub fn step(&mut self, input: Input) -> TurnReport {
        let mut events = Vec::new();
        let outcome = match input.direction() {
            _ if self.state.is_terminal() => MoveOutcome::Ignored,
            None => {
                self.change_state(EngineState::Quit, &mut events);
                MoveOutcome::Ignored
            }
            Some(direction) => self.take_turn(direction, &mut events),
        };

        TurnReport { outcome, events, snapshot: self.snapshot() }
    }

    fn take_turn(&mut self, direction: Direction, events: &mut Vec<TurnEvent>) -> MoveOutcome {
        let Some(target) = self.move_target(direction, events) else {
            return MoveOutcome::Rejected;
        };

        self.player.pos = target;
        self.player.food -= self.config.rules.per_move_cost;
        self.player.turn += 1;
        self.illuminate();

        match occupant_at(&self.world, target) {
            Some(Occupant::Monster { entity, monster, guardian }) => {
                self.battle(entity, monster, guardian, events);
            }
            Some(Occupant::Companion { entity, companion }) => {
                self.join(entity, companion, events);
            }
            _ => {}
        }

        if self.grid.cell_at(self.player.pos).is_hazard() {
            let damage = self.config.rules.caltrop_damage;
            self.player.food -= damage;
            self.grid.set_cell(self.player.pos, CellKind::Floor);
            events.push(TurnEvent::CaltropsStepped { damage });
        }

        if let Some(Occupant::Chest { unlocked: true, .. }) = occupant_at(&self.world, self.player.pos) {
            self.change_state(EngineState::Won, events);
        }

        if self.player.food <= 0 {
            self.change_state(EngineState::Dead, events);
        }

        if !self.state.is_terminal() && self.player.buffs.has_identify() {
            self.identify_surroundings(events);
        }

        if !self.state.is_terminal() && self.player.turn % MONSTER_RESPAWN_RATE == 0 {
            self.restock(events);
        }

        MoveOutcome::Moved
    }

    /// Where a move in `direction` lands, or None if it is blocked.
    /// Breaking a wall or flying over one happens here.
    fn move_target(&mut self, direction: Direction, events: &mut Vec<TurnEvent>) -> Option<Position> {
        let from = self.player.pos;
        let target = from.step(direction);
        let sword_held = self.player.buffs.has_sword();

        if self.grid.is_walkable(target, sword_held) {
            if self.grid.break_wall(target) {
                self.player.buffs.consume_sword();
                events.push(TurnEvent::WallBroken { at: target });
            }
            return Some(target);
        }

        if self.player.buffs.has_wall_pass() {
            let landing = self.flight_landing(from, direction)?;
            self.player.buffs.consume_wall_pass();
            events.push(TurnEvent::FlewOverWall { from, to: landing });
            return Some(landing);
        }

        None
    }

    /// First walkable cell past the wall, within pegasus range
    fn flight_landing(&self, from: Position, direction: Direction) -> Option<Position> {
        let mut pos = from;
        for _ in 0..PEGASUS_STEP {
            pos = pos.step(direction);
            if !self.grid.in_bounds(pos) {
                return None;
            }
            if self.grid.cell_at(pos).is_walkable() {
                return Some(pos);
            }
        }
        None
    }

    fn battle(&mut self, entity: Entity, monster: Monster, guardian: bool, events: &mut Vec<TurnEvent>) {
        self.reveal(Reveal::Monster(monster.kind), events);

        if guardian && self.table.chest_rule == ChestRule::OnEncounter {
            self.unlock_chest(events);
        }

        let outcome = resolve(self.player.level, &self.player.buffs, monster.kind, monster.rarity);
        if let Some(spent) = self.player.buffs.clear_battle_buffs() {
            events.push(TurnEvent::BattleBuffSpent(spent));
        }

        match outcome {
            BattleOutcome::Won(reward) => {
                remove(&mut self.world, entity);
                self.player.level = self.player.level.saturating_add(reward.levels);
                self.player.food =
                    apply_food_yield(self.player.food, reward.food_yield, self.config.rules.max_food);
                events.push(TurnEvent::BattleWon {
                    kind: monster.kind,
                    rarity: monster.rarity,
                    level: self.player.level,
                    food: self.player.food,
                });

                if let Some(item) = reward.grants {
                    self.player.buffs.add(item);
                    events.push(TurnEvent::ItemGained(item));
                }
                if guardian || reward.treasure_pointer {
                    if !self.visibility.treasure_pointer() {
                        events.push(TurnEvent::TreasureSighted);
                    }
                    self.visibility.set_treasure_pointer();
                }
                if guardian && self.table.chest_rule == ChestRule::OnDefeat {
                    self.unlock_chest(events);
                }
                if reward.scatters_caltrops {
                    self.scatter_caltrops(self.player.pos, events);
                }
            }
            BattleOutcome::Lost => {
                events.push(TurnEvent::BattleLost { kind: monster.kind, rarity: monster.rarity });
                self.respawn(events);
            }
        }
    }

    fn join(&mut self, entity: Entity, companion: Companion, events: &mut Vec<TurnEvent>) {
        self.reveal(Reveal::Companion(companion.kind), events);
        remove(&mut self.world, entity);
        self.player.buffs.add(companion.kind.buff());
        events.push(TurnEvent::CompanionJoined(companion.kind));
        log::debug!("{} joined the player", companion.kind.name());

        // A wider torch applies straight away
        self.illuminate();
    }

    fn unlock_chest(&mut self, events: &mut Vec<TurnEvent>) {
        if unlock_chest(&mut self.world) {
            log::debug!("Treasure chest unlocked");
            events.push(TurnEvent::ChestUnlocked);
        }
    }

    /// Move the player to a random free floor cell after a lost battle
    fn respawn(&mut self, events: &mut Vec<TurnEvent>) {
        let current = self.player.pos;
        let occupied: HashSet<Position> = occupied_positions(&self.world).into_iter().collect();
        let candidates: Vec<Position> = self
            .grid
            .walkable_positions()
            .into_iter()
            .filter(|pos| *pos != current && self.grid.cell_at(*pos) == CellKind::Floor && !occupied.contains(pos))
            .collect();

        if let Some(&pos) = candidates.choose(&mut self.rng) {
            self.player.pos = pos;
            self.illuminate();
            events.push(TurnEvent::Respawned { at: pos });
        } else {
            log::warn!("No free cell to respawn on; player stays at ({}, {})", current.x, current.y);
        }
    }

    /// Cover free floor around a fallen caltrop plant
    fn scatter_caltrops(&mut self, center: Position, events: &mut Vec<TurnEvent>) {
        let area = torch_area(center, CALTROP_SPREAD_RADIUS, self.grid.width(), self.grid.height());
        let occupied: HashSet<Position> = occupied_positions(&self.world).into_iter().collect();
        let mut cells = 0;
        for pos in area {
            if pos == self.player.pos || self.grid.cell_at(pos) != CellKind::Floor || occupied.contains(&pos) {
                continue;
            }
            self.grid.set_cell(pos, CellKind::Caltrops);
            cells += 1;
        }
        events.push(TurnEvent::CaltropsScattered { cells });
    }

    /// Reveal whatever stands in the eight cells around the player
    fn identify_surroundings(&mut self, events: &mut Vec<TurnEvent>) {
        let center = self.player.pos;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                match occupant_at(&self.world, center.offset(dx, dy)) {
                    Some(Occupant::Monster { monster, .. }) => self.reveal(Reveal::Monster(monster.kind), events),
                    Some(Occupant::Companion { companion, .. }) => {
                        self.reveal(Reveal::Companion(companion.kind), events)
                    }
                    _ => {}
                }
            }
        }
    }

    /// Bring back one monster on a free cell away from the player
    fn restock(&mut self, events: &mut Vec<TurnEvent>) {
        let Some((monster, at)) = restock_monster(&mut self.rng, &self.grid, &self.world, &self.table, self.player.pos)
        else {
            log::debug!("No free cell for a returning monster on turn {}", self.player.turn);
            return;
        };
        self.world.spawn((at, monster, Lurking));
        log::debug!("{:?} returned at ({}, {})", monster.kind, at.x, at.y);
        events.push(TurnEvent::MonsterSpawned { kind: monster.kind, at });
    }

    fn reveal(&mut self, reveal: Reveal, events: &mut Vec<TurnEvent>) {
        if self.visibility.reveal(reveal) {
            events.push(TurnEvent::Revealed(reveal));
        }
    }

    fn change_state(&mut self, state: EngineState, events: &mut Vec<TurnEvent>) {
        if self.state != state {
            self.set_state(state);
            events.push(TurnEvent::StateChanged(state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_stage_tables;
    use crate::entities::{spawn_chest, spawn_companion, spawn_guardian, spawn_monster};
    use crate::game::{FieldSize, StageConfig, UNKNOWN_MONSTER_GLYPH};
    use crate::world::{Grid, Room};
    use hecs::World;

    /// Two rooms joined by a two-row corridor, nothing else
    fn corridor_grid() -> Grid {
        let mut grid = Grid::new(FieldSize::new(2, 1));
        for room in [Room::new(0, 0), Room::new(1, 0)] {
            for cell in room.cells() {
                grid.set_cell(cell, CellKind::Floor);
            }
        }
        grid.set_cell(Position::new(11, 2), CellKind::Floor);
        grid.set_cell(Position::new(11, 3), CellKind::Floor);
        grid
    }

    fn stage_with(world: World, player: Position, stage: u8) -> Stage {
        let tables = default_stage_tables();
        let table = tables.stages[usize::from(stage - 1)].clone();
        let config = StageConfig::default().with_stage(stage).with_seed(3);
        Stage::from_parts(corridor_grid(), world, player, config, table).unwrap()
    }

    #[test]
    fn test_blocked_move_costs_nothing() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        let report = stage.step(Input::Up);
        assert_eq!(report.outcome, MoveOutcome::Rejected);
        assert_eq!(stage.player().food, 90);
        assert_eq!(stage.player().turn, 0);
    }

    #[test]
    fn test_move_spends_food() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        let report = stage.step(Input::Right);
        assert_eq!(report.outcome, MoveOutcome::Moved);
        assert_eq!(stage.player().pos, Position::new(2, 1));
        assert_eq!(stage.player().food, 89);
        assert_eq!(stage.player().turn, 1);
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        let report = stage.step(Input::Quit);
        assert_eq!(report.events, vec![TurnEvent::StateChanged(EngineState::Quit)]);
        assert_eq!(stage.step(Input::Right).outcome, MoveOutcome::Ignored);
        assert_eq!(stage.player().pos, Position::new(1, 1));
    }

    #[test]
    fn test_guardian_encounter_unlocks_chest_in_stage_one() {
        let mut world = World::new();
        spawn_guardian(&mut world, MonsterKind::Dragon, Position::new(15, 1));
        spawn_chest(&mut world, Position::new(16, 2));
        let mut stage = stage_with(world, Position::new(14, 1), 1);

        let report = stage.step(Input::Right);
        assert!(report.events.contains(&TurnEvent::ChestUnlocked));
        assert!(report.events.contains(&TurnEvent::BattleLost { kind: MonsterKind::Dragon, rarity: Rarity::Normal }));
        assert!(report.snapshot.chest_unlocked);
    }

    #[test]
    fn test_guardian_must_fall_in_stage_two() {
        let mut world = World::new();
        spawn_guardian(&mut world, MonsterKind::Dragon, Position::new(15, 1));
        spawn_chest(&mut world, Position::new(16, 1));
        let mut stage = stage_with(world, Position::new(14, 1), 2);

        let report = stage.step(Input::Right);
        assert!(!report.events.contains(&TurnEvent::ChestUnlocked));

        stage.player_mut().level = 40;
        stage.player_mut().pos = Position::new(14, 1);
        let report = stage.step(Input::Right);
        assert!(report.events.contains(&TurnEvent::TreasureSighted));
        assert!(report.events.contains(&TurnEvent::ChestUnlocked));

        let report = stage.step(Input::Right);
        assert_eq!(report.snapshot.state, EngineState::Won);
    }

    #[test]
    fn test_wall_pass_flies_over_wall() {
        let mut stage = stage_with(World::new(), Position::new(10, 1), 1);
        stage.player_mut().buffs.add(Buff::WallPass);

        let report = stage.step(Input::Right);
        assert_eq!(report.outcome, MoveOutcome::Moved);
        assert_eq!(stage.player().pos, Position::new(12, 1));
        assert!(!stage.player().buffs.has_wall_pass());
    }

    #[test]
    fn test_wall_pass_cannot_leave_field() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        stage.player_mut().buffs.add(Buff::WallPass);
        assert_eq!(stage.step(Input::Left).outcome, MoveOutcome::Rejected);
        assert!(stage.player().buffs.has_wall_pass());
    }

    #[test]
    fn test_companion_joins() {
        let mut world = World::new();
        spawn_companion(&mut world, CompanionKind::Ocular, Position::new(2, 1));
        let mut stage = stage_with(world, Position::new(1, 1), 1);
        let radius = stage.torch_radius();

        let report = stage.step(Input::Right);
        assert!(report.events.contains(&TurnEvent::CompanionJoined(CompanionKind::Ocular)));
        assert!(report.events.contains(&TurnEvent::Revealed(Reveal::Companion(CompanionKind::Ocular))));
        assert_eq!(stage.torch_radius(), radius + 2);
        assert!(occupant_at(stage.world(), Position::new(2, 1)).is_none());
    }

    #[test]
    fn test_identify_reveals_neighbours() {
        let mut world = World::new();
        spawn_monster(&mut world, Monster::normal(MonsterKind::Bison), Position::new(3, 2));
        let mut stage = stage_with(world, Position::new(1, 1), 1);
        stage.player_mut().buffs.add(Buff::Identify);

        let report = stage.step(Input::Right);
        assert!(report.events.contains(&TurnEvent::Revealed(Reveal::Monster(MonsterKind::Bison))));
        assert!(stage.visibility().is_revealed(Reveal::Monster(MonsterKind::Bison)));
    }

    #[test]
    fn test_caltrop_plant_and_caltrops() {
        let mut world = World::new();
        spawn_monster(&mut world, Monster::normal(MonsterKind::CaltropPlant), Position::new(4, 2));
        let mut stage = stage_with(world, Position::new(3, 2), 2);

        let report = stage.step(Input::Right);
        assert!(report.events.iter().any(|e| matches!(e, TurnEvent::CaltropsScattered { cells } if *cells > 0)));
        assert_eq!(stage.grid().cell_at(Position::new(5, 2)), CellKind::Caltrops);
        // The plant's own cell stays clear
        assert_eq!(stage.grid().cell_at(Position::new(4, 2)), CellKind::Floor);

        let food = stage.player().food;
        let report = stage.step(Input::Right);
        assert!(report.events.contains(&TurnEvent::CaltropsStepped { damage: 2 }));
        assert_eq!(stage.player().food, food - 1 - 2);
        assert_eq!(stage.grid().cell_at(Position::new(5, 2)), CellKind::Floor);
    }

    #[test]
    fn test_death_overrides_win() {
        let mut world = World::new();
        let chest = spawn_chest(&mut world, Position::new(2, 1));
        let mut stage = stage_with(world, Position::new(1, 1), 1);
        stage.world_mut().get::<&mut crate::ecs::TreasureChest>(chest).unwrap().unlocked = true;
        stage.player_mut().food = 1;

        let report = stage.step(Input::Right);
        assert_eq!(report.snapshot.state, EngineState::Dead);
    }

    #[test]
    fn test_monster_returns_every_respawn_period() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        stage.player_mut().turn = MONSTER_RESPAWN_RATE - 2;

        let report = stage.step(Input::Right);
        assert!(!report.events.iter().any(|e| matches!(e, TurnEvent::MonsterSpawned { .. })));

        let report = stage.step(Input::Left);
        assert_eq!(stage.player().turn, MONSTER_RESPAWN_RATE);
        let spawned: Vec<_> = report
            .events
            .iter()
            .filter_map(|e| match e {
                TurnEvent::MonsterSpawned { kind, at } => Some((*kind, *at)),
                _ => None,
            })
            .collect();
        assert_eq!(spawned.len(), 1);
        let (kind, at) = spawned[0];
        assert_ne!(kind, MonsterKind::Dragon);
        assert!(at.chebyshev_distance(&stage.player().pos) > 1);
        assert!(matches!(occupant_at(stage.world(), at), Some(Occupant::Monster { .. })));

        // Hidden in the report that spawned it, even on an explored cell
        assert_eq!(report.snapshot.cell(at).and_then(|c| c.occupant), None);
        // Blocked moves do not count towards the period
        let report = stage.step(Input::Up);
        assert_eq!(report.outcome, MoveOutcome::Rejected);
        assert!(!report.events.iter().any(|e| matches!(e, TurnEvent::MonsterSpawned { .. })));
    }

    #[test]
    fn test_returned_monster_surfaces_when_lit() {
        let mut stage = stage_with(World::new(), Position::new(1, 1), 1);
        let at = Position::new(5, 1);
        assert!(stage.visibility().is_lit(at));
        stage.world_mut().spawn((at, Monster::normal(MonsterKind::Bison), Lurking));
        assert_eq!(stage.snapshot().cell(at).and_then(|c| c.occupant), None);

        let report = stage.step(Input::Right);
        assert_eq!(report.snapshot.cell(at).and_then(|c| c.occupant), Some(UNKNOWN_MONSTER_GLYPH));
    }
}
