//! Stage state
//!
//! A [`Stage`] owns everything one dungeon needs: the grid, the entities,
//! the fog, the player and the random source. It is built once (with
//! bounded retries on degenerate dungeons) and then advanced by
//! [`Stage::step`].

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::combat::{effective_attack, Buffs};
use crate::data::{ChestRule, StageTable, StageTables};
use crate::ecs::systems::surface_lurkers;
use crate::ecs::Position;
use crate::entities::populate;
use crate::error::{ConfigError, GenerationError, StageError};
use crate::world::generation::{generate_maze, is_playable, MAX_GENERATION_ATTEMPTS};
use crate::world::{Grid, Visibility};

use super::config::{Rules, StageConfig, StageId};

/// Engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Accepting moves
    Exploring,
    /// Reached the unlocked chest
    Won,
    /// Ran out of food
    Dead,
    /// The stage was abandoned
    Quit,
}

impl EngineState {
    /// No further turns are processed in a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EngineState::Exploring)
    }
}

/// The player, kept across respawns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub pos: Position,
    pub level: u32,
    pub food: i32,
    pub buffs: Buffs,
    /// Successful moves so far
    pub turn: u32,
}

impl Player {
    pub fn new(pos: Position, rules: &Rules) -> Self {
        Self {
            pos,
            level: 1,
            food: rules.initial_food,
            buffs: Buffs::new(),
            turn: 0,
        }
    }

    /// Attack power for the next battle
    pub fn attack(&self) -> u32 {
        effective_attack(self.level, self.buffs.battle_buff())
    }
}

/// One dungeon instance
pub struct Stage {
    pub(super) state: EngineState,
    pub(super) stage_id: StageId,
    /// The configuration, with the seed actually used filled in
    pub(super) config: StageConfig,
    pub(super) table: StageTable,
    pub(super) grid: Grid,
    pub(super) world: World,
    pub(super) visibility: Visibility,
    pub(super) player: Player,
    pub(super) rng: StdRng,
}

impl Stage {
    /// Build a stage with the built-in stage tables
    pub fn new(config: StageConfig) -> Result<Self, StageError> {
        Self::with_tables(config, &StageTables::default())
    }

    /// Build a stage, regenerating degenerate dungeons with fresh seeds
    pub fn with_tables(mut config: StageConfig, tables: &StageTables) -> Result<Self, StageError> {
        let stage_id = config.validate()?;
        let table = tables.get(stage_id)?.clone();
        table.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        config.seed = Some(seed);
        let mut master = StdRng::seed_from_u64(seed);

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let dungeon = generate_maze(&mut rng, config.field, config.narrow_corridors);
            if !is_playable(&dungeon) {
                log::debug!("Generation attempt {} produced an unplayable maze", attempt);
                continue;
            }
            let Some(population) = populate(&mut rng, &dungeon, &table, config.torch_radius()) else {
                log::debug!("Generation attempt {} could not place every entity", attempt);
                continue;
            };

            log::info!(
                "Generated stage {} ({}x{} rooms, seed {}) after {} attempt(s)",
                stage_id.number(),
                config.field.rooms_wide,
                config.field.rooms_high,
                seed,
                attempt
            );
            let mut stage = Self::assemble(config, stage_id, table, dungeon.grid, population.world, population.player, rng);
            stage.illuminate();
            return Ok(stage);
        }

        log::warn!("Gave up generating stage {} with seed {}", stage_id.number(), seed);
        Err(GenerationError::Exhausted { attempts: MAX_GENERATION_ATTEMPTS }.into())
    }

    /// Build a stage from a hand-made grid and world. The player starts at
    /// `player`; the RNG is seeded from the config seed (0 when absent).
    pub fn from_parts(
        grid: Grid,
        world: World,
        player: Position,
        config: StageConfig,
        table: StageTable,
    ) -> Result<Self, ConfigError> {
        let stage_id = config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
        let mut stage = Self::assemble(config, stage_id, table, grid, world, player, rng);
        stage.illuminate();
        Ok(stage)
    }

    fn assemble(
        config: StageConfig,
        stage_id: StageId,
        table: StageTable,
        grid: Grid,
        world: World,
        player: Position,
        rng: StdRng,
    ) -> Self {
        let visibility = Visibility::new(grid.width(), grid.height());
        let player = Player::new(player, &config.rules);
        Self {
            state: EngineState::Exploring,
            stage_id,
            config,
            table,
            grid,
            world,
            visibility,
            player,
            rng,
        }
    }

    /// Get the current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub(super) fn set_state(&mut self, state: EngineState) {
        log::debug!("State transition: {:?} -> {:?}", self.state, state);
        if state.is_terminal() {
            log::info!(
                "Stage {} ended {:?} after {} turns at level {}",
                self.stage_id.number(),
                state,
                self.player.turn,
                self.player.level
            );
        }
        self.state = state;
    }

    pub fn stage_id(&self) -> StageId {
        self.stage_id
    }

    /// The configuration this stage was built from, seed included
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    pub fn rules(&self) -> &Rules {
        &self.config.rules
    }

    pub fn chest_rule(&self) -> ChestRule {
        self.table.chest_rule
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the ECS world
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Current torch radius, companion bonuses included
    pub fn torch_radius(&self) -> i32 {
        (self.config.torch_radius() + self.player.buffs.vision_bonus()).max(1)
    }

    /// Light the torch at the player's position
    pub(super) fn illuminate(&mut self) {
        let radius = self.torch_radius();
        self.visibility.illuminate(self.player.pos, radius);

        let visibility = &self.visibility;
        surface_lurkers(&mut self.world, |pos| visibility.is_lit(pos));
    }
}
