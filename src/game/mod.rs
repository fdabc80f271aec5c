//! Game module - stage configuration, state and turn resolution

pub mod config;
mod snapshot;
mod state;
mod turn;

pub use config::{FieldSize, Rules, StageConfig, StageId, MAX_ROOMS_PER_SIDE, MAX_VISION_DELTA};
pub use snapshot::{
    PlayerView, SeenCell, Snapshot, CHEST_GLYPH, PLAYER_GLYPH, UNKNOWN_COMPANION_GLYPH, UNKNOWN_MONSTER_GLYPH,
};
pub use state::{EngineState, Player, Stage};
pub use turn::{Input, MoveOutcome, TurnEvent, TurnReport, CALTROP_SPREAD_RADIUS, MONSTER_RESPAWN_RATE, PEGASUS_STEP};
