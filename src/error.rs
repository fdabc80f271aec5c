//! Error types
//!
//! One enum per concern. Rejected moves are not errors; they are reported
//! through [`crate::game::MoveOutcome`].

use std::path::PathBuf;

use thiserror::Error;

/// Invalid stage configuration, surfaced before any turn is played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("field must be at least 1x1 rooms with 2 rooms in total, got {rooms_wide}x{rooms_high}")]
    FieldTooSmall { rooms_wide: u32, rooms_high: u32 },

    #[error("field of {rooms_wide}x{rooms_high} rooms exceeds the maximum of {max} rooms per side")]
    FieldTooLarge { rooms_wide: u32, rooms_high: u32, max: u32 },

    #[error("unknown stage {0} (expected 1 or 2)")]
    UnknownStage(u8),

    #[error("vision delta {delta} leaves a torch radius of {radius}; it must be at least 1")]
    VisionTooNarrow { delta: i32, radius: i32 },

    #[error("vision delta {delta} is above the maximum of {max}")]
    VisionTooWide { delta: i32, max: i32 },

    #[error("invalid food rules: {0}")]
    InvalidRules(&'static str),

    #[error("malformed seed code {code:?}: {reason}")]
    MalformedSeedCode { code: String, reason: &'static str },

    #[error("seed code was made by version {found}, this is version {expected}")]
    SeedCodeVersion { expected: String, found: String },

    #[error("configuration cannot be expressed as a seed code: {0}")]
    NotEncodable(&'static str),
}

/// Generation gave up after too many degenerate attempts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no playable dungeon after {attempts} attempts; the field is too small for its rooms and inhabitants")]
    Exhausted { attempts: u32 },
}

/// Loading or exporting content data failed
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize RON: {0}")]
    Serialize(#[from] ron::Error),

    #[error("stage table for stage {0} is missing")]
    MissingStage(u8),

    #[error("stage table for stage {stage} is invalid: {reason}")]
    InvalidTable { stage: u8, reason: &'static str },
}

/// Anything that stops a stage from starting
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Data(#[from] DataError),
}
