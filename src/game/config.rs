//! Stage configuration
//!
//! Everything a stage needs to know up front: field size, torch width,
//! which monster table to use, the seed, and the food rules. Configurations
//! built from presets can be shared as short seed codes.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DataError};
use crate::world::fov::TORCH_RADIUS;

/// Largest number of rooms allowed along one side of the field
pub const MAX_ROOMS_PER_SIDE: u32 = 64;

/// Widest torch adjustment a configuration may ask for
pub const MAX_VISION_DELTA: i32 = 16;

/// Field dimensions, counted in rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSize {
    pub rooms_wide: u32,
    pub rooms_high: u32,
}

impl FieldSize {
    /// The regular field
    pub const STANDARD: FieldSize = FieldSize { rooms_wide: 7, rooms_high: 4 };
    /// One extra row of rooms
    pub const LARGE: FieldSize = FieldSize { rooms_wide: 7, rooms_high: 5 };

    pub fn new(rooms_wide: u32, rooms_high: u32) -> Self {
        Self { rooms_wide, rooms_high }
    }

    pub fn room_count(&self) -> u32 {
        self.rooms_wide * self.rooms_high
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms_wide == 0 || self.rooms_high == 0 || self.room_count() < 2 {
            return Err(ConfigError::FieldTooSmall {
                rooms_wide: self.rooms_wide,
                rooms_high: self.rooms_high,
            });
        }
        if self.rooms_wide > MAX_ROOMS_PER_SIDE || self.rooms_high > MAX_ROOMS_PER_SIDE {
            return Err(ConfigError::FieldTooLarge {
                rooms_wide: self.rooms_wide,
                rooms_high: self.rooms_high,
                max: MAX_ROOMS_PER_SIDE,
            });
        }
        Ok(())
    }
}

impl Default for FieldSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Which dungeon is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    One,
    Two,
}

impl StageId {
    pub fn from_number(n: u8) -> Result<Self, ConfigError> {
        match n {
            1 => Ok(StageId::One),
            2 => Ok(StageId::Two),
            other => Err(ConfigError::UnknownStage(other)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            StageId::One => 1,
            StageId::Two => 2,
        }
    }
}

/// Food accounting constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub initial_food: i32,
    pub max_food: i32,
    /// Food spent by every successful move
    pub per_move_cost: i32,
    /// Extra food lost when stepping on caltrops
    pub caltrop_damage: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            initial_food: 90,
            max_food: 100,
            per_move_cost: 1,
            caltrop_damage: 2,
        }
    }
}

impl Rules {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_food <= 0 {
            return Err(ConfigError::InvalidRules("initial food must be positive"));
        }
        if self.max_food < self.initial_food {
            return Err(ConfigError::InvalidRules("max food must not be below initial food"));
        }
        if self.per_move_cost <= 0 {
            return Err(ConfigError::InvalidRules("per-move cost must be positive"));
        }
        if self.caltrop_damage < 0 {
            return Err(ConfigError::InvalidRules("caltrop damage must not be negative"));
        }
        Ok(())
    }
}

/// Options fixed at stage start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub field: FieldSize,
    /// Added to the base torch radius; positive is easier
    pub vision_delta: i32,
    /// Stage number, 1 or 2
    pub stage: u8,
    /// Seed for reproducible dungeons; random when absent
    pub seed: Option<u64>,
    /// Corridors one cell narrower than usual
    pub narrow_corridors: bool,
    pub rules: Rules,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            field: FieldSize::STANDARD,
            vision_delta: 0,
            stage: 1,
            seed: None,
            narrow_corridors: false,
            rules: Rules::default(),
        }
    }
}

impl StageConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_field(mut self, field: FieldSize) -> Self {
        self.field = field;
        self
    }

    pub fn with_stage(mut self, stage: u8) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_vision_delta(mut self, delta: i32) -> Self {
        self.vision_delta = delta;
        self
    }

    /// Check every option; nothing is generated for an invalid config
    pub fn validate(&self) -> Result<StageId, ConfigError> {
        self.field.validate()?;
        let stage = StageId::from_number(self.stage)?;
        if self.vision_delta > MAX_VISION_DELTA {
            return Err(ConfigError::VisionTooWide { delta: self.vision_delta, max: MAX_VISION_DELTA });
        }
        let radius = self.torch_radius();
        if radius < 1 {
            return Err(ConfigError::VisionTooNarrow { delta: self.vision_delta, radius });
        }
        self.rules.validate()?;
        Ok(stage)
    }

    /// Torch radius before companion bonuses
    pub fn torch_radius(&self) -> i32 {
        TORCH_RADIUS.saturating_add(self.vision_delta)
    }

    /// Load a configuration from RON; omitted fields take their defaults
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        Ok(ron::from_str(source)?)
    }

    /// Short code of the form `v<version>-<flags>-<seed>`
    pub fn seed_code(&self) -> Result<String, ConfigError> {
        let seed = self.seed.ok_or(ConfigError::NotEncodable("no seed set"))?;
        if self.rules != Rules::default() {
            return Err(ConfigError::NotEncodable("custom food rules"));
        }

        let mut flags = String::new();
        flags.push(match self.stage {
            1 => '1',
            2 => '2',
            _ => return Err(ConfigError::UnknownStage(self.stage)),
        });
        if self.field == FieldSize::LARGE {
            flags.push('F');
        } else if self.field != FieldSize::STANDARD {
            return Err(ConfigError::NotEncodable("custom field size"));
        }
        match self.vision_delta {
            0 => {}
            1 => flags.push('T'),
            -1 => flags.push('t'),
            _ => return Err(ConfigError::NotEncodable("vision delta outside -1..=1")),
        }
        if self.narrow_corridors {
            flags.push('n');
        }

        Ok(format!("v{}-{}-{}", env!("CARGO_PKG_VERSION"), flags, seed))
    }

    /// Rebuild the configuration a seed code was made from
    pub fn from_seed_code(code: &str) -> Result<Self, ConfigError> {
        let malformed = |reason| ConfigError::MalformedSeedCode { code: code.to_string(), reason };

        let mut parts = code.trim().splitn(3, '-');
        let (Some(version), Some(flags), Some(seed)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed("expected v<version>-<flags>-<seed>"));
        };

        let version = version.strip_prefix('v').ok_or_else(|| malformed("must start with 'v'"))?;
        if version != env!("CARGO_PKG_VERSION") {
            return Err(ConfigError::SeedCodeVersion {
                expected: env!("CARGO_PKG_VERSION").to_string(),
                found: version.to_string(),
            });
        }

        let mut config = StageConfig::default();
        let mut chars = flags.chars();
        config.stage = match chars.next() {
            Some('1') => 1,
            Some('2') => 2,
            _ => return Err(malformed("flags must start with the stage number")),
        };
        for flag in chars {
            match flag {
                'F' if config.field == FieldSize::STANDARD => config.field = FieldSize::LARGE,
                'T' if config.vision_delta == 0 => config.vision_delta = 1,
                't' if config.vision_delta == 0 => config.vision_delta = -1,
                'n' if !config.narrow_corridors => config.narrow_corridors = true,
                'F' | 'T' | 't' | 'n' => return Err(malformed("repeated or conflicting flag")),
                _ => return Err(malformed("unknown flag")),
            }
        }

        config.seed = Some(seed.parse().map_err(|_| malformed("seed is not a number"))?);
        Ok(config)
    }
}
