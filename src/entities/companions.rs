//! Companion kinds
//!
//! Companions wait somewhere in the maze. Walking into one makes it join:
//! it leaves the field and its gift becomes a player buff.

use serde::{Deserialize, Serialize};

use crate::combat::Buff;

/// Torch bonus granted by the Ocular
pub const OCULAR_TORCH_EXTENSION: i32 = 2;

/// Companion kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompanionKind {
    /// A talking book that knows every creature by sight
    Nomicon,
    /// A floating eye that makes the torch reach further
    Ocular,
    /// Carries the player over one wall
    Pegasus,
}

impl CompanionKind {
    pub const ALL: [CompanionKind; 3] = [CompanionKind::Nomicon, CompanionKind::Ocular, CompanionKind::Pegasus];

    pub fn buff(&self) -> Buff {
        match self {
            CompanionKind::Nomicon => Buff::Identify,
            CompanionKind::Ocular => Buff::Vision { bonus: OCULAR_TORCH_EXTENSION },
            CompanionKind::Pegasus => Buff::WallPass,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            CompanionKind::Nomicon => 'n',
            CompanionKind::Ocular => 'o',
            CompanionKind::Pegasus => 'p',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompanionKind::Nomicon => "Nomicon",
            CompanionKind::Ocular => "Ocular",
            CompanionKind::Pegasus => "Pegasus",
        }
    }
}
