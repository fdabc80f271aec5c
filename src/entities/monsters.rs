//! Monster kinds
//!
//! Every kind has a fixed level and food yield. Amoebas, bisons and
//! chimeras also come in a rare form that looks different and pays better
//! but counts as the same kind once revealed.

use serde::{Deserialize, Serialize};

use crate::combat::Buff;
use crate::ecs::Rarity;

/// Monster kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonsterKind {
    Amoeba,
    Bison,
    Chimera,
    Komodo,
    Dragon,
    Erebus,
    Eldritch,
    CaltropPlant,
}

/// Something notable that happens when a monster is defeated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatEffect {
    /// Big food yield
    FeedMuch,
    /// Ten levels instead of one
    SpecialExp,
    /// Makes the treasure chest visible through the fog
    TreasurePointer,
    /// Takes food instead of giving it
    EnergyDrain,
    /// Scatters caltrops around the fallen plant
    CaltropSpread,
}

/// Static monster definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterDef {
    pub name: &'static str,
    pub glyph: char,
    pub level: u32,
    /// Food gained on defeat (negative drains)
    pub food: i32,
    /// Levels gained on defeat
    pub levels: u32,
    /// Battle buff handed over on defeat
    pub item: Option<Buff>,
    pub effect: Option<DefeatEffect>,
}

impl MonsterDef {
    const fn basic(name: &'static str, glyph: char, level: u32, food: i32) -> Self {
        Self { name, glyph, level, food, levels: 1, item: None, effect: None }
    }
}

// =============================================================================
// Common kinds
// =============================================================================

pub const AMOEBA: MonsterDef = MonsterDef::basic("Amoeba", 'a', 1, 12);

pub const BISON: MonsterDef = MonsterDef {
    effect: Some(DefeatEffect::FeedMuch),
    ..MonsterDef::basic("Bison", 'b', 5, 20)
};

pub const CHIMERA: MonsterDef = MonsterDef {
    item: Some(Buff::Sword { multiplier: 2 }),
    ..MonsterDef::basic("Chimera", 'c', 10, 12)
};

pub const KOMODO: MonsterDef = MonsterDef {
    item: Some(Buff::Poison { divisor: 3 }),
    ..MonsterDef::basic("Komodo Dragon", 'd', 20, 20)
};

pub const DRAGON: MonsterDef = MonsterDef {
    effect: Some(DefeatEffect::TreasurePointer),
    ..MonsterDef::basic("Dragon", 'D', 40, 12)
};

pub const EREBUS: MonsterDef = MonsterDef {
    effect: Some(DefeatEffect::EnergyDrain),
    ..MonsterDef::basic("Erebus", 'e', 1, -12)
};

pub const ELDRITCH: MonsterDef = MonsterDef::basic("Eldritch", 'E', 999, -12);

pub const CALTROP_PLANT: MonsterDef = MonsterDef {
    effect: Some(DefeatEffect::CaltropSpread),
    ..MonsterDef::basic("Caltrop Plant", 'X', 1, 0)
};

// =============================================================================
// Rare forms
// =============================================================================

pub const AMOEBA_RARE: MonsterDef = MonsterDef {
    levels: 10,
    effect: Some(DefeatEffect::SpecialExp),
    ..MonsterDef::basic("Glimmering Amoeba", 'A', 1, 12)
};

pub const BISON_RARE: MonsterDef = MonsterDef {
    effect: Some(DefeatEffect::FeedMuch),
    ..MonsterDef::basic("Great Bison", 'B', 5, 30)
};

pub const CHIMERA_RARE: MonsterDef = MonsterDef {
    item: Some(Buff::Sword { multiplier: 3 }),
    ..MonsterDef::basic("Elder Chimera", 'C', 10, 12)
};

impl MonsterKind {
    pub const ALL: [MonsterKind; 8] = [
        MonsterKind::Amoeba,
        MonsterKind::Bison,
        MonsterKind::Chimera,
        MonsterKind::Komodo,
        MonsterKind::Dragon,
        MonsterKind::Erebus,
        MonsterKind::Eldritch,
        MonsterKind::CaltropPlant,
    ];

    /// Definition for a kind in the given rarity. Kinds without a rare form
    /// always use their common one.
    pub fn def(&self, rarity: Rarity) -> &'static MonsterDef {
        match (self, rarity) {
            (MonsterKind::Amoeba, Rarity::Rare) => &AMOEBA_RARE,
            (MonsterKind::Bison, Rarity::Rare) => &BISON_RARE,
            (MonsterKind::Chimera, Rarity::Rare) => &CHIMERA_RARE,
            (MonsterKind::Amoeba, _) => &AMOEBA,
            (MonsterKind::Bison, _) => &BISON,
            (MonsterKind::Chimera, _) => &CHIMERA,
            (MonsterKind::Komodo, _) => &KOMODO,
            (MonsterKind::Dragon, _) => &DRAGON,
            (MonsterKind::Erebus, _) => &EREBUS,
            (MonsterKind::Eldritch, _) => &ELDRITCH,
            (MonsterKind::CaltropPlant, _) => &CALTROP_PLANT,
        }
    }

    pub fn has_rare_variant(&self) -> bool {
        matches!(self, MonsterKind::Amoeba | MonsterKind::Bison | MonsterKind::Chimera)
    }

    /// Level is the same for both rarities
    pub fn level(&self) -> u32 {
        self.def(Rarity::Normal).level
    }

    pub fn glyph(&self, rarity: Rarity) -> char {
        self.def(rarity).glyph
    }

    pub fn name(&self) -> &'static str {
        self.def(Rarity::Normal).name
    }
}
