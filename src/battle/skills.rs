//! Skill catalog and level-derived stats
//!
//! Base values are modified by level: +2 damage, -0.5s cooldown per level.

// Allow dead_code for catalog fields consumed by UI layers
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::battle::constants::leveling;

/// Identifies a skill in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillKey {
    BladeStrike,
    EnergyBurst,
    MeteorRain,
    Defense,
    Healing,
}

impl SkillKey {
    /// Every skill, in catalog order.
    pub const ALL: [SkillKey; 5] = [
        SkillKey::BladeStrike,
        SkillKey::EnergyBurst,
        SkillKey::MeteorRain,
        SkillKey::Defense,
        SkillKey::Healing,
    ];

    /// Damage skills only (the pool the opponent draws from).
    pub const DAMAGE: [SkillKey; 3] = [
        SkillKey::BladeStrike,
        SkillKey::EnergyBurst,
        SkillKey::MeteorRain,
    ];
}

/// What a skill does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    /// Reduces opponent HP
    Damage,
    /// Scales down incoming damage for a fixed duration
    Shield,
    /// Restores HP over a fixed number of ticks
    Heal,
}

/// Static definition of a skill.
#[derive(Debug, Clone)]
pub struct SkillSpec {
    pub key: SkillKey,
    pub name: &'static str,
    pub kind: SkillKind,
    pub base_damage: u32,
    pub base_cooldown: f32,
    pub max_level: u8,
    /// Damage lands this many seconds after activation instead of instantly
    pub impact_delay: Option<f32>,
}

/// The full skill catalog.
pub static CATALOG: [SkillSpec; 5] = [
    SkillSpec {
        key: SkillKey::BladeStrike,
        name: "Blade Strike",
        kind: SkillKind::Damage,
        base_damage: 18,
        base_cooldown: 1.3,
        max_level: 5,
        impact_delay: None,
    },
    SkillSpec {
        key: SkillKey::EnergyBurst,
        name: "Energy Burst",
        kind: SkillKind::Damage,
        base_damage: 55,
        base_cooldown: 3.4,
        max_level: 5,
        impact_delay: None,
    },
    SkillSpec {
        key: SkillKey::MeteorRain,
        name: "Meteor Rain",
        kind: SkillKind::Damage,
        base_damage: 83,
        base_cooldown: 8.0,
        max_level: 3,
        impact_delay: Some(0.7),
    },
    SkillSpec {
        key: SkillKey::Defense,
        name: "Defense",
        kind: SkillKind::Shield,
        base_damage: 0,
        base_cooldown: 8.0,
        max_level: 5,
        impact_delay: None,
    },
    SkillSpec {
        key: SkillKey::Healing,
        name: "Healing",
        kind: SkillKind::Heal,
        base_damage: 0,
        base_cooldown: 11.0,
        max_level: 5,
        impact_delay: None,
    },
];

/// Look up the static definition of a skill.
pub fn spec(key: SkillKey) -> &'static SkillSpec {
    match key {
        SkillKey::BladeStrike => &CATALOG[0],
        SkillKey::EnergyBurst => &CATALOG[1],
        SkillKey::MeteorRain => &CATALOG[2],
        SkillKey::Defense => &CATALOG[3],
        SkillKey::Healing => &CATALOG[4],
    }
}

/// A player's skill levels. Level 0 means locked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillLoadout {
    levels: [u8; 5],
}

impl SkillLoadout {
    /// Loadout with every skill at the given levels, in catalog order.
    pub fn from_levels(levels: [u8; 5]) -> Self {
        Self { levels }
    }

    pub fn level(&self, key: SkillKey) -> u8 {
        self.levels[Self::index(key)]
    }

    pub fn set_level(&mut self, key: SkillKey, level: u8) {
        let level = level.min(spec(key).max_level);
        self.levels[Self::index(key)] = level;
    }

    /// Locked skills cannot be activated.
    pub fn unlocked(&self, key: SkillKey) -> bool {
        self.level(key) > 0
    }

    /// Effective damage at the current level. Locked skills report their
    /// base damage; the opponent draws from the same catalog values.
    pub fn damage(&self, key: SkillKey) -> u32 {
        let spec = spec(key);
        if spec.kind != SkillKind::Damage {
            return 0;
        }
        let level = self.level(key);
        if level <= 1 {
            spec.base_damage
        } else {
            spec.base_damage + u32::from(level - 1) * leveling::DAMAGE_PER_LEVEL
        }
    }

    /// Effective cooldown at the current level, floored at the minimum.
    pub fn cooldown(&self, key: SkillKey) -> f32 {
        let spec = spec(key);
        let level = self.level(key);
        if level <= 1 {
            spec.base_cooldown
        } else {
            (spec.base_cooldown - f32::from(level - 1) * leveling::COOLDOWN_PER_LEVEL)
                .max(leveling::MIN_COOLDOWN)
        }
    }

    fn index(key: SkillKey) -> usize {
        match key {
            SkillKey::BladeStrike => 0,
            SkillKey::EnergyBurst => 1,
            SkillKey::MeteorRain => 2,
            SkillKey::Defense => 3,
            SkillKey::Healing => 4,
        }
    }
}

impl Default for SkillLoadout {
    /// Fresh-account loadout: Blade Strike unlocked, everything else locked.
    fn default() -> Self {
        Self::from_levels([1, 0, 0, 0, 0])
    }
}
