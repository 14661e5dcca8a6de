//! Key enums that index master-data tables

use serde::{Deserialize, Serialize};

/// Damage category of a hit, used to key hit-stop and knockback data
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DamageType {
    /// Untyped hit
    #[default]
    Normal,
    /// Edged weapons
    Slash,
    /// Blunt weapons, fists
    Blunt,
    /// Thrusts and projectiles
    Pierce,
    /// Charged or finishing attacks
    Heavy,
}

impl DamageType {
    /// Every variant, in declaration order
    pub const ALL: [DamageType; 5] = [
        Self::Normal,
        Self::Slash,
        Self::Blunt,
        Self::Pierce,
        Self::Heavy,
    ];
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Slash => write!(f, "Slash"),
            Self::Blunt => write!(f, "Blunt"),
            Self::Pierce => write!(f, "Pierce"),
            Self::Heavy => write!(f, "Heavy"),
        }
    }
}

impl std::str::FromStr for DamageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "none" => Ok(Self::Normal),
            "slash" => Ok(Self::Slash),
            "blunt" => Ok(Self::Blunt),
            "pierce" => Ok(Self::Pierce),
            "heavy" => Ok(Self::Heavy),
            _ => Err(format!("Unknown damage type: {}", s)),
        }
    }
}

/// Character archetype, used to key character info and asset data
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CharacterType {
    #[default]
    Player,
    Enemy,
    Elite,
    Boss,
    Npc,
}

impl CharacterType {
    /// Every variant, in declaration order
    pub const ALL: [CharacterType; 5] = [
        Self::Player,
        Self::Enemy,
        Self::Elite,
        Self::Boss,
        Self::Npc,
    ];
}

impl std::fmt::Display for CharacterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Elite => write!(f, "Elite"),
            Self::Boss => write!(f, "Boss"),
            Self::Npc => write!(f, "Npc"),
        }
    }
}

impl std::str::FromStr for CharacterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "enemy" => Ok(Self::Enemy),
            "elite" => Ok(Self::Elite),
            "boss" => Ok(Self::Boss),
            "npc" => Ok(Self::Npc),
            _ => Err(format!("Unknown character type: {}", s)),
        }
    }
}
