//! Row schemas for the built-in master-data tables
//!
//! Every row carries its own key field; the cache indexes rows by it and
//! otherwise treats them as opaque values.

use serde::{Deserialize, Serialize};

use crate::keys::{CharacterType, DamageType};

/// Hit-stop (freeze frame) parameters for a damage type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitStopData {
    /// Damage type this row applies to
    pub damage_type: DamageType,
    /// Freeze duration in seconds
    pub delay_time: f32,
    /// Time dilation applied while frozen (0 = full stop)
    #[serde(default)]
    pub time_dilation: f32,
    /// Camera shake scale triggered with the freeze
    #[serde(default)]
    pub camera_shake: f32,
}

impl HitStopData {
    /// Create a row with only a delay time
    pub fn new(damage_type: DamageType, delay_time: f32) -> Self {
        Self {
            damage_type,
            delay_time,
            time_dilation: 0.0,
            camera_shake: 0.0,
        }
    }

    /// Set time dilation
    pub fn with_time_dilation(mut self, dilation: f32) -> Self {
        self.time_dilation = dilation;
        self
    }

    /// Set camera shake scale
    pub fn with_camera_shake(mut self, scale: f32) -> Self {
        self.camera_shake = scale;
        self
    }
}

/// Knockback parameters for a damage type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockbackData {
    pub damage_type: DamageType,
    /// Horizontal launch force
    pub force: f32,
    /// Vertical launch force
    #[serde(default)]
    pub up_force: f32,
    /// Fraction of force ignored by the target (0..=1)
    #[serde(default)]
    pub resistance: f32,
    /// Seconds the target stays in the knocked-back state
    #[serde(default)]
    pub duration: f32,
}

impl KnockbackData {
    /// Create a row with only a horizontal force
    pub fn new(damage_type: DamageType, force: f32) -> Self {
        Self {
            damage_type,
            force,
            up_force: 0.0,
            resistance: 0.0,
            duration: 0.0,
        }
    }

    /// Force after resistance is applied
    pub fn effective_force(&self) -> f32 {
        self.force * (1.0 - self.resistance.clamp(0.0, 1.0))
    }
}

/// Descriptive stats for a character archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterInfoData {
    pub character_type: CharacterType,
    pub display_name: String,
    pub max_hp: f32,
    pub move_speed: f32,
    #[serde(default)]
    pub description: String,
}

/// Asset references for a character archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAssetData {
    pub character_type: CharacterType,
    pub mesh_path: String,
    #[serde(default)]
    pub anim_class_path: String,
    #[serde(default)]
    pub portrait_path: String,
}
