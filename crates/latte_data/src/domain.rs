//! Domains - one category of master data per table
//!
//! A domain is a zero-sized marker type that ties together a key type, a row
//! type and a stable name. The cache is generic over it, so adding a table is
//! a matter of declaring a new marker and registering it.

use core::fmt::Debug;
use core::hash::Hash;
use serde::de::DeserializeOwned;

use crate::keys::{CharacterType, DamageType};
use crate::rows::{CharacterAssetData, CharacterInfoData, HitStopData, KnockbackData};

/// A category of master data with its own key and row schema
pub trait Domain: Send + Sync + 'static {
    /// Key indexing the table
    type Key: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Row stored under each key
    type Row: Clone + Debug + DeserializeOwned + Send + Sync + 'static;

    /// Stable name used in logs, stats and operator commands
    const NAME: &'static str;

    /// Extract the key field from a row
    fn key_of(row: &Self::Row) -> Self::Key;
}

/// Hit-stop parameters keyed by damage type
#[derive(Debug, Clone, Copy)]
pub struct HitStop;

impl Domain for HitStop {
    type Key = DamageType;
    type Row = HitStopData;

    const NAME: &'static str = "HitStop";

    fn key_of(row: &HitStopData) -> DamageType {
        row.damage_type
    }
}

/// Knockback parameters keyed by damage type
#[derive(Debug, Clone, Copy)]
pub struct Knockback;

impl Domain for Knockback {
    type Key = DamageType;
    type Row = KnockbackData;

    const NAME: &'static str = "Knockback";

    fn key_of(row: &KnockbackData) -> DamageType {
        row.damage_type
    }
}

/// Character stats keyed by character type
#[derive(Debug, Clone, Copy)]
pub struct CharacterInfo;

impl Domain for CharacterInfo {
    type Key = CharacterType;
    type Row = CharacterInfoData;

    const NAME: &'static str = "CharacterInfo";

    fn key_of(row: &CharacterInfoData) -> CharacterType {
        row.character_type
    }
}

/// Character asset references keyed by character type
#[derive(Debug, Clone, Copy)]
pub struct CharacterAsset;

impl Domain for CharacterAsset {
    type Key = CharacterType;
    type Row = CharacterAssetData;

    const NAME: &'static str = "CharacterAsset";

    fn key_of(row: &CharacterAssetData) -> CharacterType {
        row.character_type
    }
}

/// Names of the built-in domains, in registration order
pub const BUILTIN_DOMAINS: [&str; 4] = [
    HitStop::NAME,
    Knockback::NAME,
    CharacterInfo::NAME,
    CharacterAsset::NAME,
];

/// Normalize a domain name for lookup: lowercase, `_` `-` and spaces dropped
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
