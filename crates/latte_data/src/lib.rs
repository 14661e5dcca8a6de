//! # latte_data - Master-Data Cache
//!
//! Keyed, lazily loaded master-data tables for gameplay code:
//! - One table per domain (hit-stop, knockback, character info/assets)
//! - Tables load on first read and are served from memory afterwards
//! - Explicit reload of one or all domains, plus file-watch hot reload
//! - Missing sources degrade to empty tables instead of failing
//!
//! ## Example
//!
//! ```ignore
//! use latte_data::prelude::*;
//!
//! let config = DataConfig::load();
//! let data = GameDataManager::from_config(&config);
//!
//! // First read loads the HitStop table
//! let freeze = data.hit_stop_delay_time(DamageType::Slash);
//!
//! // Generic access works for any registered domain
//! if let Some(row) = data.try_get::<Knockback>(DamageType::Heavy) {
//!     apply_knockback(row.effective_force());
//! }
//!
//! // Data files changed: drop everything, reload lazily
//! data.reload_all();
//! ```

pub mod config;
pub mod domain;
pub mod keys;
pub mod loader;
pub mod manager;
pub mod rows;
pub mod source;
pub mod table;

#[cfg(feature = "hot-reload")]
pub mod watcher;

pub use config::{ConfigError, DataConfig, SourcePaths};
pub use domain::{CharacterAsset, CharacterInfo, Domain, HitStop, Knockback, BUILTIN_DOMAINS};
pub use keys::{CharacterType, DamageType};
pub use loader::{LoadContext, LoadError, LoadResult, TableFormat};
pub use manager::GameDataManager;
pub use rows::{CharacterAssetData, CharacterInfoData, HitStopData, KnockbackData};
pub use source::{FileSource, MemorySource, SourceHandle, SourceResolver};
pub use table::{DomainTable, ErasedTable, TableStats, TableStatus};

#[cfg(feature = "hot-reload")]
pub use watcher::{SourceWatcher, WatchError};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::config::DataConfig;
    pub use crate::domain::{CharacterAsset, CharacterInfo, Domain, HitStop, Knockback};
    pub use crate::keys::{CharacterType, DamageType};
    pub use crate::manager::GameDataManager;
    pub use crate::rows::{CharacterAssetData, CharacterInfoData, HitStopData, KnockbackData};
    pub use crate::source::{FileSource, MemorySource, SourceHandle, SourceResolver};
    pub use crate::table::TableStatus;
}
