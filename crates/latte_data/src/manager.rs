//! Game Data Manager - session-owned master-data cache
//!
//! The manager is the main interface for reading master data. It:
//! - Loads each domain's table lazily, on first read
//! - Answers point lookups from an in-memory snapshot
//! - Drops tables on reload so the next read picks up fresh data
//!
//! Missing data is never an error here. A domain whose source is unset or
//! unreadable behaves like an empty table and every lookup misses; callers
//! choose their own fallback.

use std::any::TypeId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DataConfig;
use crate::domain::{normalize_name, CharacterAsset, CharacterInfo, Domain, HitStop, Knockback};
use crate::keys::{CharacterType, DamageType};
use crate::rows::{CharacterAssetData, CharacterInfoData, HitStopData, KnockbackData};
use crate::source::{FileSource, SourceHandle, SourceResolver};
use crate::table::{DomainTable, ErasedTable, TableStats, TableStatus};

/// Master-data cache for one game session
pub struct GameDataManager {
    /// Turns source paths into bytes
    resolver: Box<dyn SourceResolver>,
    /// All registered tables, in registration order
    tables: Vec<Box<dyn ErasedTable>>,
    /// Domain type -> index into `tables`
    by_type: HashMap<TypeId, usize>,
}

impl GameDataManager {
    /// Create a manager with the built-in domains registered and no sources set
    pub fn new(resolver: impl SourceResolver + 'static) -> Self {
        let mut manager = Self {
            resolver: Box::new(resolver),
            tables: Vec::new(),
            by_type: HashMap::new(),
        };
        manager.register::<HitStop>(SourceHandle::unset());
        manager.register::<Knockback>(SourceHandle::unset());
        manager.register::<CharacterInfo>(SourceHandle::unset());
        manager.register::<CharacterAsset>(SourceHandle::unset());
        manager
    }

    /// Create a file-backed manager from configuration
    pub fn from_config(config: &DataConfig) -> Self {
        let manager = Self::new(FileSource::new(config.data_dir.clone()));
        let sources = &config.sources;
        manager.set_source::<HitStop>(sources.hit_stop.clone().into());
        manager.set_source::<Knockback>(sources.knockback.clone().into());
        manager.set_source::<CharacterInfo>(sources.character_info.clone().into());
        manager.set_source::<CharacterAsset>(sources.character_asset.clone().into());
        manager
    }

    /// Register a domain. Re-registering replaces its table and source.
    pub fn register<D: Domain>(&mut self, source: SourceHandle) {
        let table: Box<dyn ErasedTable> = Box::new(DomainTable::<D>::new(source));
        match self.by_type.get(&TypeId::of::<D>()) {
            Some(&idx) => self.tables[idx] = table,
            None => {
                self.by_type.insert(TypeId::of::<D>(), self.tables.len());
                self.tables.push(table);
            }
        }
    }

    /// Check if a domain is registered
    pub fn is_registered<D: Domain>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<D>())
    }

    fn table<D: Domain>(&self) -> Option<&DomainTable<D>> {
        let table = self
            .by_type
            .get(&TypeId::of::<D>())
            .and_then(|&idx| self.tables[idx].as_any().downcast_ref::<DomainTable<D>>());
        if table.is_none() {
            log::warn!("{} domain is not registered", D::NAME);
        }
        table
    }

    fn table_by_name(&self, name: &str) -> Option<&dyn ErasedTable> {
        let wanted = normalize_name(name);
        self.tables
            .iter()
            .map(|t| t.as_ref())
            .find(|t| normalize_name(t.name()) == wanted)
    }

    /// Assign a domain's source. The cached table is dropped.
    pub fn set_source<D: Domain>(&self, source: SourceHandle) {
        if let Some(table) = self.table::<D>() {
            log::debug!("{} source set to {:?}", D::NAME, source);
            table.set_source(source);
        }
    }

    /// Current source of a domain
    pub fn source<D: Domain>(&self) -> SourceHandle {
        self.table::<D>().map(DomainTable::source).unwrap_or_default()
    }

    /// Look up a row, loading the domain's table on first use
    pub fn try_get<D: Domain>(&self, key: D::Key) -> Option<D::Row> {
        self.table::<D>()?.get(&key, self.resolver.as_ref())
    }

    /// Look up a row and project it, returning `default` on a miss
    pub fn get_or<D: Domain, T>(
        &self,
        key: D::Key,
        default: T,
        extract: impl FnOnce(&D::Row) -> T,
    ) -> T {
        self.try_get::<D>(key).as_ref().map(extract).unwrap_or(default)
    }

    /// Every cached row of a domain, loading the table on first use
    pub fn rows<D: Domain>(&self) -> Arc<HashMap<D::Key, D::Row>> {
        match self.table::<D>() {
            Some(table) => table.snapshot(self.resolver.as_ref()),
            None => Arc::new(HashMap::new()),
        }
    }

    /// Make sure a domain's table has been loaded
    pub fn ensure_loaded<D: Domain>(&self) -> TableStatus {
        match self.table::<D>() {
            Some(table) => {
                table.snapshot(self.resolver.as_ref());
                table.status()
            }
            None => TableStatus::Missing,
        }
    }

    /// Drop every table; each reloads on its next read
    pub fn reload_all(&self) {
        for table in &self.tables {
            Self::reload_table(table.as_ref());
        }
        log::info!("Master data cleared, {} tables will reload on next access", self.tables.len());
    }

    /// Drop one domain's table; it reloads on its next read
    pub fn reload_domain<D: Domain>(&self) {
        if let Some(table) = self.table::<D>() {
            Self::reload_table(table);
        }
    }

    /// Drop a domain's table by name (case, `_` and `-` are ignored)
    pub fn reload_domain_by_name(&self, name: &str) -> bool {
        match self.table_by_name(name) {
            Some(table) => {
                Self::reload_table(table);
                true
            }
            None => false,
        }
    }

    /// Drop the tables whose sources are among `changed`; returns how many
    pub fn reload_changed(&self, changed: &[PathBuf]) -> usize {
        let mut count = 0;
        for table in &self.tables {
            if changed.iter().any(|path| table.refers_to(path)) {
                log::info!("{} source changed on disk", table.name());
                Self::reload_table(table.as_ref());
                count += 1;
            }
        }
        count
    }

    fn reload_table(table: &dyn ErasedTable) {
        if !table.source().is_set() {
            log::warn!("Reload requested for {} but its source is unset", table.name());
        }
        table.clear();
        log::debug!("{} table cleared", table.name());
    }

    /// Number of load passes a domain has run
    pub fn load_count<D: Domain>(&self) -> u64 {
        self.table::<D>().map(DomainTable::load_count).unwrap_or(0)
    }

    /// Load state of a domain
    pub fn status<D: Domain>(&self) -> TableStatus {
        self.table::<D>().map(DomainTable::status).unwrap_or(TableStatus::Missing)
    }

    /// Stats for every registered domain
    pub fn stats(&self) -> Vec<TableStats> {
        self.tables.iter().map(|t| t.stats()).collect()
    }

    /// Names of every registered domain
    pub fn domain_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name()).collect()
    }

    /// Session start: drop anything cached so tables load fresh
    pub fn initialize(&self) {
        log::info!("Initializing master data ({} domains)", self.tables.len());
        self.reload_all();
    }

    /// Session end: drop every table
    pub fn deinitialize(&self) {
        for table in &self.tables {
            table.clear();
        }
        log::debug!("Master data released");
    }

    /// Hit-stop row for a damage type
    pub fn hit_stop(&self, damage_type: DamageType) -> Option<HitStopData> {
        self.try_get::<HitStop>(damage_type)
    }

    /// Hit-stop delay in seconds, 0 when no row exists
    pub fn hit_stop_delay_time(&self, damage_type: DamageType) -> f32 {
        self.get_or::<HitStop, _>(damage_type, 0.0, |row| row.delay_time)
    }

    /// Knockback row for a damage type
    pub fn knockback(&self, damage_type: DamageType) -> Option<KnockbackData> {
        self.try_get::<Knockback>(damage_type)
    }

    /// Character info row for a character type
    pub fn character_info(&self, character_type: CharacterType) -> Option<CharacterInfoData> {
        self.try_get::<CharacterInfo>(character_type)
    }

    /// Character asset row for a character type
    pub fn character_asset(&self, character_type: CharacterType) -> Option<CharacterAssetData> {
        self.try_get::<CharacterAsset>(character_type)
    }
}

impl Drop for GameDataManager {
    fn drop(&mut self) {
        self.deinitialize();
    }
}

impl core::fmt::Debug for GameDataManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameDataManager")
            .field("domains", &self.domain_names())
            .finish()
    }
}
