//! Domain tables - the per-domain key to row caches
//!
//! Each table publishes its rows as an immutable `Arc<HashMap>` snapshot.
//! A load builds a complete map before swapping it in, so readers see either
//! the previous snapshot or the new one, never a partially filled map.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::Domain;
use crate::loader::{LoadContext, LoadError};
use crate::source::{SourceHandle, SourceResolver};

/// Load state of a table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableStatus {
    /// Never loaded, or cleared since the last load
    Unloaded,
    /// Populated from its source
    Loaded,
    /// A load was attempted but the source could not be resolved or decoded
    Missing,
}

impl core::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loaded => write!(f, "loaded"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

/// Point-in-time description of a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableStats {
    /// Domain name
    pub name: &'static str,
    /// Load state
    pub status: TableStatus,
    /// Rows currently cached
    pub rows: usize,
    /// Load passes run since construction
    pub load_count: u64,
    /// Source path, if assigned
    pub source: Option<String>,
}

struct TableState<D: Domain> {
    status: TableStatus,
    rows: Arc<HashMap<D::Key, D::Row>>,
}

impl<D: Domain> TableState<D> {
    fn empty() -> Self {
        Self {
            status: TableStatus::Unloaded,
            rows: Arc::new(HashMap::new()),
        }
    }
}

/// Cache for one domain
pub struct DomainTable<D: Domain> {
    source: RwLock<SourceHandle>,
    state: RwLock<TableState<D>>,
    load_count: AtomicU64,
}

impl<D: Domain> DomainTable<D> {
    /// Create an empty, unloaded table
    pub fn new(source: SourceHandle) -> Self {
        Self {
            source: RwLock::new(source),
            state: RwLock::new(TableState::empty()),
            load_count: AtomicU64::new(0),
        }
    }

    /// Current source handle
    pub fn source(&self) -> SourceHandle {
        self.source.read().clone()
    }

    /// Replace the source handle and drop the cached rows
    pub fn set_source(&self, source: SourceHandle) {
        *self.source.write() = source;
        self.clear();
    }

    /// Get the row snapshot, loading the table first if needed
    pub fn snapshot(&self, resolver: &dyn SourceResolver) -> Arc<HashMap<D::Key, D::Row>> {
        {
            let state = self.state.read();
            if state.status != TableStatus::Unloaded {
                return state.rows.clone();
            }
        }

        let mut state = self.state.write();
        // Another reader may have finished the load while we waited
        if state.status == TableStatus::Unloaded {
            let (status, rows) = self.load(resolver);
            state.status = status;
            state.rows = Arc::new(rows);
        }
        state.rows.clone()
    }

    /// Look up a row, loading the table first if needed
    pub fn get(&self, key: &D::Key, resolver: &dyn SourceResolver) -> Option<D::Row> {
        self.snapshot(resolver).get(key).cloned()
    }

    /// Drop all rows and mark the table unloaded
    pub fn clear(&self) {
        *self.state.write() = TableState::empty();
    }

    /// Load state
    pub fn status(&self) -> TableStatus {
        self.state.read().status
    }

    /// Check if loaded
    pub fn is_loaded(&self) -> bool {
        self.status() == TableStatus::Loaded
    }

    /// Rows currently cached (does not trigger a load)
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    /// Check if no rows are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of load passes run so far
    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::Relaxed)
    }

    fn load(&self, resolver: &dyn SourceResolver) -> (TableStatus, HashMap<D::Key, D::Row>) {
        self.load_count.fetch_add(1, Ordering::Relaxed);

        let handle = self.source();
        let result = match handle.path() {
            Some(path) => resolver
                .resolve(path)
                .and_then(|data| LoadContext::new(path, &data).decode_keyed::<D>()),
            None => Err(LoadError::Unset),
        };

        let rows = match result {
            Ok(rows) => rows,
            Err(e @ (LoadError::Unset | LoadError::NotFound(_))) => {
                log::warn!("{} table unavailable, lookups will miss: {}", D::NAME, e);
                return (TableStatus::Missing, HashMap::new());
            }
            Err(e) => {
                log::error!("Failed to load {} table: {}", D::NAME, e);
                return (TableStatus::Missing, HashMap::new());
            }
        };

        let mut map = HashMap::with_capacity(rows.len());
        for (key, row) in rows {
            if map.insert(key, row).is_some() {
                log::debug!(
                    "{} table has duplicate key {:?}, keeping the later row",
                    D::NAME,
                    key
                );
            }
        }

        log::info!("Loaded {} table: {} rows from {:?}", D::NAME, map.len(), handle);
        (TableStatus::Loaded, map)
    }
}

/// Type-erased table, so domains with different key/row types share a registry
pub trait ErasedTable: Send + Sync {
    /// Domain name
    fn name(&self) -> &'static str;

    /// Drop all rows and mark the table unloaded
    fn clear(&self);

    /// Current source handle
    fn source(&self) -> SourceHandle;

    /// Point-in-time stats
    fn stats(&self) -> TableStats;

    /// Check whether a changed file is this table's source
    fn refers_to(&self, changed: &Path) -> bool;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

impl<D: Domain> ErasedTable for DomainTable<D> {
    fn name(&self) -> &'static str {
        D::NAME
    }

    fn clear(&self) {
        DomainTable::clear(self)
    }

    fn source(&self) -> SourceHandle {
        DomainTable::source(self)
    }

    fn stats(&self) -> TableStats {
        let (status, rows) = {
            let state = self.state.read();
            (state.status, state.rows.len())
        };
        TableStats {
            name: D::NAME,
            status,
            rows,
            load_count: self.load_count(),
            source: self.source().path().map(str::to_string),
        }
    }

    fn refers_to(&self, changed: &Path) -> bool {
        self.source.read().refers_to(changed)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HitStop;
    use crate::keys::DamageType;
    use crate::source::MemorySource;

    fn hit_stop_source() -> MemorySource {
        MemorySource::new().with_file(
            "DT_HitStop.json",
            r#"[
                { "damage_type": "Slash", "delay_time": 0.2 },
                { "damage_type": "Blunt", "delay_time": 0.5 }
            ]"#,
        )
    }

    fn hit_stop_table() -> DomainTable<HitStop> {
        DomainTable::new(SourceHandle::from_path("DT_HitStop.json"))
    }

    #[test]
    fn test_lazy_load_once() {
        let source = hit_stop_source();
        let table = hit_stop_table();

        assert_eq!(table.status(), TableStatus::Unloaded);
        assert_eq!(table.load_count(), 0);

        let row = table.get(&DamageType::Slash, &source).unwrap();
        assert_eq!(row.delay_time, 0.2);
        assert!(table.get(&DamageType::Pierce, &source).is_none());

        assert!(table.is_loaded());
        assert_eq!(table.len(), 2);
        assert_eq!(table.load_count(), 1);
    }

    #[test]
    fn test_unset_source_is_missing() {
        let source = MemorySource::new();
        let table: DomainTable<HitStop> = DomainTable::new(SourceHandle::unset());

        assert!(table.get(&DamageType::Slash, &source).is_none());
        assert!(table.get(&DamageType::Slash, &source).is_none());
        assert_eq!(table.status(), TableStatus::Missing);
        assert_eq!(table.load_count(), 1);
    }

    #[test]
    fn test_clear_then_reload() {
        let source = hit_stop_source();
        let table = hit_stop_table();

        table.snapshot(&source);
        table.clear();
        assert_eq!(table.status(), TableStatus::Unloaded);
        assert!(table.is_empty());

        source.insert("DT_HitStop.json", r#"[{ "damage_type": "Slash", "delay_time": 0.9 }]"#);
        assert_eq!(table.get(&DamageType::Slash, &source).unwrap().delay_time, 0.9);
        assert_eq!(table.load_count(), 2);
    }

    #[test]
    fn test_stale_snapshot_survives_clear() {
        let source = hit_stop_source();
        let table = hit_stop_table();

        let before = table.snapshot(&source);
        table.clear();

        assert_eq!(before.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_erased_stats() {
        let source = hit_stop_source();
        let table = hit_stop_table();
        table.snapshot(&source);

        let erased: &dyn ErasedTable = &table;
        let stats = erased.stats();
        assert_eq!(stats.name, "HitStop");
        assert_eq!(stats.status, TableStatus::Loaded);
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.source.as_deref(), Some("DT_HitStop.json"));
        assert!(erased.as_any().downcast_ref::<DomainTable<HitStop>>().is_some());
    }
}
