use std::{
    hash::Hash,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, trace};

use crate::{
    cache::AccessorKind,
    emit::{ArrayDescriptor, BatchDescriptor, CallDescriptor, MapDescriptor, MemberDescriptor},
    Result,
};

/// A key of a cache partition that can describe itself in log output
pub trait CacheKey: Eq + Hash + Clone {
    /// Short human readable label, e.g. `Sample.Person::Age`
    fn label(&self) -> String;
}

impl CacheKey for MemberDescriptor {
    fn label(&self) -> String {
        format!("{}::{}", self.target_type.fullname(), self.name())
    }
}

impl CacheKey for CallDescriptor {
    fn label(&self) -> String {
        format!("{}::{}", self.target_type.fullname(), self.signature())
    }
}

impl CacheKey for BatchDescriptor {
    fn label(&self) -> String {
        let names: Vec<&str> = self.members.iter().map(|member| member.name()).collect();
        format!("{}::[{}]", self.target_type.fullname(), names.join(", "))
    }
}

impl CacheKey for MapDescriptor {
    fn label(&self) -> String {
        format!(
            "{} -> {} ({} members)",
            self.source_type.fullname(),
            self.target_type.fullname(),
            self.pairs.len()
        )
    }
}

impl CacheKey for ArrayDescriptor {
    fn label(&self) -> String {
        self.array_type.fullname()
    }
}

/// Hit and miss counters of one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Number of stored accessors
    pub entries: usize,
    /// Lookups answered from the partition
    pub hits: u64,
    /// Lookups that emitted a new accessor
    pub misses: u64,
}

/// One descriptor to accessor map of the [`crate::cache::AccessorCache`].
///
/// Entries are created lazily and never evicted. Emission runs while the entry of the
/// shard is held, so concurrent requests for the same descriptor wait for the first one
/// instead of emitting twice. The emit closure must therefore not call back into the same
/// partition.
pub struct CachePartition<K, V> {
    kind: AccessorKind,
    entries: DashMap<K, V>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: CacheKey, V: Clone> CachePartition<K, V> {
    /// Create an empty partition
    #[must_use]
    pub fn new(kind: AccessorKind) -> Self {
        CachePartition {
            kind,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The kind of accessor stored here
    #[must_use]
    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    /// Returns the accessor stored for `key`, emitting and storing it first if there is
    /// none. `emit` runs at most once per key; if it fails nothing is stored.
    ///
    /// # Errors
    /// Returns the error of `emit`.
    pub fn get_or_create<F>(&self, key: &K, emit: F) -> Result<V>
    where
        F: FnOnce(&K) -> Result<V>,
    {
        if let Some(existing) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("{} cache hit for {}", self.kind, key.label());
            return Ok(existing.clone());
        }

        match self.entries.entry(key.clone()) {
            Entry::Occupied(existing) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("{} cache hit for {}", self.kind, key.label());
                Ok(existing.get().clone())
            }
            Entry::Vacant(slot) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let accessor = emit(key)?;
                debug!("Emitted {} for {}", self.kind, key.label());
                Ok(slot.insert(accessor).clone())
            }
        }
    }

    /// The accessor stored for `key`, without emitting
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Number of stored accessors
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been emitted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> PartitionStats {
        PartitionStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
