//! Accessor cache: at most one emitted accessor per distinct descriptor.
//!
//! The cache is split into independent [`CachePartition`]s, one per [`AccessorKind`], each
//! a concurrent map from descriptor to accessor. A miss emits the accessor under the shard
//! entry of its key, so racing callers for the same descriptor observe exactly one
//! emission and receive handles sharing one closure. Entries are never evicted; the cache
//! lives as long as its [`crate::Reflector`].
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{cache::AccessorKind, Reflector};
//!
//! let reflector = Reflector::new();
//! let person = reflector
//!     .registry()
//!     .class("Sample", "Person")
//!     .field("Age", reflector.registry().int32())
//!     .build()?;
//!
//! let first = reflector.getter(&person, "Age")?;
//! let second = reflector.getter(&person, "Age")?;
//! assert!(first.ptr_eq(&second));
//!
//! let stats = reflector.cache().stats();
//! assert_eq!(stats.get(AccessorKind::FieldGetter).misses, 1);
//! assert_eq!(stats.get(AccessorKind::FieldGetter).hits, 1);
//! # Ok::<(), dotreflect::Error>(())
//! ```

mod partition;

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

pub use partition::{CacheKey, CachePartition, PartitionStats};

use crate::emit::{
    ArrayDescriptor, ArrayElementGetter, ArrayElementSetter, BatchDescriptor, CallDescriptor, ConstructorInvoker,
    MapDescriptor, MemberDescriptor, MemberGetter, MemberSetter, MethodInvoker, MultiSetter, ObjectMapper,
    ShallowCloner,
};

/// The kinds of accessors, one cache partition each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum AccessorKind {
    /// Field getters
    FieldGetter,
    /// Field setters
    FieldSetter,
    /// Property getters
    PropertyGetter,
    /// Property setters
    PropertySetter,
    /// Constructor invokers
    Constructor,
    /// Method invokers
    Method,
    /// Indexer getters
    IndexerGetter,
    /// Indexer setters
    IndexerSetter,
    /// Array element getters
    ArrayGetter,
    /// Array element setters
    ArraySetter,
    /// Batch setters
    MultiSetter,
    /// Object mappers
    Mapper,
    /// Shallow cloners
    Cloner,
}

/// Counters of all partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    partitions: [PartitionStats; AccessorKind::COUNT],
}

impl CacheStats {
    /// Counters of one partition
    #[must_use]
    pub fn get(&self, kind: AccessorKind) -> PartitionStats {
        self.partitions[kind as usize]
    }

    /// Total number of stored accessors
    #[must_use]
    pub fn entries(&self) -> usize {
        self.partitions.iter().map(|stats| stats.entries).sum()
    }

    /// Total number of cache hits
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.partitions.iter().map(|stats| stats.hits).sum()
    }

    /// Total number of emissions
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.partitions.iter().map(|stats| stats.misses).sum()
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for kind in AccessorKind::iter() {
            let stats = self.get(kind);
            if stats.entries > 0 || stats.hits > 0 {
                writeln!(
                    f,
                    "{kind:<16} entries: {:>6}  hits: {:>8}  misses: {:>6}",
                    stats.entries, stats.hits, stats.misses
                )?;
            }
        }
        Ok(())
    }
}

/// The accessor cache of a [`crate::Reflector`]
pub struct AccessorCache {
    field_getters: CachePartition<MemberDescriptor, MemberGetter>,
    field_setters: CachePartition<MemberDescriptor, MemberSetter>,
    property_getters: CachePartition<MemberDescriptor, MemberGetter>,
    property_setters: CachePartition<MemberDescriptor, MemberSetter>,
    constructors: CachePartition<CallDescriptor, ConstructorInvoker>,
    methods: CachePartition<CallDescriptor, MethodInvoker>,
    indexer_getters: CachePartition<CallDescriptor, MethodInvoker>,
    indexer_setters: CachePartition<CallDescriptor, MethodInvoker>,
    array_getters: CachePartition<ArrayDescriptor, ArrayElementGetter>,
    array_setters: CachePartition<ArrayDescriptor, ArrayElementSetter>,
    multi_setters: CachePartition<BatchDescriptor, MultiSetter>,
    mappers: CachePartition<MapDescriptor, ObjectMapper>,
    cloners: CachePartition<BatchDescriptor, ShallowCloner>,
}

impl AccessorCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        AccessorCache {
            field_getters: CachePartition::new(AccessorKind::FieldGetter),
            field_setters: CachePartition::new(AccessorKind::FieldSetter),
            property_getters: CachePartition::new(AccessorKind::PropertyGetter),
            property_setters: CachePartition::new(AccessorKind::PropertySetter),
            constructors: CachePartition::new(AccessorKind::Constructor),
            methods: CachePartition::new(AccessorKind::Method),
            indexer_getters: CachePartition::new(AccessorKind::IndexerGetter),
            indexer_setters: CachePartition::new(AccessorKind::IndexerSetter),
            array_getters: CachePartition::new(AccessorKind::ArrayGetter),
            array_setters: CachePartition::new(AccessorKind::ArraySetter),
            multi_setters: CachePartition::new(AccessorKind::MultiSetter),
            mappers: CachePartition::new(AccessorKind::Mapper),
            cloners: CachePartition::new(AccessorKind::Cloner),
        }
    }

    /// Field getters
    #[must_use]
    pub fn field_getters(&self) -> &CachePartition<MemberDescriptor, MemberGetter> {
        &self.field_getters
    }

    /// Field setters
    #[must_use]
    pub fn field_setters(&self) -> &CachePartition<MemberDescriptor, MemberSetter> {
        &self.field_setters
    }

    /// Property getters
    #[must_use]
    pub fn property_getters(&self) -> &CachePartition<MemberDescriptor, MemberGetter> {
        &self.property_getters
    }

    /// Property setters
    #[must_use]
    pub fn property_setters(&self) -> &CachePartition<MemberDescriptor, MemberSetter> {
        &self.property_setters
    }

    /// Constructor invokers
    #[must_use]
    pub fn constructors(&self) -> &CachePartition<CallDescriptor, ConstructorInvoker> {
        &self.constructors
    }

    /// Method invokers
    #[must_use]
    pub fn methods(&self) -> &CachePartition<CallDescriptor, MethodInvoker> {
        &self.methods
    }

    /// Indexer getters, keyed by the getter method of the indexer
    #[must_use]
    pub fn indexer_getters(&self) -> &CachePartition<CallDescriptor, MethodInvoker> {
        &self.indexer_getters
    }

    /// Indexer setters, keyed by the setter method of the indexer
    #[must_use]
    pub fn indexer_setters(&self) -> &CachePartition<CallDescriptor, MethodInvoker> {
        &self.indexer_setters
    }

    /// Array element getters
    #[must_use]
    pub fn array_getters(&self) -> &CachePartition<ArrayDescriptor, ArrayElementGetter> {
        &self.array_getters
    }

    /// Array element setters
    #[must_use]
    pub fn array_setters(&self) -> &CachePartition<ArrayDescriptor, ArrayElementSetter> {
        &self.array_setters
    }

    /// Batch setters
    #[must_use]
    pub fn multi_setters(&self) -> &CachePartition<BatchDescriptor, MultiSetter> {
        &self.multi_setters
    }

    /// Object mappers
    #[must_use]
    pub fn mappers(&self) -> &CachePartition<MapDescriptor, ObjectMapper> {
        &self.mappers
    }

    /// Shallow cloners
    #[must_use]
    pub fn cloners(&self) -> &CachePartition<BatchDescriptor, ShallowCloner> {
        &self.cloners
    }

    /// Counters of every partition
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut partitions = [PartitionStats::default(); AccessorKind::COUNT];
        for kind in AccessorKind::iter() {
            partitions[kind as usize] = match kind {
                AccessorKind::FieldGetter => self.field_getters.stats(),
                AccessorKind::FieldSetter => self.field_setters.stats(),
                AccessorKind::PropertyGetter => self.property_getters.stats(),
                AccessorKind::PropertySetter => self.property_setters.stats(),
                AccessorKind::Constructor => self.constructors.stats(),
                AccessorKind::Method => self.methods.stats(),
                AccessorKind::IndexerGetter => self.indexer_getters.stats(),
                AccessorKind::IndexerSetter => self.indexer_setters.stats(),
                AccessorKind::ArrayGetter => self.array_getters.stats(),
                AccessorKind::ArraySetter => self.array_setters.stats(),
                AccessorKind::MultiSetter => self.multi_setters.stats(),
                AccessorKind::Mapper => self.mappers.stats(),
                AccessorKind::Cloner => self.cloners.stats(),
            };
        }
        CacheStats { partitions }
    }

    /// Total number of stored accessors
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats().entries()
    }

    /// Returns true if no accessor has been emitted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AccessorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Barrier,
    };

    use super::*;
    use crate::{
        emit, lookup,
        metadata::{flags::BindingFlags, typesystem::TypeRegistry},
        test::fixtures::Model,
        Error,
    };

    fn age_descriptor(model: &Model) -> MemberDescriptor {
        let age = lookup::field(&model.person, "Age", BindingFlags::default()).unwrap();
        MemberDescriptor::new(&model.person, age.into()).unwrap()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let cache = AccessorCache::new();
        let descriptor = age_descriptor(&model);
        let emitted = AtomicUsize::new(0);

        let counting = |key: &MemberDescriptor| {
            emitted.fetch_add(1, Ordering::SeqCst);
            emit::getter(key)
        };
        let first = cache.field_getters().get_or_create(&descriptor, counting).unwrap();
        let second = cache.field_getters().get_or_create(&descriptor, counting).unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
        let stats = cache.stats().get(AccessorKind::FieldGetter);
        assert_eq!(stats, PartitionStats { entries: 1, hits: 1, misses: 1 });
    }

    #[test]
    fn test_errors_are_not_stored() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let cache = AccessorCache::new();
        let descriptor = age_descriptor(&model);

        let failed = cache
            .field_getters()
            .get_or_create(&descriptor, |_| Err(malformed_error!("nope")));
        assert!(matches!(failed, Err(Error::Malformed { .. })));
        assert!(cache.field_getters().get(&descriptor).is_none());

        cache.field_getters().get_or_create(&descriptor, emit::getter).unwrap();
        assert!(cache.field_getters().get(&descriptor).is_some());
    }

    #[test]
    fn test_partitions_are_independent() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let cache = AccessorCache::new();
        let descriptor = age_descriptor(&model);

        cache.field_getters().get_or_create(&descriptor, emit::getter).unwrap();
        cache.field_setters().get_or_create(&descriptor, emit::setter).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.property_getters().is_empty());
        assert_eq!(cache.stats().misses(), 2);
    }

    #[test]
    fn test_concurrent_warm_up_emits_once() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let cache = AccessorCache::new();
        let descriptor = age_descriptor(&model);
        let emitted = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        let (cache, descriptor, emitted, barrier) = (&cache, &descriptor, &emitted, &barrier);

        let getters: Vec<MemberGetter> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        cache
                            .field_getters()
                            .get_or_create(descriptor, |key| {
                                emitted.fetch_add(1, Ordering::SeqCst);
                                emit::getter(key)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert_eq!(emitted.load(Ordering::SeqCst), 1);
        assert!(getters.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
        assert_eq!(cache.stats().get(AccessorKind::FieldGetter).hits, 7);
    }

    #[test]
    fn test_stats_display() {
        let cache = AccessorCache::new();
        assert_eq!(cache.stats().to_string(), "");
        assert!(cache.is_empty());
    }
}
