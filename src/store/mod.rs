//! Typed, heterogeneous content store shared across build steps.
//!
//! Loader steps populate the store at the start of a build pass; producer
//! steps read it while rendering. Records are keyed by their runtime type,
//! so unrelated loaders never collide, and each type's records keep their
//! insertion order (default listing order downstream).
//!
//! The store is owned by exactly one build pass: loaders get `&mut`, the
//! producer phase gets `&`. That makes the "loaders finish before any
//! producer starts" invariant a borrow-checker fact rather than a runtime
//! discipline.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

/// Marker for values that can live in the store.
///
/// Blanket-implemented; producer steps may run on rayon workers, hence the
/// `Send + Sync` bounds.
pub trait Record: Any + Send + Sync {}

impl<T: Any + Send + Sync> Record for T {}

/// Type-tag-keyed multi-map of build records.
///
/// One sequence of boxed records per concrete type. Append-only within a
/// pass; a fresh store is constructed for every build.
#[derive(Default)]
pub struct ContentStore {
    records: FxHashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the sequence for its type. Never fails.
    pub fn add<T: Record>(&mut self, record: T) {
        self.records
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Box::new(record));
    }

    /// All records of type `T`, in insertion order.
    ///
    /// Returns `None` only if no record of `T` was ever added.
    pub fn get_all<T: Record>(&self) -> Option<Vec<&T>> {
        let entries = self.records.get(&TypeId::of::<T>())?;
        Some(
            entries
                .iter()
                .filter_map(|boxed| boxed.downcast_ref::<T>())
                .collect(),
        )
    }

    /// First record of type `T`, if any.
    pub fn get<T: Record>(&self) -> Option<&T> {
        self.records
            .get(&TypeId::of::<T>())?
            .first()?
            .downcast_ref::<T>()
    }

    /// Number of records stored for type `T`.
    pub fn count<T: Record>(&self) -> usize {
        self.records
            .get(&TypeId::of::<T>())
            .map_or(0, |entries| entries.len())
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
