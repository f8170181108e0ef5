//! Thin aliases around [`indexmap`] collections, kept in one place so the
//! rest of the crate talks about "sets" and "maps" rather than a specific
//! hasher. Insertion-ordered iteration keeps `Debug` output and printed
//! clusters deterministic across runs on the same input.

/// An insertion-ordered set.
pub type OrderedSet<T> = indexmap::IndexSet<T>;

/// An insertion-ordered map.
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V>;
