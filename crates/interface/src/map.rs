//! Map types used throughout the kernel.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

pub use rustc_hash::{FxBuildHasher, FxHasher};

/// A [`HashMap`] using [`FxHasher`] as its hasher.
pub type FxHashMap<K, V> = HashMap<K, V, FxBuildHasher>;
/// A [`HashSet`] using [`FxHasher`] as its hasher.
pub type FxHashSet<V> = HashSet<V, FxBuildHasher>;
/// An insertion-ordered [`IndexMap`] using [`FxHasher`] as its hasher.
///
/// This is the representation of association values, which must preserve the
/// order keys were inserted in.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
