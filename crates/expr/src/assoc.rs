use crate::Expr;
use finch_interface::map::{FxBuildHasher, FxIndexMap};
use std::hash::{BuildHasher, Hash, Hasher};

/// An association: an ordered mapping from expression keys to expression
/// values.
///
/// Insertion order is preserved for iteration; lookup is by structural
/// equality of keys. Equality between associations is order-insensitive.
#[derive(Clone, Debug, Default)]
pub struct Assoc {
    entries: FxIndexMap<Expr, Expr>,
}

impl Assoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an association from key-value pairs. Duplicate keys keep their
    /// first position; the last written value wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Expr, Expr)>) -> Self {
        let mut entries = FxIndexMap::default();
        for (k, v) in pairs {
            entries.insert(k, v);
        }
        Self { entries }
    }

    pub fn get(&self, key: &Expr) -> Option<&Expr> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Expr) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: Expr, value: Expr) {
        self.entries.insert(key, value);
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &Expr) -> Option<Expr> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Expr> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Expr> {
        self.entries.values()
    }
}

impl PartialEq for Assoc {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality is order-insensitive: same key set, equal values.
        self.entries == other.entries
    }
}

impl Eq for Assoc {}

impl Hash for Assoc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equality ignores entry order, so the hash must too: combine the
        // per-entry hashes commutatively.
        let hasher = FxBuildHasher;
        let mut acc = 0u64;
        for entry in &self.entries {
            acc = acc.wrapping_add(hasher.hash_one(entry));
        }
        self.entries.len().hash(state);
        acc.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        finch_interface::enter(|| {
            let a = Assoc::from_pairs([
                (Expr::string("k"), Expr::int(1)),
                (Expr::string("j"), Expr::int(2)),
                (Expr::string("k"), Expr::int(3)),
            ]);
            assert_eq!(a.len(), 2);
            assert_eq!(a.get(&Expr::string("k")), Some(&Expr::int(3)));
            // The first position is kept.
            assert_eq!(a.keys().next(), Some(&Expr::string("k")));
        });
    }

    #[test]
    fn equality_ignores_order() {
        finch_interface::enter(|| {
            let a = Assoc::from_pairs([
                (Expr::int(1), Expr::string("a")),
                (Expr::int(2), Expr::string("b")),
            ]);
            let b = Assoc::from_pairs([
                (Expr::int(2), Expr::string("b")),
                (Expr::int(1), Expr::string("a")),
            ]);
            assert_eq!(a, b);
            assert_ne!(
                a.iter().next().map(|(k, _)| k.clone()),
                b.iter().next().map(|(k, _)| k.clone())
            );
        });
    }
}
