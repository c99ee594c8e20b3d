//! Symbol attributes.

use finch_interface::{Symbol, kw, map::FxHashMap};

bitflags::bitflags! {
    /// The attribute bitset of a symbol.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Attrs: u16 {
        /// Hold every argument unevaluated.
        const HOLD_ALL = 1 << 0;
        /// Hold the first argument unevaluated.
        const HOLD_FIRST = 1 << 1;
        /// Hold all but the first argument unevaluated.
        const HOLD_REST = 1 << 2;
        /// Splice same-head children into the argument list.
        const FLAT = 1 << 3;
        /// Sort arguments into the canonical order.
        const ORDERLESS = 1 << 4;
        /// A one-argument call returns its argument.
        const ONE_IDENTITY = 1 << 5;
        /// Thread element-wise over list arguments.
        const LISTABLE = 1 << 6;
        /// A constant symbol, known to `N`.
        const CONSTANT = 1 << 7;
        const NUMERIC_FUNCTION = 1 << 8;
        /// The symbol cannot be rebound or unbound.
        const PROTECTED = 1 << 9;
        const READ_PROTECTED = 1 << 10;
        /// Attributes cannot be changed.
        const LOCKED = 1 << 11;
        const TEMPORARY = 1 << 12;
    }
}

impl Attrs {
    const NAMED: &[(Attrs, Symbol)] = &[
        (Attrs::HOLD_ALL, kw::HoldAll),
        (Attrs::HOLD_FIRST, kw::HoldFirst),
        (Attrs::HOLD_REST, kw::HoldRest),
        (Attrs::FLAT, kw::Flat),
        (Attrs::ORDERLESS, kw::Orderless),
        (Attrs::ONE_IDENTITY, kw::OneIdentity),
        (Attrs::LISTABLE, kw::Listable),
        (Attrs::CONSTANT, kw::Constant),
        (Attrs::NUMERIC_FUNCTION, kw::NumericFunction),
        (Attrs::PROTECTED, kw::Protected),
        (Attrs::READ_PROTECTED, kw::ReadProtected),
        (Attrs::LOCKED, kw::Locked),
        (Attrs::TEMPORARY, kw::Temporary),
    ];

    /// Resolves an attribute from its naming symbol.
    pub fn from_symbol(sym: Symbol) -> Option<Self> {
        Self::NAMED.iter().find(|(_, s)| *s == sym).map(|(a, _)| *a)
    }

    /// The naming symbols of every attribute set in `self`, in declaration
    /// order.
    pub fn symbols(self) -> Vec<Symbol> {
        Self::NAMED.iter().filter(|(a, _)| self.contains(*a)).map(|(_, s)| *s).collect()
    }
}

/// The per-symbol attribute table.
///
/// Set and clear are idempotent; querying an unknown symbol yields the empty
/// set.
#[derive(Default)]
pub struct AttrTable {
    map: FxHashMap<Symbol, Attrs>,
}

impl AttrTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sym: Symbol) -> Attrs {
        self.map.get(&sym).copied().unwrap_or_default()
    }

    pub fn has(&self, sym: Symbol, attrs: Attrs) -> bool {
        self.get(sym).contains(attrs)
    }

    pub fn set(&mut self, sym: Symbol, attrs: Attrs) {
        *self.map.entry(sym).or_default() |= attrs;
    }

    pub fn clear(&mut self, sym: Symbol, attrs: Attrs) {
        if let Some(cur) = self.map.get_mut(&sym) {
            *cur -= attrs;
            if cur.is_empty() {
                self.map.remove(&sym);
            }
        }
    }

    /// Every symbol with at least one attribute, sorted by name for
    /// deterministic listings.
    pub fn symbols_with_attrs(&self) -> Vec<Symbol> {
        let mut syms: Vec<_> = self.map.keys().copied().collect();
        syms.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        syms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_are_idempotent() {
        finch_interface::enter(|| {
            let mut t = AttrTable::new();
            let s = Symbol::intern("f");
            t.set(s, Attrs::FLAT | Attrs::ORDERLESS);
            t.set(s, Attrs::FLAT);
            assert_eq!(t.get(s), Attrs::FLAT | Attrs::ORDERLESS);
            t.clear(s, Attrs::FLAT);
            t.clear(s, Attrs::FLAT);
            assert_eq!(t.get(s), Attrs::ORDERLESS);
            t.clear(s, Attrs::ORDERLESS);
            assert!(t.symbols_with_attrs().is_empty());
        });
    }

    #[test]
    fn names_roundtrip() {
        finch_interface::enter(|| {
            assert_eq!(Attrs::from_symbol(kw::HoldAll), Some(Attrs::HOLD_ALL));
            assert_eq!(Attrs::from_symbol(kw::Listable), Some(Attrs::LISTABLE));
            assert_eq!(Attrs::from_symbol(kw::Plus), None);
            let attrs = Attrs::FLAT | Attrs::PROTECTED;
            assert_eq!(attrs.symbols(), vec![kw::Flat, kw::Protected]);
        });
    }
}
