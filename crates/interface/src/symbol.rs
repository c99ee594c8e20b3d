use crate::SessionGlobals;
use std::{fmt, str};

/// An interned string.
///
/// Internally, a `Symbol` is implemented as an index, and all operations
/// (including hashing, equality, and ordering) operate on that index.
///
/// Note that symbol identity is only meaningful relative to the interner of
/// the session the symbol was created in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Default for Symbol {
    #[inline]
    fn default() -> Self {
        Self::DUMMY
    }
}

impl Symbol {
    /// A dummy symbol.
    pub const DUMMY: Self = kw::Empty;

    const fn new(n: u32) -> Self {
        Self(n)
    }

    /// Maps a string to its interned representation.
    pub fn intern(string: &str) -> Self {
        SessionGlobals::with_or_default(|g| g.symbol_interner.intern(string))
    }

    /// "Specialization" of [`ToString`] using [`as_str`](Self::as_str).
    #[inline]
    #[allow(clippy::inherent_to_string_shadow_display)]
    pub fn to_string(&self) -> String {
        self.as_str().to_string()
    }

    /// Access the underlying string.
    ///
    /// Note that the lifetime of the return value is a lie. It's not the same
    /// as `&self`, but actually tied to the lifetime of the underlying
    /// interner. Interners are long-lived, and there are very few of them, and
    /// this function is typically used for short-lived things, so in practice
    /// it works out ok.
    pub fn as_str(&self) -> &str {
        SessionGlobals::with(|g| {
            let s: &str = g.symbol_interner.get(*self);
            // SAFETY: the interner is append-only and outlives every symbol
            // handed out while the session globals are set.
            unsafe { str::from_utf8_unchecked(std::slice::from_raw_parts(s.as_ptr(), s.len())) }
        })
    }

    /// Returns the internal representation of the symbol.
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if the symbol was interned at session start.
    #[inline]
    pub const fn is_preinterned(self) -> bool {
        self.as_u32() < PREINTERNED_SYMBOLS_COUNT
    }
}

impl fmt::Debug for Symbol {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Symbol {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// Symbol interner.
///
/// Initialized in `SessionGlobals` with the `symbols!` macro's initial
/// symbols. Concurrent readers and writers are allowed; entries are
/// append-only.
pub(crate) struct Interner(lasso::ThreadedRodeo<Symbol, crate::map::FxBuildHasher>);

impl Interner {
    pub(crate) fn fresh() -> Self {
        Self::prefill(PRE_INTERNED)
    }

    fn prefill(init: &[&'static str]) -> Self {
        let strings = init.len().next_power_of_two();
        let bytes = init.iter().map(|s| s.len()).sum::<usize>().next_power_of_two().max(4096);
        let capacity =
            lasso::Capacity::new(strings, std::num::NonZeroUsize::new(bytes).unwrap());
        let rodeo = lasso::ThreadedRodeo::with_capacity_and_hasher(capacity, Default::default());
        for &s in init {
            rodeo.get_or_intern_static(s);
        }
        for digit in DIGITS {
            rodeo.get_or_intern_static(digit);
        }
        Self(rodeo)
    }

    #[inline]
    pub(crate) fn intern(&self, string: &str) -> Symbol {
        self.0.get_or_intern(string)
    }

    #[inline]
    pub(crate) fn get(&self, symbol: Symbol) -> &str {
        self.0.resolve(&symbol)
    }
}

unsafe impl lasso::Key for Symbol {
    #[inline]
    fn into_usize(self) -> usize {
        self.as_u32() as usize
    }

    #[inline]
    fn try_from_usize(int: usize) -> Option<Self> {
        int.try_into().ok().map(Self::new)
    }
}

/// Declares the pre-interned symbol tables.
///
/// Keywords carry their spelled-out string (some are not valid identifiers);
/// plain symbols are interned under their own name.
macro_rules! symbols {
    (
        Keywords { $($kw:ident: $kw_str:literal,)* }
        Symbols { $($sym:ident,)* }
    ) => {
        #[allow(non_camel_case_types, dead_code)]
        #[repr(u32)]
        enum SymbolIndex {
            $($kw,)*
            $($sym,)*
        }

        const PRE_INTERNED: &[&'static str] = &[
            $($kw_str,)*
            $(stringify!($sym),)*
        ];

        #[allow(non_upper_case_globals)]
        mod kw_generated {
            use super::{Symbol as __Symbol, SymbolIndex};
            $(pub const $kw: __Symbol = __Symbol::new(SymbolIndex::$kw as u32);)*
        }

        #[allow(non_upper_case_globals)]
        mod sym_generated {
            use super::{Symbol as __Symbol, SymbolIndex};
            $(pub const $sym: __Symbol = __Symbol::new(SymbolIndex::$sym as u32);)*
        }
    };
}

const DIGITS: [&'static str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const SYMBOL_DIGITS_BASE: u32 = PRE_INTERNED.len() as u32;

const PREINTERNED_SYMBOLS_COUNT: u32 = SYMBOL_DIGITS_BASE + DIGITS.len() as u32;

// This module has a very short name because it's used a lot.
/// This module contains the `Symbol`s the kernel itself gives meaning to:
/// distinguished values, heads emitted by the parser, attribute names, and
/// error kinds.
///
/// Given that `kw` is imported, use them like `kw::Plus` or `kw::HoldAll`.
pub mod kw {
    use super::Symbol as __Symbol;

    #[doc(inline)]
    pub use super::kw_generated::*;

    /// Returns the boolean symbol for the given value.
    #[inline]
    pub const fn boolean(b: bool) -> __Symbol {
        if b { True } else { False }
    }
}

// This module has a very short name because it's used a lot.
/// This module contains the pre-interned names of the builtin library.
///
/// Given that `sym` is imported, use them like `sym::Map` or `sym::Length`.
pub mod sym {
    use super::Symbol;

    #[doc(inline)]
    pub use super::sym_generated::*;

    /// Get the symbol for an integer.
    ///
    /// The first few non-negative integers each have a static symbol and
    /// therefore are fast.
    pub fn integer<N: TryInto<usize> + Copy + itoa::Integer>(n: N) -> Symbol {
        if let Ok(idx @ 0..=9) = n.try_into() {
            return Symbol::new(super::SYMBOL_DIGITS_BASE + idx as u32);
        }
        Symbol::intern(itoa::Buffer::new().format(n))
    }
}

symbols! {
    Keywords {
        // Special symbols used internally.
        Empty:              "",
        Dollar:             "$",

        // Distinguished values.
        True:               "True",
        False:              "False",
        Null:               "Null",
        E:                  "E",
        Pi:                 "Pi",

        // Structural heads known to the parser and the evaluator.
        List:               "List",
        Association:        "Association",
        ByteArray:          "ByteArray",
        Rule:               "Rule",
        RuleDelayed:        "RuleDelayed",
        Blank:              "Blank",
        BlankSequence:      "BlankSequence",
        BlankNullSequence:  "BlankNullSequence",
        Pattern:            "Pattern",
        Sequence:           "Sequence",
        Function:           "Function",
        Hold:               "Hold",
        HoldForm:           "HoldForm",
        Evaluate:           "Evaluate",

        // Heads the infix surface syntax maps to.
        Plus:               "Plus",
        Subtract:           "Subtract",
        Times:              "Times",
        Divide:             "Divide",
        Power:              "Power",
        Minus:              "Minus",
        Equal:              "Equal",
        Unequal:            "Unequal",
        Less:               "Less",
        Greater:            "Greater",
        LessEqual:          "LessEqual",
        GreaterEqual:       "GreaterEqual",
        SameQ:              "SameQ",
        UnsameQ:            "UnsameQ",
        And:                "And",
        Or:                 "Or",
        Not:                "Not",
        Set:                "Set",
        SetDelayed:         "SetDelayed",
        Unset:              "Unset",
        CompoundExpression: "CompoundExpression",
        Part:               "Part",
        SliceRange:         "SliceRange",
        TakeFrom:           "TakeFrom",
        Take:               "Take",
        PartSet:            "PartSet",
        SliceSet:           "SliceSet",

        // Heads of atoms, as returned by `Head`.
        Integer:            "Integer",
        Rational:           "Rational",
        Real:               "Real",
        String:             "String",
        Symbol:             "Symbol",
        Error:              "Error",
        // Union of Integer, Rational, and Real in pattern type guards.
        Number:             "Number",

        // Attributes.
        HoldAll:            "HoldAll",
        HoldFirst:          "HoldFirst",
        HoldRest:           "HoldRest",
        Flat:               "Flat",
        Orderless:          "Orderless",
        OneIdentity:        "OneIdentity",
        Listable:           "Listable",
        Constant:           "Constant",
        NumericFunction:    "NumericFunction",
        Protected:          "Protected",
        ReadProtected:      "ReadProtected",
        Locked:             "Locked",
        Temporary:          "Temporary",

        // Error kinds.
        ArgumentError:      "ArgumentError",
        TypeError:          "TypeError",
        DivisionByZero:     "DivisionByZero",
        MathematicalError:  "MathematicalError",
        PartError:          "PartError",
        RecursionError:     "RecursionError",
        DefinitionError:    "DefinitionError",
        BindingError:       "BindingError",
        AssertionFailed:    "AssertionFailed",
        ParseError:         "ParseError",
    }

    Symbols {
        Abs,
        Append,
        Apply,
        Assert,
        AssociationMap,
        AtomQ,
        Attributes,
        Block,
        Cases,
        Ceiling,
        Characters,
        Clear,
        ClearAttributes,
        Composition,
        Count,
        DeleteCases,
        Denominator,
        Do,
        Drop,
        EvenQ,
        First,
        Flatten,
        Floor,
        Fold,
        FoldList,
        For,
        FullForm,
        GCD,
        Head,
        Identity,
        If,
        IntegerQ,
        Join,
        KeyDrop,
        KeyQ,
        Keys,
        LCM,
        Last,
        Length,
        ListQ,
        Lookup,
        Map,
        MatchQ,
        Max,
        MemberQ,
        Min,
        Mod,
        Most,
        N,
        Nest,
        NestList,
        Normal,
        NumberQ,
        Numerator,
        OddQ,
        Position,
        Prepend,
        Print,
        Protect,
        Quotient,
        Range,
        Replace,
        ReplaceAll,
        Rest,
        Reverse,
        Round,
        Select,
        SetAttributes,
        Sign,
        Sort,
        StringContainsQ,
        StringJoin,
        StringLength,
        StringQ,
        StringSplit,
        StringTake,
        Table,
        ToLowerCase,
        ToString,
        ToUpperCase,
        TrueQ,
        Union,
        Unprotect,
        Values,
        Which,
        While,
        With,
        Xor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preinterned() {
        crate::enter(|| {
            assert_eq!(kw::Empty.as_str(), "");
            assert_eq!(kw::Plus.as_str(), "Plus");
            assert_eq!(sym::Map.as_str(), "Map");
            assert_eq!(Symbol::intern("Plus"), kw::Plus);
            assert_eq!(Symbol::intern("Map"), sym::Map);
            assert!(sym::Map.is_preinterned());
        });
    }

    #[test]
    fn interning_is_stable() {
        crate::enter(|| {
            let a = Symbol::intern("dog");
            let b = Symbol::intern("cat");
            assert_ne!(a, b);
            assert_eq!(Symbol::intern("dog"), a);
            assert_eq!(a.as_str(), "dog");
            assert!(!a.is_preinterned());
        });
    }

    #[test]
    fn integer_symbols() {
        crate::enter(|| {
            assert_eq!(sym::integer(0).as_str(), "0");
            assert_eq!(sym::integer(9).as_str(), "9");
            assert_eq!(sym::integer(1234).as_str(), "1234");
        });
    }

    #[test]
    fn defaults() {
        assert_eq!(Symbol::DUMMY, Symbol::new(0));
        assert_eq!(Symbol::DUMMY, Symbol::default());
        crate::enter(|| {
            assert_eq!(Symbol::DUMMY.as_str(), "");
        });
    }
}
