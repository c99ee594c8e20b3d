use crate::{Assoc, ErrorValue, FuncValue, Real};
use finch_interface::{Symbol, kw};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// An expression of the algebra.
///
/// This is a cheaply clonable, immutable handle; rewrite products share
/// sub-expressions freely. Structural equality has a pointer fast path.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

/// A kind of expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// An interned symbol. `True` and `False` are the boolean values.
    Symbol(Symbol),
    /// An arbitrary-precision signed integer.
    Int(BigInt),
    /// A reduced fraction with positive denominator.
    Rational(BigRational),
    /// A binary float with a precision attribute.
    Real(Real),
    /// An immutable UTF-8 string.
    Str(Arc<str>),
    /// An immutable byte sequence.
    Bytes(Arc<[u8]>),
    /// An insertion-ordered mapping with structural-equality keys.
    Assoc(Assoc),
    /// A captured anonymous function.
    Func(FuncValue),
    /// The compound form `head(args...)`.
    Call(Call),
    /// An error value carrying its stack trace.
    Err(Box<ErrorValue>),
}

/// The compound variant: a head applied to an argument sequence.
///
/// The length of a compound excludes the head.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Call {
    pub head: Expr,
    pub args: Vec<Expr>,
}

impl Call {
    pub fn new(head: Expr, args: Vec<Expr>) -> Self {
        Self { head, args }
    }

    /// The head as a symbol, if it is one.
    pub fn head_symbol(&self) -> Option<Symbol> {
        self.head.as_symbol()
    }
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self(Arc::new(kind))
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    // Constructors. None of these evaluate.

    pub fn symbol(sym: Symbol) -> Self {
        Self::new(ExprKind::Symbol(sym))
    }

    /// Interns `name` and wraps it as a symbol expression.
    pub fn symbol_str(name: &str) -> Self {
        Self::symbol(Symbol::intern(name))
    }

    pub fn int(value: impl Into<BigInt>) -> Self {
        Self::new(ExprKind::Int(value.into()))
    }

    /// Wraps a rational, collapsing integral values to `Int`.
    ///
    /// `BigRational` is reduced with a positive denominator by construction,
    /// so the algebra's invariant holds for every rational built here.
    pub fn rational(value: BigRational) -> Self {
        if value.is_integer() {
            Self::int(value.to_integer())
        } else {
            Self::new(ExprKind::Rational(value))
        }
    }

    pub fn real(value: Real) -> Self {
        Self::new(ExprKind::Real(value))
    }

    pub fn machine_real(value: f64) -> Self {
        Self::real(Real::machine(value))
    }

    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::new(ExprKind::Str(value.into()))
    }

    pub fn bytes(value: impl Into<Arc<[u8]>>) -> Self {
        Self::new(ExprKind::Bytes(value.into()))
    }

    pub fn assoc(value: Assoc) -> Self {
        Self::new(ExprKind::Assoc(value))
    }

    pub fn func(value: FuncValue) -> Self {
        Self::new(ExprKind::Func(value))
    }

    pub fn call(head: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call(Call::new(head, args)))
    }

    pub fn call_sym(head: Symbol, args: Vec<Expr>) -> Self {
        Self::call(Self::symbol(head), args)
    }

    pub fn error(value: ErrorValue) -> Self {
        Self::new(ExprKind::Err(Box::new(value)))
    }

    pub fn bool(value: bool) -> Self {
        Self::symbol(kw::boolean(value))
    }

    pub fn null() -> Self {
        Self::symbol(kw::Null)
    }

    /// Builds `List(items...)`.
    pub fn list(items: Vec<Expr>) -> Self {
        Self::call_sym(kw::List, items)
    }

    // Accessors.

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self.kind() {
            ExprKind::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self.kind() {
            ExprKind::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self.kind() {
            ExprKind::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&Real> {
        match self.kind() {
            ExprKind::Real(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.kind() {
            ExprKind::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.kind() {
            ExprKind::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_assoc(&self) -> Option<&Assoc> {
        match self.kind() {
            ExprKind::Assoc(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncValue> {
        match self.kind() {
            ExprKind::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self.kind() {
            ExprKind::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_err(&self) -> Option<&ErrorValue> {
        match self.kind() {
            ExprKind::Err(e) => Some(e),
            _ => None,
        }
    }

    /// The call, if this is a compound with the given head symbol.
    pub fn as_call_to(&self, head: Symbol) -> Option<&Call> {
        self.as_call().filter(|c| c.head_symbol() == Some(head))
    }

    /// Returns `true` if this is the given symbol.
    pub fn is_symbol(&self, sym: Symbol) -> bool {
        self.as_symbol() == Some(sym)
    }

    pub fn is_true(&self) -> bool {
        self.is_symbol(kw::True)
    }

    pub fn is_false(&self) -> bool {
        self.is_symbol(kw::False)
    }

    pub fn is_null(&self) -> bool {
        self.is_symbol(kw::Null)
    }

    /// Returns `true` for every variant except `Call`.
    ///
    /// Associations and function values have internal structure but are
    /// atomic for the purposes of evaluation entry.
    pub fn is_atom(&self) -> bool {
        !matches!(self.kind(), ExprKind::Call(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind(), ExprKind::Int(_) | ExprKind::Rational(_) | ExprKind::Real(_))
    }

    /// Every expression has a head: atoms yield the symbol naming their kind,
    /// compounds their stored head. `Head(H(x, y))` is `H`.
    pub fn head(&self) -> Expr {
        let sym = match self.kind() {
            ExprKind::Symbol(_) => kw::Symbol,
            ExprKind::Int(_) => kw::Integer,
            ExprKind::Rational(_) => kw::Rational,
            ExprKind::Real(_) => kw::Real,
            ExprKind::Str(_) => kw::String,
            ExprKind::Bytes(_) => kw::ByteArray,
            ExprKind::Assoc(_) => kw::Association,
            ExprKind::Func(_) => kw::Function,
            ExprKind::Err(_) => kw::Error,
            ExprKind::Call(c) => return c.head.clone(),
        };
        Expr::symbol(sym)
    }

    /// The head as a symbol: the kind symbol for atoms, the head for
    /// compounds whose head is a symbol.
    pub fn head_symbol(&self) -> Option<Symbol> {
        match self.kind() {
            ExprKind::Call(c) => c.head_symbol(),
            _ => self.head().as_symbol(),
        }
    }

    /// The number of arguments; zero for atoms.
    pub fn len(&self) -> usize {
        self.as_call().map_or(0, |c| c.args.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_interface::sym;

    #[test]
    fn heads() {
        finch_interface::enter(|| {
            assert_eq!(Expr::int(1).head(), Expr::symbol(kw::Integer));
            assert_eq!(Expr::string("x").head(), Expr::symbol(kw::String));
            assert_eq!(Expr::symbol(sym::Map).head(), Expr::symbol(kw::Symbol));
            let call = Expr::call_sym(kw::Plus, vec![Expr::int(1), Expr::int(2)]);
            assert_eq!(call.head(), Expr::symbol(kw::Plus));
            assert_eq!(call.len(), 2);
        });
    }

    #[test]
    fn structural_equality() {
        finch_interface::enter(|| {
            let a = Expr::call_sym(kw::Plus, vec![Expr::int(1), Expr::symbol_str("x")]);
            let b = Expr::call_sym(kw::Plus, vec![Expr::int(1), Expr::symbol_str("x")]);
            assert_eq!(a, b);
            assert!(!a.ptr_eq(&b));
            let c = a.clone();
            assert!(a.ptr_eq(&c));
            // Cross-kind numeric equality is a rewrite concern, not a
            // structural one.
            assert_ne!(Expr::int(1), Expr::machine_real(1.0));
        });
    }

    #[test]
    fn rational_collapses_to_int() {
        let r = BigRational::new(BigInt::from(4), BigInt::from(2));
        assert_eq!(Expr::rational(r), Expr::int(2));
        let half = BigRational::new(BigInt::from(-2), BigInt::from(-4));
        let e = Expr::rational(half);
        let r = e.as_rational().unwrap();
        assert_eq!(r.numer(), &BigInt::from(1));
        assert_eq!(r.denom(), &BigInt::from(2));
    }
}
