use crate::Expr;
use finch_interface::Symbol;

/// A captured anonymous function value.
///
/// With named parameters, application rewrites the parameter symbols
/// throughout the body. Without, the body refers to its arguments through the
/// slots `$1`, `$2`, … (bare `$` is `$1`), and nested function values shield
/// their own slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FuncValue {
    /// Ordered parameter symbols; `None` means slot-based.
    pub params: Option<Vec<Symbol>>,
    /// The body, held unevaluated until application.
    pub body: Expr,
}

impl FuncValue {
    /// A slot-based function.
    pub fn slots(body: Expr) -> Self {
        Self { params: None, body }
    }

    /// A function with named parameters.
    pub fn named(params: Vec<Symbol>, body: Expr) -> Self {
        Self { params: Some(params), body }
    }
}
