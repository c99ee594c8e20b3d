//! The builtin library.
//!
//! Each builtin contributes its attributes plus one or more rules to the
//! shared tables. Handlers receive the evaluated, attribute-transformed
//! argument list; returning the unchanged call is how a handler declines to
//! rewrite. All builtin symbols are protected.

mod assoc;
mod compare;
mod control;
mod functional;
mod lists;
mod math;
mod strings;

use crate::{Evaluator, attr::Attrs, rules::BuiltinFn};
use finch_expr::{ErrorKind, ErrorValue, Expr};
use finch_interface::{Symbol, kw};
use num_traits::ToPrimitive;

pub(crate) fn install(ev: &mut Evaluator<'_>) {
    // Inert distinguished symbols.
    for sym in [kw::True, kw::False, kw::Null, kw::Sequence, kw::Hold, kw::HoldForm] {
        ev.attrs.set(sym, Attrs::PROTECTED);
    }
    ev.attrs.set(kw::Hold, Attrs::HOLD_ALL);
    ev.attrs.set(kw::HoldForm, Attrs::HOLD_ALL);
    for sym in [kw::E, kw::Pi] {
        ev.attrs.set(sym, Attrs::CONSTANT | Attrs::PROTECTED);
    }
    // Pattern heads stay inert; holding keeps capture names unevaluated.
    for sym in [kw::Blank, kw::BlankSequence, kw::BlankNullSequence] {
        ev.attrs.set(sym, Attrs::PROTECTED);
    }
    ev.attrs.set(kw::Pattern, Attrs::HOLD_FIRST | Attrs::PROTECTED);

    math::install(ev);
    compare::install(ev);
    lists::install(ev);
    functional::install(ev);
    control::install(ev);
    strings::install(ev);
    assoc::install(ev);
}

/// Registration helper: sets the attributes (always including `Protected`)
/// and installs the dispatch rule for the given argument shape.
pub(crate) struct Reg<'a, 'sess> {
    pub ev: &'a mut Evaluator<'sess>,
}

/// The argument shape a builtin dispatches on.
#[derive(Clone, Copy)]
pub(crate) enum Arity {
    /// `F(___)`
    Any,
    /// `F(_, ..., _)` with exactly `n` blanks.
    Exact(usize),
    /// `F(_, ..., _, ___)` with `n` leading blanks.
    AtLeast(usize),
    /// Registered for both `F(_, .., _)` (n) and `F(_, .., _)` (m).
    Between(usize, usize),
}

impl<'a, 'sess> Reg<'a, 'sess> {
    pub(crate) fn new(ev: &'a mut Evaluator<'sess>) -> Self {
        Self { ev }
    }

    pub(crate) fn builtin(&mut self, sym: Symbol, attrs: Attrs, arity: Arity, f: BuiltinFn) {
        self.ev.attrs.set(sym, attrs | Attrs::PROTECTED);
        match arity {
            Arity::Any => self.ev.register_builtin(any_pat(sym), f),
            Arity::Exact(n) => self.ev.register_builtin(exact_pat(sym, n), f),
            Arity::AtLeast(n) => self.ev.register_builtin(at_least_pat(sym, n), f),
            Arity::Between(n, m) => {
                for k in n..=m {
                    self.ev.register_builtin(exact_pat(sym, k), f);
                }
            }
        }
    }

    /// An attribute-only entry: no rules, the symbol is inert.
    pub(crate) fn inert(&mut self, sym: Symbol, attrs: Attrs) {
        self.ev.attrs.set(sym, attrs | Attrs::PROTECTED);
    }
}

fn blank() -> Expr {
    Expr::call_sym(kw::Blank, vec![])
}

fn null_seq() -> Expr {
    Expr::call_sym(kw::BlankNullSequence, vec![])
}

fn any_pat(sym: Symbol) -> Expr {
    Expr::call_sym(sym, vec![null_seq()])
}

fn exact_pat(sym: Symbol, n: usize) -> Expr {
    Expr::call_sym(sym, (0..n).map(|_| blank()).collect())
}

fn at_least_pat(sym: Symbol, n: usize) -> Expr {
    let mut args: Vec<Expr> = (0..n).map(|_| blank()).collect();
    args.push(null_seq());
    Expr::call_sym(sym, args)
}

// Shared argument plumbing.

pub(crate) fn argument_error(msg: impl Into<String>) -> ErrorValue {
    ErrorValue::new(ErrorKind::Argument, msg)
}

pub(crate) fn type_error(msg: impl Into<String>) -> ErrorValue {
    ErrorValue::new(ErrorKind::Type, msg)
}

pub(crate) fn part_error(msg: impl Into<String>) -> ErrorValue {
    ErrorValue::new(ErrorKind::Part, msg)
}

/// The unchanged call, for handlers that decline to rewrite.
pub(crate) fn unchanged(sym: Symbol, args: &[Expr]) -> Expr {
    Expr::call_sym(sym, args.to_vec())
}

pub(crate) fn expect_usize(e: &Expr, what: &str) -> Result<usize, ErrorValue> {
    e.as_int()
        .and_then(|i| i.to_usize())
        .ok_or_else(|| {
            type_error(format!("{what} must be a non-negative machine-size integer, got `{e}`"))
        })
}

pub(crate) fn expect_list<'e>(e: &'e Expr, what: &str) -> Result<&'e [Expr], ErrorValue> {
    e.as_call_to(kw::List)
        .map(|c| c.args.as_slice())
        .ok_or_else(|| type_error(format!("{what} must be a list, got `{e}`")))
}

pub(crate) fn expect_symbol(e: &Expr, what: &str) -> Result<Symbol, ErrorValue> {
    e.as_symbol()
        .ok_or_else(|| type_error(format!("{what} must be a symbol, got `{e}`")))
}

pub(crate) fn expect_str<'e>(e: &'e Expr, what: &str) -> Result<&'e str, ErrorValue> {
    e.as_str().ok_or_else(|| type_error(format!("{what} must be a string, got `{e}`")))
}
