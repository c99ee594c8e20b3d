//! Comparison, logic, and predicate builtins.
//!
//! Structural equality is `SameQ`; `Equal` adds numeric promotion across the
//! numeric kinds and stays unevaluated when neither side is decided.

use super::{Arity, Reg, unchanged};
use crate::{
    EvalResult, Evaluator,
    attr::Attrs,
    pattern::{Matcher, Pat},
};
use finch_expr::{Expr, ExprKind, Num};
use finch_interface::{Symbol, kw, sym};
use num_integer::Integer;
use std::cmp::Ordering;

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.builtin(kw::Equal, Attrs::empty(), Arity::AtLeast(2), equal);
    reg.builtin(kw::Unequal, Attrs::empty(), Arity::AtLeast(2), unequal);
    reg.builtin(kw::Less, Attrs::empty(), Arity::AtLeast(2), less);
    reg.builtin(kw::Greater, Attrs::empty(), Arity::AtLeast(2), greater);
    reg.builtin(kw::LessEqual, Attrs::empty(), Arity::AtLeast(2), less_equal);
    reg.builtin(kw::GreaterEqual, Attrs::empty(), Arity::AtLeast(2), greater_equal);
    reg.builtin(kw::SameQ, Attrs::empty(), Arity::AtLeast(2), same_q);
    reg.builtin(kw::UnsameQ, Attrs::empty(), Arity::AtLeast(2), unsame_q);
    reg.builtin(kw::And, Attrs::HOLD_ALL | Attrs::FLAT | Attrs::ONE_IDENTITY, Arity::Any, and);
    reg.builtin(kw::Or, Attrs::HOLD_ALL | Attrs::FLAT | Attrs::ONE_IDENTITY, Arity::Any, or);
    reg.builtin(kw::Not, Attrs::empty(), Arity::Exact(1), not);
    reg.builtin(sym::Xor, Attrs::FLAT | Attrs::ORDERLESS, Arity::Any, xor);

    reg.builtin(sym::NumberQ, Attrs::empty(), Arity::Exact(1), number_q);
    reg.builtin(sym::IntegerQ, Attrs::empty(), Arity::Exact(1), integer_q);
    reg.builtin(sym::EvenQ, Attrs::empty(), Arity::Exact(1), even_q);
    reg.builtin(sym::OddQ, Attrs::empty(), Arity::Exact(1), odd_q);
    reg.builtin(sym::ListQ, Attrs::empty(), Arity::Exact(1), list_q);
    reg.builtin(sym::StringQ, Attrs::empty(), Arity::Exact(1), string_q);
    reg.builtin(sym::AtomQ, Attrs::empty(), Arity::Exact(1), atom_q);
    reg.builtin(sym::TrueQ, Attrs::empty(), Arity::Exact(1), true_q);
    reg.builtin(sym::MatchQ, Attrs::empty(), Arity::Exact(2), match_q);
}

/// Three-valued comparison outcome: symbolic operands stay undecided.
#[derive(Clone, Copy, PartialEq)]
enum Verdict {
    True,
    False,
    Unknown,
}

impl Verdict {
    fn of(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }
}

/// Whether an expression is a concrete literal whose inequality is decided
/// structurally.
fn is_concrete(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::Int(_)
        | ExprKind::Rational(_)
        | ExprKind::Real(_)
        | ExprKind::Str(_)
        | ExprKind::Bytes(_)
        | ExprKind::Assoc(_) => true,
        ExprKind::Symbol(s) => *s == kw::True || *s == kw::False,
        _ => false,
    }
}

fn decide_equal(a: &Expr, b: &Expr) -> Verdict {
    if let (Some(x), Some(y)) = (Num::from_expr(a), Num::from_expr(b)) {
        return Verdict::of(x.cmp_num(&y) == Ordering::Equal);
    }
    if a == b {
        return Verdict::True;
    }
    if is_concrete(a) && is_concrete(b) {
        return Verdict::False;
    }
    Verdict::Unknown
}

fn decide_order(a: &Expr, b: &Expr, accept: &[Ordering]) -> Verdict {
    if let (Some(x), Some(y)) = (Num::from_expr(a), Num::from_expr(b)) {
        return Verdict::of(accept.contains(&x.cmp_num(&y)));
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Verdict::of(accept.contains(&x.cmp(y)));
    }
    Verdict::Unknown
}

/// Applies a pairwise decision over adjacent arguments: all-true is `True`,
/// any-false is `False`, anything undecided leaves the call unevaluated.
fn chain(
    head: Symbol,
    args: &[Expr],
    decide: impl Fn(&Expr, &Expr) -> Verdict,
    negate: bool,
) -> EvalResult {
    let mut all_decided = true;
    for pair in args.windows(2) {
        match decide(&pair[0], &pair[1]) {
            Verdict::True => {}
            Verdict::False => return Ok(Expr::bool(negate)),
            Verdict::Unknown => all_decided = false,
        }
    }
    if all_decided { Ok(Expr::bool(!negate)) } else { Ok(unchanged(head, args)) }
}

fn equal(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(kw::Equal, args, decide_equal, false)
}

fn unequal(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(kw::Unequal, args, decide_equal, true)
}

fn less(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(kw::Less, args, |a, b| decide_order(a, b, &[Ordering::Less]), false)
}

fn greater(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(kw::Greater, args, |a, b| decide_order(a, b, &[Ordering::Greater]), false)
}

fn less_equal(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(
        kw::LessEqual,
        args,
        |a, b| decide_order(a, b, &[Ordering::Less, Ordering::Equal]),
        false,
    )
}

fn greater_equal(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    chain(
        kw::GreaterEqual,
        args,
        |a, b| decide_order(a, b, &[Ordering::Greater, Ordering::Equal]),
        false,
    )
}

fn same_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args.windows(2).all(|p| p[0] == p[1])))
}

fn unsame_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args.windows(2).all(|p| p[0] != p[1])))
}

/// Short-circuiting conjunction; arguments evaluate left to right.
fn and(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut rest = Vec::new();
    for arg in args {
        let v = ev.eval(arg)?;
        if v.is_false() {
            return Ok(Expr::bool(false));
        }
        if !v.is_true() {
            rest.push(v);
        }
    }
    Ok(match rest.len() {
        0 => Expr::bool(true),
        1 => rest.into_iter().next().expect("one element"),
        _ => Expr::call_sym(kw::And, rest),
    })
}

fn or(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut rest = Vec::new();
    for arg in args {
        let v = ev.eval(arg)?;
        if v.is_true() {
            return Ok(Expr::bool(true));
        }
        if !v.is_false() {
            rest.push(v);
        }
    }
    Ok(match rest.len() {
        0 => Expr::bool(false),
        1 => rest.into_iter().next().expect("one element"),
        _ => Expr::call_sym(kw::Or, rest),
    })
}

fn not(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let arg = &args[0];
    if arg.is_true() {
        return Ok(Expr::bool(false));
    }
    if arg.is_false() {
        return Ok(Expr::bool(true));
    }
    // Double negation unwraps.
    if let Some(inner) = arg.as_call_to(kw::Not) {
        if let [x] = inner.args.as_slice() {
            return Ok(x.clone());
        }
    }
    Ok(unchanged(kw::Not, args))
}

fn xor(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut parity = false;
    for arg in args {
        if arg.is_true() {
            parity = !parity;
        } else if !arg.is_false() {
            return Ok(unchanged(sym::Xor, args));
        }
    }
    Ok(Expr::bool(parity))
}

fn number_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].is_number()))
}

fn integer_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].as_int().is_some()))
}

fn even_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].as_int().is_some_and(Integer::is_even)))
}

fn odd_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].as_int().is_some_and(Integer::is_odd)))
}

fn list_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].as_call_to(kw::List).is_some()))
}

fn string_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].as_str().is_some()))
}

fn atom_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].is_atom()))
}

fn true_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::bool(args[0].is_true()))
}

fn match_q(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let pat = Pat::compile(&args[1]);
    let matcher = Matcher::new(&ev.attrs);
    Ok(Expr::bool(matcher.matches(&pat, &args[0]).is_some()))
}
