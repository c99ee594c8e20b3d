//! Assignment, scoping, control flow, and attribute manipulation.

use super::{Arity, Reg, argument_error, expect_symbol, type_error, unchanged};
use crate::{EvalResult, Evaluator, attr::Attrs, subst};
use finch_expr::{ErrorKind, ErrorValue, Expr, ExprKind};
use finch_interface::{Symbol, kw, map::FxHashMap, sym};

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.builtin(kw::Set, Attrs::HOLD_FIRST, Arity::Exact(2), set);
    reg.builtin(kw::SetDelayed, Attrs::HOLD_ALL, Arity::Exact(2), set_delayed);
    reg.builtin(kw::Unset, Attrs::HOLD_ALL, Arity::Exact(1), unset);
    reg.builtin(sym::Clear, Attrs::HOLD_ALL, Arity::Any, clear);
    reg.builtin(sym::Block, Attrs::HOLD_ALL, Arity::Exact(2), block);
    reg.builtin(sym::With, Attrs::HOLD_ALL, Arity::Exact(2), with);
    reg.builtin(kw::Evaluate, Attrs::empty(), Arity::Exact(1), evaluate);
    reg.builtin(kw::CompoundExpression, Attrs::HOLD_ALL, Arity::Any, compound_expression);
    reg.builtin(sym::If, Attrs::HOLD_REST, Arity::Between(2, 3), if_);
    reg.builtin(sym::Which, Attrs::HOLD_ALL, Arity::Any, which);
    reg.builtin(sym::Do, Attrs::HOLD_ALL, Arity::Exact(2), do_);
    reg.builtin(sym::While, Attrs::HOLD_ALL, Arity::Between(1, 2), while_);
    reg.builtin(sym::For, Attrs::HOLD_ALL, Arity::Exact(4), for_);
    reg.builtin(sym::Assert, Attrs::HOLD_ALL, Arity::Exact(1), assert);
    reg.builtin(sym::Attributes, Attrs::HOLD_ALL, Arity::Exact(1), attributes);
    reg.builtin(sym::SetAttributes, Attrs::HOLD_ALL, Arity::Exact(2), set_attributes);
    reg.builtin(sym::ClearAttributes, Attrs::HOLD_ALL, Arity::Exact(2), clear_attributes);
    reg.builtin(sym::Protect, Attrs::HOLD_ALL, Arity::Any, protect);
    reg.builtin(sym::Unprotect, Attrs::HOLD_ALL, Arity::Any, unprotect);
    reg.builtin(sym::Print, Attrs::empty(), Arity::Any, print);
    reg.builtin(sym::FullForm, Attrs::empty(), Arity::Exact(1), full_form);
}

/// `Set(sym, rhs)` binds; `Set(f(pattern), rhs)` registers a rule with the
/// already-evaluated right-hand side.
fn set(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (lhs, rhs) = (&args[0], &args[1]);
    match lhs.kind() {
        ExprKind::Symbol(s) => {
            ev.bind_symbol(*s, rhs.clone())?;
            Ok(rhs.clone())
        }
        ExprKind::Call(_) => {
            ev.define_rule(lhs.clone(), rhs.clone())?;
            Ok(rhs.clone())
        }
        _ => Err(ErrorValue::new(
            ErrorKind::Binding,
            format!("cannot assign to `{lhs}`"),
        )),
    }
}

/// `SetDelayed` holds both sides: compound left-hand sides register rewrite
/// rules, symbols bind without evaluating the right-hand side.
fn set_delayed(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (lhs, rhs) = (&args[0], &args[1]);
    match lhs.kind() {
        ExprKind::Symbol(s) => {
            ev.bind_symbol(*s, rhs.clone())?;
            Ok(Expr::null())
        }
        ExprKind::Call(_) => {
            ev.define_rule(lhs.clone(), rhs.clone())?;
            Ok(Expr::null())
        }
        _ => Err(ErrorValue::new(
            ErrorKind::Definition,
            format!("cannot define a rule for `{lhs}`"),
        )),
    }
}

fn unset(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let sym = args[0].as_symbol().ok_or_else(|| {
        ErrorValue::new(ErrorKind::Binding, format!("cannot unset `{}`", args[0]))
    })?;
    ev.check_writable(sym)?;
    ev.scopes.unset(sym);
    Ok(Expr::null())
}

fn clear(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    for arg in args {
        let sym = expect_symbol(arg, "Clear argument")?;
        ev.check_writable(sym)?;
        ev.scopes.unset(sym);
        ev.rules.clear_user_rules(sym);
    }
    Ok(Expr::null())
}

/// Parses a scoping specification: a held `[x, y = 1]` / `{x = 1}` form.
fn scope_vars(
    ev: &mut Evaluator<'_>,
    spec: &Expr,
) -> Result<Vec<(Symbol, Option<Expr>)>, ErrorValue> {
    let entries = spec
        .as_call()
        .filter(|c| {
            matches!(c.head_symbol(), Some(s) if s == kw::List || s == kw::Association)
        })
        .map(|c| c.args.as_slice())
        .ok_or_else(|| {
            type_error(format!("scoping specification must be a list, got `{spec}`"))
        })?;
    let mut vars = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(s) = entry.as_symbol() {
            vars.push((s, None));
            continue;
        }
        let assign = entry
            .as_call()
            .filter(|c| {
                matches!(c.head_symbol(), Some(s) if s == kw::Set || s == kw::Rule)
            })
            .ok_or_else(|| {
                type_error(format!("scoping entry must be a symbol or `x = value`, got `{entry}`"))
            })?;
        let [lhs, rhs] = assign.args.as_slice() else {
            return Err(argument_error(format!("malformed scoping entry `{entry}`")));
        };
        let sym = expect_symbol(lhs, "scoped variable")?;
        let value = ev.eval(rhs)?;
        vars.push((sym, Some(value)));
    }
    Ok(vars)
}

/// `Block(vars, body)`: dynamic scoping. The shadowed bindings are restored
/// on every exit path, including errors.
fn block(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let vars = scope_vars(ev, &args[0])?;
    ev.scopes.push_frame(vars);
    let result = ev.eval(&args[1]);
    ev.scopes.pop_frame();
    result
}

/// `With(vars, body)`: purely lexical substitution into the body.
fn with(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut map = FxHashMap::default();
    for (sym, value) in scope_vars(ev, &args[0])? {
        let value = value.ok_or_else(|| {
            argument_error(format!("`With` requires `{sym} = value` entries"))
        })?;
        map.insert(sym, value);
    }
    let body = subst::symbols(&args[1], &map);
    ev.eval(&body)
}

fn evaluate(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(args[0].clone())
}

/// Statements evaluate left to right; the first error aborts the rest; the
/// value is the last statement's.
fn compound_expression(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut last = Expr::null();
    for arg in args {
        last = ev.eval(arg)?;
    }
    Ok(last)
}

fn if_(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let cond = &args[0];
    if cond.is_true() {
        return ev.eval(&args[1]);
    }
    if cond.is_false() {
        return match args.get(2) {
            Some(else_) => ev.eval(else_),
            None => Ok(Expr::null()),
        };
    }
    Ok(unchanged(sym::If, args))
}

fn which(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    if args.len() % 2 != 0 {
        return Err(argument_error("Which expects condition/value pairs"));
    }
    for pair in args.chunks(2) {
        let cond = ev.eval(&pair[0])?;
        if cond.is_true() {
            return ev.eval(&pair[1]);
        }
        if !cond.is_false() {
            return Ok(unchanged(sym::Which, args));
        }
    }
    Ok(Expr::null())
}

fn do_(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let count = ev.eval(&args[1])?;
    let n = super::expect_usize(&count, "Do count")?;
    for _ in 0..n {
        ev.eval(&args[0])?;
    }
    Ok(Expr::null())
}

fn while_(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    loop {
        let cond = ev.eval(&args[0])?;
        if !cond.is_true() {
            return Ok(Expr::null());
        }
        if let Some(body) = args.get(1) {
            ev.eval(body)?;
        }
    }
}

fn for_(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    ev.eval(&args[0])?;
    loop {
        let cond = ev.eval(&args[1])?;
        if !cond.is_true() {
            return Ok(Expr::null());
        }
        ev.eval(&args[3])?;
        ev.eval(&args[2])?;
    }
}

/// A failed assertion aborts the surrounding computation.
fn assert(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let value = ev.eval(&args[0])?;
    if value.is_true() {
        return Ok(Expr::null());
    }
    Err(ErrorValue::new(
        ErrorKind::AssertionFailed,
        format!("assertion `{}` evaluated to `{value}`", args[0]),
    )
    .with_expr(args[0].clone()))
}

fn attributes(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let sym = expect_symbol(&args[0], "Attributes argument")?;
    let syms = ev.attrs.get(sym).symbols();
    Ok(Expr::list(syms.into_iter().map(Expr::symbol).collect()))
}

fn attr_targets(spec: &Expr) -> Result<Vec<Symbol>, ErrorValue> {
    match spec.as_call_to(kw::List) {
        Some(list) => list.args.iter().map(|e| expect_symbol(e, "symbol")).collect(),
        None => Ok(vec![expect_symbol(spec, "symbol")?]),
    }
}

fn attr_set(spec: &Expr) -> Result<Attrs, ErrorValue> {
    let one = |e: &Expr| {
        let sym = expect_symbol(e, "attribute")?;
        Attrs::from_symbol(sym)
            .ok_or_else(|| argument_error(format!("`{sym}` is not an attribute")))
    };
    match spec.as_call_to(kw::List) {
        Some(list) => {
            let mut attrs = Attrs::empty();
            for e in &list.args {
                attrs |= one(e)?;
            }
            Ok(attrs)
        }
        None => one(spec),
    }
}

fn check_unlocked(ev: &Evaluator<'_>, sym: Symbol) -> Result<(), ErrorValue> {
    if ev.attrs.has(sym, Attrs::LOCKED) {
        return Err(ErrorValue::new(
            ErrorKind::Protected,
            format!("attributes of `{sym}` are locked"),
        ));
    }
    Ok(())
}

fn set_attributes(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let attrs = attr_set(&args[1])?;
    for sym in attr_targets(&args[0])? {
        check_unlocked(ev, sym)?;
        ev.attrs.set(sym, attrs);
    }
    Ok(Expr::null())
}

fn clear_attributes(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let attrs = attr_set(&args[1])?;
    for sym in attr_targets(&args[0])? {
        check_unlocked(ev, sym)?;
        ev.attrs.clear(sym, attrs);
    }
    Ok(Expr::null())
}

fn protect(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    for arg in args {
        let sym = expect_symbol(arg, "Protect argument")?;
        check_unlocked(ev, sym)?;
        ev.attrs.set(sym, Attrs::PROTECTED);
    }
    Ok(Expr::null())
}

fn unprotect(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    for arg in args {
        let sym = expect_symbol(arg, "Unprotect argument")?;
        check_unlocked(ev, sym)?;
        ev.attrs.clear(sym, Attrs::PROTECTED);
    }
    Ok(Expr::null())
}

/// Prints the arguments on one line; strings print without quotes.
fn print(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let line: String = args
        .iter()
        .map(|a| match a.as_str() {
            Some(s) => s.to_string(),
            None => a.to_string(),
        })
        .collect();
    println!("{line}");
    Ok(Expr::null())
}

fn full_form(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::string(args[0].to_string()))
}
