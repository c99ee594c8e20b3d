//! Higher-order builtins and rule application.

use super::{Arity, Reg, argument_error, expect_symbol, type_error, unchanged};
use crate::{
    EvalResult, Evaluator,
    attr::{AttrTable, Attrs},
    pattern::{Matcher, Pat},
    subst,
};
use finch_expr::{ErrorValue, Expr, ExprKind, FuncValue};
use finch_interface::{Symbol, kw, sym};

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.builtin(kw::Function, Attrs::HOLD_ALL, Arity::Between(1, 2), function);
    reg.builtin(sym::Identity, Attrs::empty(), Arity::Exact(1), identity);
    reg.builtin(sym::Composition, Attrs::FLAT | Attrs::ONE_IDENTITY, Arity::Any, composition);
    reg.builtin(sym::Map, Attrs::empty(), Arity::Exact(2), map);
    reg.builtin(sym::Apply, Attrs::empty(), Arity::Exact(2), apply);
    reg.builtin(sym::Select, Attrs::empty(), Arity::Exact(2), select);
    reg.builtin(sym::Fold, Attrs::empty(), Arity::Exact(3), fold);
    reg.builtin(sym::FoldList, Attrs::empty(), Arity::Exact(3), fold_list);
    reg.builtin(sym::Nest, Attrs::empty(), Arity::Exact(3), nest);
    reg.builtin(sym::NestList, Attrs::empty(), Arity::Exact(3), nest_list);
    reg.inert(kw::Rule, Attrs::empty());
    reg.inert(kw::RuleDelayed, Attrs::HOLD_REST);
    reg.builtin(sym::Replace, Attrs::empty(), Arity::Exact(2), replace);
    reg.builtin(sym::ReplaceAll, Attrs::empty(), Arity::Exact(2), replace);
}

/// `Function(body)` is slot-based; `Function(x, body)` and
/// `Function([x, y], body)` rewrite named parameters.
fn function(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args {
        [body] => Ok(Expr::func(FuncValue::slots(body.clone()))),
        [params, body] => {
            let params = if let Some(sym) = params.as_symbol() {
                vec![sym]
            } else if let Some(list) = params.as_call_to(kw::List) {
                list.args
                    .iter()
                    .map(|p| expect_symbol(p, "function parameter"))
                    .collect::<Result<_, _>>()?
            } else {
                return Err(type_error(format!(
                    "function parameters must be a symbol or a list of symbols, got `{params}`"
                )));
            };
            Ok(Expr::func(FuncValue::named(params, body.clone())))
        }
        _ => unreachable!("arity"),
    }
}

fn identity(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(args[0].clone())
}

/// `Composition(f, g)` builds the slot function `f(g($1))`.
fn composition(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let slot = Expr::symbol(Symbol::intern("$1"));
    let body = args.iter().rev().fold(slot, |acc, f| Expr::call(f.clone(), vec![acc]));
    Ok(Expr::func(FuncValue::slots(body)))
}

fn map(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (f, subject) = (&args[0], &args[1]);
    match subject.kind() {
        ExprKind::Call(c) => {
            let mut out = Vec::with_capacity(c.args.len());
            for item in &c.args {
                out.push(ev.eval(&Expr::call(f.clone(), vec![item.clone()]))?);
            }
            Ok(Expr::call(c.head.clone(), out))
        }
        ExprKind::Assoc(a) => {
            let mut pairs = Vec::with_capacity(a.len());
            for (k, v) in a.iter() {
                let mapped = ev.eval(&Expr::call(f.clone(), vec![v.clone()]))?;
                pairs.push((k.clone(), mapped));
            }
            Ok(Expr::assoc(finch_expr::Assoc::from_pairs(pairs)))
        }
        _ => Ok(unchanged(sym::Map, args)),
    }
}

/// `Apply(f, H(a, ...))` is `f(a, ...)`.
fn apply(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (f, subject) = (&args[0], &args[1]);
    match subject.as_call() {
        Some(c) => Ok(Expr::call(f.clone(), c.args.clone())),
        None => Ok(unchanged(sym::Apply, args)),
    }
}

fn select(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (subject, pred) = (&args[0], &args[1]);
    let Some(c) = subject.as_call() else { return Ok(unchanged(sym::Select, args)) };
    let mut out = Vec::new();
    for item in &c.args {
        if ev.eval(&Expr::call(pred.clone(), vec![item.clone()]))?.is_true() {
            out.push(item.clone());
        }
    }
    Ok(Expr::call(c.head.clone(), out))
}

fn fold_impl(
    ev: &mut Evaluator<'_>,
    args: &[Expr],
    collect: bool,
) -> EvalResult {
    let (f, init, list) = (&args[0], &args[1], &args[2]);
    let items = super::expect_list(list, "fold subject")?;
    let mut acc = init.clone();
    let mut trail = vec![acc.clone()];
    for item in items {
        acc = ev.eval(&Expr::call(f.clone(), vec![acc, item.clone()]))?;
        trail.push(acc.clone());
    }
    Ok(if collect { Expr::list(trail) } else { acc })
}

fn fold(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    fold_impl(ev, args, false)
}

fn fold_list(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    fold_impl(ev, args, true)
}

fn nest_impl(ev: &mut Evaluator<'_>, args: &[Expr], collect: bool) -> EvalResult {
    let (f, x, n) = (&args[0], &args[1], &args[2]);
    let n = super::expect_usize(n, "nesting count")?;
    let mut acc = x.clone();
    let mut trail = vec![acc.clone()];
    for _ in 0..n {
        acc = ev.eval(&Expr::call(f.clone(), vec![acc]))?;
        trail.push(acc.clone());
    }
    Ok(if collect { Expr::list(trail) } else { acc })
}

fn nest(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    nest_impl(ev, args, false)
}

fn nest_list(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    nest_impl(ev, args, true)
}

/// A compiled rule set for `Replace`/`ReplaceAll`: `Rule`/`RuleDelayed`, or
/// a list of them.
fn compile_rules(spec: &Expr) -> Result<Vec<(Pat, Expr)>, ErrorValue> {
    let one = |e: &Expr| -> Result<(Pat, Expr), ErrorValue> {
        let call = e
            .as_call()
            .filter(|c| {
                matches!(c.head_symbol(), Some(s) if s == kw::Rule || s == kw::RuleDelayed)
            })
            .ok_or_else(|| type_error(format!("`{e}` is not a rule")))?;
        let [lhs, rhs] = call.args.as_slice() else {
            return Err(argument_error(format!("`{e}` is not a binary rule")));
        };
        Ok((Pat::compile(lhs), rhs.clone()))
    };
    match spec.as_call_to(kw::List) {
        Some(list) => list.args.iter().map(one).collect(),
        None => Ok(vec![one(spec)?]),
    }
}

/// Top-down replacement: the first matching rule rewrites a node and the
/// walk does not descend into the replacement.
fn replace_walk(attrs: &AttrTable, e: &Expr, rules: &[(Pat, Expr)]) -> Expr {
    let matcher = Matcher::new(attrs);
    for (pat, rhs) in rules {
        if let Some(env) = matcher.matches(pat, e) {
            return subst::bindings(rhs, &env);
        }
    }
    if let Some(c) = e.as_call() {
        let head = replace_walk(attrs, &c.head, rules);
        let args = c.args.iter().map(|a| replace_walk(attrs, a, rules)).collect();
        return Expr::call(head, args);
    }
    e.clone()
}

fn replace(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let rules = compile_rules(&args[1])?;
    Ok(replace_walk(&ev.attrs, &args[0], &rules))
}
