//! Association and byte-array builtins.

use super::{Arity, Reg, type_error, unchanged};
use crate::{EvalResult, Evaluator, attr::Attrs};
use finch_expr::{Assoc, Expr, ExprKind};
use finch_interface::{kw, sym};
use num_traits::ToPrimitive;

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.builtin(kw::Association, Attrs::empty(), Arity::Any, association);
    reg.builtin(sym::Keys, Attrs::empty(), Arity::Exact(1), keys);
    reg.builtin(sym::Values, Attrs::empty(), Arity::Exact(1), values);
    reg.builtin(sym::KeyQ, Attrs::empty(), Arity::Exact(2), key_q);
    reg.builtin(sym::Lookup, Attrs::empty(), Arity::Between(2, 3), lookup);
    reg.builtin(sym::KeyDrop, Attrs::empty(), Arity::Exact(2), key_drop);
    reg.builtin(sym::AssociationMap, Attrs::empty(), Arity::Exact(2), association_map);
    reg.builtin(sym::Normal, Attrs::empty(), Arity::Exact(1), normal);
    reg.builtin(kw::ByteArray, Attrs::empty(), Arity::Exact(1), byte_array);
}

/// `Association(Rule(k, v), ...)` collects pairs; association arguments
/// merge; later writes win.
fn association(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut out = Assoc::new();
    for arg in args {
        if let Some(a) = arg.as_assoc() {
            for (k, v) in a.iter() {
                out.insert(k.clone(), v.clone());
            }
            continue;
        }
        let rule = arg
            .as_call()
            .filter(|c| {
                matches!(c.head_symbol(), Some(s) if s == kw::Rule || s == kw::RuleDelayed)
            })
            .ok_or_else(|| {
                type_error(format!("association entries must be rules, got `{arg}`"))
            })?;
        let [k, v] = rule.args.as_slice() else {
            return Err(type_error(format!("association entries must be binary, got `{arg}`")));
        };
        out.insert(k.clone(), v.clone());
    }
    Ok(Expr::assoc(out))
}

fn keys(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_assoc() {
        Some(a) => Ok(Expr::list(a.keys().cloned().collect())),
        None => Ok(unchanged(sym::Keys, args)),
    }
}

fn values(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_assoc() {
        Some(a) => Ok(Expr::list(a.values().cloned().collect())),
        None => Ok(unchanged(sym::Values, args)),
    }
}

fn key_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_assoc() {
        Some(a) => Ok(Expr::bool(a.contains_key(&args[1]))),
        None => Ok(Expr::bool(false)),
    }
}

/// `Lookup(a, key)` yields `Null` for missing keys; `Lookup(a, key, d)`
/// yields the default.
fn lookup(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let Some(a) = args[0].as_assoc() else { return Ok(unchanged(sym::Lookup, args)) };
    Ok(match a.get(&args[1]) {
        Some(v) => v.clone(),
        None => args.get(2).cloned().unwrap_or_else(Expr::null),
    })
}

fn key_drop(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let Some(a) = args[0].as_assoc() else { return Ok(unchanged(sym::KeyDrop, args)) };
    let mut out = a.clone();
    out.remove(&args[1]);
    Ok(Expr::assoc(out))
}

/// Applies `f` to each `Rule(k, v)` entry; `f` must yield a rule, which
/// becomes the new entry.
fn association_map(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (f, subject) = (&args[0], &args[1]);
    let Some(a) = subject.as_assoc() else { return Ok(unchanged(sym::AssociationMap, args)) };
    let mut out = Assoc::new();
    for (k, v) in a.iter() {
        let entry = Expr::call_sym(kw::Rule, vec![k.clone(), v.clone()]);
        let mapped = ev.eval(&Expr::call(f.clone(), vec![entry]))?;
        let rule = mapped
            .as_call_to(kw::Rule)
            .filter(|c| c.args.len() == 2)
            .ok_or_else(|| {
                type_error(format!("AssociationMap function must return a rule, got `{mapped}`"))
            })?;
        out.insert(rule.args[0].clone(), rule.args[1].clone());
    }
    Ok(Expr::assoc(out))
}

/// `Normal` exposes the entry list of an association or the integer list of
/// a byte array.
fn normal(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].kind() {
        ExprKind::Assoc(a) => Ok(Expr::list(
            a.iter()
                .map(|(k, v)| Expr::call_sym(kw::Rule, vec![k.clone(), v.clone()]))
                .collect(),
        )),
        ExprKind::Bytes(b) => {
            Ok(Expr::list(b.iter().map(|&byte| Expr::int(byte as i64)).collect()))
        }
        _ => Ok(unchanged(sym::Normal, args)),
    }
}

/// `ByteArray([b, ...])` packs a list of integers in `0..=255`.
fn byte_array(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let Some(list) = args[0].as_call_to(kw::List) else {
        return Ok(unchanged(kw::ByteArray, args));
    };
    let mut bytes = Vec::with_capacity(list.args.len());
    for item in &list.args {
        let byte = item
            .as_int()
            .and_then(|i| i.to_u8())
            .ok_or_else(|| type_error(format!("`{item}` is not a byte (0..=255)")))?;
        bytes.push(byte);
    }
    Ok(Expr::bytes(bytes))
}
