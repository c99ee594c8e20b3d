//! String builtins. Positions are 1-based and count characters, not bytes.

use super::{Arity, Reg, expect_str, type_error, unchanged};
use crate::{EvalResult, Evaluator, attr::Attrs};
use finch_expr::Expr;
use finch_interface::{kw, sym};
use num_traits::ToPrimitive;

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.builtin(sym::StringLength, Attrs::LISTABLE, Arity::Exact(1), string_length);
    reg.builtin(sym::StringJoin, Attrs::FLAT | Attrs::ONE_IDENTITY, Arity::Any, string_join);
    reg.builtin(sym::StringTake, Attrs::empty(), Arity::Exact(2), string_take);
    reg.builtin(sym::StringSplit, Attrs::empty(), Arity::Between(1, 2), string_split);
    reg.builtin(sym::ToString, Attrs::empty(), Arity::Exact(1), to_string);
    reg.builtin(sym::ToUpperCase, Attrs::empty(), Arity::Exact(1), to_upper);
    reg.builtin(sym::ToLowerCase, Attrs::empty(), Arity::Exact(1), to_lower);
    reg.builtin(sym::Characters, Attrs::empty(), Arity::Exact(1), characters);
    reg.builtin(sym::StringContainsQ, Attrs::empty(), Arity::Exact(2), string_contains_q);
}

fn string_length(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_str() {
        Some(s) => Ok(Expr::int(s.chars().count() as i64)),
        None => Ok(unchanged(sym::StringLength, args)),
    }
}

/// Joins strings; list arguments contribute their string elements.
fn string_join(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut out = String::new();
    for arg in args {
        match arg.as_call_to(kw::List) {
            Some(list) => {
                for item in &list.args {
                    out.push_str(expect_str(item, "StringJoin element")?);
                }
            }
            None => out.push_str(expect_str(arg, "StringJoin argument")?),
        }
    }
    Ok(Expr::string(out))
}

fn string_take(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let s = expect_str(&args[0], "StringTake subject")?;
    let n = args[1]
        .as_int()
        .and_then(|i| i.to_i64())
        .ok_or_else(|| type_error(format!("`{}` is not a valid count", args[1])))?;
    let chars: Vec<char> = s.chars().collect();
    let taken: String = if n < 0 {
        let keep = chars.len().saturating_sub(n.unsigned_abs() as usize);
        chars[keep..].iter().collect()
    } else {
        chars.iter().take(n as usize).collect()
    };
    Ok(Expr::string(taken))
}

fn string_split(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let s = expect_str(&args[0], "StringSplit subject")?;
    let pieces: Vec<Expr> = match args.get(1) {
        Some(sep) => {
            let sep = expect_str(sep, "StringSplit separator")?;
            s.split(sep).filter(|p| !p.is_empty()).map(Expr::string).collect()
        }
        None => s.split_whitespace().map(Expr::string).collect(),
    };
    Ok(Expr::list(pieces))
}

/// The printed form; strings pass through unchanged.
fn to_string(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_str() {
        Some(_) => Ok(args[0].clone()),
        None => Ok(Expr::string(args[0].to_string())),
    }
}

fn to_upper(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_str() {
        Some(s) => Ok(Expr::string(s.to_uppercase())),
        None => Ok(unchanged(sym::ToUpperCase, args)),
    }
}

fn to_lower(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_str() {
        Some(s) => Ok(Expr::string(s.to_lowercase())),
        None => Ok(unchanged(sym::ToLowerCase, args)),
    }
}

fn characters(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].as_str() {
        Some(s) => Ok(Expr::list(s.chars().map(|c| Expr::string(c.to_string())).collect())),
        None => Ok(unchanged(sym::Characters, args)),
    }
}

fn string_contains_q(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let s = expect_str(&args[0], "StringContainsQ subject")?;
    let needle = expect_str(&args[1], "StringContainsQ needle")?;
    Ok(Expr::bool(s.contains(needle)))
}
