//! Structural builtins: parts, slices, and list surgery.
//!
//! Indices are 1-based; negative indices count from the end; in `Part`,
//! index 0 is the head. Slices are inclusive on both ends and clamp to the
//! subject, so `xs[2:100]` on a three-element list yields the tail rather
//! than an error; a genuinely absent position (as in `Part`) is a
//! `PartError`.

use super::{Arity, Reg, argument_error, expect_symbol, part_error, type_error};
use crate::{
    EvalResult, Evaluator,
    attr::Attrs,
    pattern::{Matcher, Pat},
};
use finch_expr::{Call, ErrorKind, ErrorValue, Expr, ExprKind, Num, canonical_sort};
use finch_interface::{Symbol, kw, sym};
use num_traits::ToPrimitive;
use std::cmp::Ordering;

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    reg.inert(kw::List, Attrs::empty());
    reg.builtin(sym::Head, Attrs::empty(), Arity::Exact(1), head);
    reg.builtin(sym::Length, Attrs::empty(), Arity::Exact(1), length);
    reg.builtin(sym::First, Attrs::empty(), Arity::Exact(1), first);
    reg.builtin(sym::Last, Attrs::empty(), Arity::Exact(1), last);
    reg.builtin(sym::Rest, Attrs::empty(), Arity::Exact(1), rest);
    reg.builtin(sym::Most, Attrs::empty(), Arity::Exact(1), most);
    reg.builtin(kw::Part, Attrs::empty(), Arity::AtLeast(1), part);
    reg.builtin(kw::SliceRange, Attrs::empty(), Arity::Exact(3), slice_range);
    reg.builtin(kw::TakeFrom, Attrs::empty(), Arity::Exact(2), take_from);
    reg.builtin(kw::Take, Attrs::empty(), Arity::Exact(2), take);
    reg.builtin(sym::Drop, Attrs::empty(), Arity::Exact(2), drop_);
    reg.builtin(kw::PartSet, Attrs::HOLD_FIRST, Arity::AtLeast(2), part_set);
    reg.builtin(kw::SliceSet, Attrs::HOLD_FIRST, Arity::Exact(4), slice_set);
    reg.builtin(sym::Append, Attrs::empty(), Arity::Exact(2), append);
    reg.builtin(sym::Prepend, Attrs::empty(), Arity::Exact(2), prepend);
    reg.builtin(sym::Join, Attrs::FLAT | Attrs::ONE_IDENTITY, Arity::Any, join);
    reg.builtin(sym::Reverse, Attrs::empty(), Arity::Exact(1), reverse);
    reg.builtin(sym::Range, Attrs::LISTABLE, Arity::Between(1, 3), range);
    reg.builtin(sym::Table, Attrs::HOLD_ALL, Arity::Exact(2), table);
    reg.builtin(sym::Flatten, Attrs::empty(), Arity::Exact(1), flatten);
    reg.builtin(sym::Sort, Attrs::empty(), Arity::Exact(1), sort);
    reg.builtin(sym::Union, Attrs::empty(), Arity::Any, union);
    reg.builtin(sym::Position, Attrs::empty(), Arity::Exact(2), position);
    reg.builtin(sym::Count, Attrs::empty(), Arity::Exact(2), count);
    reg.builtin(sym::MemberQ, Attrs::empty(), Arity::Exact(2), member_q);
    reg.builtin(sym::Cases, Attrs::empty(), Arity::Exact(2), cases);
    reg.builtin(sym::DeleteCases, Attrs::empty(), Arity::Exact(2), delete_cases);
}

fn head(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(args[0].head())
}

fn length(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let len = match args[0].kind() {
        ExprKind::Call(c) => c.args.len(),
        ExprKind::Assoc(a) => a.len(),
        ExprKind::Bytes(b) => b.len(),
        _ => 0,
    };
    Ok(Expr::int(len as i64))
}

/// The argument list of a compound subject, or a `PartError` for atoms.
fn parts<'e>(e: &'e Expr, what: &str) -> Result<&'e Call, ErrorValue> {
    e.as_call().ok_or_else(|| part_error(format!("{what}: `{e}` has no parts")))
}

fn first(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    if let Some(a) = args[0].as_assoc() {
        return a.values().next().cloned().ok_or_else(|| part_error("First: empty association"));
    }
    let call = parts(&args[0], "First")?;
    call.args.first().cloned().ok_or_else(|| part_error("First: empty argument list"))
}

fn last(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    if let Some(a) = args[0].as_assoc() {
        return a.values().last().cloned().ok_or_else(|| part_error("Last: empty association"));
    }
    let call = parts(&args[0], "Last")?;
    call.args.last().cloned().ok_or_else(|| part_error("Last: empty argument list"))
}

fn rest(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Rest")?;
    if call.args.is_empty() {
        return Err(part_error("Rest: empty argument list"));
    }
    Ok(Expr::call(call.head.clone(), call.args[1..].to_vec()))
}

fn most(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Most")?;
    if call.args.is_empty() {
        return Err(part_error("Most: empty argument list"));
    }
    Ok(Expr::call(call.head.clone(), call.args[..call.args.len() - 1].to_vec()))
}

/// Resolves a 1-based, possibly negative index into `len` positions.
fn resolve_index(i: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if i < 0 { len + i + 1 } else { i };
    (1..=len).contains(&idx).then(|| (idx - 1) as usize)
}

fn index_of(e: &Expr) -> Result<i64, ErrorValue> {
    e.as_int()
        .and_then(|i| i.to_i64())
        .ok_or_else(|| part_error(format!("`{e}` is not a valid part index")))
}

fn part(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut cur = args[0].clone();
    for idx in &args[1..] {
        cur = part_once(&cur, idx)?;
    }
    Ok(cur)
}

fn part_once(e: &Expr, idx: &Expr) -> EvalResult {
    if let Some(a) = e.as_assoc() {
        return a
            .get(idx)
            .cloned()
            .ok_or_else(|| part_error(format!("key `{idx}` is not present")));
    }
    let call = parts(e, "Part")?;
    let i = index_of(idx)?;
    if i == 0 {
        return Ok(call.head.clone());
    }
    let at = resolve_index(i, call.args.len())
        .ok_or_else(|| part_error(format!("part {i} of `{e}` does not exist")))?;
    Ok(call.args[at].clone())
}

/// Clamped inclusive bounds of a slice over `len` elements; `None` bounds
/// come from the open slice forms.
fn slice_bounds(a: Option<i64>, b: Option<i64>, len: usize) -> (usize, usize) {
    let n = len as i64;
    let norm = |i: i64| if i < 0 { n + i + 1 } else { i };
    let lo = a.map_or(1, norm).max(1);
    let hi = b.map_or(n, norm).min(n);
    if lo > hi { (0, 0) } else { ((lo - 1) as usize, hi as usize) }
}

fn slice(e: &Expr, a: Option<i64>, b: Option<i64>, what: &str) -> EvalResult {
    if let Some(s) = e.as_str() {
        let chars: Vec<char> = s.chars().collect();
        let (lo, hi) = slice_bounds(a, b, chars.len());
        return Ok(Expr::string(chars[lo..hi].iter().collect::<String>()));
    }
    let call = parts(e, what)?;
    let (lo, hi) = slice_bounds(a, b, call.args.len());
    Ok(Expr::call(call.head.clone(), call.args[lo..hi].to_vec()))
}

fn slice_range(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (a, b) = (index_of(&args[1])?, index_of(&args[2])?);
    slice(&args[0], Some(a), Some(b), "SliceRange")
}

fn take_from(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    slice(&args[0], Some(index_of(&args[1])?), None, "TakeFrom")
}

fn take(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let n = index_of(&args[1])?;
    if n < 0 {
        // Take(e, -n) keeps the last n elements.
        return slice(&args[0], Some(n), None, "Take");
    }
    slice(&args[0], None, Some(n), "Take")
}

fn drop_(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let n = index_of(&args[1])?;
    if n < 0 {
        // Drop(e, -n) removes the last n elements.
        return slice(&args[0], None, Some(n - 1), "Drop");
    }
    slice(&args[0], Some(n + 1), None, "Drop")
}

fn assignment_target(e: &Expr) -> Result<Symbol, ErrorValue> {
    expect_symbol(e, "assignment target").map_err(|_| {
        ErrorValue::new(
            ErrorKind::Binding,
            format!("cannot assign into `{e}`: not a bound symbol"),
        )
    })
}

fn part_set(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let target = assignment_target(&args[0])?;
    let (indices, value) = args[1..].split_at(args.len() - 2);
    let value = value[0].clone();
    let current = ev
        .scopes
        .get(target)
        .ok_or_else(|| {
            ErrorValue::new(ErrorKind::Binding, format!("symbol `{target}` has no value"))
        })?;
    let updated = part_set_rec(&current, indices, &value)?;
    ev.bind_symbol(target, updated)?;
    Ok(value)
}

fn part_set_rec(e: &Expr, indices: &[Expr], value: &Expr) -> EvalResult {
    let Some((idx, rest)) = indices.split_first() else {
        return Ok(value.clone());
    };
    if let Some(a) = e.as_assoc() {
        let mut a = a.clone();
        let inner = match (rest.is_empty(), a.get(idx)) {
            (true, _) => value.clone(),
            (false, Some(cur)) => part_set_rec(cur, rest, value)?,
            (false, None) => return Err(part_error(format!("key `{idx}` is not present"))),
        };
        a.insert(idx.clone(), inner);
        return Ok(Expr::assoc(a));
    }
    let call = parts(e, "PartSet")?;
    let i = index_of(idx)?;
    let at = resolve_index(i, call.args.len())
        .ok_or_else(|| part_error(format!("part {i} of `{e}` does not exist")))?;
    let mut new_args = call.args.clone();
    new_args[at] = part_set_rec(&new_args[at], rest, value)?;
    Ok(Expr::call(call.head.clone(), new_args))
}

fn slice_set(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let target = assignment_target(&args[0])?;
    let a = if args[1].is_null() { None } else { Some(index_of(&args[1])?) };
    let b = if args[2].is_null() { None } else { Some(index_of(&args[2])?) };
    let value = args[3].clone();
    let current = ev
        .scopes
        .get(target)
        .ok_or_else(|| {
            ErrorValue::new(ErrorKind::Binding, format!("symbol `{target}` has no value"))
        })?;
    let call = parts(&current, "SliceSet")?;
    let (lo, hi) = slice_bounds(a, b, call.args.len());
    let mut new_args = Vec::with_capacity(call.args.len());
    new_args.extend_from_slice(&call.args[..lo]);
    match value.as_call_to(kw::List) {
        Some(list) => new_args.extend(list.args.iter().cloned()),
        None => new_args.push(value.clone()),
    }
    new_args.extend_from_slice(&call.args[hi..]);
    ev.bind_symbol(target, Expr::call(call.head.clone(), new_args))?;
    Ok(value)
}

fn append(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Append")?;
    let mut new_args = call.args.clone();
    new_args.push(args[1].clone());
    Ok(Expr::call(call.head.clone(), new_args))
}

fn prepend(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Prepend")?;
    let mut new_args = Vec::with_capacity(call.args.len() + 1);
    new_args.push(args[1].clone());
    new_args.extend(call.args.iter().cloned());
    Ok(Expr::call(call.head.clone(), new_args))
}

fn join(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let Some(first) = args.first() else { return Ok(Expr::list(Vec::new())) };
    let head = first.head();
    let mut out = Vec::new();
    for arg in args {
        let call = parts(arg, "Join")?;
        if call.head != head {
            return Err(type_error(format!(
                "Join: mixed heads `{head}` and `{}`",
                call.head
            )));
        }
        out.extend(call.args.iter().cloned());
    }
    Ok(Expr::call(head, out))
}

fn reverse(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Reverse")?;
    let mut new_args = call.args.clone();
    new_args.reverse();
    Ok(Expr::call(call.head.clone(), new_args))
}

fn range(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (start, end, step) = match args {
        [n] => (Num::Int(1.into()), num_arg(n)?, Num::Int(1.into())),
        [a, b] => (num_arg(a)?, num_arg(b)?, Num::Int(1.into())),
        [a, b, s] => (num_arg(a)?, num_arg(b)?, num_arg(s)?),
        _ => unreachable!("arity"),
    };
    iterate(&start, &end, &step).map(Expr::list)
}

fn num_arg(e: &Expr) -> Result<Num, ErrorValue> {
    Num::from_expr(e).ok_or_else(|| type_error(format!("`{e}` is not a number")))
}

/// The iterator values `start`, `start + step`, ... while within `end`.
fn iterate(start: &Num, end: &Num, step: &Num) -> Result<Vec<Expr>, ErrorValue> {
    if step.is_zero() {
        return Err(argument_error("iterator step must be non-zero"));
    }
    let forward = !step.is_negative();
    let mut out = Vec::new();
    let mut cur = start.clone();
    loop {
        let ord = cur.cmp_num(end);
        let done = if forward { ord == Ordering::Greater } else { ord == Ordering::Less };
        if done {
            return Ok(out);
        }
        out.push(cur.clone().into_expr());
        cur = cur.add(step);
    }
}

/// `Table(body, n)`, `Table(body, [i, n])`, `Table(body, [i, a, b])`, and
/// `Table(body, [i, a, b, step])`. The body is held; the iterator symbol is
/// block-scoped around each element evaluation.
fn table(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let body = &args[0];
    let spec = &args[1];
    let Some(list) = spec.as_call_to(kw::List) else {
        // A bare count: evaluate the body that many times.
        let n = super::expect_usize(&ev.eval(spec)?, "table count")?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(ev.eval(body)?);
        }
        return Ok(Expr::list(out));
    };
    let (var, bounds) = list
        .args
        .split_first()
        .ok_or_else(|| argument_error("empty table iterator"))?;
    let var = expect_symbol(var, "table iterator")?;
    let mut evaluated = Vec::with_capacity(bounds.len());
    for b in bounds {
        evaluated.push(ev.eval(b)?);
    }
    let (start, end, step) = match evaluated.as_slice() {
        [n] => (Num::Int(1.into()), num_arg(n)?, Num::Int(1.into())),
        [a, b] => (num_arg(a)?, num_arg(b)?, Num::Int(1.into())),
        [a, b, s] => (num_arg(a)?, num_arg(b)?, num_arg(s)?),
        _ => return Err(argument_error("malformed table iterator")),
    };
    let values = iterate(&start, &end, &step)?;
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        ev.scopes.push_frame([(var, Some(v))]);
        let r = ev.eval(body);
        ev.scopes.pop_frame();
        out.push(r?);
    }
    Ok(Expr::list(out))
}

fn flatten(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let list = super::expect_list(&args[0], "Flatten argument")?;
    let mut out = Vec::with_capacity(list.len());
    flatten_into(list, &mut out);
    Ok(Expr::list(out))
}

fn flatten_into(items: &[Expr], out: &mut Vec<Expr>) {
    for item in items {
        match item.as_call_to(kw::List) {
            Some(inner) => flatten_into(&inner.args, out),
            None => out.push(item.clone()),
        }
    }
}

fn sort(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Sort")?;
    let mut new_args = call.args.clone();
    canonical_sort(&mut new_args);
    Ok(Expr::call(call.head.clone(), new_args))
}

fn union(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let mut out = Vec::new();
    for arg in args {
        out.extend(super::expect_list(arg, "Union argument")?.iter().cloned());
    }
    canonical_sort(&mut out);
    out.dedup();
    Ok(Expr::list(out))
}

fn match_positions(
    ev: &Evaluator<'_>,
    subject: &Expr,
    pattern: &Expr,
) -> Result<Vec<usize>, ErrorValue> {
    let call = parts(subject, "pattern search")?;
    let pat = Pat::compile(pattern);
    let matcher = Matcher::new(&ev.attrs);
    Ok(call
        .args
        .iter()
        .enumerate()
        .filter(|(_, e)| matcher.matches(&pat, e).is_some())
        .map(|(i, _)| i)
        .collect())
}

fn position(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let hits = match_positions(ev, &args[0], &args[1])?;
    Ok(Expr::list(
        hits.into_iter().map(|i| Expr::list(vec![Expr::int(i as i64 + 1)])).collect(),
    ))
}

fn count(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let hits = match_positions(ev, &args[0], &args[1])?;
    Ok(Expr::int(hits.len() as i64))
}

fn member_q(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let hits = match_positions(ev, &args[0], &args[1])?;
    Ok(Expr::bool(!hits.is_empty()))
}

fn cases(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "Cases")?;
    let hits = match_positions(ev, &args[0], &args[1])?;
    Ok(Expr::list(hits.into_iter().map(|i| call.args[i].clone()).collect()))
}

fn delete_cases(ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let call = parts(&args[0], "DeleteCases")?;
    let hits = match_positions(ev, &args[0], &args[1])?;
    let keep: Vec<Expr> = call
        .args
        .iter()
        .enumerate()
        .filter(|(i, _)| !hits.contains(i))
        .map(|(_, e)| e.clone())
        .collect();
    Ok(Expr::call(call.head.clone(), keep))
}
