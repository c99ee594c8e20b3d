//! Substitution passes: pattern bindings into rule bodies, slots and named
//! parameters into function bodies, and `With`-style lexical replacement.

use crate::pattern::{Binding, Bindings};
use finch_expr::{Call, ErrorKind, ErrorValue, Expr, ExprKind, FuncValue};
use finch_interface::{Symbol, kw, map::FxHashMap};

/// Substitutes pattern bindings into a rule body.
///
/// Sequence captures splice into argument lists; a sequence capture standing
/// alone becomes `Sequence(...)`, which the evaluator splices at the next
/// step.
pub fn bindings(body: &Expr, env: &Bindings) -> Expr {
    match body.kind() {
        ExprKind::Symbol(s) => match env.get(s) {
            Some(Binding::Single(e)) => e.clone(),
            Some(Binding::Sequence(items)) => Expr::call_sym(kw::Sequence, items.clone()),
            None => body.clone(),
        },
        ExprKind::Call(c) => {
            let head = bindings(&c.head, env);
            let mut args = Vec::with_capacity(c.args.len());
            for arg in &c.args {
                // Splice sequence captures directly into the argument list.
                if let Some(Binding::Sequence(items)) =
                    arg.as_symbol().and_then(|s| env.get(&s))
                {
                    args.extend(items.iter().cloned());
                } else {
                    args.push(bindings(arg, env));
                }
            }
            Expr::call(head, args)
        }
        _ => body.clone(),
    }
}

/// Substitutes the slots `$`, `$1`, `$2`, ... of a slot-based function body.
///
/// Nested function values (and unevaluated `Function(...)` forms) shield
/// their own slots.
pub fn slots(body: &Expr, args: &[Expr]) -> Result<Expr, ErrorValue> {
    match body.kind() {
        ExprKind::Symbol(s) => match slot_index(*s) {
            Some(k) => args.get(k - 1).cloned().ok_or_else(|| {
                ErrorValue::new(
                    ErrorKind::Argument,
                    format!("slot ${k} out of range: {} argument(s) supplied", args.len()),
                )
                .with_expr(body.clone())
            }),
            None => Ok(body.clone()),
        },
        ExprKind::Call(c) => {
            // An inner anonymous function re-numbers its own slots.
            if c.head_symbol() == Some(kw::Function) {
                return Ok(body.clone());
            }
            let head = slots(&c.head, args)?;
            let new_args = c
                .args
                .iter()
                .map(|a| slots(a, args))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::call(head, new_args))
        }
        ExprKind::Func(_) => Ok(body.clone()),
        _ => Ok(body.clone()),
    }
}

/// `$` is slot 1; `$k` is slot `k` (1-based).
fn slot_index(sym: Symbol) -> Option<usize> {
    if sym == kw::Dollar {
        return Some(1);
    }
    let name = sym.as_str();
    let digits = name.strip_prefix('$')?;
    match digits.parse::<usize>() {
        Ok(k) if k >= 1 => Some(k),
        _ => None,
    }
}

/// Rewrites symbols throughout a body: named function parameters and `With`
/// bindings.
pub fn symbols(body: &Expr, map: &FxHashMap<Symbol, Expr>) -> Expr {
    match body.kind() {
        ExprKind::Symbol(s) => map.get(s).cloned().unwrap_or_else(|| body.clone()),
        ExprKind::Call(c) => {
            let head = symbols(&c.head, map);
            let args = c.args.iter().map(|a| symbols(a, map)).collect();
            Expr::call(head, args)
        }
        ExprKind::Func(f) => {
            // A nested function value shadows its own named parameters.
            let shadowed: Vec<Symbol> = f.params.clone().unwrap_or_default();
            if shadowed.iter().any(|p| map.contains_key(p)) {
                let mut inner = map.clone();
                for p in &shadowed {
                    inner.remove(p);
                }
                Expr::func(FuncValue { params: f.params.clone(), body: symbols(&f.body, &inner) })
            } else {
                Expr::func(FuncValue { params: f.params.clone(), body: symbols(&f.body, map) })
            }
        }
        _ => body.clone(),
    }
}

/// Splices `Sequence(...)` arguments one level deep.
pub fn splice_sequences(call: &Call) -> Option<Vec<Expr>> {
    if !call.args.iter().any(|a| a.as_call_to(kw::Sequence).is_some()) {
        return None;
    }
    let mut out = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        match arg.as_call_to(kw::Sequence) {
            Some(seq) => out.extend(seq.args.iter().cloned()),
            None => out.push(arg.clone()),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Binding;
    use finch_parse::parse_expr;

    fn expr(src: &str) -> Expr {
        parse_expr(src).unwrap()
    }

    #[test]
    fn sequence_captures_splice() {
        finch_interface::enter(|| {
            let mut env = Bindings::default();
            env.insert(
                Symbol::intern("xs"),
                Binding::Sequence(vec![Expr::int(1), Expr::int(2)]),
            );
            let out = bindings(&expr("g(xs, 9)"), &env);
            assert_eq!(out, expr("g(1, 2, 9)"));
            // Standalone sequence captures become Sequence(...).
            let out = bindings(&expr("xs"), &env);
            assert_eq!(out.to_string(), "Sequence(1, 2)");
        });
    }

    #[test]
    fn slot_substitution_shields_nested_functions() {
        finch_interface::enter(|| {
            let body = expr("Plus($1, Function($1))");
            let out = slots(&body, &[Expr::int(5)]).unwrap();
            assert_eq!(out.to_string(), "Plus(5, Function($1))");
            // Bare $ is $1.
            let out = slots(&expr("$ * $2"), &[Expr::int(2), Expr::int(3)]).unwrap();
            assert_eq!(out, expr("2 * 3"));
            // Out-of-range slots are argument errors.
            assert!(slots(&expr("$3"), &[Expr::int(1)]).is_err());
        });
    }

    #[test]
    fn symbol_substitution() {
        finch_interface::enter(|| {
            let mut map = FxHashMap::default();
            map.insert(Symbol::intern("x"), Expr::int(3));
            let out = symbols(&expr("Plus(x, y, f(x))"), &map);
            assert_eq!(out, expr("Plus(3, y, f(3))"));
        });
    }
}
