//! Arithmetic builtins and the numeric tower bridging.

use super::{Arity, Reg, argument_error, type_error, unchanged};
use crate::{EvalResult, Evaluator, attr::Attrs};
use finch_expr::{ErrorKind, ErrorValue, Expr, ExprKind, Num, NumError, Real};
use finch_interface::{Symbol, kw, sym};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, Zero};

pub(super) fn install(ev: &mut Evaluator<'_>) {
    let mut reg = Reg::new(ev);
    let numeric = Attrs::FLAT
        | Attrs::ORDERLESS
        | Attrs::ONE_IDENTITY
        | Attrs::LISTABLE
        | Attrs::NUMERIC_FUNCTION;
    reg.builtin(kw::Plus, numeric, Arity::Any, plus);
    reg.builtin(kw::Times, numeric, Arity::Any, times);
    reg.builtin(kw::Subtract, Attrs::LISTABLE, Arity::Exact(2), subtract);
    reg.builtin(kw::Minus, Attrs::LISTABLE, Arity::Exact(1), minus);
    reg.builtin(kw::Divide, Attrs::LISTABLE, Arity::Exact(2), divide);
    reg.builtin(
        kw::Power,
        Attrs::ONE_IDENTITY | Attrs::LISTABLE | Attrs::NUMERIC_FUNCTION,
        Arity::Exact(2),
        power,
    );
    reg.builtin(sym::Mod, Attrs::LISTABLE, Arity::Exact(2), modulo);
    reg.builtin(sym::Quotient, Attrs::LISTABLE, Arity::Exact(2), quotient);
    reg.builtin(sym::Abs, Attrs::LISTABLE | Attrs::NUMERIC_FUNCTION, Arity::Exact(1), abs);
    reg.builtin(sym::Sign, Attrs::LISTABLE, Arity::Exact(1), sign);
    reg.builtin(sym::Min, Attrs::FLAT | Attrs::ORDERLESS | Attrs::ONE_IDENTITY, Arity::Any, min);
    reg.builtin(sym::Max, Attrs::FLAT | Attrs::ORDERLESS | Attrs::ONE_IDENTITY, Arity::Any, max);
    reg.builtin(sym::Floor, Attrs::LISTABLE, Arity::Exact(1), floor);
    reg.builtin(sym::Ceiling, Attrs::LISTABLE, Arity::Exact(1), ceiling);
    reg.builtin(sym::Round, Attrs::LISTABLE, Arity::Exact(1), round);
    reg.builtin(sym::GCD, Attrs::FLAT | Attrs::ORDERLESS, Arity::Any, gcd);
    reg.builtin(sym::LCM, Attrs::FLAT | Attrs::ORDERLESS, Arity::Any, lcm);
    reg.builtin(sym::Numerator, Attrs::empty(), Arity::Exact(1), numerator);
    reg.builtin(sym::Denominator, Attrs::empty(), Arity::Exact(1), denominator);
    reg.builtin(sym::N, Attrs::empty(), Arity::Between(1, 2), n_builtin);
}

fn num_error(e: NumError, expr: Expr) -> ErrorValue {
    let kind = match e {
        NumError::DivisionByZero => ErrorKind::DivisionByZero,
        NumError::ExponentOverflow => ErrorKind::Mathematical,
    };
    ErrorValue::new(kind, e.msg()).with_expr(expr)
}

/// Folds the numeric arguments with `fold`, keeping the symbolic rest in
/// place. Canonical order has already put the numbers first.
fn fold_numeric(args: &[Expr], fold: impl Fn(Num, &Num) -> Num) -> (Option<Num>, Vec<Expr>) {
    let mut acc: Option<Num> = None;
    let mut rest = Vec::new();
    for arg in args {
        match Num::from_expr(arg) {
            Some(n) => acc = Some(match acc {
                Some(prev) => fold(prev, &n),
                None => n,
            }),
            None => rest.push(arg.clone()),
        }
    }
    (acc, rest)
}

fn plus(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (acc, mut rest) = fold_numeric(args, |a, b| a.add(b));
    let mut out = Vec::with_capacity(rest.len() + 1);
    if let Some(n) = acc {
        // The additive identity drops out, unless nothing else remains.
        let exact_zero = matches!(&n, Num::Int(i) if i.is_zero());
        if !exact_zero || rest.is_empty() {
            out.push(n.into_expr());
        }
    }
    out.append(&mut rest);
    Ok(match out.len() {
        0 => Expr::int(0),
        1 => out.into_iter().next().expect("one element"),
        _ => Expr::call_sym(kw::Plus, out),
    })
}

fn times(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let (acc, mut rest) = fold_numeric(args, |a, b| a.mul(b));
    let mut out = Vec::with_capacity(rest.len() + 1);
    if let Some(n) = acc {
        if n.is_zero() {
            // Zero absorbs, preserving the zero's own kind (0 vs 0.0).
            return Ok(n.into_expr());
        }
        let exact_one = matches!(&n, Num::Int(i) if i == &BigInt::from(1));
        if !exact_one || rest.is_empty() {
            out.push(n.into_expr());
        }
    }
    out.append(&mut rest);
    Ok(match out.len() {
        0 => Expr::int(1),
        1 => out.into_iter().next().expect("one element"),
        _ => Expr::call_sym(kw::Times, out),
    })
}

fn subtract(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let [x, y] = args else { unreachable!("arity") };
    Ok(Expr::call_sym(
        kw::Plus,
        vec![x.clone(), Expr::call_sym(kw::Times, vec![Expr::int(-1), y.clone()])],
    ))
}

fn minus(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    Ok(Expr::call_sym(kw::Times, vec![Expr::int(-1), args[0].clone()]))
}

fn divide(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let [x, y] = args else { unreachable!("arity") };
    if let (Some(a), Some(b)) = (Num::from_expr(x), Num::from_expr(y)) {
        return a
            .div(&b)
            .map(Num::into_expr)
            .map_err(|e| num_error(e, unchanged(kw::Divide, args)));
    }
    if let Some(b) = Num::from_expr(y) {
        if b.is_zero() {
            return Err(num_error(NumError::DivisionByZero, unchanged(kw::Divide, args)));
        }
    }
    // x / y is x * y^-1.
    Ok(Expr::call_sym(
        kw::Times,
        vec![x.clone(), Expr::call_sym(kw::Power, vec![y.clone(), Expr::int(-1)])],
    ))
}

fn power(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let [base, exp] = args else { unreachable!("arity") };
    if let (Some(b), Some(e)) = (Num::from_expr(base), Num::from_expr(exp)) {
        match b.pow(&e) {
            Ok(Some(n)) => return Ok(n.into_expr()),
            Ok(None) => return Ok(unchanged(kw::Power, args)),
            Err(err) => return Err(num_error(err, unchanged(kw::Power, args))),
        }
    }
    if let Some(e) = exp.as_int() {
        if e.is_zero() {
            return Ok(Expr::int(1));
        }
        if e == &BigInt::from(1) {
            return Ok(base.clone());
        }
        // (a^x)^n with integer n collapses to a^(x*n).
        if let Some(inner) = base.as_call_to(kw::Power) {
            let [a, x] = inner.args.as_slice() else {
                return Ok(unchanged(kw::Power, args));
            };
            let product = Expr::call_sym(kw::Times, vec![x.clone(), exp.clone()]);
            return Ok(Expr::call_sym(kw::Power, vec![a.clone(), product]));
        }
        // An integer exponent distributes over a product, so that a quotient
        // base (a/b)^n yields Times(Power(a, n), Power(b, -n)).
        if let Some(product) = base.as_call_to(kw::Times) {
            let factors = product
                .args
                .iter()
                .map(|f| Expr::call_sym(kw::Power, vec![f.clone(), exp.clone()]))
                .collect();
            return Ok(Expr::call_sym(kw::Times, factors));
        }
    }
    if base.as_int() == Some(&BigInt::from(1)) {
        return Ok(Expr::int(1));
    }
    Ok(unchanged(kw::Power, args))
}

fn int_binop(
    args: &[Expr],
    head: Symbol,
    f: impl Fn(&BigInt, &BigInt) -> Result<BigInt, ErrorValue>,
) -> EvalResult {
    match (args[0].as_int(), args[1].as_int()) {
        (Some(a), Some(b)) => f(a, b).map(Expr::int),
        _ => Ok(unchanged(head, args)),
    }
}

fn modulo(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    int_binop(args, sym::Mod, |a, b| {
        if b.is_zero() {
            return Err(ErrorValue::new(ErrorKind::DivisionByZero, "division by zero"));
        }
        Ok(a.mod_floor(b))
    })
}

fn quotient(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    int_binop(args, sym::Quotient, |a, b| {
        if b.is_zero() {
            return Err(ErrorValue::new(ErrorKind::DivisionByZero, "division by zero"));
        }
        Ok(a.div_floor(b))
    })
}

fn abs(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match Num::from_expr(&args[0]) {
        Some(n) => Ok(n.abs().into_expr()),
        None => Ok(unchanged(sym::Abs, args)),
    }
}

fn sign(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match Num::from_expr(&args[0]) {
        Some(n) => Ok(Expr::int(if n.is_zero() {
            0
        } else if n.is_negative() {
            -1
        } else {
            1
        })),
        None => Ok(unchanged(sym::Sign, args)),
    }
}

fn extremum(args: &[Expr], head: Symbol, keep_left: std::cmp::Ordering) -> EvalResult {
    let nums: Option<Vec<Num>> = args.iter().map(Num::from_expr).collect();
    let Some(nums) = nums else { return Ok(unchanged(head, args)) };
    let Some(first) = nums.first().cloned() else { return Ok(unchanged(head, args)) };
    let best = nums
        .into_iter()
        .skip(1)
        .fold(first, |best, n| if best.cmp_num(&n) == keep_left { best } else { n });
    Ok(best.into_expr())
}

fn min(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    extremum(args, sym::Min, std::cmp::Ordering::Less)
}

fn max(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    extremum(args, sym::Max, std::cmp::Ordering::Greater)
}

fn to_integer(args: &[Expr], head: Symbol, int: impl Fn(f64) -> f64, rat: impl Fn(&num_rational::BigRational) -> BigInt) -> EvalResult {
    match args[0].kind() {
        ExprKind::Int(_) => Ok(args[0].clone()),
        ExprKind::Rational(r) => Ok(Expr::int(rat(r))),
        ExprKind::Real(r) => BigInt::from_f64(int(r.to_f64()))
            .map(Expr::int)
            .ok_or_else(|| type_error(format!("cannot convert `{r}` to an integer"))),
        _ => Ok(unchanged(head, args)),
    }
}

fn floor(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    to_integer(args, sym::Floor, f64::floor, |r| r.floor().to_integer())
}

fn ceiling(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    to_integer(args, sym::Ceiling, f64::ceil, |r| r.ceil().to_integer())
}

fn round(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    to_integer(args, sym::Round, f64::round, |r| r.round().to_integer())
}

fn int_fold(
    args: &[Expr],
    head: Symbol,
    init: BigInt,
    f: impl Fn(&BigInt, &BigInt) -> BigInt,
) -> EvalResult {
    let mut acc = init;
    for arg in args {
        match arg.as_int() {
            Some(i) => acc = f(&acc, i),
            None => return Ok(unchanged(head, args)),
        }
    }
    Ok(Expr::int(acc))
}

fn gcd(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    int_fold(args, sym::GCD, BigInt::zero(), |a, b| a.gcd(b))
}

fn lcm(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    int_fold(args, sym::LCM, BigInt::from(1), |a, b| a.lcm(b))
}

fn numerator(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].kind() {
        ExprKind::Int(_) => Ok(args[0].clone()),
        ExprKind::Rational(r) => Ok(Expr::int(r.numer().clone())),
        _ => Ok(unchanged(sym::Numerator, args)),
    }
}

fn denominator(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    match args[0].kind() {
        ExprKind::Int(_) => Ok(Expr::int(1)),
        ExprKind::Rational(r) => Ok(Expr::int(r.denom().clone())),
        _ => Ok(unchanged(sym::Denominator, args)),
    }
}

/// `N(e)` / `N(e, p)`: re-expresses exact numbers as reals of `p` bits,
/// produces the known constants at that precision, and otherwise distributes
/// inside compounds.
fn n_builtin(_ev: &mut Evaluator<'_>, args: &[Expr]) -> EvalResult {
    let prec = match args.get(1) {
        None => finch_expr::MACHINE_PREC,
        Some(p) => {
            let bits = super::expect_usize(p, "precision")?;
            u32::try_from(bits.max(1))
                .map_err(|_| argument_error(format!("precision `{p}` is out of range")))?
        }
    };
    Ok(n_apply(&args[0], prec))
}

fn n_apply(e: &Expr, prec: u32) -> Expr {
    match e.kind() {
        ExprKind::Int(i) => Expr::real(Real::from_bigint(i, prec)),
        ExprKind::Rational(r) => Expr::real(Real::from_rational(r, prec)),
        ExprKind::Real(r) => Expr::real(r.with_prec(prec)),
        ExprKind::Symbol(s) if *s == kw::Pi => Expr::real(Real::pi(prec)),
        ExprKind::Symbol(s) if *s == kw::E => Expr::real(Real::e(prec)),
        ExprKind::Call(c) => {
            let args = c.args.iter().map(|a| n_apply(a, prec)).collect();
            Expr::call(c.head.clone(), args)
        }
        _ => e.clone(),
    }
}
