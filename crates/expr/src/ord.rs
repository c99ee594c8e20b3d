//! The canonical total order.
//!
//! This is the order `Orderless` compounds are normalized with. It is total,
//! transitive, and stable across runs: numbers order by value (with
//! cross-kind promotion and a kind tag as the tie-breaker), then booleans,
//! strings, symbols, compounds, and the remaining variants by a kind tag
//! first and by value within a kind. Structurally equal expressions always
//! order equally.

use crate::{Expr, ExprKind, Num};
use finch_interface::kw;
use std::cmp::Ordering;

/// Compares two expressions in the canonical order.
pub fn canonical_cmp(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    if a.is_number() && b.is_number() {
        // Numbers order by value; 1 < 3/2 < 1.6 regardless of kind. The kind
        // tag breaks ties so that e.g. 1 and 1.0 have a stable order.
        let (x, y) = (Num::from_expr(a).unwrap(), Num::from_expr(b).unwrap());
        return x.cmp_num(&y).then_with(|| kind_rank(a).cmp(&kind_rank(b))).then_with(|| {
            real_prec_tiebreak(a).cmp(&real_prec_tiebreak(b))
        });
    }
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| cmp_within_kind(a, b))
}

/// Sorts a slice of expressions canonically.
pub fn canonical_sort(items: &mut [Expr]) {
    items.sort_by(canonical_cmp);
}

fn kind_rank(e: &Expr) -> u8 {
    match e.kind() {
        ExprKind::Int(_) => 0,
        ExprKind::Rational(_) => 1,
        ExprKind::Real(_) => 2,
        ExprKind::Symbol(s) if *s == kw::True || *s == kw::False => 3,
        ExprKind::Str(_) => 4,
        ExprKind::Symbol(_) => 5,
        ExprKind::Call(_) => 6,
        ExprKind::Bytes(_) => 7,
        ExprKind::Assoc(_) => 8,
        ExprKind::Func(_) => 9,
        ExprKind::Err(_) => 10,
    }
}

fn real_prec_tiebreak(e: &Expr) -> u32 {
    e.as_real().map_or(0, |r| r.prec())
}

fn cmp_within_kind(a: &Expr, b: &Expr) -> Ordering {
    match (a.kind(), b.kind()) {
        // Strings order by code-point sequence, which for UTF-8 is byte
        // order.
        (ExprKind::Str(x), ExprKind::Str(y)) => x.cmp(y),
        (ExprKind::Symbol(x), ExprKind::Symbol(y)) => x.as_str().cmp(y.as_str()),
        (ExprKind::Bytes(x), ExprKind::Bytes(y)) => x.cmp(y),
        (ExprKind::Call(x), ExprKind::Call(y)) => canonical_cmp(&x.head, &y.head)
            .then_with(|| x.args.len().cmp(&y.args.len()))
            .then_with(|| cmp_lexicographic(&x.args, &y.args)),
        (ExprKind::Func(x), ExprKind::Func(y)) => {
            let px = x.params.as_deref().unwrap_or_default();
            let py = y.params.as_deref().unwrap_or_default();
            px.len()
                .cmp(&py.len())
                .then_with(|| {
                    px.iter()
                        .map(|s| s.as_str())
                        .cmp(py.iter().map(|s| s.as_str()))
                })
                .then_with(|| canonical_cmp(&x.body, &y.body))
        }
        (ExprKind::Assoc(x), ExprKind::Assoc(y)) => {
            // Equal associations may iterate in different orders; compare
            // their canonically sorted entry sequences instead.
            let mut xs: Vec<_> = x.iter().collect();
            let mut ys: Vec<_> = y.iter().collect();
            xs.sort_by(|(k1, _), (k2, _)| canonical_cmp(k1, k2));
            ys.sort_by(|(k1, _), (k2, _)| canonical_cmp(k1, k2));
            for ((kx, vx), (ky, vy)) in xs.iter().zip(&ys) {
                let ord = canonical_cmp(kx, ky).then_with(|| canonical_cmp(vx, vy));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (ExprKind::Err(x), ExprKind::Err(y)) => (x.kind.name(), &x.message)
            .cmp(&(y.kind.name(), &y.message))
            .then_with(|| match (&x.expr, &y.expr) {
                (Some(ex), Some(ey)) => canonical_cmp(ex, ey),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            }),
        // Numbers are handled before kind dispatch.
        _ => unreachable!("kind ranks are equal"),
    }
}

fn cmp_lexicographic(xs: &[Expr], ys: &[Expr]) -> Ordering {
    for (x, y) in xs.iter().zip(ys) {
        let ord = canonical_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    #[test]
    fn numbers_order_by_value() {
        finch_interface::enter(|| {
            let one = Expr::int(1);
            let three_halves = Expr::rational(BigRational::new(3.into(), 2.into()));
            let one_point_six = Expr::machine_real(1.6);
            assert_eq!(canonical_cmp(&one, &three_halves), Ordering::Less);
            assert_eq!(canonical_cmp(&three_halves, &one_point_six), Ordering::Less);
            // Equal value, different kind: the kind tag breaks the tie.
            assert_eq!(canonical_cmp(&Expr::int(1), &Expr::machine_real(1.0)), Ordering::Less);
        });
    }

    #[test]
    fn atoms_before_compounds() {
        finch_interface::enter(|| {
            let sym = Expr::symbol_str("a");
            let call = Expr::call_sym(kw::Plus, vec![Expr::int(1)]);
            assert_eq!(canonical_cmp(&Expr::int(5), &sym), Ordering::Less);
            assert_eq!(canonical_cmp(&Expr::string("z"), &sym), Ordering::Less);
            assert_eq!(canonical_cmp(&sym, &call), Ordering::Less);
        });
    }

    #[test]
    fn total_and_consistent_with_equality() {
        finch_interface::enter(|| {
            let exprs = [
                Expr::int(2),
                Expr::rational(BigRational::new(1.into(), 3.into())),
                Expr::machine_real(0.25),
                Expr::bool(true),
                Expr::string("s"),
                Expr::symbol_str("x"),
                Expr::call_sym(kw::List, vec![Expr::int(1), Expr::int(2)]),
            ];
            for a in &exprs {
                assert_eq!(canonical_cmp(a, a), Ordering::Equal);
                for b in &exprs {
                    assert_eq!(canonical_cmp(a, b), canonical_cmp(b, a).reverse());
                    if a == b {
                        assert_eq!(canonical_cmp(a, b), Ordering::Equal);
                    }
                }
            }
        });
    }

    #[test]
    fn compounds_order_by_head_then_arity() {
        finch_interface::enter(|| {
            let f1 = Expr::call_sym(kw::Plus, vec![Expr::int(1)]);
            let f2 = Expr::call_sym(kw::Plus, vec![Expr::int(1), Expr::int(2)]);
            let g = Expr::call_sym(kw::Times, vec![Expr::int(1)]);
            assert_eq!(canonical_cmp(&f1, &f2), Ordering::Less);
            assert_eq!(canonical_cmp(&f1, &g), Ordering::Less);
        });
    }
}
