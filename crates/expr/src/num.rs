//! The numeric tower: Integer, Rational, Real, and the promotions between
//! them.
//!
//! All promotion rules live here so the builtin handlers never re-derive
//! them: exact kinds promote Integer → Rational; any operation touching a
//! Real produces a Real at the minimum operand precision.

use crate::{Expr, ExprKind, Real};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

/// A numeric view of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Num {
    Int(BigInt),
    Rat(BigRational),
    Real(Real),
}

/// Failures of numeric evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumError {
    DivisionByZero,
    /// An exponent too large to materialize.
    ExponentOverflow,
}

impl NumError {
    pub fn msg(self) -> &'static str {
        match self {
            Self::DivisionByZero => "division by zero",
            Self::ExponentOverflow => "exponent too large",
        }
    }
}

impl Num {
    /// Extracts a numeric view; `None` for non-numbers.
    pub fn from_expr(e: &Expr) -> Option<Self> {
        match e.kind() {
            ExprKind::Int(i) => Some(Self::Int(i.clone())),
            ExprKind::Rational(r) => Some(Self::Rat(r.clone())),
            ExprKind::Real(r) => Some(Self::Real(r.clone())),
            _ => None,
        }
    }

    /// Converts back to an expression, collapsing integral rationals.
    pub fn into_expr(self) -> Expr {
        match self {
            Self::Int(i) => Expr::int(i),
            Self::Rat(r) => Expr::rational(r),
            Self::Real(r) => Expr::real(r),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(i) => i.is_zero(),
            Self::Rat(r) => r.is_zero(),
            Self::Real(r) => r.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Int(i) => i.is_negative(),
            Self::Rat(r) => r.is_negative(),
            Self::Real(r) => r.is_negative(),
        }
    }

    fn to_rat(&self) -> Option<BigRational> {
        match self {
            Self::Int(i) => Some(BigRational::from_integer(i.clone())),
            Self::Rat(r) => Some(r.clone()),
            Self::Real(_) => None,
        }
    }

    /// Re-expresses this number as a real of the given precision.
    pub fn to_real(&self, prec: u32) -> Real {
        match self {
            Self::Int(i) => Real::from_bigint(i, prec),
            Self::Rat(r) => Real::from_rational(r, prec),
            Self::Real(r) => r.clone(),
        }
    }

    pub fn add(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b| a + b, |a, b| a + b, Real::add)
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b| a - b, |a, b| a - b, Real::sub)
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b| a * b, |a, b| a * b, Real::mul)
    }

    pub fn neg(&self) -> Self {
        match self {
            Self::Int(i) => Self::Int(-i),
            Self::Rat(r) => Self::Rat(-r),
            Self::Real(r) => Self::Real(r.neg()),
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Self::Int(i) => Self::Int(i.abs()),
            Self::Rat(r) => Self::Rat(r.abs()),
            Self::Real(r) => Self::Real(r.abs()),
        }
    }

    /// Division with exact-kind promotion: `Integer / Integer` is an integer
    /// when divisible and a rational otherwise.
    pub fn div(&self, rhs: &Self) -> Result<Self, NumError> {
        if rhs.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        Ok(match (self, rhs) {
            (Self::Real(_), _) | (_, Self::Real(_)) => {
                let prec = self.real_prec().min(rhs.real_prec());
                Self::Real(self.to_real(prec).div(&rhs.to_real(prec)))
            }
            (a, b) => {
                // `to_rat` only fails for reals, handled above.
                let (a, b) = (a.to_rat().unwrap(), b.to_rat().unwrap());
                Self::Rat(a / b)
            }
        })
    }

    /// Numeric exponentiation. Returns `None` when there is no numeric
    /// simplification (an exact base with a fractional exponent).
    pub fn pow(&self, rhs: &Self) -> Result<Option<Self>, NumError> {
        match (self, rhs) {
            (_, Self::Int(e)) => self.pow_int(e).map(Some),
            (Self::Real(_), _) | (_, Self::Real(_)) => {
                let prec = self.real_prec().min(rhs.real_prec());
                Ok(Some(Self::Real(self.to_real(prec).pow(&rhs.to_real(prec)))))
            }
            // An exact base with an exact fractional exponent stays symbolic.
            (_, Self::Rat(_)) => Ok(None),
        }
    }

    fn pow_int(&self, e: &BigInt) -> Result<Self, NumError> {
        let exp = e.abs().to_u32().ok_or(NumError::ExponentOverflow)?;
        let inverted = e.is_negative();
        Ok(match self {
            Self::Int(i) => {
                if inverted && i.is_zero() {
                    return Err(NumError::DivisionByZero);
                }
                let p = Pow::pow(i, exp);
                if inverted {
                    Self::Rat(BigRational::new(BigInt::from(1), p))
                } else {
                    Self::Int(p)
                }
            }
            Self::Rat(r) => {
                if inverted && r.is_zero() {
                    return Err(NumError::DivisionByZero);
                }
                let (n, d) = (Pow::pow(r.numer(), exp), Pow::pow(r.denom(), exp));
                if inverted {
                    Self::Rat(BigRational::new(d, n))
                } else {
                    Self::Rat(BigRational::new(n, d))
                }
            }
            Self::Real(r) => {
                let e = Real::from_bigint(e, r.prec());
                Self::Real(r.pow(&e))
            }
        })
    }

    /// Numeric comparison with cross-kind promotion.
    pub fn cmp_num(&self, rhs: &Self) -> Ordering {
        match (self.to_rat(), rhs.to_rat()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let prec = self.real_prec().min(rhs.real_prec());
                self.to_real(prec).total_cmp(&rhs.to_real(prec))
            }
        }
    }

    /// The precision this number contributes to a mixed operation: its own
    /// for reals, unconstrained for exact values.
    fn real_prec(&self) -> u32 {
        match self {
            Self::Real(r) => r.prec(),
            _ => u32::MAX,
        }
    }

    fn binop(
        &self,
        rhs: &Self,
        int: impl FnOnce(&BigInt, &BigInt) -> BigInt,
        rat: impl FnOnce(&BigRational, &BigRational) -> BigRational,
        real: impl FnOnce(&Real, &Real) -> Real,
    ) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => Self::Int(int(a, b)),
            (Self::Real(_), _) | (_, Self::Real(_)) => {
                let prec = self.real_prec().min(rhs.real_prec());
                Self::Real(real(&self.to_real(prec), &rhs.to_real(prec)))
            }
            (a, b) => Self::Rat(rat(&a.to_rat().unwrap(), &b.to_rat().unwrap())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Num {
        Num::Int(BigInt::from(i))
    }

    #[test]
    fn integer_division_promotes() {
        finch_interface::enter(|| {
            let q = int(1).div(&int(2)).unwrap().into_expr();
            assert_eq!(q, Expr::rational(BigRational::new(1.into(), 2.into())));
            let w = int(6).div(&int(3)).unwrap().into_expr();
            assert_eq!(w, Expr::int(2));
            assert_eq!(int(1).div(&int(0)), Err(NumError::DivisionByZero));
        });
    }

    #[test]
    fn mixed_real_takes_min_precision() {
        let r = Num::Real(Real::machine(0.5));
        let sum = int(1).add(&r);
        match sum {
            Num::Real(v) => {
                assert_eq!(v.prec(), crate::real::MACHINE_PREC);
                assert_eq!(v.to_f64(), 1.5);
            }
            _ => panic!("expected a real"),
        }
    }

    #[test]
    fn powers() {
        finch_interface::enter(|| {
            assert_eq!(int(3).pow(&int(2)).unwrap().unwrap().into_expr(), Expr::int(9));
            let inv = int(2).pow(&int(-2)).unwrap().unwrap().into_expr();
            assert_eq!(inv, Expr::rational(BigRational::new(1.into(), 4.into())));
            // 0^0 is the empty product.
            assert_eq!(int(0).pow(&int(0)).unwrap().unwrap().into_expr(), Expr::int(1));
            assert_eq!(int(0).pow(&int(-1)), Err(NumError::DivisionByZero));
            // No numeric simplification for 2^(1/2).
            let half = Num::Rat(BigRational::new(1.into(), 2.into()));
            assert!(int(2).pow(&half).unwrap().is_none());
        });
    }

    #[test]
    fn comparisons_promote() {
        let half = Num::Rat(BigRational::new(1.into(), 2.into()));
        assert_eq!(int(1).cmp_num(&half), Ordering::Greater);
        assert_eq!(half.cmp_num(&Num::Real(Real::machine(0.5))), Ordering::Equal);
        assert_eq!(int(2).cmp_num(&int(2)), Ordering::Equal);
    }
}
