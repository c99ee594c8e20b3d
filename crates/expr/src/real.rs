//! Arbitrary-precision binary floats.
//!
//! A [`Real`] carries a precision attribute in bits of mantissa. Values at
//! machine precision (53 bits or fewer) are stored as hardware floats; wider
//! values are backed by [`astro_float::BigFloat`]. Exact values entering a
//! mixed operation are converted at the real operand's precision; parser
//! literals come in at machine precision.

use astro_float::{BigFloat, Consts, RoundingMode};
use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use std::{
    cell::RefCell,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// The machine precision, in bits of mantissa.
pub const MACHINE_PREC: u32 = 53;

const RM: RoundingMode = RoundingMode::ToEven;

thread_local! {
    // Cache of computed constants (Pi, E) shared by all big-float operations
    // on this thread.
    static CONSTS: RefCell<Consts> = RefCell::new(Consts::new().expect("constants cache"));
}

/// An arbitrary-precision binary float with a precision attribute.
#[derive(Clone, Debug)]
pub enum Real {
    /// A float at machine precision (53 bits).
    Machine(f64),
    /// A float at a fixed precision above machine precision.
    Big(BigReal),
}

/// The wide representation of a [`Real`].
#[derive(Clone, Debug)]
pub struct BigReal {
    value: BigFloat,
    prec: u32,
}

impl BigReal {
    fn new(value: BigFloat, prec: u32) -> Self {
        Self { value, prec }
    }
}

impl Real {
    /// Wraps an `f64` as a machine-precision real.
    pub fn machine(value: f64) -> Self {
        Self::Machine(value)
    }

    /// Wraps a big float at the given precision, collapsing to the machine
    /// representation when the precision does not exceed 53 bits.
    fn big(value: BigFloat, prec: u32) -> Self {
        if prec <= MACHINE_PREC {
            Self::Machine(big_to_f64(&value))
        } else {
            Self::Big(BigReal::new(value, prec))
        }
    }

    /// The precision attribute, in bits of mantissa.
    pub fn prec(&self) -> u32 {
        match self {
            Self::Machine(_) => MACHINE_PREC,
            Self::Big(b) => b.prec,
        }
    }

    /// Converts an integer to a real of the given precision.
    pub fn from_bigint(i: &BigInt, prec: u32) -> Self {
        if prec <= MACHINE_PREC {
            return Self::Machine(bigint_to_f64(i));
        }
        let work = prec as usize + 64;
        let (sign, bytes) = i.to_bytes_be();
        // Base-256 digit accumulation; every step is exact at the working
        // precision until the final rounding.
        let b256 = BigFloat::from_f64(256.0, work);
        let mut acc = BigFloat::from_f64(0.0, work);
        for &byte in &bytes {
            acc = acc.mul(&b256, work, RM).add(&BigFloat::from_f64(byte as f64, work), work, RM);
        }
        if sign == Sign::Minus {
            acc = -acc;
        }
        Self::big(round_to(&acc, prec), prec)
    }

    /// Converts a rational to a real of the given precision.
    pub fn from_rational(r: &BigRational, prec: u32) -> Self {
        if prec <= MACHINE_PREC {
            return Self::Machine(bigint_to_f64(r.numer()) / bigint_to_f64(r.denom()));
        }
        let work = prec as usize + 64;
        let (Self::Big(n), Self::Big(d)) =
            (Self::from_bigint(r.numer(), work as u32), Self::from_bigint(r.denom(), work as u32))
        else {
            unreachable!("precision above machine threshold");
        };
        Self::big(n.value.div(&d.value, prec as usize, RM), prec)
    }

    /// Re-expresses this real at a new precision.
    pub fn with_prec(&self, prec: u32) -> Self {
        match self {
            Self::Machine(v) if prec <= MACHINE_PREC => Self::Machine(*v),
            Self::Machine(v) => Self::big(BigFloat::from_f64(*v, prec as usize), prec),
            Self::Big(b) if prec <= MACHINE_PREC => Self::Machine(big_to_f64(&b.value)),
            Self::Big(b) => Self::big(round_to(&b.value, prec), prec),
        }
    }

    /// The constant π at the given precision.
    pub fn pi(prec: u32) -> Self {
        if prec <= MACHINE_PREC {
            return Self::Machine(std::f64::consts::PI);
        }
        Self::big(CONSTS.with(|cc| cc.borrow_mut().pi(prec as usize, RM)), prec)
    }

    /// The constant e at the given precision.
    pub fn e(prec: u32) -> Self {
        if prec <= MACHINE_PREC {
            return Self::Machine(std::f64::consts::E);
        }
        Self::big(CONSTS.with(|cc| cc.borrow_mut().e(prec as usize, RM)), prec)
    }

    /// The value as a hardware float, rounding if necessary.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Machine(v) => *v,
            Self::Big(b) => big_to_f64(&b.value),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Self::Machine(v) => v.is_nan(),
            Self::Big(b) => b.value.is_nan(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Machine(v) => *v == 0.0,
            Self::Big(b) => b.value.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Machine(v) => *v < 0.0,
            Self::Big(b) => b.value.is_negative() && !b.value.is_zero(),
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Self::Machine(v) => Self::Machine(-v),
            Self::Big(b) => Self::big(-b.value.clone(), b.prec),
        }
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() { self.neg() } else { self.clone() }
    }

    pub fn add(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b, p| a.add(b, p, RM), |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b, p| a.sub(b, p, RM), |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b, p| a.mul(b, p, RM), |a, b| a * b)
    }

    pub fn div(&self, rhs: &Self) -> Self {
        self.binop(rhs, |a, b, p| a.div(b, p, RM), |a, b| a / b)
    }

    pub fn pow(&self, rhs: &Self) -> Self {
        self.binop(
            rhs,
            |a, b, p| CONSTS.with(|cc| a.pow(b, p, RM, &mut cc.borrow_mut())),
            f64::powf,
        )
    }

    /// Applies a binary operation; the result precision is the minimum of the
    /// operand precisions.
    fn binop(
        &self,
        rhs: &Self,
        big: impl FnOnce(&BigFloat, &BigFloat, usize) -> BigFloat,
        machine: impl FnOnce(f64, f64) -> f64,
    ) -> Self {
        let prec = self.prec().min(rhs.prec());
        if prec <= MACHINE_PREC {
            return Self::Machine(machine(self.to_f64(), rhs.to_f64()));
        }
        let (Self::Big(a), Self::Big(b)) = (self, rhs) else {
            unreachable!("minimum precision above machine threshold");
        };
        Self::big(big(&a.value, &b.value, prec as usize), prec)
    }

    /// Total comparison used by the canonical order. `NaN` compares equal to
    /// itself and greater than every other value.
    pub fn total_cmp(&self, rhs: &Self) -> Ordering {
        match (self.is_nan(), rhs.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        match (self, rhs) {
            (Self::Machine(a), Self::Machine(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Self::Big(a), Self::Big(b)) => {
                a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal)
            }
            _ => {
                let (a, b) = (self.to_f64(), rhs.to_f64());
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        }
    }

    pub fn floor(&self) -> f64 {
        self.to_f64().floor()
    }
}

/// Structural equality: bit-equal mantissa at equal precision. `NaN` is equal
/// to itself, so that structural equality stays reflexive.
impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Machine(a), Self::Machine(b)) => a.to_bits() == b.to_bits(),
            (Self::Big(a), Self::Big(b)) => {
                a.prec == b.prec
                    && ((a.value.is_nan() && b.value.is_nan()) || a.value == b.value)
            }
            _ => false,
        }
    }
}

impl Eq for Real {}

impl Hash for Real {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Machine(v) => {
                0u8.hash(state);
                v.to_bits().hash(state);
            }
            Self::Big(b) => {
                1u8.hash(state);
                b.prec.hash(state);
                // BigFloat exposes no stable bit accessor; its decimal
                // rendering is deterministic for a given value and precision.
                b.value.to_string().hash(state);
            }
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Machine(v) => {
                let s = v.to_string();
                if s.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
                    write!(f, "{s}.0")
                } else {
                    f.write_str(&s)
                }
            }
            Self::Big(b) => b.value.fmt(f),
        }
    }
}

fn bigint_to_f64(i: &BigInt) -> f64 {
    num_traits::ToPrimitive::to_f64(i).unwrap_or(f64::NAN)
}

fn big_to_f64(value: &BigFloat) -> f64 {
    if value.is_nan() {
        return f64::NAN;
    }
    // Round-trips through the decimal rendering; fine for the machine fast
    // path, which only needs 53 bits.
    value.to_string().parse::<f64>().unwrap_or(f64::NAN)
}

fn round_to(value: &BigFloat, prec: u32) -> BigFloat {
    let zero = BigFloat::from_f64(0.0, prec as usize);
    value.add(&zero, prec as usize, RM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_roundtrip() {
        let r = Real::machine(1.5);
        assert_eq!(r.prec(), MACHINE_PREC);
        assert_eq!(r.to_f64(), 1.5);
        assert_eq!(r.to_string(), "1.5");
        assert_eq!(Real::machine(6.0).to_string(), "6.0");
        assert_eq!(Real::machine(-2.0).to_string(), "-2.0");
    }

    #[test]
    fn arithmetic_takes_min_precision() {
        let a = Real::from_bigint(&BigInt::from(1), 128);
        let b = Real::machine(2.0);
        let sum = a.add(&b);
        assert_eq!(sum.prec(), MACHINE_PREC);
        assert_eq!(sum.to_f64(), 3.0);

        let c = Real::from_bigint(&BigInt::from(2), 128);
        let wide = a.add(&c);
        assert_eq!(wide.prec(), 128);
        assert_eq!(wide.total_cmp(&Real::machine(3.0)), Ordering::Equal);
    }

    #[test]
    fn pi_at_width() {
        let pi = Real::pi(128);
        assert_eq!(pi.prec(), 128);
        let approx = pi.to_f64();
        assert!((approx - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(Real::pi(53), Real::machine(std::f64::consts::PI));
    }

    #[test]
    fn structural_equality_is_bitwise() {
        assert_eq!(Real::machine(f64::NAN), Real::machine(f64::NAN));
        assert_ne!(Real::machine(1.0), Real::from_bigint(&BigInt::from(1), 128));
        assert_eq!(
            Real::from_bigint(&BigInt::from(7), 100),
            Real::from_bigint(&BigInt::from(7), 100)
        );
    }

    #[test]
    fn bigint_conversion_is_exact() {
        let huge: BigInt = "123456789012345678901234567890".parse().unwrap();
        let r = Real::from_bigint(&huge, 256);
        let back = Real::from_bigint(&huge, 256);
        assert_eq!(r, back);
        assert_eq!(r.total_cmp(&back), Ordering::Equal);
    }
}
