//! Full-form printing.
//!
//! Compounds print as `Head(args...)`; the infix surface syntax is never
//! used on output, so printing an expression and re-parsing the result yields
//! a structurally equal tree. Association and function values print in the
//! surface form that evaluates back to them.

use crate::{Expr, ExprKind};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Symbol(s) => f.write_str(s.as_str()),
            ExprKind::Int(i) => i.fmt(f),
            ExprKind::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            ExprKind::Real(r) => r.fmt(f),
            ExprKind::Str(s) => write_quoted(f, s),
            ExprKind::Bytes(b) => {
                f.write_str("ByteArray([")?;
                for (i, byte) in b.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{byte}")?;
                }
                f.write_str("])")
            }
            ExprKind::Assoc(a) => {
                f.write_str("{")?;
                for (i, (k, v)) in a.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            ExprKind::Func(func) => match &func.params {
                None => write!(f, "Function({})", func.body),
                Some(params) => {
                    f.write_str("Function([")?;
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(p.as_str())?;
                    }
                    write!(f, "], {})", func.body)
                }
            },
            ExprKind::Call(c) => {
                write!(f, "{}(", c.head)?;
                for (i, arg) in c.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            ExprKind::Err(e) => {
                write!(f, "Error({}, ", e.kind.name())?;
                write_quoted(f, &e.message)?;
                f.write_str(")")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if (c as u32) < 0x20 => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use crate::{Assoc, Expr, FuncValue};
    use finch_interface::kw;

    #[test]
    fn full_form() {
        finch_interface::enter(|| {
            let e = Expr::call_sym(
                kw::Plus,
                vec![Expr::int(1), Expr::symbol_str("x"), Expr::string("a\"b")],
            );
            assert_eq!(e.to_string(), r#"Plus(1, x, "a\"b")"#);
        });
    }

    #[test]
    fn atoms() {
        finch_interface::enter(|| {
            assert_eq!(Expr::machine_real(1.5).to_string(), "1.5");
            assert_eq!(Expr::machine_real(2.0).to_string(), "2.0");
            assert_eq!(Expr::bytes(vec![1u8, 2, 255]).to_string(), "ByteArray([1, 2, 255])");
            let assoc =
                Assoc::from_pairs([(Expr::string("k"), Expr::int(1))]);
            assert_eq!(Expr::assoc(assoc).to_string(), r#"{"k": 1}"#);
            let func = FuncValue::slots(Expr::symbol(kw::Dollar));
            assert_eq!(Expr::func(func).to_string(), "Function($)");
        });
    }
}
