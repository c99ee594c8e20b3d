//! The finch expression algebra.
//!
//! A uniform, immutable value representation: interned symbols, an
//! arbitrary-precision numeric tower, strings, byte arrays, associations,
//! function values, compounds, and error values, with structural equality and
//! the canonical total order used to normalize `Orderless` operators.
//!
//! Construction never evaluates; evaluation lives in `finch-eval`.

mod assoc;
pub use assoc::Assoc;

mod error;
pub use error::{ErrorKind, ErrorValue, TraceFrame};

mod expr;
pub use expr::{Call, Expr, ExprKind};

mod func;
pub use func::FuncValue;

mod num;
pub use num::{Num, NumError};

mod ord;
pub use ord::{canonical_cmp, canonical_sort};

mod print;

mod real;
pub use real::{MACHINE_PREC, Real};
