//! finch: a symbolic computation kernel.
//!
//! Expressions are nested function calls over a uniform immutable algebra;
//! evaluation drives them to a fixed point under user-defined and builtin
//! rewrite rules, guided by symbol attributes and a back-tracking pattern
//! matcher.
//!
//! ```
//! use finch::{Evaluator, Session, parse_expr};
//!
//! let sess = Session::default();
//! let result = sess.enter(|| {
//!     let mut ev = Evaluator::new(&sess);
//!     ev.eval(&parse_expr("Plus(1, 2, 3)").unwrap()).unwrap().to_string()
//! });
//! assert_eq!(result, "6");
//! ```

pub use finch_eval::{self as eval, EvalResult, Evaluator};
pub use finch_expr::{self as expr, Expr, ExprKind};
pub use finch_interface::{self as interface, Session, SessionBuilder, Symbol};
pub use finch_parse::{self as parse, ParseError, parse_expr};

#[cfg(feature = "cli")]
pub use finch_cli as cli;
