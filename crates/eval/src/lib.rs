//! The attributed rewrite evaluator of the finch kernel.
//!
//! This crate holds the hard core: the attribute table, the back-tracking
//! pattern matcher with its specificity scorer, the per-symbol rule registry,
//! block-scoped bindings, the fixed-point evaluator, and the builtin
//! library.
//!
//! Errors are first-class values of the algebra: evaluation returns
//! `Result<Expr, ErrorValue>` and any step producing an error short-circuits
//! its enclosing expression, accumulating stack frames on the way out.

pub mod attr;
pub use attr::{AttrTable, Attrs};

mod builtins;

mod eval;
pub use eval::Evaluator;

pub mod pattern;
pub use pattern::{Binding, Bindings, Matcher, Pat};

pub mod rules;
pub use rules::{Rule, RuleBody, RuleOrigin, RuleTable};

mod scope;
pub use scope::ScopeStack;

pub mod specificity;

pub mod subst;

use finch_expr::{ErrorValue, Expr};

/// The result of an evaluation step.
pub type EvalResult = Result<Expr, ErrorValue>;
