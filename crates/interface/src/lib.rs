//! Sessions, symbol interning, and diagnostics for the finch kernel.
//!
//! The types in this crate are shared by every other finch crate: the
//! [`Session`] carries the evaluation limits and the diagnostics context, and
//! the scoped-thread-local [`SessionGlobals`] holds the symbol interner that
//! [`Symbol::intern`] and `Display` implementations rely on.

mod globals;
pub use globals::SessionGlobals;

pub mod diagnostics;
pub use diagnostics::DiagCtxt;

pub mod map;

mod session;
pub use session::{EvalLimits, Session, SessionBuilder};

mod symbol;
pub use symbol::{Symbol, kw, sym};

/// Enters a fresh default session for the duration of the closure.
///
/// This is a convenience for tests and one-off embeddings; long-lived hosts
/// should create a [`Session`] and use [`Session::enter`] instead.
pub fn enter<R>(f: impl FnOnce() -> R) -> R {
    SessionGlobals::default().set(f)
}
