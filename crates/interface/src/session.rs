use crate::{DiagCtxt, SessionGlobals, diagnostics::ColorChoice};
use std::sync::Arc;

/// Hard bounds on a single evaluation.
///
/// Recursion is bounded by an explicit depth counter on the evaluator and the
/// fixed-point loop by an iteration counter, not by analysis; see the crate
/// documentation of `finch-eval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum number of stack frames.
    pub recursion_limit: usize,
    /// Maximum number of fixed-point iterations per expression.
    pub iteration_limit: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self { recursion_limit: 1000, iteration_limit: 100 }
    }
}

/// Information about the current evaluation session.
pub struct Session {
    /// The evaluation limits.
    pub limits: EvalLimits,
    /// The diagnostics context.
    pub dcx: DiagCtxt,
    /// The globals.
    globals: Arc<SessionGlobals>,
}

impl Default for Session {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Session {
    /// Creates a new session builder.
    #[inline]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Sets this session's globals for the duration of the closure.
    ///
    /// All symbol interning and formatting must happen inside of `enter`.
    #[inline]
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        self.globals.set(f)
    }
}

/// [`Session`] builder.
#[derive(Default)]
#[must_use = "builders don't do anything unless you call `build`"]
pub struct SessionBuilder {
    limits: Option<EvalLimits>,
    dcx: Option<DiagCtxt>,
}

impl SessionBuilder {
    /// Sets the evaluation limits.
    pub fn limits(mut self, limits: EvalLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Sets the diagnostics context.
    pub fn dcx(mut self, dcx: DiagCtxt) -> Self {
        self.dcx = Some(dcx);
        self
    }

    /// Sets the diagnostics context to a stderr emitter with the given color
    /// choice.
    pub fn with_stderr_emitter_and_color(self, color: ColorChoice) -> Self {
        self.dcx(DiagCtxt::new(color))
    }

    /// Consumes the builder to create a new session.
    pub fn build(self) -> Session {
        Session {
            limits: self.limits.unwrap_or_default(),
            dcx: self.dcx.unwrap_or_default(),
            globals: Arc::new(SessionGlobals::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    #[test]
    fn enter_installs_globals() {
        let sess = Session::default();
        sess.enter(|| {
            let s = Symbol::intern("abc");
            assert_eq!(s.as_str(), "abc");
        });
    }

    #[test]
    fn limits_default() {
        let sess = Session::builder().limits(EvalLimits::default()).build();
        assert_eq!(sess.limits.recursion_limit, 1000);
        assert_eq!(sess.limits.iteration_limit, 100);
    }
}
