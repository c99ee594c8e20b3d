scoped_tls::scoped_thread_local!(static SESSION_GLOBALS: SessionGlobals);

/// Per-session global variables.
///
/// This struct is stored in thread-local storage in such a way that it is
/// accessible without any kind of handle to all threads within the evaluation
/// session, but is not accessible outside the session.
///
/// These should only be used when a `Session` is truly not available, such as
/// `Symbol::intern` and `Display` implementations.
pub struct SessionGlobals {
    pub(crate) symbol_interner: crate::symbol::Interner,
}

impl Default for SessionGlobals {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGlobals {
    /// Creates a new session globals object with a freshly pre-filled symbol
    /// interner.
    pub fn new() -> Self {
        Self { symbol_interner: crate::symbol::Interner::fresh() }
    }

    /// Sets this instance as the global instance for the duration of the
    /// closure.
    ///
    /// Nested calls on the same thread re-use the outer instance.
    #[inline]
    pub fn set<R>(&self, f: impl FnOnce() -> R) -> R {
        if SESSION_GLOBALS.is_set() {
            // Symbols are only meaningful relative to one interner; keep the
            // outer one rather than shadowing it.
            return f();
        }
        SESSION_GLOBALS.set(self, f)
    }

    /// Calls the given closure with the current session globals.
    ///
    /// # Panics
    ///
    /// Panics if `set` has not previously been called.
    #[inline]
    #[track_caller]
    pub fn with<R>(f: impl FnOnce(&Self) -> R) -> R {
        if !SESSION_GLOBALS.is_set() {
            panic!(
                "cannot access session globals without calling `set` first;\n\
                 did you forget to call `Session::enter` or `finch_interface::enter`?"
            );
        }
        SESSION_GLOBALS.with(f)
    }

    /// Calls the given closure with the current session globals if they have
    /// been set, otherwise creates a new instance, sets it, and calls the
    /// closure with it.
    #[inline]
    pub fn with_or_default<R>(f: impl FnOnce(&Self) -> R) -> R {
        if Self::is_set() { Self::with(f) } else { Self::default().set(|| Self::with(f)) }
    }

    /// Returns `true` if the session globals have been set.
    #[inline]
    pub fn is_set() -> bool {
        SESSION_GLOBALS.is_set()
    }
}
