//! Variable bindings with block-scoped override.
//!
//! A single evaluation chain sees one stack of scopes: the root bindings plus
//! one frame per active `Block`. Reads resolve from the innermost frame that
//! declares the symbol scoped; writes target that frame, else the root.
//! Popping a frame restores the outer bindings regardless of how the block
//! exited.

use finch_expr::Expr;
use finch_interface::{Symbol, map::FxHashMap};

#[derive(Default)]
struct ScopeFrame {
    /// Symbols this frame shadows; `None` shadows to unbound.
    vars: FxHashMap<Symbol, Option<Expr>>,
}

/// The binding store of an evaluation chain.
#[derive(Default)]
pub struct ScopeStack {
    root: FxHashMap<Symbol, Expr>,
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a symbol, innermost scope first.
    pub fn get(&self, sym: Symbol) -> Option<Expr> {
        for frame in self.frames.iter().rev() {
            if let Some(slot) = frame.vars.get(&sym) {
                return slot.clone();
            }
        }
        self.root.get(&sym).cloned()
    }

    /// Binds a symbol in the innermost frame that declares it scoped, else
    /// the root.
    pub fn set(&mut self, sym: Symbol, value: Expr) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(&sym) {
                *slot = Some(value);
                return;
            }
        }
        self.root.insert(sym, value);
    }

    /// Removes a binding; inside a frame that scopes the symbol this shadows
    /// it to unbound without touching the outer binding.
    pub fn unset(&mut self, sym: Symbol) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(&sym) {
                *slot = None;
                return;
            }
        }
        self.root.remove(&sym);
    }

    /// Enters a block scope shadowing `vars`.
    pub fn push_frame(&mut self, vars: impl IntoIterator<Item = (Symbol, Option<Expr>)>) {
        self.frames.push(ScopeFrame { vars: vars.into_iter().collect() });
    }

    /// Leaves the innermost block scope, restoring the shadowed bindings.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_shadowing_restores() {
        finch_interface::enter(|| {
            let mut scopes = ScopeStack::new();
            let x = Symbol::intern("x");
            scopes.set(x, Expr::int(5));

            scopes.push_frame([(x, Some(Expr::int(10)))]);
            assert_eq!(scopes.get(x), Some(Expr::int(10)));
            // Writes inside the block stay inside the block.
            scopes.set(x, Expr::int(11));
            assert_eq!(scopes.get(x), Some(Expr::int(11)));
            scopes.pop_frame();

            assert_eq!(scopes.get(x), Some(Expr::int(5)));
        });
    }

    #[test]
    fn shadow_to_unbound() {
        finch_interface::enter(|| {
            let mut scopes = ScopeStack::new();
            let x = Symbol::intern("x");
            scopes.set(x, Expr::int(5));
            scopes.push_frame([(x, None)]);
            assert_eq!(scopes.get(x), None);
            scopes.unset(x);
            assert_eq!(scopes.get(x), None);
            scopes.pop_frame();
            assert_eq!(scopes.get(x), Some(Expr::int(5)));
        });
    }
}
