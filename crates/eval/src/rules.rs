//! The rewrite-rule registry.
//!
//! Rules are keyed by the outer symbol of their pattern. Per symbol, rules
//! are kept sorted by descending specificity with the printed pattern form as
//! the deterministic tie-breaker; registering a pattern structurally equal to
//! an existing one replaces that rule in place.

use crate::{EvalResult, Evaluator, pattern::Pat, specificity};
use finch_expr::{ErrorKind, ErrorValue, Expr};
use finch_interface::{Symbol, map::FxHashMap};

/// A builtin rule handler. Receives the evaluated (and attribute-transformed)
/// argument list of the call being dispatched.
pub type BuiltinFn = fn(&mut Evaluator<'_>, &[Expr]) -> EvalResult;

/// The right-hand side of a rule.
#[derive(Clone)]
pub enum RuleBody {
    /// A rewrite: bindings are substituted into the body, which is then
    /// re-evaluated.
    Rewrite(Expr),
    /// A native handler.
    Builtin(BuiltinFn),
}

/// Where a rule came from. User rules can be cleared wholesale; builtin
/// rules cannot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleOrigin {
    Builtin,
    User,
}

/// A registered rewrite rule.
#[derive(Clone)]
pub struct Rule {
    /// The pattern as written.
    pub pattern: Expr,
    /// The compiled pattern tree.
    pub pat: Pat,
    pub body: RuleBody,
    pub score: u64,
    pub origin: RuleOrigin,
    /// The printed pattern, used as the deterministic tie-breaker.
    key: String,
}

/// Per-symbol ordered rule lists.
#[derive(Default)]
pub struct RuleTable {
    rules: FxHashMap<Symbol, Vec<Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under the outer symbol of `pattern`.
    ///
    /// A structurally equal pattern replaces the existing rule; otherwise the
    /// rule is inserted in rank order.
    pub fn register(
        &mut self,
        pattern: Expr,
        body: RuleBody,
        origin: RuleOrigin,
    ) -> Result<(), ErrorValue> {
        let Some(outer) = pattern.as_call().and_then(|c| c.head_symbol()) else {
            return Err(ErrorValue::new(
                ErrorKind::Definition,
                format!("rule pattern must be a call with a symbol head, got `{pattern}`"),
            )
            .with_expr(pattern));
        };
        let pat = Pat::compile(&pattern);
        let rule = Rule {
            key: pattern.to_string(),
            score: specificity::score(&pat),
            pattern,
            pat,
            body,
            origin,
        };
        let list = self.rules.entry(outer).or_default();
        if let Some(existing) = list.iter_mut().find(|r| r.pattern == rule.pattern) {
            *existing = rule;
        } else {
            list.push(rule);
            list.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        }
        Ok(())
    }

    /// The rules for a symbol, in dispatch order.
    pub fn rules_for(&self, sym: Symbol) -> &[Rule] {
        self.rules.get(&sym).map_or(&[], Vec::as_slice)
    }

    /// Drops every user-registered rule for `sym`.
    pub fn clear_user_rules(&mut self, sym: Symbol) {
        if let Some(list) = self.rules.get_mut(&sym) {
            list.retain(|r| r.origin == RuleOrigin::Builtin);
            if list.is_empty() {
                self.rules.remove(&sym);
            }
        }
    }

    /// Returns `true` if the symbol has any user-registered rule.
    pub fn has_user_rules(&self, sym: Symbol) -> bool {
        self.rules_for(sym).iter().any(|r| r.origin == RuleOrigin::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_parse::parse_expr;

    fn pattern(src: &str) -> Expr {
        parse_expr(src).unwrap()
    }

    #[test]
    fn ranked_and_replaced() {
        finch_interface::enter(|| {
            let mut table = RuleTable::new();
            let f = Symbol::intern("f");
            let any = pattern("f(_)");
            let int = pattern("f(_Integer)");
            // Register the less specific rule first; dispatch order is by
            // score regardless.
            table
                .register(any.clone(), RuleBody::Rewrite(Expr::string("any")), RuleOrigin::User)
                .unwrap();
            table
                .register(int.clone(), RuleBody::Rewrite(Expr::string("int")), RuleOrigin::User)
                .unwrap();
            let rules = table.rules_for(f);
            assert_eq!(rules.len(), 2);
            assert_eq!(rules[0].pattern, int);
            assert_eq!(rules[1].pattern, any);

            // Same pattern replaces in place.
            table
                .register(int.clone(), RuleBody::Rewrite(Expr::string("int2")), RuleOrigin::User)
                .unwrap();
            assert_eq!(table.rules_for(f).len(), 2);
        });
    }

    #[test]
    fn rejects_non_call_patterns() {
        finch_interface::enter(|| {
            let mut table = RuleTable::new();
            let err = table
                .register(Expr::int(3), RuleBody::Rewrite(Expr::int(4)), RuleOrigin::User)
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Definition);
        });
    }
}
