//! The pattern matcher.
//!
//! Patterns are expressed in the algebra itself (`Blank(T)`,
//! `BlankSequence()`, `Pattern(name, ...)`, and structural compounds) and are
//! compiled to a [`Pat`] tree before matching. Matching is a recursive
//! back-tracking walk threading a binding environment; sequence patterns open
//! a choice point over how many subject elements they consume, greedy from
//! the longest run. Matching never mutates the subject.

use crate::attr::{AttrTable, Attrs};
use finch_expr::{Expr, ExprKind};
use finch_interface::{Symbol, kw, map::FxIndexMap};

/// A compiled pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Pat {
    /// Matches by structural equality.
    Literal(Expr),
    /// `Blank()` / `Blank(T)`: any one expression, optionally head-guarded.
    Blank(Option<Symbol>),
    /// `BlankSequence(T?)` (`min == 1`) or `BlankNullSequence(T?)`
    /// (`min == 0`).
    Seq { ty: Option<Symbol>, min: usize },
    /// `Pattern(name, sub)`: a named capture; repeated occurrences of the
    /// name must bind structurally equal values.
    Named { name: Symbol, pat: Box<Pat> },
    /// Any other compound: head and arguments match structurally, with
    /// sequence patterns consuming multiple positions.
    Compound { head: Box<Pat>, args: Vec<Pat> },
}

impl Pat {
    /// Compiles a pattern expression.
    pub fn compile(e: &Expr) -> Self {
        if let Some(call) = e.as_call() {
            match call.head_symbol() {
                Some(s) if s == kw::Blank && call.args.len() <= 1 => {
                    if let Some(ty) = type_arg(&call.args) {
                        return Self::Blank(ty);
                    }
                }
                Some(s) if s == kw::BlankSequence && call.args.len() <= 1 => {
                    if let Some(ty) = type_arg(&call.args) {
                        return Self::Seq { ty, min: 1 };
                    }
                }
                Some(s) if s == kw::BlankNullSequence && call.args.len() <= 1 => {
                    if let Some(ty) = type_arg(&call.args) {
                        return Self::Seq { ty, min: 0 };
                    }
                }
                Some(s) if s == kw::Pattern && call.args.len() == 2 => {
                    if let Some(name) = call.args[0].as_symbol() {
                        return Self::Named {
                            name,
                            pat: Box::new(Self::compile(&call.args[1])),
                        };
                    }
                }
                _ => {}
            }
            return Self::Compound {
                head: Box::new(Self::compile(&call.head)),
                args: call.args.iter().map(Self::compile).collect(),
            };
        }
        Self::Literal(e.clone())
    }

    /// Whether this pattern consumes a variable-length run of arguments.
    fn as_seq(&self) -> Option<(Option<Symbol>, usize, Option<Symbol>)> {
        match self {
            Self::Seq { ty, min } => Some((*ty, *min, None)),
            Self::Named { name, pat } => match &**pat {
                Self::Seq { ty, min } => Some((*ty, *min, Some(*name))),
                _ => None,
            },
            _ => None,
        }
    }

    /// The minimum number of argument positions this pattern consumes.
    fn min_len(&self) -> usize {
        match self.as_seq() {
            Some((_, min, _)) => min,
            None => 1,
        }
    }
}

fn type_arg(args: &[Expr]) -> Option<Option<Symbol>> {
    match args {
        [] => Some(None),
        [ty] => ty.as_symbol().map(Some),
        _ => None,
    }
}

/// A captured value: one expression, or a run captured by a sequence
/// pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Single(Expr),
    Sequence(Vec<Expr>),
}

/// The binding environment, ordered by first capture.
pub type Bindings = FxIndexMap<Symbol, Binding>;

/// The matcher. It consults the attribute table for `Orderless` and `Flat`
/// heads.
pub struct Matcher<'a> {
    attrs: &'a AttrTable,
}

impl<'a> Matcher<'a> {
    pub fn new(attrs: &'a AttrTable) -> Self {
        Self { attrs }
    }

    /// Matches `subject` against `pat`, returning the bindings on success.
    pub fn matches(&self, pat: &Pat, subject: &Expr) -> Option<Bindings> {
        let mut env = Bindings::default();
        self.match_expr(pat, subject, &mut env).then_some(env)
    }

    fn match_expr(&self, pat: &Pat, subject: &Expr, env: &mut Bindings) -> bool {
        match pat {
            Pat::Literal(lit) => lit == subject,
            Pat::Blank(ty) => ty.is_none_or(|t| head_matches(subject, t)),
            // A sequence pattern standing alone matches a run of exactly one.
            Pat::Seq { ty, .. } => ty.is_none_or(|t| head_matches(subject, t)),
            Pat::Named { name, pat } => {
                if !self.match_expr(pat, subject, env) {
                    return false;
                }
                self.bind(*name, Binding::Single(subject.clone()), env)
            }
            Pat::Compound { head, args } => {
                let Some(call) = subject.as_call() else { return false };
                if !self.match_expr(head, &call.head, env) {
                    return false;
                }
                let head_sym = call.head_symbol();
                let flat = head_sym
                    .filter(|s| self.attrs.has(*s, Attrs::FLAT));
                if head_sym.is_some_and(|s| self.attrs.has(s, Attrs::ORDERLESS)) {
                    self.match_args_orderless(args, &call.args, env, flat)
                } else {
                    self.match_args(args, &call.args, env, flat)
                }
            }
        }
    }

    /// Left-to-right argument matching with back-tracking over sequence
    /// lengths.
    fn match_args(
        &self,
        pats: &[Pat],
        subjects: &[Expr],
        env: &mut Bindings,
        flat: Option<Symbol>,
    ) -> bool {
        let Some((pat, rest_pats)) = pats.split_first() else {
            return subjects.is_empty();
        };
        if let Some((ty, min, name)) = pat.as_seq() {
            let rest_min: usize = rest_pats.iter().map(Pat::min_len).sum();
            let max_take = subjects.len().saturating_sub(rest_min);
            if max_take < min {
                return false;
            }
            // Greedy: start from the longest run and shrink on failure.
            for take in (min..=max_take).rev() {
                let (run, remaining) = subjects.split_at(take);
                if !run.iter().all(|s| ty.is_none_or(|t| head_matches(s, t))) {
                    continue;
                }
                let mut attempt = env.clone();
                let bound = match name {
                    Some(name) => self.bind(name, seq_binding(run, flat), &mut attempt),
                    None => true,
                };
                if bound && self.match_args(rest_pats, remaining, &mut attempt, flat) {
                    *env = attempt;
                    return true;
                }
            }
            return false;
        }
        let Some((subject, remaining)) = subjects.split_first() else {
            return false;
        };
        let mut attempt = env.clone();
        if self.match_expr(pat, subject, &mut attempt)
            && self.match_args(rest_pats, remaining, &mut attempt, flat)
        {
            *env = attempt;
            return true;
        }
        false
    }

    /// Matching under an `Orderless` head.
    ///
    /// The subject is already canonically sorted by the evaluator. Fixed
    /// patterns back-track over subject positions; the positions left over
    /// are then consumed, in order, by the sequence patterns. Exhaustive
    /// permutation of sequence splits is not attempted.
    fn match_args_orderless(
        &self,
        pats: &[Pat],
        subjects: &[Expr],
        env: &mut Bindings,
        flat: Option<Symbol>,
    ) -> bool {
        let singles: Vec<&Pat> = pats.iter().filter(|p| p.as_seq().is_none()).collect();
        let seqs: Vec<Pat> =
            pats.iter().filter(|p| p.as_seq().is_some()).cloned().collect();
        if singles.len() > subjects.len() {
            return false;
        }
        let mut used = vec![false; subjects.len()];
        self.assign_singles(&singles, &seqs, subjects, &mut used, env, flat)
    }

    fn assign_singles(
        &self,
        singles: &[&Pat],
        seqs: &[Pat],
        subjects: &[Expr],
        used: &mut Vec<bool>,
        env: &mut Bindings,
        flat: Option<Symbol>,
    ) -> bool {
        let Some((pat, rest)) = singles.split_first() else {
            let remaining: Vec<Expr> = subjects
                .iter()
                .zip(used.iter())
                .filter(|(_, used)| !**used)
                .map(|(s, _)| s.clone())
                .collect();
            return self.match_args(seqs, &remaining, env, flat);
        };
        for i in 0..subjects.len() {
            if used[i] {
                continue;
            }
            let mut attempt = env.clone();
            if self.match_expr(pat, &subjects[i], &mut attempt) {
                used[i] = true;
                if self.assign_singles(rest, seqs, subjects, used, &mut attempt, flat) {
                    *env = attempt;
                    return true;
                }
                used[i] = false;
            }
        }
        false
    }

    /// Installs a binding, enforcing consistency with prior captures of the
    /// same name.
    fn bind(&self, name: Symbol, value: Binding, env: &mut Bindings) -> bool {
        match env.get(&name) {
            Some(prior) => *prior == value,
            None => {
                env.insert(name, value);
                true
            }
        }
    }
}

/// Captures a run for a sequence pattern. Under a `Flat` head, a
/// multi-element slice is captured as a compound of that head.
fn seq_binding(run: &[Expr], flat: Option<Symbol>) -> Binding {
    match flat {
        Some(head) if run.len() > 1 => {
            Binding::Single(Expr::call_sym(head, run.to_vec()))
        }
        Some(_) if run.len() == 1 => Binding::Single(run[0].clone()),
        _ => Binding::Sequence(run.to_vec()),
    }
}

/// Head type guards; `Number` is the union of the numeric kinds.
fn head_matches(subject: &Expr, ty: Symbol) -> bool {
    if ty == kw::Number {
        return subject.is_number();
    }
    match subject.kind() {
        ExprKind::Call(c) => c.head_symbol() == Some(ty),
        _ => subject.head().as_symbol() == Some(ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_parse::parse_expr;

    fn compile(src: &str) -> Pat {
        Pat::compile(&parse_expr(src).unwrap())
    }

    fn subject(src: &str) -> Expr {
        parse_expr(src).unwrap()
    }

    fn try_match(pat: &str, subj: &str) -> Option<Bindings> {
        let attrs = AttrTable::new();
        Matcher::new(&attrs).matches(&compile(pat), &subject(subj))
    }

    fn binding(env: &Bindings, name: &str) -> Binding {
        env.get(&Symbol::intern(name)).expect("binding").clone()
    }

    #[test]
    fn literals_and_blanks() {
        finch_interface::enter(|| {
            assert!(try_match("f(1)", "f(1)").is_some());
            assert!(try_match("f(1)", "f(2)").is_none());
            assert!(try_match("f(_)", "f(anything)").is_some());
            assert!(try_match("f(_Integer)", "f(3)").is_some());
            assert!(try_match("f(_Integer)", "f(3.5)").is_none());
            assert!(try_match("f(_Number)", "f(3.5)").is_some());
            assert!(try_match("f(_List)", "f([1])").is_some());
        });
    }

    #[test]
    fn named_captures() {
        finch_interface::enter(|| {
            let env = try_match("f(x_Integer)", "f(7)").unwrap();
            assert_eq!(binding(&env, "x"), Binding::Single(Expr::int(7)));
            // Repeated names must bind the same value.
            assert!(try_match("f(x_, x_)", "f(1, 1)").is_some());
            assert!(try_match("f(x_, x_)", "f(1, 2)").is_none());
        });
    }

    #[test]
    fn sequences() {
        finch_interface::enter(|| {
            let env = try_match("f(xs__)", "f(1, 2, 3)").unwrap();
            assert_eq!(
                binding(&env, "xs"),
                Binding::Sequence(vec![Expr::int(1), Expr::int(2), Expr::int(3)])
            );
            // `__` needs at least one element; `___` matches the empty run.
            assert!(try_match("f(xs__)", "f()").is_none());
            assert!(try_match("f(xs___)", "f()").is_some());
            // Greedy from the longest: the first sequence takes two.
            let env = try_match("f(xs__, y_)", "f(1, 2, 3)").unwrap();
            assert_eq!(
                binding(&env, "xs"),
                Binding::Sequence(vec![Expr::int(1), Expr::int(2)])
            );
            assert_eq!(binding(&env, "y"), Binding::Single(Expr::int(3)));
            // Typed sequences shrink until the guard holds.
            let env = try_match("f(xs__Integer, rest___)", "f(1, 2, x)").unwrap();
            assert_eq!(
                binding(&env, "xs"),
                Binding::Sequence(vec![Expr::int(1), Expr::int(2)])
            );
        });
    }

    #[test]
    fn nested_structure() {
        finch_interface::enter(|| {
            let env = try_match("f(g(x_), x_)", "f(g(2), 2)").unwrap();
            assert_eq!(binding(&env, "x"), Binding::Single(Expr::int(2)));
            assert!(try_match("f(g(x_), x_)", "f(g(2), 3)").is_none());
        });
    }

    #[test]
    fn empty_argument_lists() {
        finch_interface::enter(|| {
            // Only all-nullable patterns match an empty argument list.
            assert!(try_match("f(___)", "f()").is_some());
            assert!(try_match("f(___, ___)", "f()").is_some());
            assert!(try_match("f(_)", "f()").is_none());
        });
    }

    #[test]
    fn orderless_matching() {
        finch_interface::enter(|| {
            let mut attrs = AttrTable::new();
            let f = Symbol::intern("f");
            attrs.set(f, Attrs::ORDERLESS);
            let m = Matcher::new(&attrs);
            // The integer guard picks the right argument regardless of
            // position.
            let env =
                m.matches(&compile("f(x_Integer, y_Symbol)"), &subject("f(a, 2)")).unwrap();
            assert_eq!(binding(&env, "x"), Binding::Single(Expr::int(2)));
            assert!(
                m.matches(&compile("f(x_Integer, y_Integer)"), &subject("f(a, 2)")).is_none()
            );
        });
    }

    #[test]
    fn flat_sequence_capture() {
        finch_interface::enter(|| {
            let mut attrs = AttrTable::new();
            let f = Symbol::intern("f");
            attrs.set(f, Attrs::FLAT);
            let m = Matcher::new(&attrs);
            let env = m.matches(&compile("f(xs__, y_)"), &subject("f(1, 2, 3)")).unwrap();
            // Multi-element slices come back wrapped in the flat head.
            assert_eq!(binding(&env, "xs"), Binding::Single(subject("f(1, 2)")));
            assert_eq!(binding(&env, "y"), Binding::Single(Expr::int(3)));
        });
    }

    #[test]
    fn determinism() {
        finch_interface::enter(|| {
            let a = try_match("f(xs___, ys___)", "f(1, 2)").unwrap();
            let b = try_match("f(xs___, ys___)", "f(1, 2)").unwrap();
            assert_eq!(a, b);
            // Greedy: the first nullable sequence takes everything.
            assert_eq!(
                binding(&a, "xs"),
                Binding::Sequence(vec![Expr::int(1), Expr::int(2)])
            );
            assert_eq!(binding(&a, "ys"), Binding::Sequence(vec![]));
        });
    }
}
