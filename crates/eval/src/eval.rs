//! The fixed-point rewrite evaluator.
//!
//! A single evaluation step evaluates the head, evaluates arguments under the
//! hold policy, applies the attribute transforms (`Listable`, `Flat`,
//! `Orderless`, `OneIdentity`), and — once those reach a fixed shape —
//! dispatches the most specific matching rule. The outer loop re-evaluates
//! until the result stops changing; a depth counter and an iteration cap
//! bound recursion instead of any termination analysis.

use crate::{
    EvalResult, builtins,
    attr::{AttrTable, Attrs},
    pattern::{Bindings, Matcher},
    rules::{BuiltinFn, RuleBody, RuleOrigin, RuleTable},
    scope::ScopeStack,
    subst,
};
use finch_expr::{Call, ErrorKind, ErrorValue, Expr, ExprKind, FuncValue, TraceFrame, canonical_sort};
use finch_interface::{Session, Symbol, kw};
use tracing::trace;

/// One evaluator instance: a single-threaded evaluation chain over shared
/// attribute and rule tables.
///
/// Independent instances share only the session's symbol interner.
pub struct Evaluator<'sess> {
    pub sess: &'sess Session,
    pub attrs: AttrTable,
    pub rules: RuleTable,
    pub scopes: ScopeStack,
    stack: Vec<TraceFrame>,
}

impl<'sess> Evaluator<'sess> {
    /// Creates an evaluator with the builtin library installed.
    pub fn new(sess: &'sess Session) -> Self {
        let mut ev = Self {
            sess,
            attrs: AttrTable::new(),
            rules: RuleTable::new(),
            scopes: ScopeStack::new(),
            stack: Vec::new(),
        };
        builtins::install(&mut ev);
        ev
    }

    /// Evaluates an expression to its fixed point.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        if self.stack.len() >= self.sess.limits.recursion_limit {
            return Err(ErrorValue::new(
                ErrorKind::Recursion,
                format!(
                    "recursion depth limit of {} exceeded",
                    self.sess.limits.recursion_limit
                ),
            )
            .with_expr(expr.clone()));
        }
        self.stack.push(TraceFrame { name: frame_name(expr), expr: expr.clone() });
        let res = self.eval_fixed(expr);
        // The frame pops on every return path; errors pick it up as trace.
        let frame = self.stack.pop().expect("frame pushed above");
        res.map_err(|mut err| {
            err.push_frame(frame.name, frame.expr);
            err
        })
    }

    fn eval_fixed(&mut self, expr: &Expr) -> EvalResult {
        let limit = self.sess.limits.iteration_limit;
        let mut cur = expr.clone();
        for _ in 0..limit {
            let next = self.eval_once(&cur)?;
            if next == cur {
                return Ok(next);
            }
            cur = next;
        }
        Err(ErrorValue::new(
            ErrorKind::Recursion,
            format!("fixed-point iteration limit of {limit} exceeded"),
        )
        .with_expr(cur))
    }

    /// One step of the evaluation state machine.
    fn eval_once(&mut self, expr: &Expr) -> EvalResult {
        match expr.kind() {
            ExprKind::Symbol(s) => Ok(self.scopes.get(*s).unwrap_or_else(|| expr.clone())),
            ExprKind::Err(e) => Err((**e).clone()),
            ExprKind::Call(call) => self.eval_call(expr, call),
            // Numbers, strings, byte arrays, associations, and function
            // values are atomic.
            _ => Ok(expr.clone()),
        }
    }

    fn eval_call(&mut self, expr: &Expr, call: &Call) -> EvalResult {
        let head = self.eval(&call.head)?;

        if let ExprKind::Func(func) = head.kind() {
            return self.apply_function(&func.clone(), &call.args);
        }
        let Some(sym) = head.as_symbol() else {
            // Unreducible non-symbol head: evaluate the arguments and stop.
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(self.eval(arg)?);
            }
            return Ok(Expr::call(head, args));
        };

        let attrs = self.attrs.get(sym);
        let mut args = subst::splice_sequences(call).unwrap_or_else(|| call.args.clone());

        for (i, arg) in args.iter_mut().enumerate() {
            let held = attrs.contains(Attrs::HOLD_ALL)
                || (attrs.contains(Attrs::HOLD_FIRST) && i == 0)
                || (attrs.contains(Attrs::HOLD_REST) && i >= 1);
            if held {
                // `Evaluate(x)` forces evaluation inside a held position.
                let forced = arg
                    .as_call_to(kw::Evaluate)
                    .filter(|c| c.args.len() == 1)
                    .map(|c| c.args[0].clone());
                if let Some(inner) = forced {
                    *arg = self.eval(&inner)?;
                }
            } else {
                *arg = self.eval(arg)?;
            }
        }

        if attrs.contains(Attrs::LISTABLE)
            && let Some(threaded) = self.thread_listable(sym, &args)?
        {
            return Ok(threaded);
        }
        if attrs.contains(Attrs::FLAT) && args.iter().any(|a| a.as_call_to(sym).is_some()) {
            let mut flat = Vec::with_capacity(args.len());
            for arg in args {
                match arg.as_call_to(sym) {
                    Some(inner) => flat.extend(inner.args.iter().cloned()),
                    None => flat.push(arg),
                }
            }
            args = flat;
        }
        if attrs.contains(Attrs::ORDERLESS) {
            canonical_sort(&mut args);
        }
        if attrs.contains(Attrs::ONE_IDENTITY) && args.len() == 1 {
            return Ok(args.into_iter().next().expect("one argument"));
        }

        let current = Expr::call(head, args);
        if &current != expr {
            // Changed shape: re-enter the state machine on the new form.
            return Ok(current);
        }
        self.dispatch(sym, &current)
    }

    /// Rule dispatch: the first match in specificity order wins.
    fn dispatch(&mut self, sym: Symbol, expr: &Expr) -> EvalResult {
        let matched: Option<(RuleBody, Bindings)> = {
            let matcher = Matcher::new(&self.attrs);
            self.rules
                .rules_for(sym)
                .iter()
                .find_map(|rule| matcher.matches(&rule.pat, expr).map(|env| (rule.body.clone(), env)))
        };
        trace!(head = %sym, matched = matched.is_some(), "dispatch");
        match matched {
            None => Ok(expr.clone()),
            Some((RuleBody::Builtin(f), _)) => {
                let args = expr.as_call().map(|c| c.args.as_slice()).unwrap_or_default();
                f(self, args)
            }
            Some((RuleBody::Rewrite(body), env)) => Ok(subst::bindings(&body, &env)),
        }
    }

    /// Applies a function value: arguments evaluate (no hold policy), then
    /// slots or named parameters substitute into the body, which the outer
    /// loop re-evaluates.
    fn apply_function(&mut self, func: &FuncValue, raw_args: &[Expr]) -> EvalResult {
        let mut args = Vec::with_capacity(raw_args.len());
        for arg in raw_args {
            args.push(self.eval(arg)?);
        }
        match &func.params {
            None => subst::slots(&func.body, &args),
            Some(params) => {
                if params.len() != args.len() {
                    return Err(ErrorValue::new(
                        ErrorKind::Argument,
                        format!(
                            "function expects {} argument(s), got {}",
                            params.len(),
                            args.len()
                        ),
                    )
                    .with_expr(Expr::func(func.clone())));
                }
                let map = params.iter().copied().zip(args).collect();
                Ok(subst::symbols(&func.body, &map))
            }
        }
    }

    /// `Listable` threading: element-wise over `List` arguments, which must
    /// all have the same length.
    fn thread_listable(
        &mut self,
        sym: Symbol,
        args: &[Expr],
    ) -> Result<Option<Expr>, ErrorValue> {
        let mut len = None;
        for arg in args {
            if let Some(list) = arg.as_call_to(kw::List) {
                match len {
                    None => len = Some(list.args.len()),
                    Some(n) if n == list.args.len() => {}
                    Some(n) => {
                        return Err(ErrorValue::new(
                            ErrorKind::Argument,
                            format!(
                                "cannot thread `{sym}` over lists of lengths {n} and {}",
                                list.args.len()
                            ),
                        ));
                    }
                }
            }
        }
        let Some(n) = len else { return Ok(None) };
        let items = (0..n)
            .map(|i| {
                Expr::call_sym(
                    sym,
                    args.iter()
                        .map(|arg| match arg.as_call_to(kw::List) {
                            Some(list) => list.args[i].clone(),
                            None => arg.clone(),
                        })
                        .collect(),
                )
            })
            .collect();
        Ok(Some(Expr::list(items)))
    }

    // Definition plumbing shared by the assignment builtins.

    /// Errors out if `sym` is protected.
    pub(crate) fn check_writable(&self, sym: Symbol) -> Result<(), ErrorValue> {
        if self.attrs.has(sym, Attrs::PROTECTED) {
            return Err(ErrorValue::new(
                ErrorKind::Protected,
                format!("symbol `{sym}` is protected"),
            )
            .with_expr(Expr::symbol(sym)));
        }
        Ok(())
    }

    /// Binds a symbol, respecting protection.
    pub(crate) fn bind_symbol(&mut self, sym: Symbol, value: Expr) -> Result<(), ErrorValue> {
        self.check_writable(sym)?;
        self.scopes.set(sym, value);
        Ok(())
    }

    /// Registers a user rewrite rule, respecting protection of the outer
    /// symbol.
    pub(crate) fn define_rule(&mut self, pattern: Expr, body: Expr) -> Result<(), ErrorValue> {
        if let Some(outer) = pattern.as_call().and_then(|c| c.head_symbol()) {
            self.check_writable(outer)?;
        }
        self.rules.register(pattern, RuleBody::Rewrite(body), RuleOrigin::User)
    }

    pub(crate) fn register_builtin(&mut self, pattern: Expr, f: BuiltinFn) {
        self.rules
            .register(pattern, RuleBody::Builtin(f), RuleOrigin::Builtin)
            .expect("builtin rule pattern");
    }
}

/// The function name recorded in a stack frame.
fn frame_name(expr: &Expr) -> Symbol {
    match expr.kind() {
        ExprKind::Call(c) => c.head_symbol().unwrap_or(Symbol::DUMMY),
        _ => Symbol::DUMMY,
    }
}
