use super::{PResult, Parser};
use crate::token::{Delimiter, TokenKind};
use finch_expr::Expr;
use finch_interface::{Symbol, kw};

const OPEN_PAREN: TokenKind = TokenKind::OpenDelim(Delimiter::Parenthesis);
const CLOSE_PAREN: TokenKind = TokenKind::CloseDelim(Delimiter::Parenthesis);
const OPEN_BRACKET: TokenKind = TokenKind::OpenDelim(Delimiter::Bracket);
const CLOSE_BRACKET: TokenKind = TokenKind::CloseDelim(Delimiter::Bracket);

impl Parser {
    /// Parses an expression.
    ///
    /// Precedence, loosest first: `;` < assignment (`=`, `:=`, `=.`) <
    /// postfix `&` < rules (`:`, `:>`) < `||` < `&&` < comparisons < `+` `-`
    /// < `*` `/` < prefix `-`/`!` < `^` < call/index postfix.
    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_seq()
    }

    /// `a; b; c`, with a trailing `;` yielding `Null` as the last statement.
    fn parse_seq(&mut self) -> PResult<Expr> {
        let first = self.parse_assign()?;
        if !self.check(&TokenKind::Semi) {
            return Ok(first);
        }
        let mut stmts = vec![first];
        while self.eat(&TokenKind::Semi) {
            if self.at_seq_end() {
                stmts.push(Expr::null());
                break;
            }
            stmts.push(self.parse_assign()?);
        }
        Ok(Expr::call_sym(kw::CompoundExpression, stmts))
    }

    fn at_seq_end(&self) -> bool {
        matches!(
            self.token().kind,
            TokenKind::Eof | TokenKind::CloseDelim(_) | TokenKind::Comma
        )
    }

    fn parse_assign(&mut self) -> PResult<Expr> {
        let lhs = self.parse_function_postfix()?;
        if self.eat(&TokenKind::Eq) {
            let rhs = self.parse_assign()?;
            return Ok(assignment(lhs, rhs));
        }
        if self.eat(&TokenKind::ColonEq) {
            let rhs = self.parse_assign()?;
            return Ok(Expr::call_sym(kw::SetDelayed, vec![lhs, rhs]));
        }
        if self.eat(&TokenKind::EqDot) {
            return Ok(Expr::call_sym(kw::Unset, vec![lhs]));
        }
        Ok(lhs)
    }

    /// A trailing `&` wraps everything parsed so far into a slot function.
    fn parse_function_postfix(&mut self) -> PResult<Expr> {
        let mut e = self.parse_rule()?;
        while self.eat(&TokenKind::Amp) {
            e = Expr::call_sym(kw::Function, vec![e]);
        }
        Ok(e)
    }

    fn parse_rule(&mut self) -> PResult<Expr> {
        let lhs = self.parse_or()?;
        if self.eat(&TokenKind::Colon) {
            let rhs = self.parse_rule()?;
            return Ok(Expr::call_sym(kw::Rule, vec![lhs, rhs]));
        }
        if self.eat(&TokenKind::ColonGt) {
            let rhs = self.parse_rule()?;
            return Ok(Expr::call_sym(kw::RuleDelayed, vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let first = self.parse_and()?;
        if !self.check(&TokenKind::OrOr) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::OrOr) {
            items.push(self.parse_and()?);
        }
        Ok(Expr::call_sym(kw::Or, items))
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let first = self.parse_compare()?;
        if !self.check(&TokenKind::AndAnd) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::AndAnd) {
            items.push(self.parse_compare()?);
        }
        Ok(Expr::call_sym(kw::And, items))
    }

    /// Comparisons; a chain of one repeated operator becomes a single
    /// variadic call, `a < b < c` parsing as `Less(a, b, c)`.
    fn parse_compare(&mut self) -> PResult<Expr> {
        let mut e = self.parse_addsub()?;
        while let Some(head) = compare_head(&self.token().kind) {
            self.bump();
            let mut items = vec![e, self.parse_addsub()?];
            while compare_head(&self.token().kind) == Some(head) {
                self.bump();
                items.push(self.parse_addsub()?);
            }
            e = Expr::call_sym(head, items);
        }
        Ok(e)
    }

    fn parse_addsub(&mut self) -> PResult<Expr> {
        let mut e = self.parse_muldiv()?;
        loop {
            if self.eat(&TokenKind::Plus) {
                let rhs = self.parse_muldiv()?;
                e = Expr::call_sym(kw::Plus, vec![e, rhs]);
            } else if self.eat(&TokenKind::Minus) {
                let rhs = self.parse_muldiv()?;
                e = Expr::call_sym(kw::Subtract, vec![e, rhs]);
            } else {
                return Ok(e);
            }
        }
    }

    fn parse_muldiv(&mut self) -> PResult<Expr> {
        let mut e = self.parse_unary()?;
        loop {
            if self.eat(&TokenKind::Star) {
                let rhs = self.parse_unary()?;
                e = Expr::call_sym(kw::Times, vec![e, rhs]);
            } else if self.eat(&TokenKind::Slash) {
                let rhs = self.parse_unary()?;
                e = Expr::call_sym(kw::Divide, vec![e, rhs]);
            } else {
                return Ok(e);
            }
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(negate(operand));
        }
        if self.eat(&TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::call_sym(kw::Not, vec![operand]));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> PResult<Expr> {
        let base = self.parse_postfix()?;
        if self.eat(&TokenKind::Caret) {
            // Right-associative, and the exponent may carry a sign: `2^-3`.
            let exp = self.parse_unary()?;
            return Ok(Expr::call_sym(kw::Power, vec![base, exp]));
        }
        Ok(base)
    }

    /// Call and index postfix forms, tightest-binding.
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut e = self.parse_primary()?;
        loop {
            if self.check(&OPEN_PAREN) {
                let args = self.parse_delimited(Delimiter::Parenthesis)?;
                e = Expr::call(e, args);
            } else if self.check(&OPEN_BRACKET) {
                e = self.parse_index(e)?;
            } else {
                return Ok(e);
            }
        }
    }

    /// `e[i]`, `e[i, j]`, `e[a:b]`, `e[a:]`, `e[:b]`.
    fn parse_index(&mut self, target: Expr) -> PResult<Expr> {
        self.expect(&OPEN_BRACKET)?;
        if self.eat(&TokenKind::Colon) {
            // e[:b]
            let end = self.parse_or()?;
            self.expect(&CLOSE_BRACKET)?;
            return Ok(Expr::call_sym(kw::Take, vec![target, end]));
        }
        let first = self.parse_or()?;
        if self.eat(&TokenKind::Colon) {
            if self.eat(&CLOSE_BRACKET) {
                // e[a:]
                return Ok(Expr::call_sym(kw::TakeFrom, vec![target, first]));
            }
            let end = self.parse_or()?;
            self.expect(&CLOSE_BRACKET)?;
            return Ok(Expr::call_sym(kw::SliceRange, vec![target, first, end]));
        }
        let mut indices = vec![target, first];
        while self.eat(&TokenKind::Comma) {
            indices.push(self.parse_or()?);
        }
        self.expect(&CLOSE_BRACKET)?;
        Ok(Expr::call_sym(kw::Part, indices))
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let kind = self.token().kind.clone();
        match kind {
            TokenKind::Int(i) => {
                self.bump();
                Ok(Expr::int(i))
            }
            TokenKind::Real(r) => {
                self.bump();
                Ok(Expr::machine_real(r))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Expr::string(s))
            }
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Expr::symbol(name))
            }
            TokenKind::Pattern { name, blanks, ty } => {
                self.bump();
                Ok(pattern_expr(name, blanks, ty))
            }
            TokenKind::OpenDelim(Delimiter::Parenthesis) => {
                self.bump();
                let e = self.parse_expr()?;
                self.expect(&CLOSE_PAREN)?;
                Ok(e)
            }
            TokenKind::OpenDelim(Delimiter::Bracket) => {
                let items = self.parse_delimited(Delimiter::Bracket)?;
                Ok(Expr::list(items))
            }
            TokenKind::OpenDelim(Delimiter::Brace) => {
                let items = self.parse_delimited(Delimiter::Brace)?;
                Ok(Expr::call_sym(kw::Association, items))
            }
            _ => self.unexpected(),
        }
    }

    /// Parses `open item, item, ... close`; the list may be empty.
    fn parse_delimited(&mut self, delim: Delimiter) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::OpenDelim(delim))?;
        let close = TokenKind::CloseDelim(delim);
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&close)?;
            return Ok(items);
        }
    }
}

/// Builds the canonical form of an assignment, turning index and slice
/// targets into `PartSet` / `SliceSet`.
fn assignment(lhs: Expr, rhs: Expr) -> Expr {
    if let Some(call) = lhs.as_call_to(kw::Part) {
        let mut args = call.args.clone();
        args.push(rhs);
        return Expr::call_sym(kw::PartSet, args);
    }
    if let Some(call) = lhs.as_call_to(kw::SliceRange) {
        let [t, a, b] = call.args.as_slice() else {
            return Expr::call_sym(kw::Set, vec![lhs, rhs]);
        };
        return Expr::call_sym(kw::SliceSet, vec![t.clone(), a.clone(), b.clone(), rhs]);
    }
    if let Some(call) = lhs.as_call_to(kw::TakeFrom) {
        let [t, a] = call.args.as_slice() else {
            return Expr::call_sym(kw::Set, vec![lhs, rhs]);
        };
        return Expr::call_sym(kw::SliceSet, vec![t.clone(), a.clone(), Expr::null(), rhs]);
    }
    if let Some(call) = lhs.as_call_to(kw::Take) {
        let [t, b] = call.args.as_slice() else {
            return Expr::call_sym(kw::Set, vec![lhs, rhs]);
        };
        return Expr::call_sym(kw::SliceSet, vec![t.clone(), Expr::null(), b.clone(), rhs]);
    }
    Expr::call_sym(kw::Set, vec![lhs, rhs])
}

fn compare_head(kind: &TokenKind) -> Option<Symbol> {
    Some(match kind {
        TokenKind::EqEq => kw::Equal,
        TokenKind::Ne => kw::Unequal,
        TokenKind::Lt => kw::Less,
        TokenKind::Gt => kw::Greater,
        TokenKind::Le => kw::LessEqual,
        TokenKind::Ge => kw::GreaterEqual,
        TokenKind::TripleEq => kw::SameQ,
        TokenKind::EqBangEq => kw::UnsameQ,
        _ => return None,
    })
}

/// Negates numeric literals in place; everything else becomes `Minus(x)`.
fn negate(operand: Expr) -> Expr {
    if let Some(i) = operand.as_int() {
        return Expr::int(-i);
    }
    if let Some(r) = operand.as_real() {
        return Expr::real(r.neg());
    }
    Expr::call_sym(kw::Minus, vec![operand])
}

fn pattern_expr(name: Option<Symbol>, blanks: u8, ty: Option<Symbol>) -> Expr {
    let blank_head = match blanks {
        1 => kw::Blank,
        2 => kw::BlankSequence,
        _ => kw::BlankNullSequence,
    };
    let blank_args = match ty {
        Some(ty) => vec![Expr::symbol(ty)],
        None => Vec::new(),
    };
    let blank = Expr::call_sym(blank_head, blank_args);
    match name {
        Some(name) => Expr::call_sym(kw::Pattern, vec![Expr::symbol(name), blank]),
        None => blank,
    }
}
