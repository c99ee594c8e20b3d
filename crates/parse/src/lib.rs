//! Surface-syntax parsing for the finch kernel.
//!
//! The parser yields expressions of the algebra directly; infix operators
//! map to their canonical heads (`+` to `Plus`, `:=` to `SetDelayed`, ...)
//! and nothing is evaluated. [`ParseError::incomplete`] distinguishes
//! unterminated constructs so the REPL and the batch executor can accumulate
//! continuation lines.

pub mod lexer;
pub mod token;

mod parser;
pub use parser::Parser;

use finch_expr::Expr;

/// A parse failure.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the source.
    pub pos: usize,
    /// The input ended inside an unterminated construct; more lines may
    /// complete it.
    pub incomplete: bool,
}

/// Parses a single expression spanning the whole input.
pub fn parse_expr(src: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    if !parser.at_eof() {
        return parser.unexpected();
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_expr::ExprKind;
    use finch_interface::{Symbol, kw};

    fn parse(src: &str) -> Expr {
        parse_expr(src).unwrap()
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(Symbol::intern(name))
    }

    #[test]
    fn calls_and_lists() {
        finch_interface::enter(|| {
            assert_eq!(
                parse("f(1, x)"),
                Expr::call(sym("f"), vec![Expr::int(1), sym("x")])
            );
            assert_eq!(
                parse("[1, 2]"),
                Expr::list(vec![Expr::int(1), Expr::int(2)])
            );
            assert_eq!(parse("f()"), Expr::call(sym("f"), vec![]));
            // Compound heads: f(x)(y).
            let inner = Expr::call(sym("f"), vec![sym("x")]);
            assert_eq!(parse("f(x)(y)"), Expr::call(inner, vec![sym("y")]));
        });
    }

    #[test]
    fn infix_operators() {
        finch_interface::enter(|| {
            assert_eq!(
                parse("a + b * c"),
                Expr::call_sym(
                    kw::Plus,
                    vec![
                        sym("a"),
                        Expr::call_sym(kw::Times, vec![sym("b"), sym("c")]),
                    ]
                )
            );
            assert_eq!(
                parse("a - b"),
                Expr::call_sym(kw::Subtract, vec![sym("a"), sym("b")])
            );
            // Power is right-associative and binds tighter than unary minus.
            assert_eq!(
                parse("-a^2"),
                Expr::call_sym(
                    kw::Minus,
                    vec![Expr::call_sym(kw::Power, vec![sym("a"), Expr::int(2)])]
                )
            );
            assert_eq!(
                parse("2^3^2"),
                Expr::call_sym(
                    kw::Power,
                    vec![
                        Expr::int(2),
                        Expr::call_sym(kw::Power, vec![Expr::int(3), Expr::int(2)]),
                    ]
                )
            );
            assert_eq!(parse("2^-3").to_string(), "Power(2, -3)");
        });
    }

    #[test]
    fn assignment_and_rules() {
        finch_interface::enter(|| {
            assert_eq!(
                parse("x = 5"),
                Expr::call_sym(kw::Set, vec![sym("x"), Expr::int(5)])
            );
            assert_eq!(
                parse("f(x_) := x"),
                Expr::call_sym(
                    kw::SetDelayed,
                    vec![
                        Expr::call(
                            sym("f"),
                            vec![Expr::call_sym(
                                kw::Pattern,
                                vec![sym("x"), Expr::call_sym(kw::Blank, vec![])]
                            )]
                        ),
                        sym("x"),
                    ]
                )
            );
            assert_eq!(parse("x =."), Expr::call_sym(kw::Unset, vec![sym("x")]));
            assert_eq!(
                parse("x : 3"),
                Expr::call_sym(kw::Rule, vec![sym("x"), Expr::int(3)])
            );
            assert_eq!(parse("x :> y").to_string(), "RuleDelayed(x, y)");
        });
    }

    #[test]
    fn associations() {
        finch_interface::enter(|| {
            assert_eq!(
                parse("{\"k\": 1}"),
                Expr::call_sym(
                    kw::Association,
                    vec![Expr::call_sym(
                        kw::Rule,
                        vec![Expr::string("k"), Expr::int(1)]
                    )]
                )
            );
            assert_eq!(parse("{}"), Expr::call_sym(kw::Association, vec![]));
        });
    }

    #[test]
    fn indexing_and_slices() {
        finch_interface::enter(|| {
            assert_eq!(parse("e[1]").to_string(), "Part(e, 1)");
            assert_eq!(parse("e[1:2]").to_string(), "SliceRange(e, 1, 2)");
            assert_eq!(parse("e[1:]").to_string(), "TakeFrom(e, 1)");
            assert_eq!(parse("e[:2]").to_string(), "Take(e, 2)");
            assert_eq!(parse("e[1] = x").to_string(), "PartSet(e, 1, x)");
            assert_eq!(parse("e[1:2] = x").to_string(), "SliceSet(e, 1, 2, x)");
            assert_eq!(parse("e[1:] = x").to_string(), "SliceSet(e, 1, Null, x)");
        });
    }

    #[test]
    fn postfix_function() {
        finch_interface::enter(|| {
            assert_eq!(
                parse("$1 * $1 &"),
                Expr::call_sym(
                    kw::Function,
                    vec![Expr::call_sym(kw::Times, vec![sym("$1"), sym("$1")])]
                )
            );
        });
    }

    #[test]
    fn compound_expressions() {
        finch_interface::enter(|| {
            assert_eq!(parse("a; b").to_string(), "CompoundExpression(a, b)");
            assert_eq!(parse("a;").to_string(), "CompoundExpression(a, Null)");
        });
    }

    #[test]
    fn comparisons_chain() {
        finch_interface::enter(|| {
            assert_eq!(parse("a < b < c").to_string(), "Less(a, b, c)");
            assert_eq!(parse("a == b").to_string(), "Equal(a, b)");
            assert_eq!(parse("a === b").to_string(), "SameQ(a, b)");
            assert_eq!(parse("a != b && c").to_string(), "And(Unequal(a, b), c)");
            assert_eq!(parse("!a || b").to_string(), "Or(Not(a), b)");
        });
    }

    #[test]
    fn incomplete_inputs() {
        finch_interface::enter(|| {
            for src in ["f(1, ", "[1, 2", "{\"k\": ", "1 +", "\"abc", "(a; "] {
                let err = parse_expr(src).unwrap_err();
                assert!(err.incomplete, "expected incomplete for {src:?}: {err}");
            }
            let err = parse_expr("f(1))").unwrap_err();
            assert!(!err.incomplete);
        });
    }

    #[test]
    fn print_then_reparse_is_identity() {
        finch_interface::enter(|| {
            let sources = [
                "f(1, x)",
                "a + b * c",
                "Map(Function($1 * $1), [1, 2, 3])",
                "{\"k\": [1, 2]}",
                "f(x_Integer) := x * x",
                "a < b < c",
                "e[1:2]",
                "\"a\\nb\\\"c\"",
                "1.5 + 2.0e3",
            ];
            for src in sources {
                let once = parse(src);
                let twice = parse(&once.to_string());
                assert_eq!(once, twice, "print/reparse mismatch for {src:?}");
            }
        });
    }

    #[test]
    fn patterns_parse_to_algebra() {
        finch_interface::enter(|| {
            assert_eq!(parse("_").to_string(), "Blank()");
            assert_eq!(parse("_Integer").to_string(), "Blank(Integer)");
            assert_eq!(parse("x__Real").to_string(), "Pattern(x, BlankSequence(Real))");
            assert_eq!(parse("xs___").to_string(), "Pattern(xs, BlankNullSequence())");
        });
    }

    #[test]
    fn negative_literals_fold() {
        finch_interface::enter(|| {
            assert_eq!(parse("-3"), Expr::int(-3));
            assert!(matches!(parse("-1.5").kind(), ExprKind::Real(_)));
            assert_eq!(parse("-x").to_string(), "Minus(x)");
        });
    }
}
