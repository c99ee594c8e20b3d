//! The specificity scorer.
//!
//! Overlapping definitions dispatch deterministically by ranking patterns:
//! more-constrained patterns score higher and are tried first. The score is a
//! pure function of the pattern tree; ties are broken by the printed pattern
//! form when rules are registered.

use crate::pattern::Pat;
use finch_interface::kw;

/// Weights, most constrained first. The exact values only need to be
/// mutually consistent.
const LITERAL: u64 = 100;
const TYPED_BLANK: u64 = 50;
const NUMBER_BLANK: u64 = 40;
const UNTYPED_BLANK: u64 = 30;
const TYPED_SEQ: u64 = 20;
const UNTYPED_SEQ: u64 = 16;
const TYPED_NULL_SEQ: u64 = 12;
const UNTYPED_NULL_SEQ: u64 = 8;
const HEAD_CONTRIBUTION: u64 = 10;

/// Scores a compiled pattern.
pub fn score(pat: &Pat) -> u64 {
    match pat {
        Pat::Literal(_) => LITERAL,
        Pat::Blank(Some(ty)) if *ty == kw::Number => NUMBER_BLANK,
        Pat::Blank(Some(_)) => TYPED_BLANK,
        Pat::Blank(None) => UNTYPED_BLANK,
        Pat::Seq { ty, min: 1.. } => {
            if ty.is_some() { TYPED_SEQ } else { UNTYPED_SEQ }
        }
        Pat::Seq { ty, .. } => {
            if ty.is_some() { TYPED_NULL_SEQ } else { UNTYPED_NULL_SEQ }
        }
        Pat::Named { pat, .. } => score(pat),
        Pat::Compound { head, args } => {
            HEAD_CONTRIBUTION + score(head) + args.iter().map(score).sum::<u64>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finch_parse::parse_expr;

    fn score_of(src: &str) -> u64 {
        score(&Pat::compile(&parse_expr(src).unwrap()))
    }

    #[test]
    fn ranking() {
        finch_interface::enter(|| {
            // Literals beat typed blanks beat untyped blanks beat sequences.
            assert!(score_of("f(1)") > score_of("f(_Integer)"));
            assert!(score_of("f(_Integer)") > score_of("f(_Number)"));
            assert!(score_of("f(_Number)") > score_of("f(_)"));
            assert!(score_of("f(_)") > score_of("f(__Integer)"));
            assert!(score_of("f(__)") > score_of("f(___)"));
            assert!(score_of("f(__Integer)") > score_of("f(__)"));
            // Longer argument lists accumulate.
            assert!(score_of("f(_, _)") > score_of("f(_)"));
            // Naming does not change specificity.
            assert_eq!(score_of("f(x_Integer)"), score_of("f(_Integer)"));
            // Nested structure counts.
            assert!(score_of("f(g(_))") > score_of("f(_)"));
        });
    }

    #[test]
    fn pure_function_of_the_tree() {
        finch_interface::enter(|| {
            let a = Pat::compile(&parse_expr("f(x_Integer, ys___)").unwrap());
            let b = Pat::compile(&parse_expr("f(x_Integer, ys___)").unwrap());
            assert_eq!(score(&a), score(&b));
        });
    }
}
