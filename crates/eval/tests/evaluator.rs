//! End-to-end evaluation tests: parse a source string, drive it to its fixed
//! point, and compare printed results.

use finch_eval::Evaluator;
use finch_expr::{ErrorKind, Expr};
use finch_interface::Session;
use finch_parse::parse_expr;

/// Runs `srcs` in order in one evaluator, returning the last result.
fn eval_all(srcs: &[&str]) -> Result<Expr, finch_expr::ErrorValue> {
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        let mut last = Expr::null();
        for src in srcs {
            last = ev.eval(&parse_expr(src).expect("parse"))?;
        }
        Ok(last)
    })
}

#[track_caller]
fn check(src: &str, expected: &str) {
    check_all(&[src], expected);
}

#[track_caller]
fn check_all(srcs: &[&str], expected: &str) {
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        let mut last = Expr::null();
        for src in srcs {
            last = ev.eval(&parse_expr(src).expect("parse")).unwrap_or_else(|e| {
                panic!("evaluation of {src:?} failed: {e}");
            });
        }
        assert_eq!(last.to_string(), expected, "sources: {srcs:?}");
    });
}

#[track_caller]
fn check_error(srcs: &[&str], kind: ErrorKind) {
    let err = eval_all(srcs).expect_err("expected an error value");
    assert_eq!(err.kind, kind);
}

#[test]
fn arithmetic_folding() {
    check("Plus(1, 2, 3)", "6");
    check("1 + 2 + 3", "6");
    check("Times(2, Power(3, 2))", "18");
    check("2 * 3 ^ 2", "18");
    check("Plus(a, 1, b, 2)", "Plus(3, a, b)");
    check("10 - 4", "6");
    check("6 / 4", "3/2");
    check("6 / 3", "2");
    check("2 ^ 10", "1024");
    check("2 ^ -2", "1/4");
    check("(1/2) ^ 2", "1/4");
    check("x ^ 0", "1");
    check("x ^ 1", "x");
    check("1 ^ x", "1");
    check("1.5 + 1", "2.5");
}

#[test]
fn power_of_power_collapses() {
    check("(x ^ 2) ^ 3", "Power(x, 6)");
    check("(x ^ a) ^ 2", "Power(x, Times(2, a))");
}

#[test]
fn integer_powers_distribute_over_products() {
    // A quotient base distributes: (a/b)^n is Power(a, n) * Power(b, -n).
    check("(a / b) ^ 2", "Times(Power(a, 2), Power(b, -2))");
    check("(a * b) ^ 3", "Times(Power(a, 3), Power(b, 3))");
    // Symbolic exponents do not distribute.
    check("(a * b) ^ n", "Power(Times(a, b), n)");
}

#[test]
fn map_with_anonymous_function() {
    check("Map(Function($1 * $1), List(1, 2, 3))", "List(1, 4, 9)");
    check("Map($1 + 1 &, [10, 20])", "List(11, 21)");
    check("Map(Function(x, x * 2), [1, 2])", "List(2, 4)");
}

#[test]
fn block_scoping() {
    check_all(
        &["x = 5", "Block({x = 10}, Plus(x, 1))"],
        "11",
    );
    check_all(
        &["x = 5", "Block({x = 10}, Plus(x, 1)); x"],
        "5",
    );
    // A bare symbol shadows to unbound.
    check_all(&["y = 3", "Block([y], y)"], "y");
    check_all(&["y = 3", "Block([y], y); y"], "3");
}

#[test]
fn with_substitutes_lexically() {
    check("With({x = 3}, x * x)", "9");
}

#[test]
fn user_rules_dispatch_by_type() {
    check_all(&["f(x_Integer) := x * x", "f(7)"], "49");
    check_all(&["f(x_Integer) := x * x", "f(1.5)"], "f(1.5)");
}

#[test]
fn specificity_tie_break() {
    // Either registration order gives the same dispatch.
    let programs: [&[&str]; 2] = [
        &["f(_Integer) := \"int\"", "f(_) := \"any\""],
        &["f(_) := \"any\"", "f(_Integer) := \"int\""],
    ];
    for defs in programs {
        let mut with_int = defs.to_vec();
        with_int.push("f(3)");
        check_all(&with_int, "\"int\"");
        let mut with_str = defs.to_vec();
        with_str.push("f(\"s\")");
        check_all(&with_str, "\"any\"");
    }
}

#[test]
fn replace_rewrites_subterms() {
    check("Replace(x + 2, x : 3)", "5");
    check("ReplaceAll(f(x, g(x)), x : 1)", "f(1, g(1))");
    check("Replace([x, y], [x : 1, y : 2])", "List(1, 2)");
}

#[test]
fn apply_replaces_heads() {
    check("Apply(Plus, List(1, 2, 3))", "6");
    check("Apply(f, [1, 2])", "f(1, 2)");
}

#[test]
fn division_by_zero_is_an_error() {
    check_error(&["Divide(1, 0)"], ErrorKind::DivisionByZero);
    check_error(&["1 / 0"], ErrorKind::DivisionByZero);
    check_error(&["Mod(5, 0)"], ErrorKind::DivisionByZero);
    check_error(&["0 ^ -1"], ErrorKind::DivisionByZero);
}

#[test]
fn evaluation_is_idempotent_at_fixed_point() {
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        for src in ["Plus(a, 1, b, 2)", "f(1.5)", "[1, x, \"s\"]", "Hold(1 + 1)"] {
            let once = ev.eval(&parse_expr(src).unwrap()).unwrap();
            let twice = ev.eval(&once).unwrap();
            assert_eq!(once, twice, "not a fixed point for {src:?}");
        }
    });
}

#[test]
fn hold_is_a_fixed_point() {
    check("Hold(1 + 1)", "Hold(Plus(1, 1))");
    check("Hold(Evaluate(1 + 1))", "Hold(2)");
}

#[test]
fn flat_orderless_normalization() {
    check_all(
        &[
            "SetAttributes(h, [Flat, Orderless, OneIdentity])",
            "SameQ(h(h(a, b), c), h(c, b, a))",
        ],
        "True",
    );
    check_all(
        &["SetAttributes(h, [Flat, Orderless, OneIdentity])", "h(x)"],
        "x",
    );
    // An empty call under those attributes is stable.
    check_all(
        &["SetAttributes(h, [Flat, Orderless, OneIdentity])", "h()"],
        "h()",
    );
}

#[test]
fn flat_rule_captures_slices() {
    // The multi-element run binds as a compound of the flat head; Hold keeps
    // the capture from rewriting again in the result.
    check_all(
        &[
            "SetAttributes(h, [Flat])",
            "h(xs__, y_) := pair(Hold(xs), y)",
            "h(1, 2, 3)",
        ],
        "pair(Hold(h(1, 2)), 3)",
    );
}

#[test]
fn orderless_matching_picks_positions() {
    check_all(
        &[
            "SetAttributes(g, [Orderless])",
            "g(n_Integer, s_Symbol) := found(n, s)",
            "g(a, 5)",
        ],
        "found(5, a)",
    );
}

#[test]
fn logic_short_circuits() {
    check("True && False", "False");
    check("True || False", "True");
    check("False && Divide(1, 0)", "False");
    check("True || Divide(1, 0)", "True");
    check("!True", "False");
    check("And(True, x, True)", "x");
}

#[test]
fn comparisons() {
    check("1 < 2", "True");
    check("1 < 2 < 3", "True");
    check("2 < 2", "False");
    check("2 <= 2", "True");
    check("1 == 1.0", "True");
    check("1 === 1.0", "False");
    check("1 === 1", "True");
    check("1 != 2", "True");
    check("\"a\" < \"b\"", "True");
    check("x == x", "True");
    check("x == y", "Equal(x, y)");
}

#[test]
fn control_flow() {
    check("If(1 < 2, \"yes\", \"no\")", "\"yes\"");
    check("If(False, 1)", "Null");
    check("Which(False, 1, True, 2)", "2");
    check_all(&["n = 0", "Do(n = n + 1, 5)", "n"], "5");
    check_all(&["n = 1", "While(n < 10, n = n * 2)", "n"], "16");
    check_all(&["For(i = 0, i < 3, i = i + 1, Null)", "i"], "3");
    check("a = 1; b = 2; a + b", "3");
}

#[test]
fn assert_aborts_compound_expression() {
    check_error(&["Assert(1 == 2); x = 99", "x"], ErrorKind::AssertionFailed);
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        let _ = ev.eval(&parse_expr("Assert(1 == 2); x = 99").unwrap());
        // The failed assertion aborted the statement after it.
        let x = ev.eval(&parse_expr("x").unwrap()).unwrap();
        assert_eq!(x.to_string(), "x");
    });
}

#[test]
fn recursion_cap() {
    check_error(&["loop(n_) := loop(n + 1)", "loop(0)"], ErrorKind::Recursion);
}

#[test]
fn protected_symbols_reject_writes() {
    check_error(&["Plus = 3"], ErrorKind::Protected);
    check_error(&["Plus(x_) := x"], ErrorKind::Protected);
    check_error(&["True = False"], ErrorKind::Protected);
    // Unprotect lifts the guard for user symbols.
    check_all(&["g = 1", "Protect(g)", "Unprotect(g)", "g = 2", "g"], "2");
}

#[test]
fn listable_threading() {
    check("Plus([1, 2], 10)", "List(11, 12)");
    check("[1, 2] + [10, 20]", "List(11, 22)");
    check_error(&["[1, 2] + [1, 2, 3]"], ErrorKind::Argument);
}

#[test]
fn list_surgery() {
    check("Length([a, b, c])", "3");
    check("First([1, 2])", "1");
    check("Last([1, 2])", "2");
    check("Rest([1, 2, 3])", "List(2, 3)");
    check("Most([1, 2, 3])", "List(1, 2)");
    check("Append([1], 2)", "List(1, 2)");
    check("Prepend([1], 0)", "List(0, 1)");
    check("Join([1], [2, 3])", "List(1, 2, 3)");
    check("Reverse([1, 2, 3])", "List(3, 2, 1)");
    check("Range(4)", "List(1, 2, 3, 4)");
    check("Range(2, 6, 2)", "List(2, 4, 6)");
    check("Flatten([1, [2, [3]], 4])", "List(1, 2, 3, 4)");
    check("Sort([3, 1, 2])", "List(1, 2, 3)");
    check("Union([2, 1], [2, 3])", "List(1, 2, 3)");
    check("Table(i * i, [i, 4])", "List(1, 4, 9, 16)");
    check("Table(x, 3)", "List(x, x, x)");
}

#[test]
fn parts_and_slices() {
    check("[10, 20, 30][2]", "20");
    check("[10, 20, 30][-1]", "30");
    check("Part(f(a, b), 0)", "f");
    check("[1, 2, 3, 4][2:3]", "List(2, 3)");
    check("[1, 2, 3, 4][2:]", "List(2, 3, 4)");
    check("[1, 2, 3, 4][:2]", "List(1, 2)");
    check("\"abcdef\"[2:4]", "\"bcd\"");
    check("Drop([1, 2, 3], 1)", "List(2, 3)");
    check("Take([1, 2, 3], -2)", "List(2, 3)");
    check_error(&["[1][5]"], ErrorKind::Part);
    check_all(&["xs = [1, 2, 3]", "xs[2] = 9", "xs"], "List(1, 9, 3)");
    check_all(&["xs = [1, 2, 3, 4]", "xs[2:3] = [8, 9]", "xs"], "List(1, 8, 9, 4)");
}

#[test]
fn pattern_search() {
    check("Cases([1, a, 2, b], _Integer)", "List(1, 2)");
    check("DeleteCases([1, a, 2, b], _Integer)", "List(a, b)");
    check("Count([1, a, 2], _Integer)", "2");
    check("MemberQ([1, 2], 2)", "True");
    check("Position([a, b, a], a)", "List(List(1), List(3))");
    check("MatchQ(f(1), f(_Integer))", "True");
}

#[test]
fn functional_programming() {
    check("Fold(Plus, 0, [1, 2, 3, 4])", "10");
    check("FoldList(Plus, 0, [1, 2, 3])", "List(0, 1, 3, 6)");
    check("Nest(Function($1 * 2), 1, 5)", "32");
    check("NestList(Function($1 * 2), 1, 3)", "List(1, 2, 4, 8)");
    check("Select([1, 2, 3, 4], EvenQ)", "List(2, 4)");
    check("Composition(f, g)(x)", "f(g(x))");
    check("Identity(42)", "42");
}

#[test]
fn associations_end_to_end() {
    check("{\"a\": 1, \"b\": 2}[\"b\"]", "2");
    check("Keys({\"a\": 1, \"b\": 2})", "List(\"a\", \"b\")");
    check("Values({\"a\": 1, \"b\": 2})", "List(1, 2)");
    check("Lookup({\"a\": 1}, \"missing\", 0)", "0");
    check("KeyQ({\"a\": 1}, \"a\")", "True");
    check("KeyDrop({\"a\": 1, \"b\": 2}, \"a\")", "{\"b\": 2}");
    check("Normal({\"a\": 1})", "List(Rule(\"a\", 1))");
    // Duplicate keys: last write wins.
    check("{\"k\": 1, \"k\": 2}", "{\"k\": 2}");
    check_all(&["m = {\"a\": 1}", "m[\"b\"] = 5", "m"], "{\"a\": 1, \"b\": 5}");
}

#[test]
fn byte_arrays() {
    check("ByteArray([1, 2, 255])", "ByteArray([1, 2, 255])");
    check("Normal(ByteArray([7, 8]))", "List(7, 8)");
    check_error(&["ByteArray([300])"], ErrorKind::Type);
}

#[test]
fn strings() {
    check("StringLength(\"hello\")", "5");
    check("StringJoin(\"a\", \"b\", \"c\")", "\"abc\"");
    check("StringTake(\"hello\", 2)", "\"he\"");
    check("StringTake(\"hello\", -2)", "\"lo\"");
    check("StringSplit(\"a,b,c\", \",\")", "List(\"a\", \"b\", \"c\")");
    check("ToUpperCase(\"abc\")", "\"ABC\"");
    check("Characters(\"ab\")", "List(\"a\", \"b\")");
    check("StringContainsQ(\"hello\", \"ell\")", "True");
    check("ToString(1 + 1)", "\"2\"");
}

#[test]
fn numeric_functions() {
    check("Abs(-3)", "3");
    check("Sign(-2)", "-1");
    check("Min(3, 1, 2)", "1");
    check("Max(3, 1, 2)", "3");
    check("Floor(3/2)", "1");
    check("Ceiling(3/2)", "2");
    check("Round(1.4)", "1");
    check("GCD(12, 18)", "6");
    check("LCM(4, 6)", "12");
    check("Numerator(6/4)", "3");
    check("Denominator(6/4)", "2");
    check("Mod(7, 3)", "1");
    check("Quotient(7, 3)", "2");
    check("EvenQ(4)", "True");
    check("OddQ(4)", "False");
}

#[test]
fn numeric_approximation() {
    check("N(1/2)", "0.5");
    check("N(3)", "3.0");
    // Known constants produce reals; symbols stay exact until N.
    check("Pi", "Pi");
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        let pi = ev.eval(&parse_expr("N(Pi)").unwrap()).unwrap();
        let pi = pi.as_real().expect("a real").to_f64();
        assert!((pi - std::f64::consts::PI).abs() < 1e-15);
        let wide = ev.eval(&parse_expr("N(Pi, 200)").unwrap()).unwrap();
        assert_eq!(wide.as_real().expect("a real").prec(), 200);
        // More mantissa bits agree with the machine value.
        assert!((wide.as_real().unwrap().to_f64() - std::f64::consts::PI).abs() < 1e-15);
    });
}

#[test]
fn attributes_are_queryable() {
    check("Attributes(Plus)", "List(Flat, Orderless, OneIdentity, Listable, NumericFunction, Protected)");
    check_all(
        &["SetAttributes(q, Listable)", "Attributes(q)"],
        "List(Listable)",
    );
}

#[test]
fn attributes_listing_is_settable_and_clearable() {
    check_all(
        &[
            "SetAttributes(w, [Flat, Orderless])",
            "ClearAttributes(w, Flat)",
            "Attributes(w)",
        ],
        "List(Orderless)",
    );
}

#[test]
fn sequences_splice() {
    check_all(&["wrap(xs___) := [xs]", "wrap(1, 2, 3)"], "List(1, 2, 3)");
    check_all(&["count(xs___) := Length([xs])", "count(a, b)"], "2");
    check("f(Sequence(1, 2), 3)", "f(1, 2, 3)");
}

#[test]
fn errors_carry_traces() {
    let sess = Session::default();
    sess.enter(|| {
        let mut ev = Evaluator::new(&sess);
        ev.eval(&parse_expr("g(x_) := 1 / x").unwrap()).unwrap();
        let err = ev.eval(&parse_expr("g(0) + 5").unwrap()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert!(!err.trace.is_empty());
        // The trace walks out through the enclosing frames.
        assert!(err.trace.iter().any(|f| f.name.as_str() == "Plus"));
    });
}

#[test]
fn compound_expression_value_and_order() {
    check("1; 2; 3", "3");
    check("x = 1; x + 1", "2");
    check("x = 1;", "Null");
}
