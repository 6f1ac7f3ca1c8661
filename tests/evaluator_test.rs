use proptest::prelude::*;
use xper::{
    interpreter::{context::BufferedContext, InterpreterConfig, TreeWalkInterpreter},
    lexer::Span,
    parser::{
        expression::{Expression, ExpressionKind, InfixOperator},
        formatter::{ExpressionFormatter, SExpressionFormatter},
        Parser,
    },
    value::{
        error::RuntimeErrorKind,
        formatter::{BasicFormatter, ValueFormatter},
        Value, ValueKind,
    },
};

fn evaluate_with(
    input: &str,
    config: InterpreterConfig,
) -> (String, TreeWalkInterpreter<BufferedContext>) {
    let mut interpreter = TreeWalkInterpreter::with_config(BufferedContext::new(), config);
    let program = match Parser::new(input).parse() {
        Ok(program) => program,
        Err(e) => {
            let msg = SExpressionFormatter::new(input).format_error(&e);
            return (msg, interpreter);
        }
    };
    let formatter = BasicFormatter::new(input);
    let actual = match interpreter.run(&program) {
        Ok(ref v) => formatter.format(v),
        Err(ref e) => formatter.format_error(e),
    };
    (actual, interpreter)
}

fn check(input: &str, expected: &str, test_name: &str) {
    let (actual, _) = evaluate_with(input, InterpreterConfig::default());
    assert_eq!(actual, expected, "Failed the test {test_name}");
}

fn number(value: f64) -> Expression {
    Expression::new(ExpressionKind::Number(value), Span::default())
}

fn infix(operator: InfixOperator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::new(
        ExpressionKind::Infix {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        Span::default(),
    )
}

#[test]
fn smoke_test() {
    check("true", "true", "smoke");
}

#[test]
fn test_arithmetic() {
    check("1 + 2 * 3", "7", "precedence");
    check("10 / 4", "2.5", "division");
    check("7 % 3", "1", "modulo");
    check("0.1 + 0.2", "0.30000000000000004", "float_rendering");
    check("1 / 0", "Infinity", "infinity");
    check("[1, 2] + [3]", "[1, 2, 3]", "list_concatenation");
    check("\"ab\" + \"c\"", "abc", "string_concatenation");
    check(
        "true + 1",
        "(1) TypeError: Unsupported operand types for +: Boolean and Number",
        "mismatched_operands",
    );
    check(
        "-true",
        "(1) TypeError: Unsupported operand type for -: Boolean",
        "mismatched_unary",
    );
}

#[test]
fn test_equality_and_logic() {
    check("[1, 2] == [1, 2]", "true", "structural_list_equality");
    check("@a == @a", "true", "characters");
    check("null == null", "true", "null");
    check("true && !false", "true", "logic");
    check("false || false", "false", "or");
    check(
        "1 == true",
        "(1) TypeError: Unsupported operand types for ==: Number and Boolean",
        "mixed_equality",
    );
}

#[test]
fn test_index_reads() {
    check("l = [1, 2, 3]; l[-1]", "3", "negative_index");
    check("l = [1, 2, 3]; l[1.5]", "3", "rounded_index");
    check("l = [1, 2, 3]; l[[0, 2]]", "[1, 3]", "vector_read");
    check(
        "l = [1, 2, 3]; l[3]",
        "(1) RangeError: Index 3 out of bound for length 3",
        "read_past_end",
    );
    check(
        "l = [1, 2]; l[true]",
        "(1) TypeError: Cannot index type List with type Boolean",
        "non_numeric_index",
    );
    check("5[0]", "(1) TypeError: Cannot index type Number", "non_indexable");
    check(
        "l = [7, 8]; l[0 / 0]",
        "(1) RangeError: Index NaN out of bound for length 2",
        "nan_index",
    );
    check(
        "l = []; l[0 / 0]",
        "(1) RangeError: Index NaN out of bound for length 0",
        "nan_index_on_empty_list",
    );
}

#[test]
fn test_index_writes() {
    check("l = [1, 2, 3]; l[3] = 4; l", "[1, 2, 3, 4]", "write_at_length_appends");
    check("l = [1, 2, 3]; l[10] = 9; l", "[1, 2, 3, 9]", "write_clamps");
    check("l = [1, 2, 3]; l[[0, 2]] = [7, 9]; l", "[7, 2, 9]", "vector_write");
    check(
        "l = [1, 2]; l[[0, 1]] = 5",
        "(1) TypeError: Expected right hand to be a List when assigning with multiple index but given Number",
        "vector_write_needs_list",
    );
    check("l = [1]; l[1] = l; l", "[1, [...]]", "self_reference");
    check(
        "l = [7, 8]; l[0 / 0] = 1",
        "(1) RangeError: Index NaN out of bound for length 2",
        "nan_index",
    );
}

#[test]
fn test_vector_write_mismatch_leaves_list_untouched() {
    let (actual, interpreter) = evaluate_with(
        "l = [1, 2, 3]\nl[[0, 1]] = [7]",
        InterpreterConfig::default(),
    );
    assert_eq!(
        actual,
        "(2) RuntimeError: Length mismatch when assigning with multiple index. Expected 2 item but given 1"
    );
    let list = interpreter.get_environment().get_var("l").map(|v| v.to_string());
    assert_eq!(list.as_deref(), Some("[1, 2, 3]"));
}

#[test]
fn test_ranges() {
    check("1..5", "[1, 2, 3, 4]", "exclusive");
    check("5..1", "[4, 3, 2, 1]", "reversed_bounds");
    check("1..=5::-1", "[5, 4, 3, 2, 1]", "negative_step");
    check("0..=1::0.5", "[0, 0.5, 1]", "fractional_step");
    check(
        "1..3::0",
        "(1) RuntimeError: Range needs finite bounds and a non-zero step",
        "zero_step",
    );
    check(
        "1..2::0.00000000000000000001",
        "(1) RuntimeError: Range needs finite bounds and a non-zero step",
        "step_lost_in_rounding",
    );
    check(
        "1..true",
        "(1) TypeError: All range values must be Number but given Number, Boolean, Number",
        "non_numeric_bound",
    );
}

#[test]
fn test_push() {
    check("l = [1, 2, 3]; l << 4; l", "[1, 2, 3, 4]", "push_at_end");
    check("l = [1, 2, 3]; l[0] << 0; l", "[0, 1, 2, 3]", "push_at_front");
    check("l = [1, 2, 3]; l[[0, 1]] << [8, 9]; l", "[8, 9, 1, 2, 3]", "vector_push");
    check("x = 5; x << 6", "[5, 6]", "push_wraps_non_list");
    check("l = [1, 2, 3, 4]; l[1] << l; l", "[4, 1, 2, 3]", "self_push_rotates");
    check(
        "l = [1, 2]; l[[0, 1]] << [8]",
        "(1) RuntimeError: Length mismatch when assigning with multiple index. Expected 2 item but given 1",
        "vector_push_mismatch",
    );
}

#[test]
fn test_pop() {
    check("l = [1, 2, 3]; >> l", "3", "pop_last");
    check("l = [1, 2, 3]; >> l; l", "[1, 2]", "pop_mutates");
    check("x = [1, 2, 3]; >> x[[0, 1]]", "[1, 3]", "vector_pop_is_sequential");
    check("l = [1, 2]; >> l[2]", "null", "pop_at_length");
    check(
        "l = [1, 2]; >> l[3]",
        "(1) RangeError: Index 3 out of bound for length 2",
        "pop_past_length",
    );
    check("x = 5; >> x", "5", "pop_non_list");
}

#[test]
fn test_shift() {
    check("a = 1; b = 2; a >> b", "2", "returns_previous");
    check("a = 1; b = 2; a >> b; b", "1", "stores_source");
    check("a = 1; a >> c", "null", "undefined_target_reads_null");
    check("a = [1]; b = 0; a >> b; b << 2; a", "[1]", "copies_places");
    check(
        "1 >> 2",
        "(1) SyntaxError: Cannot shift value into this target",
        "invalid_target",
    );
}

#[test]
fn test_shift_evaluates_target_once() {
    check(
        "l = [1, 2, 3]; i = 0; old = 9 >> l[i++]; [old, i, l]",
        "[1, 1, [9, 2, 3]]",
        "indexed_target",
    );
    check(
        "l = [1, 2]; i = 0; l[i++]++; [i, l]",
        "[1, [2, 2]]",
        "indexed_update",
    );
    check(
        "l = [1, 2]; i = 0; l[i++] = 5; [i, l]",
        "[1, [5, 2]]",
        "indexed_assignment",
    );
}

#[test]
fn test_list_cycles() {
    let cycles = "a = [1]; b = [a]; a[0] = b; c = [1]; d = [c]; c[0] = d";
    check(&format!("{cycles}; a == c"), "true", "mutual_equality");
    check(&format!("{cycles}; a == b"), "true", "mutual_equality_offset");
    check(&format!("{cycles}; a"), "[[[...]]]", "mutual_print");
    check(
        "a = [@x, 1]; b = [@y, a]; a[1] = b; a.toString()",
        "xy",
        "mutual_to_string",
    );
    check(
        "a = [1]; b = [a]; a[0] = b; [a] == [[1]]",
        "false",
        "cycle_against_plain_list",
    );
}

#[test]
fn test_blocks() {
    check("{ 1; 2 }", "2", "last_value");
    check("x = if false 1; x", "null", "none_settles_to_null");
    check("{}", "null", "empty_block");
    check("@a", "a", "character");
}

#[test]
fn test_last_output_tracks_top_level_values() {
    let (actual, interpreter) = evaluate_with("1; if false 2; 3", InterpreterConfig::default());
    assert_eq!(actual, "3");
    let last = interpreter.get_environment().last_output().map(|v| v.to_string());
    assert_eq!(last.as_deref(), Some("3"));
}

#[test]
fn test_loops() {
    check("i = 0; while i < 3 { i++ }", "3", "while_counts");
    check(
        "i = 0; while true { i++; if i == 3 break }",
        "2",
        "break_stops_before_counting",
    );
    check(
        "s = 0\nfor x of [1, 2, 3, 4] {\n  if x % 2 == 0 continue\n  s += x\n}\ns",
        "4",
        "continue",
    );
    check("for k in [5, 6, 7] k", "3", "for_in_returns_length");
    check("for k in [] k", "0", "for_in_empty");
    check(
        "for k in [5, 6] k; k",
        "(1) RuntimeError: Undefined identifier k",
        "loop_variable_unbound",
    );
    check(
        "for k in 5 k",
        "(1) TypeError: Cannot enumerate through type Number",
        "non_enumerable",
    );
    check(
        "for k of true k",
        "(1) TypeError: Cannot iterate through type Boolean",
        "non_iterable",
    );
    check(
        "while 1 {}",
        "(1) TypeError: Cannot evaluate while condition with type Number",
        "non_boolean_condition",
    );
}

#[test]
fn test_multi_level_break() {
    let nested = |carry: u32| {
        format!(
            "n = 0\n\
             for (i = 0; i < 3; i++) {{\n\
               for (j = 0; j < 3; j++) {{\n\
                 n++\n\
                 if j == 1 break {carry}\n\
               }}\n\
             }}\n\
             n"
        )
    };
    check(&nested(1), "6", "break_inner_loop");
    check(&nested(2), "2", "break_outer_loop");
}

#[test]
fn test_loop_ceiling() {
    check(
        "while true {}",
        "(1) FatalError: Loop exceeded 5000 iterations",
        "default_ceiling",
    );

    let config = InterpreterConfig {
        max_loop_iterations: 10,
        ..InterpreterConfig::default()
    };
    let (actual, interpreter) = evaluate_with("i = 0; while true { i++ }", config);
    assert_eq!(actual, "(1) FatalError: Loop exceeded 10 iterations");
    let count = interpreter.get_environment().get_var("i").map(|v| v.to_string());
    assert_eq!(count.as_deref(), Some("10"));
}

#[test]
fn test_functions() {
    check("add = (a, b) => a + b; add(1, 2)", "3", "call");
    check(
        "fib = (n) => if n < 2 n else fib(n - 1) + fib(n - 2); fib(10)",
        "55",
        "recursion",
    );
    check(
        "add = (a, b) => a + b; add(1)",
        "(1) RuntimeError: Expected 2 argument but given 1",
        "arity",
    );
    check("x = 1; x(2)", "(1) TypeError: Number is not a Function", "non_callable");
    check(
        "count = (n) => if n == 0 0 else 1 + count(n - 1); count(5000)",
        "5000",
        "deep_recursion",
    );
    check(
        "f = () => { break 1 }; f()",
        "(1) RuntimeError: `break` cannot be used as a value",
        "control_escape",
    );
}

#[test]
fn test_call_depth_ceiling() {
    let config = InterpreterConfig {
        max_call_depth: 20,
        ..InterpreterConfig::default()
    };
    let (actual, _) = evaluate_with("f = (n) => f(n + 1); f(0)", config);
    assert_eq!(actual, "(1) FatalError: Call depth exceeded 20 frames");
}

#[test]
fn test_for_each_unbinds_variable_on_error() {
    let (actual, interpreter) =
        evaluate_with("for k of [1, 2] missing", InterpreterConfig::default());
    assert_eq!(actual, "(1) RuntimeError: Undefined identifier missing");
    assert!(interpreter.get_environment().get_var("k").is_none());
}

#[test]
fn test_closures() {
    check(
        "count = 0\ninc = () => count = count + 1\ninc()\ncount",
        "0",
        "captured_by_value",
    );
    check(
        "&total = 0\nadd = () => total = total + 1\nadd()\nadd()\ntotal",
        "2",
        "captured_by_reference",
    );
    check("x = 1; f = () => x; x = 2; f()", "2", "frame_built_at_call_time");
    check(
        "secret = 5 -> 0; peek = () => secret; peek()",
        "(1) RuntimeError: Undefined identifier secret",
        "limit_zero_stays_local",
    );
    check(
        "v = 1 -> 1; outer = () => v; outer()",
        "1",
        "limit_one_reaches_one_frame",
    );
    check(
        "v = 1 -> 1; outer = () => { inner = () => v; inner() }; outer()",
        "(1) RuntimeError: Undefined identifier v",
        "limit_one_stops_at_second_frame",
    );
}

#[test]
fn test_assignment_errors() {
    check("x := 1; x = 2", "(1) RuntimeError: Cannot reassign constant x", "constant");
    check(
        "1 = 2",
        "(1) SyntaxError: Invalid left-hand side of assignment",
        "invalid_target",
    );
    check(
        "x = 1 -> true",
        "(1) TypeError: Variable limit must be type Number but given Boolean",
        "non_numeric_limit",
    );
    check("5++", "(1) SyntaxError: Invalid operand for ++", "invalid_update");
}

#[test]
fn test_updates_and_copies() {
    check("x = 1; ++x", "2", "prefix_increment");
    check("x = 1; x++", "1", "postfix_returns_old");
    check("x = 1; x--; x", "0", "postfix_stores");
    check("l = [1, 2]; l[0]++; l", "[2, 2]", "indexed_update");
    check("a = [1, 2]; b = *a; b << 3; a", "[1, 2]", "copy_detaches");
    check("a = [1, 2]; b = a; b << 3; a", "[1, 2, 3]", "lists_alias");
}

#[test]
fn test_methods() {
    check("x = 3.14159; x.toFixed(2)", "3.14", "to_fixed");
    check("x = 2.5; x.toFixed(0)", "3", "to_fixed_rounds_half_away");
    check(
        "x = 1; x.toFixed(101)",
        "(1) RangeError: Digits 101 must be an integer between 0 and 100",
        "to_fixed_digits",
    );
    check("x = 42; x.toString() + \"!\"", "42!", "number_to_string");
    check("x = 2.5; x.ceil() + x.floor()", "5", "ceil_and_floor");
    check("[1, 2, 3, 2].replace(2, 9)", "[1, 9, 3, 2]", "replace_first");
    check("\"hello\".replace(\"l\", \"L\")", "heLlo", "replace_in_text");
    check(
        "true.foo()",
        "(1) TypeError: Type Boolean does not have any method",
        "no_methods",
    );
    check(
        "x = 1; x.foo()",
        "(1) RuntimeError: Type Number does not have \"foo\"",
        "unknown_method",
    );
}

#[test]
fn test_natives() {
    let (actual, interpreter) = evaluate_with(
        "print(1, \"a\", [1, 2])",
        InterpreterConfig::default(),
    );
    assert_eq!(actual, "null");
    assert_eq!(interpreter.into_context().into_data(), "1 a [1, 2]\n");

    check("len(\"abc\")", "3", "len");
    check(
        "len(5)",
        "(1) TypeError: Argument `list` must be type List but given Number",
        "len_type",
    );
    check("len()", "(1) RuntimeError: Expected 1 argument but given 0", "len_arity");
}

fn arithmetic_operator() -> impl Strategy<Value = InfixOperator> {
    prop_oneof![
        Just(InfixOperator::Add),
        Just(InfixOperator::Subtract),
        Just(InfixOperator::Multiply),
        Just(InfixOperator::Divide),
        Just(InfixOperator::Modulo),
    ]
}

fn comparison_operator() -> impl Strategy<Value = InfixOperator> {
    prop_oneof![
        Just(InfixOperator::GreaterThan),
        Just(InfixOperator::LessThan),
        Just(InfixOperator::GreaterThanEqual),
        Just(InfixOperator::LessThanEqual),
        Just(InfixOperator::EqualEqual),
    ]
}

fn apply_arithmetic(operator: InfixOperator, a: f64, b: f64) -> f64 {
    match operator {
        InfixOperator::Add => a + b,
        InfixOperator::Subtract => a - b,
        InfixOperator::Multiply => a * b,
        InfixOperator::Divide => a / b,
        _ => a % b,
    }
}

fn apply_comparison(operator: InfixOperator, a: f64, b: f64) -> bool {
    match operator {
        InfixOperator::GreaterThan => a > b,
        InfixOperator::LessThan => a < b,
        InfixOperator::GreaterThanEqual => a >= b,
        InfixOperator::LessThanEqual => a <= b,
        _ => a == b,
    }
}

fn source_list(items: &[i32]) -> String {
    let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", items.join(", "))
}

proptest! {
    #[test]
    fn arithmetic_matches_host_floats(
        operator in arithmetic_operator(),
        a in -1.0e6f64..1.0e6,
        b in -1.0e6f64..1.0e6,
    ) {
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let result = interpreter.evaluate(&infix(operator, number(a), number(b)));
        let expected = apply_arithmetic(operator, a, b);
        match result {
            Ok(Value::Number(v)) => {
                prop_assert!(v == expected || (v.is_nan() && expected.is_nan()));
            }
            other => {
                prop_assert!(false, "unexpected result {:?}", other);
            }
        }
    }

    #[test]
    fn comparison_matches_host_floats(
        operator in comparison_operator(),
        a in -1.0e3f64..1.0e3,
        b in -1.0e3f64..1.0e3,
    ) {
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let result = interpreter.evaluate(&infix(operator, number(a), number(b)));
        match result {
            Ok(Value::Boolean(v)) => {
                prop_assert_eq!(v, apply_comparison(operator, a, b));
            }
            other => {
                prop_assert!(false, "unexpected result {:?}", other);
            }
        }
    }

    #[test]
    fn non_number_operand_names_both_kinds(
        operator in prop_oneof![arithmetic_operator(), comparison_operator()],
        a in -1.0e3f64..1.0e3,
        flag in any::<bool>(),
    ) {
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let boolean = Expression::new(ExpressionKind::Bool(flag), Span::default());
        let result = interpreter.evaluate(&infix(operator, number(a), boolean));
        let error = result.map(|_| ()).err().map(|e| e.kind);
        prop_assert_eq!(
            error,
            Some(RuntimeErrorKind::UnsupportedBinary {
                operator: operator.symbol(),
                lhs: ValueKind::Number,
                rhs: ValueKind::Boolean,
            })
        );
    }

    #[test]
    fn reversed_range_is_reversed(start in -50i32..50, end in -50i32..50, step in 1i32..5) {
        let (forward, _) = evaluate_with(
            &format!("{start}..{end}::{step}"),
            InterpreterConfig::default(),
        );
        let (backward, _) = evaluate_with(
            &format!("({end})..({start})::{step}"),
            InterpreterConfig::default(),
        );
        let lower = start.min(end);
        let upper = start.max(end);
        let ascending: Vec<i32> = (lower..upper).step_by(step as usize).collect();
        let mut descending = ascending.clone();
        descending.reverse();
        let (forward_expected, backward_expected) = if start <= end {
            (source_list(&ascending), source_list(&descending))
        } else {
            (source_list(&descending), source_list(&ascending))
        };
        prop_assert_eq!(forward, forward_expected);
        prop_assert_eq!(backward, backward_expected);
    }

    #[test]
    fn push_then_pop_restores_list(
        items in prop::collection::vec(-100i32..100, 0..10),
        value in -100i32..100,
        seed in any::<prop::sample::Index>(),
    ) {
        let index = seed.index(items.len() + 1);
        let source = format!(
            "l = {}\nl[{index}] << {value}\npopped = >> l[{index}]\nl",
            source_list(&items)
        );
        let (actual, interpreter) = evaluate_with(&source, InterpreterConfig::default());
        prop_assert_eq!(actual, source_list(&items));
        let popped = interpreter.get_environment().get_var("popped").map(|v| v.to_string());
        prop_assert_eq!(popped, Some(value.to_string()));
    }
}
