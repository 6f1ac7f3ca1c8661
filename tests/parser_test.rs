use xper::parser::{
    formatter::{ExpressionFormatter, SExpressionFormatter},
    Parser,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut parser = Parser::new(input);
    let result = parser.parse_expression();
    let formatter = SExpressionFormatter::new(input);
    let actual = match result {
        Ok(ref tree) => formatter.format(tree),
        Err(ref e) => formatter.format_error(e),
    };

    assert_eq!(actual, expected, "Failed the test {test_name}");
}

fn check_program(input: &str, expected: &str, test_name: &str) {
    let mut parser = Parser::new(input);
    let formatter = SExpressionFormatter::new(input);
    let actual = match parser.parse() {
        Ok(ref program) => formatter.format_program(program),
        Err(ref e) => formatter.format_error(e),
    };

    assert_eq!(actual, expected, "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "(1) Unexpected EOF", "smoke");
}

#[test]
fn test_literals() {
    check("[1, true, null]", "(list 1.0 true null)", "list");
    check("\"hi\"", "\"hi\"", "string");
    check("@a", "@a", "character");
    check("2.5", "2.5", "number");
}

#[test]
fn test_precedence() {
    check("1 + 2 * 3", "(+ 1.0 (* 2.0 3.0))", "mul_over_add");
    check("(1 + 2) * 3", "(* (group (+ 1.0 2.0)) 3.0)", "group");
    check("a || b && c", "(|| a (&& b c))", "and_over_or");
    check("!a == b", "(== (! a) b)", "prefix_over_equality");
    check("1 + 2 < 4", "(< (+ 1.0 2.0) 4.0)", "additive_over_comparison");
    check("-a.b()", "(- (method b a))", "method_over_prefix");
    check("f(1, 2)[0]", "(index (call f 1.0 2.0) 0.0)", "call_then_index");
}

#[test]
fn test_assignment() {
    check("x = y = 2", "(= x (= y 2.0))", "right_associative");
    check("x := 5 -> 2", "(:= x 5.0 2.0)", "constant_with_limit");
    check("&x = 1", "(&= x 1.0)", "reference");
    check("x += 2", "(= x (+ x 2.0))", "compound_desugared");
    check("x = 1 -> n + 1", "(= x 1.0 (+ n 1.0))", "limit_expression");
    check("l[0] = 3", "(= (index l 0.0) 3.0)", "index_target");
}

#[test]
fn test_list_operators() {
    check("l[0] << 5", "(push l 0.0 5.0)", "push_at_index");
    check("l << 5", "(push l -1.0 5.0)", "push_at_end");
    check(">> l", "(pop l -1.0)", "pop_last");
    check(">> l[1]", "(pop l 1.0)", "pop_at_index");
    check("a >> b", "(>> a b)", "shift");
    check("*l", "(* l)", "copy");
}

#[test]
fn test_ranges() {
    check("1..5", "(.. 1.0 5.0 1.0)", "exclusive");
    check("1..=10::2", "(..= 1.0 10.0 2.0)", "inclusive_with_step");
}

#[test]
fn test_functions() {
    check("(a, b) => a + b", "(fn (a b) (block (+ a b)))", "two_parameters");
    check("() => { 1; 2 }", "(fn () (block 1.0 2.0))", "no_parameters");
    check("(x) => x", "(fn (x) (block x))", "one_parameter");
}

#[test]
fn test_control_flow() {
    check("if x 1 else 2", "(if x 1.0 2.0)", "if_else");
    check("if x { 1 }", "(if x (block 1.0))", "if_without_else");
    check("while i < 3 i++", "(while (< i 3.0) (post++ i))", "while");
    check(
        "for (i = 0; i < 3; i++) print(i)",
        "(for (= i 0.0) (< i 3.0) (post++ i) (call print i))",
        "traditional_for",
    );
    check("for x in l x", "(for-in x l x)", "for_in");
    check("for c of \"hi\" c", "(for-of c \"hi\" c)", "for_of");
    check("break 2", "(break 2)", "break_with_carry");
    check("continue", "(continue 0)", "continue");
}

#[test]
fn test_same_line_rule() {
    check_program("a\n(b)", "a\n(group b)", "call_needs_same_line");
    check_program("a\n-1", "a\n(- 1.0)", "minus_needs_same_line");
    check_program("a\n[0]", "a\n(list 0.0)", "index_needs_same_line");
    check_program("x = 1; x++", "(= x 1.0)\n(post++ x)", "semicolon_separated");
}

#[test]
fn test_errors() {
    check("(1", "(1) Unexpected EOF", "unclosed_group");
    check("1 +", "(1) Unexpected EOF", "dangling_operator");
    check(")", "(1) Non-Expression: RIGHT_PAREN", "non_expression");
    check("(1, 2) => 3", "(1) Invalid Parameter", "invalid_parameter");
    check("&x", "(1) Expected Assignment", "reference_without_assignment");
    check("break 1.5", "(1) Invalid Carry Count: 1.5", "fractional_carry");
    check(
        "for x at l x",
        "(1) Unexpected: A = IDENTIFIER E = IN",
        "for_without_in",
    );
    check("#", "(1) Lexical: Unrecognized character #", "lexical");
    check_program("{\n1", "(2) Unexpected EOF", "unclosed_block");
}
