// Parser robustness tests
//
// Table-driven suites of small programs that must either parse or fail with a
// recognizable message. Every case runs under catch_unwind so a panic in the
// front end is reported as a crash instead of aborting the whole run.

use abyss::ast::Program;
use abyss::error::AbyssError;
use abyss::lexer::tokenize;
use abyss::parser::Parser;

#[derive(Debug, Clone, Copy)]
enum Expect {
    Parses,
    Fails,
    FailsWith(&'static str),
}

#[derive(Debug)]
struct Case {
    name: &'static str,
    input: String,
    expect: Expect,
}

fn ok(name: &'static str, input: &str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::Parses,
    }
}

fn fails(name: &'static str, input: &str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::Fails,
    }
}

fn fails_with(name: &'static str, input: &str, message: &'static str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::FailsWith(message),
    }
}

fn parse_input(input: &str) -> Result<Program, AbyssError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse()
}

/// Runs one suite, returning a description of every case that misbehaved.
fn run_suite(suite: &str, cases: Vec<Case>) -> Vec<String> {
    let mut problems = Vec::new();

    for case in cases {
        let input = case.input.clone();
        let outcome = std::panic::catch_unwind(move || parse_input(&input));

        let problem = match (outcome, case.expect) {
            (Err(panic), _) => {
                let message = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown panic".to_string());
                Some(format!("CRASHED: {}", message))
            }
            (Ok(Ok(_)), Expect::Parses) => None,
            (Ok(Ok(_)), _) => Some("expected a parse failure, but it succeeded".to_string()),
            (Ok(Err(error)), Expect::Parses) => {
                Some(format!("expected success, got: {}", error.message))
            }
            (Ok(Err(_)), Expect::Fails) => None,
            (Ok(Err(error)), Expect::FailsWith(expected)) => {
                if error.message.contains(expected) {
                    None
                } else {
                    Some(format!("error '{}' does not mention '{}'", error.message, expected))
                }
            }
        };

        match problem {
            Some(problem) => {
                println!("  ✗ {}::{}: {}", suite, case.name, problem);
                problems.push(format!("{}::{}: {}", suite, case.name, problem));
            }
            None => println!("  ✓ {}::{}", suite, case.name),
        }
    }

    problems
}

fn malformed_expression_cases() -> Vec<Case> {
    vec![
        fails_with("unmatched_opening_paren", "(1 + 2", "expected RPAREN"),
        fails_with("unmatched_opening_paren_nested", "((1 + 2)", "expected RPAREN"),
        fails_with("unmatched_closing_paren", "1 + 2)", "expected expression"),
        fails_with("empty_parentheses", "()", "expected expression"),
        fails_with("empty_parentheses_in_expression", "1 + ()", "expected expression"),
        fails_with("unmatched_opening_bracket", "[1, 2", "expected SRBRACKET"),
        fails_with("unclosed_block", "ከሆነ (x > 1) { x = 1", "expected RBRACKET"),
        fails_with("unmatched_closing_brace", "x = 1 }", "expected expression"),
        fails("mixed_paren_bracket_error", "x = [1 + (2 * 3]"),
    ]
}

fn edge_cases() -> Vec<Case> {
    let deep_parens = "(".repeat(40) + "1" + &")".repeat(40);
    vec![
        ok("empty_input", ""),
        ok("only_whitespace", "   \n\t  "),
        ok("only_comments", "# line\n~~ block\ncomment ~~"),
        ok("only_separators", ";;።"),
        fails("unexpected_eof_after_operator", "1 +"),
        fails("unexpected_eof_in_expression", "1 + ("),
        ok("deeply_nested_parens", &deep_parens),
    ]
}

fn operator_cases() -> Vec<Case> {
    vec![
        fails("missing_left_operand", "* 1"),
        fails("missing_right_operand", "1 +"),
        fails("double_plus", "1 ++ 2"),
        ok("double_minus", "1 -- 2"),
        ok("comparison_equal", "1 == 2"),
        ok("comparison_not_equal", "1 != 2"),
        ok("comparison_less_equal", "1 <= 2"),
        ok("comparison_greater_equal", "1 >= 2"),
        ok("logical_ascii", "1 && 0 || 1"),
        ok("logical_words", "1 እና 0 ወይም 1"),
        fails("lone_ampersand", "1 & 2"),
    ]
}

fn control_flow_cases() -> Vec<Case> {
    vec![
        ok("valid_if", "ከሆነ (1) { x = 1 }"),
        ok("if_elseif_else", "ከሆነ (x > 1) { } ካልሆነ (x < 0) { } ሌላ { }"),
        ok("if_else", "ከሆነ (x > 1) { አሳይ(1) } ሌላ { አሳይ(2) }"),
        fails_with("if_missing_condition", "ከሆነ { x = 1 }", "expected LPAREN"),
        fails("if_missing_body", "ከሆነ (1)"),
        fails_with(
            "second_elseif_is_not_grammar",
            "ከሆነ (1) { } ካልሆነ (2) { } ካልሆነ (3) { }",
            "expected expression",
        ),
        ok("valid_while", "እያለ (x < 3) { x = x + 1 }"),
        fails("while_missing_condition", "እያለ { x = 1 }"),
        fails("while_missing_body", "እያለ (1)"),
        ok("valid_for", "ለ (i, ከ 0 እስከ 10) { አሳይ(i) }"),
        fails_with("for_missing_to", "ለ (i, ከ 0 5) { }", "expected TO"),
        fails_with("for_missing_from", "ለ (i, 0 እስከ 5) { }", "expected FROM"),
        fails_with("for_missing_comma", "ለ (i ከ 0 እስከ 5) { }", "expected COMMA"),
    ]
}

fn literal_cases() -> Vec<Case> {
    vec![
        ok("integer_literal", "42"),
        ok("float_literal", "3.14"),
        ok("double_quoted_string", "\"hello\""),
        ok("single_quoted_string", "'hello'"),
        ok("smart_quoted_string", "\u{201c}ሰላም\u{201d}"),
        fails("multiple_dots", "3.14.159"),
        fails("trailing_dot", "42."),
        fails("leading_dot", ".42"),
        fails("unterminated_string", "\"hello"),
        fails("unterminated_string_with_newline", "\"hello\nworld\""),
        fails("unknown_character", "x = @"),
    ]
}

fn call_cases() -> Vec<Case> {
    vec![
        ok("simple_function_call", "foo()"),
        ok("function_call_with_args", "foo(1, 2, 3)"),
        ok("module_call", "ሂሳብ.sqrt(4)"),
        ok("class_path_call", "Outer.Inner.run(1)"),
        ok("input_without_prompt", "x = ጠይቅ()"),
        ok("input_with_prompt", "x = ጠይቅ(\"ስም? \")"),
        fails("missing_closing_paren", "foo(1, 2"),
        fails("missing_opening_paren", "foo 1, 2)"),
        fails("trailing_comma", "foo(1, 2,)"),
        fails_with("dangling_dot", "m.", "expected IDENTIFIER"),
        fails_with("print_without_parens", "አሳይ 1", "expected LPAREN"),
    ]
}

fn definition_cases() -> Vec<Case> {
    vec![
        ok("function_definition", "ተግባር f(a, b) { አሳይ(a + b) }"),
        ok("function_without_params", "ተግባር f() { }"),
        fails_with("params_without_comma", "ተግባር f(a b) { }", "expected RPAREN"),
        fails_with("function_without_name", "ተግባር (a) { }", "expected IDENTIFIER"),
        ok("class_with_method", "ክፍል C { ተግባር m() { አሳይ(1) } }"),
        fails_with("class_without_body", "ክፍል C", "expected LBRACKET"),
        ok("import_plain", "አስገባ \"util.aby\""),
        ok("import_alias", "አስገባ \"util.aby\" እንደ u"),
        fails_with("import_bare_name", "አስገባ util", "expected STRING"),
        fails_with("import_alias_missing", "አስገባ \"util.aby\" እንደ", "expected IDENTIFIER"),
    ]
}

fn assignment_cases() -> Vec<Case> {
    vec![
        ok("simple_assignment", "x = 1"),
        ok("assignment_with_expression", "x = 1 + 2"),
        ok("list_assignment", "x = [1, 2, \"ሶስት\"]"),
        ok("empty_list_assignment", "x = []"),
        ok("list_concatenation_assignment", "x = [1, 2] + [3]"),
        ok("list_repetition_assignment", "x = [0] * 3"),
        ok("element_assignment", "x[0] = 5"),
        ok("index_expression_statement", "x[0]"),
        fails("missing_value", "x ="),
        fails("invalid_target", "1 = x"),
        fails("element_assignment_missing_value", "x[0] ="),
    ]
}

fn positive_cases() -> Vec<Case> {
    vec![
        ok("simple_arithmetic", "1 + 2 * 3"),
        ok("parentheses", "(1 + 2) * 3"),
        ok("complex_expression", "x = (1 + 2) * 3 + foo(4, 5)"),
        ok("string_concatenation", "\"hello\" + \" world\""),
        ok("statements_on_one_line", "x = 1; y = 2። አሳይ(x + y)"),
        ok(
            "whole_program",
            "ተግባር ሰላምታ(ስም) {\n  አሳይ(\"ሰላም \" + ስም)\n}\nለ (i, ከ 0 እስከ 2) {\n  ሰላምታ(ወደጽሁፍ(i))\n}\n",
        ),
    ]
}

#[test]
fn comprehensive_parser_tests() {
    let suites: Vec<(&str, Vec<Case>)> = vec![
        ("malformed_expressions", malformed_expression_cases()),
        ("edge_cases", edge_cases()),
        ("operators", operator_cases()),
        ("control_flow", control_flow_cases()),
        ("literals", literal_cases()),
        ("calls", call_cases()),
        ("definitions", definition_cases()),
        ("assignments", assignment_cases()),
        ("positive", positive_cases()),
    ];

    let mut problems = Vec::new();
    for (name, cases) in suites {
        problems.extend(run_suite(name, cases));
    }

    assert!(problems.is_empty(), "parser suite problems:\n{}", problems.join("\n"));
}
