use std::fmt;

use crate::{parser, token::Spanned, type_checker::Checker, util::fmt::tree};

pub fn format_errors<E>(e: &[Spanned<E>]) -> Vec<String>
where
    E: fmt::Display,
{
    e.iter().map(|e| format!("{e:#}")).collect()
}

#[track_caller]
pub fn assert_errors<E>(actual: &[Spanned<E>], expected: &[&str])
where
    E: fmt::Display,
{
    let errors = format_errors(actual);
    ::pretty_assertions::assert_eq!(errors, expected);
}

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExpr(&'static str),
    CheckerProgram(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

/// Runs the stages the test asks for, returning the rendered tree (empty on
/// failure) and every rendered error, lexer problems first.
#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let tokens_buf = &mut Vec::with_capacity(1024);
    let lex_errors = &mut Vec::new();

    match test {
        Test::ParserProgram(input) => {
            let result = parser::parse_program(input, tokens_buf, lex_errors);
            let mut errors = format_errors(lex_errors);
            let tree = match result {
                Ok(prog) => tree::print_program_string(&prog),
                Err(error) => {
                    errors.push(format!("{error:#}"));
                    String::new()
                }
            };
            (tree, errors)
        }
        Test::ParserExpr(input) => {
            let result = parser::parse_expr(input, tokens_buf, lex_errors);
            let mut errors = format_errors(lex_errors);
            let tree = match result {
                Ok(expr) => tree::print_expr_string(&expr),
                Err(error) => {
                    errors.push(format!("{error:#}"));
                    String::new()
                }
            };
            (tree, errors)
        }
        Test::CheckerProgram(input) => {
            let result = parser::parse_program(input, tokens_buf, lex_errors);
            let mut errors = format_errors(lex_errors);
            let prog = match result {
                Ok(prog) => prog,
                Err(error) => {
                    errors.push(format!("{error:#}"));
                    return (String::new(), errors);
                }
            };

            let tree = match Checker::with_capacity(32).check(prog) {
                Ok(checked) => tree::print_program_string(&checked.program),
                Err(error) => {
                    errors.push(format!("{error:#}"));
                    String::new()
                }
            };
            (tree, errors)
        }
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
    (@@get_test(checker, program), $source:expr) => {
        crate::util::test_utils::Test::CheckerProgram($source)
    };
}
pub(crate) use tree_tests;
