use flc::Error;
use flc::test_harness::*;

/// Reading a variable before any `let` is a fatal lowering error; no
/// module is produced.
#[test]
fn undefined_variable_aborts() {
    match compile_source("print(x)") {
        Err(Error::UndefinedVariable(name)) => assert_eq!(name, "x"),
        other => panic!("expected UndefinedVariable, got {other:?}"),
    }
}

/// The variable must be assigned before the read in program order,
/// even if an assignment appears later.
#[test]
fn read_before_assignment_aborts() {
    assert!(matches!(
        compile_source("print(x); let x = 1"),
        Err(Error::UndefinedVariable(_))
    ));
}

/// A variable assigned only in an unrelated branch arm is still
/// visible afterwards: the table has no scopes, only slots.
#[test]
fn branch_assignment_is_visible_after_the_branch() {
    compile_source("let c = 1; if (c < 2) { let y = 5 } print(y)").expect("flat scoping");
}

/// Unknown input bytes fail the lexer with their offset.
#[test]
fn lex_error_carries_offset() {
    match compile_source("let a = $1") {
        Err(Error::Lex(offset)) => assert_eq!(offset, 8),
        other => panic!("expected Lex, got {other:?}"),
    }
}

/// Syntax errors abort the parse.
#[test]
fn parse_errors_abort() {
    for source in [
        "let = 2",
        "let a 2",
        "print 1",
        "if (1 < 2) print(1)",
        "while (1 < 2)",
        "let a = ",
        "}",
    ] {
        assert!(
            matches!(compile_source(source), Err(Error::Parse(_))),
            "no parse error for {source:?}"
        );
    }
}

/// String literals are recognized by the lexer but rejected by the
/// parser: the language has no string expressions.
#[test]
fn string_literals_are_rejected() {
    for source in [r#"print("hi")"#, "print('hi')", r#"let a = """hi""""#] {
        assert!(
            matches!(compile_source(source), Err(Error::Parse(_))),
            "no parse error for {source:?}"
        );
    }
}

/// An integer literal that overflows `i32` is malformed.
#[test]
fn overflowing_integer_literal_is_malformed() {
    assert!(matches!(
        compile_source("let a = 4294967296"),
        Err(Error::MalformedNumber(_))
    ));
}

/// An empty program still compiles to a module that just returns.
#[test]
fn empty_program_compiles() {
    let module = lower_module("");
    assert_eq!(main_blocks(&module).len(), 1);
    assert_all_terminated(&module);
}

/// Separators alone are a valid program.
#[test]
fn separators_only_compiles() {
    lower_module("\n;\n;;\n");
}
