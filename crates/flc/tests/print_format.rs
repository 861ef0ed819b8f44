use flc::ir::{Instruction, Type, Value};
use flc::test_harness::*;

/// Integer values print through `%i`, doubles through `%f`; the format
/// byte array includes the trailing NUL.
#[test]
fn format_string_follows_value_type() {
    let module = lower_module("print(1)");
    assert_eq!(format_globals(&module)[0].bytes, b"%i \n\0");

    let module = lower_module("print(1.5)");
    assert_eq!(format_globals(&module)[0].bytes, b"%f \n\0");
}

/// Comparison results are 1-bit integers and print through `%i`.
#[test]
fn booleans_print_as_integers() {
    let module = lower_module("print(1 < 2)");
    assert_eq!(format_globals(&module)[0].bytes, b"%i \n\0");
}

/// Every print site defines its own internal constant global with a
/// monotonically numbered name.
#[test]
fn each_print_gets_a_unique_global() {
    let module = lower_module("print(1); print(2); print(3.5)");
    let names: Vec<&str> = format_globals(&module)
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["fstr1", "fstr2", "fstr3"]);
}

/// Print calls the declared variadic `printf` with the format pointer
/// and the value.
#[test]
fn print_calls_printf() {
    let module = lower_module("print(42)");
    assert!(module.declaration("printf").is_some());
    assert!(has_instruction(&module, |i| {
        matches!(
            i,
            Instruction::Call { callee, args, .. }
                if callee == "printf"
                    && args.len() == 2
                    && args[0] == Value::Global("fstr1".to_owned())
                    && args[1].ty() == Type::I32
        )
    }));
}

/// `printf` is declared once no matter how many prints there are.
#[test]
fn printf_is_declared_once() {
    let module = lower_module("print(1); print(2)");
    assert_eq!(
        module
            .declarations
            .iter()
            .filter(|d| d.name == "printf")
            .count(),
        1
    );
}

/// Prints inside branches still number their globals in lowering
/// order.
#[test]
fn globals_number_across_branches() {
    let module = lower_module("let x = 1; if (x < 2) { print(1) } else { print(2.0) } print(3)");
    let names: Vec<&str> = format_globals(&module)
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["fstr1", "fstr2", "fstr3"]);
    assert_eq!(format_globals(&module)[1].bytes, b"%f \n\0");
}
