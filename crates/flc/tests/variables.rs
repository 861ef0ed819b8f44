use flc::Diagnostic;
use flc::ir::{Instruction, Type, Value};
use flc::test_harness::*;

/// A first assignment allocates one slot in the entry block, named
/// after the variable and its type.
#[test]
fn first_assignment_allocates_in_entry() {
    let module = lower_module("let a = 2");
    let entry = &main_blocks(&module)[0];
    assert_eq!(
        entry.instructions[0],
        Instruction::Alloca {
            dest: Value::Temp {
                name: "a_i32".to_owned(),
                ty: Type::Ptr,
            },
            allocated: Type::I32,
        }
    );
}

/// Reassignment reuses the slot: one alloca, two stores.
#[test]
fn reassignment_reuses_the_slot() {
    let module = lower_module("let a = 1; let a = 2; let a = 3");
    assert_eq!(
        count_instructions(&module, |i| matches!(i, Instruction::Alloca { .. })),
        1
    );
    assert_eq!(
        count_instructions(&module, |i| matches!(i, Instruction::Store { .. })),
        3
    );
}

/// The slot type is fixed at first assignment; a double stored into an
/// `i32` slot is coerced with `fptosi` and reported.
#[test]
fn double_into_int_slot_coerces_with_warning() {
    let compilation = compile_source("let a = 1; let a = 2.5").expect("compile");
    assert_eq!(
        compilation.diagnostics,
        vec![Diagnostic::ImplicitCast {
            variable: "a".to_owned(),
            from: Type::F64,
            to: Type::I32,
        }]
    );
    assert!(has_instruction(&compilation.module, |i| {
        matches!(i, Instruction::FpToSi { to: Type::I32, .. })
    }));
    // Still exactly one slot.
    assert_eq!(
        count_instructions(&compilation.module, |i| {
            matches!(i, Instruction::Alloca { .. })
        }),
        1
    );
}

/// The reverse direction coerces with `sitofp`.
#[test]
fn int_into_double_slot_coerces_with_warning() {
    let compilation = compile_source("let a = 1.5; let a = 2").expect("compile");
    assert_eq!(compilation.diagnostics.len(), 1);
    assert!(has_instruction(&compilation.module, |i| {
        matches!(i, Instruction::SiToFp { .. })
    }));
}

/// A comparison result makes an `i1` slot; a later integer store is
/// narrowed into it.
#[test]
fn int_into_bool_slot_truncates() {
    let compilation = compile_source("let f = 1 < 2; let f = 5").expect("compile");
    assert_eq!(compilation.diagnostics.len(), 1);
    assert!(has_instruction(&compilation.module, |i| {
        matches!(i, Instruction::Trunc { to: Type::I1, .. })
    }));
}

/// Loads read back the slot type.
#[test]
fn variable_read_loads_the_slot_type() {
    let module = lower_module("let x = 1.5; print(x)");
    assert!(has_instruction(&module, |i| {
        matches!(i, Instruction::Load { ty: Type::F64, .. })
    }));
}

/// Each distinct variable gets its own slot even when assigned inside
/// nested blocks; slots always land in the entry block.
#[test]
fn nested_assignments_still_allocate_in_entry() {
    let module = lower_module("let a = 1; if (a < 2) { let b = 3.5 }");
    let entry = &main_blocks(&module)[0];
    let entry_allocas = entry
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::Alloca { .. }))
        .count();
    assert_eq!(entry_allocas, 2);
    for block in &main_blocks(&module)[1..] {
        assert!(
            block
                .instructions
                .iter()
                .all(|i| !matches!(i, Instruction::Alloca { .. })),
            "alloca outside entry in `{}`",
            block.label
        );
    }
}
