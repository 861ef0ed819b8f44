//! Property-based tests for the lowering invariants.
//!
//! Uses `proptest` to generate random programs and verify:
//! - Valid programs always lower to a module that passes verification
//! - Every basic block of every lowered program carries one terminator
//! - Mixed arithmetic always promotes through `sitofp` to a float op
//! - A variable's slot type is fixed by its first assignment
//! - Every print site gets its own uniquely named format global

use proptest::prelude::*;

use flc::ir::{Instruction, Opcode, Type};
use flc::test_harness::*;

/// Random arithmetic expression over non-negative literals and the
/// pre-declared variables `a` and `b`.
fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0i32..1000).prop_map(|v| v.to_string()),
        (0u32..1000, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
        proptest::sample::select(vec!["a", "b"]).prop_map(str::to_owned),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        (
            inner.clone(),
            proptest::sample::select(vec!["+", "-", "*", "/"]),
            inner,
        )
            .prop_map(|(l, op, r)| format!("({l} {op} {r})"))
    })
}

/// Random statement, possibly nesting blocks of further statements.
fn arb_stmt() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        arb_expr().prop_map(|e| format!("let a = {e}")),
        arb_expr().prop_map(|e| format!("let b = {e}")),
        arb_expr().prop_map(|e| format!("print({e})")),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            (arb_expr(), arb_expr(), prop::collection::vec(inner.clone(), 1..3)).prop_map(
                |(l, r, body)| format!("if ({l} < {r}) {{\n{}\n}}", body.join("\n"))
            ),
            (
                arb_expr(),
                arb_expr(),
                prop::collection::vec(inner.clone(), 1..3),
                prop::collection::vec(inner.clone(), 1..3),
            )
                .prop_map(|(l, r, t, e)| {
                    format!(
                        "if ({l} > {r}) {{\n{}\n}} else {{\n{}\n}}",
                        t.join("\n"),
                        e.join("\n")
                    )
                }),
            (arb_expr(), arb_expr(), prop::collection::vec(inner, 1..3)).prop_map(
                |(l, r, body)| format!("while ({l} != {r}) {{\n{}\n}}", body.join("\n"))
            ),
        ]
    })
}

/// Whole program: `a` and `b` are always assigned first.
fn arb_program() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            (0i32..100).prop_map(|v| v.to_string()),
            Just("1.5".to_owned())
        ],
        prop_oneof![
            (0i32..100).prop_map(|v| v.to_string()),
            Just("2.5".to_owned())
        ],
        prop::collection::vec(arb_stmt(), 0..6),
    )
        .prop_map(|(a, b, stmts)| format!("let a = {a}\nlet b = {b}\n{}", stmts.join("\n")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any generated program lowers, verifies, and renders, and every
    /// block in the result ends in exactly one terminator.
    #[test]
    fn programs_always_lower_and_verify(source in arb_program()) {
        let compilation = compile_source(&source)
            .unwrap_or_else(|e| panic!("compilation failed: {e}\nsource:\n{source}"));
        compilation.module.verify().expect("verification");
        assert_all_terminated(&compilation.module);
        let text = compilation.module.to_string();
        prop_assert!(text.contains("define i32 @main() {"), "missing main definition in rendered text");
    }

    /// Mixed-operand arithmetic promotes the integer side (exactly one
    /// `sitofp`) and uses the floating opcode, whichever side the
    /// integer is on.
    #[test]
    fn promotion_law(
        int_val in 0i32..10000,
        float_whole in 0u32..1000,
        float_frac in 0u32..100,
        int_on_left in any::<bool>(),
        op_idx in 0usize..3,
    ) {
        let (op_str, opcode) = [
            ("+", Opcode::FAdd),
            ("-", Opcode::FSub),
            ("*", Opcode::FMul),
        ][op_idx];
        let float_lit = format!("{float_whole}.{float_frac}");
        let (lhs, rhs) = if int_on_left {
            (int_val.to_string(), float_lit)
        } else {
            (float_lit, int_val.to_string())
        };
        let module = lower_module(&format!("print({lhs} {op_str} {rhs})"));
        prop_assert!(
            has_instruction(&module, |i| {
                matches!(i, Instruction::Arith { op, .. } if *op == opcode)
            }),
            "expected arithmetic instruction with promoted opcode"
        );
        prop_assert_eq!(
            count_instructions(&module, |i| matches!(i, Instruction::SiToFp { .. })),
            1
        );
        // The result is a double, so print chose the %f format.
        prop_assert_eq!(&format_globals(&module)[0].bytes, b"%f \n\0");
    }

    /// However many times a variable is reassigned, it keeps the one
    /// slot its first assignment created, and every mismatched store
    /// raises exactly one diagnostic.
    #[test]
    fn slot_stability(kinds in prop::collection::vec(any::<bool>(), 1..6)) {
        let source: String = kinds
            .iter()
            .map(|is_float| {
                if *is_float {
                    "let v = 1.5\n".to_owned()
                } else {
                    "let v = 2\n".to_owned()
                }
            })
            .collect();
        let compilation = compile_source(&source).expect("compile");
        let module = &compilation.module;

        let allocated: Vec<Type> = main_instructions(module)
            .into_iter()
            .filter_map(|i| match i {
                Instruction::Alloca { allocated, .. } => Some(*allocated),
                _ => None,
            })
            .collect();
        let expected = if kinds[0] { Type::F64 } else { Type::I32 };
        prop_assert_eq!(&allocated, &vec![expected]);

        let mismatches = kinds[1..].iter().filter(|k| **k != kinds[0]).count();
        prop_assert_eq!(compilation.diagnostics.len(), mismatches);

        let stores = count_instructions(module, |i| matches!(i, Instruction::Store { .. }));
        prop_assert_eq!(stores, kinds.len());
    }

    /// N print sites define N distinct format globals, numbered in
    /// order.
    #[test]
    fn format_strings_are_unique(count in 1usize..8) {
        let source: String = (0..count).map(|i| format!("print({i})\n")).collect();
        let module = lower_module(&source);
        let names: Vec<&str> = format_globals(&module)
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        let mut deduped = names.clone();
        deduped.dedup();
        prop_assert_eq!(names.len(), count);
        prop_assert_eq!(deduped.len(), count);
        for (i, name) in names.iter().enumerate() {
            prop_assert_eq!(*name, format!("fstr{}", i + 1));
        }
    }
}
