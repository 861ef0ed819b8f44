//! Helpers for compiler tests.
//!
//! Available when running tests or with the `test-harness` feature
//! enabled (on by default so integration tests can use it).
//!
//! # Example
//!
//! ```rust
//! use flc::test_harness::*;
//!
//! let module = lower_module("let a = 2; print(a + 3)");
//! assert!(has_instruction(&module, |inst| {
//!     matches!(inst, flc::ir::Instruction::Arith { .. })
//! }));
//! assert_all_terminated(&module);
//! ```

#![allow(clippy::missing_panics_doc)]

use crate::ir::{Block, GlobalString, Instruction, Module};
use crate::{Compilation, Result, compile};

/// Compile source text, returning module plus diagnostics.
pub fn compile_source(source: &str) -> Result<Compilation> {
    compile(source)
}

/// Compile source text that is expected to succeed and return just the
/// module.
pub fn lower_module(source: &str) -> Module {
    match compile(source) {
        Ok(compilation) => compilation.module,
        Err(e) => panic!("compilation failed: {e}\nsource:\n{source}"),
    }
}

/// The basic blocks of the synthesized entry function.
pub fn main_blocks(module: &Module) -> &[Block] {
    &module
        .function("main")
        .expect("module has no @main")
        .blocks
}

/// All instructions of `@main` in block order.
pub fn main_instructions(module: &Module) -> Vec<&Instruction> {
    main_blocks(module)
        .iter()
        .flat_map(|b| b.instructions.iter())
        .collect()
}

/// Whether any instruction in `@main` matches the predicate.
pub fn has_instruction(module: &Module, pred: impl Fn(&Instruction) -> bool) -> bool {
    main_instructions(module).into_iter().any(pred)
}

/// Count of instructions in `@main` matching the predicate.
pub fn count_instructions(module: &Module, pred: impl Fn(&Instruction) -> bool) -> usize {
    main_instructions(module).into_iter().filter(|i| pred(i)).count()
}

/// The module's format-string globals in definition order.
pub fn format_globals(module: &Module) -> &[GlobalString] {
    &module.globals
}

/// Assert every block of every function carries a terminator.
pub fn assert_all_terminated(module: &Module) {
    for function in &module.functions {
        for block in &function.blocks {
            assert!(
                block.is_terminated(),
                "block `{}` in @{} has no terminator",
                block.label,
                function.name
            );
        }
    }
}
