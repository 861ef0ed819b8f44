#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod symtab;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use diagnostics::Diagnostic;
pub use error::{Error, Result};

use tracing::debug;

/// Result of a successful compilation: the verified IR module plus the
/// non-fatal diagnostics collected while lowering.
#[derive(Debug)]
pub struct Compilation {
    pub module: ir::Module,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile FLC source text into an LLVM IR module.
///
/// Runs the full pipeline: lex, parse, lower, verify. The first error
/// at any stage aborts; nothing of the partial module survives.
pub fn compile(source: &str) -> Result<Compilation> {
    let tokens = lexer::lex(source)?;
    debug!(tokens = tokens.len(), "lexed source");
    let program = parser::parse(&tokens)?;
    let (module, diagnostics) = lower::Lowering::new("flc_module").lower_program(&program)?;
    Ok(Compilation {
        module,
        diagnostics,
    })
}
