use std::fmt;

use crate::ir::Type;

/// Non-fatal notice collected during lowering.
///
/// Diagnostics are returned to the caller alongside the compiled module;
/// the core never prints them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A value was stored into a slot whose type was fixed at an earlier
    /// assignment; the value was coerced to the slot type.
    ImplicitCast {
        variable: String,
        from: Type,
        to: Type,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ImplicitCast { variable, from, to } => write!(
                f,
                "implicit cast: `{variable}` holds {to}, value of type {from} was coerced"
            ),
        }
    }
}
