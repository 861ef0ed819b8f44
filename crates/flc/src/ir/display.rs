//! Textual rendering of the IR model as an `.ll` file.
//!
//! Double constants print in LLVM's hexadecimal bit form so every value
//! round-trips exactly; byte-array globals print as `c"..."` literals
//! with non-printable bytes hex-escaped.

use std::fmt;

use super::module::{Block, Declaration, FnSig, Function, GlobalString, Module};
use super::{Instruction, Terminator, Type, Value};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::I1 => "i1",
            Type::I32 => "i32",
            Type::F64 => "double",
            Type::Ptr => "ptr",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp { name, .. } => write!(f, "%{name}"),
            Value::Int { value, .. } => write!(f, "{value}"),
            Value::Float(value) => write!(f, "0x{:016X}", value.to_bits()),
            Value::Global(name) => write!(f, "@{name}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { dest, allocated } => {
                write!(f, "{dest} = alloca {allocated}")
            }
            Instruction::Load { dest, ty, ptr } => {
                write!(f, "{dest} = load {ty}, ptr {ptr}")
            }
            Instruction::Store { value, ptr } => {
                write!(f, "store {} {value}, ptr {ptr}", value.ty())
            }
            Instruction::Arith { dest, op, lhs, rhs } => {
                write!(f, "{dest} = {} {} {lhs}, {rhs}", op.mnemonic(), lhs.ty())
            }
            Instruction::SiToFp { dest, value } => {
                write!(f, "{dest} = sitofp {} {value} to double", value.ty())
            }
            Instruction::FpToSi { dest, value, to } => {
                write!(f, "{dest} = fptosi double {value} to {to}")
            }
            Instruction::Zext { dest, value, to } => {
                write!(f, "{dest} = zext {} {value} to {to}", value.ty())
            }
            Instruction::Trunc { dest, value, to } => {
                write!(f, "{dest} = trunc {} {value} to {to}", value.ty())
            }
            Instruction::FCmp {
                dest,
                predicate,
                lhs,
                rhs,
            } => {
                write!(f, "{dest} = fcmp {predicate} double {lhs}, {rhs}")
            }
            Instruction::Call {
                dest,
                callee,
                sig,
                args,
            } => {
                write!(f, "{dest} = call {} ", sig.ret)?;
                if sig.varargs {
                    write!(f, "({}) ", param_list(sig))?;
                }
                write!(f, "@{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {arg}", arg.ty())?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Br { target } => write!(f, "br label %{target}"),
            Terminator::CondBr {
                cond,
                then_target,
                else_target,
            } => {
                write!(f, "br i1 {cond}, label %{then_target}, label %{else_target}")
            }
            Terminator::Ret { value } => write!(f, "ret {} {value}", value.ty()),
        }
    }
}

impl fmt::Display for GlobalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{} = internal constant [{} x i8] c\"{}\"",
            self.name,
            self.bytes.len(),
            escape_bytes(&self.bytes)
        )
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declare {} @{}({})",
            self.sig.ret,
            self.name,
            param_list(&self.sig)
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for inst in &self.instructions {
            writeln!(f, "  {inst}")?;
        }
        if let Some(terminator) = &self.terminator {
            writeln!(f, "  {terminator}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.ret, self.name)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f)?;
        for declaration in &self.declarations {
            writeln!(f, "{declaration}")?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(f, "{global}")?;
            }
        }
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

fn param_list(sig: &FnSig) -> String {
    let mut parts: Vec<String> = sig.params.iter().map(ToString::to_string).collect();
    if sig.varargs {
        parts.push("...".to_owned());
    }
    parts.join(", ")
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\{b:02X}"));
        }
    }
    out
}
