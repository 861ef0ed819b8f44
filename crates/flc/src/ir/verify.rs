//! Structural validity checks run after lowering, before the module is
//! handed to the caller.

use std::collections::HashSet;

use crate::{Error, Result};

use super::module::{Function, Module};
use super::{Instruction, Terminator, Type, Value};

impl Module {
    /// Check the invariants the rest of the pipeline relies on: every
    /// block ends in exactly one terminator, branch conditions are
    /// `i1`, branch targets exist, operand types agree with each
    /// opcode, calls hit declared functions, and global names are
    /// unique. Violations are internal errors.
    pub fn verify(&self) -> Result<()> {
        let mut global_names = HashSet::new();
        for global in &self.globals {
            if !global_names.insert(global.name.as_str()) {
                return Err(Error::Internal(format!(
                    "duplicate global `@{}`",
                    global.name
                )));
            }
        }
        for function in &self.functions {
            self.verify_function(function)?;
        }
        Ok(())
    }

    fn verify_function(&self, function: &Function) -> Result<()> {
        let labels: HashSet<&str> = function.blocks.iter().map(|b| b.label.as_str()).collect();
        if labels.len() != function.blocks.len() {
            return Err(Error::Internal(format!(
                "duplicate block label in @{}",
                function.name
            )));
        }

        for block in &function.blocks {
            for inst in &block.instructions {
                verify_instruction(self, inst).map_err(|e| {
                    Error::Internal(format!("in block `{}`: {e}", block.label))
                })?;
            }
            match &block.terminator {
                None => {
                    return Err(Error::Internal(format!(
                        "block `{}` has no terminator",
                        block.label
                    )));
                }
                Some(Terminator::Br { target }) => {
                    expect_label(&labels, target, &block.label)?;
                }
                Some(Terminator::CondBr {
                    cond,
                    then_target,
                    else_target,
                }) => {
                    if cond.ty() != Type::I1 {
                        return Err(Error::Internal(format!(
                            "block `{}` branches on {:?}, not i1",
                            block.label,
                            cond.ty()
                        )));
                    }
                    expect_label(&labels, then_target, &block.label)?;
                    expect_label(&labels, else_target, &block.label)?;
                }
                Some(Terminator::Ret { value }) => {
                    if value.ty() != function.ret {
                        return Err(Error::Internal(format!(
                            "block `{}` returns {:?}, function declares {:?}",
                            block.label,
                            value.ty(),
                            function.ret
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn expect_label(labels: &HashSet<&str>, target: &str, from: &str) -> Result<()> {
    if labels.contains(target) {
        Ok(())
    } else {
        Err(Error::Internal(format!(
            "block `{from}` branches to unknown label `{target}`"
        )))
    }
}

fn verify_instruction(module: &Module, inst: &Instruction) -> Result<()> {
    match inst {
        Instruction::Alloca { dest, .. } => expect_type(dest, Type::Ptr, "alloca result"),
        Instruction::Load { dest, ty, ptr } => {
            expect_type(ptr, Type::Ptr, "load address")?;
            expect_type(dest, *ty, "load result")
        }
        Instruction::Store { ptr, .. } => expect_type(ptr, Type::Ptr, "store address"),
        Instruction::Arith { dest, op, lhs, rhs } => {
            let ty = lhs.ty();
            if rhs.ty() != ty {
                return Err(Error::Internal(format!(
                    "{} mixes {:?} and {:?}",
                    op.mnemonic(),
                    ty,
                    rhs.ty()
                )));
            }
            if op.is_float() {
                if ty != Type::F64 {
                    return Err(Error::Internal(format!(
                        "{} on non-double {ty:?}",
                        op.mnemonic()
                    )));
                }
            } else if !ty.is_integer() {
                return Err(Error::Internal(format!(
                    "{} on non-integer {ty:?}",
                    op.mnemonic()
                )));
            }
            expect_type(dest, ty, "arithmetic result")
        }
        Instruction::SiToFp { dest, value } => {
            if !value.ty().is_integer() {
                return Err(Error::Internal(format!(
                    "sitofp of {:?}",
                    value.ty()
                )));
            }
            expect_type(dest, Type::F64, "sitofp result")
        }
        Instruction::FpToSi { dest, value, to } => {
            expect_type(value, Type::F64, "fptosi operand")?;
            if !to.is_integer() {
                return Err(Error::Internal(format!("fptosi to {to:?}")));
            }
            expect_type(dest, *to, "fptosi result")
        }
        Instruction::Zext { dest, value, to } => {
            if value.ty() != Type::I1 || *to != Type::I32 {
                return Err(Error::Internal(format!(
                    "zext from {:?} to {to:?}",
                    value.ty()
                )));
            }
            expect_type(dest, *to, "zext result")
        }
        Instruction::Trunc { dest, value, to } => {
            if value.ty() != Type::I32 || *to != Type::I1 {
                return Err(Error::Internal(format!(
                    "trunc from {:?} to {to:?}",
                    value.ty()
                )));
            }
            expect_type(dest, *to, "trunc result")
        }
        Instruction::FCmp { dest, lhs, rhs, .. } => {
            expect_type(lhs, Type::F64, "fcmp operand")?;
            expect_type(rhs, Type::F64, "fcmp operand")?;
            expect_type(dest, Type::I1, "fcmp result")
        }
        Instruction::Call {
            dest, callee, args, ..
        } => {
            let Some(declaration) = module.declaration(callee) else {
                return Err(Error::Internal(format!(
                    "call to undeclared `@{callee}`"
                )));
            };
            let fixed = declaration.sig.params.len();
            if args.len() < fixed || (!declaration.sig.varargs && args.len() != fixed) {
                return Err(Error::Internal(format!(
                    "call to `@{callee}` with {} arguments",
                    args.len()
                )));
            }
            for (param, arg) in declaration.sig.params.iter().zip(args) {
                expect_type(arg, *param, "call argument")?;
            }
            expect_type(dest, declaration.sig.ret, "call result")
        }
    }
}

fn expect_type(value: &Value, expected: Type, what: &str) -> Result<()> {
    if value.ty() == expected {
        Ok(())
    } else {
        Err(Error::Internal(format!(
            "{what} has type {:?}, expected {expected:?}",
            value.ty()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Block, Builder, Terminator};
    use super::*;

    #[test]
    fn a_finished_module_verifies() {
        let module = Builder::new("m", "main").finish().expect("finish");
        module.verify().expect("verify");
    }

    #[test]
    fn open_block_is_rejected() {
        let mut module = Builder::new("m", "main").finish().expect("finish");
        module.functions[0]
            .blocks
            .push(Block::new("dangling".to_owned()));
        assert!(module.verify().is_err());
    }

    #[test]
    fn unknown_branch_target_is_rejected() {
        let mut module = Builder::new("m", "main").finish().expect("finish");
        module.functions[0].blocks[0].terminator = Some(Terminator::Br {
            target: "nowhere".to_owned(),
        });
        assert!(module.verify().is_err());
    }

    #[test]
    fn non_i1_branch_condition_is_rejected() {
        let mut builder = Builder::new("m", "main");
        let body = builder.append_block("loop_body");
        let after = builder.append_block("loop_after");
        builder
            .build_cond_br(
                Value::Int {
                    ty: Type::I1,
                    value: 1,
                },
                body,
                after,
            )
            .expect("cond_br");
        builder.position_at_end(body);
        builder.build_br(after).expect("br");
        builder.position_at_end(after);
        let mut module = builder.finish().expect("finish");
        module.verify().expect("valid before tampering");

        // Swap the condition for an i32 behind the builder's back.
        if let Some(Terminator::CondBr { cond, .. }) =
            &mut module.functions[0].blocks[0].terminator
        {
            *cond = Value::int32(1);
        }
        assert!(module.verify().is_err());
    }
}
