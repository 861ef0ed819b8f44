use std::collections::HashMap;

use crate::{Error, Result};

use super::module::{Block, BlockId, Declaration, FnSig, Function, GlobalString, Module};
use super::{Instruction, Opcode, Terminator, Type, Value};

/// Blocks synthesized by [`Builder::build_if_else`]. The caller
/// populates `then_block` and `else_block` and joins at `merge_block`.
#[derive(Debug, Clone, Copy)]
pub struct IfElseRegion {
    pub then_block: BlockId,
    pub else_block: BlockId,
    pub merge_block: BlockId,
}

/// Construction facade over a [`Module`] holding one function under
/// build.
///
/// Maintains an insertion cursor naming the block that receives the
/// next instruction. Appending to a block that already has a
/// terminator is an internal error; stack slots go to the head of the
/// entry block regardless of the cursor. `finish` seals the function
/// with its return and hands the module back.
pub struct Builder {
    module: Module,
    current: BlockId,
    entry_allocas: usize,
    next_temp: u32,
    label_counts: HashMap<String, u32>,
}

impl Builder {
    #[must_use]
    pub fn new(module_name: &str, function_name: &str) -> Self {
        let mut module = Module::new(module_name);
        module.functions.push(Function {
            name: function_name.to_owned(),
            ret: Type::I32,
            blocks: vec![Block::new("entry".to_owned())],
        });
        Self {
            module,
            current: BlockId(0),
            entry_allocas: 0,
            next_temp: 0,
            label_counts: HashMap::new(),
        }
    }

    pub fn declare_function(&mut self, name: &str, sig: FnSig) {
        self.module.declarations.push(Declaration {
            name: name.to_owned(),
            sig,
        });
    }

    /// Add an internal constant byte-array global holding `text` plus a
    /// trailing NUL. Returns the global's address value.
    pub fn define_global_string(&mut self, name: &str, text: &str) -> Value {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        self.module.globals.push(GlobalString {
            name: name.to_owned(),
            bytes,
        });
        Value::Global(name.to_owned())
    }

    // ── Cursor and block management ──

    /// Append a new block to the function. The hint becomes the label,
    /// suffixed with a counter once it repeats.
    pub fn append_block(&mut self, hint: &str) -> BlockId {
        let n = self.label_counts.entry(hint.to_owned()).or_insert(0);
        let label = if *n == 0 {
            hint.to_owned()
        } else {
            format!("{hint}{n}")
        };
        *n += 1;
        let id = BlockId(self.func().blocks.len());
        self.func_mut().blocks.push(Block::new(label));
        id
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current = block;
    }

    #[must_use]
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.func().blocks[self.current.0].is_terminated()
    }

    #[must_use]
    pub fn label_of(&self, block: BlockId) -> &str {
        &self.func().blocks[block.0].label
    }

    // ── Memory ──

    /// Create a stack slot at the head of the entry block. `name` is the
    /// informational slot name (`%name = alloca <ty>`).
    pub fn build_entry_alloca(&mut self, name: &str, ty: Type) -> Value {
        let dest = Value::Temp {
            name: name.to_owned(),
            ty: Type::Ptr,
        };
        let index = self.entry_allocas;
        self.entry_allocas += 1;
        self.block_mut(BlockId(0)).instructions.insert(
            index,
            Instruction::Alloca {
                dest: dest.clone(),
                allocated: ty,
            },
        );
        dest
    }

    pub fn build_load(&mut self, ptr: Value, ty: Type) -> Result<Value> {
        self.expect_pointer(&ptr, "load")?;
        let dest = self.fresh_temp(ty);
        self.push(Instruction::Load {
            dest: dest.clone(),
            ty,
            ptr,
        })?;
        Ok(dest)
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) -> Result<()> {
        self.expect_pointer(&ptr, "store")?;
        self.push(Instruction::Store { value, ptr })
    }

    // ── Arithmetic, casts, comparison ──

    pub fn build_arith(&mut self, op: Opcode, lhs: Value, rhs: Value) -> Result<Value> {
        let ty = lhs.ty();
        if rhs.ty() != ty {
            return Err(Error::Internal(format!(
                "{} operand types differ: {:?} vs {:?}",
                op.mnemonic(),
                ty,
                rhs.ty()
            )));
        }
        if op.is_float() && ty != Type::F64 {
            return Err(Error::Internal(format!(
                "{} requires double operands, got {ty:?}",
                op.mnemonic()
            )));
        }
        if !op.is_float() && !ty.is_integer() {
            return Err(Error::Internal(format!(
                "{} requires integer operands, got {ty:?}",
                op.mnemonic()
            )));
        }
        let dest = self.fresh_temp(ty);
        self.push(Instruction::Arith {
            dest: dest.clone(),
            op,
            lhs,
            rhs,
        })?;
        Ok(dest)
    }

    pub fn build_sitofp(&mut self, value: Value) -> Result<Value> {
        if !value.ty().is_integer() {
            return Err(Error::Internal(format!(
                "sitofp requires an integer operand, got {:?}",
                value.ty()
            )));
        }
        let dest = self.fresh_temp(Type::F64);
        self.push(Instruction::SiToFp {
            dest: dest.clone(),
            value,
        })?;
        Ok(dest)
    }

    pub fn build_fptosi(&mut self, value: Value, to: Type) -> Result<Value> {
        if value.ty() != Type::F64 || !to.is_integer() {
            return Err(Error::Internal(format!(
                "fptosi from {:?} to {to:?} is not a float-to-int cast",
                value.ty()
            )));
        }
        let dest = self.fresh_temp(to);
        self.push(Instruction::FpToSi {
            dest: dest.clone(),
            value,
            to,
        })?;
        Ok(dest)
    }

    pub fn build_zext(&mut self, value: Value, to: Type) -> Result<Value> {
        if value.ty() != Type::I1 || to != Type::I32 {
            return Err(Error::Internal(format!(
                "zext from {:?} to {to:?} is not a widening",
                value.ty()
            )));
        }
        let dest = self.fresh_temp(to);
        self.push(Instruction::Zext {
            dest: dest.clone(),
            value,
            to,
        })?;
        Ok(dest)
    }

    pub fn build_trunc(&mut self, value: Value, to: Type) -> Result<Value> {
        if value.ty() != Type::I32 || to != Type::I1 {
            return Err(Error::Internal(format!(
                "trunc from {:?} to {to:?} is not a narrowing",
                value.ty()
            )));
        }
        let dest = self.fresh_temp(to);
        self.push(Instruction::Trunc {
            dest: dest.clone(),
            value,
            to,
        })?;
        Ok(dest)
    }

    pub fn build_fcmp(&mut self, predicate: &'static str, lhs: Value, rhs: Value) -> Result<Value> {
        if lhs.ty() != Type::F64 || rhs.ty() != Type::F64 {
            return Err(Error::Internal(format!(
                "fcmp requires double operands, got {:?} and {:?}",
                lhs.ty(),
                rhs.ty()
            )));
        }
        let dest = self.fresh_temp(Type::I1);
        self.push(Instruction::FCmp {
            dest: dest.clone(),
            predicate,
            lhs,
            rhs,
        })?;
        Ok(dest)
    }

    pub fn build_call(&mut self, callee: &str, args: Vec<Value>) -> Result<Value> {
        let sig = self
            .module
            .declaration(callee)
            .map(|d| d.sig.clone())
            .ok_or_else(|| Error::Internal(format!("call to undeclared function `{callee}`")))?;
        let fixed = sig.params.len();
        if args.len() < fixed || (!sig.varargs && args.len() != fixed) {
            return Err(Error::Internal(format!(
                "call to `{callee}` with {} arguments, expected {fixed}{}",
                args.len(),
                if sig.varargs { " or more" } else { "" }
            )));
        }
        let dest = self.fresh_temp(sig.ret);
        self.push(Instruction::Call {
            dest: dest.clone(),
            callee: callee.to_owned(),
            sig,
            args,
        })?;
        Ok(dest)
    }

    // ── Terminators ──

    pub fn build_br(&mut self, target: BlockId) -> Result<()> {
        let target = self.label_of(target).to_owned();
        self.terminate(Terminator::Br { target })
    }

    pub fn build_cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        if cond.ty() != Type::I1 {
            return Err(Error::Internal(format!(
                "branch condition must be i1, got {:?}",
                cond.ty()
            )));
        }
        let then_target = self.label_of(then_block).to_owned();
        let else_target = self.label_of(else_block).to_owned();
        self.terminate(Terminator::CondBr {
            cond,
            then_target,
            else_target,
        })
    }

    /// Branch to `target` unless the current block already terminated
    /// (e.g. a nested region ended it). Used to seal region arms.
    pub fn branch_if_open(&mut self, target: BlockId) -> Result<()> {
        if self.is_terminated() {
            return Ok(());
        }
        self.build_br(target)
    }

    /// Open an if/else region: three fresh blocks wired with a
    /// conditional branch from the current block.
    pub fn build_if_else(&mut self, cond: Value) -> Result<IfElseRegion> {
        let then_block = self.append_block("if_then");
        let else_block = self.append_block("if_else");
        let merge_block = self.append_block("if_merge");
        self.build_cond_br(cond, then_block, else_block)?;
        Ok(IfElseRegion {
            then_block,
            else_block,
            merge_block,
        })
    }

    /// Seal the function with `ret i32 0` and return the module.
    pub fn finish(mut self) -> Result<Module> {
        if !self.is_terminated() {
            self.terminate(Terminator::Ret {
                value: Value::int32(0),
            })?;
        }
        Ok(self.module)
    }

    // ── Internals ──

    fn func(&self) -> &Function {
        &self.module.functions[0]
    }

    fn func_mut(&mut self) -> &mut Function {
        &mut self.module.functions[0]
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.module.functions[0].blocks[id.0]
    }

    fn fresh_temp(&mut self, ty: Type) -> Value {
        let name = format!("t{}", self.next_temp);
        self.next_temp += 1;
        Value::Temp { name, ty }
    }

    fn push(&mut self, inst: Instruction) -> Result<()> {
        let current = self.current;
        let block = self.block_mut(current);
        if block.is_terminated() {
            return Err(Error::Internal(format!(
                "instruction appended to terminated block `{}`",
                block.label
            )));
        }
        block.instructions.push(inst);
        Ok(())
    }

    fn terminate(&mut self, terminator: Terminator) -> Result<()> {
        let current = self.current;
        let block = self.block_mut(current);
        if block.is_terminated() {
            return Err(Error::Internal(format!(
                "second terminator in block `{}`",
                block.label
            )));
        }
        block.terminator = Some(terminator);
        Ok(())
    }

    fn expect_pointer(&self, value: &Value, what: &str) -> Result<()> {
        if value.ty() == Type::Ptr {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "{what} address must be a pointer, got {:?}",
                value.ty()
            )))
        }
    }
}
