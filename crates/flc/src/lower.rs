//! AST → LLVM IR lowering.
//!
//! A recursive walk over the tree: expressions yield one typed IR value
//! each, statements append instructions and create basic blocks. All
//! state (builder cursor, symbol table, collected diagnostics, format
//! string counter) lives on the lowering context.

use tracing::debug;

use crate::ast::{ArithOp, CmpOp, Expr, Program, Stmt};
use crate::diagnostics::Diagnostic;
use crate::ir::{Builder, FnSig, Module, Opcode, Type, Value};
use crate::symtab::SymbolTable;
use crate::{Error, Result};

/// Lowering context for one program.
pub struct Lowering {
    builder: Builder,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    format_strings: u32,
}

impl Lowering {
    /// Fresh context: a module holding `main` with its entry block, and
    /// the C runtime declaration `print` relies on.
    #[must_use]
    pub fn new(module_name: &str) -> Self {
        let mut builder = Builder::new(module_name, "main");
        builder.declare_function(
            "printf",
            FnSig {
                ret: Type::I32,
                params: vec![Type::Ptr],
                varargs: true,
            },
        );
        Self {
            builder,
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
            format_strings: 0,
        }
    }

    /// Lower the whole program, seal `main` with `ret i32 0`, verify the
    /// module and hand it back along with collected diagnostics.
    pub fn lower_program(mut self, program: &Program) -> Result<(Module, Vec<Diagnostic>)> {
        for stmt in &program.body {
            self.lower_stmt(stmt)?;
        }
        let module = self.builder.finish()?;
        module.verify()?;
        debug!(
            blocks = module.functions[0].blocks.len(),
            globals = module.globals.len(),
            "lowered program"
        );
        Ok((module, self.diagnostics))
    }

    // ── Statements ──

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Let { name, value } => self.lower_let(name, value),
            Stmt::Print(value) => self.lower_print(value),
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => self.lower_if(condition, then_body, else_body.as_deref()),
            Stmt::While { condition, body } => self.lower_while(condition, body),
        }
    }

    /// First assignment allocates a slot of the value's type at the
    /// entry block; later assignments re-store, coercing into the slot
    /// type with a diagnostic when the types differ.
    fn lower_let(&mut self, name: &str, value: &Expr) -> Result<()> {
        let value = self.lower_expr(value)?;
        let ty = value.ty();
        if let Some(slot) = self.symbols.lookup(name).cloned() {
            let stored = if slot.ty == ty {
                value
            } else {
                self.diagnostics.push(Diagnostic::ImplicitCast {
                    variable: name.to_owned(),
                    from: ty,
                    to: slot.ty,
                });
                self.coerce(value, slot.ty)?
            };
            self.builder.build_store(stored, slot.ptr)
        } else {
            let ptr = self
                .builder
                .build_entry_alloca(&format!("{name}_{ty}"), ty);
            self.builder.build_store(value, ptr.clone())?;
            self.symbols.bind(name, ptr, ty);
            Ok(())
        }
    }

    fn lower_print(&mut self, value: &Expr) -> Result<()> {
        let value = self.lower_expr(value)?;
        let format = match value.ty() {
            Type::I1 | Type::I32 => "%i \n",
            Type::F64 => "%f \n",
            Type::Ptr => "%s \n",
        };
        self.format_strings += 1;
        let name = format!("fstr{}", self.format_strings);
        let format_ptr = self.builder.define_global_string(&name, format);
        self.builder.build_call("printf", vec![format_ptr, value])?;
        Ok(())
    }

    fn lower_if(
        &mut self,
        condition: &Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> Result<()> {
        let cond = self.lower_condition(condition)?;
        let region = self.builder.build_if_else(cond)?;

        self.builder.position_at_end(region.then_block);
        for stmt in then_body {
            self.lower_stmt(stmt)?;
        }
        self.builder.branch_if_open(region.merge_block)?;

        self.builder.position_at_end(region.else_block);
        if let Some(else_body) = else_body {
            for stmt in else_body {
                self.lower_stmt(stmt)?;
            }
        }
        self.builder.branch_if_open(region.merge_block)?;

        self.builder.position_at_end(region.merge_block);
        Ok(())
    }

    /// Header/body/exit layout: the condition lives in its own header
    /// block and is lowered once; the body branches back to the header.
    fn lower_while(&mut self, condition: &Expr, body: &[Stmt]) -> Result<()> {
        let header = self.builder.append_block("loop_header");
        let body_block = self.builder.append_block("loop_body");
        let after = self.builder.append_block("loop_after");

        self.builder.build_br(header)?;
        self.builder.position_at_end(header);
        let cond = self.lower_condition(condition)?;
        self.builder.build_cond_br(cond, body_block, after)?;

        self.builder.position_at_end(body_block);
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        self.builder.branch_if_open(header)?;

        self.builder.position_at_end(after);
        Ok(())
    }

    // ── Expressions ──

    fn lower_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(lexeme) => lower_number(lexeme),
            Expr::Variable(name) => self.lower_variable(name),
            Expr::Neg(operand) => self.lower_neg(operand),
            Expr::Arith { op, lhs, rhs } => self.lower_arith(*op, lhs, rhs),
            Expr::Comparison { op, lhs, rhs } => self.lower_comparison(*op, lhs, rhs),
        }
    }

    fn lower_variable(&mut self, name: &str) -> Result<Value> {
        let slot = self
            .symbols
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedVariable(name.to_owned()))?;
        self.builder.build_load(slot.ptr, slot.ty)
    }

    fn lower_neg(&mut self, operand: &Expr) -> Result<Value> {
        let value = self.lower_expr(operand)?;
        match value.ty() {
            Type::F64 => self
                .builder
                .build_arith(Opcode::FSub, Value::Float(0.0), value),
            ty if ty.is_integer() => {
                self.builder
                    .build_arith(Opcode::Sub, Value::zero(ty), value)
            }
            ty => Err(Error::Internal(format!("negation of {ty:?} value"))),
        }
    }

    /// Integer op when both operands are `i32`; otherwise promote and
    /// use the floating op. Division always goes through `fdiv` on
    /// promoted operands so `7 / 2` is `3.5`, not `3`.
    fn lower_arith(&mut self, op: ArithOp, lhs: &Expr, rhs: &Expr) -> Result<Value> {
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;
        self.expect_numeric(&lhs, "arithmetic")?;
        self.expect_numeric(&rhs, "arithmetic")?;

        if op == ArithOp::Div {
            let lhs = self.promote(lhs)?;
            let rhs = self.promote(rhs)?;
            return self.builder.build_arith(Opcode::FDiv, lhs, rhs);
        }

        if lhs.ty() == Type::I32 && rhs.ty() == Type::I32 {
            let opcode = match op {
                ArithOp::Add => Opcode::Add,
                ArithOp::Sub => Opcode::Sub,
                ArithOp::Mul => Opcode::Mul,
                ArithOp::Div => unreachable!("division handled above"),
            };
            return self.builder.build_arith(opcode, lhs, rhs);
        }

        let opcode = match op {
            ArithOp::Add => Opcode::FAdd,
            ArithOp::Sub => Opcode::FSub,
            ArithOp::Mul => Opcode::FMul,
            ArithOp::Div => unreachable!("division handled above"),
        };
        let lhs = self.promote(lhs)?;
        let rhs = self.promote(rhs)?;
        self.builder.build_arith(opcode, lhs, rhs)
    }

    fn lower_comparison(&mut self, op: CmpOp, lhs: &Expr, rhs: &Expr) -> Result<Value> {
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;
        self.expect_numeric(&lhs, "comparison")?;
        self.expect_numeric(&rhs, "comparison")?;
        let lhs = self.promote(lhs)?;
        let rhs = self.promote(rhs)?;
        self.builder.build_fcmp(op.predicate(), lhs, rhs)
    }

    // ── Helpers ──

    fn lower_condition(&mut self, condition: &Expr) -> Result<Value> {
        let cond = self.lower_expr(condition)?;
        if cond.ty() != Type::I1 {
            return Err(Error::Internal(format!(
                "condition lowered to {:?}, expected a comparison",
                cond.ty()
            )));
        }
        Ok(cond)
    }

    /// `i32` → `f64` via signed conversion; doubles pass through.
    fn promote(&mut self, value: Value) -> Result<Value> {
        match value.ty() {
            Type::I32 => self.builder.build_sitofp(value),
            Type::F64 => Ok(value),
            ty => Err(Error::Internal(format!("cannot promote {ty:?} to double"))),
        }
    }

    /// Coerce `value` into a slot of type `to` (the slot type wins).
    fn coerce(&mut self, value: Value, to: Type) -> Result<Value> {
        match (value.ty(), to) {
            (from, to) if from == to => Ok(value),
            (Type::I1 | Type::I32, Type::F64) => self.builder.build_sitofp(value),
            (Type::F64, Type::I1 | Type::I32) => self.builder.build_fptosi(value, to),
            (Type::I1, Type::I32) => self.builder.build_zext(value, to),
            (Type::I32, Type::I1) => self.builder.build_trunc(value, to),
            (from, to) => Err(Error::Internal(format!(
                "no coercion from {from:?} to {to:?}"
            ))),
        }
    }

    fn expect_numeric(&self, value: &Value, what: &str) -> Result<()> {
        if value.ty().is_numeric() {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "{what} operand has type {:?}, expected i32 or double",
                value.ty()
            )))
        }
    }
}

/// A `.` in the lexeme makes a double constant, otherwise `i32`.
fn lower_number(lexeme: &str) -> Result<Value> {
    if lexeme.contains('.') {
        let value: f64 = lexeme
            .parse()
            .map_err(|_| Error::MalformedNumber(lexeme.to_owned()))?;
        Ok(Value::Float(value))
    } else {
        let value: i32 = lexeme
            .parse()
            .map_err(|_| Error::MalformedNumber(lexeme.to_owned()))?;
        Ok(Value::int32(value))
    }
}
