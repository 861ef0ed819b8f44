//! AST node set produced by the parser and consumed by lowering.
//!
//! Nodes are pure data; all translation state lives in the lowering
//! context.

use crate::Error;

/// Expression nodes. Every expression lowers to exactly one IR value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal kept as its source lexeme. A `.` in the lexeme
    /// makes it a double constant, otherwise a 32-bit integer.
    Number(String),
    /// Read of a named variable.
    Variable(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// Arithmetic with two operands.
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Relational comparison, always yielding a 1-bit result.
    Comparison {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// The six relational operators of the surface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CmpOp {
    /// LLVM `fcmp` predicate (unordered family) for this operator.
    #[must_use]
    pub fn predicate(self) -> &'static str {
        match self {
            CmpOp::Lt => "ult",
            CmpOp::Le => "ule",
            CmpOp::Eq => "ueq",
            CmpOp::Ne => "une",
            CmpOp::Ge => "uge",
            CmpOp::Gt => "ugt",
        }
    }
}

impl TryFrom<&str> for CmpOp {
    type Error = Error;

    /// Map an operator spelling to its tag. Anything outside the six
    /// relational operators is rejected; reaching this with another
    /// spelling means the token stream and the grammar disagree.
    fn try_from(op: &str) -> Result<Self, Error> {
        match op {
            "<" => Ok(CmpOp::Lt),
            "<=" => Ok(CmpOp::Le),
            "==" => Ok(CmpOp::Eq),
            "!=" => Ok(CmpOp::Ne),
            ">=" => Ok(CmpOp::Ge),
            ">" => Ok(CmpOp::Gt),
            other => Err(Error::InvalidComparisonOperator(other.to_owned())),
        }
    }
}

/// Statement nodes. Statements produce no value; they append
/// instructions and may create basic blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = value` — creates or re-stores a stack slot.
    Let { name: String, value: Expr },
    /// `print ( value )`
    Print(Expr),
    /// `if ( condition ) { .. } [else { .. }]`
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `while ( condition ) { .. }`
    While { condition: Expr, body: Vec<Stmt> },
}

/// Root node: the ordered top-level statement list housed in the
/// synthesized entry function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}
