use super::{Instruction, Terminator, Type};

/// Index of a basic block within its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId(pub usize);

/// A straight-line instruction sequence ending in one terminator.
///
/// The terminator is optional only while the block is under
/// construction; [`Module::verify`](super::Module::verify) rejects
/// modules with open blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl Block {
    #[must_use]
    pub fn new(label: String) -> Self {
        Self {
            label,
            instructions: Vec::new(),
            terminator: None,
        }
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

/// A defined function: currently only the synthesized `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub ret: Type,
    pub blocks: Vec<Block>,
}

impl Function {
    #[must_use]
    pub fn block(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.label == label)
    }
}

/// Function type used by declarations and call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnSig {
    pub ret: Type,
    pub params: Vec<Type>,
    pub varargs: bool,
}

/// External function declaration (`declare`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub sig: FnSig,
}

/// Internal constant byte-array global; backs one `print` format string.
/// The bytes include the trailing NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalString {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An LLVM module under construction or completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub globals: Vec<GlobalString>,
    pub functions: Vec<Function>,
}

impl Module {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            declarations: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}
