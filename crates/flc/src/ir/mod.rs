//! In-memory LLVM IR model: types, values, instructions, module
//! structure, the construction facade, and textual `.ll` rendering.

mod builder;
mod display;
mod instruction;
mod module;
mod types;
mod value;
mod verify;

pub use builder::{Builder, IfElseRegion};
pub use instruction::{Instruction, Opcode, Terminator};
pub use module::{Block, BlockId, Declaration, FnSig, Function, GlobalString, Module};
pub use types::Type;
pub use value::Value;
