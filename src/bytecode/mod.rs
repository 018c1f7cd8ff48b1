pub mod disasm;
pub mod ir;
pub mod op;

pub use ir::{Instruction, MAX_OPERANDS, Operand};
pub use op::{Category, ComparisonResult, Opcode};
