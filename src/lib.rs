//! # stackasm
//!
//! A tiny stack-and-register machine driven by line-oriented assembly.
//!
//! The machine has eight integer cells (`M1`..`M8`), an unbounded operand
//! stack and a comparison flag. A program is a list of lines; each line holds
//! at most one statement:
//!
//! ```text
//! MOV M1, 5     ; M1 = 5
//! PUSH M1
//! PUSH 3
//! ADD           ; ( a b -- a+b )
//! POP M2
//! OUTPUT M2     ; prints "Output 8"
//! EXIT
//! ```
//!
//! Jumps (`JZ`, `JNZ`, `JPOS`) move by a signed number of lines relative to
//! the jump itself. A statement that fails is reported and skipped; the run
//! continues on the next line.

pub mod bytecode;
pub mod error;
pub mod parser;
pub mod repl;
pub mod runtime;

pub use error::{LineFailure, VmError};
pub use runtime::{RunSummary, VirtualMachine, VmConfig};
