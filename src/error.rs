//! Diagnostics shared by the parser, the machine state and the executor.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// Stack underflow for an instruction that needs one or two values.
    #[error("Stack not ready to execute this instruction")]
    StackNotReady,

    #[error("Invalid number of parameters")]
    InvalidNumberOfParams,

    /// Operand present but of the wrong kind for its position.
    #[error("Invalid operand")]
    InvalidOperand,

    /// Single-operand conditional jump not preceded by `CMP`.
    #[error("Illegal Instruction: Last instruction was not a comparison")]
    IllegalJumpInstruction,

    #[error("Invalid command")]
    InvalidCommand,

    /// Address outside `1..=8`, or a malformed `M<n>` token.
    #[error("Illegal memory address")]
    InvalidMemoryLocation,

    #[error("Invalid integer literal '{0}'")]
    InvalidInteger(String),

    // Run-level errors. These end the run instead of being isolated to a line.
    #[error("jump of {distance} from line {line} lands before the start of the program")]
    JumpOutOfRange { line: usize, distance: i64 },

    #[error("execution step limit exceeded ({0})")]
    StepLimitExceeded(usize),
}

/// A single statement that failed, kept with its original text.
///
/// `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: usize,
    pub text: String,
    pub error: VmError,
}

impl std::fmt::Display for LineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instruction failed \"{}\" Error: {}", self.text, self.error)
    }
}
