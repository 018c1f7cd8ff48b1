use crate::bytecode::{Category, ComparisonResult, Instruction, Opcode, Operand};
use crate::error::{Result, VmError};
use crate::runtime::sink::Sink;
use crate::runtime::state::MachineState;
use tracing::trace;

/// Applies opcode semantics to a `MachineState`.
///
/// Every call returns a jump distance: `0` means fall through to the next
/// line, anything else is added to the current line index. Each handler runs
/// all of its checks before touching the state, so a failed instruction
/// leaves memory and stack as they were.
#[derive(Debug, Default)]
pub struct Executor {
    state: MachineState,
}

impl Executor {
    pub fn new() -> Self {
        Self::with_state(MachineState::new())
    }

    pub fn with_state(state: MachineState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn into_state(self) -> MachineState {
        self.state
    }

    /// Executes one instruction.
    ///
    /// The last-instruction category is updated whether or not the
    /// instruction succeeds, so a jump always sees the latest attempt.
    pub fn process_instruction(
        &mut self,
        instruction: &Instruction,
        sink: &mut dyn Sink,
    ) -> Result<i64> {
        let result = self.dispatch(instruction, sink);
        self.state.last_category = instruction.opcode.category();
        trace!(%instruction, ?result, "executed");
        result
    }

    fn dispatch(&mut self, instruction: &Instruction, sink: &mut dyn Sink) -> Result<i64> {
        let operands = instruction.operands();
        match instruction.opcode {
            Opcode::Add => self.binary(operands, i64::wrapping_add),
            Opcode::Mul => self.binary(operands, i64::wrapping_mul),
            Opcode::Mov => self.mov(operands),
            Opcode::Cmp => self.cmp(operands),
            Opcode::Push => self.push(operands),
            Opcode::Pop => self.pop(operands),
            Opcode::Jz => self.jump(operands, |c| c == ComparisonResult::Equal, |v| v == 0),
            Opcode::Jnz => self.jump(operands, |c| c != ComparisonResult::Equal, |v| v != 0),
            Opcode::Jpos => self.jump(operands, |c| c == ComparisonResult::GreaterThan, |v| v > 0),
            Opcode::Output => self.output(operands, sink),
            Opcode::Exit => Ok(0),
        }
    }

    /// Reads a memory operand through the bounds check, or returns the literal.
    fn resolve(&self, operand: Operand) -> Result<i64> {
        match operand {
            Operand::Memory(address) => self.state.read_memory(address),
            Operand::Integer(n) => Ok(n),
        }
    }

    // ( a b -- a+b ) / ( a b -- a*b )
    fn binary(&mut self, operands: &[Operand], op: fn(i64, i64) -> i64) -> Result<i64> {
        if !operands.is_empty() {
            return Err(VmError::InvalidNumberOfParams);
        }
        if self.state.stack_size() < 2 {
            return Err(VmError::StackNotReady);
        }

        let a = self.state.pop()?;
        let b = self.state.pop()?;
        self.state.push(op(a, b));
        Ok(0)
    }

    fn mov(&mut self, operands: &[Operand]) -> Result<i64> {
        match operands {
            [Operand::Memory(dst), src] => {
                let value = self.resolve(*src)?;
                self.state.write_memory(*dst, value)?;
                Ok(0)
            }
            [_, _] => Err(VmError::InvalidOperand),
            _ => Err(VmError::InvalidNumberOfParams),
        }
    }

    fn cmp(&mut self, operands: &[Operand]) -> Result<i64> {
        let [lhs, rhs] = operands else {
            return Err(VmError::InvalidNumberOfParams);
        };

        let lhs = self.resolve(*lhs)?;
        let rhs = self.resolve(*rhs)?;
        self.state.comparison = match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => ComparisonResult::LessThan,
            std::cmp::Ordering::Greater => ComparisonResult::GreaterThan,
            std::cmp::Ordering::Equal => ComparisonResult::Equal,
        };
        Ok(0)
    }

    /// Shared shape of `JZ`, `JNZ` and `JPOS`.
    ///
    /// `JXX n` jumps `n` lines when the preceding `CMP` satisfies `on_flag`.
    /// `JXX v, n` jumps `n` lines when the resolved `v` satisfies `on_value`.
    fn jump(
        &mut self,
        operands: &[Operand],
        on_flag: fn(ComparisonResult) -> bool,
        on_value: fn(i64) -> bool,
    ) -> Result<i64> {
        match operands {
            [distance] => {
                if self.state.last_category != Category::Comparison {
                    return Err(VmError::IllegalJumpInstruction);
                }
                let Operand::Integer(distance) = *distance else {
                    return Err(VmError::InvalidOperand);
                };
                Ok(if on_flag(self.state.comparison) { distance } else { 0 })
            }
            [value, distance] => {
                let Operand::Integer(distance) = *distance else {
                    return Err(VmError::InvalidOperand);
                };
                let value = self.resolve(*value)?;
                Ok(if on_value(value) { distance } else { 0 })
            }
            _ => Err(VmError::InvalidNumberOfParams),
        }
    }

    fn push(&mut self, operands: &[Operand]) -> Result<i64> {
        let [operand] = operands else {
            return Err(VmError::InvalidNumberOfParams);
        };

        let value = self.resolve(*operand)?;
        self.state.push(value);
        Ok(0)
    }

    fn pop(&mut self, operands: &[Operand]) -> Result<i64> {
        let [operand] = operands else {
            return Err(VmError::InvalidNumberOfParams);
        };
        let Operand::Memory(address) = *operand else {
            return Err(VmError::InvalidOperand);
        };

        // a bad target must not consume the stack top
        self.state.check_address(address)?;
        let value = self.state.pop()?;
        self.state.write_memory(address, value)?;
        Ok(0)
    }

    fn output(&mut self, operands: &[Operand], sink: &mut dyn Sink) -> Result<i64> {
        let [operand] = operands else {
            return Err(VmError::InvalidNumberOfParams);
        };

        let value = self.resolve(*operand)?;
        sink.output(value);
        Ok(0)
    }
}
