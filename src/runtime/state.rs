use crate::bytecode::{Category, ComparisonResult};
use crate::error::{Result, VmError};
use serde::{Deserialize, Serialize};

pub const MEMORY_CELLS: usize = 8;

/// Memory cells, operand stack and flags for one program run.
///
/// Addresses are 1-based: `M1` is the first cell.
#[derive(Debug, Clone, Default)]
pub struct MachineState {
    memory: [i64; MEMORY_CELLS],
    stack: Vec<i64>,
    pub last_category: Category,
    pub comparison: ComparisonResult,
}

/// Serializable copy of the state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub memory: [i64; MEMORY_CELLS],
    /// Bottom of the stack first.
    pub stack: Vec<i64>,
    pub last_category: Category,
    pub comparison: ComparisonResult,
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a 1-based address to an index into `memory`.
    pub fn check_address(&self, address: i64) -> Result<usize> {
        match usize::try_from(address) {
            Ok(a) if (1..=MEMORY_CELLS).contains(&a) => Ok(a - 1),
            _ => Err(VmError::InvalidMemoryLocation),
        }
    }

    pub fn read_memory(&self, address: i64) -> Result<i64> {
        let index = self.check_address(address)?;
        Ok(self.memory[index])
    }

    pub fn write_memory(&mut self, address: i64, value: i64) -> Result<()> {
        let index = self.check_address(address)?;
        self.memory[index] = value;
        Ok(())
    }

    pub fn push(&mut self, value: i64) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<i64> {
        self.stack.pop().ok_or(VmError::StackNotReady)
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            memory: self.memory,
            stack: self.stack.clone(),
            last_category: self.last_category,
            comparison: self.comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = MachineState::new();
        for address in 1..=8 {
            assert_eq!(state.read_memory(address), Ok(0));
        }
        assert_eq!(state.stack_size(), 0);
        assert_eq!(state.last_category, Category::None);
    }

    #[test]
    fn test_write_then_read_every_cell() {
        let mut state = MachineState::new();
        for address in 1..=8 {
            state.write_memory(address, address * 10 - 45).unwrap();
        }
        for address in 1..=8 {
            assert_eq!(state.read_memory(address), Ok(address * 10 - 45));
        }
    }

    #[test]
    fn test_out_of_range_addresses() {
        let mut state = MachineState::new();
        for address in [0, -1, 9, 17, i64::MIN, i64::MAX] {
            assert_eq!(
                state.read_memory(address),
                Err(VmError::InvalidMemoryLocation)
            );
            assert_eq!(
                state.write_memory(address, 1),
                Err(VmError::InvalidMemoryLocation)
            );
        }
        assert_eq!(state.snapshot().memory, [0; MEMORY_CELLS]);
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut state = MachineState::new();
        state.push(1);
        state.push(2);
        assert_eq!(state.stack_size(), 2);
        assert_eq!(state.pop(), Ok(2));
        assert_eq!(state.pop(), Ok(1));
        assert_eq!(state.pop(), Err(VmError::StackNotReady));
    }

    #[test]
    fn test_snapshot() {
        let mut state = MachineState::new();
        state.write_memory(8, 42).unwrap();
        state.push(7);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.memory[7], 42);
        assert_eq!(snapshot.stack, vec![7]);
    }
}
