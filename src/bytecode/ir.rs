use crate::bytecode::Opcode;
use serde::{Deserialize, Serialize};

/// A typed instruction argument.
///
/// The tag is fixed by the parser. A memory address is not range-checked
/// here; `M9` decodes to `Memory(9)` and fails later on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// `M1` .. `M8`
    Memory(i64),
    Integer(i64),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Memory(address) => match address
                .checked_add('0' as i64)
                .and_then(|code| u32::try_from(code).ok())
                .and_then(char::from_u32)
            {
                Some(ch) => write!(f, "M{}", ch),
                None => write!(f, "M<{}>", address),
            },
            Operand::Integer(n) => write!(f, "{}", n),
        }
    }
}

pub const MAX_OPERANDS: usize = 2;

/// A decoded statement: opcode plus up to two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    slots: [Operand; MAX_OPERANDS],
    len: usize,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            slots: [Operand::Integer(0); MAX_OPERANDS],
            len: 0,
        }
    }

    pub fn with_operands(opcode: Opcode, operands: &[Operand]) -> Self {
        let mut instruction = Self::new(opcode);
        for operand in operands {
            instruction.push_operand(*operand);
        }
        instruction
    }

    /// Assigns the next free operand slot.
    ///
    /// Once both slots are filled further operands are dropped and the count
    /// stays at two.
    pub fn push_operand(&mut self, operand: Operand) {
        if self.len < MAX_OPERANDS {
            self.slots[self.len] = operand;
            self.len += 1;
        }
    }

    pub fn operands(&self) -> &[Operand] {
        &self.slots[..self.len]
    }

    pub fn operand_count(&self) -> usize {
        self.len
    }
}

impl std::fmt::Display for Instruction {
    /// Canonical source form, e.g. `MOV M1, 5`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, operand) in self.operands().iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_count_follows_assignments() {
        let mut instruction = Instruction::new(Opcode::Mov);
        assert_eq!(instruction.operand_count(), 0);
        instruction.push_operand(Operand::Memory(1));
        instruction.push_operand(Operand::Integer(5));
        assert_eq!(instruction.operand_count(), 2);
        assert_eq!(
            instruction.operands(),
            &[Operand::Memory(1), Operand::Integer(5)]
        );
    }

    #[test]
    fn test_third_operand_is_silently_capped() {
        let instruction = Instruction::with_operands(
            Opcode::Cmp,
            &[Operand::Integer(1), Operand::Integer(2), Operand::Integer(3)],
        );
        assert_eq!(instruction.operand_count(), 2);
        assert_eq!(
            instruction.operands(),
            &[Operand::Integer(1), Operand::Integer(2)]
        );
    }

    #[test]
    fn test_display() {
        let mov =
            Instruction::with_operands(Opcode::Mov, &[Operand::Memory(1), Operand::Integer(-5)]);
        assert_eq!(mov.to_string(), "MOV M1, -5");
        assert_eq!(Instruction::new(Opcode::Exit).to_string(), "EXIT");
        // out-of-range addresses keep the character they were decoded from
        assert_eq!(Operand::Memory(17).to_string(), "MA");
        assert_eq!(Operand::Memory(-100).to_string(), "M<-100>");
    }
}
