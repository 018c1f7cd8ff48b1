use serde::{Deserialize, Serialize};

// =============================================================================
// OPCODE - the eleven supported mnemonics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // stack arithmetic
    Add,
    Mul,

    // data movement
    Mov,
    Push,
    Pop,

    // comparison
    Cmp,

    /// Relative jumps. Distance is added to the current line index.
    Jz,
    Jnz,
    Jpos,

    // I/O
    Output,

    Exit,
}

/// Classification of the most recently dispatched opcode.
///
/// A single-operand jump is only legal when this is `Comparison`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    None,
    Data,
    Comparison,
    Jump,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonResult {
    #[default]
    Equal,
    GreaterThan,
    LessThan,
}

const KEYWORDS: [(&str, Opcode); 11] = [
    ("ADD", Opcode::Add),
    ("MUL", Opcode::Mul),
    ("MOV", Opcode::Mov),
    ("PUSH", Opcode::Push),
    ("POP", Opcode::Pop),
    ("CMP", Opcode::Cmp),
    ("JZ", Opcode::Jz),
    ("JNZ", Opcode::Jnz),
    ("JPOS", Opcode::Jpos),
    ("OUTPUT", Opcode::Output),
    ("EXIT", Opcode::Exit),
];

impl Opcode {
    /// Looks up an already upper-cased keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, op)| *op)
    }

    pub fn keyword(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    pub fn category(self) -> Category {
        use Opcode::*;
        match self {
            Add | Mul | Mov | Push | Pop | Output => Category::Data,
            Cmp => Category::Comparison,
            Jz | Jnz | Jpos => Category::Jump,
            Exit => Category::Exit,
        }
    }

    pub fn is_jump(self) -> bool {
        self.category() == Category::Jump
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
