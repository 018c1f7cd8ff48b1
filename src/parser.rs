use crate::bytecode::{Instruction, MAX_OPERANDS, Opcode, Operand};
use crate::error::{Result, VmError};

/// Line-oriented statement parser.
///
/// Grammar of one line:
///
/// ```text
/// line     := [ keyword [ ws args ] ] [ ";" comment ]
/// args     := operand [ "," operand ]
/// operand  := ("M" | "m") digit | integer
/// ```
///
/// The keyword is case-insensitive. Blank lines and comment-only lines decode
/// to `None` and never reach the executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Decodes one statement.
    ///
    /// Returns `Ok(None)` for a no-op line.
    pub fn parse_statement(&self, line: &str) -> Result<Option<Instruction>> {
        let code = strip_comment(line);
        if code.trim().is_empty() {
            return Ok(None);
        }

        let (keyword, rest) = split_keyword(code);
        let opcode = Opcode::from_keyword(&keyword.to_uppercase()).ok_or(VmError::InvalidCommand)?;
        let mut instruction = Instruction::new(opcode);

        if let Some(rest) = rest {
            let arguments: Vec<&str> = rest.split(',').collect();
            if arguments.len() > MAX_OPERANDS {
                return Err(VmError::InvalidNumberOfParams);
            }
            for argument in arguments {
                instruction.push_operand(parse_operand(argument)?);
            }
        }

        Ok(Some(instruction))
    }
}

/// Everything after the first `;` is a comment.
fn strip_comment(line: &str) -> &str {
    line.split_once(';').map_or(line, |(code, _)| code)
}

/// Splits `code` at the first whitespace run after the keyword.
///
/// A remainder made only of whitespace counts as no arguments.
fn split_keyword(code: &str) -> (&str, Option<&str>) {
    let code = code.trim_start();
    match code.split_once(char::is_whitespace) {
        Some((keyword, rest)) if !rest.trim().is_empty() => (keyword, Some(rest)),
        Some((keyword, _)) => (keyword, None),
        None => (code, None),
    }
}

/// Classifies a single argument token.
///
/// `M<c>` decodes the address from the character code of `c`, so `M9` and `MA`
/// still produce memory operands (9 and 17). Range checks happen on access.
fn parse_operand(argument: &str) -> Result<Operand> {
    let argument = argument.trim();

    if argument.starts_with(['M', 'm']) {
        let mut chars = argument.chars().skip(1);
        return match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Operand::Memory(ch as i64 - '0' as i64)),
            _ => Err(VmError::InvalidMemoryLocation),
        };
    }

    argument
        .parse::<i64>()
        .map(Operand::Integer)
        .map_err(|_| VmError::InvalidInteger(argument.to_string()))
}
