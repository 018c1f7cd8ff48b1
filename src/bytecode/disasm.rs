use crate::bytecode::{Instruction, Operand};
use crate::error::LineFailure;
use crate::parser::Parser;
use std::fmt::Write;

/// One source line after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEntry {
    Instruction(Instruction),
    Failure(LineFailure),
}

/// Decoded view of a whole program, indexed by 0-based line.
///
/// Blank and comment-only lines are absent.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<(usize, ListingEntry)>,
    pub line_count: usize,
}

impl Listing {
    pub fn failures(&self) -> impl Iterator<Item = &LineFailure> {
        self.entries.iter().filter_map(|(_, entry)| match entry {
            ListingEntry::Failure(failure) => Some(failure),
            ListingEntry::Instruction(_) => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Parse every line without executing anything.
pub fn disassemble<S: AsRef<str>>(lines: &[S]) -> Listing {
    let parser = Parser::new();
    let mut entries = Vec::new();

    for (ip, line) in lines.iter().enumerate() {
        let text = line.as_ref();
        match parser.parse_statement(text) {
            Ok(Some(instruction)) => entries.push((ip, ListingEntry::Instruction(instruction))),
            Ok(None) => {}
            Err(error) => entries.push((
                ip,
                ListingEntry::Failure(LineFailure {
                    line: ip + 1,
                    text: text.to_string(),
                    error,
                }),
            )),
        }
    }

    Listing {
        entries,
        line_count: lines.len(),
    }
}

/// Literal jump distance of a jump instruction, if it has one.
fn jump_distance(instruction: &Instruction) -> Option<i64> {
    if !instruction.opcode.is_jump() {
        return None;
    }
    match instruction.operands() {
        [Operand::Integer(d)] | [_, Operand::Integer(d)] => Some(*d),
        _ => None,
    }
}

/// Where a relative jump from `ip` lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    BeforeStart,
    Line(usize),
    End,
}

fn landing(ip: usize, distance: i64, line_count: usize) -> Landing {
    let Some(target) = i64::try_from(ip).ok().and_then(|ip| ip.checked_add(distance)) else {
        return if distance > 0 { Landing::End } else { Landing::BeforeStart };
    };
    match usize::try_from(target) {
        Err(_) => Landing::BeforeStart,
        Ok(target) if target >= line_count => Landing::End,
        Ok(target) => Landing::Line(target),
    }
}

fn collect_jump_targets(listing: &Listing) -> Vec<usize> {
    let mut targets = Vec::new();

    for (ip, entry) in &listing.entries {
        let ListingEntry::Instruction(instruction) = entry else {
            continue;
        };
        let Some(distance) = jump_distance(instruction).filter(|d| *d != 0) else {
            continue;
        };
        if let Landing::Line(target) = landing(*ip, distance, listing.line_count) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

/// Render a listing with 1-based line numbers. Jump targets are marked with
/// `►` and each jump shows where it lands.
pub fn render(listing: &Listing) -> String {
    let jump_targets = collect_jump_targets(listing);
    let mut out = String::new();

    for (ip, entry) in &listing.entries {
        let marker = if jump_targets.contains(ip) { "► " } else { "  " };
        let _ = write!(out, "{:04} {}", ip + 1, marker);

        match entry {
            ListingEntry::Instruction(instruction) => {
                let _ = write!(out, "{}", instruction);
                if let Some(distance) = jump_distance(instruction) {
                    let _ = match landing(*ip, distance, listing.line_count) {
                        Landing::BeforeStart => write!(out, "  -> before start"),
                        Landing::End => write!(out, "  -> end"),
                        Landing::Line(target) => write!(out, "  -> {:04}", target + 1),
                    };
                }
            }
            ListingEntry::Failure(failure) => {
                let _ = write!(out, "!! {} ({})", failure.text.trim(), failure.error);
            }
        }
        out.push('\n');
    }

    out
}

pub fn print_listing(listing: &Listing) {
    print!("{}", render(listing));
}
