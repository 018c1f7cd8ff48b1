use crate::bytecode::Category;
use crate::error::LineFailure;
use crate::runtime::{Sink, VirtualMachine};
use std::io::{self, BufRead, Write};

/// Writes `OUTPUT` values to any writer.
///
/// `Sink` cannot fail, so the first write error is kept and surfaced by the
/// caller once the statement finishes.
struct WriterSink<'a, W: Write> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<'a, W: Write> WriterSink<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, error: None }
    }

    fn finish(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<W: Write> Sink for WriterSink<'_, W> {
    fn output(&mut self, value: i64) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "Output {}", value) {
            self.error = Some(e);
        }
    }
}

/// Interactive session: one statement per line against a persistent machine.
///
/// Jumps are evaluated but never taken. `:state` prints the machine state as
/// JSON, `:quit` or EXIT ends the session.
pub fn run_repl<R: BufRead, W: Write>(input: R, out: &mut W) -> io::Result<()> {
    let mut vm = VirtualMachine::new();

    write!(out, "> ")?;
    out.flush()?;

    for (index, line) in input.lines().enumerate() {
        let line = line?;

        match line.trim() {
            ":quit" | ":q" => break,
            ":state" => {
                let snapshot = vm.state().snapshot();
                let json = serde_json::to_string_pretty(&snapshot).map_err(io::Error::other)?;
                writeln!(out, "{}", json)?;
            }
            _ => {
                let mut sink = WriterSink::new(&mut *out);
                let result = vm.run_line(&line, &mut sink);
                sink.finish()?;
                match result {
                    Ok(0) => {}
                    Ok(distance) => writeln!(out, "(jump {} ignored)", distance)?,
                    Err(error) => {
                        let failure = LineFailure {
                            line: index + 1,
                            text: line.clone(),
                            error,
                        };
                        writeln!(out, "{}", failure)?;
                    }
                }
                if vm.state().last_category == Category::Exit {
                    break;
                }
            }
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut out = Vec::new();
        run_repl(input.as_bytes(), &mut out).expect("repl should not fail on in-memory io");
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_statements_share_state() {
        let out = session("MOV M1, 6\nPUSH M1\nPUSH 7\nMUL\nPOP M2\nOUTPUT M2\n");
        assert!(out.contains("Output 42"), "{}", out);
    }

    #[test]
    fn test_failures_are_printed() {
        let out = session("POP M1\nOUTPUT 3\n");
        assert!(out.contains("Instruction failed \"POP M1\" Error: Stack not ready"));
        assert!(out.contains("Output 3"));
    }

    /// Accepts the prompt, then fails every later write.
    struct BrokenPipe {
        writes: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if self.writes > 1 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_write_error_ends_session() {
        let mut out = BrokenPipe { writes: 0 };
        let mut input = "OUTPUT 1\nOUTPUT 2\n".as_bytes();
        let err = run_repl(&mut input, &mut out).expect_err("write error should surface");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        // stopped at the first OUTPUT instead of carrying on
        assert_eq!(out.writes, 2);
    }

    #[test]
    fn test_failure_uses_line_failure_format() {
        let out = session("OUTPUT 1\nFOO 1,2\n");
        let expected = LineFailure {
            line: 2,
            text: "FOO 1,2".to_string(),
            error: crate::error::VmError::InvalidCommand,
        };
        assert!(out.contains(&expected.to_string()), "{}", out);
    }

    #[test]
    fn test_exit_ends_session() {
        let out = session("EXIT\nOUTPUT 1\n");
        assert!(!out.contains("Output 1"));
    }

    #[test]
    fn test_jump_is_not_taken() {
        let out = session("CMP 1, 1\nJZ 4\n");
        assert!(out.contains("(jump 4 ignored)"));
    }

    #[test]
    fn test_state_dump() {
        let out = session("MOV M3, 9\n:state\n:quit\nOUTPUT 1\n");
        assert!(out.contains("\"memory\""));
        assert!(out.contains("9"));
        assert!(!out.contains("Output 1"));
    }
}
