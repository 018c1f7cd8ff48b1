use crate::bytecode::{Category, Instruction};
use crate::error::{LineFailure, Result, VmError};
use crate::parser::Parser;
use crate::runtime::executor::Executor;
use crate::runtime::sink::Sink;
use crate::runtime::state::MachineState;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct VmConfig {
    /// Upper bound on dispatched instructions. `None` runs until EXIT or the
    /// end of the program.
    pub max_steps: Option<usize>,
}

/// What happened during one call to [`VirtualMachine::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions handed to the executor, failed ones included.
    pub steps: usize,
    pub failures: Vec<LineFailure>,
    /// True when the run stopped on EXIT rather than by running off the end.
    pub halted: bool,
}

/// Drives a program line by line.
///
/// The machine state lives as long as the `VirtualMachine`; use a fresh one
/// per program.
#[derive(Debug, Default)]
pub struct VirtualMachine {
    parser: Parser,
    executor: Executor,
    config: VmConfig,
}

impl VirtualMachine {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        VirtualMachine {
            parser: Parser::new(),
            executor: Executor::new(),
            config,
        }
    }

    pub fn state(&self) -> &MachineState {
        self.executor.state()
    }

    /// Runs `lines` until EXIT or until the line index leaves the program.
    ///
    /// A statement that fails to parse or execute is reported to `sink` and
    /// skipped. Only run-level problems (a jump before the first line, the
    /// step limit) end the run with an error.
    pub fn run<S: AsRef<str>>(&mut self, lines: &[S], sink: &mut dyn Sink) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut ip: usize = 0;

        while ip < lines.len() && self.state().last_category != Category::Exit {
            let text = lines[ip].as_ref();
            if text.trim().is_empty() {
                ip += 1;
                continue;
            }

            let instruction = match self.parser.parse_statement(text) {
                Ok(Some(instruction)) => instruction,
                Ok(None) => {
                    ip += 1;
                    continue;
                }
                Err(error) => {
                    self.report(ip, text, error, sink, &mut summary);
                    ip += 1;
                    continue;
                }
            };

            self.check_limits(summary.steps)?;
            summary.steps += 1;

            match self.execute(ip, &instruction, sink) {
                Ok(0) => ip += 1,
                Ok(distance) => ip = jump_target(ip, distance, lines.len())?,
                Err(error) => {
                    self.report(ip, text, error, sink, &mut summary);
                    ip += 1;
                }
            }
        }

        summary.halted = self.state().last_category == Category::Exit;
        info!(
            steps = summary.steps,
            failures = summary.failures.len(),
            halted = summary.halted,
            "run finished"
        );
        Ok(summary)
    }

    /// Parses and executes a single statement against the current state.
    ///
    /// The returned jump distance is not applied; there is no program to
    /// jump within.
    pub fn run_line(&mut self, text: &str, sink: &mut dyn Sink) -> Result<i64> {
        match self.parser.parse_statement(text)? {
            Some(instruction) => self.executor.process_instruction(&instruction, sink),
            None => Ok(0),
        }
    }

    fn execute(&mut self, ip: usize, instruction: &Instruction, sink: &mut dyn Sink) -> Result<i64> {
        debug!(line = ip + 1, %instruction, "dispatch");
        self.executor.process_instruction(instruction, sink)
    }

    fn check_limits(&self, steps: usize) -> Result<()> {
        if let Some(max) = self.config.max_steps {
            if steps >= max {
                return Err(VmError::StepLimitExceeded(max));
            }
        }
        Ok(())
    }

    fn report(
        &self,
        ip: usize,
        text: &str,
        error: VmError,
        sink: &mut dyn Sink,
        summary: &mut RunSummary,
    ) {
        let failure = LineFailure {
            line: ip + 1,
            text: text.to_string(),
            error,
        };
        warn!(line = failure.line, error = %failure.error, "{}", failure.text);
        sink.failure(&failure);
        summary.failures.push(failure);
    }
}

/// Applies a relative jump. Landing past the end stops the run; landing
/// before the start is an error.
fn jump_target(ip: usize, distance: i64, len: usize) -> Result<usize> {
    let out_of_range = VmError::JumpOutOfRange {
        line: ip + 1,
        distance,
    };
    let Some(target) = i64::try_from(ip).ok().and_then(|ip| ip.checked_add(distance)) else {
        return if distance > 0 { Ok(len) } else { Err(out_of_range) };
    };
    usize::try_from(target).map_err(|_| out_of_range)
}
