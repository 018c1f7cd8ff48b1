use crate::error::LineFailure;

/// Where a run sends `OUTPUT` values and per-line failures.
pub trait Sink {
    fn output(&mut self, value: i64);

    fn failure(&mut self, _failure: &LineFailure) {}
}

/// Prints to stdout the way the command-line tool always has.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn output(&mut self, value: i64) {
        println!("Output {}", value);
    }

    fn failure(&mut self, failure: &LineFailure) {
        println!("{}", failure);
    }
}

/// Collects everything in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub outputs: Vec<i64>,
    pub failures: Vec<LineFailure>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for RecordingSink {
    fn output(&mut self, value: i64) {
        self.outputs.push(value);
    }

    fn failure(&mut self, failure: &LineFailure) {
        self.failures.push(failure.clone());
    }
}

impl Sink for Vec<i64> {
    fn output(&mut self, value: i64) {
        self.push(value);
    }
}
