pub mod executor;
pub mod sink;
pub mod state;
pub mod vm;

pub use executor::Executor;
pub use sink::{ConsoleSink, RecordingSink, Sink};
pub use state::{MEMORY_CELLS, MachineState, StateSnapshot};
pub use vm::{RunSummary, VirtualMachine, VmConfig};
