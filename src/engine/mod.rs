pub mod assembler;
pub mod driver;
pub mod state;
pub mod stop;

pub use assembler::FrameAssembler;
pub use driver::{RunSummary, StreamDriver};
pub use state::{DriverState, ExitReason};
pub use stop::StopHandle;
