pub mod mock;
pub mod process;

pub use mock::{MockConsumer, MockHandle};
pub use process::ProcessConsumer;

use crate::error::Result;
use async_trait::async_trait;

/// Quit command understood by the graphing consumer.
pub const EXIT_COMMAND: &str = "exit\n";

/// How the consumer ended. `code` is absent when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerExit {
    pub code: Option<i32>,
}

/// Receiving end of the frame stream.
#[async_trait]
pub trait Consumer: Send {
    /// Non-blocking liveness check. `Some` once the consumer has exited.
    fn try_exit(&mut self) -> Result<Option<ConsumerExit>>;

    /// Write one complete line and flush it. A closed input surfaces as a
    /// broken-pipe I/O error.
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Close the consumer's input so it sees end-of-stream.
    async fn close_input(&mut self) -> Result<()>;

    /// Block until the consumer exits. Callers bound this with a timeout.
    async fn wait(&mut self) -> Result<ConsumerExit>;

    /// Force the consumer down.
    async fn kill(&mut self) -> Result<()>;
}
