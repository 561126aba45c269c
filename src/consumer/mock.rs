use super::{Consumer, ConsumerExit};
use crate::error::Result;
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    lines: Vec<String>,
    input_closed: bool,
    exited: bool,
    killed: bool,
    /// Report exit after this many lines have been accepted
    exit_after: Option<usize>,
    /// Fail writes with a broken pipe once this many lines have been accepted,
    /// while the liveness check still reports the consumer as running
    break_pipe_after: Option<usize>,
    /// Stop reading once this many lines have been accepted, so further
    /// writes never complete
    block_writes_after: Option<usize>,
    /// Ignore end-of-input and never exit on its own
    hang_on_shutdown: bool,
}

/// Scripted in-memory consumer. Lines written to it can be inspected through
/// a [`MockHandle`] after the consumer has been moved into a driver.
pub struct MockConsumer {
    state: Arc<Mutex<MockState>>,
}

/// Shared view into a [`MockConsumer`].
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConsumer {
    /// A consumer that accepts every line and exits once its input closes.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Already gone before the first tick.
    pub fn exited() -> Self {
        let consumer = Self::new();
        lock(&consumer.state).exited = true;
        consumer
    }

    pub fn exit_after(self, lines: usize) -> Self {
        lock(&self.state).exit_after = Some(lines);
        self
    }

    pub fn break_pipe_after(self, lines: usize) -> Self {
        lock(&self.state).break_pipe_after = Some(lines);
        self
    }

    pub fn block_writes_after(self, lines: usize) -> Self {
        lock(&self.state).block_writes_after = Some(lines);
        self
    }

    pub fn hang_on_shutdown(self) -> Self {
        lock(&self.state).hang_on_shutdown = true;
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl MockHandle {
    pub fn lines(&self) -> Vec<String> {
        lock(&self.state).lines.clone()
    }

    pub fn input_closed(&self) -> bool {
        lock(&self.state).input_closed
    }

    pub fn killed(&self) -> bool {
        lock(&self.state).killed
    }
}

#[async_trait]
impl Consumer for MockConsumer {
    fn try_exit(&mut self) -> Result<Option<ConsumerExit>> {
        let state = lock(&self.state);
        Ok(state.exited.then_some(ConsumerExit { code: Some(0) }))
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let blocked = {
            let state = lock(&self.state);
            state.block_writes_after.is_some_and(|n| state.lines.len() >= n)
        };
        if blocked {
            std::future::pending::<()>().await;
        }

        let mut state = lock(&self.state);
        let broken = state.exited
            || state.input_closed
            || state.break_pipe_after.is_some_and(|n| state.lines.len() >= n);
        if broken {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        state.lines.push(line.to_string());
        if state.exit_after.is_some_and(|n| state.lines.len() >= n) {
            state.exited = true;
        }
        Ok(())
    }

    async fn close_input(&mut self) -> Result<()> {
        lock(&self.state).input_closed = true;
        Ok(())
    }

    async fn wait(&mut self) -> Result<ConsumerExit> {
        let hang = {
            let mut state = lock(&self.state);
            state.input_closed = true;
            let hang = state.hang_on_shutdown && !state.exited;
            if !hang {
                state.exited = true;
            }
            hang
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(ConsumerExit { code: Some(0) })
    }

    async fn kill(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.killed = true;
        state.exited = true;
        Ok(())
    }
}
