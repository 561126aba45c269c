use crate::config::DriverConfig;
use crate::consumer::{Consumer, ConsumerExit, EXIT_COMMAND};
use crate::engine::assembler::FrameAssembler;
use crate::engine::state::{DriverState, ExitReason};
use crate::engine::stop::StopHandle;
use crate::error::{DriverError, Result};
use crate::observability::StreamMetrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, trace, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames_written: u64,
    pub final_state: DriverState,
    pub exit_reason: ExitReason,
    /// Consumer exit code; `None` when it was ended by a signal
    pub exit_code: Option<i32>,
}

/// Paces frames into a consumer until it dies or the run is stopped.
pub struct StreamDriver<C: Consumer> {
    assembler: FrameAssembler,
    consumer: C,
    state: DriverState,
    index: u64,
    interval: Duration,
    shutdown_timeout: Duration,
    frame_limit: Option<u64>,
    send_exit_command: bool,
    /// Set when a stop request abandoned a frame halfway through its write
    partial_line: bool,
    stop: StopHandle,
    metrics: Arc<StreamMetrics>,
}

impl<C: Consumer> StreamDriver<C> {
    /// The consumer must already be running with its input open.
    pub fn new(config: &DriverConfig, consumer: C) -> Result<Self> {
        config.validate()?;
        let assembler = FrameAssembler::new(config.channels, config.random_mode, config.seed)?;
        Ok(Self {
            assembler,
            consumer,
            state: DriverState::Running,
            index: 0,
            interval: config.interval(),
            shutdown_timeout: config.shutdown_timeout(),
            frame_limit: config.frame_limit,
            send_exit_command: config.send_exit_command,
            partial_line: false,
            stop: StopHandle::new(),
            metrics: Arc::new(StreamMetrics::new()),
        })
    }

    /// Checked every tick and raced against each write, so a consumer that
    /// stopped reading cannot hold the run open.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn metrics(&self) -> Arc<StreamMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frame_index(&self) -> u64 {
        self.index
    }

    fn transition_to(&mut self, next: DriverState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid driver transition {} -> {}",
            self.state.name(),
            next.name()
        );
        debug!(from = self.state.name(), to = next.name(), "driver state change");
        self.state = next;
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        info!(
            channels = self.assembler.channels(),
            random_channels = self.assembler.random_count(),
            interval_us = self.interval.as_micros() as u64,
            "streaming frames"
        );

        let (reason, early_exit) = self.stream().await?;

        // One budget covers the quit request and the wait for exit.
        let deadline = Instant::now() + self.shutdown_timeout;
        match reason {
            ExitReason::ConsumerExited | ExitReason::BrokenPipe => {
                info!(frames = self.index, ?reason, "consumer is gone");
                self.transition_to(DriverState::ConsumerDead);
            }
            ExitReason::StopRequested | ExitReason::FrameLimit => {
                info!(frames = self.index, ?reason, "stopping consumer");
                let requested = timeout_at(deadline, self.request_consumer_exit()).await;
                match requested {
                    Ok(result) => result?,
                    Err(_) => warn!("consumer input stayed blocked during shutdown"),
                }
            }
        }

        self.transition_to(DriverState::Stopped);
        let exit = match early_exit {
            Some(exit) => exit,
            None => self.await_consumer_exit(deadline).await?,
        };

        info!(exit_code = ?exit.code, "{}", self.metrics.generate_report());

        Ok(RunSummary {
            frames_written: self.index,
            final_state: self.state,
            exit_reason: reason,
            exit_code: exit.code,
        })
    }

    /// Tick loop. Returns why it ended, plus the exit status when the
    /// liveness check already observed it.
    async fn stream(&mut self) -> Result<(ExitReason, Option<ConsumerExit>)> {
        loop {
            if self.stop.is_stopped() {
                return Ok((ExitReason::StopRequested, None));
            }
            if self.frame_limit.is_some_and(|limit| self.index >= limit) {
                return Ok((ExitReason::FrameLimit, None));
            }
            if let Some(exit) = self.consumer.try_exit()? {
                return Ok((ExitReason::ConsumerExited, Some(exit)));
            }

            let started = self.metrics.start_tick();
            let frame = self.assembler.assemble(self.index);
            let line = frame.to_line();
            let written = tokio::select! {
                result = self.consumer.write_line(&line) => result,
                _ = self.stop.stopped() => {
                    warn!(index = self.index, "stop requested while a write was blocked");
                    self.partial_line = true;
                    return Ok((ExitReason::StopRequested, None));
                }
            };
            match written {
                Ok(()) => {}
                Err(e) if e.is_broken_pipe() => {
                    warn!(index = self.index, "consumer closed its input mid-write");
                    self.metrics.record_broken_pipe();
                    return Ok((ExitReason::BrokenPipe, None));
                }
                Err(e) => return Err(e),
            }
            self.metrics.record_frame_written(started);
            trace!(index = frame.index, amplitude = frame.amplitude, "frame written");

            self.index += 1;
            sleep(self.interval).await;
        }
    }

    /// Ask the consumer to quit and close its input. A consumer that is
    /// already gone is fine here.
    async fn request_consumer_exit(&mut self) -> Result<()> {
        // After an abandoned write the quit command would land mid-line.
        if self.send_exit_command && !self.partial_line {
            match self.consumer.write_line(EXIT_COMMAND).await {
                Err(e) if !e.is_broken_pipe() => return Err(e),
                _ => {}
            }
        }
        match self.consumer.close_input().await {
            Err(e) if !e.is_broken_pipe() => Err(e),
            _ => Ok(()),
        }
    }

    async fn await_consumer_exit(&mut self, deadline: Instant) -> Result<ConsumerExit> {
        let waited = timeout_at(deadline, self.consumer.wait()).await;
        match waited {
            Ok(exit) => exit,
            Err(_) => {
                warn!(timeout = ?self.shutdown_timeout, "consumer did not exit, killing it");
                if let Err(e) = self.consumer.kill().await {
                    warn!(error = %e, "failed to kill consumer");
                }
                Err(DriverError::ShutdownTimeout(self.shutdown_timeout))
            }
        }
    }
}
