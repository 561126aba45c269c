use super::{Consumer, ConsumerExit};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

/// Consumer running as a child process fed through its stdin.
pub struct ProcessConsumer {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl ProcessConsumer {
    /// Start `<consumer> <channels> [args..]` with stdin piped, stderr sent to
    /// the configured log file and stdout shared with this process.
    pub fn spawn(config: &DriverConfig) -> Result<Self> {
        let log = File::create(&config.log_file).map_err(|source| DriverError::LogSink {
            path: config.log_file.clone(),
            source,
        })?;

        let mut child = Command::new(&config.consumer)
            .arg(config.channels.to_string())
            .args(&config.consumer_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::from(log))
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DriverError::Spawn {
                program: config.consumer.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        tracing::debug!(
            pid = child.id(),
            consumer = %config.consumer.display(),
            log_file = %config.log_file.display(),
            "consumer started"
        );

        Ok(Self { child, stdin })
    }
}

fn to_exit(status: ExitStatus) -> ConsumerExit {
    ConsumerExit {
        code: status.code(),
    }
}

#[async_trait]
impl Consumer for ProcessConsumer {
    fn try_exit(&mut self) -> Result<Option<ConsumerExit>> {
        Ok(self.child.try_wait()?.map(to_exit))
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::BrokenPipe))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn close_input(&mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.shutdown().await?;
        }
        Ok(())
    }

    async fn wait(&mut self) -> Result<ConsumerExit> {
        // Dropping stdin first guarantees the child can observe EOF.
        self.stdin.take();
        Ok(to_exit(self.child.wait().await?))
    }

    async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}
