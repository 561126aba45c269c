use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal driver errors. Consumer-death races never surface here; the driver
/// folds them into a normal shutdown.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to start consumer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open consumer log sink {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("consumer did not exit within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("consumer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl DriverError {
    /// True when the error means the consumer closed its end of the pipe.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Io(e) if is_broken_pipe(e))
    }
}

pub(crate) fn is_broken_pipe(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
    )
}
