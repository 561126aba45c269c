use anyhow::{Context, Result};
use clap::Parser;
use graphfeed::consumer::ProcessConsumer;
use graphfeed::engine::StreamDriver;
use graphfeed::generators::RandomMode;
use graphfeed::DriverConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Feed synthetic multi-channel frames into a graphing process.
#[derive(Debug, Parser)]
#[command(name = "graphfeed", version, long_about = None)]
struct Cli {
    /// Total channels per frame (at least 4)
    #[arg(value_name = "CHANNELS")]
    channels: Option<usize>,

    /// JSON config file; flags given here override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Consumer program to launch
    #[arg(long, value_name = "PATH")]
    consumer: Option<PathBuf>,

    /// Extra consumer argument, passed after the channel count (repeatable)
    #[arg(long = "consumer-arg", value_name = "ARG", allow_hyphen_values = true)]
    consumer_args: Vec<String>,

    /// File receiving the consumer's stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Delay between frames
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// How long to wait for the consumer to exit
    #[arg(long, value_name = "MS")]
    shutdown_timeout_ms: Option<u64>,

    /// Stop after writing this many frames
    #[arg(long = "frames", value_name = "COUNT")]
    frame_limit: Option<u64>,

    /// Emit distinct integers instead of floats on random channels
    #[arg(long)]
    integer: bool,

    /// Seed for reproducible random channels
    #[arg(long)]
    seed: Option<u64>,

    /// Close the consumer's input without sending `exit` first
    #[arg(long)]
    no_exit_command: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load_file(path)?,
            None => DriverConfig::default(),
        };

        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(consumer) = self.consumer {
            config.consumer = consumer;
        }
        if !self.consumer_args.is_empty() {
            config.consumer_args = self.consumer_args;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if let Some(ms) = self.shutdown_timeout_ms {
            config.shutdown_timeout_ms = ms;
        }
        if self.frame_limit.is_some() {
            config.frame_limit = self.frame_limit;
        }
        if self.integer {
            config.random_mode = RandomMode::Integer;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_exit_command {
            config.send_exit_command = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout belongs to the consumer, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.into_config().context("invalid configuration")?;
    let consumer = ProcessConsumer::spawn(&config)?;
    let mut driver = StreamDriver::new(&config, consumer)?;

    let stop = driver.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            stop.stop();
        }
    });

    let summary = driver.run().await.context("stream driver failed")?;
    tracing::info!(
        frames = summary.frames_written,
        reason = ?summary.exit_reason,
        "run finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_channels_default() {
        let config = Cli::try_parse_from(["graphfeed"]).unwrap().into_config().unwrap();
        assert_eq!(config.channels, 10);

        let config = Cli::try_parse_from(["graphfeed", "16"]).unwrap().into_config().unwrap();
        assert_eq!(config.channels, 16);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "graphfeed",
            "6",
            "--consumer",
            "/usr/bin/graph",
            "--frames",
            "20",
            "--integer",
            "--no-exit-command",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.consumer, PathBuf::from("/usr/bin/graph"));
        assert_eq!(config.frame_limit, Some(20));
        assert_eq!(config.random_mode, RandomMode::Integer);
        assert!(!config.send_exit_command);
    }

    #[test]
    fn test_flags_override_config_file_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphfeed.json");
        std::fs::write(&path, r#"{"channels": 3, "interval_ms": 5}"#).unwrap();
        let path = path.to_str().unwrap();

        let config = Cli::try_parse_from(["graphfeed", "8", "--config", path])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.channels, 8);
        assert_eq!(config.interval_ms, 5);

        // Without an override the file's value is still rejected.
        let cli = Cli::try_parse_from(["graphfeed", "--config", path]).unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_too_few_channels_rejected() {
        let cli = Cli::try_parse_from(["graphfeed", "3"]).unwrap();
        assert!(cli.into_config().is_err());
    }
}
