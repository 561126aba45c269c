use graphfeed::consumer::MockConsumer;
use graphfeed::engine::{DriverState, ExitReason, StreamDriver};
use graphfeed::{DriverConfig, DriverError};
use std::time::Duration;

fn config(channels: usize) -> DriverConfig {
    DriverConfig {
        channels,
        seed: Some(42),
        ..Default::default()
    }
}

fn first_value(line: &str) -> f64 {
    line.split(", ").next().unwrap().parse().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_dead_consumer_stops_without_writing() {
    let consumer = MockConsumer::exited();
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.frames_written, 0);
    assert_eq!(summary.exit_reason, ExitReason::ConsumerExited);
    assert_eq!(summary.final_state, DriverState::Stopped);
    assert_eq!(driver.state(), DriverState::Stopped);
    assert!(handle.lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_frames_written_in_index_order() {
    let consumer = MockConsumer::new().exit_after(5);
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(10), consumer).unwrap();

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.frames_written, 5);
    assert_eq!(summary.exit_reason, ExitReason::ConsumerExited);
    assert_eq!(summary.exit_code, Some(0));

    let lines = handle.lines();
    assert_eq!(lines.len(), 5);
    for (idx, line) in lines.iter().enumerate() {
        assert!(line.ends_with('\n'));
        assert_eq!(line.trim_end().split(", ").count(), 10);
        // Ramp up advances by 2 per frame
        assert_eq!(first_value(line), 2.0 * idx as f64);
    }
}

#[tokio::test(start_paused = true)]
async fn test_broken_pipe_treated_as_consumer_death() {
    let consumer = MockConsumer::new().break_pipe_after(3);
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();
    let metrics = driver.metrics();

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.exit_reason, ExitReason::BrokenPipe);
    assert_eq!(summary.frames_written, 3);
    assert_eq!(summary.final_state, DriverState::Stopped);
    assert_eq!(handle.lines().len(), 3);
    assert_eq!(metrics.frames_written(), 3);
    assert_eq!(metrics.broken_pipes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_frame_limit_sends_exit_command() {
    let consumer = MockConsumer::new();
    let handle = consumer.handle();
    let config = DriverConfig {
        frame_limit: Some(10),
        ..config(8)
    };
    let mut driver = StreamDriver::new(&config, consumer).unwrap();

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.exit_reason, ExitReason::FrameLimit);
    assert_eq!(summary.frames_written, 10);
    assert_eq!(driver.frame_index(), 10);

    let lines = handle.lines();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines.last().unwrap(), "exit\n");
    assert!(handle.input_closed());
    assert!(!handle.killed());
}

#[tokio::test(start_paused = true)]
async fn test_exit_command_can_be_disabled() {
    let consumer = MockConsumer::new();
    let handle = consumer.handle();
    let config = DriverConfig {
        frame_limit: Some(4),
        send_exit_command: false,
        ..config(6)
    };
    let mut driver = StreamDriver::new(&config, consumer).unwrap();

    driver.run().await.unwrap();

    let lines = handle.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l != "exit\n"));
    assert!(handle.input_closed());
}

#[tokio::test(start_paused = true)]
async fn test_stop_flag_before_first_tick() {
    let consumer = MockConsumer::new();
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();
    driver.stop_handle().stop();

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.exit_reason, ExitReason::StopRequested);
    assert_eq!(summary.frames_written, 0);
    assert_eq!(handle.lines(), vec!["exit\n".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_flag_during_run() {
    let consumer = MockConsumer::new();
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();
    let stop = driver.stop_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.stop();
    });

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.exit_reason, ExitReason::StopRequested);
    assert!(summary.frames_written > 0);
    assert_eq!(handle.lines().len() as u64, summary.frames_written + 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_consumer_is_shutdown_timeout() {
    let consumer = MockConsumer::new().hang_on_shutdown();
    let handle = consumer.handle();
    let config = DriverConfig {
        frame_limit: Some(2),
        ..config(6)
    };
    let mut driver = StreamDriver::new(&config, consumer).unwrap();

    let err = driver.run().await.unwrap_err();

    assert!(matches!(err, DriverError::ShutdownTimeout(t) if t == Duration::from_secs(3)));
    assert_eq!(driver.state(), DriverState::Stopped);
    assert!(handle.killed());
}

#[test]
fn test_invalid_channel_count_rejected() {
    let err = StreamDriver::new(&config(3), MockConsumer::new())
        .err()
        .expect("3 channels must be rejected");
    assert!(matches!(err, DriverError::Configuration(_)));
}

#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_blocked_write() {
    let consumer = MockConsumer::new().block_writes_after(3).hang_on_shutdown();
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();
    let stop = driver.stop_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();
    });

    let result = tokio::time::timeout(Duration::from_secs(10), driver.run())
        .await
        .expect("run must finish after stop");

    assert!(matches!(result, Err(DriverError::ShutdownTimeout(_))));
    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(driver.frame_index(), 3);
    // The abandoned frame must not be followed by a quit command mid-line.
    assert_eq!(handle.lines().len(), 3);
    assert!(handle.input_closed());
    assert!(handle.killed());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_blocked_write_with_cooperative_consumer() {
    let consumer = MockConsumer::new().block_writes_after(2);
    let handle = consumer.handle();
    let mut driver = StreamDriver::new(&config(6), consumer).unwrap();
    let stop = driver.stop_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();
    });

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.exit_reason, ExitReason::StopRequested);
    assert_eq!(summary.frames_written, 2);
    assert!(!handle.killed());
}
