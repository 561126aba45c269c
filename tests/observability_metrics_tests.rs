use graphfeed::observability::StreamMetrics;
use std::sync::Arc;

#[test]
fn test_metrics_creation() {
    let metrics = StreamMetrics::new();
    assert_eq!(metrics.frames_written(), 0);
    assert_eq!(metrics.broken_pipes(), 0);
    assert_eq!(metrics.avg_tick_us(), 0);
}

#[test]
fn test_metrics_increment() {
    let metrics = Arc::new(StreamMetrics::new());

    metrics.record_frame_written(metrics.start_tick());
    metrics.record_frame_written(metrics.start_tick());
    assert_eq!(metrics.frames_written(), 2);

    metrics.record_broken_pipe();
    assert_eq!(metrics.broken_pipes(), 1);
}

#[tokio::test]
async fn test_metrics_latency_tracking() {
    let metrics = StreamMetrics::new();

    let start = metrics.start_tick();
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    metrics.record_frame_written(start);

    let snapshot = metrics.snapshot();
    assert!(snapshot.avg_tick_us >= 10_000); // At least 10ms in microseconds
    assert_eq!(snapshot.max_tick_us, snapshot.avg_tick_us);
    assert!(metrics.generate_report().contains("frames written: 1"));
}
