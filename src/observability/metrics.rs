use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one streaming run. Shared behind an `Arc` so the binary can
/// report them after the driver finishes.
#[derive(Default)]
pub struct StreamMetrics {
    frames_written: AtomicU64,
    broken_pipes: AtomicU64,
    total_tick_us: AtomicU64,
    max_tick_us: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames_written: u64,
    pub broken_pipes: u64,
    pub avg_tick_us: u64,
    pub max_tick_us: u64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written.load(Ordering::Relaxed)
    }

    pub fn broken_pipes(&self) -> u64 {
        self.broken_pipes.load(Ordering::Relaxed)
    }

    pub fn start_tick(&self) -> Instant {
        Instant::now()
    }

    /// Record a frame that reached the consumer; latency covers assembly and write.
    pub fn record_frame_written(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.frames_written.fetch_add(1, Ordering::Relaxed);
        self.total_tick_us.fetch_add(latency_us, Ordering::Relaxed);
        self.max_tick_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn record_broken_pipe(&self) {
        self.broken_pipes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_tick_us(&self) -> u64 {
        let frames = self.frames_written();
        if frames == 0 {
            return 0;
        }
        self.total_tick_us.load(Ordering::Relaxed) / frames
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_written: self.frames_written(),
            broken_pipes: self.broken_pipes(),
            avg_tick_us: self.avg_tick_us(),
            max_tick_us: self.max_tick_us.load(Ordering::Relaxed),
        }
    }

    pub fn generate_report(&self) -> String {
        let s = self.snapshot();
        format!(
            "frames written: {}, broken pipes: {}, avg tick: {}μs, max tick: {}μs",
            s.frames_written, s.broken_pipes, s.avg_tick_us, s.max_tick_us
        )
    }
}
