use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Throughput counters shared by the worker threads.
#[derive(Debug)]
pub struct Throughput {
    files_processed: AtomicU64,
    lines_processed: AtomicU64,
    start_time: Instant,
}

impl Default for Throughput {
    fn default() -> Self {
        Self::new()
    }
}

impl Throughput {
    pub fn new() -> Self {
        Throughput {
            files_processed: AtomicU64::new(0),
            lines_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record(&self, lines: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.lines_processed.fetch_add(lines, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Timing {
        Timing {
            elapsed: self.start_time.elapsed(),
            files: self.files_processed.load(Ordering::Relaxed),
            lines: self.lines_processed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a [`Throughput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub elapsed: Duration,
    pub files: u64,
    pub lines: u64,
}

impl Timing {
    pub fn files_per_sec(&self) -> f64 {
        safe_rate(self.files, self.elapsed.as_secs_f64())
    }

    pub fn lines_per_sec(&self) -> f64 {
        safe_rate(self.lines, self.elapsed.as_secs_f64())
    }
}

fn safe_rate(value: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= f64::EPSILON {
        0.0
    } else {
        value as f64 / elapsed_secs
    }
}
