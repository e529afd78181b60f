//! Progress tracking utility
//!
//! Logs throughput of long byte-oriented operations (image hashing) at a
//! fixed byte interval.

use std::time::Instant;

use super::bytes_to_mb;
use crate::{log_debug, log_info};

/// Progress tracker with speed calculation
pub struct ProgressTracker {
    operation: String,
    module: String,
    total_bytes: u64,
    processed_bytes: u64,
    interval_bytes: u64,
    next_log_at: u64,
    started: Instant,
    last_log: Instant,
    last_log_bytes: u64,
}

/// Snapshot emitted each time an interval boundary is crossed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub current_mb: f64,
    pub total_mb: f64,
    /// 0 when the total is unknown
    pub percent: f64,
    pub speed_mbps: f64,
}

/// Final summary of an operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub total_mb: f64,
    pub elapsed_secs: f64,
    pub avg_speed_mbps: f64,
}

impl ProgressTracker {
    /// `total_bytes` may be 0 when unknown; `log_interval_mb` of 0 disables
    /// intermediate updates.
    pub fn new(operation: &str, module: &str, total_bytes: u64, log_interval_mb: u64) -> Self {
        let now = Instant::now();
        let interval_bytes = log_interval_mb * 1024 * 1024;
        Self {
            operation: operation.to_string(),
            module: module.to_string(),
            total_bytes,
            processed_bytes: 0,
            interval_bytes,
            next_log_at: interval_bytes,
            started: now,
            last_log: now,
            last_log_bytes: 0,
        }
    }

    pub fn processed_bytes(&self) -> u64 {
        self.processed_bytes
    }

    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.processed_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }

    /// Record `bytes_added`; returns an update when an interval is crossed
    pub fn update(&mut self, bytes_added: u64) -> Option<ProgressUpdate> {
        self.processed_bytes += bytes_added;

        if self.interval_bytes == 0 || self.processed_bytes < self.next_log_at {
            return None;
        }

        while self.next_log_at <= self.processed_bytes {
            self.next_log_at += self.interval_bytes;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_log).as_secs_f64();
        let speed_mbps = if elapsed > 0.0 {
            bytes_to_mb(self.processed_bytes - self.last_log_bytes) / elapsed
        } else {
            0.0
        };
        self.last_log = now;
        self.last_log_bytes = self.processed_bytes;

        let update = ProgressUpdate {
            current_mb: bytes_to_mb(self.processed_bytes),
            total_mb: bytes_to_mb(self.total_bytes),
            percent: self.percent(),
            speed_mbps,
        };

        log_debug!(
            &self.module,
            "{} progress: {:.1} MB / {:.1} MB ({:.1}%) @ {:.1} MB/s",
            self.operation,
            update.current_mb,
            update.total_mb,
            update.percent,
            update.speed_mbps
        );

        Some(update)
    }

    /// Log and return the completion summary
    pub fn finish(&self) -> ProgressSummary {
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        let total_mb = bytes_to_mb(self.processed_bytes);
        let summary = ProgressSummary {
            total_mb,
            elapsed_secs,
            avg_speed_mbps: if elapsed_secs > 0.0 {
                total_mb / elapsed_secs
            } else {
                0.0
            },
        };

        log_info!(
            &self.module,
            "{} complete: {:.1} MB in {:.1}s (avg {:.1} MB/s)",
            self.operation,
            summary.total_mb,
            summary.elapsed_secs,
            summary.avg_speed_mbps
        );

        summary
    }
}
