use serde::Serialize;
use std::time::{Duration, Instant};

use crate::preview::types::DropReason;

/// Collects diagnostic statistics for a preview session.
pub struct DiagnosticStats {
    frame_count: u64,
    busy_drops: u64,
    filter_errors: u64,
    empty_polls: u64,
    total_bytes: u64,
    start_time: Instant,
    last_frame_time: Option<Instant>,
    latency_us: u64,
}

/// Snapshot of diagnostic stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub fps: f64,
    pub frame_count: u64,
    pub drop_count: u64,
    pub busy_drops: u64,
    pub filter_errors: u64,
    pub empty_polls: u64,
    /// Milliseconds since the last presented frame, if any.
    pub idle_ms: Option<f64>,
    pub drop_rate: f64,
    pub latency_ms: f64,
    pub bandwidth_bps: u64,
}

impl DiagnosticStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            busy_drops: 0,
            filter_errors: 0,
            empty_polls: 0,
            total_bytes: 0,
            start_time: Instant::now(),
            last_frame_time: None,
            latency_us: 0,
        }
    }

    /// Record a presented frame: raw bytes consumed and filter+present time.
    pub fn record_frame(&mut self, bytes: usize, elapsed: Duration) {
        self.frame_count += 1;
        self.total_bytes += bytes as u64;
        self.last_frame_time = Some(Instant::now());
        self.latency_us = elapsed.as_micros() as u64;
    }

    /// Record a frame that was not presented.
    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::Busy => self.busy_drops += 1,
            DropReason::FilterFailed => self.filter_errors += 1,
            DropReason::NoFrame => self.empty_polls += 1,
        }
    }

    /// Record `count` deliveries dropped while another frame was in flight.
    pub fn record_busy_drops(&mut self, count: u64) {
        self.busy_drops += count;
    }

    /// Frames lost to contention or filter failure. Empty polls are not drops.
    pub fn drop_count(&self) -> u64 {
        self.busy_drops + self.filter_errors
    }

    /// Calculate current FPS based on elapsed time.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.frame_count as f64 / elapsed
    }

    /// Drop rate as a percentage (0.0 - 100.0).
    pub fn drop_rate(&self) -> f64 {
        let drops = self.drop_count();
        let total = self.frame_count + drops;
        if total == 0 {
            return 0.0;
        }
        (drops as f64 / total as f64) * 100.0
    }

    /// Latest filter-to-present latency in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency_us as f64 / 1000.0
    }

    /// Raw input bandwidth in bytes per second.
    pub fn bandwidth_bps(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.total_bytes as f64 / elapsed) as u64
    }

    /// Time since the last presented frame, if any.
    pub fn since_last_frame(&self) -> Option<Duration> {
        self.last_frame_time.map(|t| t.elapsed())
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            fps: self.fps(),
            frame_count: self.frame_count,
            drop_count: self.drop_count(),
            busy_drops: self.busy_drops,
            filter_errors: self.filter_errors,
            empty_polls: self.empty_polls,
            idle_ms: self.since_last_frame().map(|d| d.as_secs_f64() * 1000.0),
            drop_rate: self.drop_rate(),
            latency_ms: self.latency_ms(),
            bandwidth_bps: self.bandwidth_bps(),
        }
    }
}

impl Default for DiagnosticStats {
    fn default() -> Self {
        Self::new()
    }
}
