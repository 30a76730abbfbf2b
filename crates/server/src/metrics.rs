//! Cascade counters shared between simulation layers and the stats reporter.
//!
//! Writers bump relaxed atomics after each cascade. Readers take a
//! [`MetricsSnapshot`] and diff consecutive ones for rates.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

use crate::event_bus::CascadeOutcome;

/// Upper bounds (exclusive, in microseconds) of the first four duration
/// buckets. Anything slower lands in the last one.
const BUCKET_BOUNDS_US: [u128; 4] = [1, 10, 100, 1_000];

pub struct Metrics {
    events: AtomicU64,
    cascades: AtomicU64,
    busy_ns: AtomicU64,
    writes: AtomicU64,
    spawns: AtomicU64,
    durations: [AtomicU64; BUCKET_BOUNDS_US.len() + 1],
    since: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            events: AtomicU64::new(0),
            cascades: AtomicU64::new(0),
            busy_ns: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            spawns: AtomicU64::new(0),
            durations: Default::default(),
            since: Instant::now(),
        }
    }

    /// Account for one cascade that ran to quiescence.
    pub fn record_cascade(&self, events: u64, duration: Duration, outcome: &CascadeOutcome) {
        self.cascades.fetch_add(1, Relaxed);
        self.events.fetch_add(events, Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.busy_ns.fetch_add(nanos, Relaxed);
        self.writes.fetch_add(outcome.changes.len() as u64, Relaxed);
        self.spawns.fetch_add(outcome.spawns.len() as u64, Relaxed);
        self.durations[bucket_for(duration)].fetch_add(1, Relaxed);
    }

    pub fn snapshot(&self, chunks_loaded: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.since.elapsed().as_secs_f64(),
            events_total: self.events.load(Relaxed),
            cascades_total: self.cascades.load(Relaxed),
            cascade_ns_sum: self.busy_ns.load(Relaxed),
            block_writes: self.writes.load(Relaxed),
            falling_spawns: self.spawns.load(Relaxed),
            chunks_loaded,
            hist: self.durations.each_ref().map(|bucket| bucket.load(Relaxed)),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn bucket_for(duration: Duration) -> usize {
    let micros = duration.as_micros();
    BUCKET_BOUNDS_US
        .iter()
        .position(|&bound| micros < bound)
        .unwrap_or(BUCKET_BOUNDS_US.len())
}

/// Point-in-time copy of every counter.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub events_total: u64,
    pub cascades_total: u64,
    pub cascade_ns_sum: u64,
    pub block_writes: u64,
    pub falling_spawns: u64,
    pub chunks_loaded: u64,
    /// Cascade durations: `[<1μs, 1-10μs, 10-100μs, 100μs-1ms, >=1ms]`.
    pub hist: [u64; 5],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_fall_into_decade_buckets() {
        assert_eq!(bucket_for(Duration::from_nanos(900)), 0);
        assert_eq!(bucket_for(Duration::from_micros(1)), 1);
        assert_eq!(bucket_for(Duration::from_micros(99)), 2);
        assert_eq!(bucket_for(Duration::from_micros(100)), 3);
        assert_eq!(bucket_for(Duration::from_millis(1)), 4);
        assert_eq!(bucket_for(Duration::from_secs(3)), 4);
    }
}
