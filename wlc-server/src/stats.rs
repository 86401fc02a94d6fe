//! # Command Statistics
//!
//! What the `STATS` line reports: private commands per family, how many
//! failed, how many are running, and how long they took.
//!
//! ## Design Principles
//! 1. **Counted At The Socket**: Only lines that reach the dispatcher are
//!    counted; `STATS` and `VENDOR` lines are not.
//! 2. **Failure From The Outcome**: A reply is never a failure. Any other
//!    non-zero status is, whether it is an errno or a vendor status.
//! 3. **Command-Scale Latency**: Most commands are one lock and one MIB
//!    write; firmware round trips land in the millisecond buckets.
//!
//! ```text
//! record_start ──> inflight += 1
//! record_end   ──> inflight -= 1, family += 1, latency bucket += 1
//! snapshot     ──> StatsSnapshot (serde) ──> "0 {...}"
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use wlc_common::{CommandFamily, PrivCommand};

use crate::dispatch::Outcome;

/// Upper bounds of the latency buckets, in microseconds.
pub const DEFAULT_LATENCY_BUCKETS_US: [u64; 10] =
    [25, 50, 100, 250, 500, 1_000, 2_500, 10_000, 50_000, 250_000];

const FAMILIES: [CommandFamily; 8] = [
    CommandFamily::Power,
    CommandFamily::P2p,
    CommandFamily::Ncho,
    CommandFamily::Legacy,
    CommandFamily::Regulatory,
    CommandFamily::Ap,
    CommandFamily::Station,
    CommandFamily::Twt,
];

fn family_slot(family: CommandFamily) -> usize {
    FAMILIES.iter().position(|&f| f == family).unwrap_or(0)
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub commands_total: u64,
    /// Commands that ended without a reply and with a non-zero status.
    pub errors_total: u64,
    /// Lines that did not name a known command.
    pub unknown_total: u64,
    pub inflight: u64,
    pub families: Vec<FamilyCount>,
    pub latency: LatencySnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyCount {
    pub family: &'static str,
    pub commands: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencySnapshot {
    /// Bucket boundaries in microseconds.
    pub bounds_us: Vec<u64>,
    /// Bucket counts, including the overflow bucket at the end.
    pub buckets: Vec<u64>,
    pub samples: u64,
    pub sum_us: u64,
}

/// Counters shared by every connection. All atomics are `Relaxed`.
pub struct CommandStats {
    commands_total: AtomicU64,
    errors_total: AtomicU64,
    unknown_total: AtomicU64,
    inflight: AtomicU64,
    families: [AtomicU64; FAMILIES.len()],
    latency: LatencyHistogram,
}

impl Default for CommandStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStats {
    pub fn new() -> Self {
        Self::with_latency_buckets(DEFAULT_LATENCY_BUCKETS_US.to_vec())
    }

    /// `bounds_us` must be ascending.
    pub fn with_latency_buckets(bounds_us: Vec<u64>) -> Self {
        CommandStats {
            commands_total: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            unknown_total: AtomicU64::new(0),
            inflight: AtomicU64::new(0),
            families: Default::default(),
            latency: LatencyHistogram::new(bounds_us),
        }
    }

    pub fn record_start(&self) {
        self.commands_total.fetch_add(1, Ordering::Relaxed);
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    /// Closes a command opened by `record_start`. `cmd` is `None` when the
    /// name did not resolve.
    pub fn record_end(&self, cmd: Option<PrivCommand>, outcome: Outcome, latency: Duration) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
        self.latency.record(latency);

        match cmd {
            Some(cmd) => {
                self.families[family_slot(cmd.family())].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.unknown_total.fetch_add(1, Ordering::Relaxed);
            }
        }
        if matches!(outcome, Outcome::Status(code) if code != 0) {
            self.errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            commands_total: self.commands_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            unknown_total: self.unknown_total.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
            families: FAMILIES
                .iter()
                .zip(&self.families)
                .map(|(family, count)| FamilyCount {
                    family: family.name(),
                    commands: count.load(Ordering::Relaxed),
                })
                .collect(),
            latency: self.latency.snapshot(),
        }
    }
}

/// Latency histogram with an overflow bucket past the last bound.
pub struct LatencyHistogram {
    bounds_us: Vec<u64>,
    buckets: Vec<AtomicU64>,
    sum_us: AtomicU64,
    samples: AtomicU64,
}

impl LatencyHistogram {
    pub fn new(bounds_us: Vec<u64>) -> Self {
        let buckets = (0..=bounds_us.len()).map(|_| AtomicU64::new(0)).collect();
        LatencyHistogram {
            bounds_us,
            buckets,
            sum_us: AtomicU64::new(0),
            samples: AtomicU64::new(0),
        }
    }

    pub fn record(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.sum_us.fetch_add(micros, Ordering::Relaxed);

        let slot = self
            .bounds_us
            .iter()
            .position(|&bound| micros <= bound)
            .unwrap_or(self.bounds_us.len());
        self.buckets[slot].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        LatencySnapshot {
            bounds_us: self.bounds_us.clone(),
            buckets: self
                .buckets
                .iter()
                .map(|bucket| bucket.load(Ordering::Relaxed))
                .collect(),
            samples: self.samples.load(Ordering::Relaxed),
            sum_us: self.sum_us.load(Ordering::Relaxed),
        }
    }
}
