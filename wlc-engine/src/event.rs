//! # Vendor Events
//!
//! Asynchronous notifications the engine decides to raise. The transport
//! envelope is not built here; an `EventSink` receives the typed event and
//! does whatever delivery means for the host.

use std::fmt;

use parking_lot::Mutex;

use wlc_common::MacAddr;

use crate::gscan::ScanResult;

/// GSCAN notification kinds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEventType {
    ResultsAvailable = 0,
    ThresholdNumScans = 1,
    ThresholdPercent = 2,
    Failed = 3,
}

impl ScanEventType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ResultsAvailable => "RESULTS_AVAILABLE",
            Self::ThresholdNumScans => "THRESHOLD_NUM_SCANS",
            Self::ThresholdPercent => "THRESHOLD_PERCENT",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ScanEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VendorEvent {
    /// Cached results are ready to fetch.
    ScanEvent(ScanEventType),
    /// One result on a bucket that reports in real time.
    FullScanResult { bucket_mask: u32, result: ScanResult },
    /// Current RSSI left the monitored window.
    RssiReport { bssid: MacAddr, rssi: i16 },
    /// Host asked for a forced recovery.
    Hang { reason: u16 },
}

/// Receives events raised by the engine.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: VendorEvent);
}

/// In-memory sink used by tests and the loopback daemon.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<VendorEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copies the recorded events without clearing them.
    pub fn snapshot(&self) -> Vec<VendorEvent> {
        self.events.lock().clone()
    }

    /// Takes the recorded events.
    pub fn drain(&self) -> Vec<VendorEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: VendorEvent) {
        tracing::debug!(?event, "vendor event");
        self.events.lock().push(event);
    }
}
