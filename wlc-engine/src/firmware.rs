//! # Firmware Seam
//!
//! Everything that leaves the host goes through [`Firmware`]: MIB writes as
//! encoded record buffers, MIB reads by PSID, and the management requests
//! that are not plain MIB values (reassociation, action frames, TWT and
//! GSCAN buckets among them).
//!
//! ## Design Principles
//! 1. **Synchronous Calls**: A request returns `Ok` once accepted, or an
//!    error. Nothing is retried.
//! 2. **Finished Buffers Only**: `mib_set` receives the output of
//!    `MibBuffer::finish`, never a partial buffer.
//! 3. **Typed Replies**: TWT reads answer `FirmwareReply::Values`; every
//!    other request answers `Ack`.
//!
//! `MockFirmware` records every call and can be told to fail. The daemon
//! and the test suites both run on it.

use std::sync::Arc;

use ahash::RandomState;
use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::Mutex;

use wlc_common::{MacAddr, WlcError, WlcResult};

use crate::mib::{decode_all, MibCodec, MibEntry, MibValue, TlvCodec};

/// Fields of a TWT setup request, in command-line order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TwtSetupParams {
    pub setup_id: i64,
    pub negotiation_type: i64,
    pub flow_type: i64,
    pub trigger_type: i64,
    pub wake_duration_us: i64,
    pub wake_interval_us: i64,
    pub avg_pkt_num: i64,
    pub avg_pkt_size: i64,
    pub max_wake_interval_us: i64,
    pub min_wake_interval_us: i64,
    pub max_wake_duration_us: i64,
    pub min_wake_duration_us: i64,
    pub wake_time_off_us: i64,
}

impl TwtSetupParams {
    pub const FIELD_COUNT: usize = 13;

    /// Builds the request from up to 13 values; missing trailing fields
    /// stay zero.
    pub fn from_fields(fields: &[i64]) -> Self {
        let field = |i: usize| fields.get(i).copied().unwrap_or(0);
        TwtSetupParams {
            setup_id: field(0),
            negotiation_type: field(1),
            flow_type: field(2),
            trigger_type: field(3),
            wake_duration_us: field(4),
            wake_interval_us: field(5),
            avg_pkt_num: field(6),
            avg_pkt_size: field(7),
            max_wake_interval_us: field(8),
            min_wake_interval_us: field(9),
            max_wake_duration_us: field(10),
            min_wake_duration_us: field(11),
            wake_time_off_us: field(12),
        }
    }
}

/// Structured management requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareRequest {
    Reassociate { bssid: MacAddr, channel: u16 },
    ForceRoam { bssid: MacAddr, channel: u16 },
    ActionFrame { bssid: MacAddr, channel: u16, dwell_ms: u32, frame: Vec<u8> },
    ChannelSwitch { channel: u16, bandwidth: u16 },
    ListenOffloadStart { channel: u16, period: u32, interval: u32, count: u32 },
    ListenOffloadStop,
    P2pPowerSave { legacy_ps: i32, opp_ps: bool, ctwindow: u8 },
    NoticeOfAbsence { count: u8, start_ms: u32, duration_ms: u32 },
    SetCountry { code: String, revision: u32 },
    SetBand { band: u8 },
    SetPmk { pmk: Vec<u8> },
    RoamBlacklist { bssids: Vec<MacAddr> },
    RxFilter { mask: u8, active: bool },
    RandomMac { enabled: bool },
    BssChannelWidth { width: u16, restart: bool },
    SapChannels { channels: Vec<u16> },
    RssiMonitor { enable: bool, min: i8, max: i8 },
    PowerMeasurement,
    TwtSetup(TwtSetupParams),
    TwtTeardown { setup_id: i64, negotiation_type: i64 },
    TwtInfoFrame { setup_id: i64, resume_time_us: i64 },
    TwtStatus { setup_id: i64 },
    TwtCapabilities,
    TwtStatistics { setup_id: i64 },
    TwtClearStatistics { setup_id: i64 },
    GscanAdd { scan_id: u16, report_mode: u16, policy: u16, period_ms: u32, channels: Vec<u16> },
    GscanDel { scan_id: u16 },
}

impl FirmwareRequest {
    /// Number of values a read request answers with; 0 for writes.
    pub fn reply_len(&self) -> usize {
        match self {
            FirmwareRequest::TwtStatus { .. } => 4,
            FirmwareRequest::TwtCapabilities => 6,
            FirmwareRequest::TwtStatistics { .. } => 6,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareReply {
    Ack,
    Values(Vec<i64>),
}

impl FirmwareReply {
    pub fn values(&self) -> &[i64] {
        match self {
            FirmwareReply::Ack => &[],
            FirmwareReply::Values(values) => values,
        }
    }
}

/// Host-to-firmware transport.
pub trait Firmware: Send + Sync {
    fn mib_set(&self, ifname: &str, records: Bytes) -> WlcResult<()>;
    fn mib_get(&self, ifname: &str, psid: u16, index: u16) -> WlcResult<MibValue>;
    fn send(&self, ifname: &str, request: FirmwareRequest) -> WlcResult<FirmwareReply>;
}

impl<F: Firmware + ?Sized> Firmware for Arc<F> {
    fn mib_set(&self, ifname: &str, records: Bytes) -> WlcResult<()> {
        (**self).mib_set(ifname, records)
    }

    fn mib_get(&self, ifname: &str, psid: u16, index: u16) -> WlcResult<MibValue> {
        (**self).mib_get(ifname, psid, index)
    }

    fn send(&self, ifname: &str, request: FirmwareRequest) -> WlcResult<FirmwareReply> {
        (**self).send(ifname, request)
    }
}

#[derive(Debug, Default)]
struct MockState {
    mib_writes: Vec<MibEntry>,
    requests: Vec<FirmwareRequest>,
    answers: HashMap<u16, MibValue, RandomState>,
    replies: Vec<(usize, Vec<i64>)>,
    fail_mib: Option<WlcError>,
    fail_requests: Option<WlcError>,
}

/// Recording firmware double.
///
/// MIB reads answer from values installed with `set_answer`, defaulting to
/// `Int(0)`; they do not echo earlier writes.
#[derive(Debug, Default)]
pub struct MockFirmware {
    state: Mutex<MockState>,
}

impl MockFirmware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&self, psid: u16, value: MibValue) {
        self.state.lock().answers.insert(psid, value);
    }

    /// Makes every MIB read and write fail with `err` until cleared.
    pub fn fail_mib(&self, err: Option<WlcError>) {
        self.state.lock().fail_mib = err;
    }

    /// Makes every structured request fail with `err` until cleared.
    pub fn fail_requests(&self, err: Option<WlcError>) {
        self.state.lock().fail_requests = err;
    }

    /// Overrides the values returned by reads that expect `len` values.
    pub fn set_reply(&self, len: usize, values: Vec<i64>) {
        let mut state = self.state.lock();
        state.replies.retain(|(l, _)| *l != len);
        state.replies.push((len, values));
    }

    pub fn mib_writes(&self) -> Vec<MibEntry> {
        self.state.lock().mib_writes.clone()
    }

    /// Most recent write to `psid`.
    pub fn last_mib_write(&self, psid: u16) -> Option<MibValue> {
        self.state
            .lock()
            .mib_writes
            .iter()
            .rev()
            .find(|entry| entry.psid == psid)
            .map(|entry| entry.value.clone())
    }

    pub fn requests(&self) -> Vec<FirmwareRequest> {
        self.state.lock().requests.clone()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.mib_writes.clear();
        state.requests.clear();
    }
}

impl Firmware for MockFirmware {
    fn mib_set(&self, ifname: &str, records: Bytes) -> WlcResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_mib {
            return Err(err);
        }
        let entries = decode_all(&TlvCodec as &dyn MibCodec, &records)?;
        tracing::trace!(ifname, records = entries.len(), "mib set");
        state.mib_writes.extend(entries);
        Ok(())
    }

    fn mib_get(&self, ifname: &str, psid: u16, _index: u16) -> WlcResult<MibValue> {
        let state = self.state.lock();
        if let Some(err) = state.fail_mib {
            return Err(err);
        }
        tracing::trace!(ifname, psid, "mib get");
        Ok(state.answers.get(&psid).cloned().unwrap_or(MibValue::Int(0)))
    }

    fn send(&self, ifname: &str, request: FirmwareRequest) -> WlcResult<FirmwareReply> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_requests {
            return Err(err);
        }
        tracing::trace!(ifname, ?request, "firmware request");
        let len = request.reply_len();
        state.requests.push(request);
        if len == 0 {
            return Ok(FirmwareReply::Ack);
        }
        let values = state
            .replies
            .iter()
            .find(|(l, _)| *l == len)
            .map(|(_, values)| values.clone())
            .unwrap_or_else(|| vec![0; len]);
        Ok(FirmwareReply::Values(values))
    }
}
