//! # GSCAN
//!
//! Background scan sessions: the host adds a session made of buckets, the
//! firmware runs them and streams results back, and the host later fetches
//! the cached results.
//!
//! ## Design Principles
//!
//! 1. **Single Owner**: `Gscan` owns the result cache and the bucket table;
//!    the device guards both with one lock.
//! 2. **Validate, Then Mutate**: `add` checks every parameter and allocates
//!    before it touches the report threshold. A firmware rejection frees the
//!    session's buckets again.
//! 3. **Policy Per Bucket**: Whether a result raises an event immediately,
//!    at the end of a scan cycle, or only on a threshold is decided by the
//!    bucket's `report_events` bits.
//!
//! ## Event Selection On Scan Done
//!
//! ```text
//! EACH_SCAN bit set                       -> ResultsAvailable
//! num_scans % report_threshold_num_scans  -> ThresholdNumScans   (overrides)
//! consumed >= buffer_threshold            -> ThresholdPercent    (overrides)
//! ```

mod bucket;
mod cache;

pub use bucket::{
    Bucket, BucketSpec, BucketTable, SessionId, MAX_BUCKETS, MAX_REPORT_EVENTS, REPORT_EACH_SCAN,
    REPORT_FULL_RESULTS, REPORT_NO_BATCH, SCAN_ID_START,
};
pub use cache::{
    DiscardReason, InsertOutcome, ResultCache, ScanResult, HASH_TABLE_SIZE, MAX_SCAN_CACHE_SIZE,
    SCAN_RESULT_HEADER_LEN,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wlc_common::{WifiBand, WlcError, WlcResult};

use crate::config::DeviceConfig;
use crate::event::{EventSink, ScanEventType, VendorEvent};
use crate::firmware::{Firmware, FirmwareRequest};

/// Firmware report modes.
pub const REPORTMODE_REAL_TIME: u16 = 0x0001;
pub const REPORTMODE_END_OF_SCAN_CYCLE: u16 = 0x0002;
pub const REPORTMODE_NO_BATCH: u16 = 0x0004;
pub const REPORTMODE_BUFFER_FULL: u16 = 0x0008;

/// Firmware scan policy bits.
pub const SCANPOLICY_ANY_RA: u16 = 0x0004;
pub const SCANPOLICY_2_4GHZ: u16 = 0x0008;
pub const SCANPOLICY_5GHZ: u16 = 0x0010;
pub const SCANPOLICY_NON_DFS: u16 = 0x0020;
pub const SCANPOLICY_DFS: u16 = 0x0040;

/// Per-scan AP limit advertised to the host.
pub const MAX_AP_CACHE_PER_SCAN: u32 = 32;
/// Largest report threshold percentage.
pub const MAX_SCAN_REPORTING_THRESHOLD: u32 = 100;

/// Parameters of one session add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GscanParams {
    pub max_ap_per_scan: i32,
    pub report_threshold_percent: i32,
    pub report_threshold_num_scans: i32,
    pub buckets: Vec<BucketSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GscanCapabilities {
    pub max_scan_cache_size: u32,
    pub max_scan_buckets: u32,
    pub max_ap_cache_per_scan: u32,
    pub max_scan_reporting_threshold: u32,
}

/// What the firmware reported for a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIndication {
    Result(ScanResult),
    Done,
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    report_threshold_num_scans: u32,
    num_scans: u32,
}

#[derive(Debug, Default)]
pub struct Gscan {
    cache: ResultCache,
    buckets: BucketTable,
    sessions: Vec<Session>,
    buffer_threshold: usize,
    next_session: u32,
}

/// Rejects parameter sets the firmware cannot run.
pub fn verify_params(params: &GscanParams) -> WlcResult<()> {
    if params.max_ap_per_scan < 0 {
        return Err(WlcError::Invalid("max_ap_per_scan"));
    }
    if params.report_threshold_percent < 0 {
        return Err(WlcError::Invalid("report_threshold_percent"));
    }
    if params.report_threshold_num_scans < 0 {
        return Err(WlcError::Invalid("report_threshold_num_scans"));
    }
    if params.buckets.is_empty() {
        return Err(WlcError::Invalid("no buckets"));
    }
    for bucket in &params.buckets {
        if bucket.band == WifiBand::Unspecified && bucket.channels.is_empty() {
            return Err(WlcError::Invalid("bucket without band or channels"));
        }
        if bucket.report_events > MAX_REPORT_EVENTS {
            return Err(WlcError::Invalid("report_events"));
        }
    }
    Ok(())
}

/// Firmware report mode for a bucket's `report_events` bits.
pub fn report_mode(report_events: u8) -> u16 {
    if report_events == 0 {
        return REPORTMODE_BUFFER_FULL;
    }
    let mut mode = 0;
    if report_events & REPORT_EACH_SCAN != 0 {
        mode |= REPORTMODE_END_OF_SCAN_CYCLE;
    }
    if report_events & REPORT_FULL_RESULTS != 0 {
        mode |= REPORTMODE_REAL_TIME;
    }
    if report_events & REPORT_NO_BATCH != 0 {
        mode |= REPORTMODE_NO_BATCH;
    }
    mode
}

/// Firmware scan policy for a bucket band.
pub fn scan_policy(band: WifiBand) -> u16 {
    match band {
        WifiBand::Unspecified => SCANPOLICY_ANY_RA,
        WifiBand::Bg => SCANPOLICY_2_4GHZ,
        WifiBand::A => SCANPOLICY_5GHZ | SCANPOLICY_NON_DFS,
        WifiBand::ADfs => SCANPOLICY_5GHZ | SCANPOLICY_DFS,
        WifiBand::AWithDfs => SCANPOLICY_5GHZ | SCANPOLICY_NON_DFS | SCANPOLICY_DFS,
        WifiBand::Abg => SCANPOLICY_5GHZ | SCANPOLICY_NON_DFS | SCANPOLICY_2_4GHZ,
        WifiBand::AbgWithDfs => {
            SCANPOLICY_5GHZ | SCANPOLICY_NON_DFS | SCANPOLICY_DFS | SCANPOLICY_2_4GHZ
        }
    }
}

/// Limits reported to the host; `NotSupported` while GSCAN is disabled.
pub fn capabilities(config: &DeviceConfig) -> WlcResult<GscanCapabilities> {
    if !config.gscan_enabled {
        return Err(WlcError::NotSupported);
    }
    Ok(GscanCapabilities {
        max_scan_cache_size: MAX_SCAN_CACHE_SIZE as u32,
        max_scan_buckets: MAX_BUCKETS as u32,
        max_ap_cache_per_scan: MAX_AP_CACHE_PER_SCAN,
        max_scan_reporting_threshold: MAX_SCAN_REPORTING_THRESHOLD,
    })
}

impl Gscan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn buckets(&self) -> &BucketTable {
        &self.buckets
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Consumed-bytes level that raises `ThresholdPercent`.
    pub fn buffer_threshold(&self) -> usize {
        self.buffer_threshold
    }

    /// Starts a session and programs one firmware scan per bucket.
    pub fn add(
        &mut self,
        params: &GscanParams,
        firmware: &dyn Firmware,
        ifname: &str,
    ) -> WlcResult<SessionId> {
        verify_params(params)?;

        let id = SessionId(self.next_session);
        let indices = self.buckets.allocate(id, &params.buckets)?;

        for (n, &index) in indices.iter().enumerate() {
            let spec = &params.buckets[n];
            let request = FirmwareRequest::GscanAdd {
                scan_id: BucketTable::scan_id(index),
                report_mode: report_mode(spec.report_events),
                policy: scan_policy(spec.band),
                period_ms: spec.period_ms,
                channels: spec.channels.clone(),
            };
            if let Err(err) = firmware.send(ifname, request) {
                warn!(scan_id = BucketTable::scan_id(index), %err, "gscan add rejected");
                for &done in &indices[..n] {
                    let scan_id = BucketTable::scan_id(done);
                    if let Err(err) = firmware.send(ifname, FirmwareRequest::GscanDel { scan_id }) {
                        warn!(scan_id, %err, "gscan rollback failed");
                    }
                }
                self.buckets.free_session(id);
                return Err(err);
            }
        }

        let percent = params.report_threshold_percent as usize;
        let threshold = MAX_SCAN_CACHE_SIZE * percent / 100;
        if self.buffer_threshold == 0 || threshold < self.buffer_threshold {
            self.buffer_threshold = threshold;
        }
        self.sessions.push(Session {
            id,
            report_threshold_num_scans: params.report_threshold_num_scans as u32,
            num_scans: 0,
        });
        self.next_session = self.next_session.wrapping_add(1);
        debug!(session = id.0, buckets = indices.len(), "gscan session added");
        Ok(id)
    }

    /// Stops every session and drops all cached results.
    pub fn del(&mut self, firmware: &dyn Firmware, ifname: &str) {
        for (index, _) in self.buckets.iter_used() {
            let scan_id = BucketTable::scan_id(index);
            if let Err(err) = firmware.send(ifname, FirmwareRequest::GscanDel { scan_id }) {
                warn!(scan_id, %err, "gscan del rejected");
            }
        }
        self.buckets.clear();
        self.sessions.clear();
        self.cache.flush();
        self.buffer_threshold = 0;
    }

    /// Feeds one firmware indication for `scan_id`.
    ///
    /// Returns the cache outcome for results; `None` for scan-done
    /// indications and for ids that do not name a used bucket.
    pub fn handle_scan_result(
        &mut self,
        scan_id: u16,
        indication: ScanIndication,
        events: &dyn EventSink,
    ) -> Option<InsertOutcome> {
        let Some(index) = BucketTable::index_of(scan_id) else {
            debug!(scan_id, "scan id outside bucket table");
            return None;
        };
        let Some(bucket) = self.buckets.get_mut(index) else {
            debug!(scan_id, "scan indication for unused bucket");
            return None;
        };

        match indication {
            ScanIndication::Done => {
                bucket.scan_cycle = bucket.scan_cycle.wrapping_add(1);
                let each_scan = bucket.reports(REPORT_EACH_SCAN);
                let owner = bucket.session;

                let mut event = each_scan.then_some(ScanEventType::ResultsAvailable);
                if let Some(session) = self.sessions.iter_mut().find(|s| s.id == owner) {
                    session.num_scans += 1;
                    let threshold = session.report_threshold_num_scans;
                    if threshold > 0 && session.num_scans % threshold == 0 {
                        event = Some(ScanEventType::ThresholdNumScans);
                    }
                }
                if self.cache.consumed() >= self.buffer_threshold {
                    event = Some(ScanEventType::ThresholdPercent);
                }
                if let Some(kind) = event {
                    events.emit(VendorEvent::ScanEvent(kind));
                }
                None
            }
            ScanIndication::Result(result) => {
                let scan_cycle = bucket.scan_cycle;
                if bucket.reports(REPORT_FULL_RESULTS) {
                    events.emit(VendorEvent::FullScanResult {
                        bucket_mask: 1 << index,
                        result: result.clone(),
                    });
                }
                let outcome = self.cache.insert(result, scan_cycle);
                if !outcome.is_kept() {
                    debug!(scan_id, ?outcome, "scan result not cached");
                }
                Some(outcome)
            }
        }
    }

    /// Hands up to `max` cached results to the host.
    pub fn get_scan_results(&mut self, max: usize) -> Vec<ScanResult> {
        self.cache.drain(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::firmware::MockFirmware;
    use wlc_common::MacAddr;

    fn params(report_events: u8, buckets: usize) -> GscanParams {
        GscanParams {
            max_ap_per_scan: 16,
            report_threshold_percent: 50,
            report_threshold_num_scans: 0,
            buckets: vec![
                BucketSpec {
                    band: WifiBand::Bg,
                    channels: Vec::new(),
                    period_ms: 10_000,
                    report_events,
                };
                buckets
            ],
        }
    }

    fn result(last: u8, rssi: i16) -> ScanResult {
        ScanResult {
            bssid: MacAddr::new([0x00, 0x12, 0xfb, 0x00, 0x00, last]),
            rssi,
            ..ScanResult::default()
        }
    }

    #[test]
    fn verify_rejects_bad_params() {
        let mut p = params(0, 1);
        p.max_ap_per_scan = -1;
        assert!(verify_params(&p).is_err());

        let mut p = params(0, 1);
        p.buckets[0].band = WifiBand::Unspecified;
        assert!(verify_params(&p).is_err());
        p.buckets[0].channels = vec![1, 6];
        assert!(verify_params(&p).is_ok());

        assert!(verify_params(&params(5, 1)).is_err());
        assert!(verify_params(&params(0, 0)).is_err());
    }

    #[test]
    fn report_mode_and_policy_mapping() {
        assert_eq!(report_mode(0), REPORTMODE_BUFFER_FULL);
        assert_eq!(report_mode(REPORT_EACH_SCAN), REPORTMODE_END_OF_SCAN_CYCLE);
        assert_eq!(
            report_mode(REPORT_EACH_SCAN | REPORT_FULL_RESULTS),
            REPORTMODE_END_OF_SCAN_CYCLE | REPORTMODE_REAL_TIME
        );
        assert_eq!(report_mode(REPORT_NO_BATCH), REPORTMODE_NO_BATCH);

        assert_eq!(scan_policy(WifiBand::Unspecified), SCANPOLICY_ANY_RA);
        assert_eq!(scan_policy(WifiBand::Bg), SCANPOLICY_2_4GHZ);
        assert_eq!(scan_policy(WifiBand::ADfs), SCANPOLICY_5GHZ | SCANPOLICY_DFS);
    }

    #[test]
    fn add_programs_buckets_and_threshold() {
        let fw = MockFirmware::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(REPORT_EACH_SCAN, 2), &fw, "wlan0").unwrap();

        assert_eq!(gscan.buckets().used_count(), 2);
        assert_eq!(gscan.buffer_threshold(), MAX_SCAN_CACHE_SIZE / 2);
        assert_eq!(fw.requests().len(), 2);

        // A lower percentage wins, a higher one does not.
        let mut p = params(0, 1);
        p.report_threshold_percent = 25;
        gscan.add(&p, &fw, "wlan0").unwrap();
        assert_eq!(gscan.buffer_threshold(), MAX_SCAN_CACHE_SIZE / 4);
        p.report_threshold_percent = 90;
        gscan.add(&p, &fw, "wlan0").unwrap();
        assert_eq!(gscan.buffer_threshold(), MAX_SCAN_CACHE_SIZE / 4);
    }

    #[test]
    fn firmware_rejection_frees_buckets() {
        let fw = MockFirmware::new();
        fw.fail_requests(Some(WlcError::Io));
        let mut gscan = Gscan::new();
        assert_eq!(gscan.add(&params(0, 3), &fw, "wlan0"), Err(WlcError::Io));
        assert_eq!(gscan.buckets().used_count(), 0);
        assert_eq!(gscan.session_count(), 0);
        assert_eq!(gscan.buffer_threshold(), 0);
    }

    #[test]
    fn too_many_buckets_is_rejected_whole() {
        let fw = MockFirmware::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(0, 6), &fw, "wlan0").unwrap();
        assert!(gscan.add(&params(0, 3), &fw, "wlan0").is_err());
        assert_eq!(gscan.buckets().used_count(), 6);
        assert_eq!(gscan.session_count(), 1);
    }

    #[test]
    fn results_for_unknown_buckets_are_ignored() {
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        assert_eq!(
            gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(1, -50)), &log),
            None
        );
        assert_eq!(
            gscan.handle_scan_result(0x1234, ScanIndication::Result(result(1, -50)), &log),
            None
        );
        assert!(gscan.cache().is_empty());
    }

    #[test]
    fn full_results_bucket_emits_per_result() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(0, 1), &fw, "wlan0").unwrap();
        gscan.add(&params(REPORT_FULL_RESULTS, 1), &fw, "wlan0").unwrap();

        let scan_id = BucketTable::scan_id(1);
        let outcome =
            gscan.handle_scan_result(scan_id, ScanIndication::Result(result(7, -50)), &log);
        assert_eq!(outcome, Some(InsertOutcome::KeptNew));

        match &log.drain()[..] {
            [VendorEvent::FullScanResult { bucket_mask, result }] => {
                assert_eq!(*bucket_mask, 0b10);
                assert_eq!(result.bssid.last_octet(), 7);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert_eq!(gscan.cache().len(), 1);
    }

    #[test]
    fn scan_done_event_selection() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        let mut p = params(REPORT_EACH_SCAN, 1);
        p.report_threshold_num_scans = 2;
        p.report_threshold_percent = 100;
        gscan.add(&p, &fw, "wlan0").unwrap();

        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Done, &log);
        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Done, &log);
        assert_eq!(
            log.drain(),
            vec![
                VendorEvent::ScanEvent(ScanEventType::ResultsAvailable),
                VendorEvent::ScanEvent(ScanEventType::ThresholdNumScans),
            ]
        );
    }

    #[test]
    fn buffer_threshold_overrides() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        let mut p = params(0, 1);
        p.report_threshold_percent = 1;
        gscan.add(&p, &fw, "wlan0").unwrap();
        assert_eq!(gscan.buffer_threshold(), 120);

        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(1, -50)), &log);
        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Done, &log);
        assert!(log.is_empty());

        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(2, -50)), &log);
        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Done, &log);
        assert_eq!(
            log.drain(),
            vec![VendorEvent::ScanEvent(ScanEventType::ThresholdPercent)]
        );
    }

    #[test]
    fn same_cycle_keeps_strongest() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(0, 1), &fw, "wlan0").unwrap();

        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(9, -40)), &log);
        let weaker =
            gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(9, -70)), &log);
        assert_eq!(weaker, Some(InsertOutcome::Discarded(DiscardReason::WeakerRssi)));

        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Done, &log);
        let next_cycle =
            gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(9, -70)), &log);
        assert_eq!(next_cycle, Some(InsertOutcome::KeptRefreshed));
    }

    #[test]
    fn del_flushes_everything() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(0, 2), &fw, "wlan0").unwrap();
        gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(1, -50)), &log);
        fw.clear();

        gscan.del(&fw, "wlan0");
        assert_eq!(gscan.buckets().used_count(), 0);
        assert!(gscan.cache().is_empty());
        assert_eq!(gscan.buffer_threshold(), 0);
        assert_eq!(fw.requests().len(), 2);
    }

    #[test]
    fn get_scan_results_drains() {
        let fw = MockFirmware::new();
        let log = EventLog::new();
        let mut gscan = Gscan::new();
        gscan.add(&params(0, 1), &fw, "wlan0").unwrap();
        for last in 0..5 {
            gscan.handle_scan_result(SCAN_ID_START, ScanIndication::Result(result(last, -50)), &log);
        }
        assert_eq!(gscan.get_scan_results(3).len(), 3);
        assert_eq!(gscan.get_scan_results(10).len(), 2);
        assert!(gscan.get_scan_results(10).is_empty());
    }

    #[test]
    fn capabilities_follow_enable_flag() {
        let mut config = DeviceConfig::default();
        let caps = capabilities(&config).unwrap();
        assert_eq!(caps.max_scan_buckets, MAX_BUCKETS as u32);
        assert_eq!(caps.max_scan_cache_size, MAX_SCAN_CACHE_SIZE as u32);

        config.gscan_enabled = false;
        assert_eq!(capabilities(&config), Err(WlcError::NotSupported));
    }
}
