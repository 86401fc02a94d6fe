use std::sync::Arc;

use wlc_common::{MacAddr, WifiBand};
use wlc_engine::gscan::{
    BucketSpec, BucketTable, DiscardReason, GscanParams, InsertOutcome, ResultCache, ScanIndication,
    ScanResult, SessionId, MAX_BUCKETS, MAX_SCAN_CACHE_SIZE, SCAN_ID_START,
};
use wlc_engine::{Device, DeviceConfig, EventLog, MockFirmware};

const DEFAULT_MAC: MacAddr = MacAddr::new([0x00, 0x12, 0xfb, 0x00, 0x00, 0x0e]);

fn result(bssid: MacAddr, rssi: i16) -> ScanResult {
    ScanResult {
        bssid,
        ssid: b"test-ap".to_vec(),
        rssi,
        frequency: 2437,
        timestamp_us: 1_000,
        capability: 0x0411,
        beacon_period: 100,
        ies: vec![0x00, 0x03, b'a', b'b', b'c'],
    }
}

fn nth_mac(n: u16) -> MacAddr {
    let [hi, lo] = n.to_be_bytes();
    MacAddr::new([0x02, 0x00, 0x00, 0x00, hi, lo])
}

#[test]
fn test_duplicate_bssid_keeps_one_entry() {
    let mut cache = ResultCache::new();
    assert_eq!(cache.insert(result(DEFAULT_MAC, -70), 0), InsertOutcome::KeptNew);
    let count = cache.len();

    assert_eq!(cache.insert(result(DEFAULT_MAC, -55), 1), InsertOutcome::KeptRefreshed);
    assert_eq!(cache.len(), count);
    assert_eq!(cache.get(&DEFAULT_MAC).map(|r| r.rssi), Some(-55));
}

#[test]
fn test_full_cache_discards_new_bssid() {
    let mut cache = ResultCache::new();
    let mut n = 0;
    while cache.insert(result(nth_mac(n), -60), 0) == InsertOutcome::KeptNew {
        n += 1;
    }
    let count = cache.len();
    assert!(cache.consumed() + result(nth_mac(n), -60).encoded_len() >= MAX_SCAN_CACHE_SIZE);

    assert_eq!(
        cache.insert(result(nth_mac(n + 1), -30), 0),
        InsertOutcome::Discarded(DiscardReason::Capacity)
    );
    assert_eq!(cache.len(), count);
}

#[test]
fn test_bucket_allocation_all_or_nothing() {
    let mut table = BucketTable::new();
    let spec = BucketSpec {
        band: WifiBand::A,
        period_ms: 30_000,
        ..BucketSpec::default()
    };
    table.allocate(SessionId(0), &vec![spec.clone(); 6]).unwrap();
    let before: Vec<bool> = (0..MAX_BUCKETS).map(|i| table.is_used(i)).collect();

    assert!(table.allocate(SessionId(1), &vec![spec; 3]).is_err());
    let after: Vec<bool> = (0..MAX_BUCKETS).map(|i| table.is_used(i)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_lookup_follows_bssid() {
    let mut cache = ResultCache::new();
    cache.insert(result(DEFAULT_MAC, -50), 0);
    assert!(cache.get(&DEFAULT_MAC).is_some());

    let moved = MacAddr::new([0x00, 0x12, 0xfb, 0x00, 0x00, 0x0f]);
    let mut entry = cache.remove(&DEFAULT_MAC).unwrap();
    entry.bssid = moved;
    cache.insert(entry, 0);

    assert!(cache.get(&DEFAULT_MAC).is_none());
    assert!(cache.get(&moved).is_some());
}

#[test]
fn test_device_gscan_session_lifecycle() {
    let fw = Arc::new(MockFirmware::new());
    let log = Arc::new(EventLog::new());
    let device = Device::new(DeviceConfig::default(), fw.clone(), log.clone());

    let params = GscanParams {
        max_ap_per_scan: 16,
        report_threshold_percent: 80,
        report_threshold_num_scans: 1,
        buckets: vec![BucketSpec {
            band: WifiBand::Bg,
            period_ms: 10_000,
            ..BucketSpec::default()
        }],
    };
    device.gscan().add(&params, fw.as_ref(), "wlan0").unwrap();

    device.on_scan_indication(SCAN_ID_START, ScanIndication::Result(result(DEFAULT_MAC, -40)));
    device.on_scan_indication(SCAN_ID_START, ScanIndication::Done);
    assert_eq!(log.len(), 1);

    let fetched = device.gscan().get_scan_results(10);
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].bssid, DEFAULT_MAC);

    device.gscan().del(fw.as_ref(), "wlan0");
    assert_eq!(device.gscan().buckets().used_count(), 0);
}
