use std::sync::Arc;

use wlc_common::{MacAddr, VifStatus, EINVAL, EIO, EPERM};
use wlc_engine::mib::psid;
use wlc_engine::{Device, DeviceConfig, EventLog, FirmwareRequest, MibValue, MockFirmware, VifState};
use wlc_server::{dispatch, CommandBuffer, DEFAULT_CAPACITY};

const PEER: MacAddr = MacAddr::new([0x00, 0x12, 0xfb, 0x00, 0x00, 0x0e]);

struct Harness {
    device: Device,
    fw: Arc<MockFirmware>,
}

impl Harness {
    fn new(vif: VifState) -> Self {
        let fw = Arc::new(MockFirmware::new());
        let device = Device::new(DeviceConfig::default(), fw.clone(), Arc::new(EventLog::new()));
        device.add_vif(vif);
        Harness { device, fw }
    }

    fn station() -> Self {
        Self::new(VifState::station("wlan0", MacAddr::ZERO))
    }

    fn connected() -> Self {
        let mut vif = VifState::station("wlan0", MacAddr::ZERO);
        vif.connect(PEER, 6);
        Self::new(vif)
    }

    fn run(&self, command: &str) -> i32 {
        let mut buf = CommandBuffer::with_command(command, DEFAULT_CAPACITY);
        dispatch(&self.device, "wlan0", &mut buf)
    }

    fn read(&self, command: &str) -> (i32, String) {
        let mut buf = CommandBuffer::with_command(command, DEFAULT_CAPACITY);
        let status = dispatch(&self.device, "wlan0", &mut buf);
        (status, buf.as_str().to_string())
    }

    fn config(&self) -> DeviceConfig {
        self.device.config().clone()
    }
}

/// `(command, lowest accepted, highest accepted)`
const NCHO_RANGES: &[(&str, i64, i64)] = &[
    ("SETROAMTRIGGER", -100, -51),
    ("SETROAMDELTA", 0, 100),
    ("SETROAMSCANPERIOD", 0, 60),
    ("SETFULLROAMSCANPERIOD", 0, 600),
    ("SETSCANCHANNELTIME", 10, 300),
    ("SETSCANHOMETIME", 40, 300),
    ("SETSCANHOMEAWAYTIME", 40, 300),
    ("SETSCANNPROBES", 0, 10),
    ("SETROAMMODE", 0, 1),
    ("SETDFSSCANMODE", 0, 2),
];

const LEGACY_RANGES: &[(&str, i64, i64)] = &[("SETROAMTRIGGER_LEGACY", -100, -51)];

const LEGACY_SCAN_TIMES: &[&str] = &[
    "SETSCANHOMETIME_LEGACY",
    "SETSCANHOMEAWAYTIME_LEGACY",
    "SETSCANCHANNELTIME_LEGACY",
    "SETSCANPASSIVETIME_LEGACY",
];

fn check_bounds(harness: &Harness, name: &str, lo: i64, hi: i64) {
    for outside in [lo - 1, hi + 1] {
        let before = harness.config();
        assert_eq!(harness.run(&format!("{name} {outside}")), -EINVAL, "{name} {outside}");
        assert_eq!(harness.config(), before, "{name} {outside} changed the store");
    }
    for edge in [lo, hi] {
        assert_eq!(harness.run(&format!("{name} {edge}")), 0, "{name} {edge}");
    }
}

#[test]
fn range_edges_accepted_one_past_rejected() {
    let harness = Harness::station();
    for &(name, lo, hi) in LEGACY_RANGES {
        check_bounds(&harness, name, lo, hi);
    }

    assert_eq!(harness.run("SETNCHOMODE 1"), 0);
    for &(name, lo, hi) in NCHO_RANGES {
        check_bounds(&harness, name, lo, hi);
    }
    assert_eq!(harness.config().roam.delta, 100);

    let connected = Harness::connected();
    connected
        .device
        .update_vif("wlan0", |vif| vif.max_dtim_recv = 3)
        .unwrap();
    check_bounds(&connected, "SET_DTIM_IN_SUSPEND", 1, 255);
    check_bounds(&connected, "SET_TX_ANT_CONFIG", 1, 3);
    check_bounds(&connected, "HAPD_MAX_NUM_STA", 1, 10);
}

#[test]
fn legacy_scan_time_zero_is_io_error() {
    let harness = Harness::station();
    for &name in LEGACY_SCAN_TIMES {
        let before = harness.config();
        assert_eq!(harness.run(&format!("{name} -")), -EINVAL, "{name} -");
        assert_eq!(harness.run(&format!("{name} -1")), -EINVAL, "{name} -1");
        assert_eq!(harness.run(&format!("{name} 0")), -EIO, "{name} 0");
        assert_eq!(harness.run(&format!("{name} 1001")), -EINVAL, "{name} 1001");
        assert_eq!(harness.config(), before, "{name} changed the store");

        assert_eq!(harness.run(&format!("{name} 30")), 0, "{name} 30");
        assert_eq!(harness.run(&format!("{name} 1000")), 0, "{name} 1000");
    }
    let legacy = harness.config().legacy;
    assert_eq!(legacy.home_time, 1000);
    assert_eq!(legacy.passive_time, 1000);
}

#[test]
fn roam_channels_without_host_scan_control() {
    let harness = Harness::station();
    assert_eq!(harness.run("SETNCHOMODE 1"), 0);
    assert_eq!(harness.config().roam.scan_control, 0);

    assert_eq!(harness.run("SETROAMSCANCHANNELS 3 2 6 36"), 0);
    assert_eq!(harness.config().roam.channels, vec![2, 6, 36]);
    assert_eq!(harness.run("SETROAMSCANCHANNELS 3 - 6 36"), -EINVAL);
    assert_eq!(harness.run("SETROAMSCANCHANNELS 3 0 7 36"), -EINVAL);
    assert_eq!(harness.run("SETROAMSCANFREQUENCIES 2 2412 2437"), -EINVAL);
    assert_eq!(harness.config().roam.channels, vec![2, 6, 36]);
}

#[test]
fn band_changes_return_one_while_nan_enabled() {
    let harness = Harness::station();
    assert_eq!(harness.run("SETNCHOMODE 1"), 0);
    {
        let mut config = harness.device.config_mut();
        config.supported_roam_band = 0x0001;
        config.supported_band = 2;
    }
    assert_eq!(harness.run("SETROAMBAND 0x0002"), -EIO);

    harness.device.config_mut().nan_enabled = true;
    assert_eq!(harness.run("SETROAMBAND 0x0001"), 1);
    assert_eq!(harness.run("SETBAND 1"), 1);
    assert_eq!(harness.run("SETBAND 3"), -EINVAL);
    assert!(harness.fw.requests().is_empty());

    assert_eq!(harness.run("SETNCHOMODE 0"), 0);
    assert_eq!(harness.run("SETBAND 2"), -EINVAL);
}

#[test]
fn malformed_number_wins_over_state_checks() {
    // Disconnected: a well-formed value fails the state check instead.
    let harness = Harness::station();
    assert_eq!(harness.run("MAX_DTIM_IN_SUSPEND 1"), -EPERM);
    assert_eq!(harness.run("MAX_DTIM_IN_SUSPEND -"), -EINVAL);
    assert_eq!(harness.run("SETWTCMODE 0 1 -80 -70 -70 -70"), -EPERM);
    assert_eq!(harness.run("SETWTCMODE 0 1 - -70 -70 -70"), -EINVAL);

    harness
        .device
        .update_vif("wlan0", |vif| vif.status = VifStatus::Connecting)
        .unwrap();
    assert_eq!(harness.run("SET_TX_ANT_CONFIG 2"), -EPERM);
    assert_eq!(harness.run("SET_TX_ANT_CONFIG -"), -EINVAL);

    assert_eq!(harness.run("SETROAMDELTA -"), -EINVAL);
    assert_eq!(harness.run("SETNCHOMODE -"), -EINVAL);
    assert!(harness.fw.mib_writes().is_empty());
}

#[test]
fn ncho_reads_and_writes_gated_together() {
    let harness = Harness::station();
    for (write, read) in [
        ("SETROAMTRIGGER -75", "GETROAMTRIGGER"),
        ("SETROAMSCANPERIOD 10", "GETROAMSCANPERIOD"),
        ("SETSCANNPROBES 2", "GETSCANNPROBES"),
        ("SETROAMMODE 1", "GETROAMMODE"),
        ("SETROAMINTRABAND 1", "GETROAMINTRABAND"),
    ] {
        assert_eq!(harness.run(write), -EINVAL, "{write}");
        assert_eq!(harness.run(read), -EINVAL, "{read}");
    }

    assert_eq!(harness.run("SETNCHOMODE 1"), 0);
    assert_eq!(harness.run("SETROAMTRIGGER -75"), 0);
    assert_eq!(harness.read("GETROAMTRIGGER"), (16, "GETROAMTRIGGER 0".to_string()));
    assert_eq!(harness.run("SETROAMSCANPERIOD 10"), 0);
    assert_eq!(harness.run("GETROAMSCANPERIOD"), 19);

    harness.fw.set_answer(psid::RSSI_ROAM_SCAN_TRIGGER, MibValue::Int(-75));
    assert_eq!(harness.read("GETROAMTRIGGER"), (18, "GETROAMTRIGGER -75".to_string()));
}

#[test]
fn twt_disallowed_reports_not_supported() {
    let harness = Harness::connected();
    harness
        .device
        .update_vif("wlan0", |vif| vif.twt_allowed = false)
        .unwrap();
    for command in [
        "TWT_SETUP 3 1 1 1 5000 9000 1 1 9001 1 5001 1 1",
        "TWT_SETUP - - -",
        "TWT_TEARDOWN x",
        "TWT_INFO_FRAME 1 2",
        "GET_TWT_STATUS",
        "GET_TWT_CAP",
        "GET_TWT_STATISTICS -",
        "CLEAR_TWT_STATISTICS 1",
    ] {
        assert_eq!(harness.run(command), 3, "{command}");
    }
    assert!(harness.fw.requests().is_empty());
}

#[test]
fn roam_delta_round_trip() {
    let harness = Harness::station();
    assert_eq!(harness.run("SETNCHOMODE 1"), 0);
    assert_eq!(harness.run("SETROAMDELTA 11"), 0);
    assert_eq!(harness.config().roam.delta, 11);
    assert_eq!(harness.fw.last_mib_write(psid::RSSI_ROAM_DELTA_TRIGGER), Some(MibValue::Int(11)));
    assert_eq!(harness.read("GETROAMDELTA"), (14, "GETROAMDELTA 0".to_string()));
}

#[test]
fn wtc_mode_on_connected_station() {
    let harness = Harness::connected();
    assert_eq!(harness.run("SETWTCMODE 0 1 -80 -70 -70 -70"), 0);
    let wtc = harness.config().legacy.wtc.unwrap();
    assert_eq!(wtc.scan_mode, 1);
    assert_eq!(wtc.rssi_2g, -80);
    assert!(harness.fw.last_mib_write(psid::WTC_MODE).is_some());
}

#[test]
fn twt_setup_follows_allowance() {
    let harness = Harness::connected();
    let setup = "TWT_SETUP 3 1 1 1 5000 9000 1 1 9001 1 5001 1 1";

    harness
        .device
        .update_vif("wlan0", |vif| vif.twt_allowed = false)
        .unwrap();
    assert_eq!(harness.run(setup), 3);

    harness
        .device
        .update_vif("wlan0", |vif| vif.twt_allowed = true)
        .unwrap();
    assert_eq!(harness.run(setup), 0);
    assert!(matches!(
        harness.fw.requests().as_slice(),
        [FirmwareRequest::TwtSetup(_)]
    ));
}

#[test]
fn blacklist_needs_complete_mac() {
    let harness = Harness::connected();
    assert_eq!(harness.run("ROAMING_BLACKLIST_ADD 00:12:fb:00:00:"), -EINVAL);
    assert!(harness.config().station.blacklist.is_empty());

    assert_eq!(harness.run("ROAMING_BLACKLIST_ADD 00:12:fb:00:00:0e"), 0);
    assert!(harness.config().station.blacklist.contains(&PEER));
    assert_eq!(harness.run("ROAMING_BLACKLIST_REMOVE 00:12:fb:00:00:0e"), 0);
    assert!(harness.config().station.blacklist.is_empty());
}

#[test]
fn country_and_regulatory() {
    let harness = Harness::station();
    assert_eq!(harness.run("SETCOUNTRYREV kr 5"), 0);
    assert_eq!(harness.read("GETCOUNTRYREV"), (18, "GETCOUNTRYREV KR 5".to_string()));
    assert_eq!(harness.run("COUNTRY US"), 0);
    assert_eq!(harness.read("GETCOUNTRYREV").1, "GETCOUNTRYREV US 5");
    assert_eq!(harness.run("COUNTRY U"), -EINVAL);
}
