//! # Device Configuration Store
//!
//! One `DeviceConfig` exists per physical device. It carries the advertised
//! capabilities (loaded once at bring-up) and every setting the private
//! command surface can change.
//!
//! ## Design Principles
//!
//! 1. **Plain Data**: The store has no behaviour beyond defaults and a few
//!    capability lookups. Range checks live with the command validators and
//!    run before any field is written.
//! 2. **Grouped By Family**: Settings are nested the way the command families
//!    are grouped, so a handler only borrows the group it owns.
//! 3. **Serde Defaults**: Every struct is `#[serde(default)]`; a config file
//!    only needs to name what differs from a stock device.
//!
//! ## Layout
//!
//! ```text
//! DeviceConfig
//!   ├── capabilities (supported_band, supported_roam_band, nan_enabled, ...)
//!   ├── ncho_mode
//!   ├── roam:       NCHO roaming values + channel list
//!   ├── legacy:     roaming values used while NCHO is off
//!   ├── p2p:        power save / NoA / listen offload
//!   ├── regulatory: country, revision, FCC channel, factory band
//!   ├── power:      suspend, DTIM, TX power, eLNA, latency
//!   ├── ap:         soft AP limits and channels
//!   └── station:    blacklist, filters, PMK, RSSI monitor, TWT, ...
//! ```

use ahash::RandomState;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use wlc_common::MacAddr;

/// `supported_band` bit for 2.4 GHz.
pub const BAND_CAP_2GHZ: u8 = 0x01;
/// `supported_band` bit for 5 GHz.
pub const BAND_CAP_5GHZ: u8 = 0x02;

/// `SETBAND` values.
pub const SETBAND_AUTO: u8 = 0;
pub const SETBAND_5GHZ: u8 = 1;
pub const SETBAND_2GHZ: u8 = 2;

/// Longest roam scan channel list.
pub const MAX_ROAM_CHANNELS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Bitmask of `BAND_CAP_*` the radio supports.
    pub supported_band: u8,
    /// Bitmask of roam bands the firmware accepts.
    pub supported_roam_band: u32,
    pub nan_enabled: bool,
    /// Non-zero while a cellular modem reports its state.
    pub host_state: u8,
    /// NR bands the sub-6 TX power table knows.
    pub nr_bands: Vec<u16>,
    pub gscan_enabled: bool,

    pub ncho_mode: bool,
    pub roam: RoamConfig,
    pub legacy: LegacyRoamConfig,
    pub p2p: P2pConfig,
    pub regulatory: RegulatoryConfig,
    pub power: PowerConfig,
    pub ap: ApConfig,
    pub station: StationConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            supported_band: BAND_CAP_2GHZ | BAND_CAP_5GHZ,
            supported_roam_band: 0x3,
            nan_enabled: false,
            host_state: 0,
            nr_bands: vec![1, 2, 3, 5, 7, 8, 20, 25, 28, 38, 40, 41, 66, 71, 77, 78, 79],
            gscan_enabled: true,
            ncho_mode: false,
            roam: RoamConfig::default(),
            legacy: LegacyRoamConfig::default(),
            p2p: P2pConfig::default(),
            regulatory: RegulatoryConfig::default(),
            power: PowerConfig::default(),
            ap: ApConfig::default(),
            station: StationConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// True when `SETBAND value` names a band the radio has.
    pub fn supports_band(&self, value: u8) -> bool {
        match value {
            SETBAND_AUTO => true,
            SETBAND_5GHZ => self.supported_band & BAND_CAP_5GHZ != 0,
            SETBAND_2GHZ => self.supported_band & BAND_CAP_2GHZ != 0,
            _ => false,
        }
    }

    /// True when every bit of `mask` is an advertised roam band.
    pub fn supports_roam_band(&self, mask: u32) -> bool {
        mask & !self.supported_roam_band == 0
    }
}

/// Roaming values owned by the NCHO command family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoamConfig {
    pub trigger: i32,
    pub delta: i32,
    pub scan_period: i32,
    pub full_scan_period: i32,
    pub channel_time: i32,
    pub home_time: i32,
    pub home_away_time: i32,
    pub nprobes: i32,
    pub mode: i32,
    pub intra_band: i32,
    /// 1 replaces the channel list, 0 extends it.
    pub scan_control: i32,
    pub okc_mode: i32,
    pub dfs_scan_mode: i32,
    pub wes_mode: i32,
    pub band: u8,
    pub roam_band: u32,
    pub channels: Vec<u16>,
}

impl Default for RoamConfig {
    fn default() -> Self {
        RoamConfig {
            trigger: -75,
            delta: 10,
            scan_period: 10,
            full_scan_period: 120,
            channel_time: 40,
            home_time: 45,
            home_away_time: 100,
            nprobes: 2,
            mode: 1,
            intra_band: 0,
            scan_control: 0,
            okc_mode: 1,
            dfs_scan_mode: 1,
            wes_mode: 0,
            band: SETBAND_AUTO,
            roam_band: 0x3,
            channels: Vec::new(),
        }
    }
}

/// Roaming values used while NCHO mode is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyRoamConfig {
    pub trigger: i32,
    pub channels: Vec<u16>,
    pub home_time: i32,
    pub home_away_time: i32,
    pub channel_time: i32,
    pub passive_time: i32,
    pub offload_aps: Vec<MacAddr>,
    pub wtc: Option<WtcMode>,
}

impl Default for LegacyRoamConfig {
    fn default() -> Self {
        LegacyRoamConfig {
            trigger: -75,
            channels: Vec::new(),
            home_time: 45,
            home_away_time: 100,
            channel_time: 40,
            passive_time: 110,
            offload_aps: Vec::new(),
            wtc: None,
        }
    }
}

/// Wi-Fi/cellular coexistence roaming thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WtcMode {
    pub mode: u8,
    pub scan_mode: u8,
    pub rssi_2g: i8,
    pub rssi_5g: i8,
    pub rssi_6g: i8,
    pub rssi_delta: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct P2pConfig {
    pub legacy_ps: i32,
    pub opp_ps: bool,
    pub ctwindow: u8,
    pub noa: Option<NoaSchedule>,
    pub listen_offload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoaSchedule {
    pub count: u8,
    pub start_ms: u32,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryConfig {
    pub country: String,
    pub revision: u32,
    pub report_regulatory: bool,
    pub fcc_channel: i32,
    pub factory_band: u8,
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        RegulatoryConfig {
            country: "00".to_string(),
            revision: 0,
            report_regulatory: false,
            fcc_channel: -1,
            factory_band: SETBAND_AUTO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub suspend_mode: bool,
    pub max_dtim_in_suspend: bool,
    pub dtim_in_suspend: u8,
    pub tx_power_calling: i32,
    pub tx_power_sub6_band: Option<u16>,
    pub elna_bypass: bool,
    pub elna_bypass_interval: u32,
    pub latency_crt_data: u8,
    pub adps: bool,
    pub grace_period: i64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        PowerConfig {
            suspend_mode: false,
            max_dtim_in_suspend: false,
            dtim_in_suspend: 1,
            tx_power_calling: -1,
            tx_power_sub6_band: None,
            elna_bypass: false,
            elna_bypass_interval: 0,
            latency_crt_data: 0,
            adps: true,
            grace_period: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApConfig {
    pub max_num_sta: u8,
    pub ax_mode: bool,
    pub channels: Vec<u16>,
    pub channel_width: u16,
}

impl Default for ApConfig {
    fn default() -> Self {
        ApConfig {
            max_num_sta: 10,
            ax_mode: true,
            channels: Vec::new(),
            channel_width: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub tx_ant: u8,
    /// Never written back to a config file.
    #[serde(skip)]
    pub pmk: Vec<u8>,
    pub blacklist: HashSet<MacAddr, RandomState>,
    /// Bit n set when RX filter n is installed.
    pub rx_filters: u8,
    pub rx_filter_active: bool,
    pub fake_mac: bool,
    pub tid: Option<TidConfig>,
    pub dwell_time: [u32; 4],
    pub disconnect_ies: Vec<u8>,
    pub join_preference: Vec<u8>,
    pub tdls_enabled: bool,
    pub rssi_monitor: Option<RssiMonitor>,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            tx_ant: 3,
            pmk: Vec::new(),
            blacklist: HashSet::with_hasher(RandomState::new()),
            rx_filters: 0,
            rx_filter_active: false,
            fake_mac: false,
            tid: None,
            dwell_time: [0; 4],
            disconnect_ies: Vec::new(),
            join_preference: Vec::new(),
            tdls_enabled: true,
            rssi_monitor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TidConfig {
    pub mode: u8,
    pub uid: u32,
    pub tid: u8,
}

/// Inclusive RSSI window; leaving it raises a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssiMonitor {
    pub min: i8,
    pub max: i8,
}

impl RssiMonitor {
    pub fn contains(&self, rssi: i16) -> bool {
        (i16::from(self.min)..=i16::from(self.max)).contains(&rssi)
    }
}
