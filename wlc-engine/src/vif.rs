//! Per-interface state. Connection management owns these fields; the
//! command layer reads a snapshot taken at dispatch time.

use serde::{Deserialize, Serialize};

use wlc_common::{MacAddr, P2pState, VifStatus, VifType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VifState {
    pub ifname: String,
    pub mac: MacAddr,
    pub activated: bool,
    pub vif_type: VifType,
    pub status: VifStatus,
    /// Operating channel once associated or started.
    pub channel: Option<u16>,
    /// Peer BSSID while connected.
    pub bssid: Option<MacAddr>,
    pub twt_allowed: bool,
    /// DTIM period advertised by the peer; 0 when unknown.
    pub max_dtim_recv: u8,
    pub igmp_offload: bool,
    pub p2p_state: P2pState,
}

impl Default for VifState {
    fn default() -> Self {
        VifState {
            ifname: "wlan0".to_string(),
            mac: MacAddr::ZERO,
            activated: false,
            vif_type: VifType::Station,
            status: VifStatus::Unspecified,
            channel: None,
            bssid: None,
            twt_allowed: true,
            max_dtim_recv: 0,
            igmp_offload: false,
            p2p_state: P2pState::NoVif,
        }
    }
}

impl VifState {
    /// An inactive station interface.
    pub fn station(ifname: &str, mac: MacAddr) -> Self {
        VifState {
            ifname: ifname.to_string(),
            mac,
            ..Self::default()
        }
    }

    /// An activated interface of `vif_type`.
    pub fn activated(ifname: &str, mac: MacAddr, vif_type: VifType) -> Self {
        VifState {
            ifname: ifname.to_string(),
            mac,
            activated: true,
            vif_type,
            ..Self::default()
        }
    }

    /// Marks the interface associated to `bssid` on `channel`.
    pub fn connect(&mut self, bssid: MacAddr, channel: u16) {
        self.activated = true;
        self.status = VifStatus::Connected;
        self.bssid = Some(bssid);
        self.channel = Some(channel);
    }

    pub fn disconnect(&mut self) {
        self.status = VifStatus::Unspecified;
        self.bssid = None;
        self.channel = None;
    }

    pub fn is_station(&self) -> bool {
        self.vif_type == VifType::Station
    }

    pub fn is_connected(&self) -> bool {
        self.status == VifStatus::Connected
    }
}
