//! # Value Types
//!
//! Small value types shared by the parser, the engine, and the handlers:
//! MAC addresses, interface roles and connection phases, GSCAN band
//! selectors, and the channel/frequency tables used by every command that
//! names a channel.
//!
//! ## Channel Model
//!
//! ```text
//! 2.4 GHz: ch 1..=13 -> 2407 + 5*ch MHz, ch 14 -> 2484 MHz
//! 5 GHz:   ch in CHANNELS_5GHZ -> 5000 + 5*ch MHz
//!          ch 52..=144 are DFS channels
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Length of an Ethernet address.
pub const ETH_ALEN: usize = 6;

/// Valid 5 GHz channel numbers.
pub const CHANNELS_5GHZ: [u16; 25] = [
    36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144,
    149, 153, 157, 161, 165,
];

/// 48-bit IEEE 802 MAC address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr(pub [u8; ETH_ALEN]);

impl MacAddr {
    pub const ZERO: MacAddr = MacAddr([0; ETH_ALEN]);

    pub const fn new(octets: [u8; ETH_ALEN]) -> Self {
        MacAddr(octets)
    }

    pub const fn octets(&self) -> [u8; ETH_ALEN] {
        self.0
    }

    /// Last octet; the GSCAN cache hashes on it.
    pub const fn last_octet(&self) -> u8 {
        self.0[ETH_ALEN - 1]
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ETH_ALEN]
    }
}

impl FromStr for MacAddr {
    type Err = ParseError;

    /// Accepts exactly six colon-separated two-digit hex octets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; ETH_ALEN];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(ParseError::BadMac)?;
            if part.len() != 2 {
                return Err(ParseError::BadMac);
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| ParseError::BadMac)?;
        }
        if parts.next().is_some() {
            return Err(ParseError::BadMac);
        }
        Ok(MacAddr(octets))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

/// Role of a virtual interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VifType {
    #[default]
    Station,
    Ap,
    P2pGo,
    P2pClient,
    P2pDevice,
    Monitor,
}

impl VifType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Ap => "ap",
            Self::P2pGo => "p2p-go",
            Self::P2pClient => "p2p-client",
            Self::P2pDevice => "p2p-device",
            Self::Monitor => "monitor",
        }
    }

    /// AP and P2P-GO both beacon.
    pub const fn is_ap_like(self) -> bool {
        matches!(self, Self::Ap | Self::P2pGo)
    }
}

impl fmt::Display for VifType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Connection phase of a station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VifStatus {
    #[default]
    Unspecified,
    Connecting,
    Connected,
    Disconnecting,
}

/// P2P discovery state of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum P2pState {
    #[default]
    NoVif,
    Idle,
    Scanning,
    Listening,
    GroupFormed,
}

/// Band selector carried by a GSCAN bucket.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WifiBand {
    #[default]
    Unspecified = 0,
    Bg = 1,
    A = 2,
    ADfs = 4,
    AWithDfs = 6,
    Abg = 3,
    AbgWithDfs = 7,
}

impl WifiBand {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Bg),
            2 => Some(Self::A),
            3 => Some(Self::Abg),
            4 => Some(Self::ADfs),
            6 => Some(Self::AWithDfs),
            7 => Some(Self::AbgWithDfs),
            _ => None,
        }
    }
}

/// Frequency of a 2.4 or 5 GHz channel, if the channel exists.
pub fn channel_to_freq(channel: u16) -> Option<u16> {
    match channel {
        1..=13 => Some(2407 + 5 * channel),
        14 => Some(2484),
        _ if CHANNELS_5GHZ.contains(&channel) => Some(5000 + 5 * channel),
        _ => None,
    }
}

/// Channel number of a 2.4 or 5 GHz centre frequency, if valid.
pub fn freq_to_channel(freq: u16) -> Option<u16> {
    match freq {
        2484 => Some(14),
        2412..=2472 if (freq - 2407) % 5 == 0 => Some((freq - 2407) / 5),
        5180..=5825 if freq % 5 == 0 => {
            let channel = (freq - 5000) / 5;
            CHANNELS_5GHZ.contains(&channel).then_some(channel)
        }
        _ => None,
    }
}

pub fn is_valid_channel(channel: i64) -> bool {
    u16::try_from(channel).ok().and_then(channel_to_freq).is_some()
}

pub fn is_valid_frequency(freq: i64) -> bool {
    u16::try_from(freq).ok().and_then(freq_to_channel).is_some()
}

pub fn is_dfs_channel(channel: u16) -> bool {
    (52..=144).contains(&channel)
}
