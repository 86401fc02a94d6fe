//! # Private Commands
//!
//! Every private command arrives as text, `"<NAME> <arg> <arg> ..."`. The
//! name is matched case-sensitively against the closed set below; anything
//! else is rejected before a handler runs.
//!
//! ## Design Principles
//! 1. **Closed Set**: `PrivCommand` is generated from one table, so the
//!    name lookup, `ALL` and the family map cannot drift apart.
//! 2. **Reads Are Named**: A name starting with `GET` writes a reply into
//!    the command buffer and returns its length. Every other command
//!    returns 0 on success.
//!
//! ```text
//! Power       suspend, DTIM, TX power, eLNA
//! P2p         GO power save, NoA, channel switch, listen offload
//! Ncho        roam tuning while NCHO mode is on
//! Legacy      roam tuning while NCHO mode is off
//! Regulatory  country code, band restrictions
//! Ap          soft-AP limits, channel plans
//! Station     action frames, blacklist, RX filters
//! Twt         target wake time
//! ```

use std::fmt;

/// Grouping used for logging and for family-wide gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandFamily {
    Power,
    P2p,
    Ncho,
    Legacy,
    Regulatory,
    Ap,
    Station,
    Twt,
}

impl CommandFamily {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::P2p => "p2p",
            Self::Ncho => "ncho",
            Self::Legacy => "legacy",
            Self::Regulatory => "regulatory",
            Self::Ap => "ap",
            Self::Station => "station",
            Self::Twt => "twt",
        }
    }
}

macro_rules! priv_commands {
    ($($variant:ident => $name:literal, $family:ident;)*) => {
        /// All private commands understood by the dispatcher.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PrivCommand {
            $($variant,)*
        }

        impl PrivCommand {
            /// Every command, in declaration order.
            pub const ALL: &'static [PrivCommand] = &[$(PrivCommand::$variant,)*];

            /// Wire name of the command.
            pub const fn name(self) -> &'static str {
                match self {
                    $(PrivCommand::$variant => $name,)*
                }
            }

            pub const fn family(self) -> CommandFamily {
                match self {
                    $(PrivCommand::$variant => CommandFamily::$family,)*
                }
            }

            /// Exact, case-sensitive lookup.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(PrivCommand::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

priv_commands! {
    // power
    SetSuspendMode => "SETSUSPENDMODE", Power;
    MaxDtimInSuspend => "MAX_DTIM_IN_SUSPEND", Power;
    SetDtimInSuspend => "SET_DTIM_IN_SUSPEND", Power;
    SetTxPowerCalling => "SET_TX_POWER_CALLING", Power;
    SetTxPowerSub6Band => "SET_TX_POWER_SUB6_BAND", Power;
    ElnaBypass => "ELNA_BYPASS", Power;
    ElnaBypassInt => "ELNA_BYPASS_INT", Power;
    SetLatencyCrtData => "SET_LATENCY_CRT_DATA", Power;
    PowerMeasurementStart => "POWER_MEASUREMENT_START", Power;
    AdpsEnable => "ADPS_ENABLE", Power;

    // p2p
    P2pSetPs => "P2P_SET_PS", P2p;
    P2pSetNoa => "P2P_SET_NOA", P2p;
    P2pEcsa => "P2P_ECSA", P2p;
    P2pLoStart => "P2P_LO_START", P2p;
    P2pLoStop => "P2P_LO_STOP", P2p;

    // ncho
    SetNchoMode => "SETNCHOMODE", Ncho;
    GetNchoMode => "GETNCHOMODE", Ncho;
    SetRoamTrigger => "SETROAMTRIGGER", Ncho;
    GetRoamTrigger => "GETROAMTRIGGER", Ncho;
    SetRoamDelta => "SETROAMDELTA", Ncho;
    GetRoamDelta => "GETROAMDELTA", Ncho;
    SetRoamScanPeriod => "SETROAMSCANPERIOD", Ncho;
    GetRoamScanPeriod => "GETROAMSCANPERIOD", Ncho;
    SetFullRoamScanPeriod => "SETFULLROAMSCANPERIOD", Ncho;
    GetFullRoamScanPeriod => "GETFULLROAMSCANPERIOD", Ncho;
    SetScanChannelTime => "SETSCANCHANNELTIME", Ncho;
    GetScanChannelTime => "GETSCANCHANNELTIME", Ncho;
    SetScanHomeTime => "SETSCANHOMETIME", Ncho;
    GetScanHomeTime => "GETSCANHOMETIME", Ncho;
    SetScanHomeAwayTime => "SETSCANHOMEAWAYTIME", Ncho;
    GetScanHomeAwayTime => "GETSCANHOMEAWAYTIME", Ncho;
    SetScanNProbes => "SETSCANNPROBES", Ncho;
    GetScanNProbes => "GETSCANNPROBES", Ncho;
    SetRoamMode => "SETROAMMODE", Ncho;
    GetRoamMode => "GETROAMMODE", Ncho;
    SetRoamIntraBand => "SETROAMINTRABAND", Ncho;
    GetRoamIntraBand => "GETROAMINTRABAND", Ncho;
    SetRoamScanControl => "SETROAMSCANCONTROL", Ncho;
    GetRoamScanControl => "GETROAMSCANCONTROL", Ncho;
    SetOkcMode => "SETOKCMODE", Ncho;
    GetOkcMode => "GETOKCMODE", Ncho;
    SetDfsScanMode => "SETDFSSCANMODE", Ncho;
    GetDfsScanMode => "GETDFSSCANMODE", Ncho;
    SetWesMode => "SETWESMODE", Ncho;
    GetWesMode => "GETWESMODE", Ncho;
    SetRoamScanFrequencies => "SETROAMSCANFREQUENCIES", Ncho;
    GetRoamScanFrequencies => "GETROAMSCANFREQUENCIES", Ncho;
    AddRoamScanFrequencies => "ADDROAMSCANFREQUENCIES", Ncho;
    SetRoamScanChannels => "SETROAMSCANCHANNELS", Ncho;
    GetRoamScanChannels => "GETROAMSCANCHANNELS", Ncho;
    AddRoamScanChannels => "ADDROAMSCANCHANNELS", Ncho;
    SetRoamBand => "SETROAMBAND", Ncho;
    GetRoamBand => "GETROAMBAND", Ncho;
    SetBand => "SETBAND", Ncho;
    GetBand => "GETBAND", Ncho;
    Reassoc => "REASSOC", Ncho;

    // legacy roaming
    SetRoamTriggerLegacy => "SETROAMTRIGGER_LEGACY", Legacy;
    GetRoamTriggerLegacy => "GETROAMTRIGGER_LEGACY", Legacy;
    AddRoamScanFrequenciesLegacy => "ADDROAMSCANFREQUENCIES_LEGACY", Legacy;
    GetRoamScanFrequenciesLegacy => "GETROAMSCANFREQUENCIES_LEGACY", Legacy;
    AddRoamScanChannelsLegacy => "ADDROAMSCANCHANNELS_LEGACY", Legacy;
    GetRoamScanChannelsLegacy => "GETROAMSCANCHANNELS_LEGACY", Legacy;
    SetScanHomeTimeLegacy => "SETSCANHOMETIME_LEGACY", Legacy;
    SetScanHomeAwayTimeLegacy => "SETSCANHOMEAWAYTIME_LEGACY", Legacy;
    SetScanChannelTimeLegacy => "SETSCANCHANNELTIME_LEGACY", Legacy;
    SetScanPassiveTimeLegacy => "SETSCANPASSIVETIME_LEGACY", Legacy;
    ReassocLegacy => "REASSOC_LEGACY", Legacy;
    ReassocFrequencyLegacy => "REASSOC_FREQUENCY_LEGACY", Legacy;
    SetRoamOffloadApList => "SETROAMOFFLAPLIST", Legacy;
    SetWtcMode => "SETWTCMODE", Legacy;

    // regulatory
    Country => "COUNTRY", Regulatory;
    SetCountryRev => "SETCOUNTRYREV", Regulatory;
    GetCountryRev => "GETCOUNTRYREV", Regulatory;
    GetRegulatory => "GETREGULATORY", Regulatory;
    SetFccChannel => "SET_FCC_CHANNEL", Regulatory;
    FactorySetBand => "FACTORY_SETBAND", Regulatory;

    // soft ap
    HapdMaxNumSta => "HAPD_MAX_NUM_STA", Ap;
    HapdSetAxMode => "HAPD_SET_AX_MODE", Ap;
    SetSapChannelList => "SET_SAP_CHANNEL_LIST", Ap;
    SetBssChannelWidth => "SET_BSS_CHANNEL_WIDTH", Ap;

    // station
    SetTxAntConfig => "SET_TX_ANT_CONFIG", Station;
    SetPmk => "SET_PMK", Station;
    SendActionFrame => "SENDACTIONFRAME", Station;
    RoamingBlacklistAdd => "ROAMING_BLACKLIST_ADD", Station;
    RoamingBlacklistRemove => "ROAMING_BLACKLIST_REMOVE", Station;
    ForceRoamingBssid => "FORCE_ROAMING_BSSID", Station;
    RxFilterAdd => "RXFILTER-ADD", Station;
    RxFilterRemove => "RXFILTER-REMOVE", Station;
    RxFilterStart => "RXFILTER-START", Station;
    RxFilterStop => "RXFILTER-STOP", Station;
    FakeMac => "FAKEMAC", Station;
    SetTid => "SET_TID", Station;
    SetDwellTime => "SET_DWELL_TIME", Station;
    SetGracePeriod => "SET_GRACE_PERIOD", Station;
    SetDisconnectIes => "SET_DISCONNECT_IES", Station;
    SetJoinPrefer => "SETJOINPREFER", Station;
    SetTdlsEnabled => "SET_TDLS_ENABLED", Station;
    SetRssiMonitor => "SET_RSSI_MONITOR", Station;
    TestForceHang => "SLSI_TEST_FORCE_HANG", Station;

    // twt
    TwtSetup => "TWT_SETUP", Twt;
    TwtTeardown => "TWT_TEARDOWN", Twt;
    TwtInfoFrame => "TWT_INFO_FRAME", Twt;
    GetTwtStatus => "GET_TWT_STATUS", Twt;
    GetTwtCap => "GET_TWT_CAP", Twt;
    GetTwtStatistics => "GET_TWT_STATISTICS", Twt;
    ClearTwtStatistics => "CLEAR_TWT_STATISTICS", Twt;
}

impl PrivCommand {
    /// Read commands reply with text and return its length.
    pub fn is_read(self) -> bool {
        self.name().starts_with("GET")
    }
}

impl fmt::Display for PrivCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for &cmd in PrivCommand::ALL {
            assert_eq!(PrivCommand::from_name(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn test_unknown_and_case() {
        assert_eq!(PrivCommand::from_name("setroamdelta"), None);
        assert_eq!(PrivCommand::from_name("GARBAGE"), None);
        assert_eq!(PrivCommand::from_name(""), None);
    }

    #[test]
    fn test_names_unique() {
        let all = PrivCommand::ALL;
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i].name(), all[j].name(), "duplicate name");
            }
        }
    }

    #[test]
    fn test_classification() {
        assert!(PrivCommand::GetRoamDelta.is_read());
        assert!(PrivCommand::GetTwtStatus.is_read());
        assert!(!PrivCommand::SetRoamDelta.is_read());
        assert_eq!(PrivCommand::SetWtcMode.family(), CommandFamily::Legacy);
        assert_eq!(PrivCommand::TwtSetup.family().name(), "twt");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PrivCommand::RxFilterAdd), "RXFILTER-ADD");
    }
}
