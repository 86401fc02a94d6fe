//! # NCHO Roaming Commands
//!
//! Purpose: Roaming knobs that only exist while NCHO mode is on.
//!
//! ## Design Principles
//!
//! 1. **One Table Row Per Knob**: Each SET/GET pair is a `RoamKnob` naming
//!    its PSID, accepted domain and the `RoamConfig` field it owns. `write`
//!    and `read` are shared by every row.
//! 2. **Firmware Owns The Value**: Reads query the firmware through
//!    `Device::read_mib_int`; the store keeps the last value written.
//! 3. **Gate Both Directions**: With NCHO off both variants fail, except the
//!    WES write, which is accepted in either mode.
//!
//! ```text
//! SETROAMDELTA 11 ──> parse ──> ncho? ──> 0..=100 ──> MIB 0x0803 ──> roam.delta = 11
//! GETROAMDELTA    ──────────> ncho? ──> MIB get 0x0803 ──> "GETROAMDELTA <v>"
//! ```

use tracing::debug;

use wlc_common::{
    channel_to_freq, freq_to_channel, is_valid_channel, CommandArgs, PrivCommand, VifType,
    WlcError, WlcResult,
};
use wlc_engine::config::{RoamConfig, MAX_ROAM_CHANNELS, SETBAND_2GHZ};
use wlc_engine::mib::psid;
use wlc_engine::FirmwareRequest;

use super::{list_reply, read_reply, CommandContext, Reply};
use crate::validate::{
    requires_activated, requires_connected, requires_mode_flag, requires_one_of, requires_range,
    requires_vif_type, CONNECTED,
};

/// Accepted values for one knob.
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    Range(i64, i64),
    OneOf(&'static [i64]),
}

impl Domain {
    pub fn check(self, value: i64) -> WlcResult<i64> {
        match self {
            Domain::Range(lo, hi) => requires_range(value, lo, hi),
            Domain::OneOf(allowed) => requires_one_of(value, allowed),
        }
    }
}

/// `RoamConfig` field behind a knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamField {
    Trigger,
    Delta,
    ScanPeriod,
    FullScanPeriod,
    ChannelTime,
    HomeTime,
    HomeAwayTime,
    NProbes,
    Mode,
    IntraBand,
    ScanControl,
    OkcMode,
    DfsScanMode,
    WesMode,
}

impl RoamField {
    pub fn slot(self, roam: &mut RoamConfig) -> &mut i32 {
        match self {
            RoamField::Trigger => &mut roam.trigger,
            RoamField::Delta => &mut roam.delta,
            RoamField::ScanPeriod => &mut roam.scan_period,
            RoamField::FullScanPeriod => &mut roam.full_scan_period,
            RoamField::ChannelTime => &mut roam.channel_time,
            RoamField::HomeTime => &mut roam.home_time,
            RoamField::HomeAwayTime => &mut roam.home_away_time,
            RoamField::NProbes => &mut roam.nprobes,
            RoamField::Mode => &mut roam.mode,
            RoamField::IntraBand => &mut roam.intra_band,
            RoamField::ScanControl => &mut roam.scan_control,
            RoamField::OkcMode => &mut roam.okc_mode,
            RoamField::DfsScanMode => &mut roam.dfs_scan_mode,
            RoamField::WesMode => &mut roam.wes_mode,
        }
    }
}

/// One NCHO SET/GET pair.
pub struct RoamKnob {
    pub read: PrivCommand,
    pub psid: u16,
    pub domain: Domain,
    pub field: RoamField,
    /// False only for WES, whose write ignores the NCHO flag.
    pub gated_write: bool,
}

const BOOL: &[i64] = &[0, 1];

/// Status of a band change refused because NAN is enabled.
pub const NAN_ACTIVE: i32 = 1;

pub const ROAM_TRIGGER: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamTrigger,
    psid: psid::RSSI_ROAM_SCAN_TRIGGER,
    domain: Domain::Range(-100, -51),
    field: RoamField::Trigger,
    gated_write: true,
};

pub const ROAM_DELTA: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamDelta,
    psid: psid::RSSI_ROAM_DELTA_TRIGGER,
    domain: Domain::Range(0, 100),
    field: RoamField::Delta,
    gated_write: true,
};

pub const ROAM_SCAN_PERIOD: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamScanPeriod,
    psid: psid::ROAM_SCAN_BACKGROUND_PERIOD,
    domain: Domain::Range(0, 60),
    field: RoamField::ScanPeriod,
    gated_write: true,
};

pub const FULL_ROAM_SCAN_PERIOD: RoamKnob = RoamKnob {
    read: PrivCommand::GetFullRoamScanPeriod,
    psid: psid::FULL_ROAM_SCAN_PERIOD,
    domain: Domain::Range(0, 600),
    field: RoamField::FullScanPeriod,
    gated_write: true,
};

pub const SCAN_CHANNEL_TIME: RoamKnob = RoamKnob {
    read: PrivCommand::GetScanChannelTime,
    psid: psid::ROAM_SCAN_MAX_ACTIVE_CHANNEL_TIME,
    domain: Domain::Range(10, 300),
    field: RoamField::ChannelTime,
    gated_write: true,
};

pub const SCAN_HOME_TIME: RoamKnob = RoamKnob {
    read: PrivCommand::GetScanHomeTime,
    psid: psid::ROAM_SCAN_HOME_TIME,
    domain: Domain::Range(40, 300),
    field: RoamField::HomeTime,
    gated_write: true,
};

pub const SCAN_HOME_AWAY_TIME: RoamKnob = RoamKnob {
    read: PrivCommand::GetScanHomeAwayTime,
    psid: psid::ROAM_SCAN_HOME_AWAY_TIME,
    domain: Domain::Range(40, 300),
    field: RoamField::HomeAwayTime,
    gated_write: true,
};

pub const SCAN_NPROBES: RoamKnob = RoamKnob {
    read: PrivCommand::GetScanNProbes,
    psid: psid::ROAM_SCAN_NPROBE,
    domain: Domain::Range(0, 10),
    field: RoamField::NProbes,
    gated_write: true,
};

pub const ROAM_MODE: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamMode,
    psid: psid::ROAM_MODE,
    domain: Domain::OneOf(BOOL),
    field: RoamField::Mode,
    gated_write: true,
};

pub const ROAM_INTRA_BAND: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamIntraBand,
    psid: psid::ROAM_INTRA_BAND,
    domain: Domain::OneOf(BOOL),
    field: RoamField::IntraBand,
    gated_write: true,
};

pub const ROAM_SCAN_CONTROL: RoamKnob = RoamKnob {
    read: PrivCommand::GetRoamScanControl,
    psid: psid::ROAM_SCAN_CONTROL,
    domain: Domain::OneOf(BOOL),
    field: RoamField::ScanControl,
    gated_write: true,
};

pub const OKC_MODE: RoamKnob = RoamKnob {
    read: PrivCommand::GetOkcMode,
    psid: psid::ROAM_OKC_ENABLE,
    domain: Domain::OneOf(BOOL),
    field: RoamField::OkcMode,
    gated_write: true,
};

pub const DFS_SCAN_MODE: RoamKnob = RoamKnob {
    read: PrivCommand::GetDfsScanMode,
    psid: psid::DFS_SCAN_MODE,
    domain: Domain::OneOf(&[0, 1, 2]),
    field: RoamField::DfsScanMode,
    gated_write: true,
};

pub const WES_MODE: RoamKnob = RoamKnob {
    read: PrivCommand::GetWesMode,
    psid: psid::WES_MODE,
    domain: Domain::OneOf(BOOL),
    field: RoamField::WesMode,
    gated_write: false,
};

fn requires_ncho(ctx: &CommandContext<'_>) -> WlcResult<()> {
    requires_mode_flag(ctx.config.ncho_mode, true, "ncho")
}

/// SET half of a knob.
pub fn write(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>, knob: &RoamKnob) -> WlcResult<Reply> {
    let value = args.next_int()?;
    if knob.gated_write {
        requires_ncho(ctx)?;
    }
    let value = knob.domain.check(value)?;

    ctx.device.set_mib_int(ctx.ifname(), knob.psid, value)?;
    *knob.field.slot(&mut ctx.config.roam) = value as i32;
    debug!(cmd = %knob.read, value, "roam knob updated");
    Ok(Reply::Done)
}

/// GET half of a knob.
pub fn read(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>, knob: &RoamKnob) -> WlcResult<Reply> {
    requires_ncho(ctx)?;
    let value = ctx.device.read_mib_int(ctx.ifname(), knob.psid)?;
    Ok(read_reply(knob.read, value))
}

pub fn set_ncho_mode(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, BOOL)?;

    ctx.device.set_mib_int(ctx.ifname(), psid::NCHO_MODE, value)?;
    ctx.config.ncho_mode = value == 1;
    Ok(Reply::Done)
}

pub fn get_ncho_mode(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    Ok(read_reply(PrivCommand::GetNchoMode, u8::from(ctx.config.ncho_mode)))
}

/// Reads `n v1 .. vn` with `n` in 1..=20.
pub(crate) fn next_list(args: &mut CommandArgs<'_>) -> WlcResult<Vec<i64>> {
    let count = args.next_int()?;
    let count = requires_range(count, 1, MAX_ROAM_CHANNELS as i64)? as usize;
    args.next_ints(count)
}

pub(crate) fn channels_of(values: &[i64]) -> WlcResult<Vec<u16>> {
    values
        .iter()
        .map(|&ch| {
            if is_valid_channel(ch) {
                Ok(ch as u16)
            } else {
                Err(WlcError::Invalid("channel"))
            }
        })
        .collect()
}

pub(crate) fn channels_of_freqs(values: &[i64]) -> WlcResult<Vec<u16>> {
    values
        .iter()
        .map(|&freq| {
            u16::try_from(freq)
                .ok()
                .and_then(freq_to_channel)
                .ok_or(WlcError::Invalid("frequency"))
        })
        .collect()
}

pub(crate) fn freqs_of(channels: &[u16]) -> Vec<u16> {
    channels.iter().filter_map(|&ch| channel_to_freq(ch)).collect()
}

/// Channel list as the firmware takes it, one octet per channel.
pub(crate) fn channel_octets(channels: &[u16]) -> Vec<u8> {
    channels.iter().map(|&ch| ch as u8).collect()
}

fn replace_channels(ctx: &mut CommandContext<'_>, channels: Vec<u16>) -> WlcResult<Reply> {
    ctx.device
        .set_mib_octets(ctx.ifname(), psid::ROAM_SCAN_CHANNELS, &channel_octets(&channels))?;
    ctx.config.roam.channels = channels;
    Ok(Reply::Done)
}

fn extend_channels(ctx: &mut CommandContext<'_>, channels: Vec<u16>) -> WlcResult<Reply> {
    if ctx.config.roam.scan_control != 0 {
        return Err(WlcError::Invalid("roam scan control on"));
    }

    let mut merged = ctx.config.roam.channels.clone();
    for ch in channels {
        if !merged.contains(&ch) {
            merged.push(ch);
        }
    }
    if merged.len() > MAX_ROAM_CHANNELS {
        return Err(WlcError::Invalid("too many roam channels"));
    }

    ctx.device
        .set_mib_octets(ctx.ifname(), psid::ROAM_SCAN_CHANNELS, &channel_octets(&merged))?;
    ctx.config.roam.channels = merged;
    Ok(Reply::Done)
}

/// Frequency lists replace the roam channels only under host scan control.
pub fn set_roam_scan_frequencies(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    requires_ncho(ctx)?;
    let channels = channels_of_freqs(&values)?;
    if ctx.config.roam.scan_control != 1 {
        return Err(WlcError::Invalid("roam scan control off"));
    }
    replace_channels(ctx, channels)
}

pub fn add_roam_scan_frequencies(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    requires_ncho(ctx)?;
    let channels = channels_of_freqs(&values)?;
    extend_channels(ctx, channels)
}

pub fn get_roam_scan_frequencies(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_ncho(ctx)?;
    Ok(list_reply(
        PrivCommand::GetRoamScanFrequencies,
        &freqs_of(&ctx.config.roam.channels),
    ))
}

pub fn set_roam_scan_channels(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    requires_ncho(ctx)?;
    let channels = channels_of(&values)?;
    replace_channels(ctx, channels)
}

pub fn add_roam_scan_channels(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    requires_ncho(ctx)?;
    let channels = channels_of(&values)?;
    extend_channels(ctx, channels)
}

pub fn get_roam_scan_channels(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_ncho(ctx)?;
    Ok(list_reply(
        PrivCommand::GetRoamScanChannels,
        &ctx.config.roam.channels,
    ))
}

/// Roam band mask; bits outside the advertised set are a capability error.
pub fn set_roam_band(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mask = args.next_hex()?;
    requires_ncho(ctx)?;
    if mask == 0 {
        return Err(WlcError::Invalid("empty roam band"));
    }
    if ctx.config.nan_enabled {
        return Ok(nan_deferred(ctx));
    }
    if !ctx.config.supports_roam_band(mask) {
        return Err(WlcError::Io);
    }

    ctx.device
        .set_mib_int(ctx.ifname(), psid::ROAM_SCAN_BAND, i64::from(mask))?;
    ctx.config.roam.roam_band = mask;
    Ok(Reply::Done)
}

pub fn get_roam_band(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_ncho(ctx)?;
    Ok(read_reply(PrivCommand::GetRoamBand, ctx.config.roam.roam_band))
}

pub fn set_band(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let band = args.next_int()?;
    requires_ncho(ctx)?;
    let band = requires_range(band, 0, i64::from(SETBAND_2GHZ))? as u8;
    if ctx.config.nan_enabled {
        return Ok(nan_deferred(ctx));
    }
    if !ctx.config.supports_band(band) {
        return Err(WlcError::Io);
    }

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::SetBand { band })?;
    ctx.config.roam.band = band;
    Ok(Reply::Done)
}

/// Band changes are refused with status 1 while NAN is up; nothing is
/// applied.
fn nan_deferred(ctx: &CommandContext<'_>) -> Reply {
    debug!(ifname = ctx.ifname(), "band change held off while NAN is enabled");
    Reply::Status(NAN_ACTIVE)
}

pub fn get_band(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_ncho(ctx)?;
    Ok(read_reply(PrivCommand::GetBand, ctx.config.roam.band))
}

pub fn reassoc(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    let channel = args.next_int()?;
    requires_ncho(ctx)?;
    requires_activated(ctx.vif)?;
    requires_vif_type(ctx.vif, VifType::Station)?;
    requires_connected(ctx.vif, CONNECTED)?;
    if !is_valid_channel(channel) {
        return Err(WlcError::Invalid("channel"));
    }

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::Reassociate {
            bssid,
            channel: channel as u16,
        },
    )?;
    Ok(Reply::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixture::{Bench, PEER};
    use wlc_engine::MibValue;

    fn ncho_bench() -> Bench {
        let bench = Bench::connected();
        bench.configure(|c| c.ncho_mode = true);
        bench
    }

    #[test]
    fn knob_write_and_read() {
        let bench = ncho_bench();
        let write_delta = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            write(ctx, args, &ROAM_DELTA)
        };
        let read_delta = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            read(ctx, args, &ROAM_DELTA)
        };

        assert_eq!(bench.run(write_delta, "SETROAMDELTA 11"), Ok(Reply::Done));
        assert_eq!(bench.config().roam.delta, 11);
        assert_eq!(
            bench.fw.last_mib_write(psid::RSSI_ROAM_DELTA_TRIGGER),
            Some(MibValue::Int(11))
        );

        bench.fw.set_answer(psid::RSSI_ROAM_DELTA_TRIGGER, MibValue::Int(11));
        assert_eq!(
            bench.run(read_delta, "GETROAMDELTA"),
            Ok(Reply::Text("GETROAMDELTA 11".to_string()))
        );
    }

    #[test]
    fn boundaries_leave_store_untouched() {
        let bench = ncho_bench();
        let write_trigger = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            write(ctx, args, &ROAM_TRIGGER)
        };
        assert!(bench.run(write_trigger, "SETROAMTRIGGER -50").is_err());
        assert!(bench.run(write_trigger, "SETROAMTRIGGER -101").is_err());
        assert_eq!(bench.config().roam.trigger, -75);
        assert_eq!(bench.run(write_trigger, "SETROAMTRIGGER -51"), Ok(Reply::Done));
        assert_eq!(bench.run(write_trigger, "SETROAMTRIGGER -100"), Ok(Reply::Done));
        assert_eq!(bench.config().roam.trigger, -100);
    }

    #[test]
    fn roam_mode_is_a_closed_set() {
        let bench = ncho_bench();
        let write_mode = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            write(ctx, args, &ROAM_MODE)
        };
        assert!(bench.run(write_mode, "SETROAMMODE 2").is_err());
        assert_eq!(bench.run(write_mode, "SETROAMMODE 0"), Ok(Reply::Done));
    }

    #[test]
    fn wes_write_ignores_ncho() {
        let bench = Bench::connected();
        let write_wes = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            write(ctx, args, &WES_MODE)
        };
        let read_wes = |ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>| {
            read(ctx, args, &WES_MODE)
        };
        assert_eq!(bench.run(write_wes, "SETWESMODE 1"), Ok(Reply::Done));
        assert!(bench.run(read_wes, "GETWESMODE").is_err());
        assert_eq!(bench.config().roam.wes_mode, 1);
    }

    #[test]
    fn ncho_mode_flag() {
        let bench = Bench::station();
        assert!(bench.run(set_ncho_mode, "SETNCHOMODE 2").is_err());
        bench.run(set_ncho_mode, "SETNCHOMODE 1").unwrap();
        assert_eq!(
            bench.run(get_ncho_mode, "GETNCHOMODE"),
            Ok(Reply::Text("GETNCHOMODE 1".to_string()))
        );
    }

    #[test]
    fn channel_lists_follow_scan_control() {
        let bench = ncho_bench();
        assert_eq!(
            bench.run(set_roam_scan_channels, "SETROAMSCANCHANNELS 3 2 6 36"),
            Ok(Reply::Done)
        );
        assert_eq!(bench.config().roam.channels, vec![2, 6, 36]);
        assert!(bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 3 - 6 36")
            .is_err());
        assert!(bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 3 0 7 36")
            .is_err());
        assert!(bench
            .run(set_roam_scan_frequencies, "SETROAMSCANFREQUENCIES 2 2412 2437")
            .is_err());
        assert_eq!(bench.config().roam.channels, vec![2, 6, 36]);

        bench.configure(|c| c.roam.scan_control = 1);
        bench
            .run(set_roam_scan_frequencies, "SETROAMSCANFREQUENCIES 2 2412 2437")
            .unwrap();
        assert_eq!(bench.config().roam.channels, vec![1, 6]);
        assert!(bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 2 1 15")
            .is_err());
        bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 2 1 6")
            .unwrap();
        assert!(bench
            .run(add_roam_scan_channels, "ADDROAMSCANCHANNELS 1 11")
            .is_err());

        bench.configure(|c| c.roam.scan_control = 0);
        bench
            .run(add_roam_scan_frequencies, "ADDROAMSCANFREQUENCIES 2 2462 2412")
            .unwrap();
        assert_eq!(bench.config().roam.channels, vec![1, 6, 11]);
        assert_eq!(
            bench.run(get_roam_scan_frequencies, "GETROAMSCANFREQUENCIES"),
            Ok(Reply::Text("GETROAMSCANFREQUENCIES 3 2412 2437 2462".to_string()))
        );
    }

    #[test]
    fn channel_list_count_bounds() {
        let bench = ncho_bench();
        bench.configure(|c| c.roam.scan_control = 1);
        assert!(bench.run(set_roam_scan_channels, "SETROAMSCANCHANNELS 0").is_err());
        assert!(bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 21 1")
            .is_err());
        assert!(bench
            .run(set_roam_scan_channels, "SETROAMSCANCHANNELS 3 1 6")
            .is_err());
    }

    #[test]
    fn roam_band_capability() {
        let bench = Bench::station();
        assert!(bench.run(set_roam_band, "SETROAMBAND 5").is_err());

        bench.configure(|c| c.ncho_mode = true);
        assert!(bench.run(set_roam_band, "SETROAMBAND 0x0000").is_err());
        assert_eq!(bench.run(set_roam_band, "SETROAMBAND 0x0003"), Ok(Reply::Done));

        bench.configure(|c| c.supported_roam_band = 0x1);
        assert_eq!(bench.run(set_roam_band, "SETROAMBAND 0x0002"), Err(WlcError::Io));
        assert_eq!(
            bench.run(get_roam_band, "GETROAMBAND"),
            Ok(Reply::Text("GETROAMBAND 3".to_string()))
        );
    }

    #[test]
    fn band_changes_held_off_while_nan_enabled() {
        let bench = ncho_bench();
        bench.configure(|c| {
            c.supported_roam_band = 0x1;
            c.supported_band = 2;
            c.nan_enabled = true;
        });

        assert_eq!(
            bench.run(set_roam_band, "SETROAMBAND 0x0001"),
            Ok(Reply::Status(NAN_ACTIVE))
        );
        assert_eq!(bench.run(set_band, "SETBAND 1"), Ok(Reply::Status(NAN_ACTIVE)));
        assert!(bench.run(set_roam_band, "SETROAMBAND 0x0000").is_err());
        assert!(bench.run(set_band, "SETBAND 3").is_err());
        assert!(bench.fw.mib_writes().is_empty());
        assert!(bench.fw.requests().is_empty());
        assert_eq!(bench.config().roam, ncho_bench().config().roam);

        bench.configure(|c| c.nan_enabled = false);
        assert_eq!(bench.run(set_roam_band, "SETROAMBAND 0x0001"), Ok(Reply::Done));
        assert_eq!(bench.config().roam.roam_band, 1);
    }

    #[test]
    fn band_selection() {
        let bench = Bench::station();
        assert!(bench.run(set_band, "SETBAND 2").is_err());

        bench.configure(|c| {
            c.ncho_mode = true;
            c.supported_band = 0;
        });
        assert!(bench.run(set_band, "SETBAND 3").is_err());
        assert_eq!(bench.run(set_band, "SETBAND 0"), Ok(Reply::Done));
        assert_eq!(bench.run(set_band, "SETBAND 1"), Err(WlcError::Io));
    }

    #[test]
    fn reassoc_needs_connected_station() {
        let bench = Bench::activated(VifType::Station);
        bench.configure(|c| c.ncho_mode = true);
        assert!(bench.run(reassoc, "REASSOC 00:12:fb:00:00:0e 6").is_err());

        let bench = ncho_bench();
        assert!(bench.run(reassoc, "REASSOC 00:12:fb:00:00: 6").is_err());
        assert!(bench.run(reassoc, "REASSOC 00:12:fb:00:00:0e 0").is_err());
        bench.run(reassoc, "REASSOC 00:12:fb:00:00:0e 6").unwrap();
        assert_eq!(
            bench.fw.requests(),
            vec![FirmwareRequest::Reassociate {
                bssid: PEER,
                channel: 6
            }]
        );
    }
}
