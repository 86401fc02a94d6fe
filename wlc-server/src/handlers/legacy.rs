//! # Legacy Roaming
//!
//! Roam tuning used while NCHO mode is off. These mirror part of the NCHO
//! family but keep their own values in `DeviceConfig::legacy`, and are
//! rejected while NCHO is on.

use wlc_common::{
    freq_to_channel, is_valid_channel, parse_int, CommandArgs, MacAddr, ParseError, PrivCommand,
    VifType, WlcError, WlcResult,
};
use wlc_engine::config::{WtcMode, MAX_ROAM_CHANNELS};
use wlc_engine::mib::psid;
use wlc_engine::FirmwareRequest;

use super::ncho::{channel_octets, channels_of, channels_of_freqs, freqs_of, next_list};
use super::{list_reply, read_reply, CommandContext, Reply};
use crate::validate::{
    requires_activated, requires_connected, requires_mode_flag, requires_one_of, requires_range,
    requires_vif_type, CONNECTED,
};

/// Largest roam offload AP list.
pub const MAX_OFFLOAD_APS: i64 = 8;

/// Upper bound shared by the legacy scan timers, in milliseconds.
const SCAN_TIME_MAX: i64 = 1000;

fn requires_legacy(ctx: &CommandContext<'_>) -> WlcResult<()> {
    requires_mode_flag(ctx.config.ncho_mode, false, "ncho")
}

pub fn set_roam_trigger(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    requires_legacy(ctx)?;
    let value = requires_range(value, -100, -51)?;

    ctx.device
        .set_mib_int(ctx.ifname(), psid::RSSI_ROAM_SCAN_TRIGGER, value)?;
    ctx.config.legacy.trigger = value as i32;
    Ok(Reply::Done)
}

pub fn get_roam_trigger(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_legacy(ctx)?;
    Ok(read_reply(
        PrivCommand::GetRoamTriggerLegacy,
        ctx.config.legacy.trigger,
    ))
}

fn extend_channels(ctx: &mut CommandContext<'_>, values: &[i64], as_freqs: bool) -> WlcResult<Reply> {
    if !ctx.vif.activated {
        return Err(WlcError::NotPermitted);
    }
    requires_legacy(ctx)?;
    let channels = if as_freqs {
        channels_of_freqs(values)?
    } else {
        channels_of(values)?
    };

    let mut merged = ctx.config.legacy.channels.clone();
    for ch in channels {
        if !merged.contains(&ch) {
            merged.push(ch);
        }
    }
    merged.truncate(MAX_ROAM_CHANNELS);

    ctx.device
        .set_mib_octets(ctx.ifname(), psid::ROAM_SCAN_CHANNELS, &channel_octets(&merged))?;
    ctx.config.legacy.channels = merged;
    Ok(Reply::Done)
}

pub fn add_roam_scan_frequencies(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    extend_channels(ctx, &values, true)
}

pub fn add_roam_scan_channels(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = next_list(args)?;
    extend_channels(ctx, &values, false)
}

pub fn get_roam_scan_frequencies(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_legacy(ctx)?;
    Ok(list_reply(
        PrivCommand::GetRoamScanFrequenciesLegacy,
        &freqs_of(&ctx.config.legacy.channels),
    ))
}

pub fn get_roam_scan_channels(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_legacy(ctx)?;
    Ok(list_reply(
        PrivCommand::GetRoamScanChannelsLegacy,
        &ctx.config.legacy.channels,
    ))
}

fn scan_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>, psid: u16) -> WlcResult<i32> {
    let value = args.next_int()?;
    requires_legacy(ctx)?;
    // The firmware refuses a zero dwell time.
    if value == 0 {
        return Err(WlcError::Io);
    }
    let value = requires_range(value, 1, SCAN_TIME_MAX)?;
    ctx.device.set_mib_int(ctx.ifname(), psid, value)?;
    Ok(value as i32)
}

pub fn set_scan_home_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = scan_time(ctx, args, psid::ROAM_SCAN_HOME_TIME)?;
    ctx.config.legacy.home_time = value;
    Ok(Reply::Done)
}

pub fn set_scan_home_away_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = scan_time(ctx, args, psid::ROAM_SCAN_HOME_AWAY_TIME)?;
    ctx.config.legacy.home_away_time = value;
    Ok(Reply::Done)
}

pub fn set_scan_channel_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = scan_time(ctx, args, psid::ROAM_SCAN_MAX_ACTIVE_CHANNEL_TIME)?;
    ctx.config.legacy.channel_time = value;
    Ok(Reply::Done)
}

pub fn set_scan_passive_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = scan_time(ctx, args, psid::SCAN_PASSIVE_TIME)?;
    ctx.config.legacy.passive_time = value;
    Ok(Reply::Done)
}

fn reassociate(ctx: &mut CommandContext<'_>, bssid: MacAddr, channel: u16) -> WlcResult<Reply> {
    requires_legacy(ctx)?;
    requires_activated(ctx.vif)?;
    requires_vif_type(ctx.vif, VifType::Station)?;
    requires_connected(ctx.vif, CONNECTED)?;

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::Reassociate { bssid, channel })?;
    Ok(Reply::Done)
}

pub fn reassoc(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    let channel = args.next_int()?;
    if !is_valid_channel(channel) {
        return Err(WlcError::Invalid("channel"));
    }
    reassociate(ctx, bssid, channel as u16)
}

pub fn reassoc_frequency(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    let freq = args.next_int()?;
    let channel = u16::try_from(freq)
        .ok()
        .and_then(freq_to_channel)
        .ok_or(WlcError::Invalid("frequency"))?;
    reassociate(ctx, bssid, channel)
}

/// `SETROAMOFFLAPLIST n,mac[,mac...]`
pub fn set_roam_offload_ap_list(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mut parts = args.rest().split(',').map(str::trim);
    let count = parse_int(parts.next().ok_or(ParseError::Missing)?)?;
    let aps = parts
        .map(|part| part.parse::<MacAddr>())
        .collect::<Result<Vec<_>, _>>()?;

    let count = requires_range(count, 1, MAX_OFFLOAD_APS)? as usize;
    if aps.len() != count {
        return Err(WlcError::Parse(ParseError::BadLength));
    }

    let octets: Vec<u8> = aps.iter().flat_map(|mac| mac.octets()).collect();
    ctx.device
        .set_mib_octets(ctx.ifname(), psid::ROAM_OFFLOAD_AP_LIST, &octets)?;
    ctx.config.legacy.offload_aps = aps;
    Ok(Reply::Done)
}

/// `SETWTCMODE mode scan_mode rssi_2g rssi_5g rssi_6g rssi_delta`
pub fn set_wtc_mode(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let fields = args.next_ints(6)?;
    if args.remaining() != 0 {
        return Err(WlcError::Invalid("trailing tokens"));
    }
    requires_activated(ctx.vif)
        .and_then(|_| requires_vif_type(ctx.vif, VifType::Station))
        .map_err(|_| WlcError::NotPermitted)?;

    let rssi = |value: i64| requires_range(value, -128, 0).map(|v| v as i8);
    let wtc = WtcMode {
        mode: requires_range(fields[0], 0, 255)? as u8,
        scan_mode: requires_one_of(fields[1], &[0, 1, 2])? as u8,
        rssi_2g: rssi(fields[2])?,
        rssi_5g: rssi(fields[3])?,
        rssi_6g: rssi(fields[4])?,
        rssi_delta: rssi(fields[5])?,
    };

    let record = [
        wtc.mode,
        wtc.scan_mode,
        wtc.rssi_2g as u8,
        wtc.rssi_5g as u8,
        wtc.rssi_6g as u8,
        wtc.rssi_delta as u8,
    ];
    ctx.device
        .set_mib_octets(ctx.ifname(), psid::WTC_MODE, &record)?;
    ctx.config.legacy.wtc = Some(wtc);
    Ok(Reply::Done)
}
