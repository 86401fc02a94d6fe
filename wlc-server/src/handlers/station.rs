//! # Station Commands
//!
//! Per-connection actions and filters for station interfaces: action
//! frames, forced roaming, the roaming blacklist, RX filters, key material
//! and the assorted connection tunables.
//!
//! ## Hex Payloads
//!
//! `SENDACTIONFRAME`, `SET_DISCONNECT_IES` and `SETJOINPREFER` carry their
//! payload as a single hex token. Odd length or a non-hex digit is a parse
//! failure; the decoded bytes are then checked for shape.
//!
//! ```text
//! SETJOINPREFER record:   [tag][len = 2][v0][v1]
//! SET_DISCONNECT_IES:     [0xdd][len][len bytes of vendor payload]
//! ```

use tracing::{debug, warn};

use wlc_common::{
    decode_hex, is_valid_channel, parse_int, CommandArgs, MacAddr, ParseError, VifStatus, VifType,
    WlcError, WlcResult,
};
use wlc_engine::config::{RssiMonitor, TidConfig};
use wlc_engine::mib::psid;
use wlc_engine::FirmwareRequest;

use super::{CommandContext, Reply};
use crate::validate::{
    requires_activated, requires_connected, requires_one_of, requires_range, requires_vif_type,
    CONNECTED,
};

pub const PMK_LEN: usize = 32;
pub const MAX_ACTION_FRAME_LEN: i64 = 1024;
pub const MAX_RX_FILTER: i64 = 3;

const VENDOR_IE_ID: u8 = 0xdd;

const JOIN_PREF_RSSI: u8 = 1;
const JOIN_PREF_WPA: u8 = 2;
const JOIN_PREF_BAND: u8 = 3;
const JOIN_PREF_RSSI_DELTA: u8 = 4;
const JOIN_PREF_RECORD_LEN: usize = 4;

/// Hang reason reported for a host-requested recovery test.
const FORCE_HANG_REASON: u16 = 0;

pub fn set_tx_ant_config(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_range(value, 1, 3)?;
    if ctx.vif.status == VifStatus::Connecting {
        return Err(WlcError::NotPermitted);
    }

    ctx.device
        .set_mib_int(ctx.ifname(), psid::TX_ANTENNA_CONFIG, value)?;
    ctx.config.station.tx_ant = value as u8;
    Ok(Reply::Done)
}

/// The key follows the command name as raw bytes; only the first
/// `PMK_LEN` are used.
pub fn set_pmk(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let material = args.rest().as_bytes();
    if material.len() < PMK_LEN {
        return Err(ParseError::BadLength.into());
    }
    let pmk = material[..PMK_LEN].to_vec();

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::SetPmk { pmk: pmk.clone() })?;
    ctx.config.station.pmk = pmk;
    Ok(Reply::Done)
}

pub fn send_action_frame(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    let channel = args.next_int()?;
    let dwell = args.next_int()?;
    let len = args.next_int()?;
    let frame = decode_hex(args.next_token()?)?;

    requires_activated(ctx.vif)?;
    if ctx.vif.bssid != Some(bssid) {
        warn!(%bssid, "action frame target is not the connected peer");
        return Err(WlcError::Invalid("bssid"));
    }
    let channel = requires_range(channel, 1, 165)? as u16;
    let dwell_ms = requires_range(dwell, 0, i64::from(u32::MAX))? as u32;
    let len = requires_range(len, 0, MAX_ACTION_FRAME_LEN)?;
    if frame.len() as i64 != len {
        return Err(WlcError::Invalid("frame length"));
    }

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::ActionFrame {
            bssid,
            channel,
            dwell_ms,
            frame,
        },
    )?;
    Ok(Reply::Done)
}

fn sorted(bssids: impl Iterator<Item = MacAddr>) -> Vec<MacAddr> {
    let mut list: Vec<MacAddr> = bssids.collect();
    list.sort();
    list
}

pub fn roaming_blacklist_add(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    if ctx.config.station.blacklist.contains(&bssid) {
        return Ok(Reply::Done);
    }

    let bssids = sorted(
        ctx.config
            .station
            .blacklist
            .iter()
            .copied()
            .chain(std::iter::once(bssid)),
    );
    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::RoamBlacklist { bssids })?;
    ctx.config.station.blacklist.insert(bssid);
    Ok(Reply::Done)
}

/// Removing an address that is not listed is a no-op.
pub fn roaming_blacklist_remove(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    if !ctx.config.station.blacklist.contains(&bssid) {
        debug!(%bssid, "not blacklisted");
        return Ok(Reply::Done);
    }

    let bssids = sorted(
        ctx.config
            .station
            .blacklist
            .iter()
            .copied()
            .filter(|&mac| mac != bssid),
    );
    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::RoamBlacklist { bssids })?;
    ctx.config.station.blacklist.remove(&bssid);
    Ok(Reply::Done)
}

pub fn force_roaming_bssid(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let bssid = args.next_mac()?;
    let channel = args.next_int()?;

    if !is_valid_channel(channel) {
        return Err(WlcError::Invalid("channel"));
    }
    requires_vif_type(ctx.vif, VifType::Station)?;
    requires_connected(ctx.vif, CONNECTED)?;

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::ForceRoam {
            bssid,
            channel: channel as u16,
        },
    )?;
    Ok(Reply::Done)
}

/// Installed filters only reach the firmware while filtering is started.
fn update_rx_filters(ctx: &mut CommandContext<'_>, mask: u8, active: bool) -> WlcResult<Reply> {
    let station = &ctx.config.station;
    if active || station.rx_filter_active {
        ctx.device
            .firmware()
            .send(ctx.ifname(), FirmwareRequest::RxFilter { mask, active })?;
    }
    let station = &mut ctx.config.station;
    station.rx_filters = mask;
    station.rx_filter_active = active;
    Ok(Reply::Done)
}

pub fn rx_filter_add(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let index = args.next_int()?;
    let index = requires_range(index, 0, MAX_RX_FILTER)?;
    let mask = ctx.config.station.rx_filters | (1u8 << index);
    let active = ctx.config.station.rx_filter_active;
    update_rx_filters(ctx, mask, active)
}

/// Without an index every filter is removed.
pub fn rx_filter_remove(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mask = match args.next_opt() {
        None => 0,
        Some(token) => {
            let index = requires_range(parse_int(token)?, 0, MAX_RX_FILTER)?;
            ctx.config.station.rx_filters & !(1u8 << index)
        }
    };
    let active = ctx.config.station.rx_filter_active;
    update_rx_filters(ctx, mask, active)
}

pub fn rx_filter_start(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mask = ctx.config.station.rx_filters;
    update_rx_filters(ctx, mask, true)
}

pub fn rx_filter_stop(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mask = ctx.config.station.rx_filters;
    update_rx_filters(ctx, mask, false)
}

pub fn fake_mac(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let enabled = match args.next_token()? {
        "ON" => true,
        "OFF" => false,
        _ => return Err(WlcError::Invalid("expected ON or OFF")),
    };

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::RandomMac { enabled })?;
    ctx.config.station.fake_mac = enabled;
    Ok(Reply::Done)
}

/// `[mode][tid][uid, little endian]`
fn tid_octets(tid: &TidConfig) -> Vec<u8> {
    let mut data = vec![tid.mode, tid.tid];
    data.extend_from_slice(&tid.uid.to_le_bytes());
    data
}

pub fn set_tid(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let mode = args.next_int()?;
    let uid = args.next_int()?;
    let tid = args.next_int()?;

    let tid = TidConfig {
        mode: requires_range(mode, 0, 3)? as u8,
        uid: requires_range(uid, 0, i64::from(u32::MAX))? as u32,
        tid: requires_range(tid, 0, 7)? as u8,
    };

    ctx.device
        .set_mib_octets(ctx.ifname(), psid::TID_CONFIG, &tid_octets(&tid))?;
    ctx.config.station.tid = Some(tid);
    Ok(Reply::Done)
}

/// Four scan dwell times, written as one MIB request with indexes 1..=4.
pub fn set_dwell_time(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let values = args.next_ints(4)?;

    let mut dwell = [0u32; 4];
    for (slot, &value) in dwell.iter_mut().zip(&values) {
        *slot = requires_range(value, 0, i64::from(u32::MAX))? as u32;
    }

    let mut mib = ctx.device.mib_buffer();
    for (index, &value) in (1u16..).zip(&dwell) {
        mib.encode_uint(psid::MLME_SCAN_CHANNEL_MAX_SCAN_TIME, u64::from(value), index)?;
    }
    ctx.device.send_mib(ctx.ifname(), mib)?;
    ctx.config.station.dwell_time = dwell;
    Ok(Reply::Done)
}

/// A malformed value reads as 0.
pub fn set_grace_period(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let token = args.next_token()?;
    let value = parse_int(token).unwrap_or(0);
    ctx.config.power.grace_period = value;
    Ok(Reply::Done)
}

pub fn set_disconnect_ies(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let ies = decode_hex(args.next_token()?)?;

    match ies.as_slice() {
        [VENDOR_IE_ID, len, payload @ ..] if usize::from(*len) == payload.len() => {}
        _ => return Err(WlcError::Invalid("vendor IE")),
    }

    ctx.device
        .set_mib_octets(ctx.ifname(), psid::DISCONNECT_IES, &ies)?;
    ctx.config.station.disconnect_ies = ies;
    Ok(Reply::Done)
}

fn check_join_preference(blob: &[u8]) -> WlcResult<()> {
    if blob.is_empty() || blob.len() % JOIN_PREF_RECORD_LEN != 0 {
        return Err(WlcError::Invalid("join preference length"));
    }
    for record in blob.chunks_exact(JOIN_PREF_RECORD_LEN) {
        let (tag, len, last) = (record[0], record[1], record[3]);
        if len != 2 {
            return Err(WlcError::Invalid("join preference record length"));
        }
        match tag {
            JOIN_PREF_RSSI | JOIN_PREF_WPA => {}
            JOIN_PREF_BAND | JOIN_PREF_RSSI_DELTA if last <= 2 => {}
            _ => {
                warn!(tag, last, "bad join preference record");
                return Err(WlcError::Invalid("join preference record"));
            }
        }
    }
    Ok(())
}

pub fn set_join_prefer(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let blob = decode_hex(args.next_token()?)?;
    check_join_preference(&blob)?;

    ctx.device
        .set_mib_octets(ctx.ifname(), psid::JOIN_PREFERENCE, &blob)?;
    ctx.config.station.join_preference = blob;
    Ok(Reply::Done)
}

pub fn set_tdls_enabled(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, &[0, 1])?;

    ctx.device
        .set_mib_int(ctx.ifname(), psid::TDLS_ACTIVATED, value)?;
    ctx.config.station.tdls_enabled = value == 1;
    Ok(Reply::Done)
}

pub fn set_rssi_monitor(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let enable = args.next_int()?;
    let min = args.next_int()?;
    let max = args.next_int()?;

    let enable = requires_one_of(enable, &[0, 1])? == 1;
    requires_vif_type(ctx.vif, VifType::Station)?;
    requires_connected(ctx.vif, CONNECTED)?;
    let min = requires_range(min, i64::from(i8::MIN), i64::from(i8::MAX))? as i8;
    let max = requires_range(max, i64::from(i8::MIN), i64::from(i8::MAX))? as i8;
    if enable && min > max {
        return Err(WlcError::Invalid("rssi window"));
    }

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::RssiMonitor { enable, min, max })?;
    ctx.config.station.rssi_monitor = enable.then_some(RssiMonitor { min, max });
    Ok(Reply::Done)
}

pub fn test_force_hang(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    warn!(ifname = %ctx.ifname(), "forced hang requested");
    ctx.device.force_hang(FORCE_HANG_REASON);
    Ok(Reply::Done)
}
