//! # P2P Commands
//!
//! Group owner power save, NoA, channel switch and listen offload.
//!
//! ## Design Principles
//! 1. **Advisory Channel Switch**: `P2P_ECSA` drops a channel or bandwidth
//!    outside the tables and reports success.
//! 2. **Fail Closed**: Every other command here rejects what it cannot
//!    apply.

use tracing::debug;

use wlc_common::{is_valid_channel, CommandArgs, P2pState, VifType, WlcError, WlcResult};
use wlc_engine::config::NoaSchedule;
use wlc_engine::FirmwareRequest;

use super::{CommandContext, Reply};
use crate::validate::{requires_activated, requires_one_of, requires_range, requires_vif_type};

const ECSA_BANDWIDTHS: [i64; 3] = [20, 40, 80];

pub fn set_p2p_oppps(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let legacy_ps = args.next_int()?;
    let opp_ps = args.next_int()?;
    let ctwindow = args.next_int()?;

    requires_activated(ctx.vif)?;
    requires_vif_type(ctx.vif, VifType::P2pGo)?;
    let legacy_ps = i32::try_from(legacy_ps).map_err(|_| WlcError::Invalid("legacy ps"))?;
    let opp_ps = requires_one_of(opp_ps, &[0, 1])? == 1;
    let ctwindow = requires_range(ctwindow, 0, 255)? as u8;

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::P2pPowerSave {
            legacy_ps,
            opp_ps,
            ctwindow,
        },
    )?;

    let p2p = &mut ctx.config.p2p;
    p2p.legacy_ps = legacy_ps;
    p2p.opp_ps = opp_ps;
    p2p.ctwindow = ctwindow;
    Ok(Reply::Done)
}

pub fn set_noa_params(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let count = args.next_int()?;
    let start = args.next_int()?;
    let duration = args.next_int()?;

    requires_activated(ctx.vif)?;
    requires_vif_type(ctx.vif, VifType::P2pGo)?;
    let schedule = NoaSchedule {
        count: requires_range(count, 0, 255)? as u8,
        start_ms: requires_range(start, 0, i64::from(u32::MAX))? as u32,
        duration_ms: requires_range(duration, 0, i64::from(u32::MAX))? as u32,
    };

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::NoticeOfAbsence {
            count: schedule.count,
            start_ms: schedule.start_ms,
            duration_ms: schedule.duration_ms,
        },
    )?;
    ctx.config.p2p.noa = Some(schedule);
    Ok(Reply::Done)
}

pub fn ecsa(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let channel = args.next_int()?;
    let bandwidth = args.next_int()?;

    if !is_valid_channel(channel) || !ECSA_BANDWIDTHS.contains(&bandwidth) {
        debug!(channel, bandwidth, "channel switch ignored");
        return Ok(Reply::Done);
    }

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::ChannelSwitch {
            channel: channel as u16,
            bandwidth: bandwidth as u16,
        },
    )?;
    Ok(Reply::Done)
}

pub fn listen_offload_start(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let channel = args.next_int()?;
    let period = args.next_int()?;
    let interval = args.next_int()?;
    let count = args.next_int()?;

    if !is_valid_channel(channel) {
        return Err(WlcError::Invalid("listen channel"));
    }
    requires_activated(ctx.vif)?;
    if ctx.vif.p2p_state == P2pState::Scanning {
        return Err(WlcError::Invalid("p2p scan in progress"));
    }
    let request = FirmwareRequest::ListenOffloadStart {
        channel: channel as u16,
        period: requires_range(period, 0, i64::from(u32::MAX))? as u32,
        interval: requires_range(interval, 0, i64::from(u32::MAX))? as u32,
        count: requires_range(count, 0, i64::from(u32::MAX))? as u32,
    };

    ctx.device.firmware().send(ctx.ifname(), request)?;
    ctx.config.p2p.listen_offload = true;
    Ok(Reply::Done)
}

/// Arguments are ignored.
pub fn listen_offload_stop(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    if ctx.config.p2p.listen_offload {
        ctx.device
            .firmware()
            .send(ctx.ifname(), FirmwareRequest::ListenOffloadStop)?;
        ctx.config.p2p.listen_offload = false;
    }
    Ok(Reply::Done)
}
