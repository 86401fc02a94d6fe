//! Soft AP limits and channel plans.

use tracing::warn;

use wlc_common::{is_valid_channel, parse_int, CommandArgs, VifType, WlcError, WlcResult};
use wlc_engine::mib::psid;
use wlc_engine::FirmwareRequest;

use super::{CommandContext, Reply};
use crate::validate::{requires_activated, requires_one_of, requires_range, requires_vif_type};

pub const MAX_NUM_STA: i64 = 10;
pub const MAX_SAP_CHANNELS: i64 = 14;

const CHANNEL_WIDTHS: [i64; 4] = [20, 40, 80, 160];

pub fn hapd_max_num_sta(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_range(value, 1, MAX_NUM_STA)?;

    ctx.device.set_mib_int(ctx.ifname(), psid::MAX_CLIENT, value)?;
    ctx.config.ap.max_num_sta = value as u8;
    Ok(Reply::Done)
}

pub fn hapd_set_ax_mode(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, &[0, 1])?;

    ctx.device.set_mib_int(ctx.ifname(), psid::HE_ACTIVATED, value)?;
    ctx.config.ap.ax_mode = value == 1;
    Ok(Reply::Done)
}

pub fn set_sap_channel_list(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let count = args.next_int()?;
    let mut values = Vec::with_capacity(args.remaining());
    while let Some(token) = args.next_opt() {
        values.push(parse_int(token)?);
    }

    let count = requires_range(count, 1, MAX_SAP_CHANNELS)?;
    if values.len() as i64 != count {
        return Err(WlcError::Invalid("channel count"));
    }
    if let Some(bad) = values.iter().find(|&&ch| !is_valid_channel(ch)) {
        warn!(channel = *bad, "invalid SAP channel");
        return Err(WlcError::Invalid("sap channel"));
    }
    let channels: Vec<u16> = values.iter().map(|&ch| ch as u16).collect();

    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::SapChannels {
            channels: channels.clone(),
        },
    )?;
    ctx.config.ap.channels = channels;
    Ok(Reply::Done)
}

pub fn set_bss_channel_width(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let width = args.next_int()?;
    let restart = args.next_int()?;

    let width = requires_one_of(width, &CHANNEL_WIDTHS)? as u16;
    let restart = requires_one_of(restart, &[0, 1])? == 1;
    requires_activated(ctx.vif)?;
    requires_vif_type(ctx.vif, VifType::Ap)?;

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::BssChannelWidth { width, restart })?;
    ctx.config.ap.channel_width = width;
    Ok(Reply::Done)
}
