//! # Power Commands
//!
//! Suspend mode, DTIM, TX power backoff and eLNA bypass. Most of these act
//! on a connected station only and check that before the value range.

use tracing::debug;

use wlc_common::{parse_int, CommandArgs, WlcError, WlcResult};
use wlc_engine::mib::psid;

use super::{CommandContext, Reply};
use crate::validate::{requires_connected, requires_one_of, requires_range, CONNECTED};

/// SAR backoff index used while a call is active; -1 disables it.
const TX_POWER_CALLING_MAX: i64 = 9;

pub fn set_suspend_mode(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, &[0, 1])?;

    let vif = ctx.vif;
    if value == 1 && vif.is_station() && vif.is_connected() && vif.igmp_offload {
        if ctx.config.nan_enabled {
            debug!(ifname = %vif.ifname, "NAN active, IGMP offload left as is");
        } else {
            ctx.device.set_mib_int(ctx.ifname(), psid::IGMP_OFFLOAD, 1)?;
        }
    }

    ctx.config.power.suspend_mode = value == 1;
    Ok(Reply::Done)
}

/// Applied when the host next suspends.
pub fn max_dtim_in_suspend(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    requires_connected(ctx.vif, CONNECTED).map_err(|_| WlcError::NotPermitted)?;
    let value = requires_one_of(value, &[0, 1])?;

    ctx.config.power.max_dtim_in_suspend = value == 1;
    Ok(Reply::Done)
}

pub fn set_dtim_in_suspend(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    requires_connected(ctx.vif, CONNECTED).map_err(|_| WlcError::NotPermitted)?;
    let value = requires_range(value, 1, 255)? as u8;
    if ctx.vif.max_dtim_recv == 0 {
        return Err(WlcError::NotPermitted);
    }

    // Never skip more beacons than the AP advertises.
    let skip = value.min(ctx.vif.max_dtim_recv);
    ctx.device
        .set_mib_int(ctx.ifname(), psid::LISTEN_INTERVAL_SKIPPING_DTIM, i64::from(skip))?;
    ctx.config.power.dtim_in_suspend = value;
    Ok(Reply::Done)
}

pub fn set_tx_power_calling(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_range(value, -1, TX_POWER_CALLING_MAX)?;

    ctx.device.set_mib_int(ctx.ifname(), psid::SAR_BACKOFF, value)?;
    ctx.config.power.tx_power_calling = value as i32;
    Ok(Reply::Done)
}

pub fn set_tx_power_sub6_band(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let band = args.next_int()?;
    if ctx.config.host_state == 0 {
        return Err(WlcError::Invalid("no modem state"));
    }
    let band = u16::try_from(band).map_err(|_| WlcError::Invalid("nr band"))?;
    if !ctx.config.nr_bands.contains(&band) {
        return Err(WlcError::Invalid("unsupported nr band"));
    }

    ctx.device
        .set_mib_int(ctx.ifname(), psid::SUB6_BAND_POWER, i64::from(band))?;
    ctx.config.power.tx_power_sub6_band = Some(band);
    Ok(Reply::Done)
}

pub fn elna_bypass(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, &[0, 1])?;

    ctx.device.set_mib_int(ctx.ifname(), psid::ELNA_BYPASS, value)?;
    ctx.config.power.elna_bypass = value == 1;
    Ok(Reply::Done)
}

pub fn elna_bypass_int(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_range(value, 0, 65535)?;
    if !ctx.vif.vif_type.is_ap_like() {
        requires_connected(ctx.vif, CONNECTED).map_err(|_| WlcError::NotPermitted)?;
    }

    ctx.device
        .set_mib_int(ctx.ifname(), psid::ELNA_BYPASS_INTERVAL, value)?;
    ctx.config.power.elna_bypass_interval = value as u32;
    Ok(Reply::Done)
}

pub fn set_latency_crt_data(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_range(value, 0, 3)?;

    ctx.device
        .set_mib_int(ctx.ifname(), psid::LATENCY_CRITICAL_DATA, value)?;
    ctx.config.power.latency_crt_data = value as u8;
    Ok(Reply::Done)
}

/// Only runs with the radio otherwise idle.
pub fn power_measurement_start(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    if ctx.device.any_vif_activated() {
        return Err(WlcError::Invalid("interface active"));
    }
    ctx.device
        .firmware()
        .send(ctx.ifname(), wlc_engine::FirmwareRequest::PowerMeasurement)?;
    Ok(Reply::Done)
}

pub fn adps_enable(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let token = args.next_token()?;
    let enable = parse_int(token).unwrap_or(1) != 0;

    ctx.device
        .set_mib_int(ctx.ifname(), psid::ADPS_ENABLE, i64::from(enable))?;
    ctx.config.power.adps = enable;
    Ok(Reply::Done)
}
