//! # Target Wake Time
//!
//! TWT commands report vendor status codes rather than errnos. Arguments
//! are read leniently (a missing or malformed token takes its default),
//! then the gates run in a fixed order.
//!
//! ```text
//! twt_allowed false       -> WifiStatus::NotSupported (3)
//! not a connected station -> WifiStatus::NotAvailable (4)
//! firmware rejects        -> -EIO
//! ```

use std::fmt::Write as _;

use tracing::error;

use wlc_common::{CommandArgs, PrivCommand, WifiStatus, WlcError, WlcResult};
use wlc_engine::{FirmwareReply, FirmwareRequest, TwtSetupParams};

use super::{CommandContext, Reply};

fn requires_twt(ctx: &CommandContext<'_>) -> WlcResult<()> {
    if !ctx.vif.twt_allowed {
        return Err(WlcError::Vendor(WifiStatus::NotSupported));
    }
    if !ctx.vif.is_station() || !ctx.vif.is_connected() {
        return Err(WlcError::Vendor(WifiStatus::NotAvailable));
    }
    Ok(())
}

fn send(ctx: &CommandContext<'_>, request: FirmwareRequest) -> WlcResult<FirmwareReply> {
    ctx.device
        .firmware()
        .send(ctx.ifname(), request)
        .map_err(|err| {
            error!(ifname = %ctx.ifname(), %err, "twt request rejected");
            WlcError::Io
        })
}

/// `"<NAME> <v1> .. <vn>"`
fn values_reply(cmd: PrivCommand, values: &[i64]) -> Reply {
    let mut text = cmd.name().to_string();
    for value in values {
        let _ = write!(text, " {}", value);
    }
    Reply::Text(text)
}

pub fn twt_setup(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let fields: Vec<i64> = (0..TwtSetupParams::FIELD_COUNT)
        .map(|_| args.next_int_or(0))
        .collect();
    requires_twt(ctx)?;

    send(ctx, FirmwareRequest::TwtSetup(TwtSetupParams::from_fields(&fields)))?;
    Ok(Reply::Done)
}

pub fn twt_teardown(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let setup_id = args.next_int_or(0);
    let negotiation_type = args.next_int_or(0);
    requires_twt(ctx)?;

    send(
        ctx,
        FirmwareRequest::TwtTeardown {
            setup_id,
            negotiation_type,
        },
    )?;
    Ok(Reply::Done)
}

pub fn twt_info_frame(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let setup_id = args.next_int_or(0);
    let resume_time_us = args.next_int_or(0);
    requires_twt(ctx)?;

    send(
        ctx,
        FirmwareRequest::TwtInfoFrame {
            setup_id,
            resume_time_us,
        },
    )?;
    Ok(Reply::Done)
}

pub fn get_twt_status(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let setup_id = args.next_int_or(0);
    requires_twt(ctx)?;

    let reply = send(ctx, FirmwareRequest::TwtStatus { setup_id })?;
    Ok(values_reply(PrivCommand::GetTwtStatus, reply.values()))
}

pub fn get_twt_cap(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    requires_twt(ctx)?;

    let reply = send(ctx, FirmwareRequest::TwtCapabilities)?;
    Ok(values_reply(PrivCommand::GetTwtCap, reply.values()))
}

pub fn get_twt_statistics(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let setup_id = args.next_int_or(0);
    requires_twt(ctx)?;

    let reply = send(ctx, FirmwareRequest::TwtStatistics { setup_id })?;
    Ok(values_reply(PrivCommand::GetTwtStatistics, reply.values()))
}

pub fn clear_twt_statistics(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let setup_id = args.next_int_or(0);
    requires_twt(ctx)?;

    send(ctx, FirmwareRequest::TwtClearStatistics { setup_id })?;
    Ok(Reply::Done)
}
