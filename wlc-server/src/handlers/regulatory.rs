//! Country code and band restriction commands.

use tracing::debug;

use wlc_common::{CommandArgs, PrivCommand, WlcError, WlcResult};
use wlc_engine::mib::psid;
use wlc_engine::FirmwareRequest;

use super::{read_reply, CommandContext, Reply};
use crate::validate::{requires_one_of, requires_range};

/// Two ASCII letters, folded to upper case.
fn country_code(token: &str) -> WlcResult<String> {
    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(WlcError::Invalid("country code"));
    }
    Ok(token.to_ascii_uppercase())
}

fn apply_country(ctx: &mut CommandContext<'_>, code: String, revision: u32) -> WlcResult<Reply> {
    ctx.device.firmware().send(
        ctx.ifname(),
        FirmwareRequest::SetCountry {
            code: code.clone(),
            revision,
        },
    )?;
    debug!(country = %code, revision, "country applied");

    let regulatory = &mut ctx.config.regulatory;
    regulatory.country = code;
    regulatory.revision = revision;
    Ok(Reply::Done)
}

pub fn country(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let token = args.next_token()?;
    let code = country_code(token)?;
    let revision = ctx.config.regulatory.revision;
    apply_country(ctx, code, revision)
}

pub fn set_country_rev(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let token = args.next_token()?;
    let revision = args.next_int()?;
    let code = country_code(token)?;
    let revision = requires_range(revision, 0, i64::from(u32::MAX))? as u32;
    apply_country(ctx, code, revision)
}

pub fn get_country_rev(ctx: &mut CommandContext<'_>, _args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let regulatory = &ctx.config.regulatory;
    Ok(read_reply(
        PrivCommand::GetCountryRev,
        format_args!("{} {}", regulatory.country, regulatory.revision),
    ))
}

/// Turns regulatory change reporting on or off; nothing is written back.
pub fn get_regulatory(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = requires_one_of(value, &[0, 1])?;
    ctx.config.regulatory.report_regulatory = value == 1;
    Ok(Reply::Done)
}

/// -1 lifts the restriction.
pub fn set_fcc_channel(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let value = i32::try_from(value).map_err(|_| WlcError::Invalid("fcc channel"))?;

    ctx.device
        .set_mib_int(ctx.ifname(), psid::NO_CELL_MAX_POWER_CHANNELS, i64::from(value))?;
    ctx.config.regulatory.fcc_channel = value;
    Ok(Reply::Done)
}

pub fn factory_set_band(ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    let value = args.next_int()?;
    let band = requires_one_of(value, &[0, 1, 2])? as u8;

    ctx.device
        .firmware()
        .send(ctx.ifname(), FirmwareRequest::SetBand { band })?;
    ctx.config.regulatory.factory_band = band;
    Ok(Reply::Done)
}
