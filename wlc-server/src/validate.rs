//! # Command Validators
//!
//! Purpose: Reusable state and range predicates that handlers compose
//! before touching the configuration store.
//!
//! ## Design Principles
//!
//! 1. **Short-Circuit**: Each predicate returns `WlcResult`; handlers chain
//!    them with `?`, so the first failure wins and later checks never run.
//! 2. **Invalid By Default**: Every predicate fails with `WlcError::Invalid`.
//!    Call sites that report a different code map the error themselves.
//! 3. **Value Pass-Through**: Range checks hand the accepted value back so a
//!    handler can parse, check and bind in one line.

use tracing::warn;

use wlc_common::{VifStatus, VifType, WlcError, WlcResult};
use wlc_engine::VifState;

/// Status set for commands that need an established association.
pub const CONNECTED: &[VifStatus] = &[VifStatus::Connected];

/// Status set for commands that also accept an association in progress.
pub const CONNECTING_OR_CONNECTED: &[VifStatus] = &[VifStatus::Connecting, VifStatus::Connected];

pub fn requires_activated(vif: &VifState) -> WlcResult<()> {
    if !vif.activated {
        warn!(ifname = %vif.ifname, "interface not activated");
        return Err(WlcError::Invalid("not activated"));
    }
    Ok(())
}

pub fn requires_vif_type(vif: &VifState, vif_type: VifType) -> WlcResult<()> {
    if vif.vif_type != vif_type {
        warn!(ifname = %vif.ifname, have = %vif.vif_type, want = %vif_type, "wrong interface type");
        return Err(WlcError::Invalid("wrong interface type"));
    }
    Ok(())
}

pub fn requires_connected(vif: &VifState, allowed: &[VifStatus]) -> WlcResult<()> {
    if !allowed.contains(&vif.status) {
        warn!(ifname = %vif.ifname, status = ?vif.status, "connection state rejects command");
        return Err(WlcError::Invalid("connection state"));
    }
    Ok(())
}

/// Fails unless `flag` matches `required` (NCHO on for the NCHO family, off
/// for the legacy family).
pub fn requires_mode_flag(flag: bool, required: bool, name: &'static str) -> WlcResult<()> {
    if flag != required {
        warn!(mode = name, enabled = flag, "mode flag rejects command");
        return Err(WlcError::Invalid(name));
    }
    Ok(())
}

/// Inclusive bounds check.
pub fn requires_range(value: i64, lo: i64, hi: i64) -> WlcResult<i64> {
    if value < lo || value > hi {
        warn!(value, lo, hi, "out of range");
        return Err(WlcError::Invalid("out of range"));
    }
    Ok(value)
}

/// Closed enumeration check.
pub fn requires_one_of(value: i64, allowed: &[i64]) -> WlcResult<i64> {
    if !allowed.contains(&value) {
        warn!(value, ?allowed, "not an accepted value");
        return Err(WlcError::Invalid("not an accepted value"));
    }
    Ok(value)
}
