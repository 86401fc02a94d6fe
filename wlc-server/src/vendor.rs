//! # Vendor GSCAN Commands
//!
//! Background scan control for hosts that speak the vendor command set
//! instead of private command text. Requests and results are JSON.
//!
//! ```text
//! -> wlan0 VENDOR GSCAN_GET_CAPABILITIES
//! <- 0 {"max_scan_cache_size":12000,...}
//! -> wlan0 VENDOR GSCAN_ADD {"max_ap_per_scan":8,"buckets":[{"band":"abg"}]}
//! <- 0 1
//! -> wlan0 VENDOR GSCAN_GET_RESULTS 16
//! <- 0 [{"bssid":"00:12:fb:00:00:01",...}]
//! -> wlan0 VENDOR GSCAN_DEL
//! <- 0
//! ```
//!
//! Every command answers `-EOPNOTSUPP` while GSCAN is disabled in the
//! device configuration.

use serde::Serialize;
use tracing::{debug, warn};

use wlc_common::{parse_int, WlcError, WlcResult};
use wlc_engine::{Device, GscanParams};

/// Vendor subcommands carried on a `VENDOR` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorCommand {
    GscanGetCapabilities,
    GscanAdd,
    GscanDel,
    GscanGetResults,
}

impl VendorCommand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GSCAN_GET_CAPABILITIES" => Some(VendorCommand::GscanGetCapabilities),
            "GSCAN_ADD" => Some(VendorCommand::GscanAdd),
            "GSCAN_DEL" => Some(VendorCommand::GscanDel),
            "GSCAN_GET_RESULTS" => Some(VendorCommand::GscanGetResults),
            _ => None,
        }
    }
}

/// Status and optional JSON body of one vendor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorReply {
    pub status: i32,
    pub body: Option<String>,
}

/// Runs `text` (`"<SUBCOMMAND> [argument]"`) against interface `ifname`.
pub fn vendor(device: &Device, ifname: &str, text: &str) -> VendorReply {
    match run(device, ifname, text.trim()) {
        Ok(body) => {
            debug!(ifname, text, "vendor command accepted");
            VendorReply { status: 0, body }
        }
        Err(err) => {
            warn!(ifname, text, code = err.code(), %err, "vendor command rejected");
            VendorReply {
                status: err.code(),
                body: None,
            }
        }
    }
}

fn run(device: &Device, ifname: &str, text: &str) -> WlcResult<Option<String>> {
    let (name, arg) = match text.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (text, ""),
    };
    let cmd = VendorCommand::from_name(name).ok_or(WlcError::Invalid("unknown vendor command"))?;
    if device.vif(ifname).is_none() {
        return Err(WlcError::NoDevice);
    }

    match cmd {
        VendorCommand::GscanGetCapabilities => json(&device.gscan_capabilities()?).map(Some),
        VendorCommand::GscanAdd => {
            let params: GscanParams =
                serde_json::from_str(arg).map_err(|_| WlcError::Invalid("gscan parameters"))?;
            let id = device.gscan_add(ifname, &params)?;
            Ok(Some(id.0.to_string()))
        }
        VendorCommand::GscanDel => {
            device.gscan_del(ifname)?;
            Ok(None)
        }
        VendorCommand::GscanGetResults => {
            let max = if arg.is_empty() {
                usize::MAX
            } else {
                let value = parse_int(arg)?;
                usize::try_from(value).map_err(|_| WlcError::Invalid("result count"))?
            };
            json(&device.gscan_results(max)?).map(Some)
        }
    }
}

fn json<T: Serialize>(value: &T) -> WlcResult<String> {
    serde_json::to_string(value).map_err(|_| WlcError::NoMemory)
}
