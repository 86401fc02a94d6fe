//! # Command Handlers
//!
//! One function per private command, grouped by family. Every handler has
//! the same shape:
//!
//! ```text
//! parse tokens ──> validators ──> MIB / firmware request ──> store write
//!      │                │                   │
//!      └── E            └── E / P / IO      └── error propagates, store untouched
//! ```
//!
//! ## Design Principles
//!
//! 1. **Parse First**: All tokens a handler needs are converted before any
//!    state is consulted, so a malformed token reports `-EINVAL` no matter
//!    what the device state is.
//! 2. **Validate, Then Mutate**: The configuration store is written last,
//!    after the firmware accepted the request.
//! 3. **Snapshot Of The Interface**: Handlers see a copy of the interface
//!    taken at dispatch time; they never change it.

use std::fmt::{self, Write as _};

use wlc_common::{PrivCommand, WlcResult};
use wlc_engine::{Device, DeviceConfig, VifState};

pub mod ap;
pub mod legacy;
pub mod ncho;
pub mod p2p;
pub mod power;
pub mod regulatory;
pub mod station;
pub mod twt;

/// Everything a handler may touch for one command.
pub struct CommandContext<'a> {
    pub device: &'a Device,
    pub vif: &'a VifState,
    pub config: &'a mut DeviceConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(device: &'a Device, vif: &'a VifState, config: &'a mut DeviceConfig) -> Self {
        CommandContext {
            device,
            vif,
            config,
        }
    }

    pub fn ifname(&self) -> &str {
        &self.vif.ifname
    }
}

/// Outcome of a successful handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Write commands: status 0, buffer untouched.
    Done,
    /// Read commands: the text written back to the caller.
    Text(String),
    /// Accepted with a positive status and no reply text.
    Status(i32),
}

/// `"<NAME> <value>"`
pub(crate) fn read_reply(cmd: PrivCommand, value: impl fmt::Display) -> Reply {
    Reply::Text(format!("{} {}", cmd.name(), value))
}

/// `"<NAME> <count> <v1> .. <vn>"`
pub(crate) fn list_reply(cmd: PrivCommand, values: &[u16]) -> Reply {
    let mut text = format!("{} {}", cmd.name(), values.len());
    for value in values {
        let _ = write!(text, " {}", value);
    }
    Reply::Text(text)
}
