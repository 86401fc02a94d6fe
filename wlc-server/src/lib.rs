//! # wlc-server
//!
//! Handlers for every private command, the dispatcher that routes command
//! text to them, the GSCAN vendor commands, and the TCP front end of `wlcd`.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod server;
pub mod stats;
pub mod validate;
pub mod vendor;

pub use config::DaemonConfig;
pub use dispatch::{dispatch, execute, CommandBuffer, Outcome, DEFAULT_CAPACITY};
pub use server::{serve, ServerState};
pub use stats::{CommandStats, StatsSnapshot};
pub use vendor::{vendor, VendorCommand, VendorReply};
