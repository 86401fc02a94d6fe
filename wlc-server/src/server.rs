//! # Control Socket
//!
//! Line-oriented TCP front end for the dispatcher. Each request line names
//! the interface and carries the private command text; each response line
//! carries the status and, when a read command produced one, the reply
//! text. `VENDOR` lines carry the GSCAN commands of `crate::vendor`.
//!
//! ```text
//! -> wlan0 SETROAMDELTA 11\n
//! <- 0\n
//! -> wlan0 GETROAMDELTA\n
//! <- 14 GETROAMDELTA 0\n
//! -> wlan0 GET_TWT_CAP\n
//! <- 3\n
//! -> STATS\n
//! <- 0 {"commands_total":2,...}\n
//! ```
//!
//! A line longer than `MAX_LINE` closes the connection after an error
//! response.

use std::sync::Arc;
use std::time::Instant;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use wlc_common::{PrivCommand, EINVAL};
use wlc_engine::Device;

use crate::dispatch::{execute, CommandBuffer};
use crate::stats::CommandStats;
use crate::vendor::vendor;

/// Longest accepted request line, newline excluded.
pub const MAX_LINE: usize = 8 * 1024;

/// Shared state of every connection.
pub struct ServerState {
    pub device: Arc<Device>,
    pub stats: CommandStats,
    /// Reply capacity of each command buffer.
    pub capacity: usize,
}

impl ServerState {
    pub fn new(device: Arc<Device>, capacity: usize) -> Self {
        ServerState {
            device,
            stats: CommandStats::new(),
            capacity,
        }
    }
}

/// Accepts connections until the listener fails.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr().ok(), "control socket listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            debug!(%peer, "client connected");
            if let Err(err) = handle_connection(stream, state).await {
                warn!(%peer, %err, "connection closed with error");
            }
        });
    }
}

/// Handles a single client connection.
pub async fn handle_connection(mut stream: TcpStream, state: Arc<ServerState>) -> std::io::Result<()> {
    let mut buffer = BytesMut::with_capacity(8 * 1024);

    loop {
        let bytes = stream.read_buf(&mut buffer).await?;
        if bytes == 0 {
            break;
        }

        while let Some(end) = buffer.iter().position(|&b| b == b'\n') {
            let line = buffer.split_to(end);
            buffer.advance(1);
            let response = handle_line(&line, &state);
            stream.write_all(&response).await?;
        }

        if buffer.len() > MAX_LINE {
            stream.write_all(&status_line(-EINVAL, "line too long")).await?;
            return Ok(());
        }
    }

    Ok(())
}

/// Answers one request line.
pub fn handle_line(line: &[u8], state: &ServerState) -> Vec<u8> {
    let Ok(line) = std::str::from_utf8(line) else {
        return status_line(-EINVAL, "");
    };
    let line = line.trim_end_matches('\r');

    if line.trim() == "STATS" {
        return match serde_json::to_string(&state.stats.snapshot()) {
            Ok(json) => status_line(0, &json),
            Err(_) => status_line(-EINVAL, ""),
        };
    }

    let Some((ifname, command)) = line.trim_start().split_once(' ') else {
        return status_line(-EINVAL, "");
    };

    if let Some(text) = command.strip_prefix("VENDOR ") {
        let reply = vendor(&state.device, ifname, text);
        return status_line(reply.status, reply.body.as_deref().unwrap_or(""));
    }

    let started = Instant::now();
    state.stats.record_start();

    let cmd = command.split(' ').next().and_then(PrivCommand::from_name);
    let mut buf = CommandBuffer::with_command(command, state.capacity);
    let outcome = execute(&state.device, ifname, &mut buf);
    state.stats.record_end(cmd, outcome, started.elapsed());

    status_line(outcome.code(), if outcome.is_reply() { buf.as_str() } else { "" })
}

/// `"<status>\n"` or `"<status> <payload>\n"`.
fn status_line(status: i32, payload: &str) -> Vec<u8> {
    let mut out = status.to_string().into_bytes();
    if !payload.is_empty() {
        out.push(b' ');
        out.extend_from_slice(payload.as_bytes());
    }
    out.push(b'\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlc_common::MacAddr;
    use wlc_engine::{DeviceConfig, EventLog, MockFirmware, VifState};

    fn state() -> ServerState {
        let device = Device::new(
            DeviceConfig::default(),
            Arc::new(MockFirmware::new()),
            Arc::new(EventLog::new()),
        );
        device.add_vif(VifState::station("wlan0", MacAddr::ZERO));
        ServerState::new(Arc::new(device), 4096)
    }

    #[test]
    fn line_format() {
        let state = state();
        assert_eq!(handle_line(b"wlan0 SETNCHOMODE 1", &state), b"0\n");
        assert_eq!(handle_line(b"wlan0 GETNCHOMODE\r", &state), b"13 GETNCHOMODE 1\n");
        assert_eq!(handle_line(b"wlan0 SETROAMDELTA 101", &state), b"-22\n");
        assert_eq!(handle_line(b"wlan9 GETNCHOMODE", &state), b"-19\n");
        assert_eq!(handle_line(b"GETNCHOMODE", &state), b"-22\n");
    }

    #[test]
    fn vendor_status_carries_no_payload() {
        let state = state();
        state
            .device
            .update_vif("wlan0", |vif| vif.twt_allowed = false)
            .unwrap();
        assert_eq!(handle_line(b"wlan0 GET_TWT_CAP", &state), b"3\n");
        assert_eq!(handle_line(b"wlan0 GET_TWT_STATUS", &state), b"3\n");
        assert_eq!(handle_line(b"wlan0 GET_TWT_STATISTICS 1", &state), b"3\n");
    }

    #[test]
    fn vendor_lines_reach_gscan() {
        let state = state();
        let caps = String::from_utf8(handle_line(b"wlan0 VENDOR GSCAN_GET_CAPABILITIES", &state)).unwrap();
        assert!(caps.starts_with("0 {"), "{caps}");
        assert_eq!(handle_line(b"wlan0 VENDOR GSCAN_DEL", &state), b"0\n");

        state.device.config_mut().gscan_enabled = false;
        assert_eq!(handle_line(b"wlan0 VENDOR GSCAN_GET_CAPABILITIES", &state), b"-95\n");
        assert_eq!(handle_line(b"wlan0 VENDOR GSCAN_GET_RESULTS", &state), b"-95\n");
    }

    #[test]
    fn stats_line_is_json() {
        let state = state();
        handle_line(b"wlan0 BOGUS", &state);
        let response = String::from_utf8(handle_line(b"STATS", &state)).unwrap();
        let json = response.strip_prefix("0 ").unwrap();
        let value: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();
        assert_eq!(value["commands_total"], 1);
        assert_eq!(value["unknown_total"], 1);
    }
}
