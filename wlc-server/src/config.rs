//! # Daemon Configuration
//!
//! `wlcd` reads a single JSON document; every section is optional.
//!
//! ```text
//! {
//!   "server":     { "listen": "127.0.0.1:7878", "capacity": 4096 },
//!   "device":     { ...DeviceConfig... },
//!   "interfaces": [ { "ifname": "wlan0", "mac": "00:12:fb:00:00:01" } ]
//! }
//! ```

use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use wlc_engine::{DeviceConfig, VifState};

use crate::dispatch::DEFAULT_CAPACITY;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:7878";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Reply buffer capacity per command.
    pub capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: DEFAULT_LISTEN.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub interfaces: Vec<VifState>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            server: ServerConfig::default(),
            device: DeviceConfig::default(),
            interfaces: vec![VifState::default()],
        }
    }
}

impl DaemonConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: DaemonConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn check(&self) -> anyhow::Result<()> {
        ensure!(self.server.capacity > 0, "server.capacity must be positive");
        ensure!(!self.interfaces.is_empty(), "at least one interface is required");
        for (i, vif) in self.interfaces.iter().enumerate() {
            ensure!(
                self.interfaces[..i].iter().all(|other| other.ifname != vif.ifname),
                "duplicate interface {}",
                vif.ifname
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlc_common::VifType;

    #[test]
    fn empty_document_is_stock_device() {
        let config = DaemonConfig::from_json("{}").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.server.capacity, 4096);
        assert_eq!(config.interfaces[0].ifname, "wlan0");
    }

    #[test]
    fn sections_override_defaults() {
        let config = DaemonConfig::from_json(
            r#"{
                "server": { "listen": "0.0.0.0:9000" },
                "device": { "ncho_mode": true, "supported_band": 1 },
                "interfaces": [
                    { "ifname": "wlan0", "mac": "00:12:fb:00:00:01" },
                    { "ifname": "swlan0", "vif_type": "ap", "activated": true }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.server.capacity, 4096);
        assert!(config.device.ncho_mode);
        assert_eq!(config.device.supported_band, 1);
        assert_eq!(config.interfaces[1].vif_type, VifType::Ap);
        assert!(config.interfaces[1].twt_allowed);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(DaemonConfig::from_json(r#"{ "server": { "capacity": 0 } }"#).is_err());
        assert!(DaemonConfig::from_json(r#"{ "interfaces": [] }"#).is_err());
        assert!(DaemonConfig::from_json(
            r#"{ "interfaces": [ { "ifname": "wlan0" }, { "ifname": "wlan0" } ] }"#
        )
        .is_err());
        assert!(DaemonConfig::from_json(r#"{ "interfaces": [ { "mac": "00:12" } ] }"#).is_err());
    }
}
