//! # wlcd
//!
//! Runs the private command dispatcher behind a TCP control socket, on a
//! loopback firmware that records MIB writes and answers reads with zero.
//!
//! ```text
//! wlcd [--config <path>] [--listen <addr>]
//! ```
//!
//! `RUST_LOG` selects the log filter; the default is `info`.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wlc_engine::{Device, EventLog, MockFirmware};
use wlc_server::{serve, DaemonConfig, ServerState};

struct Args {
    config: Option<PathBuf>,
    listen: Option<String>,
}

impl Args {
    fn from_env() -> anyhow::Result<Self> {
        let mut parsed = Args {
            config: None,
            listen: None,
        };
        let mut args = env::args().skip(1);
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--listen" => {
                    parsed.listen = Some(args.next().context("--listen needs an address")?);
                }
                other => bail!("unknown argument {other}"),
            }
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::from_env()?;
    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    let device = Device::new(
        config.device,
        Arc::new(MockFirmware::new()),
        Arc::new(EventLog::new()),
    );
    for vif in config.interfaces {
        info!(ifname = %vif.ifname, vif_type = ?vif.vif_type, "interface added");
        device.add_vif(vif);
    }

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("binding {}", config.server.listen))?;
    let state = Arc::new(ServerState::new(Arc::new(device), config.server.capacity));
    serve(listener, state).await?;
    Ok(())
}
