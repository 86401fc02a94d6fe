//! # wlc-engine
//!
//! Device state behind the private command surface: the configuration
//! store, interface state, the MIB adapter, the firmware and event seams,
//! and the GSCAN cache and bucket scheduler.

pub mod config;
pub mod device;
pub mod event;
pub mod firmware;
pub mod gscan;
pub mod mib;
pub mod vif;

pub use config::DeviceConfig;
pub use device::Device;
pub use event::{EventLog, EventSink, ScanEventType, VendorEvent};
pub use firmware::{Firmware, FirmwareReply, FirmwareRequest, MockFirmware, TwtSetupParams};
pub use gscan::{
    Gscan, GscanCapabilities, GscanParams, InsertOutcome, ScanIndication, ScanResult, SessionId,
};
pub use mib::{MibBuffer, MibCodec, MibValue, TlvCodec};
pub use vif::VifState;
