//! # Device
//!
//! The per-device aggregate: configuration store, interface table, GSCAN
//! state, and the firmware and event seams.
//!
//! ## Locking
//!
//! ```text
//! Device
//!   ├── vifs:   RwLock<HashMap<ifname, VifState>>   taken first
//!   ├── config: RwLock<DeviceConfig>                taken second
//!   └── gscan:  Mutex<Gscan>                        cache + buckets together
//! ```
//!
//! A command snapshots its interface, then holds the config write lock until
//! it completes. Indication paths (scan results, RSSI reports) never hold the
//! interface lock while they take the others.

use std::sync::Arc;

use ahash::RandomState;
use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use wlc_common::{MacAddr, WlcError, WlcResult};

use crate::config::DeviceConfig;
use crate::event::{EventSink, VendorEvent};
use crate::firmware::Firmware;
use crate::gscan::{
    self, Gscan, GscanCapabilities, GscanParams, InsertOutcome, ScanIndication, ScanResult, SessionId,
};
use crate::mib::{MibBuffer, MibCodec, MibValue, TlvCodec};
use crate::vif::VifState;

pub struct Device {
    vifs: RwLock<HashMap<String, VifState, RandomState>>,
    config: RwLock<DeviceConfig>,
    gscan: Mutex<Gscan>,
    firmware: Arc<dyn Firmware>,
    events: Arc<dyn EventSink>,
    codec: Box<dyn MibCodec>,
}

impl Device {
    pub fn new(config: DeviceConfig, firmware: Arc<dyn Firmware>, events: Arc<dyn EventSink>) -> Self {
        Device {
            vifs: RwLock::new(HashMap::with_hasher(RandomState::new())),
            config: RwLock::new(config),
            gscan: Mutex::new(Gscan::new()),
            firmware,
            events,
            codec: Box::new(TlvCodec),
        }
    }

    /// Replaces the MIB codec.
    pub fn with_codec(mut self, codec: Box<dyn MibCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Registers or replaces an interface.
    pub fn add_vif(&self, vif: VifState) {
        debug!(ifname = %vif.ifname, vif_type = %vif.vif_type, "interface added");
        self.vifs.write().insert(vif.ifname.clone(), vif);
    }

    pub fn remove_vif(&self, ifname: &str) -> Option<VifState> {
        self.vifs.write().remove(ifname)
    }

    /// Snapshot of one interface.
    pub fn vif(&self, ifname: &str) -> Option<VifState> {
        self.vifs.read().get(ifname).cloned()
    }

    /// Applies a connection-management change to an interface.
    pub fn update_vif<F>(&self, ifname: &str, update: F) -> WlcResult<()>
    where
        F: FnOnce(&mut VifState),
    {
        let mut vifs = self.vifs.write();
        let vif = vifs.get_mut(ifname).ok_or(WlcError::NoDevice)?;
        update(vif);
        Ok(())
    }

    pub fn any_vif_activated(&self) -> bool {
        self.vifs.read().values().any(|vif| vif.activated)
    }

    pub fn ifnames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vifs.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn config(&self) -> RwLockReadGuard<'_, DeviceConfig> {
        self.config.read()
    }

    pub fn config_mut(&self) -> RwLockWriteGuard<'_, DeviceConfig> {
        self.config.write()
    }

    pub fn gscan(&self) -> MutexGuard<'_, Gscan> {
        self.gscan.lock()
    }

    fn requires_gscan(&self) -> WlcResult<()> {
        if self.config.read().gscan_enabled {
            Ok(())
        } else {
            Err(WlcError::NotSupported)
        }
    }

    /// GSCAN limits, or `NotSupported` while GSCAN is disabled.
    pub fn gscan_capabilities(&self) -> WlcResult<GscanCapabilities> {
        gscan::capabilities(&self.config.read())
    }

    /// Starts a GSCAN session on `ifname`.
    pub fn gscan_add(&self, ifname: &str, params: &GscanParams) -> WlcResult<SessionId> {
        self.requires_gscan()?;
        self.gscan.lock().add(params, self.firmware.as_ref(), ifname)
    }

    /// Stops every GSCAN session.
    pub fn gscan_del(&self, ifname: &str) -> WlcResult<()> {
        self.requires_gscan()?;
        self.gscan.lock().del(self.firmware.as_ref(), ifname);
        Ok(())
    }

    /// Drains up to `max` cached results, newest first.
    pub fn gscan_results(&self, max: usize) -> WlcResult<Vec<ScanResult>> {
        self.requires_gscan()?;
        Ok(self.gscan.lock().get_scan_results(max))
    }

    pub fn firmware(&self) -> &dyn Firmware {
        self.firmware.as_ref()
    }

    pub fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Empty request buffer bound to the device codec.
    pub fn mib_buffer(&self) -> MibBuffer<'_> {
        MibBuffer::new(self.codec.as_ref())
    }

    /// Sends a finished MIB buffer to the firmware.
    pub fn send_mib(&self, ifname: &str, mib: MibBuffer<'_>) -> WlcResult<()> {
        let records = mib.finish()?;
        self.firmware.mib_set(ifname, records)
    }

    /// Encodes and sends a single integer setting.
    pub fn set_mib_int(&self, ifname: &str, psid: u16, value: i64) -> WlcResult<()> {
        let mut mib = self.mib_buffer();
        mib.encode_int(psid, value, 0)?;
        self.send_mib(ifname, mib)
    }

    /// Encodes and sends a single octet-string setting.
    pub fn set_mib_octets(&self, ifname: &str, psid: u16, data: &[u8]) -> WlcResult<()> {
        let mut mib = self.mib_buffer();
        mib.encode_octet(psid, data, 0)?;
        self.send_mib(ifname, mib)
    }

    /// Reads an integer setting from the firmware.
    pub fn read_mib_int(&self, ifname: &str, psid: u16) -> WlcResult<i64> {
        match self.firmware.mib_get(ifname, psid, 0)? {
            MibValue::Octets(_) => Err(WlcError::Io),
            value => value.as_i64().ok_or(WlcError::Io),
        }
    }

    /// Scan indication intake.
    pub fn on_scan_indication(&self, scan_id: u16, indication: ScanIndication) -> Option<InsertOutcome> {
        self.gscan
            .lock()
            .handle_scan_result(scan_id, indication, self.events.as_ref())
    }

    /// RSSI intake; reports when the value leaves the monitored window.
    ///
    /// Returns true if an event was raised.
    pub fn on_rssi(&self, ifname: &str, rssi: i16) -> bool {
        let Some(bssid) = self.vif(ifname).and_then(|vif| vif.bssid) else {
            return false;
        };
        let Some(window) = self.config.read().station.rssi_monitor else {
            return false;
        };
        if window.contains(rssi) {
            return false;
        }
        self.events.emit(VendorEvent::RssiReport { bssid, rssi });
        true
    }

    /// Raises a forced-recovery event.
    pub fn force_hang(&self, reason: u16) {
        self.events.emit(VendorEvent::Hang { reason });
    }

    /// BSSID the given interface is connected to.
    pub fn peer_of(&self, ifname: &str) -> Option<MacAddr> {
        self.vifs.read().get(ifname).and_then(|vif| vif.bssid)
    }
}
