//! # Command Dispatcher
//!
//! Entry point for one private command: resolve the name, bind the
//! interface, run the handler under the device lock and turn the outcome
//! into the signed integer the caller sees.
//!
//! ## Design Principles
//!
//! 1. **Closed Name Set**: Names resolve through `PrivCommand::from_name`;
//!    anything else is `-EINVAL` before any state is read.
//! 2. **One Lock Per Command**: The configuration write lock is held from
//!    the first validator to the last store write, so concurrent commands
//!    never interleave.
//! 3. **Buffer Reuse**: The command text is copied out before the handler
//!    runs; read commands then overwrite the same buffer with their reply.
//!
//! ```text
//! "SETROAMDELTA 11" ──> PrivCommand::SetRoamDelta ──> ncho::write(ROAM_DELTA) ──> 0
//! "GETROAMDELTA"    ──> PrivCommand::GetRoamDelta ──> ncho::read(ROAM_DELTA)  ──> 14, buf = "GETROAMDELTA 0"
//! ```

use tracing::{debug, error, warn};

use wlc_common::{status_of, CommandArgs, PrivCommand, WlcError, WlcResult};
use wlc_engine::Device;

use crate::handlers::{ap, legacy, ncho, p2p, power, regulatory, station, twt};
use crate::handlers::{CommandContext, Reply};

/// Default reply capacity of a command buffer.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Caller-owned buffer: holds the command on entry and the reply of a read
/// command on return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl CommandBuffer {
    pub fn new(capacity: usize) -> Self {
        CommandBuffer {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Buffer preloaded with `text`, truncated to `capacity`.
    pub fn with_command(text: &str, capacity: usize) -> Self {
        let mut buf = Self::new(capacity);
        buf.set_command(text);
        buf
    }

    pub fn set_command(&mut self, text: &str) {
        let len = text.len().min(self.capacity);
        self.data.clear();
        self.data.extend_from_slice(&text.as_bytes()[..len]);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Buffer contents as text; empty if they are not UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.data).unwrap_or("")
    }

    /// Replaces the contents with `text`, truncated to capacity.
    fn write_reply(&mut self, text: &str) -> usize {
        self.set_command(text);
        self.data.len()
    }
}

/// How a dispatched command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A read command wrote this many reply bytes into the buffer.
    Replied(usize),
    /// Plain status; the buffer still holds the command.
    Status(i32),
}

impl Outcome {
    /// Signed status seen by the ioctl caller.
    pub fn code(self) -> i32 {
        match self {
            Outcome::Replied(len) => status_of(Ok(len)),
            Outcome::Status(code) => code,
        }
    }

    pub fn is_reply(self) -> bool {
        matches!(self, Outcome::Replied(_))
    }
}

/// Runs the command held in `buf` against interface `ifname`.
///
/// Returns 0 for a successful write, the reply length for a successful
/// read, and a negative errno or positive vendor status on failure.
pub fn dispatch(device: &Device, ifname: &str, buf: &mut CommandBuffer) -> i32 {
    execute(device, ifname, buf).code()
}

/// Like [`dispatch`], but keeps a reply apart from a positive status.
pub fn execute(device: &Device, ifname: &str, buf: &mut CommandBuffer) -> Outcome {
    let text = buf.as_bytes().to_vec();
    let mut args = match CommandArgs::from_bytes(&text) {
        Ok(args) => args,
        Err(err) => return Outcome::Status(err.code()),
    };

    let Some(cmd) = PrivCommand::from_name(args.name()) else {
        warn!(ifname, name = args.name(), "unknown private command");
        return Outcome::Status(WlcError::Invalid("unknown command").code());
    };
    let Some(vif) = device.vif(ifname) else {
        warn!(ifname, cmd = %cmd, "no such interface");
        return Outcome::Status(WlcError::NoDevice.code());
    };

    let result = {
        let mut config = device.config_mut();
        let mut ctx = CommandContext::new(device, &vif, &mut config);
        run(cmd, &mut ctx, &mut args)
    };

    match result {
        Ok(Reply::Done) => {
            debug!(ifname, cmd = %cmd, family = cmd.family().name(), "command accepted");
            Outcome::Status(0)
        }
        Ok(Reply::Status(code)) => {
            debug!(ifname, cmd = %cmd, code, "command accepted with status");
            Outcome::Status(code)
        }
        Ok(Reply::Text(text)) => {
            debug!(ifname, cmd = %cmd, family = cmd.family().name(), "command accepted");
            Outcome::Replied(buf.write_reply(&text))
        }
        Err(err @ (WlcError::Io | WlcError::Transport(_))) => {
            error!(ifname, cmd = %cmd, code = err.code(), "firmware rejected command");
            Outcome::Status(err.code())
        }
        Err(err) => {
            warn!(ifname, cmd = %cmd, code = err.code(), %err, "command rejected");
            Outcome::Status(err.code())
        }
    }
}

fn run(cmd: PrivCommand, ctx: &mut CommandContext<'_>, args: &mut CommandArgs<'_>) -> WlcResult<Reply> {
    use PrivCommand as C;

    match cmd {
        C::SetSuspendMode => power::set_suspend_mode(ctx, args),
        C::MaxDtimInSuspend => power::max_dtim_in_suspend(ctx, args),
        C::SetDtimInSuspend => power::set_dtim_in_suspend(ctx, args),
        C::SetTxPowerCalling => power::set_tx_power_calling(ctx, args),
        C::SetTxPowerSub6Band => power::set_tx_power_sub6_band(ctx, args),
        C::ElnaBypass => power::elna_bypass(ctx, args),
        C::ElnaBypassInt => power::elna_bypass_int(ctx, args),
        C::SetLatencyCrtData => power::set_latency_crt_data(ctx, args),
        C::PowerMeasurementStart => power::power_measurement_start(ctx, args),
        C::AdpsEnable => power::adps_enable(ctx, args),

        C::P2pSetPs => p2p::set_p2p_oppps(ctx, args),
        C::P2pSetNoa => p2p::set_noa_params(ctx, args),
        C::P2pEcsa => p2p::ecsa(ctx, args),
        C::P2pLoStart => p2p::listen_offload_start(ctx, args),
        C::P2pLoStop => p2p::listen_offload_stop(ctx, args),

        C::SetNchoMode => ncho::set_ncho_mode(ctx, args),
        C::GetNchoMode => ncho::get_ncho_mode(ctx, args),
        C::SetRoamTrigger => ncho::write(ctx, args, &ncho::ROAM_TRIGGER),
        C::GetRoamTrigger => ncho::read(ctx, args, &ncho::ROAM_TRIGGER),
        C::SetRoamDelta => ncho::write(ctx, args, &ncho::ROAM_DELTA),
        C::GetRoamDelta => ncho::read(ctx, args, &ncho::ROAM_DELTA),
        C::SetRoamScanPeriod => ncho::write(ctx, args, &ncho::ROAM_SCAN_PERIOD),
        C::GetRoamScanPeriod => ncho::read(ctx, args, &ncho::ROAM_SCAN_PERIOD),
        C::SetFullRoamScanPeriod => ncho::write(ctx, args, &ncho::FULL_ROAM_SCAN_PERIOD),
        C::GetFullRoamScanPeriod => ncho::read(ctx, args, &ncho::FULL_ROAM_SCAN_PERIOD),
        C::SetScanChannelTime => ncho::write(ctx, args, &ncho::SCAN_CHANNEL_TIME),
        C::GetScanChannelTime => ncho::read(ctx, args, &ncho::SCAN_CHANNEL_TIME),
        C::SetScanHomeTime => ncho::write(ctx, args, &ncho::SCAN_HOME_TIME),
        C::GetScanHomeTime => ncho::read(ctx, args, &ncho::SCAN_HOME_TIME),
        C::SetScanHomeAwayTime => ncho::write(ctx, args, &ncho::SCAN_HOME_AWAY_TIME),
        C::GetScanHomeAwayTime => ncho::read(ctx, args, &ncho::SCAN_HOME_AWAY_TIME),
        C::SetScanNProbes => ncho::write(ctx, args, &ncho::SCAN_NPROBES),
        C::GetScanNProbes => ncho::read(ctx, args, &ncho::SCAN_NPROBES),
        C::SetRoamMode => ncho::write(ctx, args, &ncho::ROAM_MODE),
        C::GetRoamMode => ncho::read(ctx, args, &ncho::ROAM_MODE),
        C::SetRoamIntraBand => ncho::write(ctx, args, &ncho::ROAM_INTRA_BAND),
        C::GetRoamIntraBand => ncho::read(ctx, args, &ncho::ROAM_INTRA_BAND),
        C::SetRoamScanControl => ncho::write(ctx, args, &ncho::ROAM_SCAN_CONTROL),
        C::GetRoamScanControl => ncho::read(ctx, args, &ncho::ROAM_SCAN_CONTROL),
        C::SetOkcMode => ncho::write(ctx, args, &ncho::OKC_MODE),
        C::GetOkcMode => ncho::read(ctx, args, &ncho::OKC_MODE),
        C::SetDfsScanMode => ncho::write(ctx, args, &ncho::DFS_SCAN_MODE),
        C::GetDfsScanMode => ncho::read(ctx, args, &ncho::DFS_SCAN_MODE),
        C::SetWesMode => ncho::write(ctx, args, &ncho::WES_MODE),
        C::GetWesMode => ncho::read(ctx, args, &ncho::WES_MODE),
        C::SetRoamScanFrequencies => ncho::set_roam_scan_frequencies(ctx, args),
        C::GetRoamScanFrequencies => ncho::get_roam_scan_frequencies(ctx, args),
        C::AddRoamScanFrequencies => ncho::add_roam_scan_frequencies(ctx, args),
        C::SetRoamScanChannels => ncho::set_roam_scan_channels(ctx, args),
        C::GetRoamScanChannels => ncho::get_roam_scan_channels(ctx, args),
        C::AddRoamScanChannels => ncho::add_roam_scan_channels(ctx, args),
        C::SetRoamBand => ncho::set_roam_band(ctx, args),
        C::GetRoamBand => ncho::get_roam_band(ctx, args),
        C::SetBand => ncho::set_band(ctx, args),
        C::GetBand => ncho::get_band(ctx, args),
        C::Reassoc => ncho::reassoc(ctx, args),

        C::SetRoamTriggerLegacy => legacy::set_roam_trigger(ctx, args),
        C::GetRoamTriggerLegacy => legacy::get_roam_trigger(ctx, args),
        C::AddRoamScanFrequenciesLegacy => legacy::add_roam_scan_frequencies(ctx, args),
        C::GetRoamScanFrequenciesLegacy => legacy::get_roam_scan_frequencies(ctx, args),
        C::AddRoamScanChannelsLegacy => legacy::add_roam_scan_channels(ctx, args),
        C::GetRoamScanChannelsLegacy => legacy::get_roam_scan_channels(ctx, args),
        C::SetScanHomeTimeLegacy => legacy::set_scan_home_time(ctx, args),
        C::SetScanHomeAwayTimeLegacy => legacy::set_scan_home_away_time(ctx, args),
        C::SetScanChannelTimeLegacy => legacy::set_scan_channel_time(ctx, args),
        C::SetScanPassiveTimeLegacy => legacy::set_scan_passive_time(ctx, args),
        C::ReassocLegacy => legacy::reassoc(ctx, args),
        C::ReassocFrequencyLegacy => legacy::reassoc_frequency(ctx, args),
        C::SetRoamOffloadApList => legacy::set_roam_offload_ap_list(ctx, args),
        C::SetWtcMode => legacy::set_wtc_mode(ctx, args),

        C::Country => regulatory::country(ctx, args),
        C::SetCountryRev => regulatory::set_country_rev(ctx, args),
        C::GetCountryRev => regulatory::get_country_rev(ctx, args),
        C::GetRegulatory => regulatory::get_regulatory(ctx, args),
        C::SetFccChannel => regulatory::set_fcc_channel(ctx, args),
        C::FactorySetBand => regulatory::factory_set_band(ctx, args),

        C::HapdMaxNumSta => ap::hapd_max_num_sta(ctx, args),
        C::HapdSetAxMode => ap::hapd_set_ax_mode(ctx, args),
        C::SetSapChannelList => ap::set_sap_channel_list(ctx, args),
        C::SetBssChannelWidth => ap::set_bss_channel_width(ctx, args),

        C::SetTxAntConfig => station::set_tx_ant_config(ctx, args),
        C::SetPmk => station::set_pmk(ctx, args),
        C::SendActionFrame => station::send_action_frame(ctx, args),
        C::RoamingBlacklistAdd => station::roaming_blacklist_add(ctx, args),
        C::RoamingBlacklistRemove => station::roaming_blacklist_remove(ctx, args),
        C::ForceRoamingBssid => station::force_roaming_bssid(ctx, args),
        C::RxFilterAdd => station::rx_filter_add(ctx, args),
        C::RxFilterRemove => station::rx_filter_remove(ctx, args),
        C::RxFilterStart => station::rx_filter_start(ctx, args),
        C::RxFilterStop => station::rx_filter_stop(ctx, args),
        C::FakeMac => station::fake_mac(ctx, args),
        C::SetTid => station::set_tid(ctx, args),
        C::SetDwellTime => station::set_dwell_time(ctx, args),
        C::SetGracePeriod => station::set_grace_period(ctx, args),
        C::SetDisconnectIes => station::set_disconnect_ies(ctx, args),
        C::SetJoinPrefer => station::set_join_prefer(ctx, args),
        C::SetTdlsEnabled => station::set_tdls_enabled(ctx, args),
        C::SetRssiMonitor => station::set_rssi_monitor(ctx, args),
        C::TestForceHang => station::test_force_hang(ctx, args),

        C::TwtSetup => twt::twt_setup(ctx, args),
        C::TwtTeardown => twt::twt_teardown(ctx, args),
        C::TwtInfoFrame => twt::twt_info_frame(ctx, args),
        C::GetTwtStatus => twt::get_twt_status(ctx, args),
        C::GetTwtCap => twt::get_twt_cap(ctx, args),
        C::GetTwtStatistics => twt::get_twt_statistics(ctx, args),
        C::ClearTwtStatistics => twt::clear_twt_statistics(ctx, args),
    }
}
