//! # MIB Codec Adapter
//!
//! Firmware settings are addressed by a PSID (parameter identifier) plus an
//! index and carried as length-prefixed binary records. Handlers never touch
//! the byte layout; they append typed values to a `MibBuffer` and hand the
//! finished bytes to the firmware transport.
//!
//! ## Design Principles
//!
//! 1. **Adapter Seam**: `MibCodec` is the only place that knows the record
//!    layout. `TlvCodec` is the in-tree implementation.
//! 2. **Poisoned On Failure**: once an encode call fails the buffer refuses
//!    to `finish`, so a partially built request can never be sent.
//! 3. **Owned Hand-Off**: `finish` returns frozen `Bytes`; ownership passes to
//!    the transport.
//!
//! ## Record Layout (`TlvCodec`)
//!
//! ```text
//! +-----------+-----------+-----------+--------+----------------+
//! | psid:u16  | len:u16   | index:u16 | tag:u8 | value:len bytes|
//! +-----------+-----------+-----------+--------+----------------+
//! little endian; tag 0 = int (i64), 1 = uint (u64), 2 = octets
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use wlc_common::{WlcError, WlcResult, EINVAL};

/// PSIDs addressed by the command handlers.
pub mod psid {
    pub const ROAMING_ENABLED: u16 = 0x0801;
    pub const RSSI_ROAM_SCAN_TRIGGER: u16 = 0x0802;
    pub const RSSI_ROAM_DELTA_TRIGGER: u16 = 0x0803;
    pub const FULL_ROAM_SCAN_PERIOD: u16 = 0x0805;
    pub const ROAM_SCAN_BAND: u16 = 0x0807;
    pub const ROAM_SCAN_MAX_ACTIVE_CHANNEL_TIME: u16 = 0x0809;
    pub const ROAM_MODE: u16 = 0x080C;
    pub const ROAM_OKC_ENABLE: u16 = 0x080D;
    pub const ROAM_SCAN_BACKGROUND_PERIOD: u16 = 0x080F;
    pub const ROAM_SCAN_CONTROL: u16 = 0x0813;
    pub const DFS_SCAN_MODE: u16 = 0x0814;
    pub const ROAM_SCAN_HOME_TIME: u16 = 0x0815;
    pub const ROAM_SCAN_HOME_AWAY_TIME: u16 = 0x0816;
    pub const ROAM_SCAN_NPROBE: u16 = 0x0818;
    pub const MLME_SCAN_CHANNEL_MAX_SCAN_TIME: u16 = 0x07D1;
    pub const MLME_SCAN_CHANNEL_PROBE_INTERVAL: u16 = 0x07D2;
    pub const DTIM_WAIT_TIMEOUT: u16 = 0x09E1;
    pub const LISTEN_INTERVAL_SKIPPING_DTIM: u16 = 0x09D6;
    pub const MAX_CLIENT: u16 = 0x09F6;
    pub const TDLS_ACTIVATED: u16 = 0x09FE;
    pub const USER_SET_TXPOWER_LEVEL: u16 = 0x1785;
    pub const SAR_BACKOFF: u16 = 0x178A;
    pub const DEFAULT_COUNTRY: u16 = 0x1F4D;
    pub const NO_CELL_MAX_POWER_CHANNELS: u16 = 0x1F52;

    // Vendor range.
    pub const ROAM_INTRA_BAND: u16 = 0x2101;
    pub const WES_MODE: u16 = 0x2102;
    pub const NCHO_MODE: u16 = 0x2103;
    pub const ROAM_SCAN_CHANNELS: u16 = 0x2104;
    pub const ROAM_BLACKLIST: u16 = 0x2105;
    pub const JOIN_PREFERENCE: u16 = 0x2106;
    pub const IGMP_OFFLOAD: u16 = 0x2107;
    pub const ELNA_BYPASS: u16 = 0x2108;
    pub const ELNA_BYPASS_INTERVAL: u16 = 0x2109;
    pub const TX_ANTENNA_CONFIG: u16 = 0x210A;
    pub const HE_ACTIVATED: u16 = 0x210B;
    pub const LATENCY_CRITICAL_DATA: u16 = 0x210C;
    pub const SUB6_BAND_POWER: u16 = 0x210D;
    pub const WTC_MODE: u16 = 0x210E;
    pub const ROAM_OFFLOAD_AP_LIST: u16 = 0x210F;
    pub const SCAN_PASSIVE_TIME: u16 = 0x2110;
    pub const ADPS_ENABLE: u16 = 0x2111;
    pub const TID_CONFIG: u16 = 0x2112;
    pub const DISCONNECT_IES: u16 = 0x2113;
    pub const PMK: u16 = 0x2114;
}

const TAG_INT: u8 = 0;
const TAG_UINT: u8 = 1;
const TAG_OCTETS: u8 = 2;

/// Header bytes preceding each value.
pub const RECORD_HEADER_LEN: usize = 7;

/// Longest octet string the codec accepts.
pub const MAX_OCTET_LEN: usize = 1024;

/// Typed MIB value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MibValue {
    Int(i64),
    Uint(u64),
    Octets(Vec<u8>),
}

impl MibValue {
    /// Integer view used by read commands.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MibValue::Int(v) => Some(*v),
            MibValue::Uint(v) => i64::try_from(*v).ok(),
            MibValue::Octets(_) => None,
        }
    }
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MibEntry {
    pub psid: u16,
    pub index: u16,
    pub value: MibValue,
}

/// Byte-level encoder/decoder for MIB records.
pub trait MibCodec: Send + Sync {
    fn encode_int(&self, buf: &mut BytesMut, psid: u16, value: i64, index: u16) -> WlcResult<()>;
    fn encode_uint(&self, buf: &mut BytesMut, psid: u16, value: u64, index: u16) -> WlcResult<()>;
    fn encode_octet(&self, buf: &mut BytesMut, psid: u16, data: &[u8], index: u16) -> WlcResult<()>;
    /// Decodes the record at the front of `data` and returns it with the
    /// number of bytes consumed.
    fn decode(&self, data: &[u8]) -> WlcResult<(MibEntry, usize)>;
}

/// Little-endian tag/length/value codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct TlvCodec;

impl TlvCodec {
    fn put_header(buf: &mut BytesMut, psid: u16, len: usize, index: u16, tag: u8) {
        buf.reserve(RECORD_HEADER_LEN + len);
        buf.put_u16_le(psid);
        buf.put_u16_le(len as u16);
        buf.put_u16_le(index);
        buf.put_u8(tag);
    }
}

impl MibCodec for TlvCodec {
    fn encode_int(&self, buf: &mut BytesMut, psid: u16, value: i64, index: u16) -> WlcResult<()> {
        Self::put_header(buf, psid, 8, index, TAG_INT);
        buf.put_i64_le(value);
        Ok(())
    }

    fn encode_uint(&self, buf: &mut BytesMut, psid: u16, value: u64, index: u16) -> WlcResult<()> {
        Self::put_header(buf, psid, 8, index, TAG_UINT);
        buf.put_u64_le(value);
        Ok(())
    }

    fn encode_octet(&self, buf: &mut BytesMut, psid: u16, data: &[u8], index: u16) -> WlcResult<()> {
        if data.is_empty() || data.len() > MAX_OCTET_LEN {
            return Err(WlcError::Transport(-EINVAL));
        }
        Self::put_header(buf, psid, data.len(), index, TAG_OCTETS);
        buf.put_slice(data);
        Ok(())
    }

    fn decode(&self, data: &[u8]) -> WlcResult<(MibEntry, usize)> {
        if data.len() < RECORD_HEADER_LEN {
            return Err(WlcError::Io);
        }
        let mut cursor = data;
        let psid = cursor.get_u16_le();
        let len = cursor.get_u16_le() as usize;
        let index = cursor.get_u16_le();
        let tag = cursor.get_u8();
        if cursor.remaining() < len {
            return Err(WlcError::Io);
        }

        let value = match (tag, len) {
            (TAG_INT, 8) => MibValue::Int(cursor.get_i64_le()),
            (TAG_UINT, 8) => MibValue::Uint(cursor.get_u64_le()),
            (TAG_OCTETS, _) => MibValue::Octets(cursor[..len].to_vec()),
            _ => return Err(WlcError::Io),
        };
        Ok((MibEntry { psid, index, value }, RECORD_HEADER_LEN + len))
    }
}

/// Accumulates records for one firmware request.
pub struct MibBuffer<'c> {
    codec: &'c dyn MibCodec,
    buf: BytesMut,
    records: usize,
    poisoned: Option<WlcError>,
}

impl<'c> MibBuffer<'c> {
    pub fn new(codec: &'c dyn MibCodec) -> Self {
        MibBuffer {
            codec,
            buf: BytesMut::new(),
            records: 0,
            poisoned: None,
        }
    }

    pub fn encode_int(&mut self, psid: u16, value: i64, index: u16) -> WlcResult<()> {
        self.record(|codec, buf| codec.encode_int(buf, psid, value, index))
    }

    pub fn encode_uint(&mut self, psid: u16, value: u64, index: u16) -> WlcResult<()> {
        self.record(|codec, buf| codec.encode_uint(buf, psid, value, index))
    }

    pub fn encode_octet(&mut self, psid: u16, data: &[u8], index: u16) -> WlcResult<()> {
        self.record(|codec, buf| codec.encode_octet(buf, psid, data, index))
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Freezes the buffer; fails if any encode failed or nothing was added.
    pub fn finish(self) -> WlcResult<Bytes> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        if self.records == 0 {
            return Err(WlcError::Invalid("empty mib request"));
        }
        Ok(self.buf.freeze())
    }

    fn record<F>(&mut self, encode: F) -> WlcResult<()>
    where
        F: FnOnce(&dyn MibCodec, &mut BytesMut) -> WlcResult<()>,
    {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        match encode(self.codec, &mut self.buf) {
            Ok(()) => {
                self.records += 1;
                Ok(())
            }
            Err(err) => {
                self.poisoned = Some(err);
                Err(err)
            }
        }
    }
}

/// Decodes every record in `data`.
pub fn decode_all(codec: &dyn MibCodec, mut data: &[u8]) -> WlcResult<Vec<MibEntry>> {
    let mut entries = Vec::new();
    while !data.is_empty() {
        let (entry, used) = codec.decode(data)?;
        entries.push(entry);
        data = &data[used..];
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_records() {
        let codec = TlvCodec;
        let mut mib = MibBuffer::new(&codec);
        mib.encode_int(psid::RSSI_ROAM_DELTA_TRIGGER, 11, 0).unwrap();
        mib.encode_octet(psid::DEFAULT_COUNTRY, b"GB", 0).unwrap();
        let bytes = mib.finish().unwrap();

        let entries = decode_all(&codec, &bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].psid, psid::RSSI_ROAM_DELTA_TRIGGER);
        assert_eq!(entries[0].value, MibValue::Int(11));
        assert_eq!(entries[1].value, MibValue::Octets(b"GB".to_vec()));
    }

    #[test]
    fn failed_encode_poisons_buffer() {
        let codec = TlvCodec;
        let mut mib = MibBuffer::new(&codec);
        mib.encode_int(psid::ROAM_MODE, 1, 0).unwrap();
        let big = vec![0u8; MAX_OCTET_LEN + 1];
        assert_eq!(
            mib.encode_octet(psid::JOIN_PREFERENCE, &big, 0),
            Err(WlcError::Transport(-EINVAL))
        );
        assert!(mib.encode_int(psid::ROAM_MODE, 0, 0).is_err());
        assert!(mib.finish().is_err());
    }

    #[test]
    fn empty_buffer_is_not_sendable() {
        let codec = TlvCodec;
        assert!(MibBuffer::new(&codec).finish().is_err());
    }

    #[test]
    fn truncated_record_fails_decode() {
        let codec = TlvCodec;
        assert_eq!(codec.decode(&[0x02, 0x08]), Err(WlcError::Io));
    }
}
