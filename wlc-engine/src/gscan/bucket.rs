//! # Bucket Table
//!
//! A fixed array of scan buckets. A used slot carries the band or channel
//! group, the report policy and the owning session.
//!
//! ## Design Principles
//! 1. **Index Is Identity**: The scan id the firmware sees is
//!    `SCAN_ID_START + index`, unique among used slots.
//! 2. **All Or Nothing**: `allocate` claims every requested slot or none.

use serde::{Deserialize, Serialize};

use wlc_common::{WifiBand, WlcError, WlcResult};

pub const MAX_BUCKETS: usize = 8;

/// Scan id of bucket 0.
pub const SCAN_ID_START: u16 = 0xf010;

/// `report_events` bits.
pub const REPORT_EACH_SCAN: u8 = 0x1;
pub const REPORT_FULL_RESULTS: u8 = 0x2;
pub const REPORT_NO_BATCH: u8 = 0x4;

/// Highest `report_events` value a bucket may request.
pub const MAX_REPORT_EVENTS: u8 = 4;

/// Handle of a GSCAN session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub u32);

/// Host-supplied description of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketSpec {
    pub band: WifiBand,
    pub channels: Vec<u16>,
    pub period_ms: u32,
    pub report_events: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub spec: BucketSpec,
    pub session: SessionId,
    /// Completed scans; results from the same cycle dedupe on RSSI.
    pub scan_cycle: u32,
}

impl Bucket {
    pub fn reports(&self, bit: u8) -> bool {
        self.spec.report_events & bit != 0
    }
}

#[derive(Debug)]
pub struct BucketTable {
    slots: Vec<Option<Bucket>>,
}

impl Default for BucketTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketTable {
    pub fn new() -> Self {
        BucketTable {
            slots: vec![None; MAX_BUCKETS],
        }
    }

    pub fn scan_id(index: usize) -> u16 {
        SCAN_ID_START + index as u16
    }

    /// Slot index of `scan_id`, if it falls inside the table.
    pub fn index_of(scan_id: u16) -> Option<usize> {
        let index = usize::from(scan_id.checked_sub(SCAN_ID_START)?);
        (index < MAX_BUCKETS).then_some(index)
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn used_count(&self) -> usize {
        MAX_BUCKETS - self.free_count()
    }

    pub fn is_used(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bucket> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Claims one slot per spec for `session`.
    ///
    /// All or nothing: when fewer slots are free than requested the table is
    /// left untouched.
    pub fn allocate(&mut self, session: SessionId, specs: &[BucketSpec]) -> WlcResult<Vec<usize>> {
        let free: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
            .take(specs.len())
            .collect();
        if free.len() < specs.len() {
            return Err(WlcError::Invalid("not enough free gscan buckets"));
        }

        for (&index, spec) in free.iter().zip(specs) {
            self.slots[index] = Some(Bucket {
                spec: spec.clone(),
                session,
                scan_cycle: 0,
            });
        }
        Ok(free)
    }

    /// Frees every bucket owned by `session` and returns the freed indices.
    pub fn free_session(&mut self, session: SessionId) -> Vec<usize> {
        let mut freed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|bucket| bucket.session == session) {
                *slot = None;
                freed.push(index);
            }
        }
        freed
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Used buckets with their indices.
    pub fn iter_used(&self) -> impl Iterator<Item = (usize, &Bucket)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|bucket| (index, bucket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(n: usize) -> Vec<BucketSpec> {
        vec![
            BucketSpec {
                band: WifiBand::Bg,
                period_ms: 10_000,
                ..BucketSpec::default()
            };
            n
        ]
    }

    #[test]
    fn allocate_assigns_unique_scan_ids() {
        let mut table = BucketTable::new();
        let indices = table.allocate(SessionId(1), &specs(3)).unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(table.used_count(), 3);
        assert_eq!(BucketTable::scan_id(2), 0xf012);
        assert_eq!(BucketTable::index_of(0xf012), Some(2));
    }

    #[test]
    fn over_allocation_changes_nothing() {
        let mut table = BucketTable::new();
        table.allocate(SessionId(1), &specs(5)).unwrap();
        let before: Vec<bool> = (0..MAX_BUCKETS).map(|i| table.is_used(i)).collect();

        assert!(table.allocate(SessionId(2), &specs(4)).is_err());
        let after: Vec<bool> = (0..MAX_BUCKETS).map(|i| table.is_used(i)).collect();
        assert_eq!(before, after);
        assert_eq!(table.free_count(), 3);
    }

    #[test]
    fn free_session_only_touches_owner() {
        let mut table = BucketTable::new();
        table.allocate(SessionId(1), &specs(2)).unwrap();
        table.allocate(SessionId(2), &specs(2)).unwrap();

        assert_eq!(table.free_session(SessionId(1)), vec![0, 1]);
        assert!(table.free_session(SessionId(1)).is_empty());
        assert_eq!(table.used_count(), 2);
        assert_eq!(table.get(2).unwrap().session, SessionId(2));

        // Freed slots are reused first.
        assert_eq!(table.allocate(SessionId(3), &specs(1)).unwrap(), vec![0]);
    }

    #[test]
    fn scan_id_range() {
        assert_eq!(BucketTable::index_of(0xf00f), None);
        assert_eq!(BucketTable::index_of(0xf010), Some(0));
        assert_eq!(BucketTable::index_of(0xf018), None);
    }
}
