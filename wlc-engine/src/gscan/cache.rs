//! # GSCAN Result Cache
//!
//! Buffers background scan results until the host fetches them. Results are
//! keyed by BSSID and charged against a fixed byte budget.
//!
//! ## Design Principles
//!
//! 1. **One Entry Per BSSID**: A second result for a known BSSID refreshes
//!    the stored entry in place; the live count never grows on a duplicate.
//! 2. **Byte Budget**: `consumed` is an explicit counter checked before a new
//!    BSSID is admitted. Refreshes are always admitted.
//! 3. **Index Links**: Slot chains are index-based links into a node arena,
//!    so there are no heap pointers and slots are recycled through a free
//!    list.
//! 4. **Stable Drain Order**: Retrieval walks hash slots in order and the
//!    chain newest first, matching what the firmware-facing host expects.
//!
//! ## Structure Overview
//!
//! ```text
//! ResultCache
//!   ├── index: HashMap<MacAddr, usize>      BSSID -> node
//!   ├── nodes: Vec<Option<Node>>            arena
//!   ├── free:  Vec<usize>                   recycled arena slots
//!   └── heads: [Option<usize>; 32]          slot = bssid[5] % 32
//!                 └── Node { result, len, scan_cycle, next }
//! ```

use ahash::RandomState;
use hashbrown::HashMap;
use serde::Serialize;

use wlc_common::MacAddr;

/// Number of hash slots.
pub const HASH_TABLE_SIZE: usize = 32;

/// Byte budget of the cache.
pub const MAX_SCAN_CACHE_SIZE: usize = 12000;

/// Serialized size of a result without its IEs.
pub const SCAN_RESULT_HEADER_LEN: usize = 80;

/// One BSS seen by a background scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub bssid: MacAddr,
    pub ssid: Vec<u8>,
    pub rssi: i16,
    pub frequency: u16,
    pub timestamp_us: u64,
    pub capability: u16,
    pub beacon_period: u16,
    pub ies: Vec<u8>,
}

impl ScanResult {
    /// Bytes this result is charged against the budget.
    pub fn encoded_len(&self) -> usize {
        SCAN_RESULT_HEADER_LEN + self.ies.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The byte budget is exhausted.
    Capacity,
    /// Same scan cycle already reported this BSSID with a stronger signal.
    WeakerRssi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    KeptNew,
    KeptRefreshed,
    Discarded(DiscardReason),
}

impl InsertOutcome {
    pub fn is_kept(self) -> bool {
        !matches!(self, InsertOutcome::Discarded(_))
    }
}

#[derive(Debug)]
struct Node {
    result: ScanResult,
    // Bytes charged for this node.
    len: usize,
    // Bucket scan cycle the result arrived in.
    scan_cycle: u32,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct ResultCache {
    index: HashMap<MacAddr, usize, RandomState>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    heads: [Option<usize>; HASH_TABLE_SIZE],
    consumed: usize,
    max_bytes: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_max_bytes(MAX_SCAN_CACHE_SIZE)
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        ResultCache {
            index: HashMap::with_hasher(RandomState::new()),
            nodes: Vec::new(),
            free: Vec::new(),
            heads: [None; HASH_TABLE_SIZE],
            consumed: 0,
            max_bytes,
        }
    }

    /// Hash slot of a BSSID.
    pub fn slot_of(bssid: &MacAddr) -> usize {
        usize::from(bssid.last_octet()) % HASH_TABLE_SIZE
    }

    /// Number of live results.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn get(&self, bssid: &MacAddr) -> Option<&ScanResult> {
        let idx = *self.index.get(bssid)?;
        self.nodes[idx].as_ref().map(|node| &node.result)
    }

    pub fn contains(&self, bssid: &MacAddr) -> bool {
        self.index.contains_key(bssid)
    }

    /// Admits `result` seen during `scan_cycle`.
    ///
    /// A known BSSID is refreshed in place unless the same cycle already
    /// holds a stronger reading. A new BSSID is admitted only while
    /// `consumed + len` stays below the budget.
    pub fn insert(&mut self, result: ScanResult, scan_cycle: u32) -> InsertOutcome {
        let len = result.encoded_len();

        if let Some(&idx) = self.index.get(&result.bssid) {
            let Some(node) = self.nodes[idx].as_mut() else {
                return InsertOutcome::Discarded(DiscardReason::Capacity);
            };
            if node.scan_cycle == scan_cycle && result.rssi < node.result.rssi {
                return InsertOutcome::Discarded(DiscardReason::WeakerRssi);
            }
            self.consumed = self.consumed - node.len + len;
            node.result = result;
            node.len = len;
            node.scan_cycle = scan_cycle;
            return InsertOutcome::KeptRefreshed;
        }

        if self.consumed + len >= self.max_bytes {
            return InsertOutcome::Discarded(DiscardReason::Capacity);
        }

        let slot = Self::slot_of(&result.bssid);
        let bssid = result.bssid;
        let node = Node {
            result,
            len,
            scan_cycle,
            next: self.heads[slot],
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.heads[slot] = Some(idx);
        self.index.insert(bssid, idx);
        self.consumed += len;
        InsertOutcome::KeptNew
    }

    /// Removes the entry for `bssid`; a miss is not an error.
    pub fn remove(&mut self, bssid: &MacAddr) -> Option<ScanResult> {
        let idx = self.index.remove(bssid)?;
        self.unlink(Self::slot_of(bssid), idx);
        self.release(idx)
    }

    /// Drops every entry and resets the counters.
    pub fn flush(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free.clear();
        self.heads = [None; HASH_TABLE_SIZE];
        self.consumed = 0;
    }

    /// Removes and returns up to `max` results in slot order.
    pub fn drain(&mut self, max: usize) -> Vec<ScanResult> {
        let mut out = Vec::with_capacity(max.min(self.len()));
        for slot in 0..HASH_TABLE_SIZE {
            while out.len() < max {
                let Some(idx) = self.heads[slot] else {
                    break;
                };
                let Some(node) = self.nodes[idx].as_ref() else {
                    self.heads[slot] = None;
                    break;
                };
                self.heads[slot] = node.next;
                self.index.remove(&node.result.bssid);
                if let Some(result) = self.release(idx) {
                    out.push(result);
                }
            }
        }
        out
    }

    /// Live results in slot order, newest first within a slot.
    pub fn iter(&self) -> impl Iterator<Item = &ScanResult> + '_ {
        self.heads.iter().flat_map(move |head| {
            let mut cur = *head;
            std::iter::from_fn(move || {
                let node = self.nodes[cur?].as_ref()?;
                cur = node.next;
                Some(&node.result)
            })
        })
    }

    /// Detaches `idx` from the chain of `slot`.
    fn unlink(&mut self, slot: usize, idx: usize) {
        let next = self.nodes[idx].as_ref().and_then(|node| node.next);
        if self.heads[slot] == Some(idx) {
            self.heads[slot] = next;
            return;
        }

        let mut cur = self.heads[slot];
        while let Some(cur_idx) = cur {
            let Some(node) = self.nodes[cur_idx].as_mut() else {
                return;
            };
            if node.next == Some(idx) {
                node.next = next;
                return;
            }
            cur = node.next;
        }
    }

    /// Frees an already unlinked arena slot and uncharges its bytes.
    fn release(&mut self, idx: usize) -> Option<ScanResult> {
        let node = self.nodes[idx].take()?;
        self.free.push(idx);
        self.consumed -= node.len;
        Some(node.result)
    }
}
