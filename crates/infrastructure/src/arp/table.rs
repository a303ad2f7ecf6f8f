use super::entry::{CacheEntry, EntryId};
use ferrous_arp_domain::{Address, FindMode, TableKind};
use std::collections::BTreeMap;
use std::ops::Bound;

/// One of the pending, denied or resolved tables.
///
/// Entries are keyed by their `EntryId`, so iteration follows allocation order and a
/// `find_next` cursor stays valid while other entries are removed.
#[derive(Debug)]
pub struct CacheTable {
    kind: TableKind,
    entries: BTreeMap<EntryId, CacheEntry>,
}

impl CacheTable {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&CacheEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut CacheEntry> {
        self.entries.get_mut(&id)
    }

    /// The caller guarantees `entry` is not held by any other table.
    pub fn insert(&mut self, id: EntryId, entry: CacheEntry) {
        let previous = self.entries.insert(id, entry);
        debug_assert!(previous.is_none(), "entry id inserted twice");
    }

    pub fn remove(&mut self, id: EntryId) -> Option<CacheEntry> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &CacheEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Snapshot of the current ids, for sweeps that remove while iterating.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.keys().copied().collect()
    }

    /// First entry after `start_after` (or from the head) whose address(es) match.
    /// Absent or zero-length patterns are wildcards. No wraparound.
    pub fn find_next(
        &self,
        start_after: Option<EntryId>,
        mode: FindMode,
        protocol: Option<&Address>,
        hardware: Option<&Address>,
    ) -> Option<EntryId> {
        let lower = match start_after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };

        self.entries
            .range((lower, Bound::Unbounded))
            .find(|(_, entry)| match mode {
                FindMode::ByProtocol => Address::matches(protocol, &entry.protocol_address),
                FindMode::ByHardware => Address::matches(hardware, &entry.hardware_address),
                FindMode::ByBoth => {
                    Address::matches(protocol, &entry.protocol_address)
                        && Address::matches(hardware, &entry.hardware_address)
                }
            })
            .map(|(id, _)| *id)
    }

    /// Removes every entry whose protocol (`by_protocol`) or hardware address equals
    /// `address`, or every entry when `address` is absent or empty. Static entries
    /// survive unless `force`. When matching by protocol only entries of
    /// `protocol_type` are considered.
    pub fn delete_matching(
        &mut self,
        by_protocol: bool,
        protocol_type: u16,
        address: Option<&[u8]>,
        force: bool,
    ) -> usize {
        let address = address.filter(|bytes| !bytes.is_empty());
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            if entry.is_static() && !force {
                return true;
            }

            let candidate = if by_protocol {
                if entry.protocol_address.kind() != protocol_type {
                    return true;
                }
                &entry.protocol_address
            } else {
                &entry.hardware_address
            };

            let hit = address.is_none_or(|bytes| candidate.as_bytes() == bytes);
            debug_assert!(
                !hit || entry.waiters.is_empty(),
                "deleting an entry that still has waiters"
            );
            !hit
        });

        before - self.entries.len()
    }
}
