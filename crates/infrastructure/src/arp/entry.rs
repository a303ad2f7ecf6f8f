use ferrous_arp_domain::{
    Address, CacheEntrySnapshot, InstanceId, NotifyHandle, ResolutionOutcome, TableKind,
};
use std::fmt;
use tokio::sync::oneshot;

/// Stable handle of a cache entry. Ids are never reused, so a handle held across a
/// removal simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// A caller blocked on a pending resolution.
pub struct Waiter {
    pub owner: InstanceId,
    pub handle: NotifyHandle,
    sender: oneshot::Sender<ResolutionOutcome>,
}

impl Waiter {
    pub fn new(
        owner: InstanceId,
        handle: NotifyHandle,
        sender: oneshot::Sender<ResolutionOutcome>,
    ) -> Self {
        Self {
            owner,
            handle,
            sender,
        }
    }

    pub fn matches(&self, owner: Option<InstanceId>, handle: Option<NotifyHandle>) -> bool {
        owner.is_none_or(|o| o == self.owner) && handle.is_none_or(|h| h == self.handle)
    }

    /// Consumes the waiter; the caller may already have dropped its receiver.
    pub fn signal(self, outcome: ResolutionOutcome) {
        let _ = self.sender.send(outcome);
    }
}

impl fmt::Debug for Waiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waiter")
            .field("owner", &self.owner)
            .field("handle", &self.handle)
            .finish()
    }
}

#[derive(Debug)]
pub struct CacheEntry {
    pub protocol_address: Address,
    pub hardware_address: Address,
    pub retry_count: u32,
    /// Zero marks a static entry.
    pub default_decay_time: u32,
    pub decay_time: u32,
    pub next_retry_time: u32,
    pub waiters: Vec<Waiter>,
}

impl CacheEntry {
    pub fn new(protocol_address: Address, hardware_address: Address, decay_ms: u32) -> Self {
        Self {
            protocol_address,
            hardware_address,
            retry_count: 0,
            default_decay_time: decay_ms,
            decay_time: decay_ms,
            next_retry_time: 0,
            waiters: Vec::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.default_decay_time == 0
    }

    pub fn reset_decay(&mut self) {
        self.decay_time = self.default_decay_time;
    }

    /// Removes every waiter and hands each one the outcome. Returns how many there were.
    pub fn drain_waiters(
        &mut self,
        outcome: &ResolutionOutcome,
        out: &mut Vec<(Waiter, ResolutionOutcome)>,
    ) -> usize {
        let count = self.waiters.len();
        out.extend(self.waiters.drain(..).map(|w| (w, outcome.clone())));
        count
    }

    pub fn snapshot(&self, table: TableKind) -> CacheEntrySnapshot {
        CacheEntrySnapshot {
            table,
            protocol_address: self.protocol_address.clone(),
            hardware_address: self.hardware_address.clone(),
            default_decay_ms: self.default_decay_time,
            decay_ms: self.decay_time,
        }
    }
}
