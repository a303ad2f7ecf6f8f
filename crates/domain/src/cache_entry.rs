use crate::address::Address;
use std::fmt;

/// The three partitions of cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Pending,
    Denied,
    Resolved,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Pending => "pending",
            TableKind::Denied => "denied",
            TableKind::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which address(es) of an entry a lookup compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindMode {
    ByProtocol,
    ByHardware,
    ByBoth,
}

/// Read-only copy of a cache entry handed out by `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntrySnapshot {
    pub table: TableKind,
    pub protocol_address: Address,
    pub hardware_address: Address,
    pub default_decay_ms: u32,
    pub decay_ms: u32,
}

impl CacheEntrySnapshot {
    pub fn is_static(&self) -> bool {
        self.default_decay_ms == 0
    }

    pub fn is_denied(&self) -> bool {
        self.table == TableKind::Denied
    }
}

/// How a waiter's resolution ended. Only `Resolved` carries an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(Address),
    TimedOut,
    Canceled,
    Denied,
}

impl ResolutionOutcome {
    pub fn hardware_address(&self) -> Option<&Address> {
        match self {
            ResolutionOutcome::Resolved(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }
}
