//! The ARP cache engine: pending, denied and resolved tables behind one lock, the
//! resolution state machine, the RFC 826 receive path and the periodic sweep.

mod cache_ops;
mod entry;
mod receive;
mod resolution;
mod service;
mod state;
mod sweep;
mod table;

pub use cache_ops::StaticEntry;
pub use service::{ArpInstance, ArpService, PendingResolution, RequestOutcome};
