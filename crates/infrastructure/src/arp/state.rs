use super::entry::{CacheEntry, EntryId, Waiter};
use super::table::CacheTable;
use ferrous_arp_application::ports::OutboundFrame;
use ferrous_arp_domain::{
    Address, ArpError, ArpFrame, ArpOpcode, EngineConfig, FindMode, InstanceConfig, InstanceId,
    LinkInfo, ResolutionOutcome, TableKind,
};
use rustc_hash::FxHashMap;

/// Side effects computed inside the critical section and carried out after the
/// lock is released.
#[derive(Debug, Default)]
pub struct Effects {
    pub frames: Vec<OutboundFrame>,
    pub notifications: Vec<(Waiter, ResolutionOutcome)>,
}

impl Effects {
    /// Signals every collected waiter and hands back the frames still to transmit.
    pub fn notify(self) -> Vec<OutboundFrame> {
        for (waiter, outcome) in self.notifications {
            waiter.signal(outcome);
        }
        self.frames
    }
}

#[derive(Debug, Default)]
pub struct InstanceState {
    pub config: Option<InstanceConfig>,
}

/// Everything the critical section protects: the three tables plus the instance
/// configurations frame processing consults.
#[derive(Debug)]
pub struct ServiceState {
    pub(crate) pending: CacheTable,
    pub(crate) denied: CacheTable,
    pub(crate) resolved: CacheTable,
    pub(crate) instances: FxHashMap<InstanceId, InstanceState>,
    pub(crate) engine: EngineConfig,
    pub(crate) link: LinkInfo,
    next_entry_id: u64,
}

impl ServiceState {
    pub fn new(engine: EngineConfig, link: LinkInfo) -> Self {
        Self {
            pending: CacheTable::new(TableKind::Pending),
            denied: CacheTable::new(TableKind::Denied),
            resolved: CacheTable::new(TableKind::Resolved),
            instances: FxHashMap::default(),
            engine,
            link,
            next_entry_id: 0,
        }
    }

    pub fn table(&self, kind: TableKind) -> &CacheTable {
        match kind {
            TableKind::Pending => &self.pending,
            TableKind::Denied => &self.denied,
            TableKind::Resolved => &self.resolved,
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> &mut CacheTable {
        match kind {
            TableKind::Pending => &mut self.pending,
            TableKind::Denied => &mut self.denied,
            TableKind::Resolved => &mut self.resolved,
        }
    }

    pub(crate) fn alloc_entry_id(&mut self) -> EntryId {
        self.next_entry_id += 1;
        EntryId(self.next_entry_id)
    }

    pub fn total_entries(&self) -> usize {
        self.pending.len() + self.denied.len() + self.resolved.len()
    }

    pub(crate) fn has_capacity(&self) -> bool {
        self.total_entries() < self.engine.max_entries
    }

    pub fn pending_waiters(&self) -> usize {
        self.pending.iter().map(|(_, e)| e.waiters.len()).sum()
    }

    pub(crate) fn register_instance(&mut self, id: InstanceId) {
        self.instances.entry(id).or_default();
    }

    pub(crate) fn instance_config(&self, id: InstanceId) -> Option<&InstanceConfig> {
        self.instances.get(&id).and_then(|i| i.config.as_ref())
    }

    pub(crate) fn configured(&self, id: InstanceId) -> Result<InstanceConfig, ArpError> {
        self.instance_config(id).cloned().ok_or(ArpError::NotStarted)
    }

    /// Denied entry matching the protocol address, else one matching the hardware
    /// address. Absent addresses are skipped, not treated as wildcards.
    pub(crate) fn find_denied(
        &self,
        protocol: Option<&Address>,
        hardware: Option<&Address>,
    ) -> Option<EntryId> {
        let by_protocol = protocol
            .filter(|p| !p.is_wildcard())
            .and_then(|p| self.denied.find_next(None, FindMode::ByProtocol, Some(p), None));

        by_protocol.or_else(|| {
            hardware
                .filter(|h| !h.is_wildcard())
                .and_then(|h| self.denied.find_next(None, FindMode::ByHardware, None, Some(h)))
        })
    }
}

/// Builds the frame `instance` sends about `entry`. Requests are broadcast with an
/// unknown target hardware address; replies go straight to the entry's hardware
/// address.
pub(crate) fn build_frame(
    link: &LinkInfo,
    instance: &InstanceConfig,
    entry: &CacheEntry,
    opcode: ArpOpcode,
) -> OutboundFrame {
    let (destination, target_hardware) = match opcode {
        ArpOpcode::Request => (
            link.broadcast_address.clone(),
            Address::wildcard(link.hardware_type),
        ),
        ArpOpcode::Reply | ArpOpcode::Other(_) => (
            entry.hardware_address.clone(),
            entry.hardware_address.clone(),
        ),
    };

    let frame = ArpFrame {
        hardware_type: link.hardware_type,
        protocol_type: instance.protocol_type,
        opcode,
        sender_hardware: link.station_address.clone(),
        sender_protocol: instance.station(),
        target_hardware,
        target_protocol: entry.protocol_address.clone(),
    };

    OutboundFrame {
        destination,
        payload: frame.encode(),
    }
}
