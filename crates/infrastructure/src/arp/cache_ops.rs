use super::entry::{CacheEntry, EntryId};
use super::state::{Effects, ServiceState};
use ferrous_arp_domain::{
    Address, ArpError, CacheEntrySnapshot, FindMode, InstanceConfig, InstanceId,
    ResolutionOutcome, TableKind,
};
use tracing::{debug, info};

/// Arguments of `add`. Deny entries carry exactly one address, normal entries both.
#[derive(Debug, Clone, Default)]
pub struct StaticEntry<'a> {
    pub deny: bool,
    pub protocol: Option<&'a [u8]>,
    pub hardware: Option<&'a [u8]>,
    pub timeout_ms: u32,
    pub overwrite: bool,
}

impl ServiceState {
    pub(crate) fn configure(
        &mut self,
        owner: InstanceId,
        config: Option<InstanceConfig>,
        effects: &mut Effects,
    ) -> Result<(), ArpError> {
        let Some(instance) = self.instances.get_mut(&owner) else {
            return Err(ArpError::InvalidParameter(format!("unknown {}", owner)));
        };

        match config {
            Some(config) => {
                config.validate()?;
                if let Some(current) = &instance.config {
                    if !current.same_identity(&config) {
                        return Err(ArpError::AccessDenied);
                    }
                }
                let config = self.engine.apply_defaults(config);
                info!(
                    instance = %owner,
                    station = %config.station(),
                    retry_count = config.retry_count,
                    retry_interval_ms = config.retry_interval_ms,
                    entry_timeout_ms = config.entry_timeout_ms,
                    "ARP instance configured"
                );
                instance.config = Some(config);
            }
            None => {
                if instance.config.take().is_some() {
                    let canceled = self.cancel(Some(owner), None, None, effects);
                    info!(instance = %owner, canceled, "ARP instance unconfigured");
                }
            }
        }

        Ok(())
    }

    pub(crate) fn add(
        &mut self,
        owner: InstanceId,
        args: StaticEntry<'_>,
        effects: &mut Effects,
    ) -> Result<(), ArpError> {
        let config = self.configured(owner)?;

        let valid_shape = match (args.deny, args.protocol, args.hardware) {
            (_, None, None) => false,
            (true, Some(_), Some(_)) => false,
            (false, p, h) => p.is_some() && h.is_some(),
            (true, _, _) => true,
        };
        if !valid_shape {
            return Err(ArpError::InvalidParameter(
                "deny entries take one address, normal entries both".to_string(),
            ));
        }

        if args
            .protocol
            .is_some_and(|p| p.len() != config.station_address.len())
            || args
                .hardware
                .is_some_and(|h| h.len() != self.link.hardware_len() as usize)
        {
            return Err(ArpError::InvalidParameter(
                "address length does not match the link or protocol".to_string(),
            ));
        }

        let protocol = args.protocol.map(|p| Address::new(config.protocol_type, p));
        let hardware = args
            .hardware
            .map(|h| Address::new(self.link.hardware_type, h));

        let pending = protocol
            .as_ref()
            .and_then(|p| self.pending.find_next(None, FindMode::ByProtocol, Some(p), None));

        let taken = pending.and_then(|id| self.pending.remove(id).map(|e| (id, e)));
        let (id, mut entry) = match taken {
            Some(found) => found,
            None => match self.find_existing(protocol.as_ref(), hardware.as_ref()) {
                Some(_) if !args.overwrite => return Err(ArpError::AccessDenied),
                Some((kind, id)) => match self.table_mut(kind).remove(id) {
                    Some(entry) => (id, entry),
                    None => return Err(ArpError::NotFound),
                },
                None => {
                    if !self.has_capacity() {
                        return Err(ArpError::OutOfResources);
                    }
                    let id = self.alloc_entry_id();
                    let entry = CacheEntry::new(
                        Address::wildcard(config.protocol_type),
                        Address::wildcard(self.link.hardware_type),
                        args.timeout_ms,
                    );
                    (id, entry)
                }
            },
        };

        entry.protocol_address =
            protocol.unwrap_or_else(|| Address::wildcard(config.protocol_type));
        entry.hardware_address =
            hardware.unwrap_or_else(|| Address::wildcard(self.link.hardware_type));
        entry.default_decay_time = args.timeout_ms;
        entry.decay_time = args.timeout_ms;
        entry.retry_count = 0;
        entry.next_retry_time = 0;

        if !entry.waiters.is_empty() {
            let outcome = if args.deny {
                ResolutionOutcome::Denied
            } else {
                ResolutionOutcome::Resolved(entry.hardware_address.clone())
            };
            entry.drain_waiters(&outcome, &mut effects.notifications);
        }

        debug!(
            protocol = %entry.protocol_address,
            hardware = %entry.hardware_address,
            deny = args.deny,
            timeout_ms = args.timeout_ms,
            "Cache entry added"
        );

        let table = if args.deny {
            TableKind::Denied
        } else {
            TableKind::Resolved
        };
        self.table_mut(table).insert(id, entry);
        Ok(())
    }

    /// Existing denied or resolved entry an `add` would collide with: the one holding
    /// the protocol address, or for hardware-only deny entries the one holding the
    /// hardware address.
    fn find_existing(
        &self,
        protocol: Option<&Address>,
        hardware: Option<&Address>,
    ) -> Option<(TableKind, EntryId)> {
        let (mode, protocol, hardware) = match protocol {
            Some(p) => (FindMode::ByProtocol, Some(p), None),
            None => (FindMode::ByHardware, None, hardware),
        };

        [TableKind::Denied, TableKind::Resolved]
            .into_iter()
            .find_map(|kind| {
                self.table(kind)
                    .find_next(None, mode, protocol, hardware)
                    .map(|id| (kind, id))
            })
    }

    pub(crate) fn find(
        &mut self,
        owner: InstanceId,
        by_protocol: bool,
        address: Option<&[u8]>,
        refresh: bool,
    ) -> Result<Vec<CacheEntrySnapshot>, ArpError> {
        let config = self.configured(owner)?;

        let (mode, pattern) = if by_protocol {
            (
                FindMode::ByProtocol,
                address.map(|a| Address::new(config.protocol_type, a)),
            )
        } else {
            (
                FindMode::ByHardware,
                address.map(|a| Address::new(self.link.hardware_type, a)),
            )
        };

        let mut found = Vec::new();
        for kind in [TableKind::Denied, TableKind::Resolved] {
            let table = self.table_mut(kind);
            let mut cursor = None;
            while let Some(id) = table.find_next(cursor, mode, pattern.as_ref(), pattern.as_ref()) {
                if let Some(entry) = table.get_mut(id) {
                    if refresh {
                        entry.reset_decay();
                    }
                    found.push(entry.snapshot(kind));
                }
                cursor = Some(id);
            }
        }

        if found.is_empty() {
            return Err(ArpError::NotFound);
        }
        Ok(found)
    }

    pub(crate) fn delete(
        &mut self,
        owner: InstanceId,
        by_protocol: bool,
        address: Option<&[u8]>,
        force: bool,
    ) -> Result<usize, ArpError> {
        let config = self.configured(owner)?;

        let removed = self
            .denied
            .delete_matching(by_protocol, config.protocol_type, address, force)
            + self
                .resolved
                .delete_matching(by_protocol, config.protocol_type, address, force);

        debug!(instance = %owner, removed, force, "Cache entries deleted");

        if removed == 0 {
            return Err(ArpError::NotFound);
        }
        Ok(removed)
    }

    /// Removes every dynamic entry of the denied and resolved tables.
    pub(crate) fn flush(&mut self, owner: InstanceId) -> Result<usize, ArpError> {
        self.delete(owner, false, None, false)
    }
}
