use super::cache_ops::StaticEntry;
use super::entry::Waiter;
use super::resolution::Admission;
use super::state::{Effects, ServiceState};
use super::table::CacheTable;
use async_trait::async_trait;
use ferrous_arp_application::ports::{
    CacheSweepPort, FrameDisposition, FrameSinkPort, FrameTransport, SweepOutcome,
};
use ferrous_arp_domain::{
    Address, ArpError, CacheEntrySnapshot, ConfigError, EngineConfig, InstanceConfig, InstanceId,
    NotifyHandle, ResolutionOutcome, TableKind,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The shared ARP engine. One per link; every instance created from it shares the
/// pending, denied and resolved tables.
pub struct ArpService {
    state: Mutex<ServiceState>,
    transport: Arc<dyn FrameTransport>,
    next_instance: AtomicU64,
    next_handle: AtomicU64,
    shutdown: CancellationToken,
}

impl ArpService {
    /// Rejects engine settings the sweep cannot make progress with, such as a zero
    /// timer period.
    pub fn new(
        engine: EngineConfig,
        transport: Arc<dyn FrameTransport>,
    ) -> Result<Arc<Self>, ConfigError> {
        engine.validate()?;

        let link = transport.link();
        info!(
            transport = transport.transport_name(),
            station = %link.station_address,
            timer_interval_ms = engine.timer_interval_ms,
            max_entries = engine.max_entries,
            "ARP service created"
        );

        Ok(Arc::new(Self {
            state: Mutex::new(ServiceState::new(engine, link)),
            transport,
            next_instance: AtomicU64::new(1),
            next_handle: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Signals collected waiters, then hands the collected frames to the transport.
    /// Called with the lock released.
    async fn apply(&self, effects: Effects) {
        for frame in effects.notify() {
            let destination = frame.destination.clone();
            if let Err(e) = self.transport.transmit(frame).await {
                warn!(
                    error = %e,
                    destination = %destination,
                    transport = self.transport.transport_name(),
                    "Failed to transmit ARP frame"
                );
            }
        }
    }

    /// Creates an unconfigured instance bound to this service.
    pub fn create_instance(self: &Arc<Self>) -> ArpInstance {
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed));
        self.lock().register_instance(id);
        debug!(instance = %id, "ARP instance created");
        ArpInstance {
            id,
            service: Arc::clone(self),
        }
    }

    /// A fresh handle callers can tag requests with and later cancel by.
    pub fn notify_handle(&self) -> NotifyHandle {
        NotifyHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn sweep(&self) -> SweepOutcome {
        let mut effects = Effects::default();
        let outcome = self.lock().sweep(&mut effects);
        self.apply(effects).await;
        outcome
    }

    pub async fn receive_frame(&self, frame: &[u8]) -> FrameDisposition {
        let mut effects = Effects::default();
        let disposition = self.lock().process_frame(frame, &mut effects);
        self.apply(effects).await;
        disposition
    }

    /// Tears the service down. Refused while requests are still waiting; otherwise
    /// drops every cached entry and cancels the shutdown token the background jobs
    /// watch.
    pub fn shutdown(&self) -> Result<(), ArpError> {
        let mut state = self.lock();

        let waiting = state.pending_waiters();
        if waiting > 0 {
            warn!(waiting, "ARP shutdown refused, requests still pending");
            return Err(ArpError::Busy(waiting));
        }

        let dropped = state.denied.len() + state.resolved.len();
        state.denied = CacheTable::new(TableKind::Denied);
        state.resolved = CacheTable::new(TableKind::Resolved);
        drop(state);

        self.shutdown.cancel();
        info!(dropped, "ARP service shut down");
        Ok(())
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn transport(&self) -> Arc<dyn FrameTransport> {
        Arc::clone(&self.transport)
    }

    pub fn table_len(&self, kind: TableKind) -> usize {
        self.lock().table(kind).len()
    }

    pub fn total_entries(&self) -> usize {
        self.lock().total_entries()
    }

    pub fn snapshot(&self, kind: TableKind) -> Vec<CacheEntrySnapshot> {
        self.lock()
            .table(kind)
            .iter()
            .map(|(_, entry)| entry.snapshot(kind))
            .collect()
    }
}

#[async_trait]
impl CacheSweepPort for ArpService {
    fn period_ms(&self) -> u32 {
        self.lock().engine.timer_interval_ms
    }

    async fn run_sweep(&self) -> Result<SweepOutcome, ArpError> {
        Ok(self.sweep().await)
    }
}

#[async_trait]
impl FrameSinkPort for ArpService {
    async fn deliver(&self, frame: &[u8]) -> FrameDisposition {
        self.receive_frame(frame).await
    }
}

/// Result of a resolution request.
#[derive(Debug)]
pub enum RequestOutcome {
    /// Answered from the cache, or a broadcast or multicast target.
    Resolved(Address),
    /// A request is on the wire; await the handle for the outcome.
    Pending(PendingResolution),
}

impl RequestOutcome {
    /// Waits for the outcome, whether or not it was already known.
    pub async fn resolve(self) -> ResolutionOutcome {
        match self {
            Self::Resolved(hw) => ResolutionOutcome::Resolved(hw),
            Self::Pending(pending) => pending.await,
        }
    }
}

/// Completion side of an asynchronous request. Signaled exactly once.
#[derive(Debug)]
pub struct PendingResolution {
    handle: NotifyHandle,
    receiver: oneshot::Receiver<ResolutionOutcome>,
}

impl PendingResolution {
    pub fn handle(&self) -> NotifyHandle {
        self.handle
    }

    /// Non-blocking poll; `None` while the request is still outstanding.
    pub fn try_outcome(&mut self) -> Option<ResolutionOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(ResolutionOutcome::Canceled),
        }
    }
}

impl Future for PendingResolution {
    type Output = ResolutionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(ResolutionOutcome::Canceled))
    }
}

/// A client of the shared cache with its own protocol station address. Dropping it
/// unconfigures it, which cancels its outstanding requests.
pub struct ArpInstance {
    id: InstanceId,
    service: Arc<ArpService>,
}

impl ArpInstance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn service(&self) -> &Arc<ArpService> {
        &self.service
    }

    pub fn config(&self) -> Option<InstanceConfig> {
        self.service.lock().instance_config(self.id).cloned()
    }

    /// Binds (or with `None` unbinds) the instance to a protocol station address.
    pub async fn configure(&self, config: Option<InstanceConfig>) -> Result<(), ArpError> {
        let mut effects = Effects::default();
        let result = self.service.lock().configure(self.id, config, &mut effects);
        self.service.apply(effects).await;
        result
    }

    pub async fn add(&self, entry: StaticEntry<'_>) -> Result<(), ArpError> {
        let mut effects = Effects::default();
        let result = self.service.lock().add(self.id, entry, &mut effects);
        self.service.apply(effects).await;
        result
    }

    pub fn find(
        &self,
        by_protocol: bool,
        address: Option<&[u8]>,
        refresh: bool,
    ) -> Result<Vec<CacheEntrySnapshot>, ArpError> {
        self.service
            .lock()
            .find(self.id, by_protocol, address, refresh)
    }

    pub fn delete(
        &self,
        by_protocol: bool,
        address: Option<&[u8]>,
        force: bool,
    ) -> Result<usize, ArpError> {
        self.service
            .lock()
            .delete(self.id, by_protocol, address, force)
    }

    pub fn flush(&self) -> Result<usize, ArpError> {
        self.service.lock().flush(self.id)
    }

    /// Resolves `target` to a hardware address. `None` asks for the link broadcast
    /// address. Without a `handle` a fresh one is allocated.
    pub async fn request(
        &self,
        target: Option<&[u8]>,
        handle: Option<NotifyHandle>,
    ) -> Result<RequestOutcome, ArpError> {
        let handle = handle.unwrap_or_else(|| self.service.notify_handle());
        let (sender, receiver) = oneshot::channel();
        let waiter = Waiter::new(self.id, handle, sender);

        let mut effects = Effects::default();
        let admission = self
            .service
            .lock()
            .request(self.id, target, waiter, &mut effects);
        self.service.apply(effects).await;

        match admission? {
            Admission::Resolved(hw) => Ok(RequestOutcome::Resolved(hw)),
            Admission::Queued => Ok(RequestOutcome::Pending(PendingResolution { handle, receiver })),
        }
    }

    /// Cancels this instance's waiters on `target` (any target when `None`) tagged
    /// with `handle` (any handle when `None`). Each canceled waiter is signaled.
    pub fn cancel(
        &self,
        target: Option<&[u8]>,
        handle: Option<NotifyHandle>,
    ) -> Result<usize, ArpError> {
        let mut effects = Effects::default();
        let canceled = {
            let mut state = self.service.lock();
            let config = state.configured(self.id)?;
            let target = target.map(|t| Address::new(config.protocol_type, t));
            state.cancel(Some(self.id), target.as_ref(), handle, &mut effects)
        };

        // Cancellation only signals waiters, it never produces frames.
        let frames = effects.notify();
        debug_assert!(frames.is_empty());

        if canceled == 0 {
            return Err(ArpError::NotFound);
        }
        debug!(instance = %self.id, canceled, "Requests canceled");
        Ok(canceled)
    }
}

impl ArpInstance {
    /// Explicit teardown; same as dropping the instance.
    pub fn destroy(self) {}
}

impl Drop for ArpInstance {
    fn drop(&mut self) {
        let mut effects = Effects::default();
        {
            let mut state = self.service.lock();
            if state.instance_config(self.id).is_some() {
                let _ = state.configure(self.id, None, &mut effects);
            }
            state.instances.remove(&self.id);
        }
        effects.notify();
        debug!(instance = %self.id, "ARP instance destroyed");
    }
}

impl std::fmt::Debug for ArpInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArpInstance").field("id", &self.id).finish()
    }
}
