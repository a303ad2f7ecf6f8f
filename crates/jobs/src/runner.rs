use crate::{ArpTimerJob, FrameReceiveJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> tokio::task::JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(ArpTimerJob);
impl_spawnable_job!(FrameReceiveJob);

fn spawn_job<J: SpawnableJob>(job: Option<J>, shutdown: &Option<CancellationToken>) {
    if let Some(job) = job {
        let job = match shutdown {
            Some(token) => job.with_cancellation(token.clone()),
            None => job,
        };
        Arc::new(job).start_job();
    }
}

pub struct JobRunner {
    timer: Option<ArpTimerJob>,
    receiver: Option<FrameReceiveJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            timer: None,
            receiver: None,
            shutdown: None,
        }
    }

    pub fn with_timer(mut self, job: ArpTimerJob) -> Self {
        self.timer = Some(job);
        self
    }

    pub fn with_receiver(mut self, job: FrameReceiveJob) -> Self {
        self.receiver = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Spawns the configured jobs and returns immediately.
    pub fn start(self) {
        info!("Starting background job runner");

        spawn_job(self.timer, &self.shutdown);
        spawn_job(self.receiver, &self.shutdown);

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
