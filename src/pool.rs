//! Worker pool: the public entry point for running commands.
//!
//! Callers hand commands to [`WorkerPool::submit`], which never blocks. Jobs
//! wait in a bounded FIFO queue until one of the pool's workers picks them
//! up. Each worker owns its own connection, so up to `worker_count` commands
//! run in parallel. Jobs taken by different workers may finish out of order;
//! callers that need ordering should await each handle or use a batch.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::batch::{self, BatchError, CommandSpec};
use crate::config::Config;
use crate::error::RconError;
use crate::job::{CompletionHandle, Job};
use crate::transport::{Connector, Probe, TcpConnector};
use crate::worker::{SharedQueue, Worker, WorkerSettings};

/// How often `shutdown` checks whether the queue has drained.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runtime pool configuration with `Duration` fields.
#[derive(Clone)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub password: String,

    /// Number of workers, and so of parallel connections.
    pub worker_count: usize,

    /// Deadline for one command exchange.
    pub command_timeout: Duration,

    /// Deadline for opening and authenticating a connection.
    pub connect_timeout: Duration,

    /// Jobs that may wait in the queue before `submit` reports `Overloaded`.
    pub queue_capacity: usize,

    pub reconnect_pause: Duration,
    pub command_delay: Duration,
    pub probe: Probe,
    pub shutdown: ShutdownConfig,
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("worker_count", &self.worker_count)
            .field("command_timeout", &self.command_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("queue_capacity", &self.queue_capacity)
            .field("reconnect_pause", &self.reconnect_pause)
            .field("command_delay", &self.command_delay)
            .field("probe", &self.probe)
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 25575,
            password: String::new(),
            worker_count: 3,
            command_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            queue_capacity: 1024,
            reconnect_pause: Duration::ZERO,
            command_delay: Duration::ZERO,
            probe: Probe::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Create from the loaded configuration values.
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            password: config.password.clone(),
            worker_count: config.worker_count,
            command_timeout: Duration::from_secs(config.timeout_seconds),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            queue_capacity: config.queue_capacity,
            reconnect_pause: Duration::from_secs(config.reconnect_pause_seconds),
            command_delay: Duration::from_millis(config.command_delay_ms),
            probe: config.probe.clone(),
            shutdown: ShutdownConfig {
                grace_period: Duration::from_secs(config.shutdown.grace_period_seconds),
                await_period: Duration::from_secs(config.shutdown.await_period_seconds),
            },
        }
    }

    fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            command_timeout: self.command_timeout,
            reconnect_pause: self.reconnect_pause,
            command_delay: self.command_delay,
        }
    }
}

/// Timing of [`WorkerPool::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownConfig {
    /// How long to let workers keep draining the queue before cancelling
    /// what is left.
    pub grace_period: Duration,

    /// How long to wait for in-flight commands before aborting workers.
    pub await_period: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::ZERO,
            await_period: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refusal {
    Full,
    Closed,
}

impl Refusal {
    const fn error(self) -> RconError {
        match self {
            Self::Full => RconError::Overloaded,
            Self::Closed => RconError::Shutdown,
        }
    }
}

/// A fixed set of workers fed from one bounded queue.
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    queue: SharedQueue,
    accepting: AtomicBool,
    stop: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: ShutdownConfig,
    worker_count: usize,
}

impl WorkerPool {
    /// Start a pool that connects over TCP.
    ///
    /// Must be called from within a Tokio runtime. Connections are opened
    /// lazily, by each worker on its first job.
    pub fn start(config: PoolConfig) -> Self {
        let connector = TcpConnector::new(
            config.host.clone(),
            config.port,
            config.password.clone(),
            config.connect_timeout,
            config.probe.clone(),
        );
        Self::with_connector(config, Arc::new(connector))
    }

    /// Start a pool whose workers get their transports from `connector`.
    pub fn with_connector(config: PoolConfig, connector: Arc<dyn Connector>) -> Self {
        let worker_count = config.worker_count.max(1);
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let queue: SharedQueue = Arc::new(Mutex::new(receiver));
        let (stop, _) = watch::channel(false);
        let settings = config.worker_settings();

        let workers = (0..worker_count)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&connector),
                    Arc::clone(&queue),
                    stop.subscribe(),
                    settings,
                );
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            endpoint = %connector.endpoint(),
            workers = worker_count,
            queue_capacity = config.queue_capacity,
            "Worker pool started"
        );

        Self {
            sender,
            queue,
            accepting: AtomicBool::new(true),
            stop,
            workers: Mutex::new(workers),
            shutdown: config.shutdown,
            worker_count,
        }
    }

    /// Queue `command` and return its handle without waiting.
    ///
    /// When the queue is full the handle resolves to
    /// [`RconError::Overloaded`]; after shutdown to [`RconError::Shutdown`].
    pub fn submit(&self, command: impl Into<String>, want_result: bool) -> CompletionHandle {
        let (job, handle) = Job::new(command, want_result);
        let id = job.id();
        match self.try_enqueue(job) {
            Ok(()) => debug!(job = %id, "Job queued"),
            Err((job, refusal)) => self.refuse(job, refusal),
        }
        handle
    }

    /// Queue a batch of commands with dependencies between them.
    ///
    /// Handles are returned in input order. If the queue fills part-way, the
    /// rejected job and every later one resolve to
    /// [`RconError::Overloaded`].
    pub fn submit_batch(&self, specs: &[CommandSpec]) -> Result<Vec<CompletionHandle>, BatchError> {
        let (jobs, handles) = batch::build_jobs(specs)?;

        let mut refused = None;
        for job in jobs {
            if let Some(refusal) = refused {
                job.complete(Err(Refusal::error(refusal)));
                continue;
            }
            if let Err((job, refusal)) = self.try_enqueue(job) {
                self.refuse(job, refusal);
                refused = Some(refusal);
            }
        }

        debug!(jobs = specs.len(), "Batch queued");
        Ok(handles)
    }

    fn try_enqueue(&self, job: Job) -> Result<(), (Job, Refusal)> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err((job, Refusal::Closed));
        }
        match self.sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err((job, Refusal::Full)),
            Err(TrySendError::Closed(job)) => Err((job, Refusal::Closed)),
        }
    }

    fn refuse(&self, job: Job, refusal: Refusal) {
        if refusal == Refusal::Full {
            warn!(job = %job.id(), queued = self.queued(), "Job queue full, rejecting");
        } else {
            debug!(job = %job.id(), "Pool shut down, rejecting");
        }
        job.complete(Err(refusal.error()));
    }

    /// Jobs waiting in the queue (not counting in-flight ones).
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Whether `submit` still accepts jobs.
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Stop the pool.
    ///
    /// 1. New submissions are refused with [`RconError::Shutdown`].
    /// 2. Workers keep draining the queue for up to `grace_period`.
    /// 3. Workers are told to stop; jobs still queued resolve to
    ///    [`RconError::Shutdown`].
    /// 4. In-flight commands get `await_period` to finish, then remaining
    ///    workers are aborted.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        if !self.accepting.swap(false, Ordering::AcqRel) {
            return;
        }
        info!(queued = self.queued(), "Shutting down worker pool");

        if !self.shutdown.grace_period.is_zero() {
            let drained = tokio::time::timeout(self.shutdown.grace_period, self.drained()).await;
            if drained.is_err() {
                debug!(queued = self.queued(), "Grace period over, cancelling queued jobs");
            }
        }

        self.stop.send_replace(true);
        let cancelled = {
            let mut queue = self.queue.lock().await;
            queue.close();
            let mut cancelled = 0usize;
            while let Ok(job) = queue.try_recv() {
                job.complete(Err(RconError::Shutdown));
                cancelled += 1;
            }
            cancelled
        };
        if cancelled > 0 {
            info!(cancelled, "Cancelled queued jobs");
        }

        let workers = std::mem::take(&mut *self.workers.lock().await);
        let deadline = tokio::time::Instant::now() + self.shutdown.await_period;
        for (id, mut handle) in workers.into_iter().enumerate() {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(worker = id, error = %e, "Worker task failed"),
                Err(_) => {
                    warn!(worker = id, "Worker still busy after await period, aborting");
                    handle.abort();
                }
            }
        }
        info!("Worker pool stopped");
    }

    async fn drained(&self) {
        while self.queued() > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop.send_replace(true);
    }
}
