//! Worker loop.
//!
//! Each worker owns at most one transport and runs jobs from the shared
//! queue strictly one at a time. Connections are opened lazily, on the first
//! job, and recycled after any failure that leaves them unusable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::RconError;
use crate::job::{Job, JobResult};
use crate::transport::{Connector, Transport};

/// Receiving half of the job queue, shared by every worker.
pub type SharedQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Per-worker timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Deadline for one command exchange.
    pub command_timeout: Duration,

    /// Pause before reconnecting after a connection was lost.
    pub reconnect_pause: Duration,

    /// Pause after each command before taking the next job.
    pub command_delay: Duration,
}

pub struct Worker {
    id: usize,
    connector: Arc<dyn Connector>,
    queue: SharedQueue,
    stop: watch::Receiver<bool>,
    settings: WorkerSettings,
    transport: Option<Box<dyn Transport>>,
    /// Set when the previous connection was dropped after a failure.
    recovering: bool,
}

impl Worker {
    pub fn new(
        id: usize,
        connector: Arc<dyn Connector>,
        queue: SharedQueue,
        stop: watch::Receiver<bool>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            id,
            connector,
            queue,
            stop,
            settings,
            transport: None,
            recovering: false,
        }
    }

    /// Process jobs until the stop signal fires or the queue closes.
    pub async fn run(mut self) {
        debug!(worker = self.id, endpoint = %self.connector.endpoint(), "Worker started");

        loop {
            if *self.stop.borrow() {
                break;
            }
            let job = tokio::select! {
                biased;
                _ = self.stop.changed() => break,
                job = next_job(&self.queue) => job,
            };
            let Some(job) = job else {
                break;
            };

            self.process(job).await;

            if !self.settings.command_delay.is_zero() {
                tokio::time::sleep(self.settings.command_delay).await;
            }
        }

        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        debug!(worker = self.id, "Worker stopped");
    }

    async fn process(&mut self, mut job: Job) {
        debug!(
            worker = self.id,
            job = %job.id(),
            command = %job.command(),
            queued_for = ?job.age(),
            "Processing job"
        );

        if job.has_dependencies() {
            let waited = tokio::select! {
                biased;
                _ = self.stop.wait_for(|stop| *stop) => Err(RconError::Shutdown),
                result = job.wait_for_dependencies() => result,
            };
            if let Err(e) = waited {
                job.complete(Err(e));
                return;
            }
        }

        let outcome = self.execute(job.command()).await;
        if let Err(e) = &outcome {
            warn!(worker = self.id, job = %job.id(), error = %e, "Command failed");
        }
        job.complete(outcome);
    }

    async fn execute(&mut self, command: &str) -> JobResult {
        let timeout = self.settings.command_timeout;
        let transport = self.ready_transport().await?;
        let result = transport.execute(command, timeout).await;

        if !transport.is_ready() {
            self.recycle().await;
        }
        result
    }

    /// The current transport, connecting first if there is none.
    ///
    /// One attempt per job: a failure fails the job and the next job tries
    /// again.
    async fn ready_transport(&mut self) -> Result<&mut Box<dyn Transport>, RconError> {
        if self.transport.as_ref().is_some_and(|t| !t.is_ready()) {
            self.recycle().await;
        }

        if self.transport.is_none() {
            if self.recovering && !self.settings.reconnect_pause.is_zero() {
                tokio::time::sleep(self.settings.reconnect_pause).await;
            }
            let transport = self.connector.connect().await.map_err(|e| match e {
                RconError::Authentication => RconError::Authentication,
                other => RconError::ConnectionLost(other.to_string()),
            });
            match transport {
                Ok(transport) => {
                    info!(worker = self.id, endpoint = %self.connector.endpoint(), "Connected");
                    self.recovering = false;
                    self.transport = Some(transport);
                }
                Err(e) => {
                    self.recovering = true;
                    return Err(e);
                }
            }
        }

        self.transport
            .as_mut()
            .ok_or_else(|| RconError::ConnectionLost("no connection".to_string()))
    }

    /// Drop the current transport so the next job reconnects.
    async fn recycle(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            self.recovering = true;
            debug!(worker = self.id, "Connection recycled");
        }
    }
}

async fn next_job(queue: &SharedQueue) -> Option<Job> {
    queue.lock().await.recv().await
}
