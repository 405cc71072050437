//! Queued commands and the handles callers use to observe them.
//!
//! A [`Job`] travels from the pool's queue to exactly one worker. Completing
//! it consumes it, so a job cannot be resolved twice. The matching
//! [`CompletionHandle`] stays with the submitter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, watch};
use tracing::debug;

use crate::error::RconError;

/// Outcome delivered to a job's handle.
pub type JobResult = Result<String, RconError>;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    fn next() -> Self {
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pending command.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    command: String,
    /// `None` for fire-and-forget jobs.
    reply: Option<oneshot::Sender<JobResult>>,
    /// Flips to `true` once the job is resolved, for dependents.
    finished: watch::Sender<bool>,
    dependencies: Vec<watch::Receiver<bool>>,
    created_at: Instant,
}

impl Job {
    /// Create a job and the handle its submitter keeps.
    pub fn new(command: impl Into<String>, want_result: bool) -> (Self, CompletionHandle) {
        let id = JobId::next();
        let (reply, receiver) = if want_result {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let (finished, _) = watch::channel(false);

        let job = Self {
            id,
            command: command.into(),
            reply,
            finished,
            dependencies: Vec::new(),
            created_at: Instant::now(),
        };
        (job, CompletionHandle { id, receiver })
    }

    pub const fn id(&self) -> JobId {
        self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub const fn wants_result(&self) -> bool {
        self.reply.is_some()
    }

    /// Time since the job was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Hold this job back until `other` is resolved.
    pub fn depends_on(&mut self, other: &Self) {
        self.dependencies.push(other.finished.subscribe());
    }

    pub(crate) fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Wait until every dependency is resolved, whatever its outcome.
    ///
    /// A dependency dropped without being resolved means the pool was torn
    /// down underneath it.
    pub(crate) async fn wait_for_dependencies(&mut self) -> Result<(), RconError> {
        for dependency in &mut self.dependencies {
            let resolved = dependency.wait_for(|done| *done).await.is_ok();
            if !resolved {
                return Err(RconError::Shutdown);
            }
        }
        Ok(())
    }

    /// Resolve the job. Consumes it, so resolution happens exactly once.
    pub fn complete(self, outcome: JobResult) {
        let Self {
            id,
            reply,
            finished,
            created_at,
            ..
        } = self;
        finished.send_replace(true);

        match reply {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!(job = %id, "Caller stopped waiting, result discarded");
                }
            }
            None => {
                if let Err(e) = outcome {
                    debug!(job = %id, error = %e, "Fire-and-forget command failed");
                }
            }
        }
        debug!(job = %id, elapsed = ?created_at.elapsed(), "Job resolved");
    }
}

/// The submitter's side of a job.
///
/// Either wait on it or [`ignore`](Self::ignore) it. Dropping the handle
/// does not cancel the job.
#[derive(Debug)]
pub struct CompletionHandle {
    id: JobId,
    receiver: Option<oneshot::Receiver<JobResult>>,
}

impl CompletionHandle {
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Whether this handle belongs to a fire-and-forget job.
    pub const fn is_detached(&self) -> bool {
        self.receiver.is_none()
    }

    /// Wait for the job to finish.
    ///
    /// Returns `Ok(None)` immediately for fire-and-forget jobs. A job dropped
    /// without being resolved (pool torn down) yields [`RconError::Shutdown`].
    pub async fn wait(self) -> Result<Option<String>, RconError> {
        let Some(receiver) = self.receiver else {
            return Ok(None);
        };
        match receiver.await {
            Ok(outcome) => outcome.map(Some),
            Err(_) => Err(RconError::Shutdown),
        }
    }

    /// Wait at most `timeout` for the job.
    ///
    /// On expiry only the observation is abandoned: a command already on the
    /// wire still runs to completion and its result is discarded.
    pub async fn wait_for(self, timeout: Duration) -> Result<Option<String>, RconError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .unwrap_or(Err(RconError::Timeout(timeout)))
    }

    /// Stop observing the job. It still runs.
    pub fn ignore(self) {}
}
