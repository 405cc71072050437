//! Batches of commands with ordering dependencies.
//!
//! A batch is validated and sorted up front so that every job lands in the
//! queue after the jobs it depends on. Workers then only have to wait for a
//! dependency that another worker is still running.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::job::{CompletionHandle, Job};

/// One command in a batch, as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    /// Caller-chosen id, unique within the batch.
    pub id: u32,

    #[serde(alias = "cmd")]
    pub command: String,

    /// Ids of commands that must finish before this one starts.
    #[serde(default)]
    pub dependencies: Vec<u32>,

    /// Whether the caller wants the command's output.
    #[serde(default = "default_require_result")]
    pub require_result: bool,
}

const fn default_require_result() -> bool {
    true
}

impl CommandSpec {
    pub fn new(id: u32, command: impl Into<String>) -> Self {
        Self {
            id,
            command: command.into(),
            dependencies: Vec::new(),
            require_result: true,
        }
    }

    /// Run after the command with id `dependency`.
    #[must_use]
    pub fn after(mut self, dependency: u32) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Do not report output for this command.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.require_result = false;
        self
    }
}

/// Why a batch was rejected. Nothing is enqueued for a rejected batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("command id {0} appears more than once")]
    DuplicateId(u32),

    #[error("command {id} depends on unknown command {dependency}")]
    UnknownDependency { id: u32, dependency: u32 },

    #[error("dependency cycle through command {0}")]
    Cycle(u32),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Indices into `specs` such that every command follows its dependencies.
/// Commands without a constraint between them keep their input order.
pub fn execution_order(specs: &[CommandSpec]) -> Result<Vec<usize>, BatchError> {
    let mut index = HashMap::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        if index.insert(spec.id, i).is_some() {
            return Err(BatchError::DuplicateId(spec.id));
        }
    }

    let mut edges = Vec::with_capacity(specs.len());
    for spec in specs {
        let deps = spec
            .dependencies
            .iter()
            .map(|dep| {
                index.get(dep).copied().ok_or(BatchError::UnknownDependency {
                    id: spec.id,
                    dependency: *dep,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        edges.push(deps);
    }

    let mut marks = vec![Mark::Unvisited; specs.len()];
    let mut order = Vec::with_capacity(specs.len());
    for i in 0..specs.len() {
        visit(i, specs, &edges, &mut marks, &mut order)?;
    }
    Ok(order)
}

fn visit(
    node: usize,
    specs: &[CommandSpec],
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> Result<(), BatchError> {
    match marks[node] {
        Mark::Done => return Ok(()),
        Mark::Visiting => return Err(BatchError::Cycle(specs[node].id)),
        Mark::Unvisited => {}
    }
    marks[node] = Mark::Visiting;
    for &dep in &edges[node] {
        visit(dep, specs, edges, marks, order)?;
    }
    marks[node] = Mark::Done;
    order.push(node);
    Ok(())
}

/// Build the jobs for a batch.
///
/// Jobs come back in execution order, handles in input order.
pub fn build_jobs(specs: &[CommandSpec]) -> Result<(Vec<Job>, Vec<CompletionHandle>), BatchError> {
    let order = execution_order(specs)?;

    // Batch id -> position in `jobs`
    let mut slots = HashMap::with_capacity(specs.len());
    let mut jobs: Vec<Job> = Vec::with_capacity(specs.len());
    let mut handles: Vec<Option<CompletionHandle>> = specs.iter().map(|_| None).collect();

    for i in order {
        let spec = &specs[i];
        let (mut job, handle) = Job::new(spec.command.clone(), spec.require_result);
        for dep in &spec.dependencies {
            if let Some(&slot) = slots.get(dep) {
                job.depends_on(&jobs[slot]);
            }
        }
        slots.insert(spec.id, jobs.len());
        jobs.push(job);
        handles[i] = Some(handle);
    }

    Ok((jobs, handles.into_iter().flatten().collect()))
}
