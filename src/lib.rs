//! rcon-pool library
//!
//! Concurrent RCON command execution over a pool of TCP connections:
//! - Packet codec and streaming framing for the RCON wire format
//! - Authenticated connections with multi-packet response reassembly
//! - A bounded job queue served by a fixed set of workers
//! - Configuration loading from JSON and environment variables

pub mod batch;
pub mod config;
pub mod error;
pub mod job;
pub mod pool;
pub mod transport;
pub mod worker;

#[cfg(test)]
mod testing;

pub use batch::{BatchError, CommandSpec};
pub use error::RconError;
pub use job::{CompletionHandle, JobId};
pub use pool::{PoolConfig, ShutdownConfig, WorkerPool};
