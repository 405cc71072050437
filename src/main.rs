//! rcon-pool
//!
//! Runs RCON commands against a game server through a worker pool.
//! Results go to stdout, one per command in submission order; logs and
//! failures go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rcon_pool::{config::Config, PoolConfig, WorkerPool};

#[derive(Parser, Debug)]
#[command(name = "rcon-pool")]
#[command(about = "Run RCON commands over a pool of connections")]
struct Args {
    /// JSON config file (environment variables override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of workers (parallel connections)
    #[arg(long)]
    workers: Option<usize>,

    /// Per-command timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Send commands without waiting for or printing their output
    #[arg(long)]
    no_wait: bool,

    /// Commands to run. Read from stdin, one per line, when omitted.
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs on stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
    .context("Failed to load configuration")?;
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = timeout;
    }
    config.validate()?;

    info!(
        host = %config.host,
        port = config.port,
        workers = config.worker_count,
        "Loaded configuration"
    );

    let commands = if args.commands.is_empty() {
        read_commands().await?
    } else {
        args.commands.clone()
    };
    if commands.is_empty() {
        info!("No commands to run");
        return Ok(());
    }

    let mut pool_config = PoolConfig::from_config(&config);
    pool_config.queue_capacity = pool_config.queue_capacity.max(commands.len());
    if args.no_wait {
        // Nobody waits on the handles, so shutdown has to let the queue run dry
        let shutdown = &mut pool_config.shutdown;
        shutdown.grace_period = shutdown.grace_period.max(pool_config.command_timeout);
        shutdown.await_period = shutdown.await_period.max(pool_config.command_timeout);
    }

    let pool = WorkerPool::start(pool_config);
    let handles: Vec<_> = commands
        .iter()
        .map(|command| pool.submit(command.as_str(), !args.no_wait))
        .collect();

    let mut failures = 0usize;
    for (command, handle) in commands.iter().zip(handles) {
        match handle.wait().await {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                error!(command = %command, error = %e, "Command failed");
            }
        }
    }

    pool.shutdown().await;

    if failures > 0 {
        anyhow::bail!("{failures} of {} commands failed", commands.len());
    }
    Ok(())
}

/// Non-empty lines from stdin.
async fn read_commands() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut commands = Vec::new();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if !line.is_empty() {
            commands.push(line.to_string());
        }
    }
    Ok(commands)
}
