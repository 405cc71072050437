//! Configuration for the pool and the `rcon-pool` binary.
//!
//! Values come from a JSON document (a file, or the `RCON_CONFIG`
//! environment variable) and are then overridden field by field by the
//! individual `RCON_*` environment variables. Every field has a default
//! except the password.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::transport::{PacketType, Probe};

/// Top-level configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// RCON password. Required.
    #[serde(default)]
    pub password: String,

    /// Number of workers, each holding one connection.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-command deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Deadline in seconds for connecting and logging in.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Pause in seconds before reconnecting after a lost connection.
    #[serde(default)]
    pub reconnect_pause_seconds: u64,

    /// Pause in milliseconds each worker takes between commands.
    #[serde(default)]
    pub command_delay_ms: u64,

    /// End-of-response probe; see [`Probe`].
    #[serde(default)]
    pub probe: Probe,

    #[serde(default)]
    pub shutdown: ShutdownSettings,
}

/// Shutdown timing (as read from JSON).
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownSettings {
    /// Seconds workers may keep draining the queue after shutdown starts.
    #[serde(default)]
    pub grace_period_seconds: u64,

    /// Seconds to wait for in-flight commands before aborting workers.
    #[serde(default = "default_await_period")]
    pub await_period_seconds: u64,
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self {
            grace_period_seconds: 0,
            await_period_seconds: default_await_period(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: String::new(),
            worker_count: default_worker_count(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            queue_capacity: default_queue_capacity(),
            reconnect_pause_seconds: 0,
            command_delay_ms: 0,
            probe: Probe::default(),
            shutdown: ShutdownSettings::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("worker_count", &self.worker_count)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("queue_capacity", &self.queue_capacity)
            .field("reconnect_pause_seconds", &self.reconnect_pause_seconds)
            .field("command_delay_ms", &self.command_delay_ms)
            .field("probe", &self.probe)
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

const fn default_port() -> u16 {
    25575
}

const fn default_worker_count() -> usize {
    3
}

const fn default_timeout() -> u64 {
    10
}

const fn default_connect_timeout() -> u64 {
    5
}

const fn default_queue_capacity() -> usize {
    1024
}

const fn default_await_period() -> u64 {
    5
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Starts from `RCON_CONFIG` (JSON) when set, otherwise from defaults,
    /// then applies the individual variables and validates the result.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("RCON_CONFIG") {
            Ok(json) => Self::from_json(&json).context("Failed to parse RCON_CONFIG")?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_json(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document without overrides or validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse JSON")?;
        Ok(config)
    }

    /// Override fields from variables looked up through `lookup`.
    ///
    /// Empty values are ignored. Unparsable values are an error rather than
    /// silently falling back to the default.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("RCON_HOST") {
            self.host = host;
        }
        if let Some(password) = get("RCON_PASSWORD") {
            self.password = password;
        }
        if let Some(body) = lookup("RCON_PROBE_BODY") {
            self.probe.body = body;
        }

        override_parsed(&get, "RCON_PORT", &mut self.port)?;
        override_parsed(&get, "WORKER_COUNT", &mut self.worker_count)?;
        override_parsed(&get, "RCON_SOCKET_TIMEOUT", &mut self.timeout_seconds)?;
        override_parsed(&get, "RCON_CONNECT_TIMEOUT", &mut self.connect_timeout_seconds)?;
        override_parsed(&get, "QUEUE_CAPACITY", &mut self.queue_capacity)?;
        override_parsed(&get, "RECONNECT_PAUSE", &mut self.reconnect_pause_seconds)?;
        override_parsed(&get, "COMMAND_DELAY_MS", &mut self.command_delay_ms)?;
        override_parsed(&get, "SHUTDOWN_GRACE_PERIOD", &mut self.shutdown.grace_period_seconds)?;
        override_parsed(&get, "SHUTDOWN_AWAIT_PERIOD", &mut self.shutdown.await_period_seconds)?;

        let mut probe_type = self.probe.packet_type.code();
        override_parsed(&get, "RCON_PROBE_TYPE", &mut probe_type)?;
        self.probe.packet_type = PacketType(probe_type);

        debug!(config = ?self, "Applied environment overrides");
        Ok(())
    }

    /// Reject values the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.password.is_empty(), "RCON password is not set (RCON_PASSWORD)");
        ensure!(!self.host.is_empty(), "RCON host is empty");
        ensure!(self.worker_count > 0, "worker_count must be at least 1");
        ensure!(self.queue_capacity > 0, "queue_capacity must be at least 1");
        ensure!(self.timeout_seconds > 0, "timeout_seconds must be at least 1");
        ensure!(
            self.connect_timeout_seconds > 0,
            "connect_timeout_seconds must be at least 1"
        );
        Ok(())
    }
}

fn override_parsed<T>(get: impl Fn(&str) -> Option<String>, key: &str, field: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(value) = get(key) {
        *field = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {value:?}"))?;
    }
    Ok(())
}
