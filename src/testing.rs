//! Loopback RCON server for tests.
//!
//! Command bodies script the reply:
//! - `multi a,b,c` answers with one packet per comma-separated part
//! - `hang` is never answered (nor is anything after it)
//! - `drop` closes the connection
//! - anything else answers `ok: <command>`

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::pool::PoolConfig;
use crate::transport::{read_packet, write_packet, Packet, PacketType};

pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub password: String,
    /// Pause before answering each command.
    pub delay: Duration,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            password: PASSWORD.to_string(),
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    pub connections: AtomicUsize,
    pub logins: AtomicUsize,
    pub commands: AtomicUsize,
}

impl Stats {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }
}

pub struct MockServer {
    addr: SocketAddr,
    stats: Arc<Stats>,
    accept_loop: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(Stats::default());

        let accept_loop = tokio::spawn({
            let stats = Arc::clone(&stats);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    stats.connections.fetch_add(1, Ordering::SeqCst);
                    // Replies go out as several small writes; Nagle would hold each one back
                    stream.set_nodelay(true).unwrap();
                    tokio::spawn(serve(stream, behavior.clone(), Arc::clone(&stats)));
                }
            }
        });

        Self {
            addr,
            stats,
            accept_loop,
        }
    }

    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Pool settings pointing at this server.
    pub fn pool_config(&self, worker_count: usize) -> PoolConfig {
        PoolConfig {
            host: "127.0.0.1".to_string(),
            port: self.port(),
            password: PASSWORD.to_string(),
            worker_count,
            command_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(2),
            ..PoolConfig::default()
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

/// Serve one client until it disconnects.
pub async fn serve<S>(mut stream: S, behavior: MockBehavior, stats: Arc<Stats>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut authenticated = false;
    let mut hung = false;

    while let Ok(packet) = read_packet(&mut stream).await {
        if hung {
            continue;
        }

        let replies = match packet.packet_type {
            PacketType::LOGIN => {
                stats.logins.fetch_add(1, Ordering::SeqCst);
                authenticated = packet.body == behavior.password;
                let id = if authenticated { packet.request_id } else { -1 };
                vec![Packet::new(id, PacketType::AUTH_RESPONSE, "")]
            }
            PacketType::COMMAND if !authenticated => {
                vec![Packet::new(-1, PacketType::RESPONSE_VALUE, "")]
            }
            PacketType::COMMAND => {
                stats.commands.fetch_add(1, Ordering::SeqCst);
                if !behavior.delay.is_zero() {
                    tokio::time::sleep(behavior.delay).await;
                }
                match packet.body.as_str() {
                    "hang" => {
                        hung = true;
                        continue;
                    }
                    "drop" => return,
                    body => command_reply(packet.request_id, body),
                }
            }
            other => vec![Packet::new(
                packet.request_id,
                PacketType::RESPONSE_VALUE,
                format!("Unknown request {:x}", other.code()),
            )],
        };

        for reply in replies {
            if write_packet(&mut stream, &reply).await.is_err() {
                return;
            }
        }
    }
}

fn command_reply(request_id: i32, body: &str) -> Vec<Packet> {
    match body.strip_prefix("multi") {
        Some(parts) => parts
            .trim_start()
            .split(',')
            .filter(|part| !part.is_empty())
            .map(|part| Packet::new(request_id, PacketType::RESPONSE_VALUE, part))
            .collect(),
        None => vec![Packet::new(
            request_id,
            PacketType::RESPONSE_VALUE,
            format!("ok: {body}"),
        )],
    }
}
