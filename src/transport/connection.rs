//! One TCP connection to an RCON server.
//!
//! Owns the socket, performs the login handshake, and turns the protocol's
//! unframed multi-packet replies into a single result string.
//! A connection serves one exchange at a time and is never shared.

use std::fmt;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, trace, warn};

use super::protocol::{self, PacketType, AUTH_FAILED_ID};
use super::{read_frame, read_packet, write_frame, Connector, Transport};
use crate::error::{DecodeError, RconError};

/// Lifecycle of a [`Connection`].
///
/// `Faulted` is terminal: a faulted connection has already dropped its socket
/// and a new `Connection` must be built to try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Ready,
    Faulted,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Packet sent right behind every command to mark the end of its reply.
///
/// The server answers requests in order, so once the probe's reply arrives
/// every fragment of the command's reply has been received. Servers differ
/// in what they answer reliably: Minecraft replies to an unknown type
/// (`200`), Source servers mirror an empty response value (`0`). Source
/// follows the mirrored value with a second packet whose body is not text;
/// the connection drops it unread at the start of the next exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Probe {
    #[serde(default = "default_probe_type")]
    pub packet_type: PacketType,
    #[serde(default)]
    pub body: String,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            packet_type: PacketType::PROBE,
            body: String::new(),
        }
    }
}

const fn default_probe_type() -> PacketType {
    PacketType::PROBE
}

/// Request id allocator. Ids are strictly positive and wrap to 1, so they
/// never collide with the `-1` the server uses to signal an auth failure.
#[derive(Debug, Clone)]
pub struct RequestIds {
    next: i32,
}

impl RequestIds {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Start allocating at `first` (clamped to 1).
    pub const fn starting_at(first: i32) -> Self {
        Self {
            next: if first < 1 { 1 } else { first },
        }
    }

    pub fn next_id(&mut self) -> i32 {
        let id = self.next;
        self.next = if id == i32::MAX { 1 } else { id + 1 };
        id
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// A single RCON session over a byte stream.
pub struct Connection<S> {
    stream: Option<S>,
    state: ConnectionState,
    ids: RequestIds,
    probe: Probe,
    /// End marker id of the last completed exchange. Some servers answer the
    /// marker twice; late packets carrying this id are dropped unread.
    finished_marker_id: Option<i32>,
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("ids", &self.ids)
            .field("probe", &self.probe)
            .field("finished_marker_id", &self.finished_marker_id)
            .finish_non_exhaustive()
    }
}

impl Connection<TcpStream> {
    /// A connection that has not opened its socket yet.
    pub const fn new(probe: Probe) -> Self {
        Self {
            stream: None,
            state: ConnectionState::Disconnected,
            ids: RequestIds::new(),
            probe,
            finished_marker_id: None,
        }
    }

    /// Open the TCP socket.
    pub async fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<(), RconError> {
        self.expect_state(ConnectionState::Disconnected)?;
        self.state = ConnectionState::Connecting;

        let addr = format!("{host}:{port}");
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                self.fault();
                return Err(RconError::Connect { addr, source });
            }
            Err(_) => {
                self.fault();
                let source = io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no answer within {timeout:?}"),
                );
                return Err(RconError::Connect { addr, source });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Could not disable Nagle on RCON socket");
        }
        debug!(addr = %addr, "TCP connection established");
        self.stream = Some(stream);
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Connection<S> {
    /// Wrap an already open stream. The connection starts in `Connecting`
    /// and still needs [`authenticate`](Self::authenticate).
    pub const fn from_stream(stream: S, probe: Probe) -> Self {
        Self {
            stream: Some(stream),
            state: ConnectionState::Connecting,
            ids: RequestIds::new(),
            probe,
            finished_marker_id: None,
        }
    }

    /// Replace the request id allocator. Only useful before the first exchange.
    #[must_use]
    pub fn with_request_ids(mut self, ids: RequestIds) -> Self {
        self.ids = ids;
        self
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Log in with `password`.
    ///
    /// A rejected password faults the connection for good; it is reported as
    /// [`RconError::Authentication`] and never retried here.
    #[instrument(skip_all)]
    pub async fn authenticate(&mut self, password: &str, timeout: Duration) -> Result<(), RconError> {
        self.expect_state(ConnectionState::Connecting)?;
        self.state = ConnectionState::Authenticating;

        let request_id = self.ids.next_id();
        let result = match tokio::time::timeout(timeout, self.login(request_id, password)).await {
            Ok(result) => result,
            Err(_) => Err(RconError::Timeout(timeout)),
        };

        match result {
            Ok(()) => {
                self.state = ConnectionState::Ready;
                info!("RCON connection authenticated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "RCON authentication failed");
                self.fault();
                Err(e)
            }
        }
    }

    async fn login(&mut self, request_id: i32, password: &str) -> Result<(), RconError> {
        let frame = protocol::encode(request_id, PacketType::LOGIN, password)?;
        let stream = self.stream_mut()?;
        write_frame(stream, &frame).await?;

        loop {
            let reply = read_packet(stream).await?;
            if reply.request_id == AUTH_FAILED_ID {
                return Err(RconError::Authentication);
            }
            if reply.request_id != request_id {
                return Err(DecodeError::UnexpectedRequestId {
                    expected: request_id,
                    actual: reply.request_id,
                }
                .into());
            }
            if reply.packet_type == PacketType::AUTH_RESPONSE {
                return Ok(());
            }
            // Source servers send an empty response value ahead of the auth response
            trace!(packet_type = reply.packet_type.code(), "Skipping pre-auth packet");
        }
    }

    /// Run `command` and return its full output.
    ///
    /// The command is followed by the configured probe packet; fragments
    /// carrying the command's id are concatenated in arrival order until the
    /// probe's reply shows up. Any failure mid-exchange faults the connection,
    /// so a partial reply is never returned.
    #[instrument(skip_all, fields(len = command.len()))]
    pub async fn execute(&mut self, command: &str, timeout: Duration) -> Result<String, RconError> {
        self.expect_state(ConnectionState::Ready)?;

        let command_id = self.ids.next_id();
        let probe_id = self.ids.next_id();
        // Encode both up front so a bad command leaves the connection usable
        let mut frames = protocol::encode(command_id, PacketType::COMMAND, command)?;
        frames.extend(protocol::encode(probe_id, self.probe.packet_type, &self.probe.body)?);

        let result = match tokio::time::timeout(timeout, self.exchange(&frames, command_id, probe_id)).await {
            Ok(result) => result,
            Err(_) => Err(RconError::Timeout(timeout)),
        };

        if let Err(e) = &result {
            if e.is_connection_fatal() {
                warn!(error = %e, "RCON exchange failed, dropping connection");
                self.fault();
            }
        }
        result
    }

    async fn exchange(&mut self, frames: &[u8], command_id: i32, probe_id: i32) -> Result<String, RconError> {
        let finished_id = self.finished_marker_id;
        let stream = self.stream_mut()?;
        write_frame(stream, frames).await?;

        let mut output = String::new();
        let mut fragments = 0usize;
        loop {
            let payload = read_frame(stream).await?;
            if let Some(id) = finished_id.filter(|&id| protocol::payload_request_id(&payload) == Some(id)) {
                // Source sends a second, binary-bodied reply to an empty response value
                trace!(request_id = id, len = payload.len(), "Dropping late reply to a finished command");
                continue;
            }

            // A broken fragment loses the whole reply
            let packet = protocol::decode_payload(&payload)
                .map_err(|e| RconError::ConnectionLost(format!("malformed reply packet: {e}")))?;
            if packet.request_id == probe_id {
                break;
            }
            if packet.request_id == command_id {
                output.push_str(&packet.body);
                fragments += 1;
            } else if packet.request_id == AUTH_FAILED_ID {
                return Err(RconError::Authentication);
            } else {
                debug!(request_id = packet.request_id, "Ignoring packet for unknown request");
            }
        }

        self.finished_marker_id = Some(probe_id);
        debug!(fragments, len = output.len(), "Command response complete");
        Ok(output)
    }

    /// Shut the socket down. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "Error while closing RCON socket");
            }
        }
        if self.state != ConnectionState::Faulted {
            self.state = ConnectionState::Disconnected;
        }
    }

    fn stream_mut(&mut self) -> Result<&mut S, RconError> {
        self.stream
            .as_mut()
            .ok_or_else(|| RconError::ConnectionLost("socket already closed".to_string()))
    }
}

impl<S> Connection<S> {
    fn expect_state(&self, expected: ConnectionState) -> Result<(), RconError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RconError::InvalidState {
                actual: self.state,
                expected,
            })
        }
    }

    /// Enter the terminal state. Dropping the stream closes the socket.
    fn fault(&mut self) {
        self.state = ConnectionState::Faulted;
        self.stream = None;
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> Transport for Connection<S> {
    async fn execute(&mut self, command: &str, timeout: Duration) -> Result<String, RconError> {
        Connection::execute(self, command, timeout).await
    }

    async fn close(&mut self) {
        Connection::close(self).await;
    }

    fn is_ready(&self) -> bool {
        Connection::is_ready(self)
    }
}

/// Opens authenticated TCP connections to one RCON endpoint.
#[derive(Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    password: String,
    connect_timeout: Duration,
    probe: Probe,
}

impl fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpConnector")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("probe", &self.probe)
            .finish()
    }
}

impl TcpConnector {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        password: impl Into<String>,
        connect_timeout: Duration,
        probe: Probe,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            connect_timeout,
            probe,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, RconError> {
        let mut connection = Connection::new(self.probe.clone());
        connection
            .connect(&self.host, self.port, self.connect_timeout)
            .await?;
        connection
            .authenticate(&self.password, self.connect_timeout)
            .await?;
        Ok(Box::new(connection))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MockBehavior, MockServer};
    use crate::transport::{write_packet, Packet};

    const TIMEOUT: Duration = Duration::from_secs(2);

    /// Connection wired to an in-memory mock server.
    fn duplex_connection(behavior: MockBehavior) -> Connection<tokio::io::DuplexStream> {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(testing::serve(server, behavior, Default::default()));
        Connection::from_stream(client, Probe::default())
    }

    async fn ready_connection() -> Connection<tokio::io::DuplexStream> {
        let mut conn = duplex_connection(MockBehavior::default());
        conn.authenticate(testing::PASSWORD, TIMEOUT).await.unwrap();
        conn
    }

    #[test]
    fn request_ids_wrap_to_one() {
        let mut ids = RequestIds::starting_at(i32::MAX - 1);
        assert_eq!(ids.next_id(), i32::MAX - 1);
        assert_eq!(ids.next_id(), i32::MAX);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);

        assert_eq!(RequestIds::starting_at(-5).next_id(), 1);
    }

    #[tokio::test]
    async fn authenticate_reaches_ready() {
        let conn = ready_connection().await;
        assert_eq!(conn.state(), ConnectionState::Ready);
    }

    #[tokio::test]
    async fn wrong_password_faults_connection() {
        let mut conn = duplex_connection(MockBehavior::default());
        let err = conn.authenticate("wrong", TIMEOUT).await.unwrap_err();

        assert!(matches!(err, RconError::Authentication));
        assert_eq!(conn.state(), ConnectionState::Faulted);

        let err = conn.execute("list", TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            RconError::InvalidState {
                actual: ConnectionState::Faulted,
                expected: ConnectionState::Ready
            }
        ));
    }

    #[tokio::test]
    async fn single_packet_response() {
        let mut conn = ready_connection().await;
        let output = conn.execute("list", TIMEOUT).await.unwrap();
        assert_eq!(output, "ok: list");
        assert!(conn.is_ready());
    }

    #[tokio::test]
    async fn multi_packet_response_is_reassembled() {
        let mut conn = ready_connection().await;
        let output = conn
            .execute("multi Part 1: ,Part 2: ,Part 3", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(output, "Part 1: Part 2: Part 3");

        // The probe reply was consumed; the next exchange is not polluted.
        assert_eq!(conn.execute("list", TIMEOUT).await.unwrap(), "ok: list");
    }

    #[tokio::test]
    async fn exchange_survives_request_id_wrap() {
        let mut conn = duplex_connection(MockBehavior::default())
            .with_request_ids(RequestIds::starting_at(i32::MAX - 1));
        conn.authenticate(testing::PASSWORD, TIMEOUT).await.unwrap();

        // Login took MAX - 1, so the command gets MAX and the probe wraps to 1
        assert_eq!(conn.execute("multi a,b", TIMEOUT).await.unwrap(), "ab");
        assert_eq!(conn.execute("list", TIMEOUT).await.unwrap(), "ok: list");
    }

    #[tokio::test]
    async fn empty_response_is_empty_string() {
        let mut conn = ready_connection().await;
        assert_eq!(conn.execute("multi", TIMEOUT).await.unwrap(), "");
    }

    #[tokio::test]
    async fn peer_close_mid_exchange_is_connection_lost() {
        let mut conn = ready_connection().await;
        let err = conn.execute("drop", TIMEOUT).await.unwrap_err();

        assert!(matches!(err, RconError::ConnectionLost(_)));
        assert_eq!(conn.state(), ConnectionState::Faulted);
    }

    #[tokio::test]
    async fn silent_server_times_out_and_faults() {
        let mut conn = ready_connection().await;
        let timeout = Duration::from_millis(100);
        let err = conn.execute("hang", timeout).await.unwrap_err();

        assert!(matches!(err, RconError::Timeout(t) if t == timeout));
        assert_eq!(conn.state(), ConnectionState::Faulted);
    }

    #[tokio::test]
    async fn oversized_command_keeps_connection_ready() {
        let mut conn = ready_connection().await;
        let err = conn.execute(&"x".repeat(5000), TIMEOUT).await.unwrap_err();

        assert!(matches!(err, RconError::Encoding(_)));
        assert!(conn.is_ready());
        assert_eq!(conn.execute("list", TIMEOUT).await.unwrap(), "ok: list");
    }

    #[tokio::test]
    async fn source_style_login_and_stray_packets() {
        let (client, mut server) = tokio::io::duplex(4096);
        let script = tokio::spawn(async move {
            let login = read_packet(&mut server).await.unwrap();
            assert_eq!(login.packet_type, PacketType::LOGIN);
            assert_eq!(login.body, "pw");
            let id = login.request_id;
            write_packet(&mut server, &Packet::new(id, PacketType::RESPONSE_VALUE, ""))
                .await
                .unwrap();
            write_packet(&mut server, &Packet::new(id, PacketType::AUTH_RESPONSE, ""))
                .await
                .unwrap();

            let command = read_packet(&mut server).await.unwrap();
            let probe = read_packet(&mut server).await.unwrap();
            assert_eq!(command.body, "status");
            assert_eq!(probe.packet_type, PacketType::RESPONSE_VALUE);
            assert_ne!(command.request_id, probe.request_id);

            for packet in [
                Packet::new(command.request_id, PacketType::RESPONSE_VALUE, "host: "),
                Packet::new(9999, PacketType::RESPONSE_VALUE, "stray"),
                Packet::new(command.request_id, PacketType::RESPONSE_VALUE, "test"),
                Packet::new(probe.request_id, PacketType::RESPONSE_VALUE, ""),
            ] {
                write_packet(&mut server, &packet).await.unwrap();
            }
        });

        let probe = Probe {
            packet_type: PacketType::RESPONSE_VALUE,
            body: String::new(),
        };
        let mut conn = Connection::from_stream(client, probe);
        conn.authenticate("pw", TIMEOUT).await.unwrap();
        assert_eq!(conn.execute("status", TIMEOUT).await.unwrap(), "host: test");
        script.await.unwrap();
    }

    /// Answer the login on the server end of a duplex pair.
    async fn accept_login(server: &mut tokio::io::DuplexStream) {
        let login = read_packet(server).await.unwrap();
        write_packet(server, &Packet::new(login.request_id, PacketType::AUTH_RESPONSE, ""))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn malformed_fragment_is_connection_lost() {
        let (client, mut server) = tokio::io::duplex(4096);
        let script = tokio::spawn(async move {
            accept_login(&mut server).await;
            let command = read_packet(&mut server).await.unwrap();
            let _marker = read_packet(&mut server).await.unwrap();

            let good = Packet::new(command.request_id, PacketType::RESPONSE_VALUE, "part1");
            write_packet(&mut server, &good).await.unwrap();
            let mut bad = protocol::encode(command.request_id, PacketType::RESPONSE_VALUE, "part2").unwrap();
            *bad.last_mut().unwrap() = b'!';
            server.write_all(&bad).await.unwrap();
            server
        });

        let mut conn = Connection::from_stream(client, Probe::default());
        conn.authenticate("pw", TIMEOUT).await.unwrap();
        let err = conn.execute("status", TIMEOUT).await.unwrap_err();

        assert!(matches!(err, RconError::ConnectionLost(_)), "got {err:?}");
        assert_eq!(conn.state(), ConnectionState::Faulted);
        script.await.unwrap();
    }

    #[tokio::test]
    async fn late_binary_reply_from_source_server_is_skipped() {
        let (client, mut server) = tokio::io::duplex(4096);
        let script = tokio::spawn(async move {
            accept_login(&mut server).await;

            let command = read_packet(&mut server).await.unwrap();
            let marker = read_packet(&mut server).await.unwrap();
            for packet in [
                Packet::new(command.request_id, PacketType::RESPONSE_VALUE, "players: 3"),
                Packet::new(marker.request_id, PacketType::RESPONSE_VALUE, ""),
            ] {
                write_packet(&mut server, &packet).await.unwrap();
            }
            // Source follows the mirrored empty value with a non-text body
            let mut junk = Vec::new();
            junk.extend_from_slice(&18i32.to_le_bytes());
            junk.extend_from_slice(&marker.request_id.to_le_bytes());
            junk.extend_from_slice(&PacketType::RESPONSE_VALUE.0.to_le_bytes());
            junk.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
            assert!(protocol::decode_payload(&junk[4..]).is_err());
            server.write_all(&junk).await.unwrap();

            let command = read_packet(&mut server).await.unwrap();
            let marker = read_packet(&mut server).await.unwrap();
            for packet in [
                Packet::new(command.request_id, PacketType::RESPONSE_VALUE, "map: de_dust2"),
                Packet::new(marker.request_id, PacketType::RESPONSE_VALUE, ""),
            ] {
                write_packet(&mut server, &packet).await.unwrap();
            }
            server
        });

        let source = Probe {
            packet_type: PacketType::RESPONSE_VALUE,
            body: String::new(),
        };
        let mut conn = Connection::from_stream(client, source);
        conn.authenticate("pw", TIMEOUT).await.unwrap();
        assert_eq!(conn.execute("status", TIMEOUT).await.unwrap(), "players: 3");
        assert_eq!(conn.execute("map", TIMEOUT).await.unwrap(), "map: de_dust2");
        assert!(conn.is_ready());
        script.await.unwrap();
    }

    #[tokio::test]
    async fn auth_failure_id_mid_exchange_is_authentication() {
        let (client, mut server) = tokio::io::duplex(4096);
        let script = tokio::spawn(async move {
            accept_login(&mut server).await;
            let _command = read_packet(&mut server).await.unwrap();
            let _marker = read_packet(&mut server).await.unwrap();
            write_packet(&mut server, &Packet::new(AUTH_FAILED_ID, PacketType::RESPONSE_VALUE, ""))
                .await
                .unwrap();
            server
        });

        let mut conn = Connection::from_stream(client, Probe::default());
        conn.authenticate("pw", TIMEOUT).await.unwrap();
        let err = conn.execute("status", TIMEOUT).await.unwrap_err();

        assert!(matches!(err, RconError::Authentication));
        assert_eq!(conn.state(), ConnectionState::Faulted);
        script.await.unwrap();
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut conn = ready_connection().await;
        conn.close().await;
        conn.close().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(conn.execute("list", TIMEOUT).await.is_err());
    }

    #[tokio::test]
    async fn tcp_connector_against_mock_server() {
        let server = MockServer::start(MockBehavior::default()).await;
        let connector = TcpConnector::new(
            "127.0.0.1",
            server.port(),
            testing::PASSWORD,
            TIMEOUT,
            Probe::default(),
        );

        let mut transport = connector.connect().await.unwrap();
        assert!(transport.is_ready());
        assert_eq!(transport.execute("list", TIMEOUT).await.unwrap(), "ok: list");
        transport.close().await;
        assert!(!transport.is_ready());
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        // Bind then drop a listener to get a port nobody is listening on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut conn = Connection::new(Probe::default());
        let err = conn.connect("127.0.0.1", port, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, RconError::Connect { .. }));
        assert_eq!(conn.state(), ConnectionState::Faulted);
    }

    #[test]
    fn connector_debug_hides_password() {
        let connector = TcpConnector::new("localhost", 25575, "hunter2", TIMEOUT, Probe::default());
        let debug = format!("{connector:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(connector.endpoint(), "localhost:25575");
    }
}
