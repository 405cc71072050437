//! Transport layer between a worker and the remote RCON server.
//!
//! Provides the `Transport` and `Connector` traits, the size-prefixed
//! packet framing functions, and the TCP implementation in `connection`.

pub mod connection;
pub mod protocol;

pub use connection::{Connection, ConnectionState, Probe, RequestIds, TcpConnector};
pub use protocol::{Packet, PacketType};

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RconError;
use protocol::SIZE_FIELD_LEN;

/// A live, exclusively owned channel to the server.
///
/// A worker holds at most one transport and drives it from a single task,
/// so implementations never see concurrent calls.
#[async_trait]
pub trait Transport: Send {
    /// Run one command and return its complete, reassembled output.
    async fn execute(&mut self, command: &str, timeout: Duration) -> Result<String, RconError>;

    /// Release the underlying socket. Safe to call more than once.
    async fn close(&mut self);

    /// Whether further commands may be issued.
    fn is_ready(&self) -> bool;
}

/// Produces authenticated transports for workers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open and authenticate a fresh transport.
    async fn connect(&self) -> Result<Box<dyn Transport>, RconError>;

    /// Human-readable address of the remote endpoint, for logs.
    fn endpoint(&self) -> String;
}

/// Write one frame and flush it.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> Result<(), RconError> {
    writer.write_all(frame).await.map_err(connection_lost)?;
    writer.flush().await.map_err(connection_lost)?;
    Ok(())
}

/// Encode and write a single packet.
pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: &Packet) -> Result<(), RconError> {
    let frame = packet.encode()?;
    write_frame(writer, &frame).await
}

/// Read exactly one size-prefixed packet.
///
/// Waits until the declared number of bytes has arrived. The size field is
/// validated before the body is read so a corrupt stream cannot trigger a
/// large allocation.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, RconError> {
    let payload = read_frame(reader).await?;
    Ok(protocol::decode_payload(&payload)?)
}

/// Read one frame's payload (everything after the size field) without
/// decoding it. The payload is at least [`protocol::PACKET_OVERHEAD`] bytes.
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, RconError> {
    let mut size_buf = [0u8; SIZE_FIELD_LEN];
    reader.read_exact(&mut size_buf).await.map_err(connection_lost)?;
    let size = protocol::checked_size(i32::from_le_bytes(size_buf))?;

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload).await.map_err(connection_lost)?;
    Ok(payload)
}

pub(crate) fn connection_lost(err: std::io::Error) -> RconError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        RconError::ConnectionLost("server closed the connection".to_string())
    } else {
        RconError::ConnectionLost(err.to_string())
    }
}
