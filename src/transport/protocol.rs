//! RCON packet format.
//!
//! Every packet is framed as:
//! `[size: i32 LE][request id: i32 LE][type: i32 LE][body][0x00][0x00]`
//! where `size` counts every byte after the size field itself.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};

/// Byte length of the leading size field.
pub const SIZE_FIELD_LEN: usize = 4;

/// Request id + type + body terminator + pad.
pub const PACKET_OVERHEAD: usize = 10;

/// Largest body accepted in either direction.
pub const MAX_BODY_SIZE: usize = 4096;

/// Largest value the size field may declare.
pub const MAX_PACKET_SIZE: usize = MAX_BODY_SIZE + PACKET_OVERHEAD;

/// Request id the server echoes when a login is rejected.
pub const AUTH_FAILED_ID: i32 = -1;

/// Wire code carried in a packet's type field.
///
/// Some codes are shared between directions (a command request and an auth
/// response are both `2`), so this is a transparent wrapper rather than an
/// exhaustive enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketType(pub i32);

impl PacketType {
    /// Server reply carrying (part of) a command's output.
    pub const RESPONSE_VALUE: Self = Self(0);
    /// Client command request.
    pub const COMMAND: Self = Self(2);
    /// Server reply to a login request.
    pub const AUTH_RESPONSE: Self = Self(2);
    /// Client login request carrying the password.
    pub const LOGIN: Self = Self(3);
    /// Type the server does not recognise; used to mark the end of a response.
    pub const PROBE: Self = Self(200);

    pub const fn code(self) -> i32 {
        self.0
    }
}

/// One decoded RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub packet_type: PacketType,
    pub body: String,
}

impl Packet {
    pub fn new(request_id: i32, packet_type: PacketType, body: impl Into<String>) -> Self {
        Self {
            request_id,
            packet_type,
            body: body.into(),
        }
    }

    /// Value of the size field for this packet.
    pub fn size(&self) -> usize {
        self.body.len() + PACKET_OVERHEAD
    }

    /// Serialize to wire bytes, size prefix included.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode(self.request_id, self.packet_type, &self.body)
    }
}

/// Build the wire bytes for one packet.
///
/// Bodies longer than [`MAX_BODY_SIZE`] or containing a zero byte are
/// rejected rather than truncated.
pub fn encode(request_id: i32, packet_type: PacketType, body: &str) -> Result<Vec<u8>, EncodeError> {
    let body = body.as_bytes();
    if body.len() > MAX_BODY_SIZE {
        return Err(EncodeError::BodyTooLarge {
            size: body.len(),
            max: MAX_BODY_SIZE,
        });
    }
    if let Some(offset) = body.iter().position(|&b| b == 0) {
        return Err(EncodeError::InteriorNul(offset));
    }

    let size = body.len() + PACKET_OVERHEAD;
    let size_field = i32::try_from(size).map_err(|_| EncodeError::BodyTooLarge {
        size: body.len(),
        max: MAX_BODY_SIZE,
    })?;
    let mut bytes = Vec::with_capacity(SIZE_FIELD_LEN + size);
    bytes.extend_from_slice(&size_field.to_le_bytes());
    bytes.extend_from_slice(&request_id.to_le_bytes());
    bytes.extend_from_slice(&packet_type.code().to_le_bytes());
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(&[0, 0]);
    Ok(bytes)
}

/// Parse one complete packet, size prefix included.
pub fn decode(bytes: &[u8]) -> Result<Packet, DecodeError> {
    if bytes.len() < SIZE_FIELD_LEN {
        return Err(DecodeError::LengthMismatch {
            declared: SIZE_FIELD_LEN,
            actual: bytes.len(),
        });
    }
    let declared = checked_size(read_i32(bytes, 0))?;
    let rest = &bytes[SIZE_FIELD_LEN..];
    if rest.len() != declared {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: rest.len(),
        });
    }
    decode_payload(rest)
}

/// Validate a size field read off the wire.
pub(crate) fn checked_size(size: i32) -> Result<usize, DecodeError> {
    match usize::try_from(size) {
        Ok(size) if (PACKET_OVERHEAD..=MAX_PACKET_SIZE).contains(&size) => Ok(size),
        _ => Err(DecodeError::InvalidSize(size)),
    }
}

/// Parse the bytes that follow the size field. `payload.len()` must already
/// match the declared size.
pub(crate) fn decode_payload(payload: &[u8]) -> Result<Packet, DecodeError> {
    let len = payload.len();
    if len < PACKET_OVERHEAD {
        return Err(DecodeError::LengthMismatch {
            declared: PACKET_OVERHEAD,
            actual: len,
        });
    }

    let request_id = read_i32(payload, 0);
    let packet_type = PacketType(read_i32(payload, 4));
    let body = &payload[8..len - 2];
    if payload[len - 2..] != [0, 0] || body.contains(&0) {
        return Err(DecodeError::MissingTerminator);
    }
    let body = std::str::from_utf8(body).map_err(|_| DecodeError::InvalidUtf8)?;

    Ok(Packet {
        request_id,
        packet_type,
        body: body.to_owned(),
    })
}

/// Request id of a payload that passed [`checked_size`], read without
/// validating the body.
pub(crate) fn payload_request_id(payload: &[u8]) -> Option<i32> {
    (payload.len() >= PACKET_OVERHEAD).then(|| read_i32(payload, 0))
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
