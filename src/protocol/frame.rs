// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame vocabulary: sub-device addresses, frame classification,
//! complete-buffer validation, and the validated [`Frame`] type.

use std::fmt;

use bytes::Bytes;

use crate::error::FrameError;

use super::checksum::{checksum_matches, xor_checksum};
use super::constants::{
    ADDR_MODBUS40, ADDR_RMU40, ADDR_SMS40, CHECKSUM_SUBSTITUTE, CMD_DATA_READ_OUT,
    CMD_READ_REQUEST, CMD_READ_RESPONSE, CMD_RMU_DATA_MSG, CMD_WRITE_REQUEST, CMD_WRITE_RESPONSE,
    FRAME_START_REQ, FRAME_START_RES, MAX_FRAME_LEN, MIN_FRAME_LEN, OFFSET_ADDRESS,
    OFFSET_COMMAND, OFFSET_LENGTH, OFFSET_PAYLOAD,
};

/// Sub-device address carried in response-direction frames.
///
/// The pump polls its accessory modules by address; the master answers on
/// behalf of whichever module it emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// MODBUS 40 communication module (0x20).
    Modbus40,
    /// RMU 40 room unit (0x19).
    Rmu40,
    /// SMS 40 communication module (0x16).
    Sms40,
    /// An address this library has no vocabulary for.
    Unknown(u8),
}

impl Address {
    /// Maps a wire byte to an address.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            ADDR_MODBUS40 => Self::Modbus40,
            ADDR_RMU40 => Self::Rmu40,
            ADDR_SMS40 => Self::Sms40,
            other => Self::Unknown(other),
        }
    }

    /// Returns the wire byte for this address.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Modbus40 => ADDR_MODBUS40,
            Self::Rmu40 => ADDR_RMU40,
            Self::Sms40 => ADDR_SMS40,
            Self::Unknown(byte) => byte,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modbus40 => write!(f, "MODBUS40"),
            Self::Rmu40 => write!(f, "RMU40"),
            Self::Sms40 => write!(f, "SMS40"),
            Self::Unknown(byte) => write!(f, "0x{byte:02X}"),
        }
    }
}

/// Classification of a frame by its header bytes.
///
/// Classification keys on the start byte, the sub-device address, the
/// command, and whether the declared length is zero; it never looks at
/// payload contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Periodic register broadcast from the MODBUS 40 module.
    DataReadOut,
    /// Zero-length read request: the pump grants one read slot.
    ReadToken,
    /// Zero-length write request: the pump grants one write slot.
    WriteToken,
    /// Read request carrying a register address.
    ReadRequest,
    /// Answer to a read request.
    ReadResponse,
    /// Write request carrying a register address and value.
    WriteRequest,
    /// Answer to a write request.
    WriteResponse,
    /// Data message from the RMU 40 room unit.
    RmuDataReadOut,
    /// No classification matched.
    Unknown,
}

impl FrameKind {
    /// Classifies a buffer holding at least the frame header.
    ///
    /// Buffers too short to carry the header bytes classify as
    /// [`FrameKind::Unknown`].
    #[must_use]
    pub fn classify(bytes: &[u8]) -> Self {
        match *bytes {
            [FRAME_START_RES, 0x00, address, command, length, ..] => {
                match (address, command, length) {
                    (ADDR_MODBUS40, CMD_DATA_READ_OUT, _) => Self::DataReadOut,
                    (ADDR_MODBUS40, CMD_READ_REQUEST, 0) => Self::ReadToken,
                    (ADDR_MODBUS40, CMD_READ_REQUEST, _) => Self::ReadRequest,
                    (ADDR_MODBUS40, CMD_READ_RESPONSE, _) => Self::ReadResponse,
                    (ADDR_MODBUS40, CMD_WRITE_REQUEST, 0) => Self::WriteToken,
                    (ADDR_MODBUS40, CMD_WRITE_REQUEST, _) => Self::WriteRequest,
                    (ADDR_MODBUS40, CMD_WRITE_RESPONSE, _) => Self::WriteResponse,
                    (ADDR_RMU40, CMD_RMU_DATA_MSG, _) => Self::RmuDataReadOut,
                    _ => Self::Unknown,
                }
            }
            [FRAME_START_REQ, command, ..] => match command {
                CMD_READ_REQUEST => Self::ReadRequest,
                CMD_WRITE_REQUEST => Self::WriteRequest,
                _ => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for the two token kinds.
    #[must_use]
    pub fn is_token(self) -> bool {
        matches!(self, Self::ReadToken | Self::WriteToken)
    }

    /// Returns the kind as a static string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataReadOut => "data read-out",
            Self::ReadToken => "read token",
            Self::WriteToken => "write token",
            Self::ReadRequest => "read request",
            Self::ReadResponse => "read response",
            Self::WriteRequest => "write request",
            Self::WriteResponse => "write response",
            Self::RmuDataReadOut => "RMU data read-out",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of the incremental frame-validity evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameCheck {
    /// More bytes are needed before a verdict is possible.
    Incomplete,
    /// The buffer cannot begin a valid frame.
    Invalid,
    /// The frame is structurally complete but the checksum does not match.
    BadChecksum { computed: u8, received: u8 },
    /// A complete valid frame of the given total size starts the buffer.
    Complete(usize),
}

/// Evaluates whether a buffer begins a valid response-direction frame.
///
/// The evaluation is positional: start byte, reserved byte, then once six
/// bytes are present the declared length decides where the checksum sits.
pub(crate) fn check_frame(bytes: &[u8]) -> FrameCheck {
    let Some(&first) = bytes.first() else {
        return FrameCheck::Incomplete;
    };
    if first != FRAME_START_RES {
        return FrameCheck::Invalid;
    }
    if bytes.len() >= 2 && bytes[1] != 0x00 {
        return FrameCheck::Invalid;
    }
    if bytes.len() < MIN_FRAME_LEN {
        return FrameCheck::Incomplete;
    }
    let length = usize::from(bytes[OFFSET_LENGTH]);
    let total = length + MIN_FRAME_LEN;
    if bytes.len() < total {
        return FrameCheck::Incomplete;
    }
    let computed = xor_checksum(&bytes[OFFSET_ADDRESS..OFFSET_PAYLOAD + length]);
    let received = bytes[OFFSET_PAYLOAD + length];
    if checksum_matches(computed, received) {
        FrameCheck::Complete(total)
    } else {
        FrameCheck::BadChecksum { computed, received }
    }
}

/// Collapses doubled start-byte occurrences in the frame body.
///
/// The scan covers everything between the start byte and the trailing
/// checksum byte. A run of consecutive `0x5C` bytes collapses to a single
/// byte, so a second pass over the output never changes it. The declared
/// length shrinks by one per removed byte.
fn collapse_escapes(wire: &[u8]) -> Vec<u8> {
    let end = wire.len() - 1;
    let mut out = Vec::with_capacity(wire.len());
    out.push(wire[0]);
    let mut removed = 0usize;
    let mut i = 1;
    while i < end {
        out.push(wire[i]);
        if wire[i] == FRAME_START_RES {
            let mut j = i + 1;
            while j < end && wire[j] == FRAME_START_RES {
                j += 1;
            }
            removed += j - i - 1;
            i = j;
        } else {
            i += 1;
        }
    }
    out.push(wire[end]);
    if removed > 0 {
        // Safe: a frame is at most 100 bytes, so the removed count fits in u8
        #[allow(clippy::cast_possible_truncation)]
        let removed = removed as u8;
        out[OFFSET_LENGTH] = out[OFFSET_LENGTH].saturating_sub(removed);
    }
    out
}

/// A validated response-direction frame with escape duplication removed.
///
/// Frames are cheap to clone; the underlying buffer is shared. The length
/// byte and payload reflect the deduplicated content, while the checksum
/// byte is the one received on the wire.
///
/// # Examples
///
/// ```
/// use nibe_lib::protocol::{Frame, FrameKind};
///
/// let frame = Frame::parse(&[0x5C, 0x00, 0x20, 0x68, 0x02, 0xAA, 0xBB, 0x5B])?;
/// assert_eq!(frame.kind(), FrameKind::DataReadOut);
/// assert_eq!(frame.payload(), &[0xAA, 0xBB]);
/// # Ok::<(), nibe_lib::FrameError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Validates a complete, independently delimited buffer as a single
    /// frame.
    ///
    /// This is the entry point for transports that preserve message
    /// boundaries (for example a UDP gateway); stream transports use
    /// [`Decoder`](super::Decoder) instead.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] describing the first grammar violation:
    /// wrong start byte, non-zero reserved byte, truncation, checksum
    /// mismatch, or trailing bytes beyond the frame end.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        match check_frame(bytes) {
            FrameCheck::Complete(total) if total == bytes.len() => Ok(Self::from_validated(bytes)),
            FrameCheck::Complete(total) => Err(FrameError::TrailingData {
                frame_len: total,
                actual: bytes.len(),
            }),
            FrameCheck::BadChecksum { computed, received } => {
                Err(FrameError::ChecksumMismatch { computed, received })
            }
            FrameCheck::Invalid => match bytes.first() {
                Some(&byte) if byte != FRAME_START_RES => {
                    Err(FrameError::InvalidStartByte { actual: byte })
                }
                _ => Err(FrameError::InvalidReservedByte { actual: bytes[1] }),
            },
            FrameCheck::Incomplete => {
                let expected = if bytes.len() >= MIN_FRAME_LEN {
                    usize::from(bytes[OFFSET_LENGTH]) + MIN_FRAME_LEN
                } else {
                    MIN_FRAME_LEN
                };
                Err(FrameError::Truncated {
                    expected,
                    actual: bytes.len(),
                })
            }
        }
    }

    /// Wraps a wire buffer that already passed [`check_frame`], removing
    /// escape duplication.
    pub(crate) fn from_validated(wire: &[u8]) -> Self {
        Self {
            bytes: collapse_escapes(wire).into(),
        }
    }

    /// Returns the sub-device address.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_byte(self.bytes[OFFSET_ADDRESS])
    }

    /// Returns the raw address byte.
    #[must_use]
    pub fn address_byte(&self) -> u8 {
        self.bytes[OFFSET_ADDRESS]
    }

    /// Returns the command byte.
    #[must_use]
    pub fn command(&self) -> u8 {
        self.bytes[OFFSET_COMMAND]
    }

    /// Returns the deduplicated payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[OFFSET_PAYLOAD..self.bytes.len() - 1]
    }

    /// Returns the checksum byte as received on the wire.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Classifies the frame.
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        FrameKind::classify(&self.bytes)
    }

    /// Returns the full deduplicated frame bytes, header and checksum
    /// included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Builds a complete response-direction frame around a payload.
///
/// Escape duplication is applied to the payload and checksum substitution
/// to the trailing byte, producing the exact byte sequence a pump-side
/// sender puts on the wire. Intended for simulators and tests.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLong`] if the escaped frame would
/// exceed the 100-byte frame bound.
pub fn encode_response(
    address: Address,
    command: u8,
    payload: &[u8],
) -> Result<Vec<u8>, FrameError> {
    let mut escaped = Vec::with_capacity(payload.len() + 2);
    for &byte in payload {
        escaped.push(byte);
        if byte == FRAME_START_RES {
            escaped.push(byte);
        }
    }
    let max = MAX_FRAME_LEN - MIN_FRAME_LEN;
    if escaped.len() > max {
        return Err(FrameError::PayloadTooLong {
            len: escaped.len(),
            max,
        });
    }
    // Safe: bounded by max above, well under u8::MAX
    #[allow(clippy::cast_possible_truncation)]
    let length = escaped.len() as u8;

    let mut frame = Vec::with_capacity(escaped.len() + MIN_FRAME_LEN);
    frame.push(FRAME_START_RES);
    frame.push(0x00);
    frame.push(address.as_byte());
    frame.push(command);
    frame.push(length);
    frame.extend_from_slice(&escaped);
    let computed = xor_checksum(&frame[OFFSET_ADDRESS..]);
    frame.push(if computed == FRAME_START_RES {
        CHECKSUM_SUBSTITUTE
    } else {
        computed
    });
    Ok(frame)
}

/// Builds a complete request-direction frame around a payload.
///
/// Requests use the plain grammar: no escape duplication, no checksum
/// substitution, and the checksum covers every byte from the start byte
/// onward. Payloads are fixed-size register operands, so encoding cannot
/// fail.
// Safe: request payloads are at most a coil plus a 32-bit value
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn encode_request(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.push(FRAME_START_REQ);
    frame.push(command);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(xor_checksum(&frame));
    frame
}
