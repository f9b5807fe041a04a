// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `nibe_lib` library.
//!
//! This module provides the error hierarchy for handling failures across
//! the library: frame validation, typed message parsing, and link-level
//! protocol operations.

use thiserror::Error;

use crate::protocol::FrameKind;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when decoding
/// or exchanging frames with a Nibe heat pump.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while validating a raw frame.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Error occurred while parsing a typed message from a frame.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during link-level communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors related to raw frame validation and encoding.
///
/// These errors are produced when a complete byte buffer fails the frame
/// grammar checks, or when an outgoing frame cannot be encoded within the
/// protocol bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The first byte is not the expected start byte.
    #[error("invalid start byte: 0x{actual:02X}")]
    InvalidStartByte {
        /// The byte found at the start position.
        actual: u8,
    },

    /// The reserved byte after the start byte is not 0x00.
    #[error("invalid reserved byte: 0x{actual:02X}")]
    InvalidReservedByte {
        /// The byte found at the reserved position.
        actual: u8,
    },

    /// The buffer ends before the declared frame length.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Total frame size implied by the header, or the minimum frame
        /// size when the header itself is incomplete.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// The trailing checksum byte does not match the computed checksum.
    #[error("checksum mismatch: computed 0x{computed:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the frame contents.
        computed: u8,
        /// Checksum byte carried by the frame.
        received: u8,
    },

    /// The buffer contains bytes beyond the end of the frame.
    #[error("trailing data: frame ends at byte {frame_len}, buffer has {actual}")]
    TrailingData {
        /// Length of the complete frame at the start of the buffer.
        frame_len: usize,
        /// Number of bytes in the buffer.
        actual: usize,
    },

    /// The payload is too large to encode within the frame size bound.
    #[error("payload too long: {len} bytes after escaping, maximum is {max}")]
    PayloadTooLong {
        /// Payload size after escape duplication.
        len: usize,
        /// Maximum payload size that fits the frame bound.
        max: usize,
    },
}

/// Errors related to parsing typed messages out of accepted frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame kind has no typed message representation.
    #[error("unexpected frame kind: {kind}")]
    UnexpectedKind {
        /// The classification of the offending frame.
        kind: FrameKind,
    },

    /// The payload does not have the size the message type requires.
    #[error("invalid payload length: expected {expected} bytes, got {actual}")]
    PayloadLength {
        /// Number of payload bytes the message type requires.
        expected: usize,
        /// Number of payload bytes present.
        actual: usize,
    },
}

/// Errors related to link-level communication with the pump.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading from or writing to the transport stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The pending request queue is at capacity.
    #[error("request queue is full (capacity {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The pump answered a write request with a non-success status.
    #[error("write rejected by the pump")]
    WriteRejected,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Protocol(ProtocolError::Io(err))
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
