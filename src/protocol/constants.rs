// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire constants for the Nibe serial protocol.
//!
//! Two frame grammars share the line: response-direction frames sent by
//! the pump (start byte `0x5C`) and request-direction frames sent by the
//! master (start byte `0xC0`). All multi-byte payload values are
//! little-endian.

// ============================================================
// Start bytes
// ============================================================

/// Start byte of response-direction frames (pump to master).
pub const FRAME_START_RES: u8 = 0x5C;

/// Start byte of request-direction frames (master to pump).
pub const FRAME_START_REQ: u8 = 0xC0;

/// Byte transmitted in place of a checksum that computes to
/// [`FRAME_START_RES`].
pub const CHECKSUM_SUBSTITUTE: u8 = 0xC5;

// ============================================================
// Sub-device addresses (response direction)
// ============================================================

/// MODBUS 40 communication module.
pub const ADDR_MODBUS40: u8 = 0x20;

/// RMU 40 room unit.
pub const ADDR_RMU40: u8 = 0x19;

/// SMS 40 communication module.
pub const ADDR_SMS40: u8 = 0x16;

// ============================================================
// Commands
// ============================================================

/// Periodic register data read-out from the MODBUS 40 module.
pub const CMD_DATA_READ_OUT: u8 = 0x68;

/// Read request; length zero marks a read token.
pub const CMD_READ_REQUEST: u8 = 0x69;

/// Response to a read request.
pub const CMD_READ_RESPONSE: u8 = 0x6A;

/// Write request; length zero marks a write token.
pub const CMD_WRITE_REQUEST: u8 = 0x6B;

/// Response to a write request.
pub const CMD_WRITE_RESPONSE: u8 = 0x6C;

/// Data message from the RMU 40 room unit.
pub const CMD_RMU_DATA_MSG: u8 = 0x62;

// ============================================================
// Acknowledgement bytes
// ============================================================

/// Positive acknowledgement written back to the line.
pub const ACK: u8 = 0x06;

/// Negative acknowledgement written back to the line.
pub const NAK: u8 = 0x15;

// ============================================================
// Response frame layout
// ============================================================

/// Offset of the sub-device address byte.
pub const OFFSET_ADDRESS: usize = 2;

/// Offset of the command byte.
pub const OFFSET_COMMAND: usize = 3;

/// Offset of the declared payload length byte.
pub const OFFSET_LENGTH: usize = 4;

/// Offset of the first payload byte.
pub const OFFSET_PAYLOAD: usize = 5;

/// Smallest possible response frame: header plus checksum, no payload.
pub const MIN_FRAME_LEN: usize = 6;

/// Upper bound on a single frame. A candidate that grows past this size
/// without resolving is abandoned and the decoder resyncs.
pub const MAX_FRAME_LEN: usize = 100;

// ============================================================
// Request frame layout
// ============================================================

/// Offset of the command byte in a request frame.
pub const REQ_OFFSET_COMMAND: usize = 1;

/// Offset of the declared payload length byte in a request frame.
pub const REQ_OFFSET_LENGTH: usize = 2;

/// Offset of the first payload byte in a request frame.
pub const REQ_OFFSET_PAYLOAD: usize = 3;
