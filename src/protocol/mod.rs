// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Nibe serial wire protocol: constants, checksums, frames, and the
//! incremental decoder.
//!
//! The pump talks to its accessory modules over a shared serial line.
//! Frames sent by the pump start with `0x5C`, carry a sub-device address
//! and command, and end with an XOR checksum; frames sent by the master
//! start with `0xC0` and omit the address. Zero-length read/write request
//! frames are *tokens*: invitations for the master to transmit one queued
//! request.
//!
//! # Decoding
//!
//! - [`Decoder`]: resumable state machine for continuous byte streams.
//! - [`Frame::parse`]: one-shot validation for transports that preserve
//!   message boundaries.
//!
//! Both paths verify the checksum (accepting the documented `0x5C`/`0xC5`
//! substitution) and collapse the escape duplication applied to start-byte
//! values inside the frame body.

pub mod constants;

mod checksum;
mod decoder;
mod frame;

pub use checksum::{checksum_matches, xor_checksum};
pub use decoder::{Decoder, DecoderEvent, State};
pub use frame::{Address, Frame, FrameKind, encode_request, encode_response};
