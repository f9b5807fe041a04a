// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XOR checksum over frame contents.
//!
//! Response frames checksum bytes 2 through the end of the payload
//! (address, command, length, payload); request frames checksum from the
//! start byte through the end of the payload. A computed checksum equal
//! to the response start byte is transmitted as [`CHECKSUM_SUBSTITUTE`]
//! so that the value never appears bare inside a frame, and receivers
//! must accept that substitution.

use super::constants::{CHECKSUM_SUBSTITUTE, FRAME_START_RES};

/// Computes the XOR checksum of a byte range.
///
/// The caller slices the frame to the range the grammar defines for the
/// direction in question.
#[must_use]
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Returns `true` if a received checksum byte is acceptable for a
/// computed one.
///
/// Besides exact equality, a computed checksum of `0x5C` matches a
/// received `0xC5`, because senders substitute the start-byte value on
/// the wire.
#[must_use]
pub fn checksum_matches(computed: u8, received: u8) -> bool {
    computed == received || (computed == FRAME_START_RES && received == CHECKSUM_SUBSTITUTE)
}
