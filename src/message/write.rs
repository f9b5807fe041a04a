// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register write request and response.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::protocol::constants::CMD_WRITE_REQUEST;
use crate::protocol::encode_request;
use crate::registers::Coil;

/// A request to change one register, sent in answer to a write token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Register to write.
    pub coil: Coil,
    /// Raw value to store, little-endian on the wire.
    pub value: u32,
}

impl WriteRequest {
    /// Creates a write request for the given register and raw value.
    #[must_use]
    pub fn new(coil: Coil, value: u32) -> Self {
        Self { coil, value }
    }

    /// Encodes the request as a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let coil = self.coil.to_le_bytes();
        let value = self.value.to_le_bytes();
        let payload = [
            coil[0], coil[1], value[0], value[1], value[2], value[3],
        ];
        encode_request(CMD_WRITE_REQUEST, &payload)
    }
}

/// The pump's answer to a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Whether the pump accepted the write.
    pub success: bool,
}

impl WriteResponse {
    /// Parses the payload of a write response frame.
    ///
    /// The first payload byte carries the status; 1 means accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::PayloadLength`] if the payload is empty.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ParseError> {
        let Some(&status) = payload.first() else {
            return Err(ParseError::PayloadLength {
                expected: 1,
                actual: 0,
            });
        };
        Ok(Self {
            success: status == 1,
        })
    }
}
