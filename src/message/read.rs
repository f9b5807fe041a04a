// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register read request and response.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::protocol::constants::CMD_READ_REQUEST;
use crate::protocol::encode_request;
use crate::registers::Coil;

/// A request for one register value, sent in answer to a read token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Register to read.
    pub coil: Coil,
}

impl ReadRequest {
    /// Creates a read request for the given register.
    #[must_use]
    pub fn new(coil: Coil) -> Self {
        Self { coil }
    }

    /// Encodes the request as a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        encode_request(CMD_READ_REQUEST, &self.coil.to_le_bytes())
    }
}

/// The pump's answer to a read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResponse {
    /// Register the value belongs to.
    pub coil: Coil,
    /// Raw 32-bit value, little-endian on the wire.
    pub raw: u32,
}

impl ReadResponse {
    /// Parses the payload of a read response frame.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::PayloadLength`] if the payload is shorter
    /// than the 6 bytes a register address and value occupy.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ParseError> {
        if payload.len() < 6 {
            return Err(ParseError::PayloadLength {
                expected: 6,
                actual: payload.len(),
            });
        }
        Ok(Self {
            coil: Coil::from_le_bytes([payload[0], payload[1]]),
            raw: u32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_read_request() {
        let request = ReadRequest::new(Coil::new(40004));
        assert_eq!(request.encode(), [0xC0, 0x69, 0x02, 0x44, 0x9C, 0x73]);
    }

    #[test]
    fn parse_read_response() {
        let payload = [0x44, 0x9C, 0xD7, 0x00, 0x00, 0x00];
        let response = ReadResponse::from_payload(&payload).unwrap();

        assert_eq!(response.coil, Coil::new(40004));
        assert_eq!(response.raw, 215);
    }

    #[test]
    fn short_payload_is_rejected() {
        let err = ReadResponse::from_payload(&[0x44, 0x9C, 0xD7, 0x00]).unwrap_err();
        assert_eq!(
            err,
            ParseError::PayloadLength {
                expected: 6,
                actual: 4,
            }
        );
    }
}
