// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed messages carried by accepted frames.
//!
//! This module turns validated [`Frame`]s into typed messages and encodes
//! the two request kinds the master sends back. Token frames and unknown
//! frames carry no message and are rejected with
//! [`ParseError::UnexpectedKind`].

mod data_readout;
mod read;
mod write;

pub use data_readout::{DataReadOut, RegisterValue, RmuDataReadOut};
pub use read::{ReadRequest, ReadResponse};
pub use write::{WriteRequest, WriteResponse};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::protocol::{Frame, FrameKind};

/// A typed message parsed from an accepted frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Periodic register broadcast to the MODBUS 40 address.
    DataReadOut(DataReadOut),
    /// Answer to a read request.
    ReadResponse(ReadResponse),
    /// Answer to a write request.
    WriteResponse(WriteResponse),
    /// Periodic broadcast to the RMU 40 address.
    RmuDataReadOut(RmuDataReadOut),
}

impl Message {
    /// Parses the typed message a frame carries.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedKind`] for frames that carry no
    /// message (tokens, requests, unclassified frames), or
    /// [`ParseError::PayloadLength`] if the payload does not fit the
    /// message type.
    pub fn from_frame(frame: &Frame) -> Result<Self, ParseError> {
        match frame.kind() {
            FrameKind::DataReadOut => {
                Ok(Self::DataReadOut(DataReadOut::from_payload(frame.payload())))
            }
            FrameKind::ReadResponse => {
                Ok(Self::ReadResponse(ReadResponse::from_payload(frame.payload())?))
            }
            FrameKind::WriteResponse => Ok(Self::WriteResponse(WriteResponse::from_payload(
                frame.payload(),
            )?)),
            FrameKind::RmuDataReadOut => Ok(Self::RmuDataReadOut(RmuDataReadOut {
                data: frame.payload().to_vec(),
            })),
            kind => Err(ParseError::UnexpectedKind { kind }),
        }
    }
}
