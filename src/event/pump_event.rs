// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pump link event types.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events emitted by the pump link driver.
///
/// These events notify subscribers about decoded traffic and the health
/// of the link. Request/response correlation for reads and writes happens
/// separately; the broadcast carries everything the pump volunteers, so
/// subscribers also see responses they did not request themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpEvent {
    /// An accepted frame carried a typed message.
    Message(Message),

    /// A frame arrived with a bad checksum and was rejected.
    ChecksumFailure,

    /// The link closed, either by end of stream or an I/O failure.
    Closed,
}

impl PumpEvent {
    /// Returns the carried message, if this is a message event.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Returns `true` if this event ends the link.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
