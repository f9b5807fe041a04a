// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic data read-out parsing.

use serde::{Deserialize, Serialize};

use crate::registers::Coil;

/// A single register slot from a data read-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterValue {
    /// Register address.
    pub coil: Coil,
    /// Raw 16-bit value as transported in the slot.
    pub raw: u16,
}

/// Periodic broadcast of register values from the pump.
///
/// The pump pushes the registers selected on its display roughly once per
/// second, packed as 4-byte slots of register address and raw value, both
/// little-endian. Registers wider than 16 bits span two consecutive slots;
/// combining those is left to the host, which knows the register table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataReadOut {
    /// Register slots in wire order, padding slots removed.
    pub values: Vec<RegisterValue>,
}

impl DataReadOut {
    /// Parses the payload of a data read-out frame.
    ///
    /// Slots with the padding address 0xFFFF are dropped, and a trailing
    /// partial slot is ignored. Some pump models pad the read-out to a
    /// fixed size, others truncate it.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Self {
        let values = payload
            .chunks_exact(4)
            .filter_map(|slot| {
                let coil = u16::from_le_bytes([slot[0], slot[1]]);
                if coil == 0xFFFF {
                    return None;
                }
                Some(RegisterValue {
                    coil: Coil::new(coil),
                    raw: u16::from_le_bytes([slot[2], slot[3]]),
                })
            })
            .collect();
        Self { values }
    }

    /// Looks up the raw value for a register, if present.
    #[must_use]
    pub fn get(&self, coil: Coil) -> Option<u16> {
        self.values
            .iter()
            .find(|value| value.coil == coil)
            .map(|value| value.raw)
    }
}

/// Periodic broadcast addressed to an RMU 40 room unit.
///
/// The room unit wire layout varies across pump generations, so the
/// payload is carried unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmuDataReadOut {
    /// Raw payload bytes.
    pub data: Vec<u8>,
}
