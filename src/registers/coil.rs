// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coil addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A register address in the pump's coil space.
///
/// Coil numbers travel on the wire as little-endian 16-bit values. Every
/// value is a syntactically valid address; whether a pump model actually
/// exposes a register there is model-specific.
///
/// # Examples
///
/// ```
/// use nibe_lib::registers::Coil;
///
/// let outdoor_temp = Coil::new(40004);
/// assert_eq!(outdoor_temp.value(), 40004);
/// assert_eq!(outdoor_temp.to_le_bytes(), [0x44, 0x9C]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coil(u16);

impl Coil {
    /// Creates a coil address.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the numeric address.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns the address as little-endian wire bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Builds an address from little-endian wire bytes.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<u16> for Coil {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Coil> for u16 {
    fn from(coil: Coil) -> Self {
        coil.0
    }
}

impl fmt::Display for Coil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_bytes_round_trip() {
        let coil = Coil::new(40004);
        assert_eq!(coil.to_le_bytes(), [0x44, 0x9C]);
        assert_eq!(Coil::from_le_bytes([0x44, 0x9C]), coil);
    }

    #[test]
    fn converts_to_and_from_u16() {
        let coil: Coil = 43009.into();
        assert_eq!(u16::from(coil), 43009);
    }

    #[test]
    fn display_is_the_plain_number() {
        assert_eq!(Coil::new(40004).to_string(), "40004");
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&Coil::new(40004)).unwrap();
        assert_eq!(json, "40004");

        let coil: Coil = serde_json::from_str("40004").unwrap();
        assert_eq!(coil, Coil::new(40004));
    }
}
