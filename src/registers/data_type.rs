// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw register data types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The raw type a register value carries on the wire.
///
/// The wire always transports values in fixed-width little-endian slots;
/// the data type says how many of those bytes are significant and whether
/// they are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Unsigned 8-bit.
    U8,
    /// Signed 8-bit.
    S8,
    /// Unsigned 16-bit.
    U16,
    /// Signed 16-bit.
    S16,
    /// Unsigned 32-bit.
    U32,
    /// Signed 32-bit.
    S32,
}

impl DataType {
    /// Width of the type in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::U16 | Self::S16 => 2,
            Self::U32 | Self::S32 => 4,
        }
    }

    /// Reinterprets a raw register value as this type.
    ///
    /// Narrower types read their low bytes out of `raw`; signed types
    /// sign-extend from their own width.
    // Safe: the truncating and wrapping casts are the reinterpretation itself
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn decode(self, raw: u32) -> i64 {
        match self {
            Self::U8 => i64::from(raw as u8),
            Self::S8 => i64::from(raw as u8 as i8),
            Self::U16 => i64::from(raw as u16),
            Self::S16 => i64::from(raw as u16 as i16),
            Self::U32 => i64::from(raw),
            Self::S32 => i64::from(raw as i32),
        }
    }

    /// Returns the type name as a static string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::S8 => "s8",
            Self::U16 => "u16",
            Self::S16 => "s16",
            Self::U32 => "u32",
            Self::S32 => "s32",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
