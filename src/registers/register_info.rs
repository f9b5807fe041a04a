// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register metadata for interpreting raw values.

use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use super::{Coil, DataType};

/// Whether a register accepts writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// The register can only be read.
    ReadOnly,
    /// The register can be read and written.
    ReadWrite,
}

/// Metadata describing a single register.
///
/// The protocol itself only moves raw numbers; what a value means is
/// defined per heat pump model in tables published by the manufacturer.
/// Hosts load those tables into `RegisterInfo` entries to turn raw
/// readings into engineering units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInfo {
    /// Register address.
    pub coil: Coil,
    /// Human-readable name, e.g. "BT1 outdoor temperature".
    pub name: String,
    /// Raw wire type of the value.
    pub data_type: DataType,
    /// Divisor applied to the decoded value.
    pub factor: NonZeroU16,
    /// Whether the register accepts writes.
    pub mode: AccessMode,
}

impl RegisterInfo {
    /// Creates a read-only register description with factor 1.
    #[must_use]
    pub fn new(coil: Coil, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            coil,
            name: name.into(),
            data_type,
            factor: NonZeroU16::MIN,
            mode: AccessMode::ReadOnly,
        }
    }

    /// Sets the scaling divisor.
    #[must_use]
    pub fn with_factor(mut self, factor: NonZeroU16) -> Self {
        self.factor = factor;
        self
    }

    /// Marks the register as writable.
    #[must_use]
    pub fn writable(mut self) -> Self {
        self.mode = AccessMode::ReadWrite;
        self
    }

    /// Decodes a raw value and applies the scaling factor.
    // Safe: decoded register values are far below the f64 integer limit
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn scaled(&self, raw: u32) -> f64 {
        self.data_type.decode(raw) as f64 / f64::from(self.factor.get())
    }
}
