// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register vocabulary: coil addresses, raw data types, and per-register
//! metadata.
//!
//! The library ships no register database. Every pump model exposes its
//! own table of registers; hosts describe the ones they care about with
//! [`RegisterInfo`] values, typically loaded from a configuration file.

mod coil;
mod data_type;
mod register_info;

pub use coil::Coil;
pub use data_type::DataType;
pub use register_info::{AccessMode, RegisterInfo};
