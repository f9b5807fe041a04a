// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register value caching.
//!
//! The pump keeps pushing register values in data read-outs; this module
//! provides the [`RegisterCache`] that accumulates the latest raw value
//! per register together with the time it arrived.
//!
//! # Examples
//!
//! ```
//! use nibe_lib::registers::Coil;
//! use nibe_lib::state::RegisterCache;
//!
//! let mut cache = RegisterCache::new();
//!
//! // The first value for a register counts as a change.
//! assert!(cache.insert(Coil::new(40004), 215));
//! assert!(!cache.insert(Coil::new(40004), 215));
//!
//! assert_eq!(cache.get(Coil::new(40004)).map(|v| v.raw), Some(215));
//! ```

mod register_cache;

pub use register_cache::{CachedValue, RegisterCache};
