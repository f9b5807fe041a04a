// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Latest-value register cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{DataReadOut, ReadResponse};
use crate::registers::Coil;

/// A cached raw register value with its arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedValue {
    /// Raw value as last reported by the pump.
    pub raw: u32,
    /// When the value was last reported.
    pub updated_at: DateTime<Utc>,
}

/// Latest raw value per register.
///
/// The cache keeps one entry per register and refreshes the timestamp on
/// every report, so `updated_at` doubles as a staleness signal for
/// registers the pump stopped broadcasting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCache {
    values: HashMap<Coil, CachedValue>,
}

impl RegisterCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registers with a cached value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no register has reported a value yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores a raw value for a register.
    ///
    /// The timestamp refreshes on every call; the return value reports
    /// whether the raw value is new or differs from the cached one.
    pub fn insert(&mut self, coil: Coil, raw: u32) -> bool {
        let entry = CachedValue {
            raw,
            updated_at: Utc::now(),
        };
        self.values.insert(coil, entry).is_none_or(|old| old.raw != raw)
    }

    /// Returns the cached value for a register.
    #[must_use]
    pub fn get(&self, coil: Coil) -> Option<CachedValue> {
        self.values.get(&coil).copied()
    }

    /// Stores every register slot of a data read-out.
    ///
    /// Returns the registers whose raw value changed, in wire order.
    pub fn apply_data_read_out(&mut self, readout: &DataReadOut) -> Vec<Coil> {
        readout
            .values
            .iter()
            .filter_map(|value| {
                self.insert(value.coil, u32::from(value.raw))
                    .then_some(value.coil)
            })
            .collect()
    }

    /// Stores the value of a read response.
    ///
    /// Returns `true` if the raw value is new or changed.
    pub fn apply_read_response(&mut self, response: &ReadResponse) -> bool {
        self.insert(response.coil, response.raw)
    }

    /// Iterates over the registers with a cached value.
    pub fn coils(&self) -> impl Iterator<Item = Coil> + '_ {
        self.values.keys().copied()
    }

    /// Drops all cached values.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RegisterValue;

    #[test]
    fn insert_reports_changes() {
        let mut cache = RegisterCache::new();

        assert!(cache.insert(Coil::new(40004), 215));
        assert!(!cache.insert(Coil::new(40004), 215));
        assert!(cache.insert(Coil::new(40004), 216));
    }

    #[test]
    fn insert_refreshes_timestamp() {
        let mut cache = RegisterCache::new();
        cache.insert(Coil::new(40004), 215);
        let first = cache.get(Coil::new(40004)).unwrap().updated_at;

        cache.insert(Coil::new(40004), 215);
        let second = cache.get(Coil::new(40004)).unwrap().updated_at;

        assert!(second >= first);
    }

    #[test]
    fn apply_data_read_out_returns_changed_coils() {
        let readout = DataReadOut {
            values: vec![
                RegisterValue {
                    coil: Coil::new(40004),
                    raw: 215,
                },
                RegisterValue {
                    coil: Coil::new(40008),
                    raw: 300,
                },
            ],
        };

        let mut cache = RegisterCache::new();
        let changed = cache.apply_data_read_out(&readout);
        assert_eq!(changed, [Coil::new(40004), Coil::new(40008)]);
        assert_eq!(cache.len(), 2);

        // An identical read-out changes nothing.
        let changed = cache.apply_data_read_out(&readout);
        assert!(changed.is_empty());
    }

    #[test]
    fn apply_read_response_updates_cache() {
        let response = ReadResponse {
            coil: Coil::new(45001),
            raw: 0,
        };

        let mut cache = RegisterCache::new();
        assert!(cache.apply_read_response(&response));
        assert!(!cache.apply_read_response(&response));
        assert_eq!(cache.get(Coil::new(45001)).map(|v| v.raw), Some(0));
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = RegisterCache::new();
        cache.insert(Coil::new(40004), 215);
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.coils().count(), 0);
    }
}
