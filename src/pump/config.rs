// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the pump link driver.

use std::time::Duration;

use crate::protocol::Address;

/// Configuration for an attached pump link.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nibe_lib::pump::PumpConfig;
///
/// // Default configuration (acknowledge MODBUS 40 only)
/// let config = PumpConfig::new();
///
/// // Custom configuration
/// let config = PumpConfig::new()
///     .with_ack_rmu40(true)
///     .with_request_timeout(Duration::from_secs(2))
///     .with_max_pending(4);
/// ```
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Whether to acknowledge frames addressed to MODBUS 40.
    pub ack_modbus40: bool,
    /// Whether to acknowledge frames addressed to RMU 40.
    pub ack_rmu40: bool,
    /// Whether to acknowledge frames addressed to SMS 40.
    pub ack_sms40: bool,
    /// How long a read or write waits for its response.
    pub request_timeout: Duration,
    /// Maximum number of queued and in-flight requests.
    pub max_pending: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl PumpConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether frames addressed to MODBUS 40 are acknowledged.
    ///
    /// Disable this when a real MODBUS 40 accessory shares the bus and
    /// answers the pump itself.
    #[must_use]
    pub fn with_ack_modbus40(mut self, ack: bool) -> Self {
        self.ack_modbus40 = ack;
        self
    }

    /// Sets whether frames addressed to RMU 40 are acknowledged.
    #[must_use]
    pub fn with_ack_rmu40(mut self, ack: bool) -> Self {
        self.ack_rmu40 = ack;
        self
    }

    /// Sets whether frames addressed to SMS 40 are acknowledged.
    #[must_use]
    pub fn with_ack_sms40(mut self, ack: bool) -> Self {
        self.ack_sms40 = ack;
        self
    }

    /// Sets the response timeout for reads and writes.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum number of queued and in-flight requests.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Sets the capacity of the event broadcast channel.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns `true` if frames to the given address are acknowledged.
    #[must_use]
    pub fn acks(&self, address: Address) -> bool {
        match address {
            Address::Modbus40 => self.ack_modbus40,
            Address::Rmu40 => self.ack_rmu40,
            Address::Sms40 => self.ack_sms40,
            Address::Unknown(_) => false,
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            ack_modbus40: true,
            ack_rmu40: false,
            ack_sms40: false,
            request_timeout: Duration::from_secs(5),
            max_pending: 16,
            event_capacity: 256,
        }
    }
}
