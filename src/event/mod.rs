// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by the pump link driver.
//!
//! The link task broadcasts one [`PumpEvent`] per decoded message, per
//! rejected frame, and for the final close of the link. Subscribe through
//! [`HeatPump::subscribe`](crate::pump::HeatPump::subscribe); every
//! receiver sees every event, and a receiver that falls more than the
//! channel capacity behind loses the oldest events instead of stalling
//! the link.

mod pump_event;

pub use pump_event::PumpEvent;
