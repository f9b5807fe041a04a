// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `nibe_lib` - A Rust library to communicate with Nibe heat pumps.
//!
//! This library speaks the MODBUS 40 serial protocol that Nibe heat pumps
//! use to talk to their accessory modules: it decodes the pump's frame
//! stream, caches the register values the pump broadcasts, and reads and
//! writes registers through the pump's token exchange.
//!
//! # Supported Features
//!
//! - **Frame decoding**: Incremental state machine that handles split
//!   reads, escape duplication, checksum substitution, and resync after
//!   line noise
//! - **Data read-outs**: Periodic register broadcasts parsed into typed
//!   values and cached with arrival timestamps
//! - **Register access**: Reads and writes queued until the pump hands
//!   out the matching token slot
//! - **Accessory emulation**: Acknowledgements for MODBUS 40 by default,
//!   optionally RMU 40 and SMS 40
//!
//! # Cargo Features
//!
//! The default `tokio` feature carries the async link driver
//! ([`pump`]) and its broadcast events ([`event`]). Without it the crate
//! is a pure decoder with no I/O of its own.
//!
//! # Quick Start
//!
//! ## Decoding a Captured Stream
//!
//! The [`protocol::Decoder`] works on plain byte slices and never does
//! I/O, so it can replay captures or sit on top of any transport:
//!
//! ```
//! use nibe_lib::protocol::{Decoder, DecoderEvent};
//!
//! let mut decoder = Decoder::new();
//!
//! // One complete data read-out frame.
//! let events = decoder.push(&[0x5C, 0x00, 0x20, 0x68, 0x04, 0x44, 0x9C, 0xD7, 0x00, 0x43]);
//! assert_eq!(events.len(), 1);
//!
//! if let DecoderEvent::Frame(frame) = &events[0] {
//!     println!("accepted frame: {frame}");
//! }
//! ```
//!
//! ## Driving a Live Link
//!
//! ```no_run
//! use nibe_lib::pump::HeatPump;
//! use nibe_lib::registers::Coil;
//!
//! #[tokio::main]
//! async fn main() -> nibe_lib::Result<()> {
//!     // A serial-to-TCP bridge on the pump's RS-485 bus.
//!     let stream = tokio::net::TcpStream::connect("192.168.1.20:3480").await?;
//!     let pump = HeatPump::attach(stream);
//!
//!     // Current outdoor temperature (BT1), raw value times ten.
//!     let raw = pump.read_register(Coil::new(40004)).await?;
//!     println!("BT1 raw: {raw}");
//!
//!     pump.close().await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod message;
pub mod protocol;
pub mod registers;
pub mod state;

#[cfg(feature = "tokio")]
pub mod event;
#[cfg(feature = "tokio")]
pub mod pump;

pub use error::{Error, FrameError, ParseError, ProtocolError, Result};
pub use message::{
    DataReadOut, Message, ReadRequest, ReadResponse, RegisterValue, RmuDataReadOut, WriteRequest,
    WriteResponse,
};
pub use protocol::{Address, Decoder, DecoderEvent, Frame, FrameKind};
pub use registers::{AccessMode, Coil, DataType, RegisterInfo};
pub use state::{CachedValue, RegisterCache};

#[cfg(feature = "tokio")]
pub use event::PumpEvent;
#[cfg(feature = "tokio")]
pub use pump::{HeatPump, PumpConfig};
