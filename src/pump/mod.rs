// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Link driver for a connected heat pump.
//!
//! This module provides the [`HeatPump`] handle, which owns a background
//! task speaking the MODBUS 40 protocol over any byte stream: decoding
//! frames, acknowledging traffic, answering tokens with queued requests,
//! and keeping the register cache current.
//!
//! # Examples
//!
//! ```no_run
//! use nibe_lib::pump::HeatPump;
//! use nibe_lib::registers::Coil;
//!
//! #[tokio::main]
//! async fn main() -> nibe_lib::Result<()> {
//!     // A serial-to-TCP bridge on the RS-485 bus.
//!     let stream = tokio::net::TcpStream::connect("192.168.1.20:3480").await?;
//!     let pump = HeatPump::attach(stream);
//!
//!     // Watch everything the pump broadcasts.
//!     let mut events = pump.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {event:?}");
//!         }
//!     });
//!
//!     // Read a register over the wire.
//!     let raw = pump.read_register(Coil::new(40004)).await?;
//!     println!("BT1 raw value: {raw}");
//!
//!     Ok(())
//! }
//! ```

mod config;
mod pending;

pub use config::PumpConfig;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::{Error, ProtocolError};
use crate::event::PumpEvent;
use crate::message::{Message, ReadRequest, WriteRequest};
use crate::protocol::constants::{ACK, NAK};
use crate::protocol::{Decoder, DecoderEvent};
use crate::registers::Coil;
use crate::state::{CachedValue, RegisterCache};

use pending::PendingRequests;

/// Requests from the handle to the link task.
#[derive(Debug)]
enum PumpCommand {
    Read {
        coil: Coil,
        reply: oneshot::Sender<Result<u32, ProtocolError>>,
    },
    Write {
        request: WriteRequest,
        reply: oneshot::Sender<Result<(), ProtocolError>>,
    },
    Shutdown,
}

/// Handle to a heat pump attached over a byte stream.
///
/// Attaching spawns a background task that owns the stream. The handle
/// is cheap to clone; all clones talk to the same task. The task stops
/// when [`close`](Self::close) is called, the stream ends, or every
/// handle is dropped.
///
/// # Reads and writes
///
/// The pump only accepts requests in the slot after a token frame, so
/// [`read_register`](Self::read_register) and
/// [`write_register`](Self::write_register) queue the request and wait
/// for the response. With a healthy link the pump hands out tokens
/// several times per second.
#[derive(Debug, Clone)]
pub struct HeatPump {
    commands: mpsc::Sender<PumpCommand>,
    events: broadcast::Sender<PumpEvent>,
    cache: Arc<RwLock<RegisterCache>>,
    request_timeout: Duration,
}

impl HeatPump {
    /// Attaches to a pump over a byte stream with default configuration.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn attach<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::attach_with_config(stream, PumpConfig::default())
    }

    /// Attaches to a pump over a byte stream.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, or when the configured
    /// event capacity is zero.
    #[must_use]
    pub fn attach_with_config<S>(stream: S, config: PumpConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (events, _) = broadcast::channel(config.event_capacity);
        let cache = Arc::new(RwLock::new(RegisterCache::new()));
        let (commands, command_rx) = mpsc::channel(config.max_pending.max(1));
        let request_timeout = config.request_timeout;

        tokio::spawn(run_link(
            stream,
            config,
            events.clone(),
            Arc::clone(&cache),
            command_rx,
        ));

        Self {
            commands,
            events,
            cache,
            request_timeout,
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to pump events.
    ///
    /// Returns a receiver that sees every decoded message, checksum
    /// failure, and the final close of the link.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PumpEvent> {
        self.events.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    // =========================================================================
    // Register Access
    // =========================================================================

    /// Reads a register over the wire.
    ///
    /// The request is queued until the pump hands out a read token, then
    /// sent; the raw value arrives in the matching read response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if the response does not arrive
    /// within the configured timeout, [`ProtocolError::QueueFull`] if too
    /// many requests are outstanding, or
    /// [`ProtocolError::ChannelClosed`] if the link is gone.
    pub async fn read_register(&self, coil: Coil) -> Result<u32, Error> {
        let (reply, response) = oneshot::channel();
        self.send_command(PumpCommand::Read { coil, reply }).await?;
        self.await_response(response).await
    }

    /// Writes a register over the wire.
    ///
    /// The request is queued until the pump hands out a write token, then
    /// sent; the pump confirms with a status response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WriteRejected`] if the pump refuses the
    /// value, and the same queue and link errors as
    /// [`read_register`](Self::read_register).
    pub async fn write_register(&self, coil: Coil, value: u32) -> Result<(), Error> {
        let (reply, response) = oneshot::channel();
        let request = WriteRequest::new(coil, value);
        self.send_command(PumpCommand::Write { request, reply })
            .await?;
        self.await_response(response).await
    }

    /// Returns the cached value for a register.
    ///
    /// The cache fills from data read-outs and read responses without any
    /// wire traffic of its own.
    #[must_use]
    pub fn cached_value(&self, coil: Coil) -> Option<CachedValue> {
        self.cache.read().get(coil)
    }

    /// Returns a snapshot of the whole register cache.
    #[must_use]
    pub fn cache(&self) -> RegisterCache {
        self.cache.read().clone()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stops the link task.
    ///
    /// Outstanding requests fail with [`ProtocolError::ChannelClosed`]
    /// and subscribers receive [`PumpEvent::Closed`].
    pub async fn close(&self) {
        let _ = self.commands.send(PumpCommand::Shutdown).await;
    }

    async fn send_command(&self, command: PumpCommand) -> Result<(), Error> {
        self.commands
            .send(command)
            .await
            .map_err(|_| link_gone().into())
    }

    async fn await_response<T>(
        &self,
        response: oneshot::Receiver<Result<T, ProtocolError>>,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.request_timeout, response).await {
            Ok(Ok(result)) => result.map_err(Error::Protocol),
            Ok(Err(_)) => Err(link_gone().into()),
            Err(_) => {
                let millis = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
                Err(ProtocolError::Timeout(millis).into())
            }
        }
    }
}

fn link_gone() -> ProtocolError {
    ProtocolError::ChannelClosed("pump link task is gone".to_string())
}

/// Drives one pump link until the stream ends or the handle shuts down.
async fn run_link<S>(
    stream: S,
    config: PumpConfig,
    events: broadcast::Sender<PumpEvent>,
    cache: Arc<RwLock<RegisterCache>>,
    mut commands: mpsc::Receiver<PumpCommand>,
) where
    S: AsyncRead + AsyncWrite,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut decoder = Decoder::new();
    let mut pending = PendingRequests::new(config.max_pending);
    let mut buf = [0u8; 256];

    tracing::debug!("Pump link task started");

    'link: loop {
        tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    tracing::info!("Pump closed the link");
                    break 'link;
                }
                Ok(n) => {
                    for event in decoder.push(&buf[..n]) {
                        let outcome = handle_decoder_event(
                            event,
                            &config,
                            &events,
                            &cache,
                            &mut pending,
                            &mut writer,
                        )
                        .await;
                        if let Err(error) = outcome {
                            tracing::warn!(error = %error, "Writing to the pump failed");
                            break 'link;
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Reading from the pump failed");
                    break 'link;
                }
            },
            command = commands.recv() => match command {
                Some(PumpCommand::Read { coil, reply }) => pending.push_read(coil, reply),
                Some(PumpCommand::Write { request, reply }) => pending.push_write(request, reply),
                Some(PumpCommand::Shutdown) | None => {
                    tracing::debug!("Pump link shutting down");
                    break 'link;
                }
            },
        }
    }

    pending.close_all();
    let _ = events.send(PumpEvent::Closed);
    tracing::debug!("Pump link task stopped");
}

/// Reacts to one decoder event: acknowledgements, token servicing,
/// cache updates, and event publishing.
async fn handle_decoder_event<W>(
    event: DecoderEvent,
    config: &PumpConfig,
    events: &broadcast::Sender<PumpEvent>,
    cache: &RwLock<RegisterCache>,
    pending: &mut PendingRequests,
    writer: &mut W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match event {
        DecoderEvent::Frame(frame) => {
            tracing::trace!(frame = %frame, "Frame accepted");
            if config.acks(frame.address()) {
                writer.write_all(&[ACK]).await?;
            }
            match Message::from_frame(&frame) {
                Ok(message) => {
                    match &message {
                        Message::DataReadOut(readout) => {
                            let changed = cache.write().apply_data_read_out(readout);
                            if !changed.is_empty() {
                                tracing::trace!(registers = changed.len(), "Cache updated");
                            }
                        }
                        Message::ReadResponse(response) => {
                            cache.write().apply_read_response(response);
                            pending.resolve_read(response.coil, response.raw);
                        }
                        Message::WriteResponse(response) => {
                            pending.resolve_write(response.success);
                        }
                        Message::RmuDataReadOut(_) => {}
                    }
                    let _ = events.send(PumpEvent::Message(message));
                }
                Err(error) => {
                    tracing::debug!(error = %error, frame = %frame, "Frame carries no message");
                }
            }
        }
        DecoderEvent::ReadToken => {
            if let Some(coil) = pending.next_read() {
                writer.write_all(&ReadRequest::new(coil).encode()).await?;
                tracing::debug!(%coil, "Read request sent");
            } else if config.ack_modbus40 {
                writer.write_all(&[ACK]).await?;
            }
        }
        DecoderEvent::WriteToken => {
            if let Some(request) = pending.next_write() {
                writer.write_all(&request.encode()).await?;
                tracing::debug!(coil = %request.coil, "Write request sent");
            } else if config.ack_modbus40 {
                writer.write_all(&[ACK]).await?;
            }
        }
        DecoderEvent::ChecksumFailure => {
            writer.write_all(&[NAK]).await?;
            let _ = events.send(PumpEvent::ChecksumFailure);
        }
    }
    Ok(())
}
