// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the pump link over an in-memory stream.
//!
//! The test side plays the pump: it writes frames and tokens into a
//! duplex pipe and asserts on the acknowledgements and requests the
//! [`HeatPump`] handle puts on the wire.

#![cfg(feature = "tokio")]

use std::time::Duration;

use nibe_lib::error::{Error, ProtocolError};
use nibe_lib::event::PumpEvent;
use nibe_lib::message::Message;
use nibe_lib::pump::{HeatPump, PumpConfig};
use nibe_lib::registers::Coil;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

const ACK: u8 = 0x06;
const NAK: u8 = 0x15;

/// Two-slot data read-out: register 40004 reads 215, register 40008
/// reads 300.
const DATA_READ_OUT: &[u8] = &[
    0x5C, 0x00, 0x20, 0x68, 0x08, 0x44, 0x9C, 0xD7, 0x00, 0x48, 0x9C, 0x2C, 0x01, 0xB6,
];

const READ_TOKEN: &[u8] = &[0x5C, 0x00, 0x20, 0x69, 0x00, 0x49];
const WRITE_TOKEN: &[u8] = &[0x5C, 0x00, 0x20, 0x6B, 0x00, 0x4B];

/// Read response: register 40004 reads 215.
const READ_RESPONSE: &[u8] = &[
    0x5C, 0x00, 0x20, 0x6A, 0x06, 0x44, 0x9C, 0xD7, 0x00, 0x00, 0x00, 0x43,
];

const WRITE_RESPONSE_OK: &[u8] = &[0x5C, 0x00, 0x20, 0x6C, 0x01, 0x01, 0x4C];
const WRITE_RESPONSE_FAIL: &[u8] = &[0x5C, 0x00, 0x20, 0x6C, 0x01, 0x00, 0x4D];
const RMU_READ_OUT: &[u8] = &[0x5C, 0x00, 0x19, 0x62, 0x02, 0xAA, 0xBB, 0x68];

const WAIT: Duration = Duration::from_secs(1);

/// Attaches a pump handle to one end of a duplex pipe and hands the
/// other end to the test.
fn attach(config: PumpConfig) -> (HeatPump, DuplexStream) {
    let (wire, stream) = tokio::io::duplex(256);
    (HeatPump::attach_with_config(stream, config), wire)
}

/// Lets the link task drain its command queue before the next wire
/// exchange.
async fn settle() {
    sleep(Duration::from_millis(20)).await;
}

/// Reads exactly `expected.len()` bytes from the wire and asserts they
/// match.
async fn expect_wire(wire: &mut DuplexStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    timeout(WAIT, wire.read_exact(&mut buf))
        .await
        .expect("timed out waiting for wire bytes")
        .expect("link closed while waiting for wire bytes");
    assert_eq!(buf, expected);
}

/// Receives the next pump event, failing fast if none arrives.
async fn recv_event(events: &mut broadcast::Receiver<PumpEvent>) -> PumpEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for a pump event")
        .expect("event channel closed")
}

// ============================================================================
// Frame Acknowledgement Tests
// ============================================================================

mod frame_acknowledgement {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn accepted_frame_is_acknowledged() {
        let (pump, mut wire) = attach(PumpConfig::default());
        let mut events = pump.subscribe();

        wire.write_all(DATA_READ_OUT).await.unwrap();
        expect_wire(&mut wire, &[ACK]).await;

        let event = recv_event(&mut events).await;
        let Some(Message::DataReadOut(readout)) = event.message() else {
            panic!("expected a data read-out event, got {event:?}");
        };
        assert_eq!(readout.get(Coil::new(40004)), Some(215));

        assert_eq!(pump.cached_value(Coil::new(40004)).map(|v| v.raw), Some(215));
        assert_eq!(pump.cached_value(Coil::new(40008)).map(|v| v.raw), Some(300));
        assert_eq!(pump.cache().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rmu_frames_are_silent_by_default() {
        let (pump, mut wire) = attach(PumpConfig::default());
        let mut events = pump.subscribe();

        wire.write_all(RMU_READ_OUT).await.unwrap();
        wire.write_all(DATA_READ_OUT).await.unwrap();

        // The first wire byte is the read-out's acknowledgement, so the
        // RMU frame drew none.
        expect_wire(&mut wire, &[ACK]).await;

        let event = recv_event(&mut events).await;
        assert!(matches!(
            event.message(),
            Some(Message::RmuDataReadOut(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rmu_frames_acknowledged_when_configured() {
        let config = PumpConfig::new().with_ack_rmu40(true);
        let (_pump, mut wire) = attach(config);

        wire.write_all(RMU_READ_OUT).await.unwrap();
        expect_wire(&mut wire, &[ACK]).await;
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_frame_draws_a_nak() {
        let (pump, mut wire) = attach(PumpConfig::default());
        let mut events = pump.subscribe();

        let mut tampered = DATA_READ_OUT.to_vec();
        tampered[5] ^= 0x01;
        wire.write_all(&tampered).await.unwrap();

        expect_wire(&mut wire, &[NAK]).await;
        assert_eq!(recv_event(&mut events).await, PumpEvent::ChecksumFailure);
    }
}

// ============================================================================
// Event Broadcast Tests
// ============================================================================

mod event_broadcast {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn events_reach_every_subscriber() {
        let (pump, mut wire) = attach(PumpConfig::default());
        let mut first = pump.subscribe();
        let mut second = pump.subscribe();
        assert_eq!(pump.subscriber_count(), 2);

        wire.write_all(DATA_READ_OUT).await.unwrap();

        let event = recv_event(&mut first).await;
        assert_eq!(recv_event(&mut second).await, event);
        assert!(matches!(event.message(), Some(Message::DataReadOut(_))));

        drop(second);
        assert_eq!(pump.subscriber_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn traffic_flows_without_subscribers() {
        let (pump, mut wire) = attach(PumpConfig::default());
        assert_eq!(pump.subscriber_count(), 0);

        wire.write_all(DATA_READ_OUT).await.unwrap();
        expect_wire(&mut wire, &[ACK]).await;

        settle().await;
        assert_eq!(pump.cached_value(Coil::new(40004)).map(|v| v.raw), Some(215));
    }
}

// ============================================================================
// Token Servicing Tests
// ============================================================================

mod token_servicing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_tokens_are_acknowledged() {
        let (_pump, mut wire) = attach(PumpConfig::default());

        wire.write_all(READ_TOKEN).await.unwrap();
        expect_wire(&mut wire, &[ACK]).await;

        wire.write_all(WRITE_TOKEN).await.unwrap();
        expect_wire(&mut wire, &[ACK]).await;
    }

    #[tokio::test(start_paused = true)]
    async fn token_acknowledgement_can_be_disabled() {
        let config = PumpConfig::new().with_ack_modbus40(false);
        let (_pump, mut wire) = attach(config);

        wire.write_all(READ_TOKEN).await.unwrap();

        // A corrupt frame still draws a negative acknowledgement, and
        // it is the first byte on the wire.
        let mut tampered = DATA_READ_OUT.to_vec();
        tampered[5] ^= 0x01;
        wire.write_all(&tampered).await.unwrap();
        expect_wire(&mut wire, &[NAK]).await;
    }
}

// ============================================================================
// Register Read Tests
// ============================================================================

mod register_reads {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn read_round_trip() {
        let (pump, mut wire) = attach(PumpConfig::default());

        let reader = tokio::spawn({
            let pump = pump.clone();
            async move { pump.read_register(Coil::new(40004)).await }
        });
        settle().await;

        wire.write_all(READ_TOKEN).await.unwrap();
        expect_wire(&mut wire, &[0xC0, 0x69, 0x02, 0x44, 0x9C, 0x73]).await;

        wire.write_all(READ_RESPONSE).await.unwrap();
        let value = reader.await.unwrap().unwrap();
        assert_eq!(value, 215);

        assert_eq!(pump.cached_value(Coil::new(40004)).map(|v| v.raw), Some(215));
    }

    #[tokio::test(start_paused = true)]
    async fn read_times_out_without_a_response() {
        let config = PumpConfig::new().with_request_timeout(Duration::from_millis(100));
        let (pump, _wire) = attach(config);

        let err = pump.read_register(Coil::new(40004)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Timeout(100))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn queue_capacity_is_enforced() {
        let config = PumpConfig::new().with_max_pending(1);
        let (pump, mut wire) = attach(config);

        let first = tokio::spawn({
            let pump = pump.clone();
            async move { pump.read_register(Coil::new(40004)).await }
        });
        settle().await;

        let err = pump.read_register(Coil::new(40008)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::QueueFull { capacity: 1 })
        ));

        // The queued request is unaffected by the rejected one.
        wire.write_all(READ_TOKEN).await.unwrap();
        expect_wire(&mut wire, &[0xC0, 0x69, 0x02, 0x44, 0x9C, 0x73]).await;
        wire.write_all(READ_RESPONSE).await.unwrap();
        assert_eq!(first.await.unwrap().unwrap(), 215);
    }
}

// ============================================================================
// Register Write Tests
// ============================================================================

mod register_writes {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn write_round_trip() {
        let (pump, mut wire) = attach(PumpConfig::default());

        let writer = tokio::spawn({
            let pump = pump.clone();
            async move { pump.write_register(Coil::new(45001), 1).await }
        });
        settle().await;

        wire.write_all(WRITE_TOKEN).await.unwrap();
        expect_wire(
            &mut wire,
            &[0xC0, 0x6B, 0x06, 0xC9, 0xAF, 0x01, 0x00, 0x00, 0x00, 0xCA],
        )
        .await;

        wire.write_all(WRITE_RESPONSE_OK).await.unwrap();
        writer.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_write_surfaces_an_error() {
        let (pump, mut wire) = attach(PumpConfig::default());

        let writer = tokio::spawn({
            let pump = pump.clone();
            async move { pump.write_register(Coil::new(45001), 1).await }
        });
        settle().await;

        wire.write_all(WRITE_TOKEN).await.unwrap();
        expect_wire(
            &mut wire,
            &[0xC0, 0x6B, 0x06, 0xC9, 0xAF, 0x01, 0x00, 0x00, 0x00, 0xCA],
        )
        .await;

        wire.write_all(WRITE_RESPONSE_FAIL).await.unwrap();
        let err = writer.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::WriteRejected)
        ));
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn close_publishes_a_closed_event() {
        let (pump, _wire) = attach(PumpConfig::default());
        let mut events = pump.subscribe();

        pump.close().await;
        assert_eq!(recv_event(&mut events).await, PumpEvent::Closed);

        settle().await;
        let err = pump.read_register(Coil::new(40004)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::ChannelClosed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn close_fails_outstanding_requests() {
        let (pump, _wire) = attach(PumpConfig::default());

        let reader = tokio::spawn({
            let pump = pump.clone();
            async move { pump.read_register(Coil::new(40004)).await }
        });
        settle().await;

        pump.close().await;
        let err = reader.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::ChannelClosed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_end_closes_the_link() {
        let (pump, wire) = attach(PumpConfig::default());
        let mut events = pump.subscribe();

        drop(wire);
        assert_eq!(recv_event(&mut events).await, PumpEvent::Closed);
    }
}
