// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The incremental protocol decoder.
//!
//! [`Decoder`] consumes the raw serial byte stream and emits
//! [`DecoderEvent`]s: validated frames, token grants, and checksum
//! failures. The automaton is a tagged state plus one pure transition
//! function over an explicit buffer context, driven by a loop that yields
//! whenever another input byte is required but none is buffered.

use bytes::{Buf, BytesMut};

use super::constants::{FRAME_START_RES, MAX_FRAME_LEN};
use super::frame::{Frame, FrameCheck, FrameKind, check_frame};

/// Decoder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Discarding bytes until a start byte appears.
    #[default]
    WaitStart,
    /// Accumulating a candidate frame byte by byte.
    WaitData,
    /// A checksum-valid frame is waiting to be routed.
    OkMessageReceived,
    /// The routed frame is a read token.
    ReadTokenReceived,
    /// The routed frame is a write token.
    WriteTokenReceived,
    /// The candidate frame failed its checksum.
    ChecksumFailure,
}

/// Effects emitted by the decoder for the caller to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    /// A validated, deduplicated, non-token frame was accepted.
    Frame(Frame),
    /// The pump granted a read slot: answer with one read request or an
    /// acknowledgement.
    ReadToken,
    /// The pump granted a write slot: answer with one write request or an
    /// acknowledgement.
    WriteToken,
    /// A structurally complete frame failed its checksum: a negative
    /// acknowledgement belongs on the line.
    ChecksumFailure,
}

/// Mutable context the transition function works on.
#[derive(Debug, Default)]
struct Buffers {
    /// Raw input not yet consumed by the automaton.
    input: BytesMut,
    /// The candidate frame being assembled.
    message: Vec<u8>,
}

impl Buffers {
    fn next_byte(&mut self) -> Option<u8> {
        if self.input.is_empty() {
            None
        } else {
            Some(self.input.get_u8())
        }
    }
}

/// Outcome of a single transition.
enum Step {
    /// The machine advanced, possibly producing an effect.
    Advance(State, Option<DecoderEvent>),
    /// No input byte is available.
    NeedInput,
}

/// One step of the automaton.
///
/// `WaitStart` and `WaitData` consume at most one input byte per step;
/// the remaining states run their entry action and fall back to
/// `WaitStart` without touching the input.
fn step(state: State, buffers: &mut Buffers) -> Step {
    match state {
        State::WaitStart => match buffers.next_byte() {
            Some(FRAME_START_RES) => {
                buffers.message.clear();
                buffers.message.push(FRAME_START_RES);
                Step::Advance(State::WaitData, None)
            }
            Some(_) => Step::Advance(State::WaitStart, None),
            None => Step::NeedInput,
        },
        State::WaitData => {
            if buffers.message.len() >= MAX_FRAME_LEN {
                tracing::trace!(
                    len = buffers.message.len(),
                    "candidate frame exceeded the frame bound, resyncing"
                );
                buffers.message.clear();
                return Step::Advance(State::WaitStart, None);
            }
            let Some(byte) = buffers.next_byte() else {
                return Step::NeedInput;
            };
            buffers.message.push(byte);
            match check_frame(&buffers.message) {
                FrameCheck::Incomplete => Step::Advance(State::WaitData, None),
                FrameCheck::Invalid => {
                    tracing::trace!("candidate frame header invalid, resyncing");
                    buffers.message.clear();
                    Step::Advance(State::WaitStart, None)
                }
                FrameCheck::BadChecksum { computed, received } => {
                    tracing::trace!(computed, received, "frame checksum mismatch");
                    Step::Advance(State::ChecksumFailure, None)
                }
                FrameCheck::Complete(_) => Step::Advance(State::OkMessageReceived, None),
            }
        }
        State::OkMessageReceived => match FrameKind::classify(&buffers.message) {
            FrameKind::ReadToken => Step::Advance(State::ReadTokenReceived, None),
            FrameKind::WriteToken => Step::Advance(State::WriteTokenReceived, None),
            _ => {
                let frame = Frame::from_validated(&buffers.message);
                buffers.message.clear();
                tracing::trace!(kind = %frame.kind(), address = %frame.address(), "frame accepted");
                Step::Advance(State::WaitStart, Some(DecoderEvent::Frame(frame)))
            }
        },
        State::ReadTokenReceived => {
            buffers.message.clear();
            Step::Advance(State::WaitStart, Some(DecoderEvent::ReadToken))
        }
        State::WriteTokenReceived => {
            buffers.message.clear();
            Step::Advance(State::WaitStart, Some(DecoderEvent::WriteToken))
        }
        State::ChecksumFailure => {
            buffers.message.clear();
            Step::Advance(State::WaitStart, Some(DecoderEvent::ChecksumFailure))
        }
    }
}

/// Incremental decoder for the pump's serial byte stream.
///
/// Feed raw bytes with [`feed`](Self::feed) and drain effects with
/// [`poll_event`](Self::poll_event), or do both at once with
/// [`push`](Self::push). The decoder is resumable at any byte boundary
/// and never fails: garbage between frames resynchronizes silently, and
/// checksum failures surface as ordinary events.
///
/// A decoder instance must be driven from a single task; it holds no
/// locks and performs no I/O.
///
/// # Examples
///
/// ```
/// use nibe_lib::protocol::{Decoder, DecoderEvent};
///
/// let mut decoder = Decoder::new();
/// let events = decoder.push(&[0x5C, 0x00, 0x20, 0x68, 0x02, 0xAA, 0xBB, 0x5B]);
///
/// match &events[..] {
///     [DecoderEvent::Frame(frame)] => assert_eq!(frame.payload(), &[0xAA, 0xBB]),
///     other => panic!("unexpected events: {other:?}"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
    buffers: Buffers,
}

impl Decoder {
    /// Creates a decoder in the `WaitStart` state with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes to the input buffer without running the
    /// automaton.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffers.input.extend_from_slice(bytes);
    }

    /// Appends a single byte to the input buffer.
    pub fn feed_byte(&mut self, byte: u8) {
        self.buffers.input.extend_from_slice(&[byte]);
    }

    /// Drives the automaton until it produces an effect or runs out of
    /// input.
    ///
    /// Returns `None` when every buffered byte has been consumed without
    /// completing a frame; feed more bytes and poll again.
    pub fn poll_event(&mut self) -> Option<DecoderEvent> {
        loop {
            match step(self.state, &mut self.buffers) {
                Step::Advance(next, event) => {
                    self.state = next;
                    if let Some(event) = event {
                        return Some(event);
                    }
                }
                Step::NeedInput => return None,
            }
        }
    }

    /// Feeds bytes and drains every effect they produce.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<DecoderEvent> {
        self.feed(bytes);
        let mut events = Vec::new();
        while let Some(event) = self.poll_event() {
            events.push(event);
        }
        events
    }

    /// Returns the current automaton state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the number of bytes held across the input and candidate
    /// buffers.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffers.input.len() + self.buffers.message.len()
    }

    /// Discards all buffered bytes and returns to `WaitStart`.
    pub fn reset(&mut self) {
        self.state = State::WaitStart;
        self.buffers.input.clear();
        self.buffers.message.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_READ_OUT: &[u8] = &[0x5C, 0x00, 0x20, 0x68, 0x02, 0xAA, 0xBB, 0x5B];

    #[test]
    fn starts_in_wait_start() {
        let decoder = Decoder::new();
        assert_eq!(decoder.state(), State::WaitStart);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn non_start_bytes_are_discarded() {
        let mut decoder = Decoder::new();
        let events = decoder.push(&[0x01, 0x02, 0xB3, 0xFF]);
        assert!(events.is_empty());
        assert_eq!(decoder.state(), State::WaitStart);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn start_byte_opens_a_candidate() {
        let mut decoder = Decoder::new();
        let events = decoder.push(&[0x5C]);
        assert!(events.is_empty());
        assert_eq!(decoder.state(), State::WaitData);
        assert_eq!(decoder.buffered_len(), 1);
    }

    #[test]
    fn frame_split_across_pushes() {
        let mut decoder = Decoder::new();
        assert!(decoder.push(&DATA_READ_OUT[..3]).is_empty());
        assert!(decoder.push(&DATA_READ_OUT[3..6]).is_empty());

        let events = decoder.push(&DATA_READ_OUT[6..]);
        assert_eq!(events.len(), 1);
        let DecoderEvent::Frame(frame) = &events[0] else {
            panic!("expected a frame event");
        };
        assert_eq!(frame.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn bad_reserved_byte_resyncs_without_event() {
        let mut decoder = Decoder::new();
        let mut stream = vec![0x5C, 0x07];
        stream.extend_from_slice(DATA_READ_OUT);

        let events = decoder.push(&stream);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DecoderEvent::Frame(_)));
    }

    #[test]
    fn checksum_failure_emits_event_and_recovers() {
        let mut tampered = DATA_READ_OUT.to_vec();
        tampered[5] ^= 0x10;

        let mut decoder = Decoder::new();
        let mut events = decoder.push(&tampered);
        events.extend(decoder.push(DATA_READ_OUT));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], DecoderEvent::ChecksumFailure);
        assert!(matches!(events[1], DecoderEvent::Frame(_)));
    }

    #[test]
    fn oversized_candidate_is_abandoned() {
        let mut decoder = Decoder::new();
        // Declared length 0xFF keeps the candidate incomplete while it
        // grows past the frame bound.
        let mut stream = vec![0x5C, 0x00, 0x20, 0x68, 0xFF];
        stream.extend(std::iter::repeat_n(0x00, 120));
        assert!(decoder.push(&stream).is_empty());

        let events = decoder.push(DATA_READ_OUT);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DecoderEvent::Frame(_)));
    }

    #[test]
    fn tokens_route_to_dedicated_events() {
        let mut decoder = Decoder::new();

        let events = decoder.push(&[0x5C, 0x00, 0x20, 0x69, 0x00, 0x49]);
        assert_eq!(events, vec![DecoderEvent::ReadToken]);

        let events = decoder.push(&[0x5C, 0x00, 0x20, 0x6B, 0x00, 0x4B]);
        assert_eq!(events, vec![DecoderEvent::WriteToken]);
    }

    #[test]
    fn substituted_checksum_is_accepted() {
        let mut decoder = Decoder::new();
        let events = decoder.push(&[0x5C, 0x00, 0x20, 0x68, 0x01, 0x15, 0xC5]);

        assert_eq!(events.len(), 1);
        let DecoderEvent::Frame(frame) = &events[0] else {
            panic!("expected a frame event");
        };
        assert_eq!(frame.payload(), &[0x15]);
    }

    #[test]
    fn doubled_payload_bytes_are_collapsed_before_delivery() {
        let mut decoder = Decoder::new();
        let events = decoder.push(&[0x5C, 0x00, 0x20, 0x68, 0x03, 0x5C, 0x5C, 0xAA, 0xE1]);

        assert_eq!(events.len(), 1);
        let DecoderEvent::Frame(frame) = &events[0] else {
            panic!("expected a frame event");
        };
        assert_eq!(frame.payload(), &[0x5C, 0xAA]);
    }

    #[test]
    fn multiple_frames_in_one_push() {
        let mut stream = DATA_READ_OUT.to_vec();
        stream.extend_from_slice(&[0x5C, 0x00, 0x20, 0x69, 0x00, 0x49]);
        stream.extend_from_slice(DATA_READ_OUT);

        let mut decoder = Decoder::new();
        let events = decoder.push(&stream);

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], DecoderEvent::Frame(_)));
        assert_eq!(events[1], DecoderEvent::ReadToken);
        assert!(matches!(events[2], DecoderEvent::Frame(_)));
    }

    #[test]
    fn poll_without_input_returns_none() {
        let mut decoder = Decoder::new();
        assert!(decoder.poll_event().is_none());

        decoder.feed(&DATA_READ_OUT[..4]);
        assert!(decoder.poll_event().is_none());
        assert_eq!(decoder.state(), State::WaitData);
    }

    #[test]
    fn reset_discards_partial_state() {
        let mut decoder = Decoder::new();
        decoder.feed(&DATA_READ_OUT[..5]);
        assert!(decoder.poll_event().is_none());

        decoder.reset();
        assert_eq!(decoder.state(), State::WaitStart);
        assert_eq!(decoder.buffered_len(), 0);

        let events = decoder.push(DATA_READ_OUT);
        assert_eq!(events.len(), 1);
    }
}
