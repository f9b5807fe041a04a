// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Correlation of outstanding read and write requests.

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::error::ProtocolError;
use crate::message::WriteRequest;
use crate::registers::Coil;

type ReadReply = oneshot::Sender<Result<u32, ProtocolError>>;
type WriteReply = oneshot::Sender<Result<(), ProtocolError>>;

/// Outstanding requests, split by whether they went out on the wire.
///
/// Queued requests wait for a token; taking one moves it in flight. Read
/// responses echo the register address, so in-flight reads resolve by
/// address. Write responses carry only a status byte, so in-flight writes
/// resolve strictly in send order.
#[derive(Debug)]
pub(super) struct PendingRequests {
    capacity: usize,
    queued_reads: VecDeque<(Coil, ReadReply)>,
    inflight_reads: Vec<(Coil, ReadReply)>,
    queued_writes: VecDeque<(WriteRequest, WriteReply)>,
    inflight_writes: VecDeque<WriteReply>,
}

impl PendingRequests {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queued_reads: VecDeque::new(),
            inflight_reads: Vec::new(),
            queued_writes: VecDeque::new(),
            inflight_writes: VecDeque::new(),
        }
    }

    /// Total number of queued and in-flight requests.
    pub(super) fn len(&self) -> usize {
        self.queued_reads.len()
            + self.inflight_reads.len()
            + self.queued_writes.len()
            + self.inflight_writes.len()
    }

    /// Queues a read for the next read token.
    ///
    /// If the queue is at capacity, the reply channel receives
    /// [`ProtocolError::QueueFull`] instead.
    pub(super) fn push_read(&mut self, coil: Coil, reply: ReadReply) {
        self.sweep_abandoned();
        if self.len() >= self.capacity {
            let _ = reply.send(Err(ProtocolError::QueueFull {
                capacity: self.capacity,
            }));
            return;
        }
        self.queued_reads.push_back((coil, reply));
    }

    /// Queues a write for the next write token.
    ///
    /// If the queue is at capacity, the reply channel receives
    /// [`ProtocolError::QueueFull`] instead.
    pub(super) fn push_write(&mut self, request: WriteRequest, reply: WriteReply) {
        self.sweep_abandoned();
        if self.len() >= self.capacity {
            let _ = reply.send(Err(ProtocolError::QueueFull {
                capacity: self.capacity,
            }));
            return;
        }
        self.queued_writes.push_back((request, reply));
    }

    /// Takes the next queued read and marks it in flight.
    pub(super) fn next_read(&mut self) -> Option<Coil> {
        let (coil, reply) = self.queued_reads.pop_front()?;
        self.inflight_reads.push((coil, reply));
        Some(coil)
    }

    /// Takes the next queued write and marks it in flight.
    pub(super) fn next_write(&mut self) -> Option<WriteRequest> {
        let (request, reply) = self.queued_writes.pop_front()?;
        self.inflight_writes.push_back(reply);
        Some(request)
    }

    /// Resolves the oldest in-flight read for a register.
    ///
    /// Returns `false` if no read for that register is in flight, which
    /// happens when the pump volunteers a response nobody asked for.
    pub(super) fn resolve_read(&mut self, coil: Coil, raw: u32) -> bool {
        let Some(position) = self
            .inflight_reads
            .iter()
            .position(|(pending, _)| *pending == coil)
        else {
            return false;
        };
        let (_, reply) = self.inflight_reads.remove(position);
        let _ = reply.send(Ok(raw));
        true
    }

    /// Resolves the oldest in-flight write with the pump's status.
    ///
    /// Returns `false` if no write is in flight.
    pub(super) fn resolve_write(&mut self, success: bool) -> bool {
        let Some(reply) = self.inflight_writes.pop_front() else {
            return false;
        };
        let result = if success {
            Ok(())
        } else {
            Err(ProtocolError::WriteRejected)
        };
        let _ = reply.send(result);
        true
    }

    /// Fails every outstanding request because the link closed.
    pub(super) fn close_all(&mut self) {
        for (_, reply) in self.queued_reads.drain(..) {
            let _ = reply.send(Err(link_closed()));
        }
        for (_, reply) in self.inflight_reads.drain(..) {
            let _ = reply.send(Err(link_closed()));
        }
        for (_, reply) in self.queued_writes.drain(..) {
            let _ = reply.send(Err(link_closed()));
        }
        for reply in self.inflight_writes.drain(..) {
            let _ = reply.send(Err(link_closed()));
        }
    }

    /// Drops requests whose caller stopped waiting.
    ///
    /// In-flight writes are kept even when abandoned: write responses
    /// resolve by position, so removing one would shift the correlation.
    fn sweep_abandoned(&mut self) {
        self.queued_reads.retain(|(_, reply)| !reply.is_closed());
        self.inflight_reads.retain(|(_, reply)| !reply.is_closed());
        self.queued_writes.retain(|(_, reply)| !reply.is_closed());
    }
}

fn link_closed() -> ProtocolError {
    ProtocolError::ChannelClosed("pump link closed".to_string())
}
