//! In-memory CAN bus.
//!
//! [`VirtualBus`] replays a script of frames, faults and timeouts. Once the
//! script runs out it behaves like an idle bus: every receive blocks for the
//! full timeout and returns nothing. It backs the `virtual` driver kind and the
//! test suite.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use embedded_can::{ExtendedId, Frame, Id, StandardId};

use crate::bus::{BusError, CanBus};
use crate::frame::TimestampedFrame;

/// Maximum payload length of a classic CAN frame.
pub const MAX_DATA_LEN: usize = 8;

/// A classic CAN frame held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFrame {
    id: Id,
    data: [u8; MAX_DATA_LEN],
    dlc: usize,
    remote: bool,
}

impl VirtualFrame {
    /// Data frame with an 11-bit ID. `None` if the ID or payload is out of range.
    pub fn standard(id: u16, data: &[u8]) -> Option<Self> {
        Self::new(StandardId::new(id)?, data)
    }

    /// Data frame with a 29-bit ID. `None` if the ID or payload is out of range.
    pub fn extended(id: u32, data: &[u8]) -> Option<Self> {
        Self::new(ExtendedId::new(id)?, data)
    }

    /// Remote frame requesting `dlc` bytes.
    pub fn remote(id: u32, dlc: usize, extended: bool) -> Option<Self> {
        let id: Id = if extended {
            ExtendedId::new(id)?.into()
        } else {
            StandardId::new(u16::try_from(id).ok()?)?.into()
        };
        Self::new_remote(id, dlc)
    }
}

impl Frame for VirtualFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_DATA_LEN {
            return None;
        }
        let mut frame_data = [0u8; MAX_DATA_LEN];
        frame_data[..data.len()].copy_from_slice(data);
        Some(Self {
            id: id.into(),
            data: frame_data,
            dlc: data.len(),
            remote: false,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_DATA_LEN {
            return None;
        }
        Some(Self {
            id: id.into(),
            data: [0u8; MAX_DATA_LEN],
            dlc,
            remote: true,
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc]
        }
    }
}

/// One step of a [`VirtualBus`] script.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    /// Deliver a frame.
    Frame(TimestampedFrame<VirtualFrame>),
    /// Fail the receive call.
    Error(BusError),
    /// Return immediately with no frame.
    Timeout,
}

/// Scripted in-memory bus.
#[derive(Debug, Default)]
pub struct VirtualBus {
    channel: String,
    script: VecDeque<ScriptedEvent>,
    polls: usize,
    shutdowns: Arc<AtomicUsize>,
    shutdown_error: Option<BusError>,
    closed: bool,
}

impl VirtualBus {
    /// Create an idle bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle bus labelled with a channel name.
    pub fn open(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            ..Self::default()
        }
    }

    /// Channel name given at open.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Append an event to the script.
    pub fn push(&mut self, event: ScriptedEvent) {
        self.script.push_back(event);
    }

    /// Append a frame to the script.
    pub fn push_frame(&mut self, timestamp_s: f64, frame: VirtualFrame) {
        self.push(ScriptedEvent::Frame(TimestampedFrame::new(timestamp_s, frame)));
    }

    /// Append a receive failure to the script.
    pub fn push_error(&mut self, error: BusError) {
        self.push(ScriptedEvent::Error(error));
    }

    /// Make `shutdown` fail with `error`.
    pub fn fail_shutdown_with(&mut self, error: BusError) {
        self.shutdown_error = Some(error);
    }

    /// Number of scripted events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of receive calls made so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Shared counter of shutdown calls, readable after the bus is moved.
    pub fn shutdown_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shutdowns)
    }

    /// Number of shutdown calls so far.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl CanBus for VirtualBus {
    type Frame = VirtualFrame;

    fn receive(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TimestampedFrame<VirtualFrame>>, BusError> {
        if self.closed {
            return Err(BusError::Closed);
        }
        self.polls += 1;
        match self.script.pop_front() {
            Some(ScriptedEvent::Frame(frame)) => Ok(Some(frame)),
            Some(ScriptedEvent::Error(e)) => Err(e),
            Some(ScriptedEvent::Timeout) => Ok(None),
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn shutdown(&mut self) -> Result<(), BusError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        match self.shutdown_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
