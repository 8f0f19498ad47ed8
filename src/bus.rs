//! Bus driver abstraction.
//!
//! The acquisition loop only needs two things from a driver: receive the next
//! frame within a timeout, and shut the handle down. [`CanBus`] captures that
//! contract; [`BusGuard`] ties the shutdown to scope so it happens exactly once
//! on every exit path.

use core::fmt;
use core::time::Duration;

use embedded_can::Frame;

use crate::frame::TimestampedFrame;

/// Fault reported by a driver while polling or shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Bus-level fault from the driver or transceiver (error frame, bus-off,
    /// controller error). Usually transient.
    Driver(String),
    /// Any other failure surfaced by the driver.
    Other(String),
    /// The handle was used after shutdown.
    Closed,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Driver(s) => write!(f, "CAN error: {s}"),
            BusError::Other(s) => write!(f, "Error receiving message: {s}"),
            BusError::Closed => write!(f, "Bus handle already shut down"),
        }
    }
}

impl std::error::Error for BusError {}

/// A CAN bus handle.
pub trait CanBus {
    /// Frame type produced by the driver.
    type Frame: Frame;

    /// Wait up to `timeout` for the next frame.
    ///
    /// Returns `Ok(None)` when the timeout elapses without traffic.
    fn receive(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TimestampedFrame<Self::Frame>>, BusError>;

    /// Release the underlying OS or hardware resources.
    fn shutdown(&mut self) -> Result<(), BusError>;
}

impl<B: CanBus + ?Sized> CanBus for &mut B {
    type Frame = B::Frame;

    fn receive(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TimestampedFrame<Self::Frame>>, BusError> {
        (**self).receive(timeout)
    }

    fn shutdown(&mut self) -> Result<(), BusError> {
        (**self).shutdown()
    }
}

/// Result of a single poll.
#[derive(Debug)]
pub enum PollOutcome<F> {
    /// A frame arrived.
    Frame(TimestampedFrame<F>),
    /// The poll timeout elapsed with no traffic.
    Timeout,
    /// The driver reported a fault. The loop records it and keeps polling.
    Recoverable(BusError),
}

impl<F> From<Result<Option<TimestampedFrame<F>>, BusError>> for PollOutcome<F> {
    fn from(result: Result<Option<TimestampedFrame<F>>, BusError>) -> Self {
        match result {
            Ok(Some(frame)) => PollOutcome::Frame(frame),
            Ok(None) => PollOutcome::Timeout,
            Err(e) => PollOutcome::Recoverable(e),
        }
    }
}

/// Poll the bus once.
pub fn poll<B: CanBus>(bus: &mut B, timeout: Duration) -> PollOutcome<B::Frame> {
    bus.receive(timeout).into()
}

/// Scoped ownership of a bus handle.
///
/// The handle is shut down by [`release`](Self::release) or, failing that,
/// when the guard is dropped (early return or unwinding panic). Either way
/// `shutdown` runs once.
pub struct BusGuard<B: CanBus> {
    bus: B,
    released: bool,
}

impl<B: CanBus> BusGuard<B> {
    /// Take ownership of an open bus.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            released: false,
        }
    }

    /// Access the bus for polling.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Shut the bus down now and return the result of the attempt.
    pub fn release(mut self) -> Result<(), BusError> {
        self.shutdown_once().unwrap_or(Ok(()))
    }

    fn shutdown_once(&mut self) -> Option<Result<(), BusError>> {
        if self.released {
            return None;
        }
        self.released = true;
        let result = self.bus.shutdown();
        match &result {
            Ok(()) => log::info!("CAN bus shut down."),
            Err(e) => log::warn!("CAN bus shutdown failed: {e}"),
        }
        Some(result)
    }
}

impl<B: CanBus> Drop for BusGuard<B> {
    fn drop(&mut self) {
        let _ = self.shutdown_once();
    }
}

/// Driver backends that can be opened by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DriverKind {
    /// Linux SocketCAN interface (`can0`, `vcan0`, ...).
    #[value(name = "socketcan")]
    SocketCan,
    /// In-memory bus with no attached hardware.
    Virtual,
}

impl Default for DriverKind {
    fn default() -> Self {
        if cfg!(all(feature = "socketcan", target_os = "linux")) {
            DriverKind::SocketCan
        } else {
            DriverKind::Virtual
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::SocketCan => f.write_str("socketcan"),
            DriverKind::Virtual => f.write_str("virtual"),
        }
    }
}
