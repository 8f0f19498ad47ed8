//! Linux SocketCAN driver.
//!
//! Frames carry the kernel receive timestamp. Error frames are enabled on
//! open so controller faults (bus-off, error-passive, ...) reach the
//! acquisition loop as [`BusError::Driver`].

use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use socketcan::{CanFrame, CanSocketTimestamp, Socket, SocketOptions};

use crate::bus::{BusError, CanBus};
use crate::frame::TimestampedFrame;
use crate::{Error, Result};

/// A raw SocketCAN socket bound to one interface.
pub struct SocketCanBus {
    iface: String,
    socket: Option<CanSocketTimestamp>,
    read_timeout: Option<Duration>,
}

impl SocketCanBus {
    /// Bind to the named interface (`can0`, `vcan0`, ...).
    pub fn open(iface: &str) -> Result<Self> {
        let open_error = |e: io::Error| Error::BusOpen {
            channel: iface.to_string(),
            reason: e.to_string(),
        };
        let socket = CanSocketTimestamp::open(iface).map_err(open_error)?;
        socket.set_error_filter_accept_all().map_err(open_error)?;
        log::debug!("Opened SocketCAN interface {iface}");
        Ok(Self {
            iface: iface.to_string(),
            socket: Some(socket),
            read_timeout: None,
        })
    }
}

fn seconds_since_epoch(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Turn a received frame into a poll result, keeping the kernel stamp when present.
fn frame_outcome(
    frame: CanFrame,
    stamp: Option<SystemTime>,
) -> core::result::Result<Option<TimestampedFrame<CanFrame>>, BusError> {
    if socketcan::Frame::is_error_frame(&frame) {
        return Err(BusError::Driver(format!(
            "error frame {:#x}",
            socketcan::Frame::raw_id(&frame)
        )));
    }
    let timestamp = seconds_since_epoch(stamp.unwrap_or_else(SystemTime::now));
    Ok(Some(TimestampedFrame::new(timestamp, frame)))
}

/// Map a failed read: timeouts are no traffic, OS errors are bus faults.
fn read_error(
    iface: &str,
    e: io::Error,
) -> core::result::Result<Option<TimestampedFrame<CanFrame>>, BusError> {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Ok(None),
        _ if e.raw_os_error().is_some() => Err(BusError::Driver(format!("{iface}: {e}"))),
        _ => Err(BusError::Other(format!("{iface}: {e}"))),
    }
}

impl CanBus for SocketCanBus {
    type Frame = CanFrame;

    fn receive(
        &mut self,
        timeout: Duration,
    ) -> core::result::Result<Option<TimestampedFrame<CanFrame>>, BusError> {
        let socket = self.socket.as_ref().ok_or(BusError::Closed)?;
        if self.read_timeout != Some(timeout) {
            socket
                .set_read_timeout(timeout)
                .map_err(|e| BusError::Other(format!("{}: {e}", self.iface)))?;
            self.read_timeout = Some(timeout);
        }
        match socket.read_frame() {
            Ok((frame, stamp)) => frame_outcome(frame, stamp),
            Err(e) => read_error(&self.iface, e),
        }
    }

    fn shutdown(&mut self) -> core::result::Result<(), BusError> {
        // Dropping the socket closes the descriptor.
        match self.socket.take() {
            Some(socket) => {
                drop(socket);
                Ok(())
            }
            None => Err(BusError::Closed),
        }
    }
}
