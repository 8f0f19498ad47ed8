#![forbid(unsafe_code)]

//! # can-capture
//!
//! Record CAN bus traffic for a fixed duration and save it as a CSV table.
//!
//! A capture run opens a bus handle, polls it with a short timeout until the
//! capture window closes, keeps every received frame in memory, shuts the
//! handle down and writes the frames out:
//!
//! ```text
//! Timestamp,Arbitration ID (hex),Data (hex),DLC,Message Type
//! 1697040000.123456,123,dead,2,Standard
//! 1697040000.125001,18fef100,2122232425262728,8,Extended
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use can_capture::{CaptureConfig, DriverKind, Result, capture_to_file};
//!
//! fn main() -> Result<()> {
//!     let config = CaptureConfig::default()
//!         .with_channel("can0")
//!         .with_driver(DriverKind::SocketCan)
//!         .with_duration_secs(2.5)?
//!         .with_output("can0.csv");
//!
//!     let session = capture_to_file(&config)?;
//!     println!("Captured {} frames", session.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Custom drivers
//!
//! Any type implementing [`CanBus`] can be captured from with [`run`] or
//! [`capture_with`]. Frames only need to implement [`embedded_can::Frame`].
//!
//! ```
//! use std::time::Duration;
//! use can_capture::{VirtualBus, VirtualFrame, run};
//!
//! let mut bus = VirtualBus::new();
//! bus.push_frame(0.5, VirtualFrame::standard(0x123, &[0xDE, 0xAD]).unwrap());
//!
//! let session = run(bus, Duration::from_millis(20), Duration::from_millis(5));
//! assert_eq!(session.frames()[0].id_hex(), "123");
//! assert_eq!(session.frames()[0].data_hex(), "dead");
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bus`] | Driver trait, poll outcomes and the scoped bus guard |
//! | [`capture`] | Acquisition loop, configuration and session |
//! | [`frame`] | Captured frame record and hex rendering |
//! | [`output`] | CSV writer |
//! | [`virtual_bus`] | Scripted in-memory driver |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T>`]. Only opening the bus and writing
//! the output can fail a run; faults reported while polling are logged and
//! counted in [`CaptureStats`].

pub mod bus;
pub mod capture;
pub mod error;
pub mod frame;
pub mod output;
pub mod virtual_bus;

#[cfg(all(feature = "socketcan", target_os = "linux"))]
mod socketcan_bus;

pub use bus::{BusError, BusGuard, CanBus, DriverKind, PollOutcome};
pub use capture::{
    CaptureConfig, CaptureSession, CaptureStats, acquire, capture_to_file, capture_with, run,
};
pub use error::{Error, Result};
pub use frame::{CapturedFrame, FrameKind, TimestampedFrame};
pub use output::{HEADER, write_csv, write_session};
pub use virtual_bus::{ScriptedEvent, VirtualBus, VirtualFrame};

#[cfg(all(feature = "socketcan", target_os = "linux"))]
pub use socketcan_bus::SocketCanBus;
