//! Error types for capture runs.
//!
//! This module defines the [`Error`] enum which represents the failures that
//! terminate a capture run: the bus cannot be opened, the configuration is
//! unusable, or the output file cannot be written.
//!
//! Faults reported by the driver while polling are not represented here; they
//! are [`BusError`](crate::bus::BusError)s and never escape the acquisition loop.
//!
//! # Example
//!
//! ```no_run
//! use can_capture::{CaptureConfig, Error, capture_to_file};
//!
//! fn capture() -> can_capture::Result<()> {
//!     match capture_to_file(&CaptureConfig::default()) {
//!         Ok(session) => {
//!             println!("Captured {} frames", session.len());
//!             Ok(())
//!         }
//!         Err(Error::BusOpen { channel, reason }) => {
//!             eprintln!("Cannot open {channel}: {reason}");
//!             Err(Error::BusOpen { channel, reason })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use core::fmt;

/// Errors that can occur during a capture run.
#[derive(Debug)]
pub enum Error {
    /// The bus interface could not be opened.
    BusOpen {
        /// Channel identifier that was requested
        channel: String,
        /// Driver-specific description of the failure
        reason: String,
    },

    /// A configuration value is out of range (negative duration, zero poll
    /// timeout, non-finite seconds).
    InvalidConfig(String),

    /// An I/O error occurred while writing the output file.
    IOError(std::io::Error),

    /// A row could not be encoded by the CSV writer.
    CsvError(csv::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BusOpen { channel, reason } => {
                write!(f, "Failed to open CAN bus on channel {channel:?}: {reason}")
            }
            Error::InvalidConfig(s) => write!(f, "Invalid capture configuration: {s}"),
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            Error::CsvError(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            Error::CsvError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        // File-level failures keep the I/O kind whichever layer reported them.
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(e) => Error::IOError(e),
                _ => unreachable!("is_io_error() guarantees an Io kind"),
            }
        } else {
            Error::CsvError(err)
        }
    }
}

/// A specialized Result type for capture operations.
pub type Result<T> = core::result::Result<T, Error>;
